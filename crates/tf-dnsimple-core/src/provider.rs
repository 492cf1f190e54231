//! Provider: configure-once client wiring and per-call resource dispatch.
//!
//! Every lifecycle call builds a fresh resource instance, hands it the
//! shared [`ProviderConfig`], checks the input against the resource schema
//! and only returns state when no error diagnostic was produced.

use crate::{cfg::ProviderCfg, error::ConfigError, resources};
use dnsimple_client::{Client, ZoneApi};
use once_cell::sync::OnceCell;
use serde::{Deserialize, Serialize};
use std::{collections::BTreeMap, sync::Arc};
use tf_resource::{
    AttrPath, Attribute, CreateRequest, DeleteRequest, Diagnostics, ImportRequest, PlannedChange,
    ProviderData, ReadRequest, Resource, ResourceFactory, ResourceResponse, Schema, State,
    UpdateRequest,
};
use tracing::{debug, info};
use validator::Validate;

pub const PROVIDER_TYPE_NAME: &str = "dnsimple";

/// Read-only configuration shared by all resources once configured.
pub struct ProviderConfig {
    pub api: Arc<dyn ZoneApi>,
    pub account_id: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct ProviderMetadata {
    pub type_name: String,
    pub resources: Vec<String>,
}

#[derive(Debug, Clone, Serialize)]
pub struct ProviderSchema {
    pub provider: Schema,
    pub resources: BTreeMap<String, Schema>,
}

/// Provider block as sent by the host; every field falls back to file/env config.
#[derive(Debug, Default, Deserialize)]
struct ProviderBlock {
    #[serde(default)]
    token: Option<String>,
    #[serde(default)]
    account: Option<String>,
    #[serde(default)]
    sandbox: Option<bool>,
    #[serde(default)]
    user_agent: Option<String>,
}

pub struct DnsimpleProvider {
    defaults: ProviderCfg,
    data: OnceCell<ProviderData>,
    factories: BTreeMap<String, ResourceFactory>,
}

impl DnsimpleProvider {
    pub fn new(defaults: ProviderCfg) -> Self {
        let factories = resources::all()
            .into_iter()
            .map(|f| (f().metadata(PROVIDER_TYPE_NAME), f))
            .collect();
        Self {
            defaults,
            data: OnceCell::new(),
            factories,
        }
    }

    pub fn is_configured(&self) -> bool {
        self.data.get().is_some()
    }

    /*──────── metadata / schema ────────*/

    pub fn metadata(&self) -> ProviderMetadata {
        ProviderMetadata {
            type_name: PROVIDER_TYPE_NAME.to_owned(),
            resources: self.factories.keys().cloned().collect(),
        }
    }

    pub fn provider_schema() -> Schema {
        Schema::new("DNSimple provider")
            .with_attribute(
                "token",
                Attribute::optional_string()
                    .sensitive()
                    .with_description("API v2 token. Falls back to DNSIMPLE_TOKEN."),
            )
            .with_attribute(
                "account",
                Attribute::optional_string()
                    .with_description("Account identifier. Falls back to DNSIMPLE_ACCOUNT."),
            )
            .with_attribute(
                "sandbox",
                Attribute::optional_bool().with_description("Use the DNSimple sandbox API."),
            )
            .with_attribute(
                "user_agent",
                Attribute::optional_string()
                    .with_description("Appended to the provider's user agent."),
            )
    }

    pub fn schema(&self) -> ProviderSchema {
        ProviderSchema {
            provider: Self::provider_schema(),
            resources: self
                .factories
                .iter()
                .map(|(name, f)| (name.clone(), f().schema()))
                .collect(),
        }
    }

    /*──────── configure ────────*/

    /// Merge the host's provider block over file/env config and build the
    /// API client. Accepted once; later calls are rejected.
    pub fn configure(&self, block: &State) -> Diagnostics {
        let mut diags = Self::provider_schema().validate_config(block);
        if diags.has_error() {
            return diags;
        }
        if self.is_configured() {
            diags.add_error(
                "Provider already configured",
                "configure may only be called once per provider instance",
            );
            return diags;
        }

        let block: ProviderBlock = match block.get() {
            Ok(b) => b,
            Err(d) => return d,
        };
        let mut cfg = self.defaults.clone();
        if let Some(v) = block.token {
            cfg.token = v;
        }
        if let Some(v) = block.account {
            cfg.account = v;
        }
        if let Some(v) = block.sandbox {
            cfg.sandbox = v;
        }
        if block.user_agent.is_some() {
            cfg.user_agent = block.user_agent;
        }

        let client = match build_client(&cfg) {
            Ok(c) => c,
            Err(e) => return config_error_to_diagnostics(e),
        };
        info!(
            "provider configured: account={} endpoint={}",
            cfg.account,
            client.base_url()
        );

        let data = ProviderData::new(Arc::new(ProviderConfig {
            api: Arc::new(client),
            account_id: cfg.account,
        }));
        if self.data.set(data).is_err() {
            diags.add_error(
                "Provider already configured",
                "configure may only be called once per provider instance",
            );
        }
        diags
    }

    /*──────── dispatch ────────*/

    fn instance(&self, type_name: &str) -> Result<Box<dyn Resource>, Diagnostics> {
        let mut diags = Diagnostics::new();
        let Some(factory) = self.factories.get(type_name) else {
            diags.add_error(
                "Unknown resource type",
                format!("the {PROVIDER_TYPE_NAME} provider has no resource named {type_name:?}"),
            );
            return Err(diags);
        };
        let Some(data) = self.data.get() else {
            diags.add_error(
                "Unconfigured provider",
                "configure must succeed before resources can be managed",
            );
            return Err(diags);
        };
        let mut res = factory();
        diags.extend(res.configure(Some(data)));
        if diags.has_error() {
            return Err(diags);
        }
        Ok(res)
    }

    /// Validate input, run `op`, then check the produced state.
    async fn run<F, Fut>(
        &self,
        type_name: &str,
        op: &str,
        input: Option<&State>,
        f: F,
    ) -> ResourceResponse
    where
        F: FnOnce(Box<dyn Resource>) -> Fut,
        Fut: std::future::Future<Output = ResourceResponse>,
    {
        let res = match self.instance(type_name) {
            Ok(r) => r,
            Err(d) => return ResourceResponse::failed(d),
        };
        let schema = res.schema();
        if let Some(st) = input {
            let d = schema.validate_state(st);
            if d.has_error() {
                return ResourceResponse::failed(d);
            }
        }

        debug!("{type_name}: {op}");
        let mut resp = f(res).await;
        if let Some(st) = &resp.state {
            let d = schema.validate_state(st);
            resp.diagnostics.extend(d);
        }
        if resp.diagnostics.has_error() {
            info!("{type_name}: {op} failed with {} error(s)", resp.diagnostics.errors().count());
        }
        resp.finish()
    }

    pub async fn create(&self, type_name: &str, plan: State) -> ResourceResponse {
        let input = plan.clone();
        self.run(type_name, "create", Some(&input), |r| async move {
            r.create(CreateRequest { plan }).await
        })
        .await
    }

    pub async fn read(&self, type_name: &str, state: State) -> ResourceResponse {
        let input = state.clone();
        self.run(type_name, "read", Some(&input), |r| async move {
            r.read(ReadRequest { state }).await
        })
        .await
    }

    pub async fn update(&self, type_name: &str, plan: State, prior_state: State) -> ResourceResponse {
        let input = plan.clone();
        self.run(type_name, "update", Some(&input), |r| async move {
            r.update(UpdateRequest { plan, prior_state }).await
        })
        .await
    }

    pub async fn delete(&self, type_name: &str, state: State) -> ResourceResponse {
        let input = state.clone();
        self.run(type_name, "delete", Some(&input), |r| async move {
            r.delete(DeleteRequest { state }).await
        })
        .await
    }

    /// Import passthrough followed by a read; the read result becomes the tracked state.
    pub async fn import(&self, type_name: &str, id: &str) -> ResourceResponse {
        let id = id.to_owned();
        self.run(type_name, "import", None, |r| async move {
            let ResourceResponse { state, diagnostics } =
                r.import_state(ImportRequest { id }).await;
            match state {
                Some(st) if !diagnostics.has_error() => {
                    let mut resp = r.read(ReadRequest { state: st }).await;
                    let mut all = diagnostics;
                    all.extend(resp.diagnostics);
                    resp.diagnostics = all;
                    resp
                }
                _ => ResourceResponse::failed(diagnostics),
            }
        })
        .await
    }

    /// Plan a change without touching the remote API.
    pub fn plan(
        &self,
        type_name: &str,
        prior: Option<&State>,
        proposed: Option<&State>,
    ) -> Result<PlannedChange, Diagnostics> {
        let Some(factory) = self.factories.get(type_name) else {
            let mut d = Diagnostics::new();
            d.add_error(
                "Unknown resource type",
                format!("the {PROVIDER_TYPE_NAME} provider has no resource named {type_name:?}"),
            );
            return Err(d);
        };
        let schema = factory().schema();
        if let Some(p) = proposed {
            let d = schema.validate_config(p);
            if d.has_error() {
                return Err(d);
            }
        }
        Ok(schema.plan(prior, proposed))
    }
}

fn build_client(cfg: &ProviderCfg) -> Result<Client, ConfigError> {
    cfg.validate()?;
    Client::new(&cfg.token, cfg.api_base_url(), cfg.user_agent.as_deref()).map_err(ConfigError::Client)
}

fn config_error_to_diagnostics(e: ConfigError) -> Diagnostics {
    let mut diags = Diagnostics::new();
    match e {
        ConfigError::Validate(errs) => {
            let mut fields: Vec<_> = errs.field_errors().into_iter().collect();
            fields.sort_by(|a, b| a.0.cmp(&b.0));
            for (field, list) in fields {
                for err in list {
                    let detail = err
                        .message
                        .as_ref()
                        .map(|m| m.to_string())
                        .unwrap_or_else(|| err.code.to_string());
                    diags.add_attribute_error(
                        AttrPath::root(field.to_string()),
                        "Invalid provider configuration",
                        detail,
                    );
                }
            }
        }
        other => diags.add_error("Invalid provider configuration", other.to_string()),
    }
    diags
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn st(v: serde_json::Value) -> State {
        State::from_value(v).unwrap()
    }

    #[test]
    fn registers_secondary_zone() {
        let p = DnsimpleProvider::new(ProviderCfg::default());
        assert_eq!(
            p.metadata().resources,
            vec!["dnsimple_domain_secondary_zone".to_owned()]
        );
        assert!(p.schema().resources.contains_key("dnsimple_domain_secondary_zone"));
    }

    #[test]
    fn configure_requires_credentials() {
        let p = DnsimpleProvider::new(ProviderCfg::default());
        let d = p.configure(&st(json!({})));
        assert!(d.has_error());
        let paths: Vec<_> = d.iter().filter_map(|x| x.path.clone()).collect();
        assert_eq!(paths, vec![AttrPath::root("account"), AttrPath::root("token")]);
        assert!(!p.is_configured());
    }

    #[test]
    fn configure_once() {
        let p = DnsimpleProvider::new(ProviderCfg {
            token: "file-token".into(),
            ..Default::default()
        });
        let block = st(json!({"account": "1010", "sandbox": true}));
        assert!(!p.configure(&block).has_error());
        assert!(p.is_configured());

        let again = p.configure(&block);
        assert_eq!(again.iter().next().unwrap().summary, "Provider already configured");
    }

    #[test]
    fn configure_rejects_wrong_types() {
        let p = DnsimpleProvider::new(ProviderCfg::default());
        let d = p.configure(&st(json!({"token": "t", "account": "1", "sandbox": "yes"})));
        assert_eq!(d.iter().next().unwrap().path, Some(AttrPath::root("sandbox")));
    }

    #[tokio::test]
    async fn unconfigured_and_unknown() {
        let p = DnsimpleProvider::new(ProviderCfg::default());
        let resp = p
            .create("dnsimple_domain_secondary_zone", st(json!({"name": "a.com"})))
            .await;
        assert_eq!(resp.diagnostics.iter().next().unwrap().summary, "Unconfigured provider");

        let resp = p.read("dnsimple_record", st(json!({"name": "a.com"}))).await;
        assert_eq!(resp.diagnostics.iter().next().unwrap().summary, "Unknown resource type");
    }

    #[test]
    fn plan_rename_is_replace() {
        let p = DnsimpleProvider::new(ProviderCfg::default());
        let prior = st(json!({"name": "a.com", "id": 1}));
        let proposed = st(json!({"name": "b.com"}));
        let plan = p
            .plan("dnsimple_domain_secondary_zone", Some(&prior), Some(&proposed))
            .unwrap();
        assert_eq!(plan.action, tf_resource::PlanAction::Replace);

        let bad = st(json!({"name": "b.com", "id": 5}));
        assert!(p.plan("dnsimple_domain_secondary_zone", None, Some(&bad)).is_err());
    }
}
