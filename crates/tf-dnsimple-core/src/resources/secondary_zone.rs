//! `dnsimple_domain_secondary_zone`
//!
//! DNSimple has no "get secondary zone" and no "delete secondary zone"
//! endpoint, so:
//!
//! * read goes through the zone-level lookup; a zone that can be fetched is
//!   treated as an existing secondary zone,
//! * delete only forgets the resource, the remote zone is left in place,
//! * update never applies, `name` is replace-only.

use crate::{provider::ProviderConfig, resources::validation_failures_to_diagnostics};
use async_trait::async_trait;
use dnsimple_client::{ApiError, SecondaryZoneRequest, Zone};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tf_resource::{
    AttrPath, Attribute, CreateRequest, DeleteRequest, Diagnostics, ImportRequest, ProviderData,
    ReadRequest, Resource, ResourceResponse, Schema, State, UpdateRequest,
    import_state_passthrough_id,
};
use tracing::{debug, info};

const TYPE_SUFFIX: &str = "_domain_secondary_zone";

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct SecondaryZoneModel {
    pub name: String,
    #[serde(default)]
    pub id: Option<i64>,
}

impl From<&Zone> for SecondaryZoneModel {
    fn from(z: &Zone) -> Self {
        Self {
            name: z.name.clone(),
            id: Some(z.id),
        }
    }
}

#[derive(Default)]
pub struct DomainSecondaryZoneResource {
    config: Option<Arc<ProviderConfig>>,
}

impl DomainSecondaryZoneResource {
    pub fn factory() -> Box<dyn Resource> {
        Box::new(Self::default())
    }

    fn config(&self) -> Result<&ProviderConfig, Diagnostics> {
        self.config.as_deref().ok_or_else(|| {
            let mut d = Diagnostics::new();
            d.add_error(
                "Unconfigured provider",
                "the provider must be configured before managing secondary zones",
            );
            d
        })
    }

    fn to_response(zone: &Zone) -> ResourceResponse {
        match State::from_model(&SecondaryZoneModel::from(zone)) {
            Ok(st) => ResourceResponse::with_state(st),
            Err(d) => ResourceResponse::failed(d),
        }
    }
}

#[async_trait]
impl Resource for DomainSecondaryZoneResource {
    fn metadata(&self, provider_type_name: &str) -> String {
        format!("{provider_type_name}{TYPE_SUFFIX}")
    }

    fn schema(&self) -> Schema {
        Schema::new(
            "DNSimple domain secondary zone resource. Removing it from configuration \
             only stops tracking it: the zone itself is NOT deleted from DNSimple.",
        )
        .with_attribute(
            "name",
            Attribute::required_string()
                .requires_replace()
                .with_description("The zone name, e.g. `example.com`."),
        )
        // for most of the API the zone name is the key, not the id
        .with_attribute("id", Attribute::computed_int64())
    }

    fn configure(&mut self, data: Option<&ProviderData>) -> Diagnostics {
        let mut diags = Diagnostics::new();
        let Some(data) = data else {
            return diags;
        };
        match data.downcast::<ProviderConfig>() {
            Some(cfg) => self.config = Some(cfg),
            None => diags.add_error(
                "Unexpected Resource Configure Type",
                format!(
                    "Expected ProviderConfig, got: {}. Please report this issue to the provider developers.",
                    data.type_name()
                ),
            ),
        }
        diags
    }

    async fn create(&self, req: CreateRequest) -> ResourceResponse {
        let cfg = match self.config() {
            Ok(c) => c,
            Err(d) => return ResourceResponse::failed(d),
        };
        let plan: SecondaryZoneModel = match req.plan.get() {
            Ok(m) => m,
            Err(d) => return ResourceResponse::failed(d),
        };

        let body = SecondaryZoneRequest {
            name: plan.name.clone(),
        };
        match cfg.api.create_secondary_zone(&cfg.account_id, &body).await {
            Ok(sz) => Self::to_response(&sz.zone),
            Err(ApiError::Validation { failures, .. }) => {
                ResourceResponse::failed(validation_failures_to_diagnostics(&failures))
            }
            Err(e) => {
                let mut d = Diagnostics::new();
                d.add_error("failed to create DNSimple secondary DNS zone", e.to_string());
                ResourceResponse::failed(d)
            }
        }
    }

    async fn read(&self, req: ReadRequest) -> ResourceResponse {
        let cfg = match self.config() {
            Ok(c) => c,
            Err(d) => return ResourceResponse::failed(d),
        };
        let prior: SecondaryZoneModel = match req.state.get() {
            Ok(m) => m,
            Err(d) => return ResourceResponse::failed(d),
        };

        match cfg.api.get_zone(&cfg.account_id, &prior.name).await {
            Ok(zone) => Self::to_response(&zone),
            Err(e) => {
                let mut d = Diagnostics::new();
                d.add_error(
                    format!("failed to read DNSimple zone {:?}", prior.name),
                    e.to_string(),
                );
                ResourceResponse::failed(d)
            }
        }
    }

    async fn update(&self, req: UpdateRequest) -> ResourceResponse {
        // name is replace-only and id is computed: nothing can change in place
        ResourceResponse::with_state(req.prior_state)
    }

    async fn delete(&self, req: DeleteRequest) -> ResourceResponse {
        let name = req.state.attribute("name").and_then(|v| v.as_str()).unwrap_or("");
        debug!("secondary zone {name} dropped from state; DNSimple zone left untouched");
        ResourceResponse::removed()
    }

    async fn import_state(&self, req: ImportRequest) -> ResourceResponse {
        info!("importing secondary zone {}", req.id);
        match import_state_passthrough_id(&AttrPath::root("name"), &req.id) {
            Ok(st) => ResourceResponse::with_state(st),
            Err(d) => ResourceResponse::failed(d),
        }
    }
}
