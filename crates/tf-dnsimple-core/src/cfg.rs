//! Parse `tf-dnsimple.toml` into `AppConfig`, with `DNSIMPLE_*` env overrides
//!
//! ```toml
//! token   = "..."        # or DNSIMPLE_TOKEN
//! account = "1010"       # or DNSIMPLE_ACCOUNT
//! sandbox = true         # or DNSIMPLE_SANDBOX
//!
//! [server]
//! listen = "127.0.0.1:0" # or DNSIMPLE_SERVER_LISTEN
//! ```

use anyhow::Result;
use config::builder::{ConfigBuilder, DefaultState};
use config::{Config, File};
use serde::Deserialize;
use std::{env, path::Path};
use validator::Validate;

const ENV_PREFIX: &str = "DNSIMPLE_";

/// Variables read by the CLI itself; never treated as config keys.
const ENV_SKIP: &[&str] = &["LOG", "PROVIDER_CONFIG"];

/*──────── Provider ────────*/
#[derive(Debug, Clone, Default, Deserialize, Validate)]
pub struct ProviderCfg {
    #[serde(default)]
    #[validate(length(min = 1, message = "a DNSimple API token is required"))]
    pub token: String,
    #[serde(default)]
    #[validate(length(min = 1, message = "a DNSimple account identifier is required"))]
    pub account: String,
    /// talk to api.sandbox.dnsimple.com
    #[serde(default)]
    pub sandbox: bool,
    /// appended to the client's user agent
    #[serde(default)]
    pub user_agent: Option<String>,
    /// overrides the API endpoint entirely; wins over `sandbox`
    #[serde(default)]
    pub base_url: Option<String>,
}

impl ProviderCfg {
    pub fn api_base_url(&self) -> &str {
        self.base_url
            .as_deref()
            .unwrap_or_else(|| dnsimple_client::base_url(self.sandbox))
    }
}

/*──────── Server ────────*/
#[derive(Debug, Clone, Deserialize, Validate)]
pub struct ServerCfg {
    /// listening address; port 0 picks a free one
    #[serde(default = "default_listen")]
    #[validate(length(min = 1))]
    pub listen: String,
    /// restrict to private/loopback peers; default `true`
    #[serde(default = "default_true")]
    pub intranet_only: bool,
    /// when set, every call must carry `Authorization: Bearer <token>`
    #[serde(default)]
    pub auth_token: Option<String>,
}
fn default_listen() -> String {
    "127.0.0.1:0".to_string()
}
fn default_true() -> bool {
    true
}

impl Default for ServerCfg {
    fn default() -> Self {
        Self {
            listen: default_listen(),
            intranet_only: true,
            auth_token: None,
        }
    }
}

/*──────── Root & AppConfig ────────*/
#[derive(Debug, Deserialize)]
struct Root {
    #[serde(flatten)]
    provider: ProviderCfg,
    #[serde(default)]
    server: Option<ServerCfg>,
}

#[derive(Debug, Clone, Default)]
pub struct AppConfig {
    pub provider: ProviderCfg,
    pub server: ServerCfg,
}

/// Convert a raw environment value into a `toml::Value`.
///
/// * `"true"` / `"false"`  → `Boolean`
/// * valid integer         → `Integer` (`i64`)
/// * valid float           → `Float` (`f64`)
/// * everything else       → `String`
fn parse_val(raw: &str) -> toml::Value {
    let lower = raw.to_ascii_lowercase();
    if lower == "true" || lower == "false" {
        toml::Value::Boolean(lower == "true")
    } else if let Ok(i) = raw.parse::<i64>() {
        toml::Value::Integer(i)
    } else if let Ok(f) = raw.parse::<f64>() {
        toml::Value::Float(f)
    } else {
        toml::Value::String(raw.to_owned())
    }
}

/// Map an env key (prefix stripped) to a config path.
///
/// `SERVER_INTRANET_ONLY` → `server.intranet_only`, `USER_AGENT` → `user_agent`.
fn env_key_to_path(key: &str) -> String {
    let lower = key.to_ascii_lowercase();
    match lower.strip_prefix("server_") {
        Some(rest) => format!("server.{rest}"),
        None => lower,
    }
}

/// Inject `DNSIMPLE_*` environment variables into a `ConfigBuilder`.
fn add_env(
    mut b: ConfigBuilder<DefaultState>,
    vars: impl Iterator<Item = (String, String)>,
) -> Result<ConfigBuilder<DefaultState>> {
    for (k, v) in vars {
        let Some(key) = k.strip_prefix(ENV_PREFIX) else {
            continue;
        };
        if ENV_SKIP.contains(&key) {
            continue;
        }
        let path = env_key_to_path(key);
        // tokens and account ids stay strings even when they look numeric
        let val = match path.as_str() {
            "token" | "account" | "user_agent" | "base_url" | "server.auth_token" => {
                toml::Value::String(v)
            }
            _ => parse_val(&v),
        };
        match val {
            toml::Value::Boolean(bv) => b = b.set_override(path, bv)?,
            toml::Value::Integer(iv) => b = b.set_override(path, iv)?,
            toml::Value::Float(fv) => b = b.set_override(path, fv)?,
            toml::Value::String(sv) => b = b.set_override(path, sv)?,
            _ => unreachable!("only scalar types appear here"),
        }
    }
    Ok(b)
}

fn load_from(path: &str, vars: impl Iterator<Item = (String, String)>) -> Result<AppConfig> {
    // 1) start with the optional file
    let mut builder = Config::builder();
    if Path::new(path).exists() {
        builder = builder.add_source(File::with_name(path).required(true));
    } else {
        tracing::info!("config file `{path}` not found; environment-only mode");
    }

    // 2) apply env overrides
    builder = add_env(builder, vars)?;

    // 3) deserialize and lift into AppConfig
    let root: Root = builder.build()?.try_deserialize()?;
    let cfg = AppConfig {
        provider: root.provider,
        server: root.server.unwrap_or_default(),
    };

    // provider credentials may still arrive from the host at configure time
    cfg.server.validate().map_err(crate::error::ConfigError::from)?;
    Ok(cfg)
}

/// Load configuration from an optional TOML file **and** environment variables.
///
/// Priority (high → low):
/// 1. Environment (`DNSIMPLE_TOKEN`, `DNSIMPLE_SERVER_LISTEN`, …)
/// 2. Values in `tf-dnsimple.toml` (if the file exists)
///
/// The provider block sent by the host at configure time overrides both.
pub fn load_config(path: &str) -> Result<AppConfig> {
    load_from(path, env::vars())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    fn vars(list: &[(&str, &str)]) -> impl Iterator<Item = (String, String)> {
        list.iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect::<Vec<_>>()
            .into_iter()
    }

    #[test]
    fn parse_val_types() {
        assert_eq!(parse_val("TRUE"), toml::Value::Boolean(true));
        assert_eq!(parse_val("8080"), toml::Value::Integer(8080));
        assert_eq!(parse_val("x.y"), toml::Value::String("x.y".into()));
    }

    #[test]
    fn env_paths() {
        assert_eq!(env_key_to_path("SERVER_INTRANET_ONLY"), "server.intranet_only");
        assert_eq!(env_key_to_path("USER_AGENT"), "user_agent");
        assert_eq!(env_key_to_path("TOKEN"), "token");
    }

    #[test]
    fn file_then_env() {
        let mut f = tempfile::Builder::new().suffix(".toml").tempfile().unwrap();
        writeln!(
            f,
            "token = \"file-token\"\naccount = \"1010\"\n\n[server]\nlisten = \"127.0.0.1:9000\""
        )
        .unwrap();
        let path = f.path().to_str().unwrap();

        let cfg = load_from(
            path,
            vars(&[
                ("DNSIMPLE_TOKEN", "env-token"),
                ("DNSIMPLE_SANDBOX", "true"),
                ("DNSIMPLE_SERVER_INTRANET_ONLY", "false"),
                ("DNSIMPLE_LOG", "debug"),
                ("HOME", "/root"),
            ]),
        )
        .unwrap();

        assert_eq!(cfg.provider.token, "env-token");
        assert_eq!(cfg.provider.account, "1010");
        assert!(cfg.provider.sandbox);
        assert_eq!(cfg.provider.api_base_url(), dnsimple_client::SANDBOX_API);
        assert_eq!(cfg.server.listen, "127.0.0.1:9000");
        assert!(!cfg.server.intranet_only);
    }

    #[test]
    fn numeric_account_stays_string() {
        let cfg = load_from(
            "/nonexistent/tf-dnsimple.toml",
            vars(&[("DNSIMPLE_ACCOUNT", "1010"), ("DNSIMPLE_TOKEN", "123")]),
        )
        .unwrap();
        assert_eq!(cfg.provider.account, "1010");
        assert_eq!(cfg.provider.token, "123");
        assert_eq!(cfg.server.listen, "127.0.0.1:0");
        assert_eq!(cfg.provider.api_base_url(), dnsimple_client::PRODUCTION_API);
    }

    #[test]
    fn empty_env_is_defaults() {
        let cfg = load_from("/nonexistent/tf-dnsimple.toml", vars(&[])).unwrap();
        assert!(cfg.provider.token.is_empty());
        assert!(cfg.provider.validate().is_err());
        assert!(cfg.server.intranet_only);
    }
}
