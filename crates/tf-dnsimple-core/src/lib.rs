//! tf-dnsimple-core – provider wiring
//!
//! * [`cfg`] loads file / env configuration.
//! * [`provider`] configures the DNSimple client once and dispatches lifecycle calls.
//! * [`http`] exposes the provider to the host over loopback HTTP.

pub mod cfg;
pub mod error;
pub mod http;
pub mod provider;
pub mod resources;

use anyhow::Result;
use cfg::AppConfig;
use provider::DnsimpleProvider;
use std::sync::Arc;

/// Builds the provider from `cfg` and serves it until shutdown.
pub async fn bootstrap(cfg: AppConfig) -> Result<()> {
    let provider = Arc::new(DnsimpleProvider::new(cfg.provider));
    http::run_plugin_server(provider, cfg.server).await
}

pub use cfg::load_config;
pub use provider::{PROVIDER_TYPE_NAME, ProviderConfig};
