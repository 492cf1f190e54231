//! DNSimple v2 API client – only what the provider resources need
//!
//! * Auth via **API token** (`Authorization: Bearer …`), account-scoped paths.
//! * Exposes zone lookup and secondary-zone creation; there is no
//!   "delete secondary zone" endpoint and this client offers no zone deletion.
//! * Non-2xx responses are mapped to [`ApiError`]; no retry, no caching.

mod error;
mod zones;

pub use error::{ApiError, ValidationFailure};
pub use zones::{SecondaryZone, SecondaryZoneRequest, Zone};

use async_trait::async_trait;
use reqwest::{
    Response, Url,
    header::{ACCEPT, AUTHORIZATION, CONTENT_TYPE, HeaderMap, HeaderValue, USER_AGENT},
};
use serde::{Serialize, de::DeserializeOwned};
use std::fmt;
use tracing::{debug, info};
use zones::Envelope;

pub const PRODUCTION_API: &str = "https://api.dnsimple.com";
pub const SANDBOX_API: &str = "https://api.sandbox.dnsimple.com";

pub fn base_url(sandbox: bool) -> &'static str {
    if sandbox { SANDBOX_API } else { PRODUCTION_API }
}

/*──────── remote surface ────────*/

/// The slice of the DNSimple API the secondary-zone resource relies on.
#[async_trait]
pub trait ZoneApi: Send + Sync {
    async fn create_secondary_zone(
        &self,
        account_id: &str,
        req: &SecondaryZoneRequest,
    ) -> Result<SecondaryZone, ApiError>;

    async fn get_zone(&self, account_id: &str, zone: &str) -> Result<Zone, ApiError>;
}

/*──────── client struct ────────*/

pub struct Client {
    base_url: Url,
    client: reqwest::Client,
}

impl fmt::Debug for Client {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Client")
            .field("base_url", &self.base_url.as_str())
            .field("token", &"<REDACTED>")
            .finish()
    }
}

impl Client {
    /// `extra_user_agent` is appended to the default agent string.
    pub fn new(token: &str, base_url: &str, extra_user_agent: Option<&str>) -> anyhow::Result<Self> {
        let mut auth = HeaderValue::from_str(&format!("Bearer {token}"))?;
        auth.set_sensitive(true);

        let mut ua = format!("tf-dnsimple/{}", env!("CARGO_PKG_VERSION"));
        if let Some(extra) = extra_user_agent.filter(|s| !s.is_empty()) {
            ua.push(' ');
            ua.push_str(extra);
        }

        let mut hdr = HeaderMap::new();
        hdr.insert(AUTHORIZATION, auth);
        hdr.insert(USER_AGENT, HeaderValue::from_str(&ua)?);
        hdr.insert(ACCEPT, HeaderValue::from_static("application/json"));
        hdr.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));

        let base_url = Url::parse(base_url)?;
        if base_url.cannot_be_a_base() {
            anyhow::bail!("`{base_url}` cannot be used as an API endpoint");
        }

        Ok(Self {
            base_url,
            client: reqwest::Client::builder().default_headers(hdr).build()?,
        })
    }

    pub fn base_url(&self) -> &str {
        self.base_url.as_str().trim_end_matches('/')
    }

    /// Append `segments` to the base path, percent-encoding each one.
    ///
    /// A value is always exactly one segment: `/`, `?` and `#` are escaped,
    /// and empty, `.` or `..` values are refused.
    fn endpoint(&self, segments: &[&str]) -> Result<Url, ApiError> {
        if let Some(bad) = segments
            .iter()
            .find(|s| s.is_empty() || **s == "." || **s == "..")
        {
            return Err(ApiError::InvalidPath(format!("{bad:?} is not a valid path segment")));
        }
        let mut url = self.base_url.clone();
        url.path_segments_mut()
            .map_err(|_| ApiError::InvalidPath(self.base_url.to_string()))?
            .pop_if_empty()
            .extend(segments);
        Ok(url)
    }

    /*──────── tiny HTTP wrapper ────────*/

    async fn get<T: DeserializeOwned>(&self, segments: &[&str]) -> Result<T, ApiError> {
        let url = self.endpoint(segments)?;
        debug!("dnsimple GET {}", url.path());
        self.check(self.client.get(url).send().await?).await
    }

    async fn post<B: Serialize, T: DeserializeOwned>(
        &self,
        segments: &[&str],
        body: &B,
    ) -> Result<T, ApiError> {
        let url = self.endpoint(segments)?;
        debug!("dnsimple POST {}", url.path());
        self.check(self.client.post(url).json(body).send().await?).await
    }

    async fn check<T: DeserializeOwned>(&self, resp: Response) -> Result<T, ApiError> {
        let status = resp.status();
        if status.is_success() {
            let env: Envelope<T> = resp.json().await?;
            Ok(env.data)
        } else {
            let body = resp.bytes().await?;
            let err = error::decode_error(status, &body);
            debug!("dnsimple request failed: {err}");
            Err(err)
        }
    }
}

/*──────── ZoneApi impl ────────*/

#[async_trait]
impl ZoneApi for Client {
    async fn create_secondary_zone(
        &self,
        account_id: &str,
        req: &SecondaryZoneRequest,
    ) -> Result<SecondaryZone, ApiError> {
        let zone: SecondaryZone = self
            .post(&["v2", account_id, "secondary_dns", "zones"], req)
            .await?;
        info!(
            "DNSimple created secondary zone {} id={}",
            zone.zone.name, zone.zone.id
        );
        Ok(zone)
    }

    async fn get_zone(&self, account_id: &str, zone: &str) -> Result<Zone, ApiError> {
        self.get(&["v2", account_id, "zones", zone]).await
    }
}

/*──────── optional live test (ignored) ────────*/
