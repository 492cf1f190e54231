//! Zone payloads as returned by `/v2/{account}/zones` and
//! `/v2/{account}/secondary_dns/zones`.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Zone {
    pub id: i64,
    #[serde(default)]
    pub account_id: i64,
    pub name: String,
    #[serde(default)]
    pub reverse: bool,
    #[serde(default)]
    pub secondary: bool,
    #[serde(default)]
    pub last_transferred_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub active: bool,
    #[serde(default)]
    pub created_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub updated_at: Option<DateTime<Utc>>,
}

/// A zone promoted to secondary DNS. The API returns the plain zone shape.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SecondaryZone {
    #[serde(flatten)]
    pub zone: Zone,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct SecondaryZoneRequest {
    pub name: String,
}

/// `{"data": ...}` envelope around every successful response.
#[derive(Debug, Deserialize)]
pub(crate) struct Envelope<T> {
    pub data: T,
}
