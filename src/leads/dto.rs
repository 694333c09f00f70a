use serde::{Deserialize, Serialize};
use time::OffsetDateTime;

use crate::leads::repo::Lead;
use crate::leads::temperature::Temperature;

/// Body for manual lead creation. Every field defaults so a missing key
/// reaches the validation check instead of failing deserialization.
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct CreateLeadRequest {
    pub first_name: String,
    pub last_name: String,
    pub phone: String,
    pub observations: String,
    pub answered_whatsapp: bool,
    pub answered_phone: bool,
    pub demo_scheduled: bool,
}

/// Body for a partial update. `None` leaves the stored value alone; there
/// is no way to reset a field through this endpoint.
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct UpdateLeadRequest {
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub phone: Option<String>,
    pub observations: Option<String>,
    pub answered_whatsapp: Option<bool>,
    pub answered_phone: Option<bool>,
    pub demo_scheduled: Option<bool>,
    pub status: Option<String>,
}

/// Bulk import body. `leads` stays a raw JSON value because rows arrive
/// with arbitrary spreadsheet headers; normalization sorts them out.
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct BulkImportRequest {
    pub leads: serde_json::Value,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct BulkDeleteRequest {
    pub ids: Vec<i64>,
}

/// Lead as clients see it: the stored row plus the read-time temperature.
#[derive(Debug, Serialize)]
pub struct LeadResponse {
    #[serde(flatten)]
    pub lead: Lead,
    pub temperature: Temperature,
}

impl LeadResponse {
    pub fn annotate(lead: Lead, now: OffsetDateTime) -> Self {
        let temperature = lead.temperature(now);
        Self { lead, temperature }
    }
}

#[derive(Debug, Serialize)]
pub struct SuccessResponse {
    pub success: bool,
}

#[derive(Debug, Serialize)]
pub struct BulkImportResponse {
    pub success: bool,
    pub count: u64,
}
