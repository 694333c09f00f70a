use tracing::error;

use crate::error::AppError;
use crate::leads::repo::Lead;

/// Export columns, in table order. The derived temperature is left out on
/// purpose: it depends on a read-time clock and would go stale in the file.
const HEADERS: [&str; 11] = [
    "id",
    "first_name",
    "last_name",
    "phone",
    "created_at",
    "answered_whatsapp",
    "answered_phone",
    "demo_scheduled",
    "observations",
    "assigned_to",
    "status",
];

/// Serialize leads to CSV, one row per lead plus a header row. The header
/// uses the canonical column names, so the file can be fed straight back
/// into the bulk import.
pub fn to_csv(leads: &[Lead]) -> Result<String, AppError> {
    let mut writer = csv::WriterBuilder::new()
        .has_headers(false)
        .from_writer(Vec::new());

    writer.write_record(HEADERS).map_err(|e| {
        error!(error = %e, "csv header write error");
        AppError::Internal
    })?;

    for lead in leads {
        writer.serialize(lead).map_err(|e| {
            error!(error = %e, lead_id = lead.id, "csv row write error");
            AppError::Internal
        })?;
    }

    let bytes = writer.into_inner().map_err(|e| {
        error!(error = %e, "csv flush error");
        AppError::Internal
    })?;
    String::from_utf8(bytes).map_err(|e| {
        error!(error = %e, "csv produced invalid utf-8");
        AppError::Internal
    })
}
