use serde_json::Value;
use time::format_description::well_known::Rfc3339;
use time::macros::format_description;
use time::{Date, OffsetDateTime, PrimitiveDateTime, UtcOffset};

use crate::leads::repo::NewLead;

/// Header aliases accepted for each normalized column, in priority order:
/// Spanish spreadsheet headers first, then English, then the canonical
/// column name. The first alias with a usable value wins.
const FIRST_NAME_ALIASES: [&str; 3] = ["Nombre", "First Name", "first_name"];
const LAST_NAME_ALIASES: [&str; 3] = ["Apellido", "Last Name", "last_name"];
const PHONE_ALIASES: [&str; 3] = ["Telefono", "Phone", "phone"];
const OBSERVATIONS_ALIASES: [&str; 3] = ["Observaciones", "Notes", "observations"];
const CREATED_AT_ALIASES: [&str; 2] = ["Fecha", "created_at"];

const DEFAULT_FIRST_NAME: &str = "Agente";

/// Shape one spreadsheet-ish row into an insertable lead. Rows are never
/// rejected: missing or unusable cells fall back to the service defaults,
/// and a row that is not even an object becomes an all-defaults lead.
pub fn normalize_row(row: &Value, now: OffsetDateTime) -> NewLead {
    let created_at = first_match(row, &CREATED_AT_ALIASES)
        .and_then(|raw| parse_created_at(&raw))
        .unwrap_or(now);

    NewLead {
        first_name: first_match(row, &FIRST_NAME_ALIASES)
            .unwrap_or_else(|| DEFAULT_FIRST_NAME.to_string()),
        last_name: first_match(row, &LAST_NAME_ALIASES).unwrap_or_default(),
        phone: first_match(row, &PHONE_ALIASES).unwrap_or_default(),
        observations: first_match(row, &OBSERVATIONS_ALIASES).unwrap_or_default(),
        created_at,
        answered_whatsapp: flag_value(row, "answered_whatsapp").unwrap_or(false),
        answered_phone: flag_value(row, "answered_phone").unwrap_or(false),
        demo_scheduled: flag_value(row, "demo_scheduled").unwrap_or(false),
        assigned_to: assignee_value(row),
        status: row.get("status").and_then(text_value),
    }
}

pub fn normalize_rows(rows: &[Value], now: OffsetDateTime) -> Vec<NewLead> {
    rows.iter().map(|row| normalize_row(row, now)).collect()
}

/// First alias whose cell holds usable text. An empty string does not
/// count, so `{"Nombre": "", "First Name": "Ana"}` still resolves to Ana.
fn first_match(row: &Value, aliases: &[&str]) -> Option<String> {
    aliases
        .iter()
        .find_map(|key| row.get(*key).and_then(text_value))
}

/// Cell to text. Numbers are stringified since spreadsheet parsers hand
/// phone columns over as numbers; anything else counts as missing.
fn text_value(value: &Value) -> Option<String> {
    match value {
        Value::String(s) if !s.is_empty() => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        _ => None,
    }
}

fn flag_value(row: &Value, key: &str) -> Option<bool> {
    match row.get(key)? {
        Value::Bool(b) => Some(*b),
        Value::Number(n) => Some(n.as_f64().map_or(false, |v| v != 0.0)),
        Value::String(s) => Some(matches!(s.as_str(), "1" | "true" | "True" | "TRUE")),
        _ => None,
    }
}

fn assignee_value(row: &Value) -> Option<i64> {
    match row.get("assigned_to")? {
        Value::Number(n) => n.as_i64(),
        Value::String(s) => s.parse().ok(),
        _ => None,
    }
}

/// Parse a creation timestamp from the formats files actually contain:
/// RFC 3339, SQLite-style `YYYY-MM-DD HH:MM:SS`, or a bare date. Anything
/// else is unusable and the caller falls back to the import time.
fn parse_created_at(raw: &str) -> Option<OffsetDateTime> {
    if let Ok(dt) = OffsetDateTime::parse(raw, &Rfc3339) {
        return Some(dt.to_offset(UtcOffset::UTC));
    }

    let datetime_format = format_description!("[year]-[month]-[day] [hour]:[minute]:[second]");
    if let Ok(dt) = PrimitiveDateTime::parse(raw, &datetime_format) {
        return Some(dt.assume_utc());
    }

    let date_format = format_description!("[year]-[month]-[day]");
    if let Ok(date) = Date::parse(raw, &date_format) {
        return Some(date.midnight().assume_utc());
    }

    None
}
