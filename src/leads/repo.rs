use serde::{Deserialize, Serialize};
use sqlx::{FromRow, SqlitePool};
use time::OffsetDateTime;

use crate::error::AppError;
use crate::leads::dto::UpdateLeadRequest;
use crate::leads::temperature::{temperature_for, Temperature};

/// Persisted lead row. `temperature` is deliberately absent; it is derived
/// at read time from `created_at` and `status`.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Lead {
    pub id: i64,
    pub first_name: String,
    pub last_name: String,
    pub phone: String,
    #[serde(with = "time::serde::rfc3339")]
    pub created_at: OffsetDateTime,
    pub answered_whatsapp: bool,
    pub answered_phone: bool,
    pub demo_scheduled: bool,
    pub observations: String,
    pub assigned_to: Option<i64>,
    pub status: Option<String>,
}

impl Lead {
    pub fn temperature(&self, now: OffsetDateTime) -> Temperature {
        temperature_for(self.status.as_deref(), self.created_at, now)
    }
}

/// Fields for a lead insert, after defaults have been applied. Both the
/// manual create path and the bulk import build one of these per row.
#[derive(Debug, Clone)]
pub struct NewLead {
    pub first_name: String,
    pub last_name: String,
    pub phone: String,
    pub observations: String,
    pub created_at: OffsetDateTime,
    pub answered_whatsapp: bool,
    pub answered_phone: bool,
    pub demo_scheduled: bool,
    pub assigned_to: Option<i64>,
    pub status: Option<String>,
}

const LEAD_COLUMNS: &str = "id, first_name, last_name, phone, created_at, \
     answered_whatsapp, answered_phone, demo_scheduled, observations, assigned_to, status";

/// All leads, newest first. Every caller role sees the same set.
pub async fn list_all(db: &SqlitePool) -> Result<Vec<Lead>, AppError> {
    let rows = sqlx::query_as::<_, Lead>(&format!(
        "SELECT {LEAD_COLUMNS} FROM leads ORDER BY created_at DESC, id DESC"
    ))
    .fetch_all(db)
    .await?;
    Ok(rows)
}

/// All leads in id order, for a stable export file.
pub async fn list_for_export(db: &SqlitePool) -> Result<Vec<Lead>, AppError> {
    let rows = sqlx::query_as::<_, Lead>(&format!(
        "SELECT {LEAD_COLUMNS} FROM leads ORDER BY id ASC"
    ))
    .fetch_all(db)
    .await?;
    Ok(rows)
}

pub async fn insert(db: &SqlitePool, new: &NewLead) -> Result<Lead, AppError> {
    let lead = sqlx::query_as::<_, Lead>(&format!(
        "INSERT INTO leads (first_name, last_name, phone, created_at, \
         answered_whatsapp, answered_phone, demo_scheduled, observations, assigned_to, status) \
         VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?) \
         RETURNING {LEAD_COLUMNS}"
    ))
    .bind(&new.first_name)
    .bind(&new.last_name)
    .bind(&new.phone)
    .bind(new.created_at)
    .bind(new.answered_whatsapp)
    .bind(new.answered_phone)
    .bind(new.demo_scheduled)
    .bind(&new.observations)
    .bind(new.assigned_to)
    .bind(&new.status)
    .fetch_one(db)
    .await?;
    Ok(lead)
}

/// Apply only the fields present in the patch; absent fields keep their
/// stored value. `created_at`, `assigned_to` and `id` are never touched by
/// an update.
pub async fn update_partial(
    db: &SqlitePool,
    id: i64,
    patch: &UpdateLeadRequest,
) -> Result<(), AppError> {
    let result = sqlx::query(
        r#"
        UPDATE leads SET
            first_name = COALESCE(?, first_name),
            last_name = COALESCE(?, last_name),
            phone = COALESCE(?, phone),
            observations = COALESCE(?, observations),
            answered_whatsapp = COALESCE(?, answered_whatsapp),
            answered_phone = COALESCE(?, answered_phone),
            demo_scheduled = COALESCE(?, demo_scheduled),
            status = COALESCE(?, status)
        WHERE id = ?
        "#,
    )
    .bind(&patch.first_name)
    .bind(&patch.last_name)
    .bind(&patch.phone)
    .bind(&patch.observations)
    .bind(patch.answered_whatsapp)
    .bind(patch.answered_phone)
    .bind(patch.demo_scheduled)
    .bind(&patch.status)
    .bind(id)
    .execute(db)
    .await?;

    if result.rows_affected() == 0 {
        return Err(AppError::NotFound("Lead not found".into()));
    }
    Ok(())
}

/// Insert a batch of rows inside one transaction. Any failure rolls the
/// whole batch back, so a partial import is never observable.
pub async fn bulk_insert(db: &SqlitePool, rows: &[NewLead]) -> Result<u64, AppError> {
    let mut tx = db.begin().await?;
    for row in rows {
        sqlx::query(
            "INSERT INTO leads (first_name, last_name, phone, created_at, \
             answered_whatsapp, answered_phone, demo_scheduled, observations, assigned_to, status) \
             VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?)",
        )
        .bind(&row.first_name)
        .bind(&row.last_name)
        .bind(&row.phone)
        .bind(row.created_at)
        .bind(row.answered_whatsapp)
        .bind(row.answered_phone)
        .bind(row.demo_scheduled)
        .bind(&row.observations)
        .bind(row.assigned_to)
        .bind(&row.status)
        .execute(&mut *tx)
        .await?;
    }
    tx.commit().await?;
    Ok(rows.len() as u64)
}

/// Delete the given ids. Ids with no matching row are ignored; returns how
/// many rows actually went away.
pub async fn delete_ids(db: &SqlitePool, ids: &[i64]) -> Result<u64, AppError> {
    let mut tx = db.begin().await?;
    let mut deleted = 0;
    for id in ids {
        let result = sqlx::query("DELETE FROM leads WHERE id = ?")
            .bind(id)
            .execute(&mut *tx)
            .await?;
        deleted += result.rows_affected();
    }
    tx.commit().await?;
    Ok(deleted)
}
