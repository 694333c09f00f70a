use axum::{
    extract::{Path, State},
    http::header,
    response::IntoResponse,
    routing::{get, post, put},
    Json, Router,
};
use time::OffsetDateTime;
use tracing::{info, instrument};

use crate::{
    auth::jwt::CurrentUser,
    error::AppError,
    leads::{
        dto::{
            BulkDeleteRequest, BulkImportRequest, BulkImportResponse, CreateLeadRequest,
            LeadResponse, SuccessResponse, UpdateLeadRequest,
        },
        export, import, repo,
        repo::NewLead,
    },
    state::AppState,
};

pub fn lead_routes() -> Router<AppState> {
    Router::new()
        .route("/leads", get(list_leads).post(create_lead))
        .route("/leads/:id", put(update_lead))
        .route("/leads/bulk", post(bulk_import))
        .route("/leads/delete", post(bulk_delete))
        .route("/leads/export", get(export_leads))
}

/// All leads, newest first, each annotated with its current temperature.
/// Every role sees the same set.
#[instrument(skip(state, user), fields(user_id = user.id))]
pub async fn list_leads(
    State(state): State<AppState>,
    user: CurrentUser,
) -> Result<Json<Vec<LeadResponse>>, AppError> {
    let leads = repo::list_all(&state.db).await?;
    let now = OffsetDateTime::now_utc();
    let annotated = leads
        .into_iter()
        .map(|lead| LeadResponse::annotate(lead, now))
        .collect();
    Ok(Json(annotated))
}

#[instrument(skip(state, user, payload), fields(user_id = user.id))]
pub async fn create_lead(
    State(state): State<AppState>,
    user: CurrentUser,
    Json(payload): Json<CreateLeadRequest>,
) -> Result<Json<LeadResponse>, AppError> {
    if payload.first_name.is_empty() || payload.phone.is_empty() {
        return Err(AppError::Validation("Name and Phone required".into()));
    }

    let new = NewLead {
        first_name: payload.first_name,
        last_name: payload.last_name,
        phone: payload.phone,
        observations: payload.observations,
        created_at: OffsetDateTime::now_utc(),
        answered_whatsapp: payload.answered_whatsapp,
        answered_phone: payload.answered_phone,
        demo_scheduled: payload.demo_scheduled,
        // New leads start out assigned to whoever typed them in.
        assigned_to: Some(user.id),
        status: None,
    };

    let lead = repo::insert(&state.db, &new).await?;
    info!(lead_id = lead.id, "lead created");
    let now = OffsetDateTime::now_utc();
    Ok(Json(LeadResponse::annotate(lead, now)))
}

/// Partial update: only the fields present in the body change, everything
/// else keeps its stored value.
#[instrument(skip(state, user, patch), fields(user_id = user.id))]
pub async fn update_lead(
    State(state): State<AppState>,
    user: CurrentUser,
    Path(id): Path<i64>,
    Json(patch): Json<UpdateLeadRequest>,
) -> Result<Json<SuccessResponse>, AppError> {
    repo::update_partial(&state.db, id, &patch).await?;
    info!(lead_id = id, "lead updated");
    Ok(Json(SuccessResponse { success: true }))
}

/// Import a batch of spreadsheet rows. The whole batch commits or none of
/// it does; rows with unmappable cells are defaulted, never dropped.
#[instrument(skip(state, user, payload), fields(user_id = user.id))]
pub async fn bulk_import(
    State(state): State<AppState>,
    user: CurrentUser,
    Json(payload): Json<BulkImportRequest>,
) -> Result<Json<BulkImportResponse>, AppError> {
    let rows = payload
        .leads
        .as_array()
        .ok_or_else(|| AppError::Validation("Invalid format".into()))?;

    let normalized = import::normalize_rows(rows, OffsetDateTime::now_utc());
    let count = repo::bulk_insert(&state.db, &normalized).await?;
    info!(count, "bulk import committed");
    Ok(Json(BulkImportResponse {
        success: true,
        count,
    }))
}

#[instrument(skip(state, user, payload), fields(user_id = user.id))]
pub async fn bulk_delete(
    State(state): State<AppState>,
    user: CurrentUser,
    Json(payload): Json<BulkDeleteRequest>,
) -> Result<Json<SuccessResponse>, AppError> {
    user.require_admin()?;
    let deleted = repo::delete_ids(&state.db, &payload.ids).await?;
    info!(deleted, requested = payload.ids.len(), "bulk delete");
    Ok(Json(SuccessResponse { success: true }))
}

/// Full table as a CSV download.
#[instrument(skip(state, user), fields(user_id = user.id))]
pub async fn export_leads(
    State(state): State<AppState>,
    user: CurrentUser,
) -> Result<impl IntoResponse, AppError> {
    user.require_admin()?;
    let leads = repo::list_for_export(&state.db).await?;
    let csv = export::to_csv(&leads)?;
    info!(count = leads.len(), "leads exported");

    let headers = [
        (header::CONTENT_TYPE, "text/csv; charset=utf-8"),
        (
            header::CONTENT_DISPOSITION,
            "attachment; filename=\"leads.csv\"",
        ),
    ];
    Ok((headers, csv))
}
