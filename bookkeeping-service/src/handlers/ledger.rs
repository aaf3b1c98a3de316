use crate::dtos::{EntryCreatedResponse, ManualEntryRequest, RecentParams};
use crate::handlers::fail;
use crate::middleware::CompanyContext;
use crate::services::reports::{LedgerRow, RecentActivity};
use crate::startup::AppState;
use axum::{
    extract::{Query, State},
    http::StatusCode,
    Json,
};
use service_core::error::AppError;
use validator::Validate;

const MAX_RECENT_LIMIT: usize = 100;

#[tracing::instrument(skip(state, ctx), fields(company_id = %ctx.company_id))]
pub async fn list_ledger(
    State(state): State<AppState>,
    ctx: CompanyContext,
) -> Result<Json<Vec<LedgerRow>>, AppError> {
    let rows = state
        .reports
        .list_ledger(ctx.company_id)
        .await
        .map_err(fail("list_ledger"))?;
    Ok(Json(rows))
}

#[tracing::instrument(skip(state, ctx), fields(company_id = %ctx.company_id))]
pub async fn recent_activity(
    State(state): State<AppState>,
    ctx: CompanyContext,
    Query(params): Query<RecentParams>,
) -> Result<Json<Vec<RecentActivity>>, AppError> {
    let limit = params.limit.clamp(1, MAX_RECENT_LIMIT);
    let rows = state
        .reports
        .recent_entries(ctx.company_id, limit)
        .await
        .map_err(fail("recent_entries"))?;
    Ok(Json(rows))
}

#[tracing::instrument(skip(state, ctx, request), fields(company_id = %ctx.company_id))]
pub async fn post_manual_entry(
    State(state): State<AppState>,
    ctx: CompanyContext,
    Json(request): Json<ManualEntryRequest>,
) -> Result<(StatusCode, Json<EntryCreatedResponse>), AppError> {
    ctx.require_editor()?;
    request.validate()?;

    let entry_id = state
        .posting
        .post_manual_entry(
            ctx.company_id,
            request.date,
            request.description,
            request.lines,
        )
        .await
        .map_err(fail("post_manual_entry"))?;

    Ok((StatusCode::CREATED, Json(EntryCreatedResponse::new(entry_id))))
}
