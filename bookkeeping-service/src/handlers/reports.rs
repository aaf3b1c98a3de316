use crate::dtos::VatParams;
use crate::handlers::fail;
use crate::middleware::CompanyContext;
use crate::services::reports::{BalanceSheet, Dashboard, IncomeStatement, VatReport};
use crate::startup::AppState;
use axum::{
    extract::{Query, State},
    Json,
};
use service_core::error::AppError;

#[tracing::instrument(skip(state, ctx), fields(company_id = %ctx.company_id))]
pub async fn dashboard(
    State(state): State<AppState>,
    ctx: CompanyContext,
) -> Result<Json<Dashboard>, AppError> {
    let report = state
        .reports
        .dashboard(ctx.company_id)
        .await
        .map_err(fail("dashboard"))?;
    Ok(Json(report))
}

#[tracing::instrument(skip(state, ctx), fields(company_id = %ctx.company_id))]
pub async fn income_statement(
    State(state): State<AppState>,
    ctx: CompanyContext,
) -> Result<Json<IncomeStatement>, AppError> {
    let report = state
        .reports
        .income_statement(ctx.company_id)
        .await
        .map_err(fail("income_statement"))?;
    Ok(Json(report))
}

#[tracing::instrument(skip(state, ctx), fields(company_id = %ctx.company_id))]
pub async fn balance_sheet(
    State(state): State<AppState>,
    ctx: CompanyContext,
) -> Result<Json<BalanceSheet>, AppError> {
    let report = state
        .reports
        .balance_sheet(ctx.company_id)
        .await
        .map_err(fail("balance_sheet"))?;
    Ok(Json(report))
}

#[tracing::instrument(skip(state, ctx), fields(company_id = %ctx.company_id, year = ?params.year))]
pub async fn vat_report(
    State(state): State<AppState>,
    ctx: CompanyContext,
    Query(params): Query<VatParams>,
) -> Result<Json<VatReport>, AppError> {
    let report = state
        .reports
        .vat_report(ctx.company_id, params.year)
        .await
        .map_err(fail("vat_report"))?;
    Ok(Json(report))
}
