use crate::dtos::{CreateAccountRequest, CreateCompanyRequest, SeedResponse};
use crate::handlers::fail;
use crate::middleware::{CompanyContext, UserId};
use crate::models::{Account, Company};
use crate::startup::AppState;
use axum::{extract::State, http::StatusCode, Json};
use service_core::error::AppError;
use validator::Validate;

/// Onboard a company: company row plus its default chart.
#[tracing::instrument(skip(state, request), fields(user_id = %user_id.0))]
pub async fn create_company(
    State(state): State<AppState>,
    user_id: UserId,
    Json(request): Json<CreateCompanyRequest>,
) -> Result<(StatusCode, Json<Company>), AppError> {
    request.validate()?;

    let company = state
        .settings
        .create_company(&request.name)
        .await
        .map_err(fail("create_company"))?;

    Ok((StatusCode::CREATED, Json(company)))
}

#[tracing::instrument(skip(state, ctx), fields(company_id = %ctx.company_id))]
pub async fn get_company(
    State(state): State<AppState>,
    ctx: CompanyContext,
) -> Result<Json<Company>, AppError> {
    let company = state
        .settings
        .get_company(ctx.company_id)
        .await
        .map_err(fail("get_company"))?;
    Ok(Json(company))
}

#[tracing::instrument(skip(state, ctx), fields(company_id = %ctx.company_id))]
pub async fn list_accounts(
    State(state): State<AppState>,
    ctx: CompanyContext,
) -> Result<Json<Vec<Account>>, AppError> {
    let accounts = state
        .chart
        .list_accounts(ctx.company_id)
        .await
        .map_err(fail("list_accounts"))?;
    Ok(Json(accounts))
}

#[tracing::instrument(skip(state, ctx, request), fields(company_id = %ctx.company_id, code = request.code))]
pub async fn create_account(
    State(state): State<AppState>,
    ctx: CompanyContext,
    Json(request): Json<CreateAccountRequest>,
) -> Result<(StatusCode, Json<Account>), AppError> {
    ctx.require_editor()?;
    request.validate()?;

    let account = state
        .chart
        .create_account(ctx.company_id, request.into())
        .await
        .map_err(fail("create_account"))?;

    Ok((StatusCode::CREATED, Json(account)))
}

/// Re-seed the default chart. Existing codes are kept as they are.
#[tracing::instrument(skip(state, ctx), fields(company_id = %ctx.company_id))]
pub async fn init_accounts(
    State(state): State<AppState>,
    ctx: CompanyContext,
) -> Result<Json<SeedResponse>, AppError> {
    ctx.require_editor()?;

    let accounts = state
        .chart
        .seed_defaults(ctx.company_id)
        .await
        .map_err(fail("seed_defaults"))?;

    Ok(Json(SeedResponse {
        company_id: ctx.company_id,
        accounts: accounts.len(),
    }))
}
