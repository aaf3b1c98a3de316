use crate::dtos::{PreferencesRequest, TaxSettingsRequest};
use crate::handlers::fail;
use crate::middleware::CompanyContext;
use crate::models::{CompanyPreferences, CompanyTaxSettings};
use crate::startup::AppState;
use axum::{extract::State, Json};
use service_core::error::AppError;
use validator::Validate;

/// Stored tax settings, or `null` when the company never saved any.
#[tracing::instrument(skip(state, ctx), fields(company_id = %ctx.company_id))]
pub async fn get_tax_settings(
    State(state): State<AppState>,
    ctx: CompanyContext,
) -> Result<Json<Option<CompanyTaxSettings>>, AppError> {
    let settings = state
        .settings
        .get_tax_settings(ctx.company_id)
        .await
        .map_err(fail("get_tax_settings"))?;
    Ok(Json(settings))
}

#[tracing::instrument(skip(state, ctx, request), fields(company_id = %ctx.company_id))]
pub async fn save_tax_settings(
    State(state): State<AppState>,
    ctx: CompanyContext,
    Json(request): Json<TaxSettingsRequest>,
) -> Result<Json<CompanyTaxSettings>, AppError> {
    ctx.require_editor()?;

    let settings = state
        .settings
        .save_tax_settings(ctx.company_id, request.into())
        .await
        .map_err(fail("save_tax_settings"))?;
    Ok(Json(settings))
}

#[tracing::instrument(skip(state, ctx), fields(company_id = %ctx.company_id))]
pub async fn get_preferences(
    State(state): State<AppState>,
    ctx: CompanyContext,
) -> Result<Json<Option<CompanyPreferences>>, AppError> {
    let preferences = state
        .settings
        .get_preferences(ctx.company_id)
        .await
        .map_err(fail("get_preferences"))?;
    Ok(Json(preferences))
}

#[tracing::instrument(skip(state, ctx, request), fields(company_id = %ctx.company_id))]
pub async fn save_preferences(
    State(state): State<AppState>,
    ctx: CompanyContext,
    Json(request): Json<PreferencesRequest>,
) -> Result<Json<CompanyPreferences>, AppError> {
    ctx.require_editor()?;
    request.validate()?;

    let preferences = state
        .settings
        .save_preferences(ctx.company_id, request.into())
        .await
        .map_err(fail("save_preferences"))?;
    Ok(Json(preferences))
}
