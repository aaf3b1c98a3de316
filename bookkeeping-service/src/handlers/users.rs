use crate::dtos::{AddMemberRequest, ChangeRoleRequest};
use crate::handlers::fail;
use crate::middleware::CompanyContext;
use crate::models::CompanyUser;
use crate::startup::AppState;
use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};
use serde_json::{json, Value};
use service_core::error::AppError;
use uuid::Uuid;
use validator::Validate;

#[tracing::instrument(skip(state, ctx), fields(company_id = %ctx.company_id))]
pub async fn list_members(
    State(state): State<AppState>,
    ctx: CompanyContext,
) -> Result<Json<Vec<CompanyUser>>, AppError> {
    let members = state
        .users
        .list_members(ctx.company_id)
        .await
        .map_err(fail("list_members"))?;
    Ok(Json(members))
}

#[tracing::instrument(skip(state, ctx, request), fields(company_id = %ctx.company_id, role = %request.role))]
pub async fn add_member(
    State(state): State<AppState>,
    ctx: CompanyContext,
    Json(request): Json<AddMemberRequest>,
) -> Result<(StatusCode, Json<CompanyUser>), AppError> {
    ctx.require_admin()?;
    request.validate()?;

    let member = state
        .users
        .add_member(ctx.company_id, &request.user_email, request.role)
        .await
        .map_err(fail("add_member"))?;
    Ok((StatusCode::CREATED, Json(member)))
}

#[tracing::instrument(skip(state, ctx, request), fields(company_id = %ctx.company_id, member_id = %member_id))]
pub async fn change_member_role(
    State(state): State<AppState>,
    ctx: CompanyContext,
    Path(member_id): Path<Uuid>,
    Json(request): Json<ChangeRoleRequest>,
) -> Result<Json<CompanyUser>, AppError> {
    ctx.require_admin()?;

    let member = state
        .users
        .change_role(ctx.company_id, member_id, request.role)
        .await
        .map_err(fail("change_member_role"))?;
    Ok(Json(member))
}

#[tracing::instrument(skip(state, ctx), fields(company_id = %ctx.company_id, member_id = %member_id))]
pub async fn remove_member(
    State(state): State<AppState>,
    ctx: CompanyContext,
    Path(member_id): Path<Uuid>,
) -> Result<Json<Value>, AppError> {
    ctx.require_admin()?;

    state
        .users
        .remove_member(ctx.company_id, member_id)
        .await
        .map_err(fail("remove_member"))?;
    Ok(Json(json!({ "success": true })))
}
