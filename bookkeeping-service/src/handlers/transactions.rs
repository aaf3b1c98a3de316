use crate::dtos::{
    CreateExpenseRequest, CreateIncomeRequest, CreateInvoiceRequest, EntryCreatedResponse,
    PayInvoiceRequest,
};
use crate::handlers::fail;
use crate::middleware::CompanyContext;
use crate::models::{CreateInvoice, Invoice};
use crate::services::{ExpenseRow, IssuedInvoice};
use crate::startup::AppState;
use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};
use service_core::error::AppError;
use uuid::Uuid;
use validator::Validate;

// -----------------------------------------------------------------------------
// Expenses
// -----------------------------------------------------------------------------

#[tracing::instrument(skip(state, ctx, request), fields(company_id = %ctx.company_id))]
pub async fn create_expense(
    State(state): State<AppState>,
    ctx: CompanyContext,
    Json(request): Json<CreateExpenseRequest>,
) -> Result<(StatusCode, Json<EntryCreatedResponse>), AppError> {
    ctx.require_editor()?;
    request.validate()?;

    let entry_id = state
        .documents
        .record_expense(ctx.company_id, request.into())
        .await
        .map_err(fail("record_expense"))?;

    Ok((StatusCode::CREATED, Json(EntryCreatedResponse::new(entry_id))))
}

#[tracing::instrument(skip(state, ctx), fields(company_id = %ctx.company_id))]
pub async fn list_expenses(
    State(state): State<AppState>,
    ctx: CompanyContext,
) -> Result<Json<Vec<ExpenseRow>>, AppError> {
    let rows = state
        .documents
        .list_expenses(ctx.company_id)
        .await
        .map_err(fail("list_expenses"))?;
    Ok(Json(rows))
}

// -----------------------------------------------------------------------------
// Income
// -----------------------------------------------------------------------------

#[tracing::instrument(skip(state, ctx, request), fields(company_id = %ctx.company_id))]
pub async fn create_income(
    State(state): State<AppState>,
    ctx: CompanyContext,
    Json(request): Json<CreateIncomeRequest>,
) -> Result<(StatusCode, Json<EntryCreatedResponse>), AppError> {
    ctx.require_editor()?;
    request.validate()?;

    let entry_id = state
        .documents
        .record_income(ctx.company_id, request.into())
        .await
        .map_err(fail("record_income"))?;

    Ok((StatusCode::CREATED, Json(EntryCreatedResponse::new(entry_id))))
}

// -----------------------------------------------------------------------------
// Invoices
// -----------------------------------------------------------------------------

#[tracing::instrument(skip(state, ctx, request), fields(company_id = %ctx.company_id, invoice_number = %request.invoice_number))]
pub async fn create_invoice(
    State(state): State<AppState>,
    ctx: CompanyContext,
    Json(request): Json<CreateInvoiceRequest>,
) -> Result<(StatusCode, Json<IssuedInvoice>), AppError> {
    ctx.require_editor()?;
    request.validate()?;

    let input = CreateInvoice {
        company_id: ctx.company_id,
        customer_id: request.customer_id,
        customer_name: request.customer_name,
        invoice_number: request.invoice_number,
        date: request.date,
        subtotal: request.subtotal,
        vat: request.vat,
        total: request.total,
        payload: request.payload,
    };

    let issued = state
        .documents
        .issue_invoice(input)
        .await
        .map_err(fail("issue_invoice"))?;

    Ok((StatusCode::CREATED, Json(issued)))
}

#[tracing::instrument(skip(state, ctx, request), fields(company_id = %ctx.company_id, invoice_id = %invoice_id))]
pub async fn pay_invoice(
    State(state): State<AppState>,
    ctx: CompanyContext,
    Path(invoice_id): Path<Uuid>,
    Json(request): Json<PayInvoiceRequest>,
) -> Result<Json<Invoice>, AppError> {
    ctx.require_editor()?;

    let invoice = state
        .documents
        .pay_invoice(ctx.company_id, invoice_id, request.amount)
        .await
        .map_err(fail("pay_invoice"))?;

    Ok(Json(invoice))
}

#[tracing::instrument(skip(state, ctx), fields(company_id = %ctx.company_id))]
pub async fn list_invoices(
    State(state): State<AppState>,
    ctx: CompanyContext,
) -> Result<Json<Vec<Invoice>>, AppError> {
    let invoices = state
        .documents
        .list_invoices(ctx.company_id)
        .await
        .map_err(fail("list_invoices"))?;
    Ok(Json(invoices))
}
