use crate::models::account::{CASH, REVENUE};
use crate::models::PostLine;
use crate::services::{ExpenseInput, IncomeInput};
use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;
use validator::Validate;

fn default_cash() -> i32 {
    CASH
}

fn default_revenue() -> i32 {
    REVENUE
}

fn default_recent_limit() -> usize {
    5
}

fn empty_payload() -> serde_json::Value {
    serde_json::json!({})
}

#[derive(Debug, Clone, Deserialize, Validate)]
pub struct CreateExpenseRequest {
    pub date: NaiveDate,
    #[validate(length(min = 1, message = "Description cannot be empty"))]
    pub description: String,
    pub amount: Decimal,
    pub expense_account_code: i32,
    #[serde(default = "default_cash")]
    pub payment_account_code: i32,
}

impl From<CreateExpenseRequest> for ExpenseInput {
    fn from(req: CreateExpenseRequest) -> Self {
        ExpenseInput {
            date: req.date,
            description: req.description,
            amount: req.amount,
            expense_account_code: req.expense_account_code,
            payment_account_code: req.payment_account_code,
        }
    }
}

#[derive(Debug, Clone, Deserialize, Validate)]
pub struct CreateIncomeRequest {
    pub date: NaiveDate,
    #[validate(length(min = 1, message = "Description cannot be empty"))]
    pub description: String,
    pub amount: Decimal,
    #[serde(default = "default_revenue")]
    pub income_account_code: i32,
    #[serde(default = "default_cash")]
    pub payment_account_code: i32,
}

impl From<CreateIncomeRequest> for IncomeInput {
    fn from(req: CreateIncomeRequest) -> Self {
        IncomeInput {
            date: req.date,
            description: req.description,
            amount: req.amount,
            income_account_code: req.income_account_code,
            payment_account_code: req.payment_account_code,
        }
    }
}

#[derive(Debug, Clone, Deserialize, Validate)]
pub struct CreateInvoiceRequest {
    pub customer_id: Option<Uuid>,
    #[validate(length(min = 1, message = "Customer name cannot be empty"))]
    pub customer_name: String,
    #[validate(length(min = 1, max = 64, message = "Invoice number must be 1-64 characters"))]
    pub invoice_number: String,
    pub date: NaiveDate,
    #[serde(default)]
    pub subtotal: Decimal,
    #[serde(default)]
    pub vat: Decimal,
    #[serde(default)]
    pub total: Decimal,
    #[serde(default = "empty_payload")]
    pub payload: serde_json::Value,
}

#[derive(Debug, Clone, Deserialize)]
pub struct PayInvoiceRequest {
    pub amount: Decimal,
}

#[derive(Debug, Clone, Deserialize, Validate)]
pub struct ManualEntryRequest {
    pub date: NaiveDate,
    #[validate(length(min = 1, message = "Description cannot be empty"))]
    pub description: String,
    #[validate(length(min = 2, message = "A journal entry needs at least 2 lines"))]
    pub lines: Vec<PostLine>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct RecentParams {
    #[serde(default = "default_recent_limit")]
    pub limit: usize,
}

#[derive(Debug, Clone, Deserialize)]
pub struct VatParams {
    pub year: Option<i32>,
}

#[derive(Debug, Serialize)]
pub struct EntryCreatedResponse {
    pub success: bool,
    pub entry_id: Uuid,
}

impl EntryCreatedResponse {
    pub fn new(entry_id: Uuid) -> Self {
        Self {
            success: true,
            entry_id,
        }
    }
}
