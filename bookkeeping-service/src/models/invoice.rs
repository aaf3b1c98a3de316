//! Invoice model.

use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

/// Invoice status. `Sent` moves to `Paid` once and never back.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum InvoiceStatus {
    Sent,
    Paid,
}

impl InvoiceStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            InvoiceStatus::Sent => "sent",
            InvoiceStatus::Paid => "paid",
        }
    }
}

impl TryFrom<String> for InvoiceStatus {
    type Error = String;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        match value.as_str() {
            "sent" => Ok(InvoiceStatus::Sent),
            "paid" => Ok(InvoiceStatus::Paid),
            other => Err(format!("Unknown invoice status: {}", other)),
        }
    }
}

/// Invoice document. `payload` carries line-item detail the ledger never reads.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Invoice {
    pub id: Uuid,
    pub company_id: Uuid,
    pub customer_id: Option<Uuid>,
    pub customer_name: String,
    pub invoice_number: String,
    pub date: NaiveDate,
    pub subtotal: Decimal,
    pub vat: Decimal,
    pub total: Decimal,
    #[sqlx(try_from = "String")]
    pub status: InvoiceStatus,
    pub payload: serde_json::Value,
    pub created_at: DateTime<Utc>,
}

/// Input for issuing an invoice.
#[derive(Debug, Clone)]
pub struct CreateInvoice {
    pub company_id: Uuid,
    pub customer_id: Option<Uuid>,
    pub customer_name: String,
    pub invoice_number: String,
    pub date: NaiveDate,
    pub subtotal: Decimal,
    pub vat: Decimal,
    pub total: Decimal,
    pub payload: serde_json::Value,
}
