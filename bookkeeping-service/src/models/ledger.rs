//! Ledger entry and line models for double-entry bookkeeping.

use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

/// Entry lifecycle. Only posted entries are reportable.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EntryStatus {
    Pending,
    Posted,
}

impl EntryStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Pending => "pending",
            Self::Posted => "posted",
        }
    }
}

impl TryFrom<String> for EntryStatus {
    type Error = String;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        match value.as_str() {
            "pending" => Ok(Self::Pending),
            "posted" => Ok(Self::Posted),
            other => Err(format!("Unknown entry status: {}", other)),
        }
    }
}

impl std::fmt::Display for EntryStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Business event an entry was generated from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SourceType {
    Expense,
    Income,
    Invoice,
    Manual,
}

impl SourceType {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Expense => "expense",
            Self::Income => "income",
            Self::Invoice => "invoice",
            Self::Manual => "manual",
        }
    }
}

impl TryFrom<String> for SourceType {
    type Error = String;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        match value.as_str() {
            "expense" => Ok(Self::Expense),
            "income" => Ok(Self::Income),
            "invoice" => Ok(Self::Invoice),
            "manual" => Ok(Self::Manual),
            other => Err(format!("Unknown source type: {}", other)),
        }
    }
}

impl std::fmt::Display for SourceType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// One business-event record grouping balanced lines.
#[derive(Debug, Clone, FromRow, Serialize, Deserialize)]
pub struct LedgerEntry {
    pub id: Uuid,
    pub company_id: Uuid,
    pub date: NaiveDate,
    pub description: String,
    #[sqlx(try_from = "String")]
    pub status: EntryStatus,
    #[sqlx(try_from = "String")]
    pub source_type: SourceType,
    pub source_id: Option<Uuid>,
    pub created_at: DateTime<Utc>,
}

/// Stored debit or credit movement against one account.
#[derive(Debug, Clone, FromRow, Serialize, Deserialize)]
pub struct LedgerLine {
    pub id: Uuid,
    pub ledger_entry_id: Uuid,
    pub account_id: Uuid,
    pub debit: Decimal,
    pub credit: Decimal,
}

/// A line as submitted to the posting engine, addressed by account code.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PostLine {
    pub account_code: i32,
    #[serde(default)]
    pub debit: Decimal,
    #[serde(default)]
    pub credit: Decimal,
}

impl PostLine {
    pub fn debit(account_code: i32, amount: Decimal) -> Self {
        Self {
            account_code,
            debit: amount,
            credit: Decimal::ZERO,
        }
    }

    pub fn credit(account_code: i32, amount: Decimal) -> Self {
        Self {
            account_code,
            debit: Decimal::ZERO,
            credit: amount,
        }
    }
}

/// Input for posting one entry with its lines.
#[derive(Debug, Clone)]
pub struct PostEntry {
    pub company_id: Uuid,
    pub date: NaiveDate,
    pub description: String,
    pub source_type: SourceType,
    pub source_id: Option<Uuid>,
    pub status: EntryStatus,
    pub lines: Vec<PostLine>,
}

/// Line resolved to an account id, ready to be written.
#[derive(Debug, Clone, Copy)]
pub struct NewLedgerLine {
    pub account_id: Uuid,
    pub debit: Decimal,
    pub credit: Decimal,
}

/// Entry header ready to be written.
#[derive(Debug, Clone)]
pub struct NewLedgerEntry {
    pub company_id: Uuid,
    pub date: NaiveDate,
    pub description: String,
    pub status: EntryStatus,
    pub source_type: SourceType,
    pub source_id: Option<Uuid>,
}

/// A line joined with its entry header and account, as reports read it back.
#[derive(Debug, Clone, FromRow, Serialize, Deserialize)]
pub struct EntryLine {
    pub entry_id: Uuid,
    pub date: NaiveDate,
    pub description: String,
    #[sqlx(try_from = "String")]
    pub status: EntryStatus,
    #[sqlx(try_from = "String")]
    pub source_type: SourceType,
    pub entry_created_at: DateTime<Utc>,
    pub account_code: i32,
    pub account_name: String,
    pub debit: Decimal,
    pub credit: Decimal,
}

/// Debit and credit totals of a set of lines.
pub fn totals<'a>(lines: impl IntoIterator<Item = &'a PostLine>) -> (Decimal, Decimal) {
    lines
        .into_iter()
        .fold((Decimal::ZERO, Decimal::ZERO), |(d, c), line| {
            (d + line.debit, c + line.credit)
        })
}

/// Decimal places kept by the `NUMERIC(14, 2)` money columns.
pub const MONEY_SCALE: u32 = 2;

/// Largest magnitude a money column holds.
pub const MONEY_MAX: Decimal = dec!(999999999999.99);

/// True when `amount` is stored exactly: no digits beyond the cent and no overflow.
pub fn is_storable_amount(amount: Decimal) -> bool {
    amount.normalize().scale() <= MONEY_SCALE && amount.abs() <= MONEY_MAX
}
