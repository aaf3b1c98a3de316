//! Financial reports.
//!
//! Aggregations are plain functions over [`EntryLine`] rows so they do not
//! depend on row order. Every statement ignores entries that are not posted.

use crate::models::account::{
    ASSET_CODES, EQUITY_CODES, EXPENSE_CODES, INCOME_CODES, LIABILITY_CODES, VAT_PAYABLE,
};
use crate::models::{
    Company, CompanyTaxSettings, EntryLine, EntryStatus, SourceType,
};
use crate::services::error::LedgerError;
use crate::services::store::LedgerStore;
use chrono::{DateTime, Datelike, NaiveDate, Utc};
use rust_decimal::Decimal;
use serde::Serialize;
use std::collections::{BTreeMap, HashMap};
use std::sync::Arc;
use tracing::instrument;
use uuid::Uuid;

pub const DASHBOARD_RECENT_LIMIT: usize = 10;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
pub struct IncomeStatement {
    pub income: Decimal,
    pub expenses: Decimal,
    pub profit: Decimal,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum ActivityKind {
    Expense,
    Income,
}

/// A posted entry on the dashboard with a signed amount (expenses negative).
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RecentTransaction {
    pub id: Uuid,
    pub date: NaiveDate,
    pub description: String,
    #[serde(rename = "type")]
    pub kind: ActivityKind,
    pub amount: Decimal,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Dashboard {
    pub income: Decimal,
    pub expenses: Decimal,
    pub profit: Decimal,
    pub invoices: i64,
    pub recent: Vec<RecentTransaction>,
}

/// Category totals. Equity includes current net profit; the engine does not
/// check `asset == liability + equity`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
pub struct BalanceSheet {
    pub asset: Decimal,
    pub liability: Decimal,
    pub equity: Decimal,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct VatMonth {
    pub month: u32,
    pub vat_amount: Decimal,
}

#[derive(Debug, Clone, Serialize)]
pub struct TaxProfile {
    pub id: Uuid,
    pub name: String,
    pub tin: Option<String>,
    pub rc: Option<String>,
    pub industry: Option<String>,
    pub vat_registered: bool,
    pub tax_settings: Option<CompanyTaxSettings>,
}

impl TaxProfile {
    fn new(company: Company, tax_settings: Option<CompanyTaxSettings>) -> Self {
        Self {
            id: company.id,
            name: company.name,
            tin: company.tin,
            rc: company.rc,
            industry: company.industry,
            vat_registered: company.vat_registered,
            tax_settings,
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct VatReport {
    pub year: i32,
    pub company: TaxProfile,
    pub vat: Vec<VatMonth>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LedgerRowLine {
    pub account_code: i32,
    pub account_name: String,
    pub debit: Decimal,
    pub credit: Decimal,
}

/// One entry of the general ledger with its lines sorted by account code.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LedgerRow {
    pub id: Uuid,
    pub date: NaiveDate,
    pub description: String,
    pub status: EntryStatus,
    pub source_type: SourceType,
    pub created_at: DateTime<Utc>,
    pub lines: Vec<LedgerRowLine>,
}

impl LedgerRow {
    fn net(&self) -> Decimal {
        self.lines.iter().map(|l| l.debit - l.credit).sum()
    }
}

/// Recent ledger activity with the entry's net amount (debits minus credits).
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RecentActivity {
    pub id: Uuid,
    pub date: NaiveDate,
    pub description: String,
    pub status: EntryStatus,
    pub amount: Decimal,
}

// -----------------------------------------------------------------------------
// Aggregations
// -----------------------------------------------------------------------------

fn posted(lines: &[EntryLine]) -> impl Iterator<Item = &EntryLine> {
    lines.iter().filter(|l| l.status == EntryStatus::Posted)
}

/// Income is credits on 4000-4999, expenses are debits on 5000-5999.
pub fn income_statement(lines: &[EntryLine]) -> IncomeStatement {
    let mut statement = IncomeStatement::default();
    for line in posted(lines) {
        if INCOME_CODES.contains(&line.account_code) {
            statement.income += line.credit;
        }
        if EXPENSE_CODES.contains(&line.account_code) {
            statement.expenses += line.debit;
        }
    }
    statement.profit = statement.income - statement.expenses;
    statement
}

pub fn balance_sheet(lines: &[EntryLine]) -> BalanceSheet {
    let mut balances: BTreeMap<i32, Decimal> = BTreeMap::new();
    for line in posted(lines) {
        *balances.entry(line.account_code).or_default() += line.debit - line.credit;
    }

    let mut sheet = BalanceSheet::default();
    for (code, balance) in balances {
        if ASSET_CODES.contains(&code) {
            sheet.asset += balance;
        } else if LIABILITY_CODES.contains(&code) {
            sheet.liability -= balance;
        } else if EQUITY_CODES.contains(&code) {
            sheet.equity -= balance;
        }
    }
    sheet.equity += income_statement(lines).profit;
    sheet
}

/// Net VAT Payable movement (credit minus debit) per month of `year`.
/// Months without movement are left out.
pub fn vat_by_month(lines: &[EntryLine], year: i32) -> Vec<VatMonth> {
    let mut months: BTreeMap<u32, Decimal> = BTreeMap::new();
    for line in posted(lines) {
        if line.account_code != VAT_PAYABLE || line.date.year() != year {
            continue;
        }
        *months.entry(line.date.month()).or_default() += line.credit - line.debit;
    }

    months
        .into_iter()
        .filter(|(_, amount)| !amount.is_zero())
        .map(|(month, vat_amount)| VatMonth { month, vat_amount })
        .collect()
}

/// Group lines into entries, newest first (date, then creation time).
pub fn group_entries(lines: &[EntryLine]) -> Vec<LedgerRow> {
    let mut rows: Vec<LedgerRow> = Vec::new();
    let mut index: HashMap<Uuid, usize> = HashMap::new();

    for line in lines {
        let pos = *index.entry(line.entry_id).or_insert_with(|| {
            rows.push(LedgerRow {
                id: line.entry_id,
                date: line.date,
                description: line.description.clone(),
                status: line.status,
                source_type: line.source_type,
                created_at: line.entry_created_at,
                lines: Vec::new(),
            });
            rows.len() - 1
        });
        rows[pos].lines.push(LedgerRowLine {
            account_code: line.account_code,
            account_name: line.account_name.clone(),
            debit: line.debit,
            credit: line.credit,
        });
    }

    for row in &mut rows {
        row.lines.sort_by_key(|l| l.account_code);
    }
    rows.sort_by(|a, b| {
        b.date
            .cmp(&a.date)
            .then(b.created_at.cmp(&a.created_at))
    });
    rows
}

/// Latest posted entries, typed Expense when any line hits 5000-5999.
pub fn recent_transactions(lines: &[EntryLine], limit: usize) -> Vec<RecentTransaction> {
    group_entries(lines)
        .into_iter()
        .filter(|row| row.status == EntryStatus::Posted)
        .take(limit)
        .map(|row| {
            let expense: Decimal = row
                .lines
                .iter()
                .filter(|l| EXPENSE_CODES.contains(&l.account_code))
                .map(|l| l.debit)
                .sum();
            let is_expense = row
                .lines
                .iter()
                .any(|l| EXPENSE_CODES.contains(&l.account_code));

            let (kind, amount) = if is_expense {
                (ActivityKind::Expense, -expense)
            } else {
                let income: Decimal = row
                    .lines
                    .iter()
                    .filter(|l| INCOME_CODES.contains(&l.account_code))
                    .map(|l| l.credit)
                    .sum();
                (ActivityKind::Income, income)
            };

            RecentTransaction {
                id: row.id,
                date: row.date,
                description: row.description,
                kind,
                amount,
            }
        })
        .collect()
}

// -----------------------------------------------------------------------------
// Store-backed reports
// -----------------------------------------------------------------------------

#[derive(Clone)]
pub struct Reports {
    store: Arc<dyn LedgerStore>,
}

impl Reports {
    pub fn new(store: Arc<dyn LedgerStore>) -> Self {
        Self { store }
    }

    #[instrument(skip(self), fields(company_id = %company_id))]
    pub async fn dashboard(&self, company_id: Uuid) -> Result<Dashboard, LedgerError> {
        let mut tx = self.store.begin().await?;
        let lines = tx.entry_lines(company_id, Some(EntryStatus::Posted)).await?;
        let invoices = tx.count_invoices(company_id).await?;
        tx.commit().await?;

        let statement = income_statement(&lines);
        Ok(Dashboard {
            income: statement.income,
            expenses: statement.expenses,
            profit: statement.profit,
            invoices,
            recent: recent_transactions(&lines, DASHBOARD_RECENT_LIMIT),
        })
    }

    #[instrument(skip(self), fields(company_id = %company_id))]
    pub async fn income_statement(&self, company_id: Uuid) -> Result<IncomeStatement, LedgerError> {
        let lines = self.posted_lines(company_id).await?;
        Ok(income_statement(&lines))
    }

    #[instrument(skip(self), fields(company_id = %company_id))]
    pub async fn balance_sheet(&self, company_id: Uuid) -> Result<BalanceSheet, LedgerError> {
        let lines = self.posted_lines(company_id).await?;
        Ok(balance_sheet(&lines))
    }

    /// Monthly VAT for `year` (current UTC year when absent) and the tax profile.
    #[instrument(skip(self), fields(company_id = %company_id))]
    pub async fn vat_report(
        &self,
        company_id: Uuid,
        year: Option<i32>,
    ) -> Result<VatReport, LedgerError> {
        let year = year.unwrap_or_else(|| Utc::now().year());

        let mut tx = self.store.begin().await?;
        let company = tx
            .get_company(company_id)
            .await?
            .ok_or(LedgerError::CompanyNotFound(company_id))?;
        let tax_settings = tx.get_tax_settings(company_id).await?;
        let lines = tx.entry_lines(company_id, Some(EntryStatus::Posted)).await?;
        tx.commit().await?;

        Ok(VatReport {
            year,
            company: TaxProfile::new(company, tax_settings),
            vat: vat_by_month(&lines, year),
        })
    }

    /// Every entry, any status, newest first.
    #[instrument(skip(self), fields(company_id = %company_id))]
    pub async fn list_ledger(&self, company_id: Uuid) -> Result<Vec<LedgerRow>, LedgerError> {
        let mut tx = self.store.begin().await?;
        let lines = tx.entry_lines(company_id, None).await?;
        tx.commit().await?;
        Ok(group_entries(&lines))
    }

    #[instrument(skip(self), fields(company_id = %company_id))]
    pub async fn recent_entries(
        &self,
        company_id: Uuid,
        limit: usize,
    ) -> Result<Vec<RecentActivity>, LedgerError> {
        let rows = self.list_ledger(company_id).await?;
        Ok(rows
            .into_iter()
            .take(limit)
            .map(|row| RecentActivity {
                amount: row.net(),
                id: row.id,
                date: row.date,
                description: row.description,
                status: row.status,
            })
            .collect())
    }

    async fn posted_lines(&self, company_id: Uuid) -> Result<Vec<EntryLine>, LedgerError> {
        let mut tx = self.store.begin().await?;
        let lines = tx.entry_lines(company_id, Some(EntryStatus::Posted)).await?;
        tx.commit().await?;
        Ok(lines)
    }
}
