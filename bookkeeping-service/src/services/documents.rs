//! Expense, income and invoice workflows.
//!
//! Each workflow turns one business event into ledger postings inside a
//! single store scope.

use crate::models::account::{ACCOUNTS_RECEIVABLE, CASH, EXPENSE_CODES, REVENUE, VAT_PAYABLE};
use crate::models::{
    is_storable_amount, CreateInvoice, EntryStatus, Invoice, InvoiceStatus, PostEntry, PostLine,
    SourceType,
};
use crate::services::error::LedgerError;
use crate::services::metrics::ENTRIES_POSTED_TOTAL;
use crate::services::posting::{append_lines_in, post_entry_in, set_status_in};
use crate::services::store::LedgerStore;
use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::Serialize;
use std::collections::HashSet;
use std::sync::Arc;
use tracing::{info, instrument};
use uuid::Uuid;

#[derive(Debug, Clone)]
pub struct ExpenseInput {
    pub date: NaiveDate,
    pub description: String,
    pub amount: Decimal,
    pub expense_account_code: i32,
    pub payment_account_code: i32,
}

#[derive(Debug, Clone)]
pub struct IncomeInput {
    pub date: NaiveDate,
    pub description: String,
    pub amount: Decimal,
    pub income_account_code: i32,
    pub payment_account_code: i32,
}

/// An invoice together with the pending entry it opened.
#[derive(Debug, Clone, Serialize)]
pub struct IssuedInvoice {
    #[serde(flatten)]
    pub invoice: Invoice,
    pub ledger_entry_id: Uuid,
}

/// One expense as listed to the user.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ExpenseRow {
    pub id: Uuid,
    pub date: NaiveDate,
    pub name: String,
    pub category: String,
    pub amount: Decimal,
}

#[derive(Clone)]
pub struct DocumentWorkflows {
    store: Arc<dyn LedgerStore>,
}

impl DocumentWorkflows {
    pub fn new(store: Arc<dyn LedgerStore>) -> Self {
        Self { store }
    }

    /// Debit the expense account, credit the payment account. Posted at once.
    #[instrument(skip(self, input), fields(company_id = %company_id, expense_account_code = input.expense_account_code))]
    pub async fn record_expense(
        &self,
        company_id: Uuid,
        input: ExpenseInput,
    ) -> Result<Uuid, LedgerError> {
        require_positive(input.amount)?;

        let entry = PostEntry {
            company_id,
            date: input.date,
            description: input.description,
            source_type: SourceType::Expense,
            source_id: None,
            status: EntryStatus::Posted,
            lines: vec![
                PostLine::debit(input.expense_account_code, input.amount),
                PostLine::credit(input.payment_account_code, input.amount),
            ],
        };

        let mut tx = self.store.begin().await?;
        let entry_id = post_entry_in(&mut *tx, &entry).await?;
        tx.commit().await?;

        ENTRIES_POSTED_TOTAL
            .with_label_values(&[SourceType::Expense.as_str()])
            .inc();
        info!(entry_id = %entry_id, amount = %input.amount, "Expense recorded");
        Ok(entry_id)
    }

    /// Debit the payment account, credit the income account. Posted at once.
    #[instrument(skip(self, input), fields(company_id = %company_id, income_account_code = input.income_account_code))]
    pub async fn record_income(
        &self,
        company_id: Uuid,
        input: IncomeInput,
    ) -> Result<Uuid, LedgerError> {
        require_positive(input.amount)?;

        let entry = PostEntry {
            company_id,
            date: input.date,
            description: input.description,
            source_type: SourceType::Income,
            source_id: None,
            status: EntryStatus::Posted,
            lines: vec![
                PostLine::debit(input.payment_account_code, input.amount),
                PostLine::credit(input.income_account_code, input.amount),
            ],
        };

        let mut tx = self.store.begin().await?;
        let entry_id = post_entry_in(&mut *tx, &entry).await?;
        tx.commit().await?;

        ENTRIES_POSTED_TOTAL
            .with_label_values(&[SourceType::Income.as_str()])
            .inc();
        info!(entry_id = %entry_id, amount = %input.amount, "Income recorded");
        Ok(entry_id)
    }

    /// Store the invoice as `sent` and open a pending entry:
    /// AR debit total, Revenue credit subtotal, VAT Payable credit vat.
    #[instrument(skip(self, input), fields(company_id = %input.company_id, invoice_number = %input.invoice_number))]
    pub async fn issue_invoice(&self, input: CreateInvoice) -> Result<IssuedInvoice, LedgerError> {
        validate_invoice(&input)?;

        let mut tx = self.store.begin().await?;
        let invoice = tx.insert_invoice(&input).await?;

        let entry = PostEntry {
            company_id: invoice.company_id,
            date: invoice.date,
            description: format!("Invoice {}", invoice.invoice_number),
            source_type: SourceType::Invoice,
            source_id: Some(invoice.id),
            status: EntryStatus::Pending,
            lines: vec![
                PostLine::debit(ACCOUNTS_RECEIVABLE, invoice.total),
                PostLine::credit(REVENUE, invoice.subtotal),
                PostLine::credit(VAT_PAYABLE, invoice.vat),
            ],
        };
        let ledger_entry_id = post_entry_in(&mut *tx, &entry).await?;
        tx.commit().await?;

        ENTRIES_POSTED_TOTAL
            .with_label_values(&[SourceType::Invoice.as_str()])
            .inc();
        info!(
            invoice_id = %invoice.id,
            ledger_entry_id = %ledger_entry_id,
            total = %invoice.total,
            "Invoice issued"
        );

        Ok(IssuedInvoice {
            invoice,
            ledger_entry_id,
        })
    }

    /// Mark the invoice paid, append Cash debit / AR credit lines to its
    /// pending entry and post that entry.
    #[instrument(skip(self), fields(company_id = %company_id, invoice_id = %invoice_id))]
    pub async fn pay_invoice(
        &self,
        company_id: Uuid,
        invoice_id: Uuid,
        amount: Decimal,
    ) -> Result<Invoice, LedgerError> {
        require_positive(amount)?;

        let mut tx = self.store.begin().await?;
        let mut invoice = tx
            .get_invoice(company_id, invoice_id)
            .await?
            .ok_or(LedgerError::InvoiceNotFound(invoice_id))?;
        let entry = tx
            .find_pending_entry(company_id, SourceType::Invoice, invoice_id)
            .await?
            .ok_or(LedgerError::PendingEntryNotFound(invoice_id))?;

        tx.set_invoice_status(company_id, invoice_id, InvoiceStatus::Paid)
            .await?;
        append_lines_in(
            &mut *tx,
            company_id,
            entry.id,
            &[
                PostLine::debit(CASH, amount),
                PostLine::credit(ACCOUNTS_RECEIVABLE, amount),
            ],
            amount,
        )
        .await?;
        set_status_in(&mut *tx, company_id, entry.id, EntryStatus::Posted).await?;
        tx.commit().await?;

        info!(ledger_entry_id = %entry.id, amount = %amount, "Invoice paid");

        invoice.status = InvoiceStatus::Paid;
        Ok(invoice)
    }

    /// Invoices of a company, newest first.
    #[instrument(skip(self), fields(company_id = %company_id))]
    pub async fn list_invoices(&self, company_id: Uuid) -> Result<Vec<Invoice>, LedgerError> {
        let mut tx = self.store.begin().await?;
        let invoices = tx.list_invoices(company_id).await?;
        tx.commit().await?;
        Ok(invoices)
    }

    /// Expense-sourced entries by date descending with their category and amount.
    #[instrument(skip(self), fields(company_id = %company_id))]
    pub async fn list_expenses(&self, company_id: Uuid) -> Result<Vec<ExpenseRow>, LedgerError> {
        let mut tx = self.store.begin().await?;
        let lines = tx.entry_lines(company_id, None).await?;
        tx.commit().await?;

        // Keep the first expense-range line of each entry
        let mut seen = HashSet::new();
        let mut rows: Vec<ExpenseRow> = Vec::new();
        for line in lines {
            if line.source_type != SourceType::Expense
                || !EXPENSE_CODES.contains(&line.account_code)
                || !seen.insert(line.entry_id)
            {
                continue;
            }
            rows.push(ExpenseRow {
                id: line.entry_id,
                date: line.date,
                name: line.description,
                category: line.account_name,
                amount: line.debit,
            });
        }
        Ok(rows)
    }
}

/// Amount of a single-sided business event: positive and storable to the cent.
fn require_positive(amount: Decimal) -> Result<(), LedgerError> {
    if amount <= Decimal::ZERO || !is_storable_amount(amount) {
        return Err(LedgerError::InvalidAmount(amount));
    }
    Ok(())
}

fn validate_invoice(input: &CreateInvoice) -> Result<(), LedgerError> {
    if input.customer_name.trim().is_empty() {
        return Err(LedgerError::Validation("Customer name is required".into()));
    }
    if input.invoice_number.trim().is_empty() {
        return Err(LedgerError::Validation("Invoice number is required".into()));
    }
    for amount in [input.subtotal, input.vat, input.total] {
        if amount < Decimal::ZERO || !is_storable_amount(amount) {
            return Err(LedgerError::InvalidAmount(amount));
        }
    }
    if input.subtotal + input.vat != input.total {
        return Err(LedgerError::Unbalanced {
            debits: input.total,
            credits: input.subtotal + input.vat,
        });
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use rust_decimal_macros::dec;

    fn invoice(subtotal: Decimal, vat: Decimal, total: Decimal) -> CreateInvoice {
        CreateInvoice {
            company_id: Uuid::new_v4(),
            customer_id: None,
            customer_name: "Globex".into(),
            invoice_number: "INV-001".into(),
            date: Utc::now().date_naive(),
            subtotal,
            vat,
            total,
            payload: serde_json::json!({}),
        }
    }

    #[test]
    fn test_validate_invoice_accepts_consistent_totals() {
        assert!(validate_invoice(&invoice(dec!(1000), dec!(75), dec!(1075))).is_ok());
    }

    #[test]
    fn test_validate_invoice_rejects_total_mismatch() {
        assert!(matches!(
            validate_invoice(&invoice(dec!(1000), dec!(75), dec!(1000))),
            Err(LedgerError::Unbalanced { .. })
        ));
    }

    #[test]
    fn test_validate_invoice_rejects_negative_vat() {
        assert!(matches!(
            validate_invoice(&invoice(dec!(1000), dec!(-75), dec!(925))),
            Err(LedgerError::InvalidAmount(_))
        ));
    }

    #[test]
    fn test_validate_invoice_rejects_sub_cent_vat() {
        assert!(matches!(
            validate_invoice(&invoice(dec!(100), dec!(7.505), dec!(107.505))),
            Err(LedgerError::InvalidAmount(_))
        ));
    }

    #[test]
    fn test_require_positive() {
        assert!(require_positive(dec!(0.01)).is_ok());
        assert!(require_positive(dec!(0)).is_err());
        assert!(require_positive(dec!(0.004)).is_err());
    }

    #[test]
    fn test_validate_invoice_requires_number() {
        let mut input = invoice(dec!(10), dec!(0), dec!(10));
        input.invoice_number = String::new();
        assert!(matches!(
            validate_invoice(&input),
            Err(LedgerError::Validation(_))
        ));
    }
}
