//! Ledger posting engine.
//!
//! Every write goes through one store scope: an entry and all of its lines
//! land together or not at all. Account codes are resolved per company; when a
//! default code is missing the chart is re-seeded once inside the same scope
//! and resolution is retried once before giving up with `MissingAccount`.

use crate::models::account::is_default_code;
use crate::models::{
    is_storable_amount, totals, EntryStatus, NewLedgerEntry, NewLedgerLine, PostEntry, PostLine,
    SourceType,
};
use crate::services::chart::{resolve_codes_in, seed_defaults_in};
use crate::services::error::LedgerError;
use crate::services::metrics::ENTRIES_POSTED_TOTAL;
use crate::services::store::{LedgerStore, StoreTx};
use chrono::NaiveDate;
use rust_decimal::Decimal;
use std::collections::{BTreeSet, HashMap};
use std::sync::Arc;
use tracing::{info, instrument, warn};
use uuid::Uuid;

#[derive(Clone)]
pub struct PostingEngine {
    store: Arc<dyn LedgerStore>,
}

impl PostingEngine {
    pub fn new(store: Arc<dyn LedgerStore>) -> Self {
        Self { store }
    }

    /// Write one entry with its lines. Returns the new entry id.
    #[instrument(skip(self, entry), fields(company_id = %entry.company_id, source_type = %entry.source_type))]
    pub async fn post_entry(&self, entry: PostEntry) -> Result<Uuid, LedgerError> {
        let mut tx = self.store.begin().await?;
        let entry_id = post_entry_in(&mut *tx, &entry).await?;
        tx.commit().await?;

        ENTRIES_POSTED_TOTAL
            .with_label_values(&[entry.source_type.as_str()])
            .inc();
        Ok(entry_id)
    }

    /// Append balanced lines to an existing entry. Both sides must equal `amount`.
    #[instrument(skip(self, lines), fields(company_id = %company_id, entry_id = %entry_id))]
    pub async fn append_lines(
        &self,
        company_id: Uuid,
        entry_id: Uuid,
        lines: &[PostLine],
        amount: Decimal,
    ) -> Result<(), LedgerError> {
        let mut tx = self.store.begin().await?;
        append_lines_in(&mut *tx, company_id, entry_id, lines, amount).await?;
        tx.commit().await
    }

    #[instrument(skip(self), fields(company_id = %company_id, entry_id = %entry_id))]
    pub async fn set_status(
        &self,
        company_id: Uuid,
        entry_id: Uuid,
        status: EntryStatus,
    ) -> Result<(), LedgerError> {
        let mut tx = self.store.begin().await?;
        set_status_in(&mut *tx, company_id, entry_id, status).await?;
        tx.commit().await
    }

    /// Journal entry entered by hand. Posted immediately with `source_type = manual`.
    #[instrument(skip(self, lines), fields(company_id = %company_id, line_count = lines.len()))]
    pub async fn post_manual_entry(
        &self,
        company_id: Uuid,
        date: NaiveDate,
        description: String,
        lines: Vec<PostLine>,
    ) -> Result<Uuid, LedgerError> {
        if lines.len() < 2 {
            return Err(LedgerError::Validation(
                "A journal entry needs at least 2 lines".into(),
            ));
        }
        let (debits, _) = totals(&lines);
        if debits <= Decimal::ZERO {
            return Err(LedgerError::Validation(
                "A journal entry must move a positive amount".into(),
            ));
        }

        self.post_entry(PostEntry {
            company_id,
            date,
            description,
            source_type: SourceType::Manual,
            source_id: None,
            status: EntryStatus::Posted,
            lines,
        })
        .await
    }
}

/// Post an entry inside an open scope.
pub async fn post_entry_in(tx: &mut dyn StoreTx, entry: &PostEntry) -> Result<Uuid, LedgerError> {
    if entry.description.trim().is_empty() {
        return Err(LedgerError::Validation("Description is required".into()));
    }
    if entry.lines.is_empty() {
        return Err(LedgerError::Validation(
            "An entry needs at least one line".into(),
        ));
    }
    check_balanced(&entry.lines)?;

    let accounts = resolve_accounts(tx, entry.company_id, &entry.lines).await?;

    let header = tx
        .insert_entry(&NewLedgerEntry {
            company_id: entry.company_id,
            date: entry.date,
            description: entry.description.clone(),
            status: entry.status,
            source_type: entry.source_type,
            source_id: entry.source_id,
        })
        .await?;

    tx.insert_lines(header.id, &to_ledger_lines(&entry.lines, &accounts))
        .await?;

    info!(
        entry_id = %header.id,
        status = %header.status,
        line_count = entry.lines.len(),
        "Ledger entry written"
    );
    Ok(header.id)
}

/// Append lines to a stored entry of `company_id` inside an open scope. Its
/// current lines are not re-checked; the new set must balance at `amount`.
pub async fn append_lines_in(
    tx: &mut dyn StoreTx,
    company_id: Uuid,
    entry_id: Uuid,
    lines: &[PostLine],
    amount: Decimal,
) -> Result<(), LedgerError> {
    if amount <= Decimal::ZERO {
        return Err(LedgerError::InvalidAmount(amount));
    }
    let (debits, _) = check_balanced(lines)?;
    if debits != amount {
        return Err(LedgerError::Validation(format!(
            "Appended lines move {} but the stated amount is {}",
            debits, amount
        )));
    }

    if tx.get_entry(company_id, entry_id).await?.is_none() {
        return Err(LedgerError::EntryNotFound(entry_id));
    }

    let accounts = resolve_accounts(tx, company_id, lines).await?;
    tx.insert_lines(entry_id, &to_ledger_lines(lines, &accounts))
        .await?;

    info!(entry_id = %entry_id, line_count = lines.len(), "Ledger lines appended");
    Ok(())
}

pub async fn set_status_in(
    tx: &mut dyn StoreTx,
    company_id: Uuid,
    entry_id: Uuid,
    status: EntryStatus,
) -> Result<(), LedgerError> {
    if !tx.set_entry_status(company_id, entry_id, status).await? {
        return Err(LedgerError::EntryNotFound(entry_id));
    }
    Ok(())
}

/// Reject negative or unstorable amounts and unequal sides. Returns
/// `(debits, credits)`; equality is checked at the stored precision.
fn check_balanced(lines: &[PostLine]) -> Result<(Decimal, Decimal), LedgerError> {
    for line in lines {
        for amount in [line.debit, line.credit] {
            if amount < Decimal::ZERO || !is_storable_amount(amount) {
                return Err(LedgerError::InvalidAmount(amount));
            }
        }
        if line.debit > Decimal::ZERO && line.credit > Decimal::ZERO {
            warn!(
                account_code = line.account_code,
                debit = %line.debit,
                credit = %line.credit,
                "Ledger line carries both a debit and a credit"
            );
        }
    }

    let (debits, credits) = totals(lines);
    if debits != credits {
        return Err(LedgerError::Unbalanced { debits, credits });
    }
    Ok((debits, credits))
}

/// Resolve every line's account code, re-seeding the default chart at most once.
async fn resolve_accounts(
    tx: &mut dyn StoreTx,
    company_id: Uuid,
    lines: &[PostLine],
) -> Result<HashMap<i32, Uuid>, LedgerError> {
    let codes: BTreeSet<i32> = lines.iter().map(|l| l.account_code).collect();
    let mut resolved = resolve_codes_in(tx, company_id, &codes).await?;

    let missing: Vec<i32> = unresolved(&codes, &resolved).collect();
    if missing.iter().any(|&code| is_default_code(code)) {
        warn!(
            company_id = %company_id,
            missing = ?missing,
            "Default accounts missing, re-seeding chart"
        );
        seed_defaults_in(tx, company_id).await?;
        resolved = resolve_codes_in(tx, company_id, &codes).await?;
    }

    let first_missing = unresolved(&codes, &resolved).next();
    match first_missing {
        Some(code) => Err(LedgerError::MissingAccount(code)),
        None => Ok(resolved),
    }
}

fn unresolved<'a>(
    codes: &'a BTreeSet<i32>,
    resolved: &'a HashMap<i32, Uuid>,
) -> impl Iterator<Item = i32> + 'a {
    codes
        .iter()
        .copied()
        .filter(move |code| !resolved.contains_key(code))
}

fn to_ledger_lines(lines: &[PostLine], accounts: &HashMap<i32, Uuid>) -> Vec<NewLedgerLine> {
    lines
        .iter()
        .filter_map(|line| {
            accounts.get(&line.account_code).map(|&account_id| NewLedgerLine {
                account_id,
                debit: line.debit,
                credit: line.credit,
            })
        })
        .collect()
}
