//! In-process store with the same scope semantics as PostgreSQL.
//!
//! A scope takes the state lock for its whole lifetime and works on a copy.
//! Commit writes the copy back; rollback or drop discards it. Scopes are
//! therefore fully serialized, which is stricter than the database.

use crate::models::{
    Account, Company, CompanyPreferences, CompanyTaxSettings, CompanyUser, CreateInvoice,
    EntryLine, EntryStatus, Invoice, InvoiceStatus, LedgerEntry, LedgerLine, NewAccount,
    NewLedgerEntry, NewLedgerLine, Role, SourceType,
};
use crate::services::error::LedgerError;
use crate::services::store::{LedgerStore, StoreTx};
use async_trait::async_trait;
use chrono::Utc;
use rust_decimal::Decimal;
use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use tokio::sync::{Mutex, OwnedMutexGuard};
use uuid::Uuid;

#[derive(Debug, Clone, Default)]
struct State {
    companies: Vec<Company>,
    accounts: Vec<Account>,
    entries: Vec<LedgerEntry>,
    lines: Vec<LedgerLine>,
    invoices: Vec<Invoice>,
    tax_settings: HashMap<Uuid, CompanyTaxSettings>,
    preferences: HashMap<Uuid, CompanyPreferences>,
    members: Vec<CompanyUser>,
}

#[derive(Clone, Default)]
pub struct InMemoryStore {
    state: Arc<Mutex<State>>,
    fail_next_line_insert: Arc<AtomicBool>,
}

impl InMemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Make the next `insert_lines` call fail after its entry header was written.
    pub fn fail_next_line_insert(&self) {
        self.fail_next_line_insert.store(true, Ordering::SeqCst);
    }

    /// Committed entry count across all companies.
    pub async fn entry_count(&self) -> usize {
        self.state.lock().await.entries.len()
    }

    /// Committed line count across all companies.
    pub async fn line_count(&self) -> usize {
        self.state.lock().await.lines.len()
    }
}

#[async_trait]
impl LedgerStore for InMemoryStore {
    async fn begin(&self) -> Result<Box<dyn StoreTx>, LedgerError> {
        let guard = self.state.clone().lock_owned().await;
        let working = guard.clone();
        Ok(Box::new(MemoryTx {
            guard,
            working,
            fail_next_line_insert: self.fail_next_line_insert.clone(),
        }))
    }

    async fn health_check(&self) -> Result<(), LedgerError> {
        Ok(())
    }
}

pub struct MemoryTx {
    guard: OwnedMutexGuard<State>,
    working: State,
    fail_next_line_insert: Arc<AtomicBool>,
}

impl MemoryTx {
    fn require_company(&self, company_id: Uuid) -> Result<(), LedgerError> {
        if self.working.companies.iter().any(|c| c.id == company_id) {
            Ok(())
        } else {
            Err(LedgerError::store(
                "Foreign key violation",
                format!("company {} does not exist", company_id),
            ))
        }
    }

    fn account(&self, account_id: Uuid) -> Option<&Account> {
        self.working.accounts.iter().find(|a| a.id == account_id)
    }
}

#[async_trait]
impl StoreTx for MemoryTx {
    async fn insert_company(&mut self, name: &str) -> Result<Company, LedgerError> {
        let company = Company {
            id: Uuid::new_v4(),
            name: name.to_string(),
            tin: None,
            rc: None,
            industry: None,
            vat_registered: false,
            created_at: Utc::now(),
        };
        self.working.companies.push(company.clone());
        Ok(company)
    }

    async fn get_company(&mut self, company_id: Uuid) -> Result<Option<Company>, LedgerError> {
        Ok(self
            .working
            .companies
            .iter()
            .find(|c| c.id == company_id)
            .cloned())
    }

    async fn insert_account(
        &mut self,
        company_id: Uuid,
        account: &NewAccount,
    ) -> Result<Option<Account>, LedgerError> {
        self.require_company(company_id)?;
        let exists = self
            .working
            .accounts
            .iter()
            .any(|a| a.company_id == company_id && a.code == account.code);
        if exists {
            return Ok(None);
        }

        let row = Account {
            id: Uuid::new_v4(),
            company_id,
            code: account.code,
            name: account.name.clone(),
            account_type: account.account_type,
            created_at: Utc::now(),
        };
        self.working.accounts.push(row.clone());
        Ok(Some(row))
    }

    async fn list_accounts(&mut self, company_id: Uuid) -> Result<Vec<Account>, LedgerError> {
        let mut accounts: Vec<Account> = self
            .working
            .accounts
            .iter()
            .filter(|a| a.company_id == company_id)
            .cloned()
            .collect();
        accounts.sort_by_key(|a| a.code);
        Ok(accounts)
    }

    async fn find_accounts_by_code(
        &mut self,
        company_id: Uuid,
        codes: &[i32],
    ) -> Result<Vec<Account>, LedgerError> {
        let mut accounts: Vec<Account> = self
            .working
            .accounts
            .iter()
            .filter(|a| a.company_id == company_id && codes.contains(&a.code))
            .cloned()
            .collect();
        accounts.sort_by_key(|a| a.code);
        Ok(accounts)
    }

    async fn insert_entry(&mut self, entry: &NewLedgerEntry) -> Result<LedgerEntry, LedgerError> {
        self.require_company(entry.company_id)?;
        if let (EntryStatus::Pending, Some(source_id)) = (entry.status, entry.source_id) {
            let clash = self.working.entries.iter().any(|e| {
                e.status == EntryStatus::Pending
                    && e.source_type == entry.source_type
                    && e.source_id == Some(source_id)
            });
            if clash {
                return Err(LedgerError::store(
                    "Unique violation",
                    format!("pending entry already exists for {}", source_id),
                ));
            }
        }

        let row = LedgerEntry {
            id: Uuid::new_v4(),
            company_id: entry.company_id,
            date: entry.date,
            description: entry.description.clone(),
            status: entry.status,
            source_type: entry.source_type,
            source_id: entry.source_id,
            created_at: Utc::now(),
        };
        self.working.entries.push(row.clone());
        Ok(row)
    }

    async fn get_entry(
        &mut self,
        company_id: Uuid,
        entry_id: Uuid,
    ) -> Result<Option<LedgerEntry>, LedgerError> {
        Ok(self
            .working
            .entries
            .iter()
            .find(|e| e.company_id == company_id && e.id == entry_id)
            .cloned())
    }

    async fn insert_lines(
        &mut self,
        entry_id: Uuid,
        lines: &[NewLedgerLine],
    ) -> Result<Vec<LedgerLine>, LedgerError> {
        if self.fail_next_line_insert.swap(false, Ordering::SeqCst) {
            return Err(LedgerError::store(
                "Failed to insert ledger line",
                "injected failure",
            ));
        }
        if !self.working.entries.iter().any(|e| e.id == entry_id) {
            return Err(LedgerError::store(
                "Foreign key violation",
                format!("ledger entry {} does not exist", entry_id),
            ));
        }

        let mut inserted = Vec::with_capacity(lines.len());
        for line in lines {
            if self.account(line.account_id).is_none() {
                return Err(LedgerError::store(
                    "Foreign key violation",
                    format!("account {} does not exist", line.account_id),
                ));
            }
            if line.debit < Decimal::ZERO || line.credit < Decimal::ZERO {
                return Err(LedgerError::store(
                    "Check violation",
                    "ledger line amounts must be non-negative",
                ));
            }
            let row = LedgerLine {
                id: Uuid::new_v4(),
                ledger_entry_id: entry_id,
                account_id: line.account_id,
                debit: line.debit,
                credit: line.credit,
            };
            self.working.lines.push(row.clone());
            inserted.push(row);
        }
        Ok(inserted)
    }

    async fn set_entry_status(
        &mut self,
        company_id: Uuid,
        entry_id: Uuid,
        status: EntryStatus,
    ) -> Result<bool, LedgerError> {
        match self
            .working
            .entries
            .iter_mut()
            .find(|e| e.company_id == company_id && e.id == entry_id)
        {
            Some(entry) => {
                entry.status = status;
                Ok(true)
            }
            None => Ok(false),
        }
    }

    async fn find_pending_entry(
        &mut self,
        company_id: Uuid,
        source_type: SourceType,
        source_id: Uuid,
    ) -> Result<Option<LedgerEntry>, LedgerError> {
        Ok(self
            .working
            .entries
            .iter()
            .find(|e| {
                e.company_id == company_id
                    && e.source_type == source_type
                    && e.source_id == Some(source_id)
                    && e.status == EntryStatus::Pending
            })
            .cloned())
    }

    async fn entry_lines(
        &mut self,
        company_id: Uuid,
        status: Option<EntryStatus>,
    ) -> Result<Vec<EntryLine>, LedgerError> {
        // (entry position, line position, row); positions stand in for creation order
        let mut rows: Vec<(usize, usize, EntryLine)> = Vec::new();
        for (entry_pos, entry) in self.working.entries.iter().enumerate() {
            if entry.company_id != company_id || status.is_some_and(|s| s != entry.status) {
                continue;
            }
            for (line_pos, line) in self.working.lines.iter().enumerate() {
                if line.ledger_entry_id != entry.id {
                    continue;
                }
                let Some(account) = self.account(line.account_id) else {
                    continue;
                };
                rows.push((
                    entry_pos,
                    line_pos,
                    EntryLine {
                        entry_id: entry.id,
                        date: entry.date,
                        description: entry.description.clone(),
                        status: entry.status,
                        source_type: entry.source_type,
                        entry_created_at: entry.created_at,
                        account_code: account.code,
                        account_name: account.name.clone(),
                        debit: line.debit,
                        credit: line.credit,
                    },
                ));
            }
        }

        rows.sort_by(|(ea, la, a), (eb, lb, b)| {
            b.date
                .cmp(&a.date)
                .then(eb.cmp(ea))
                .then(a.account_code.cmp(&b.account_code))
                .then(la.cmp(lb))
        });
        Ok(rows.into_iter().map(|(_, _, row)| row).collect())
    }

    async fn lines_for_entry(&mut self, entry_id: Uuid) -> Result<Vec<LedgerLine>, LedgerError> {
        Ok(self
            .working
            .lines
            .iter()
            .filter(|l| l.ledger_entry_id == entry_id)
            .cloned()
            .collect())
    }

    async fn count_entries(&mut self, company_id: Uuid) -> Result<i64, LedgerError> {
        Ok(self
            .working
            .entries
            .iter()
            .filter(|e| e.company_id == company_id)
            .count() as i64)
    }

    async fn insert_invoice(&mut self, input: &CreateInvoice) -> Result<Invoice, LedgerError> {
        self.require_company(input.company_id)?;
        let invoice = Invoice {
            id: Uuid::new_v4(),
            company_id: input.company_id,
            customer_id: input.customer_id,
            customer_name: input.customer_name.clone(),
            invoice_number: input.invoice_number.clone(),
            date: input.date,
            subtotal: input.subtotal,
            vat: input.vat,
            total: input.total,
            status: InvoiceStatus::Sent,
            payload: input.payload.clone(),
            created_at: Utc::now(),
        };
        self.working.invoices.push(invoice.clone());
        Ok(invoice)
    }

    async fn get_invoice(
        &mut self,
        company_id: Uuid,
        invoice_id: Uuid,
    ) -> Result<Option<Invoice>, LedgerError> {
        Ok(self
            .working
            .invoices
            .iter()
            .find(|i| i.company_id == company_id && i.id == invoice_id)
            .cloned())
    }

    async fn set_invoice_status(
        &mut self,
        company_id: Uuid,
        invoice_id: Uuid,
        status: InvoiceStatus,
    ) -> Result<bool, LedgerError> {
        match self
            .working
            .invoices
            .iter_mut()
            .find(|i| i.company_id == company_id && i.id == invoice_id)
        {
            Some(invoice) => {
                invoice.status = status;
                Ok(true)
            }
            None => Ok(false),
        }
    }

    async fn list_invoices(&mut self, company_id: Uuid) -> Result<Vec<Invoice>, LedgerError> {
        Ok(self
            .working
            .invoices
            .iter()
            .rev()
            .filter(|i| i.company_id == company_id)
            .cloned()
            .collect())
    }

    async fn count_invoices(&mut self, company_id: Uuid) -> Result<i64, LedgerError> {
        Ok(self
            .working
            .invoices
            .iter()
            .filter(|i| i.company_id == company_id)
            .count() as i64)
    }

    async fn upsert_tax_settings(
        &mut self,
        settings: &CompanyTaxSettings,
    ) -> Result<CompanyTaxSettings, LedgerError> {
        self.require_company(settings.company_id)?;
        let row = CompanyTaxSettings {
            updated_at: Utc::now(),
            ..settings.clone()
        };
        self.working
            .tax_settings
            .insert(row.company_id, row.clone());
        Ok(row)
    }

    async fn get_tax_settings(
        &mut self,
        company_id: Uuid,
    ) -> Result<Option<CompanyTaxSettings>, LedgerError> {
        Ok(self.working.tax_settings.get(&company_id).cloned())
    }

    async fn upsert_preferences(
        &mut self,
        preferences: &CompanyPreferences,
    ) -> Result<CompanyPreferences, LedgerError> {
        self.require_company(preferences.company_id)?;
        let row = CompanyPreferences {
            updated_at: Utc::now(),
            ..preferences.clone()
        };
        self.working.preferences.insert(row.company_id, row.clone());
        Ok(row)
    }

    async fn get_preferences(
        &mut self,
        company_id: Uuid,
    ) -> Result<Option<CompanyPreferences>, LedgerError> {
        Ok(self.working.preferences.get(&company_id).cloned())
    }

    async fn insert_company_user(
        &mut self,
        company_id: Uuid,
        user_email: &str,
        role: Role,
    ) -> Result<Option<CompanyUser>, LedgerError> {
        self.require_company(company_id)?;
        let exists = self
            .working
            .members
            .iter()
            .any(|m| m.company_id == company_id && m.user_email == user_email);
        if exists {
            return Ok(None);
        }

        let now = Utc::now();
        let member = CompanyUser {
            id: Uuid::new_v4(),
            company_id,
            user_email: user_email.to_string(),
            role,
            created_at: now,
            updated_at: now,
        };
        self.working.members.push(member.clone());
        Ok(Some(member))
    }

    async fn list_company_users(
        &mut self,
        company_id: Uuid,
    ) -> Result<Vec<CompanyUser>, LedgerError> {
        Ok(self
            .working
            .members
            .iter()
            .rev()
            .filter(|m| m.company_id == company_id)
            .cloned()
            .collect())
    }

    async fn update_company_user_role(
        &mut self,
        company_id: Uuid,
        member_id: Uuid,
        role: Role,
    ) -> Result<Option<CompanyUser>, LedgerError> {
        Ok(self
            .working
            .members
            .iter_mut()
            .find(|m| m.company_id == company_id && m.id == member_id)
            .map(|member| {
                member.role = role;
                member.updated_at = Utc::now();
                member.clone()
            }))
    }

    async fn delete_company_user(
        &mut self,
        company_id: Uuid,
        member_id: Uuid,
    ) -> Result<bool, LedgerError> {
        let before = self.working.members.len();
        self.working
            .members
            .retain(|m| !(m.company_id == company_id && m.id == member_id));
        Ok(self.working.members.len() < before)
    }

    async fn commit(self: Box<Self>) -> Result<(), LedgerError> {
        let MemoryTx {
            mut guard, working, ..
        } = *self;
        *guard = working;
        Ok(())
    }

    async fn rollback(self: Box<Self>) -> Result<(), LedgerError> {
        Ok(())
    }
}
