//! Transactional data-store abstraction consumed by the bookkeeping core.
//!
//! Every logical operation opens exactly one [`StoreTx`] scope with
//! [`LedgerStore::begin`], performs all of its reads and writes through it and
//! finishes with [`StoreTx::commit`]. A scope that is dropped or rolled back
//! leaves no trace in the store.

use crate::models::{
    Account, Company, CompanyPreferences, CompanyTaxSettings, CompanyUser, CreateInvoice,
    EntryLine, EntryStatus, Invoice, InvoiceStatus, LedgerEntry, LedgerLine, NewAccount,
    NewLedgerEntry, NewLedgerLine, Role, SourceType,
};
use crate::services::error::LedgerError;
use async_trait::async_trait;
use uuid::Uuid;

/// Connection-level handle shared across requests as `Arc<dyn LedgerStore>`.
#[async_trait]
pub trait LedgerStore: Send + Sync {
    /// Open a transactional scope.
    async fn begin(&self) -> Result<Box<dyn StoreTx>, LedgerError>;

    /// Check the store is reachable.
    async fn health_check(&self) -> Result<(), LedgerError>;
}

/// Scoped handle; all reads observe the scope's own uncommitted writes.
#[async_trait]
pub trait StoreTx: Send {
    // Companies

    async fn insert_company(&mut self, name: &str) -> Result<Company, LedgerError>;

    async fn get_company(&mut self, company_id: Uuid) -> Result<Option<Company>, LedgerError>;

    // Accounts

    /// Insert an account. Returns `None` when `(company_id, code)` already exists.
    async fn insert_account(
        &mut self,
        company_id: Uuid,
        account: &NewAccount,
    ) -> Result<Option<Account>, LedgerError>;

    /// Accounts of a company ordered by code ascending.
    async fn list_accounts(&mut self, company_id: Uuid) -> Result<Vec<Account>, LedgerError>;

    /// Accounts of a company whose code is in `codes`.
    async fn find_accounts_by_code(
        &mut self,
        company_id: Uuid,
        codes: &[i32],
    ) -> Result<Vec<Account>, LedgerError>;

    // Ledger

    async fn insert_entry(&mut self, entry: &NewLedgerEntry) -> Result<LedgerEntry, LedgerError>;

    /// An entry header, only when it belongs to `company_id`. Locks the row
    /// for the rest of the scope.
    async fn get_entry(
        &mut self,
        company_id: Uuid,
        entry_id: Uuid,
    ) -> Result<Option<LedgerEntry>, LedgerError>;

    async fn insert_lines(
        &mut self,
        entry_id: Uuid,
        lines: &[NewLedgerLine],
    ) -> Result<Vec<LedgerLine>, LedgerError>;

    /// Update an entry's status. Returns false when the entry does not exist.
    async fn set_entry_status(
        &mut self,
        company_id: Uuid,
        entry_id: Uuid,
        status: EntryStatus,
    ) -> Result<bool, LedgerError>;

    /// The pending entry generated by a source document, if any.
    async fn find_pending_entry(
        &mut self,
        company_id: Uuid,
        source_type: SourceType,
        source_id: Uuid,
    ) -> Result<Option<LedgerEntry>, LedgerError>;

    /// Lines joined with entry header and account, optionally restricted to one
    /// entry status. Ordered by entry date descending, then entry creation
    /// descending, then account code ascending.
    async fn entry_lines(
        &mut self,
        company_id: Uuid,
        status: Option<EntryStatus>,
    ) -> Result<Vec<EntryLine>, LedgerError>;

    /// Lines of one entry.
    async fn lines_for_entry(&mut self, entry_id: Uuid) -> Result<Vec<LedgerLine>, LedgerError>;

    async fn count_entries(&mut self, company_id: Uuid) -> Result<i64, LedgerError>;

    // Invoices

    async fn insert_invoice(&mut self, input: &CreateInvoice) -> Result<Invoice, LedgerError>;

    async fn get_invoice(
        &mut self,
        company_id: Uuid,
        invoice_id: Uuid,
    ) -> Result<Option<Invoice>, LedgerError>;

    async fn set_invoice_status(
        &mut self,
        company_id: Uuid,
        invoice_id: Uuid,
        status: InvoiceStatus,
    ) -> Result<bool, LedgerError>;

    /// Invoices of a company, newest first.
    async fn list_invoices(&mut self, company_id: Uuid) -> Result<Vec<Invoice>, LedgerError>;

    async fn count_invoices(&mut self, company_id: Uuid) -> Result<i64, LedgerError>;

    // Settings

    async fn upsert_tax_settings(
        &mut self,
        settings: &CompanyTaxSettings,
    ) -> Result<CompanyTaxSettings, LedgerError>;

    async fn get_tax_settings(
        &mut self,
        company_id: Uuid,
    ) -> Result<Option<CompanyTaxSettings>, LedgerError>;

    async fn upsert_preferences(
        &mut self,
        preferences: &CompanyPreferences,
    ) -> Result<CompanyPreferences, LedgerError>;

    async fn get_preferences(
        &mut self,
        company_id: Uuid,
    ) -> Result<Option<CompanyPreferences>, LedgerError>;

    // Members

    /// Add a member. Returns `None` when the email is already a member of the company.
    async fn insert_company_user(
        &mut self,
        company_id: Uuid,
        user_email: &str,
        role: Role,
    ) -> Result<Option<CompanyUser>, LedgerError>;

    /// Members of a company, newest first.
    async fn list_company_users(
        &mut self,
        company_id: Uuid,
    ) -> Result<Vec<CompanyUser>, LedgerError>;

    async fn update_company_user_role(
        &mut self,
        company_id: Uuid,
        member_id: Uuid,
        role: Role,
    ) -> Result<Option<CompanyUser>, LedgerError>;

    /// Returns false when no such member exists in the company.
    async fn delete_company_user(
        &mut self,
        company_id: Uuid,
        member_id: Uuid,
    ) -> Result<bool, LedgerError>;

    // Scope

    async fn commit(self: Box<Self>) -> Result<(), LedgerError>;

    async fn rollback(self: Box<Self>) -> Result<(), LedgerError>;
}
