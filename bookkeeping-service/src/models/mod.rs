//! Domain models for bookkeeping-service.

pub mod account;
mod company;
mod invoice;
mod ledger;
mod member;

pub use account::{Account, AccountType, NewAccount};
pub use company::{Company, CompanyPreferences, CompanyTaxSettings};
pub use invoice::{CreateInvoice, Invoice, InvoiceStatus};
pub use ledger::{
    is_storable_amount, totals, EntryLine, EntryStatus, LedgerEntry, LedgerLine, NewLedgerEntry,
    NewLedgerLine, PostEntry, PostLine, SourceType,
};
pub use member::{CompanyUser, Role};
