//! Services for bookkeeping-service.

pub mod chart;
pub mod database;
pub mod documents;
pub mod error;
pub mod memory;
pub mod metrics;
pub mod posting;
pub mod reports;
pub mod settings;
pub mod store;
pub mod users;

pub use chart::ChartOfAccounts;
pub use database::Database;
pub use documents::{DocumentWorkflows, ExpenseInput, ExpenseRow, IncomeInput, IssuedInvoice};
pub use error::LedgerError;
pub use memory::InMemoryStore;
pub use metrics::{get_metrics, init_metrics};
pub use posting::PostingEngine;
pub use reports::Reports;
pub use settings::{CompanySettings, PreferencesInput, TaxSettingsInput};
pub use store::{LedgerStore, StoreTx};
pub use users::CompanyUsers;
