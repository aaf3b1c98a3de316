pub mod accounts;
pub mod health;
pub mod ledger;
pub mod reports;
pub mod settings;
pub mod transactions;
pub mod users;

pub use accounts::{create_account, create_company, get_company, init_accounts, list_accounts};
pub use health::{health_check, metrics_endpoint, readiness_check};
pub use ledger::{list_ledger, post_manual_entry, recent_activity};
pub use reports::{balance_sheet, dashboard, income_statement, vat_report};
pub use settings::{get_preferences, get_tax_settings, save_preferences, save_tax_settings};
pub use transactions::{
    create_expense, create_income, create_invoice, list_expenses, list_invoices, pay_invoice,
};
pub use users::{add_member, change_member_role, list_members, remove_member};

use crate::services::error::LedgerError;
use crate::services::metrics::record_error;
use service_core::error::AppError;

/// Log and count a failed operation, then convert it for the response.
pub(crate) fn fail(operation: &'static str) -> impl Fn(LedgerError) -> AppError {
    move |err| {
        tracing::warn!(operation = operation, error = %err, "Operation failed");
        record_error(err.kind());
        err.into()
    }
}
