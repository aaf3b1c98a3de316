use rust_decimal::Decimal;
use service_core::error::AppError;
use thiserror::Error;
use uuid::Uuid;

#[derive(Error, Debug)]
pub enum LedgerError {
    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Invalid amount: {0}")]
    InvalidAmount(Decimal),

    #[error("Double-entry violation: debits ({debits}) != credits ({credits})")]
    Unbalanced { debits: Decimal, credits: Decimal },

    #[error("Account {0} not found for company")]
    MissingAccount(i32),

    #[error("Account with code {0} already exists for company")]
    DuplicateAccountCode(i32),

    #[error("Pending ledger entry not found for invoice {0}")]
    PendingEntryNotFound(Uuid),

    #[error("Ledger entry {0} not found for company")]
    EntryNotFound(Uuid),

    #[error("Invoice {0} not found")]
    InvoiceNotFound(Uuid),

    #[error("Company {0} not found")]
    CompanyNotFound(Uuid),

    #[error("User {0} is already a member of this company")]
    DuplicateMember(String),

    #[error("Company member {0} not found")]
    MemberNotFound(Uuid),

    #[error("Store failure: {0}")]
    Store(#[from] anyhow::Error),
}

impl LedgerError {
    /// Short label used for the error counter.
    pub fn kind(&self) -> &'static str {
        match self {
            LedgerError::Validation(_) => "validation",
            LedgerError::InvalidAmount(_) => "invalid_amount",
            LedgerError::Unbalanced { .. } => "unbalanced",
            LedgerError::MissingAccount(_) => "missing_account",
            LedgerError::DuplicateAccountCode(_) => "duplicate_account_code",
            LedgerError::PendingEntryNotFound(_) => "pending_entry_not_found",
            LedgerError::EntryNotFound(_) => "entry_not_found",
            LedgerError::InvoiceNotFound(_) => "invoice_not_found",
            LedgerError::CompanyNotFound(_) => "company_not_found",
            LedgerError::DuplicateMember(_) => "duplicate_member",
            LedgerError::MemberNotFound(_) => "member_not_found",
            LedgerError::Store(_) => "store",
        }
    }

    pub(crate) fn store(context: &str, err: impl std::fmt::Display) -> Self {
        LedgerError::Store(anyhow::anyhow!("{}: {}", context, err))
    }
}

impl From<LedgerError> for AppError {
    fn from(err: LedgerError) -> Self {
        let message = err.to_string();
        match err {
            LedgerError::Validation(_)
            | LedgerError::InvalidAmount(_)
            | LedgerError::Unbalanced { .. } => AppError::BadRequest(anyhow::anyhow!(message)),
            LedgerError::DuplicateAccountCode(_)
            | LedgerError::PendingEntryNotFound(_)
            | LedgerError::DuplicateMember(_) => AppError::Conflict(anyhow::anyhow!(message)),
            LedgerError::EntryNotFound(_)
            | LedgerError::InvoiceNotFound(_)
            | LedgerError::CompanyNotFound(_)
            | LedgerError::MemberNotFound(_) => AppError::NotFound(anyhow::anyhow!(message)),
            LedgerError::MissingAccount(_) => AppError::InternalError(anyhow::anyhow!(message)),
            LedgerError::Store(e) => AppError::DatabaseError(e),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::StatusCode;
    use rust_decimal_macros::dec;

    #[test]
    fn test_client_faults_map_to_bad_request() {
        let err: AppError = LedgerError::InvalidAmount(dec!(0)).into();
        assert_eq!(err.status_code(), StatusCode::BAD_REQUEST);

        let err: AppError = LedgerError::Unbalanced {
            debits: dec!(10),
            credits: dec!(9),
        }
        .into();
        assert_eq!(err.status_code(), StatusCode::BAD_REQUEST);
    }

    #[test]
    fn test_missing_account_is_server_fault() {
        let err: AppError = LedgerError::MissingAccount(1100).into();
        assert_eq!(err.status_code(), StatusCode::INTERNAL_SERVER_ERROR);
    }

    #[test]
    fn test_state_faults_map_to_conflict() {
        let err: AppError = LedgerError::PendingEntryNotFound(Uuid::nil()).into();
        assert_eq!(err.status_code(), StatusCode::CONFLICT);

        let err: AppError = LedgerError::DuplicateAccountCode(1000).into();
        assert_eq!(err.status_code(), StatusCode::CONFLICT);

        let err: AppError = LedgerError::DuplicateMember("ada@example.com".into()).into();
        assert_eq!(err.status_code(), StatusCode::CONFLICT);
    }

    #[test]
    fn test_foreign_or_unknown_rows_map_to_not_found() {
        let err: AppError = LedgerError::EntryNotFound(Uuid::nil()).into();
        assert_eq!(err.status_code(), StatusCode::NOT_FOUND);

        let err: AppError = LedgerError::MemberNotFound(Uuid::nil()).into();
        assert_eq!(err.status_code(), StatusCode::NOT_FOUND);
    }

    #[test]
    fn test_unbalanced_message_names_both_sides() {
        let err = LedgerError::Unbalanced {
            debits: dec!(100.00),
            credits: dec!(90.00),
        };
        assert_eq!(
            err.to_string(),
            "Double-entry violation: debits (100.00) != credits (90.00)"
        );
    }
}
