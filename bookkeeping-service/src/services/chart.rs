//! Per-company chart of accounts.

use crate::models::account::default_chart;
use crate::models::{Account, AccountType, NewAccount};
use crate::services::error::LedgerError;
use crate::services::metrics::ACCOUNTS_CREATED;
use crate::services::store::{LedgerStore, StoreTx};
use std::collections::{BTreeSet, HashMap};
use std::sync::Arc;
use tracing::{info, instrument};
use uuid::Uuid;

#[derive(Clone)]
pub struct ChartOfAccounts {
    store: Arc<dyn LedgerStore>,
}

impl ChartOfAccounts {
    pub fn new(store: Arc<dyn LedgerStore>) -> Self {
        Self { store }
    }

    /// Insert the default chart for a company and return its full chart.
    /// Codes that already exist are left untouched.
    #[instrument(skip(self), fields(company_id = %company_id))]
    pub async fn seed_defaults(&self, company_id: Uuid) -> Result<Vec<Account>, LedgerError> {
        let mut tx = self.store.begin().await?;
        seed_defaults_in(&mut *tx, company_id).await?;
        let accounts = tx.list_accounts(company_id).await?;
        tx.commit().await?;
        Ok(accounts)
    }

    /// Create one account. The code must be free and match the account type's range.
    #[instrument(skip(self, account), fields(company_id = %company_id, code = account.code))]
    pub async fn create_account(
        &self,
        company_id: Uuid,
        account: NewAccount,
    ) -> Result<Account, LedgerError> {
        validate_new_account(&account)?;

        let mut tx = self.store.begin().await?;
        let created = tx
            .insert_account(company_id, &account)
            .await?
            .ok_or(LedgerError::DuplicateAccountCode(account.code))?;
        tx.commit().await?;

        ACCOUNTS_CREATED
            .with_label_values(&[created.account_type.as_str()])
            .inc();
        info!(account_id = %created.id, code = created.code, "Account created");

        Ok(created)
    }

    /// Accounts ordered by code ascending.
    #[instrument(skip(self), fields(company_id = %company_id))]
    pub async fn list_accounts(&self, company_id: Uuid) -> Result<Vec<Account>, LedgerError> {
        let mut tx = self.store.begin().await?;
        let accounts = tx.list_accounts(company_id).await?;
        tx.commit().await?;
        Ok(accounts)
    }

    /// Map each requested code that exists to its account id.
    #[instrument(skip(self, codes), fields(company_id = %company_id))]
    pub async fn resolve_codes(
        &self,
        company_id: Uuid,
        codes: &BTreeSet<i32>,
    ) -> Result<HashMap<i32, Uuid>, LedgerError> {
        let mut tx = self.store.begin().await?;
        let resolved = resolve_codes_in(&mut *tx, company_id, codes).await?;
        tx.commit().await?;
        Ok(resolved)
    }
}

/// Seed the default chart inside an open scope. Returns how many accounts were added.
pub async fn seed_defaults_in(
    tx: &mut dyn StoreTx,
    company_id: Uuid,
) -> Result<usize, LedgerError> {
    let mut inserted = 0;
    for account in default_chart() {
        if let Some(created) = tx.insert_account(company_id, &account).await? {
            ACCOUNTS_CREATED
                .with_label_values(&[created.account_type.as_str()])
                .inc();
            inserted += 1;
        }
    }

    info!(company_id = %company_id, inserted = inserted, "Default chart seeded");
    Ok(inserted)
}

/// Resolve codes inside an open scope. Missing codes are simply absent from the map.
pub async fn resolve_codes_in(
    tx: &mut dyn StoreTx,
    company_id: Uuid,
    codes: &BTreeSet<i32>,
) -> Result<HashMap<i32, Uuid>, LedgerError> {
    let wanted: Vec<i32> = codes.iter().copied().collect();
    let accounts = tx.find_accounts_by_code(company_id, &wanted).await?;
    Ok(accounts.into_iter().map(|a| (a.code, a.id)).collect())
}

fn validate_new_account(account: &NewAccount) -> Result<(), LedgerError> {
    if account.name.trim().is_empty() {
        return Err(LedgerError::Validation("Account name is required".into()));
    }

    match AccountType::for_code(account.code) {
        None => Err(LedgerError::Validation(format!(
            "Account code {} is outside 1000-5999",
            account.code
        ))),
        Some(expected) if expected != account.account_type => {
            Err(LedgerError::Validation(format!(
                "Account code {} belongs to type {}, not {}",
                account.code, expected, account.account_type
            )))
        }
        Some(_) => Ok(()),
    }
}
