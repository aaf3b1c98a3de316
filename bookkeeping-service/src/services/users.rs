//! Company membership management.

use crate::models::{CompanyUser, Role};
use crate::services::error::LedgerError;
use crate::services::store::LedgerStore;
use std::sync::Arc;
use tracing::{info, instrument};
use uuid::Uuid;

#[derive(Clone)]
pub struct CompanyUsers {
    store: Arc<dyn LedgerStore>,
}

impl CompanyUsers {
    pub fn new(store: Arc<dyn LedgerStore>) -> Self {
        Self { store }
    }

    #[instrument(skip(self), fields(company_id = %company_id))]
    pub async fn list_members(&self, company_id: Uuid) -> Result<Vec<CompanyUser>, LedgerError> {
        let mut tx = self.store.begin().await?;
        let members = tx.list_company_users(company_id).await?;
        tx.commit().await?;
        Ok(members)
    }

    /// Add a user to the company. Emails compare case-insensitively.
    #[instrument(skip(self, user_email), fields(company_id = %company_id, role = %role))]
    pub async fn add_member(
        &self,
        company_id: Uuid,
        user_email: &str,
        role: Role,
    ) -> Result<CompanyUser, LedgerError> {
        let email = normalize_email(user_email)?;

        let mut tx = self.store.begin().await?;
        if tx.get_company(company_id).await?.is_none() {
            return Err(LedgerError::CompanyNotFound(company_id));
        }
        let member = tx
            .insert_company_user(company_id, &email, role)
            .await?
            .ok_or_else(|| LedgerError::DuplicateMember(email.clone()))?;
        tx.commit().await?;

        info!(member_id = %member.id, "Company member added");
        Ok(member)
    }

    #[instrument(skip(self), fields(company_id = %company_id, member_id = %member_id))]
    pub async fn change_role(
        &self,
        company_id: Uuid,
        member_id: Uuid,
        role: Role,
    ) -> Result<CompanyUser, LedgerError> {
        let mut tx = self.store.begin().await?;
        let member = tx
            .update_company_user_role(company_id, member_id, role)
            .await?
            .ok_or(LedgerError::MemberNotFound(member_id))?;
        tx.commit().await?;

        info!(role = %member.role, "Company member role changed");
        Ok(member)
    }

    #[instrument(skip(self), fields(company_id = %company_id, member_id = %member_id))]
    pub async fn remove_member(&self, company_id: Uuid, member_id: Uuid) -> Result<(), LedgerError> {
        let mut tx = self.store.begin().await?;
        if !tx.delete_company_user(company_id, member_id).await? {
            return Err(LedgerError::MemberNotFound(member_id));
        }
        tx.commit().await?;

        info!("Company member removed");
        Ok(())
    }
}

fn normalize_email(raw: &str) -> Result<String, LedgerError> {
    let email = raw.trim().to_lowercase();
    match email.split_once('@') {
        Some((local, domain)) if !local.is_empty() && !domain.is_empty() => Ok(email),
        _ => Err(LedgerError::Validation(format!(
            "'{}' is not a valid email address",
            raw
        ))),
    }
}
