//! Company onboarding and per-company configuration.

use crate::models::{is_storable_amount, Company, CompanyPreferences, CompanyTaxSettings};
use crate::services::chart::seed_defaults_in;
use crate::services::error::LedgerError;
use crate::services::store::LedgerStore;
use chrono::Utc;
use rust_decimal::Decimal;
use std::sync::Arc;
use tracing::{info, instrument};
use uuid::Uuid;

#[derive(Debug, Clone)]
pub struct TaxSettingsInput {
    pub vat_enabled: bool,
    pub vat_rate: Decimal,
    pub paye_enabled: bool,
    pub withholding_enabled: bool,
    pub stamp_duty_enabled: bool,
}

impl Default for TaxSettingsInput {
    fn default() -> Self {
        Self {
            vat_enabled: false,
            vat_rate: CompanyTaxSettings::DEFAULT_VAT_RATE,
            paye_enabled: false,
            withholding_enabled: false,
            stamp_duty_enabled: false,
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct PreferencesInput {
    pub default_currency: Option<String>,
    pub timezone: Option<String>,
    pub date_format: Option<String>,
}

#[derive(Clone)]
pub struct CompanySettings {
    store: Arc<dyn LedgerStore>,
}

impl CompanySettings {
    pub fn new(store: Arc<dyn LedgerStore>) -> Self {
        Self { store }
    }

    /// Create a company and seed its default chart in the same scope.
    #[instrument(skip(self))]
    pub async fn create_company(&self, name: &str) -> Result<Company, LedgerError> {
        let name = name.trim();
        if name.is_empty() {
            return Err(LedgerError::Validation("Company name is required".into()));
        }

        let mut tx = self.store.begin().await?;
        let company = tx.insert_company(name).await?;
        seed_defaults_in(&mut *tx, company.id).await?;
        tx.commit().await?;

        info!(company_id = %company.id, "Company created");
        Ok(company)
    }

    #[instrument(skip(self), fields(company_id = %company_id))]
    pub async fn get_company(&self, company_id: Uuid) -> Result<Company, LedgerError> {
        let mut tx = self.store.begin().await?;
        let company = tx.get_company(company_id).await?;
        tx.commit().await?;
        company.ok_or(LedgerError::CompanyNotFound(company_id))
    }

    #[instrument(skip(self), fields(company_id = %company_id))]
    pub async fn get_tax_settings(
        &self,
        company_id: Uuid,
    ) -> Result<Option<CompanyTaxSettings>, LedgerError> {
        let mut tx = self.store.begin().await?;
        let settings = tx.get_tax_settings(company_id).await?;
        tx.commit().await?;
        Ok(settings)
    }

    #[instrument(skip(self, input), fields(company_id = %company_id))]
    pub async fn save_tax_settings(
        &self,
        company_id: Uuid,
        input: TaxSettingsInput,
    ) -> Result<CompanyTaxSettings, LedgerError> {
        if input.vat_rate < Decimal::ZERO
            || input.vat_rate > Decimal::ONE_HUNDRED
            || !is_storable_amount(input.vat_rate)
        {
            return Err(LedgerError::Validation(format!(
                "VAT rate {} must be between 0 and 100 with at most 2 decimal places",
                input.vat_rate
            )));
        }

        let settings = CompanyTaxSettings {
            company_id,
            vat_enabled: input.vat_enabled,
            vat_rate: input.vat_rate,
            paye_enabled: input.paye_enabled,
            withholding_enabled: input.withholding_enabled,
            stamp_duty_enabled: input.stamp_duty_enabled,
            updated_at: Utc::now(),
        };

        let mut tx = self.store.begin().await?;
        let saved = tx.upsert_tax_settings(&settings).await?;
        tx.commit().await?;

        info!(vat_enabled = saved.vat_enabled, vat_rate = %saved.vat_rate, "Tax settings saved");
        Ok(saved)
    }

    #[instrument(skip(self), fields(company_id = %company_id))]
    pub async fn get_preferences(
        &self,
        company_id: Uuid,
    ) -> Result<Option<CompanyPreferences>, LedgerError> {
        let mut tx = self.store.begin().await?;
        let preferences = tx.get_preferences(company_id).await?;
        tx.commit().await?;
        Ok(preferences)
    }

    #[instrument(skip(self, input), fields(company_id = %company_id))]
    pub async fn save_preferences(
        &self,
        company_id: Uuid,
        input: PreferencesInput,
    ) -> Result<CompanyPreferences, LedgerError> {
        let preferences = CompanyPreferences {
            company_id,
            default_currency: input.default_currency.map(|c| c.to_uppercase()),
            timezone: input.timezone,
            date_format: input.date_format,
            updated_at: Utc::now(),
        };

        let mut tx = self.store.begin().await?;
        let saved = tx.upsert_preferences(&preferences).await?;
        tx.commit().await?;
        Ok(saved)
    }
}
