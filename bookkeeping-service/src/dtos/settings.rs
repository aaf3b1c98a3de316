use crate::models::CompanyTaxSettings;
use crate::services::{PreferencesInput, TaxSettingsInput};
use rust_decimal::Decimal;
use serde::Deserialize;
use validator::Validate;

fn default_vat_rate() -> Decimal {
    CompanyTaxSettings::DEFAULT_VAT_RATE
}

#[derive(Debug, Clone, Deserialize)]
pub struct TaxSettingsRequest {
    #[serde(default)]
    pub vat_enabled: bool,
    #[serde(default = "default_vat_rate")]
    pub vat_rate: Decimal,
    #[serde(default)]
    pub paye_enabled: bool,
    #[serde(default)]
    pub withholding_enabled: bool,
    #[serde(default)]
    pub stamp_duty_enabled: bool,
}

impl From<TaxSettingsRequest> for TaxSettingsInput {
    fn from(req: TaxSettingsRequest) -> Self {
        TaxSettingsInput {
            vat_enabled: req.vat_enabled,
            vat_rate: req.vat_rate,
            paye_enabled: req.paye_enabled,
            withholding_enabled: req.withholding_enabled,
            stamp_duty_enabled: req.stamp_duty_enabled,
        }
    }
}

#[derive(Debug, Clone, Deserialize, Validate)]
pub struct PreferencesRequest {
    /// ISO 4217 code
    #[validate(length(equal = 3, message = "Currency must be a 3-letter ISO 4217 code"))]
    pub default_currency: Option<String>,
    #[validate(length(min = 1, max = 64))]
    pub timezone: Option<String>,
    #[validate(length(min = 1, max = 32))]
    pub date_format: Option<String>,
}

impl From<PreferencesRequest> for PreferencesInput {
    fn from(req: PreferencesRequest) -> Self {
        PreferencesInput {
            default_currency: req.default_currency,
            timezone: req.timezone,
            date_format: req.date_format,
        }
    }
}
