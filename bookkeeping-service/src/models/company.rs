//! Company profile and per-company configuration rows.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Company {
    pub id: Uuid,
    pub name: String,
    pub tin: Option<String>,
    pub rc: Option<String>,
    pub industry: Option<String>,
    pub vat_registered: bool,
    pub created_at: DateTime<Utc>,
}

/// One row per company; referenced by the VAT report.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, FromRow)]
pub struct CompanyTaxSettings {
    pub company_id: Uuid,
    pub vat_enabled: bool,
    pub vat_rate: Decimal,
    pub paye_enabled: bool,
    pub withholding_enabled: bool,
    pub stamp_duty_enabled: bool,
    pub updated_at: DateTime<Utc>,
}

impl CompanyTaxSettings {
    pub const DEFAULT_VAT_RATE: Decimal = dec!(7.5);

    pub fn defaults(company_id: Uuid) -> Self {
        Self {
            company_id,
            vat_enabled: false,
            vat_rate: Self::DEFAULT_VAT_RATE,
            paye_enabled: false,
            withholding_enabled: false,
            stamp_duty_enabled: false,
            updated_at: Utc::now(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, FromRow)]
pub struct CompanyPreferences {
    pub company_id: Uuid,
    pub default_currency: Option<String>,
    pub timezone: Option<String>,
    pub date_format: Option<String>,
    pub updated_at: DateTime<Utc>,
}
