//! Chart-of-accounts model.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use std::ops::RangeInclusive;
use uuid::Uuid;

pub const ASSET_CODES: RangeInclusive<i32> = 1000..=1999;
pub const LIABILITY_CODES: RangeInclusive<i32> = 2000..=2999;
pub const EQUITY_CODES: RangeInclusive<i32> = 3000..=3999;
pub const INCOME_CODES: RangeInclusive<i32> = 4000..=4999;
pub const EXPENSE_CODES: RangeInclusive<i32> = 5000..=5999;

pub const CASH: i32 = 1000;
pub const ACCOUNTS_RECEIVABLE: i32 = 1100;
pub const VAT_PAYABLE: i32 = 2100;
pub const OWNERS_EQUITY: i32 = 3000;
pub const REVENUE: i32 = 4000;

/// Account types following standard accounting categories.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AccountType {
    Asset,
    Liability,
    Equity,
    Income,
    Expense,
}

impl AccountType {
    /// Get string representation for database.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Asset => "asset",
            Self::Liability => "liability",
            Self::Equity => "equity",
            Self::Income => "income",
            Self::Expense => "expense",
        }
    }

    /// The type implied by an account code, if the code lies in a known range.
    pub fn for_code(code: i32) -> Option<Self> {
        if ASSET_CODES.contains(&code) {
            Some(Self::Asset)
        } else if LIABILITY_CODES.contains(&code) {
            Some(Self::Liability)
        } else if EQUITY_CODES.contains(&code) {
            Some(Self::Equity)
        } else if INCOME_CODES.contains(&code) {
            Some(Self::Income)
        } else if EXPENSE_CODES.contains(&code) {
            Some(Self::Expense)
        } else {
            None
        }
    }
}

impl std::fmt::Display for AccountType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl std::str::FromStr for AccountType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "asset" => Ok(Self::Asset),
            "liability" => Ok(Self::Liability),
            "equity" => Ok(Self::Equity),
            "income" => Ok(Self::Income),
            "expense" => Ok(Self::Expense),
            other => Err(format!("Unknown account type: {}", other)),
        }
    }
}

impl TryFrom<String> for AccountType {
    type Error = String;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

/// Ledger account belonging to one company.
#[derive(Debug, Clone, FromRow, Serialize, Deserialize)]
pub struct Account {
    pub id: Uuid,
    pub company_id: Uuid,
    pub code: i32,
    pub name: String,
    #[sqlx(rename = "type", try_from = "String")]
    #[serde(rename = "type")]
    pub account_type: AccountType,
    pub created_at: DateTime<Utc>,
}

/// Input for creating a new account.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewAccount {
    pub code: i32,
    pub name: String,
    pub account_type: AccountType,
}

impl NewAccount {
    pub fn new(code: i32, name: impl Into<String>, account_type: AccountType) -> Self {
        Self {
            code,
            name: name.into(),
            account_type,
        }
    }
}

/// Fixed chart seeded for every company at onboarding.
pub fn default_chart() -> Vec<NewAccount> {
    vec![
        NewAccount::new(CASH, "Cash", AccountType::Asset),
        NewAccount::new(ACCOUNTS_RECEIVABLE, "Accounts Receivable", AccountType::Asset),
        NewAccount::new(REVENUE, "Revenue", AccountType::Income),
        NewAccount::new(5100, "Rent Expense", AccountType::Expense),
        NewAccount::new(5200, "Operating Expenses", AccountType::Expense),
        NewAccount::new(5300, "Utilities Expense", AccountType::Expense),
        NewAccount::new(5400, "Maintenance Expense", AccountType::Expense),
        NewAccount::new(5500, "Staff Costs", AccountType::Expense),
        NewAccount::new(VAT_PAYABLE, "VAT Payable", AccountType::Liability),
        NewAccount::new(OWNERS_EQUITY, "Owner's Equity", AccountType::Equity),
    ]
}

/// True when `code` is part of [`default_chart`].
pub fn is_default_code(code: i32) -> bool {
    default_chart().iter().any(|a| a.code == code)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_code_ranges_map_to_types() {
        assert_eq!(AccountType::for_code(1000), Some(AccountType::Asset));
        assert_eq!(AccountType::for_code(2100), Some(AccountType::Liability));
        assert_eq!(AccountType::for_code(3999), Some(AccountType::Equity));
        assert_eq!(AccountType::for_code(4000), Some(AccountType::Income));
        assert_eq!(AccountType::for_code(5500), Some(AccountType::Expense));
        assert_eq!(AccountType::for_code(999), None);
        assert_eq!(AccountType::for_code(6000), None);
    }

    #[test]
    fn test_default_chart_respects_ranges() {
        for account in default_chart() {
            assert_eq!(
                AccountType::for_code(account.code),
                Some(account.account_type),
                "account {} has the wrong type",
                account.code
            );
        }
    }

    #[test]
    fn test_default_chart_codes_unique() {
        let mut codes: Vec<i32> = default_chart().iter().map(|a| a.code).collect();
        codes.sort_unstable();
        codes.dedup();
        assert_eq!(codes.len(), default_chart().len());
    }

    #[test]
    fn test_account_type_round_trips_through_str() {
        for t in [
            AccountType::Asset,
            AccountType::Liability,
            AccountType::Equity,
            AccountType::Income,
            AccountType::Expense,
        ] {
            assert_eq!(t.as_str().parse::<AccountType>(), Ok(t));
        }
        assert!("revenue".parse::<AccountType>().is_err());
    }
}
