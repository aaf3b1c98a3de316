use crate::models::{AccountType, NewAccount};
use serde::{Deserialize, Serialize};
use uuid::Uuid;
use validator::Validate;

#[derive(Debug, Clone, Deserialize, Validate)]
pub struct CreateCompanyRequest {
    #[validate(length(min = 1, max = 200, message = "Company name must be 1-200 characters"))]
    pub name: String,
}

#[derive(Debug, Clone, Deserialize, Validate)]
pub struct CreateAccountRequest {
    #[validate(range(min = 1000, max = 5999, message = "Account code must be within 1000-5999"))]
    pub code: i32,
    #[validate(length(min = 1, max = 100, message = "Account name must be 1-100 characters"))]
    pub name: String,
    #[serde(rename = "type")]
    pub account_type: AccountType,
}

impl From<CreateAccountRequest> for NewAccount {
    fn from(req: CreateAccountRequest) -> Self {
        NewAccount::new(req.code, req.name, req.account_type)
    }
}

#[derive(Debug, Serialize)]
pub struct SeedResponse {
    pub company_id: Uuid,
    pub accounts: usize,
}
