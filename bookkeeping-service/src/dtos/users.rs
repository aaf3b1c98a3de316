use crate::models::Role;
use serde::Deserialize;
use validator::Validate;

#[derive(Debug, Clone, Deserialize, Validate)]
pub struct AddMemberRequest {
    #[validate(email(message = "Invalid email format"))]
    pub user_email: String,
    pub role: Role,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ChangeRoleRequest {
    pub role: Role,
}
