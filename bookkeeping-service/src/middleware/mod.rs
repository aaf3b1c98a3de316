pub mod company;

pub use company::{CompanyContext, Role, UserId};
