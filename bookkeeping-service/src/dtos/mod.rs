pub mod accounts;
pub mod settings;
pub mod transactions;
pub mod users;

pub use accounts::{CreateAccountRequest, CreateCompanyRequest, SeedResponse};
pub use settings::{PreferencesRequest, TaxSettingsRequest};
pub use transactions::{
    CreateExpenseRequest, CreateIncomeRequest, CreateInvoiceRequest, EntryCreatedResponse,
    ManualEntryRequest, PayInvoiceRequest, RecentParams, VatParams,
};
pub use users::{AddMemberRequest, ChangeRoleRequest};
