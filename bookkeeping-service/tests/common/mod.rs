//! Common test utilities for bookkeeping-service integration tests.

#![allow(dead_code)]

use bookkeeping_service::models::{CreateInvoice, EntryStatus};
use bookkeeping_service::services::reports::LedgerRow;
use bookkeeping_service::services::{ExpenseInput, InMemoryStore, LedgerStore};
use bookkeeping_service::startup::AppState;
use chrono::NaiveDate;
use rust_decimal::Decimal;
use std::sync::{Arc, Once};
use uuid::Uuid;

static INIT: Once = Once::new();

/// Initialize tracing for tests (only once).
pub fn init_tracing() {
    INIT.call_once(|| {
        tracing_subscriber::fmt()
            .with_env_filter("info,bookkeeping_service=debug,sqlx=warn")
            .with_test_writer()
            .try_init()
            .ok();
    });
}

pub struct TestApp {
    pub store: InMemoryStore,
    pub state: AppState,
}

/// Application state over a fresh in-memory store.
pub fn spawn_app() -> TestApp {
    init_tracing();

    let store = InMemoryStore::new();
    let state = AppState::new(Arc::new(store.clone()));
    TestApp { store, state }
}

impl TestApp {
    /// Onboard a company with its default chart.
    pub async fn onboard(&self, name: &str) -> Uuid {
        self.state
            .settings
            .create_company(name)
            .await
            .expect("Failed to create company")
            .id
    }

    /// Insert a company row without seeding any accounts.
    pub async fn bare_company(&self, name: &str) -> Uuid {
        let mut tx = self.store.begin().await.expect("Failed to open scope");
        let company = tx
            .insert_company(name)
            .await
            .expect("Failed to insert company");
        tx.commit().await.expect("Failed to commit");
        company.id
    }

    pub async fn ledger(&self, company_id: Uuid) -> Vec<LedgerRow> {
        self.state
            .reports
            .list_ledger(company_id)
            .await
            .expect("Failed to list ledger")
    }

    pub async fn posted_count(&self, company_id: Uuid) -> usize {
        self.ledger(company_id)
            .await
            .iter()
            .filter(|row| row.status == EntryStatus::Posted)
            .count()
    }
}

pub fn date(year: i32, month: u32, day: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(year, month, day).expect("valid date")
}

pub fn expense(on: NaiveDate, description: &str, code: i32, amount: Decimal) -> ExpenseInput {
    ExpenseInput {
        date: on,
        description: description.to_string(),
        amount,
        expense_account_code: code,
        payment_account_code: 1000,
    }
}

pub fn invoice(
    company_id: Uuid,
    number: &str,
    on: NaiveDate,
    subtotal: Decimal,
    vat: Decimal,
) -> CreateInvoice {
    CreateInvoice {
        company_id,
        customer_id: None,
        customer_name: "Acme Ltd".to_string(),
        invoice_number: number.to_string(),
        date: on,
        subtotal,
        vat,
        total: subtotal + vat,
        payload: serde_json::json!({ "items": [] }),
    }
}
