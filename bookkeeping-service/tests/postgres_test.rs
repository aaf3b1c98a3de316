//! PostgreSQL-backed integration tests.
//!
//! Run with: TEST_DATABASE_URL=postgres://... cargo test -p bookkeeping-service -- --ignored

mod common;

use bookkeeping_service::models::{
    AccountType, EntryStatus, InvoiceStatus, NewAccount, PostEntry, PostLine, Role, SourceType,
};
use bookkeeping_service::services::{Database, LedgerError, LedgerStore};
use bookkeeping_service::startup::AppState;
use common::{date, expense, init_tracing, invoice};
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serial_test::serial;
use std::sync::Arc;
use tokio_test::{assert_err, assert_ok};

async fn spawn_pg() -> (Arc<Database>, AppState) {
    init_tracing();

    let database_url = std::env::var("TEST_DATABASE_URL")
        .expect("TEST_DATABASE_URL must be set to run PostgreSQL tests");

    let db = Database::new(&database_url, 2, 1)
        .await
        .expect("Failed to connect to test database");
    db.run_migrations().await.expect("Failed to run migrations");

    let db = Arc::new(db);
    let state = AppState::new(db.clone());
    (db, state)
}

#[tokio::test]
#[ignore]
#[serial]
async fn onboarding_and_duplicate_codes() {
    let (_db, state) = spawn_pg().await;

    let company = assert_ok!(state.settings.create_company("Pg Chart Co").await);
    let accounts = assert_ok!(state.chart.list_accounts(company.id).await);
    assert_eq!(accounts.len(), 10);

    let reseeded = assert_ok!(state.chart.seed_defaults(company.id).await);
    assert_eq!(reseeded.len(), 10);

    let err = assert_err!(
        state
            .chart
            .create_account(
                company.id,
                NewAccount::new(5100, "Rent again", AccountType::Expense)
            )
            .await
    );
    assert!(matches!(err, LedgerError::DuplicateAccountCode(5100)));
}

#[tokio::test]
#[ignore]
#[serial]
async fn missing_account_leaves_no_rows() {
    let (db, state) = spawn_pg().await;

    let company = assert_ok!(state.settings.create_company("Pg Missing Co").await);

    let err = assert_err!(
        state
            .documents
            .record_expense(
                company.id,
                expense(date(2026, 7, 1), "Unknown category", 5999, dec!(10))
            )
            .await
    );
    assert!(matches!(err, LedgerError::MissingAccount(5999)));

    let (entries,): (i64,) =
        sqlx::query_as("SELECT COUNT(*) FROM ledger_entries WHERE company_id = $1")
            .bind(company.id)
            .fetch_one(db.pool())
            .await
            .expect("count query");
    assert_eq!(entries, 0);
}

#[tokio::test]
#[ignore]
#[serial]
async fn invoice_issue_and_payment() {
    let (_db, state) = spawn_pg().await;

    let company = assert_ok!(state.settings.create_company("Pg Invoice Co").await);

    let issued = assert_ok!(
        state
            .documents
            .issue_invoice(invoice(company.id, "PG-001", date(2026, 7, 2), dec!(1000), dec!(75)))
            .await
    );
    let paid = assert_ok!(
        state
            .documents
            .pay_invoice(company.id, issued.invoice.id, dec!(1075))
            .await
    );
    assert_eq!(paid.status, InvoiceStatus::Paid);

    let ledger = assert_ok!(state.reports.list_ledger(company.id).await);
    assert_eq!(ledger.len(), 1);
    assert_eq!(ledger[0].status, EntryStatus::Posted);
    assert_eq!(ledger[0].lines.len(), 5);

    let err = assert_err!(
        state
            .documents
            .pay_invoice(company.id, issued.invoice.id, dec!(1075))
            .await
    );
    assert!(matches!(err, LedgerError::PendingEntryNotFound(_)));

    let sheet = assert_ok!(state.reports.balance_sheet(company.id).await);
    assert_eq!(sheet.asset, sheet.liability + sheet.equity);
}

#[tokio::test]
#[ignore]
#[serial]
async fn stored_lines_stay_balanced() {
    let (db, state) = spawn_pg().await;

    let company = assert_ok!(state.settings.create_company("Pg Cents Co").await);

    let entry_id = assert_ok!(
        state
            .posting
            .post_entry(PostEntry {
                company_id: company.id,
                date: date(2026, 7, 3),
                description: "Split supplies".to_string(),
                source_type: SourceType::Manual,
                source_id: None,
                status: EntryStatus::Posted,
                lines: vec![
                    PostLine::debit(5100, dec!(10.01)),
                    PostLine::debit(5200, dec!(10.00)),
                    PostLine::credit(1000, dec!(20.01)),
                ],
            })
            .await
    );

    let err = assert_err!(
        state
            .posting
            .post_entry(PostEntry {
                company_id: company.id,
                date: date(2026, 7, 3),
                description: "Sub-cent split".to_string(),
                source_type: SourceType::Manual,
                source_id: None,
                status: EntryStatus::Posted,
                lines: vec![
                    PostLine::debit(5100, dec!(10.005)),
                    PostLine::debit(5200, dec!(10.005)),
                    PostLine::credit(1000, dec!(20.01)),
                ],
            })
            .await
    );
    assert!(matches!(err, LedgerError::InvalidAmount(_)));

    let mut tx = db.begin().await.expect("begin");
    let lines = tx.lines_for_entry(entry_id).await.expect("read lines");
    tx.commit().await.expect("commit");

    let debits: Decimal = lines.iter().map(|l| l.debit).sum();
    let credits: Decimal = lines.iter().map(|l| l.credit).sum();
    assert_eq!(lines.len(), 3);
    assert_eq!(debits, credits);
    assert_eq!(debits, dec!(20.01));
}

#[tokio::test]
#[ignore]
#[serial]
async fn append_to_foreign_entry_is_refused() {
    let (_db, state) = spawn_pg().await;

    let owner = assert_ok!(state.settings.create_company("Pg Owner Co").await);
    let intruder = assert_ok!(state.settings.create_company("Pg Intruder Co").await);
    let issued = assert_ok!(
        state
            .documents
            .issue_invoice(invoice(owner.id, "PG-002", date(2026, 7, 4), dec!(100), dec!(0)))
            .await
    );

    let err = assert_err!(
        state
            .posting
            .append_lines(
                intruder.id,
                issued.ledger_entry_id,
                &[PostLine::debit(1000, dec!(7)), PostLine::credit(1100, dec!(7))],
                dec!(7),
            )
            .await
    );
    assert!(matches!(err, LedgerError::EntryNotFound(_)));

    let ledger = assert_ok!(state.reports.list_ledger(owner.id).await);
    assert_eq!(ledger[0].lines.len(), 3);
}

#[tokio::test]
#[ignore]
#[serial]
async fn members_round_trip() {
    let (_db, state) = spawn_pg().await;

    let company = assert_ok!(state.settings.create_company("Pg Members Co").await);
    let member = assert_ok!(
        state
            .users
            .add_member(company.id, "Grace@Example.com", Role::Accountant)
            .await
    );
    assert_eq!(member.user_email, "grace@example.com");

    let err = assert_err!(
        state
            .users
            .add_member(company.id, "grace@example.com", Role::Viewer)
            .await
    );
    assert!(matches!(err, LedgerError::DuplicateMember(_)));

    let updated = assert_ok!(
        state
            .users
            .change_role(company.id, member.id, Role::Admin)
            .await
    );
    assert_eq!(updated.role, Role::Admin);

    assert_ok!(state.users.remove_member(company.id, member.id).await);
    assert!(assert_ok!(state.users.list_members(company.id).await).is_empty());
}
