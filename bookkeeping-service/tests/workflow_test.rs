//! Expense, income and invoice workflows end to end.

mod common;

use bookkeeping_service::models::{EntryStatus, InvoiceStatus, PostLine, SourceType};
use bookkeeping_service::services::{IncomeInput, LedgerError};
use common::{date, expense, invoice, spawn_app};
use rust_decimal_macros::dec;
use tokio_test::{assert_err, assert_ok};
use uuid::Uuid;

#[tokio::test]
async fn expense_writes_debit_expense_credit_cash() {
    let app = spawn_app();
    let company_id = app.onboard("Expense Co").await;

    let entry_id = assert_ok!(
        app.state
            .documents
            .record_expense(
                company_id,
                expense(date(2026, 4, 1), "April rent", 5100, dec!(1500))
            )
            .await
    );

    let ledger = app.ledger(company_id).await;
    assert_eq!(ledger.len(), 1);
    let row = &ledger[0];
    assert_eq!(row.id, entry_id);
    assert_eq!(row.status, EntryStatus::Posted);
    assert_eq!(row.source_type, SourceType::Expense);
    assert_eq!(row.lines.len(), 2);
    assert_eq!((row.lines[0].account_code, row.lines[0].credit), (1000, dec!(1500)));
    assert_eq!((row.lines[1].account_code, row.lines[1].debit), (5100, dec!(1500)));

    let expenses = assert_ok!(app.state.documents.list_expenses(company_id).await);
    assert_eq!(expenses.len(), 1);
    assert_eq!(expenses[0].category, "Rent Expense");
    assert_eq!(expenses[0].name, "April rent");
    assert_eq!(expenses[0].amount, dec!(1500));
}

#[tokio::test]
async fn expenses_list_one_row_per_entry() {
    let app = spawn_app();
    let company_id = app.onboard("Listing Co").await;

    for (day, description, code, amount) in [
        (3, "Power bill", 5300, dec!(120)),
        (9, "Generator repair", 5400, dec!(80)),
    ] {
        assert_ok!(
            app.state
                .documents
                .record_expense(company_id, expense(date(2026, 4, day), description, code, amount))
                .await
        );
    }
    assert_ok!(
        app.state
            .posting
            .post_manual_entry(
                company_id,
                date(2026, 4, 10),
                "Accrual".to_string(),
                vec![PostLine::debit(5200, dec!(50)), PostLine::credit(1000, dec!(50))],
            )
            .await
    );

    let expenses = assert_ok!(app.state.documents.list_expenses(company_id).await);
    let listed: Vec<_> = expenses
        .iter()
        .map(|row| (row.name.as_str(), row.category.as_str(), row.amount))
        .collect();
    assert_eq!(
        listed,
        vec![
            ("Generator repair", "Maintenance Expense", dec!(80)),
            ("Power bill", "Utilities Expense", dec!(120)),
        ]
    );
}

#[tokio::test]
async fn non_positive_expense_is_rejected() {
    let app = spawn_app();
    let company_id = app.onboard("Zero Co").await;

    let err = assert_err!(
        app.state
            .documents
            .record_expense(company_id, expense(date(2026, 4, 1), "Nothing", 5100, dec!(0)))
            .await
    );
    assert!(matches!(err, LedgerError::InvalidAmount(_)));
    assert_eq!(app.store.entry_count().await, 0);
}

#[tokio::test]
async fn income_writes_debit_cash_credit_revenue() {
    let app = spawn_app();
    let company_id = app.onboard("Income Co").await;

    assert_ok!(
        app.state
            .documents
            .record_income(
                company_id,
                IncomeInput {
                    date: date(2026, 4, 2),
                    description: "Cash sale".to_string(),
                    amount: dec!(640),
                    income_account_code: 4000,
                    payment_account_code: 1000,
                },
            )
            .await
    );

    let ledger = app.ledger(company_id).await;
    let row = &ledger[0];
    assert_eq!(row.source_type, SourceType::Income);
    assert_eq!((row.lines[0].account_code, row.lines[0].debit), (1000, dec!(640)));
    assert_eq!((row.lines[1].account_code, row.lines[1].credit), (4000, dec!(640)));
}

#[tokio::test]
async fn invoice_is_pending_until_paid() {
    let app = spawn_app();
    let company_id = app.onboard("Invoice Co").await;

    let issued = assert_ok!(
        app.state
            .documents
            .issue_invoice(invoice(company_id, "INV-001", date(2026, 5, 10), dec!(1000), dec!(75)))
            .await
    );
    assert_eq!(issued.invoice.status, InvoiceStatus::Sent);
    assert_eq!(issued.invoice.total, dec!(1075));

    let ledger = app.ledger(company_id).await;
    assert_eq!(ledger.len(), 1);
    let pending = &ledger[0];
    assert_eq!(pending.id, issued.ledger_entry_id);
    assert_eq!(pending.status, EntryStatus::Pending);
    assert_eq!(pending.description, "Invoice INV-001");
    let lines: Vec<_> = pending
        .lines
        .iter()
        .map(|l| (l.account_code, l.debit, l.credit))
        .collect();
    assert_eq!(
        lines,
        vec![
            (1100, dec!(1075), dec!(0)),
            (2100, dec!(0), dec!(75)),
            (4000, dec!(0), dec!(1000)),
        ]
    );

    // Pending entries stay out of reports
    let statement = assert_ok!(app.state.reports.income_statement(company_id).await);
    assert_eq!(statement.income, dec!(0));

    let paid = assert_ok!(
        app.state
            .documents
            .pay_invoice(company_id, issued.invoice.id, dec!(1075))
            .await
    );
    assert_eq!(paid.status, InvoiceStatus::Paid);

    let ledger = app.ledger(company_id).await;
    assert_eq!(ledger.len(), 1);
    assert_eq!(ledger[0].status, EntryStatus::Posted);
    assert_eq!(ledger[0].lines.len(), 5);

    let statement = assert_ok!(app.state.reports.income_statement(company_id).await);
    assert_eq!(statement.income, dec!(1000));

    let sheet = assert_ok!(app.state.reports.balance_sheet(company_id).await);
    assert_eq!(sheet.asset, dec!(1075));
    assert_eq!(sheet.liability, dec!(75));
    assert_eq!(sheet.equity, dec!(1000));

    let invoices = assert_ok!(app.state.documents.list_invoices(company_id).await);
    assert_eq!(invoices.len(), 1);
    assert_eq!(invoices[0].status, InvoiceStatus::Paid);
}

#[tokio::test]
async fn paying_twice_finds_no_pending_entry() {
    let app = spawn_app();
    let company_id = app.onboard("Twice Co").await;

    let issued = assert_ok!(
        app.state
            .documents
            .issue_invoice(invoice(company_id, "INV-002", date(2026, 5, 11), dec!(200), dec!(15)))
            .await
    );
    assert_ok!(
        app.state
            .documents
            .pay_invoice(company_id, issued.invoice.id, dec!(215))
            .await
    );

    let lines_after_first = app.store.line_count().await;
    let err = assert_err!(
        app.state
            .documents
            .pay_invoice(company_id, issued.invoice.id, dec!(215))
            .await
    );
    assert!(matches!(err, LedgerError::PendingEntryNotFound(id) if id == issued.invoice.id));
    assert_eq!(app.store.line_count().await, lines_after_first);
}

#[tokio::test]
async fn paying_unknown_invoice_is_not_found() {
    let app = spawn_app();
    let company_id = app.onboard("Unknown Co").await;

    let err = assert_err!(
        app.state
            .documents
            .pay_invoice(company_id, Uuid::new_v4(), dec!(10))
            .await
    );
    assert!(matches!(err, LedgerError::InvoiceNotFound(_)));
}

#[tokio::test]
async fn invoice_of_another_company_is_not_visible() {
    let app = spawn_app();
    let owner = app.onboard("Owner").await;
    let other = app.onboard("Other").await;

    let issued = assert_ok!(
        app.state
            .documents
            .issue_invoice(invoice(owner, "INV-003", date(2026, 5, 12), dec!(100), dec!(0)))
            .await
    );

    let err = assert_err!(
        app.state
            .documents
            .pay_invoice(other, issued.invoice.id, dec!(100))
            .await
    );
    assert!(matches!(err, LedgerError::InvoiceNotFound(_)));
    assert!(assert_ok!(app.state.documents.list_invoices(other).await).is_empty());
}

#[tokio::test]
async fn invoice_totals_must_add_up() {
    let app = spawn_app();
    let company_id = app.onboard("Totals Co").await;

    let mut input = invoice(company_id, "INV-004", date(2026, 5, 13), dec!(100), dec!(7.5));
    input.total = dec!(110);

    let err = assert_err!(app.state.documents.issue_invoice(input).await);
    assert!(matches!(err, LedgerError::Unbalanced { .. }));
    assert_eq!(app.store.entry_count().await, 0);
    assert!(assert_ok!(app.state.documents.list_invoices(company_id).await).is_empty());
}
