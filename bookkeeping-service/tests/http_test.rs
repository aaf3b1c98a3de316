//! HTTP surface tests: routing, tenant headers, roles and status codes.

mod common;

use axum::body::Body;
use axum::http::{Request, StatusCode};
use axum::Router;
use bookkeeping_service::startup::build_router;
use common::spawn_app;
use http_body_util::BodyExt;
use serde_json::{json, Value};
use tower::ServiceExt;
use uuid::Uuid;

struct Client {
    router: Router,
}

impl Client {
    fn new() -> Self {
        let app = spawn_app();
        Self {
            router: build_router(app.state),
        }
    }

    async fn send(
        &self,
        method: &str,
        uri: &str,
        company_id: Option<Uuid>,
        role: Option<&str>,
        body: Option<Value>,
    ) -> (StatusCode, Value) {
        let mut builder = Request::builder()
            .method(method)
            .uri(uri)
            .header("x-user-id", "user-1");
        if let Some(company_id) = company_id {
            builder = builder.header("x-company-id", company_id.to_string());
        }
        if let Some(role) = role {
            builder = builder.header("x-user-role", role);
        }

        let request = match body {
            Some(body) => builder
                .header("content-type", "application/json")
                .body(Body::from(body.to_string()))
                .unwrap(),
            None => builder.body(Body::empty()).unwrap(),
        };

        let response = self.router.clone().oneshot(request).await.unwrap();
        let status = response.status();
        let bytes = response.into_body().collect().await.unwrap().to_bytes();
        let value = if bytes.is_empty() {
            Value::Null
        } else {
            serde_json::from_slice(&bytes).unwrap_or(Value::Null)
        };
        (status, value)
    }

    async fn onboard(&self) -> Uuid {
        let (status, body) = self
            .send("POST", "/companies", None, None, Some(json!({ "name": "Http Co" })))
            .await;
        assert_eq!(status, StatusCode::CREATED);
        body["id"].as_str().unwrap().parse().unwrap()
    }
}

#[tokio::test]
async fn health_reports_ok() {
    let client = Client::new();

    let (status, body) = client.send("GET", "/health", None, None, None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "ok");
    assert_eq!(body["service"], "bookkeeping-service");
}

#[tokio::test]
async fn company_header_is_required() {
    let client = Client::new();

    let (status, _) = client.send("GET", "/accounts", None, None, None).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);

    let request = Request::builder()
        .uri("/accounts")
        .header("x-company-id", "not-a-uuid")
        .body(Body::empty())
        .unwrap();
    let response = client.router.clone().oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn onboarded_company_lists_its_chart() {
    let client = Client::new();
    let company_id = client.onboard().await;

    let (status, body) = client
        .send("GET", "/accounts", Some(company_id), None, None)
        .await;
    assert_eq!(status, StatusCode::OK);
    let accounts = body.as_array().unwrap();
    assert_eq!(accounts.len(), 10);
    assert_eq!(accounts[0]["code"], 1000);
    assert_eq!(accounts[0]["type"], "asset");

    let (status, body) = client
        .send("GET", "/companies/me", Some(company_id), None, None)
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["name"], "Http Co");
}

#[tokio::test]
async fn viewers_cannot_write() {
    let client = Client::new();
    let company_id = client.onboard().await;

    let expense = json!({
        "date": "2026-06-01",
        "description": "Paper",
        "amount": "12.50",
        "expense_account_code": 5200
    });

    let (status, _) = client
        .send("POST", "/expenses", Some(company_id), None, Some(expense.clone()))
        .await;
    assert_eq!(status, StatusCode::FORBIDDEN);

    let (status, body) = client
        .send("POST", "/expenses", Some(company_id), Some("accountant"), Some(expense))
        .await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(body["success"], true);

    let (status, body) = client
        .send("GET", "/expenses", Some(company_id), None, None)
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body[0]["category"], "Operating Expenses");
    assert_eq!(body[0]["amount"], "12.50");
}

#[tokio::test]
async fn invalid_request_body_is_unprocessable() {
    let client = Client::new();
    let company_id = client.onboard().await;

    let (status, body) = client
        .send(
            "POST",
            "/accounts",
            Some(company_id),
            Some("admin"),
            Some(json!({ "code": 9100, "name": "Out of range", "type": "expense" })),
        )
        .await;
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
    assert!(body["error"].is_string());
}

#[tokio::test]
async fn duplicate_account_is_conflict() {
    let client = Client::new();
    let company_id = client.onboard().await;

    let (status, _) = client
        .send(
            "POST",
            "/accounts",
            Some(company_id),
            Some("admin"),
            Some(json!({ "code": 5100, "name": "Rent again", "type": "expense" })),
        )
        .await;
    assert_eq!(status, StatusCode::CONFLICT);
}

#[tokio::test]
async fn invoice_flow_over_http() {
    let client = Client::new();
    let company_id = client.onboard().await;

    let (status, issued) = client
        .send(
            "POST",
            "/invoices",
            Some(company_id),
            Some("accountant"),
            Some(json!({
                "customer_name": "Globex",
                "invoice_number": "INV-9",
                "date": "2026-06-15",
                "subtotal": 1000,
                "vat": 75,
                "total": 1075
            })),
        )
        .await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(issued["status"], "sent");
    assert!(issued["ledger_entry_id"].is_string());

    let invoice_id = issued["id"].as_str().unwrap().to_string();
    let pay_uri = format!("/invoices/{}/pay", invoice_id);

    let (status, paid) = client
        .send(
            "POST",
            &pay_uri,
            Some(company_id),
            Some("accountant"),
            Some(json!({ "amount": 1075 })),
        )
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(paid["status"], "paid");

    let (status, _) = client
        .send(
            "POST",
            &pay_uri,
            Some(company_id),
            Some("accountant"),
            Some(json!({ "amount": 1075 })),
        )
        .await;
    assert_eq!(status, StatusCode::CONFLICT);

    let (status, statement) = client
        .send("GET", "/reports/income-statement", Some(company_id), None, None)
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(statement["income"], "1000");

    let (status, vat) = client
        .send("GET", "/reports/vat?year=2026", Some(company_id), None, None)
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(vat["vat"][0]["month"], 6);
    assert_eq!(vat["vat"][0]["vat_amount"], "75");
}

#[tokio::test]
async fn unbalanced_manual_entry_is_bad_request() {
    let client = Client::new();
    let company_id = client.onboard().await;

    let (status, body) = client
        .send(
            "POST",
            "/ledger/entries",
            Some(company_id),
            Some("admin"),
            Some(json!({
                "date": "2026-06-20",
                "description": "Typo",
                "lines": [
                    { "account_code": 1000, "debit": 100 },
                    { "account_code": 3000, "credit": 99 }
                ]
            })),
        )
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body["error"].as_str().unwrap().contains("Double-entry"));

    let (status, body) = client
        .send("GET", "/ledger/recent?limit=3", Some(company_id), None, None)
        .await;
    assert_eq!(status, StatusCode::OK);
    assert!(body.as_array().unwrap().is_empty());
}

#[tokio::test]
async fn settings_round_trip() {
    let client = Client::new();
    let company_id = client.onboard().await;

    let (status, body) = client
        .send("GET", "/settings/tax", Some(company_id), None, None)
        .await;
    assert_eq!(status, StatusCode::OK);
    assert!(body.is_null());

    let (status, body) = client
        .send(
            "PUT",
            "/settings/tax",
            Some(company_id),
            Some("admin"),
            Some(json!({ "vat_enabled": true })),
        )
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["vat_enabled"], true);
    assert_eq!(body["vat_rate"], "7.5");

    let (status, body) = client
        .send(
            "PUT",
            "/settings/preferences",
            Some(company_id),
            Some("admin"),
            Some(json!({ "default_currency": "ngn", "timezone": "Africa/Lagos" })),
        )
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["default_currency"], "NGN");

    let (status, body) = client
        .send("GET", "/settings/preferences", Some(company_id), None, None)
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["timezone"], "Africa/Lagos");
}

#[tokio::test]
async fn members_are_managed_by_admins() {
    let client = Client::new();
    let company_id = client.onboard().await;
    let member = json!({ "user_email": "ada@example.com", "role": "accountant" });

    let (status, _) = client
        .send("POST", "/users", Some(company_id), Some("accountant"), Some(member.clone()))
        .await;
    assert_eq!(status, StatusCode::FORBIDDEN);

    let (status, added) = client
        .send("POST", "/users", Some(company_id), Some("admin"), Some(member.clone()))
        .await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(added["role"], "accountant");

    let (status, _) = client
        .send("POST", "/users", Some(company_id), Some("admin"), Some(member))
        .await;
    assert_eq!(status, StatusCode::CONFLICT);

    let (status, _) = client
        .send(
            "POST",
            "/users",
            Some(company_id),
            Some("admin"),
            Some(json!({ "user_email": "not-an-email", "role": "viewer" })),
        )
        .await;
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);

    let member_uri = format!("/users/{}", added["id"].as_str().unwrap());
    let (status, updated) = client
        .send(
            "PUT",
            &member_uri,
            Some(company_id),
            Some("admin"),
            Some(json!({ "role": "viewer" })),
        )
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(updated["role"], "viewer");

    let (status, members) = client
        .send("GET", "/users", Some(company_id), None, None)
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(members.as_array().unwrap().len(), 1);

    let (status, body) = client
        .send("DELETE", &member_uri, Some(company_id), Some("admin"), None)
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["success"], true);

    let (status, _) = client
        .send("DELETE", &member_uri, Some(company_id), Some("admin"), None)
        .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn sub_cent_expense_is_bad_request() {
    let client = Client::new();
    let company_id = client.onboard().await;

    let (status, _) = client
        .send(
            "POST",
            "/expenses",
            Some(company_id),
            Some("accountant"),
            Some(json!({
                "date": "2026-06-02",
                "description": "Fraction",
                "amount": "0.004",
                "expense_account_code": 5200
            })),
        )
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}
