//! Application startup and lifecycle management.

use crate::config::BookkeepingConfig;
use crate::handlers;
use crate::middleware::company::{COMPANY_ID_HEADER, USER_ID_HEADER, USER_ROLE_HEADER};
use crate::services::{
    init_metrics, ChartOfAccounts, CompanySettings, CompanyUsers, Database, DocumentWorkflows,
    LedgerStore, PostingEngine, Reports,
};
use axum::{
    http::{header, HeaderName, Method},
    middleware,
    routing::{get, post, put},
    Router,
};
use service_core::error::AppError;
use service_core::middleware::{request_id_middleware, REQUEST_ID_HEADER};
use std::net::SocketAddr;
use std::sync::Arc;
use tokio::net::TcpListener;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

/// Shared application state. Every component talks to the same store.
#[derive(Clone)]
pub struct AppState {
    pub store: Arc<dyn LedgerStore>,
    pub chart: ChartOfAccounts,
    pub posting: PostingEngine,
    pub documents: DocumentWorkflows,
    pub reports: Reports,
    pub settings: CompanySettings,
    pub users: CompanyUsers,
}

impl AppState {
    pub fn new(store: Arc<dyn LedgerStore>) -> Self {
        Self {
            chart: ChartOfAccounts::new(store.clone()),
            posting: PostingEngine::new(store.clone()),
            documents: DocumentWorkflows::new(store.clone()),
            reports: Reports::new(store.clone()),
            settings: CompanySettings::new(store.clone()),
            users: CompanyUsers::new(store.clone()),
            store,
        }
    }
}

pub fn build_router(state: AppState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods([Method::GET, Method::POST, Method::PUT, Method::DELETE, Method::OPTIONS])
        .allow_headers([
            header::CONTENT_TYPE,
            HeaderName::from_static(REQUEST_ID_HEADER),
            HeaderName::from_static(COMPANY_ID_HEADER),
            HeaderName::from_static(USER_ID_HEADER),
            HeaderName::from_static(USER_ROLE_HEADER),
        ]);

    Router::new()
        .route("/health", get(handlers::health_check))
        .route("/ready", get(handlers::readiness_check))
        .route("/metrics", get(handlers::metrics_endpoint))
        // Company
        .route("/companies", post(handlers::create_company))
        .route("/companies/me", get(handlers::get_company))
        .route("/users", get(handlers::list_members).post(handlers::add_member))
        .route(
            "/users/:member_id",
            put(handlers::change_member_role).delete(handlers::remove_member),
        )
        // Chart of accounts
        .route(
            "/accounts",
            get(handlers::list_accounts).post(handlers::create_account),
        )
        .route("/accounts/init", post(handlers::init_accounts))
        // Documents
        .route(
            "/expenses",
            get(handlers::list_expenses).post(handlers::create_expense),
        )
        .route("/income", post(handlers::create_income))
        .route(
            "/invoices",
            get(handlers::list_invoices).post(handlers::create_invoice),
        )
        .route("/invoices/:invoice_id/pay", post(handlers::pay_invoice))
        // Ledger
        .route("/ledger", get(handlers::list_ledger))
        .route("/ledger/recent", get(handlers::recent_activity))
        .route("/ledger/entries", post(handlers::post_manual_entry))
        // Reports
        .route("/reports/dashboard", get(handlers::dashboard))
        .route("/reports/income-statement", get(handlers::income_statement))
        .route("/reports/balance-sheet", get(handlers::balance_sheet))
        .route("/reports/vat", get(handlers::vat_report))
        // Settings
        .route(
            "/settings/tax",
            get(handlers::get_tax_settings).put(handlers::save_tax_settings),
        )
        .route(
            "/settings/preferences",
            get(handlers::get_preferences).put(handlers::save_preferences),
        )
        .layer(TraceLayer::new_for_http())
        .layer(middleware::from_fn(request_id_middleware))
        .layer(cors)
        .with_state(state)
}

/// Application container for managing server lifecycle.
pub struct Application {
    port: u16,
    listener: TcpListener,
    db: Arc<Database>,
    state: AppState,
}

impl Application {
    /// Connect to Postgres, apply migrations and bind the HTTP listener.
    pub async fn build(config: BookkeepingConfig) -> Result<Self, AppError> {
        init_metrics();

        let db = Database::new(
            &config.database.url,
            config.database.max_connections,
            config.database.min_connections,
        )
        .await
        .map_err(|e| {
            tracing::error!(error = %e, "Failed to connect to PostgreSQL");
            AppError::from(e)
        })?;

        db.run_migrations().await.map_err(|e| {
            tracing::error!(error = %e, "Failed to run migrations");
            AppError::from(e)
        })?;

        let db = Arc::new(db);
        let state = AppState::new(db.clone());

        let addr = SocketAddr::from(([0, 0, 0, 0], config.common.port));
        let listener = TcpListener::bind(addr).await.map_err(|e| {
            tracing::error!(error = %e, addr = %addr, "Failed to bind HTTP listener");
            AppError::from(e)
        })?;
        let port = listener.local_addr()?.port();

        tracing::info!(port = port, "Bookkeeping service listener bound");

        Ok(Self {
            port,
            listener,
            db,
            state,
        })
    }

    pub fn port(&self) -> u16 {
        self.port
    }

    pub fn db(&self) -> &Database {
        &self.db
    }

    pub async fn run_until_stopped(self) -> std::io::Result<()> {
        let router = build_router(self.state);
        axum::serve(self.listener, router).await
    }
}
