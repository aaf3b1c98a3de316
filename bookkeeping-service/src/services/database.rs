//! PostgreSQL store for bookkeeping-service.

use crate::models::{
    Account, Company, CompanyPreferences, CompanyTaxSettings, CompanyUser, CreateInvoice,
    EntryLine, EntryStatus, Invoice, InvoiceStatus, LedgerEntry, LedgerLine, NewAccount,
    NewLedgerEntry, NewLedgerLine, Role, SourceType,
};
use crate::services::error::LedgerError;
use crate::services::metrics::DB_QUERY_DURATION;
use crate::services::store::{LedgerStore, StoreTx};
use async_trait::async_trait;
use sqlx::postgres::{PgPool, PgPoolOptions};
use sqlx::{Postgres, Transaction};
use std::time::Duration;
use tracing::{info, instrument};
use uuid::Uuid;

const ACCOUNT_COLUMNS: &str = "id, company_id, code, name, type, created_at";
const ENTRY_COLUMNS: &str =
    "id, company_id, date, description, status, source_type, source_id, created_at";
const MEMBER_COLUMNS: &str = "id, company_id, user_email, role, created_at, updated_at";
const INVOICE_COLUMNS: &str = "id, company_id, customer_id, customer_name, invoice_number, date, subtotal, vat, total, status, payload, created_at";

/// Database connection pool wrapper.
#[derive(Clone)]
pub struct Database {
    pool: PgPool,
}

impl Database {
    /// Create a new database connection pool.
    #[instrument(skip(database_url), fields(service = "bookkeeping-service"))]
    pub async fn new(
        database_url: &str,
        max_connections: u32,
        min_connections: u32,
    ) -> Result<Self, LedgerError> {
        info!(
            max_connections = max_connections,
            min_connections = min_connections,
            "Connecting to PostgreSQL"
        );

        let pool = PgPoolOptions::new()
            .max_connections(max_connections)
            .min_connections(min_connections)
            .acquire_timeout(Duration::from_secs(30))
            .idle_timeout(Duration::from_secs(600))
            .connect(database_url)
            .await
            .map_err(|e| LedgerError::store("Failed to connect", e))?;

        info!("PostgreSQL connection pool established");

        Ok(Self { pool })
    }

    /// Wrap an existing pool.
    pub fn from_pool(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Get a reference to the connection pool.
    pub fn pool(&self) -> &PgPool {
        &self.pool
    }

    /// Run database migrations.
    #[instrument(skip(self))]
    pub async fn run_migrations(&self) -> Result<(), LedgerError> {
        info!("Running database migrations");
        sqlx::migrate!("./migrations")
            .run(&self.pool)
            .await
            .map_err(|e| LedgerError::store("Migration failed", e))?;
        info!("Database migrations completed");
        Ok(())
    }
}

#[async_trait]
impl LedgerStore for Database {
    async fn begin(&self) -> Result<Box<dyn StoreTx>, LedgerError> {
        let tx = self
            .pool
            .begin()
            .await
            .map_err(|e| LedgerError::store("Failed to begin transaction", e))?;
        Ok(Box::new(PgStoreTx { tx }))
    }

    #[instrument(skip(self))]
    async fn health_check(&self) -> Result<(), LedgerError> {
        sqlx::query("SELECT 1")
            .execute(&self.pool)
            .await
            .map_err(|e| LedgerError::store("Health check failed", e))?;
        Ok(())
    }
}

/// One open PostgreSQL transaction. Dropping it without commit rolls back.
pub struct PgStoreTx {
    tx: Transaction<'static, Postgres>,
}

#[async_trait]
impl StoreTx for PgStoreTx {
    // -------------------------------------------------------------------------
    // Company Operations
    // -------------------------------------------------------------------------

    #[instrument(skip(self))]
    async fn insert_company(&mut self, name: &str) -> Result<Company, LedgerError> {
        let _timer = DB_QUERY_DURATION
            .with_label_values(&["insert_company"])
            .start_timer();

        sqlx::query_as::<_, Company>(
            r#"
            INSERT INTO companies (id, name)
            VALUES ($1, $2)
            RETURNING id, name, tin, rc, industry, vat_registered, created_at
            "#,
        )
        .bind(Uuid::new_v4())
        .bind(name)
        .fetch_one(&mut *self.tx)
        .await
        .map_err(|e| LedgerError::store("Failed to create company", e))
    }

    #[instrument(skip(self), fields(company_id = %company_id))]
    async fn get_company(&mut self, company_id: Uuid) -> Result<Option<Company>, LedgerError> {
        let _timer = DB_QUERY_DURATION
            .with_label_values(&["get_company"])
            .start_timer();

        sqlx::query_as::<_, Company>(
            r#"
            SELECT id, name, tin, rc, industry, vat_registered, created_at
            FROM companies
            WHERE id = $1
            "#,
        )
        .bind(company_id)
        .fetch_optional(&mut *self.tx)
        .await
        .map_err(|e| LedgerError::store("Failed to get company", e))
    }

    // -------------------------------------------------------------------------
    // Account Operations
    // -------------------------------------------------------------------------

    #[instrument(skip(self, account), fields(company_id = %company_id, code = account.code))]
    async fn insert_account(
        &mut self,
        company_id: Uuid,
        account: &NewAccount,
    ) -> Result<Option<Account>, LedgerError> {
        let _timer = DB_QUERY_DURATION
            .with_label_values(&["insert_account"])
            .start_timer();

        let sql = format!(
            r#"
            INSERT INTO accounts (id, company_id, code, name, type)
            VALUES ($1, $2, $3, $4, $5)
            ON CONFLICT (company_id, code) DO NOTHING
            RETURNING {ACCOUNT_COLUMNS}
            "#
        );

        sqlx::query_as::<_, Account>(&sql)
            .bind(Uuid::new_v4())
            .bind(company_id)
            .bind(account.code)
            .bind(&account.name)
            .bind(account.account_type.as_str())
            .fetch_optional(&mut *self.tx)
            .await
            .map_err(|e| LedgerError::store("Failed to create account", e))
    }

    #[instrument(skip(self), fields(company_id = %company_id))]
    async fn list_accounts(&mut self, company_id: Uuid) -> Result<Vec<Account>, LedgerError> {
        let _timer = DB_QUERY_DURATION
            .with_label_values(&["list_accounts"])
            .start_timer();

        let sql = format!(
            "SELECT {ACCOUNT_COLUMNS} FROM accounts WHERE company_id = $1 ORDER BY code"
        );

        sqlx::query_as::<_, Account>(&sql)
            .bind(company_id)
            .fetch_all(&mut *self.tx)
            .await
            .map_err(|e| LedgerError::store("Failed to list accounts", e))
    }

    #[instrument(skip(self), fields(company_id = %company_id))]
    async fn find_accounts_by_code(
        &mut self,
        company_id: Uuid,
        codes: &[i32],
    ) -> Result<Vec<Account>, LedgerError> {
        let _timer = DB_QUERY_DURATION
            .with_label_values(&["find_accounts_by_code"])
            .start_timer();

        let sql = format!(
            "SELECT {ACCOUNT_COLUMNS} FROM accounts WHERE company_id = $1 AND code = ANY($2) ORDER BY code"
        );

        sqlx::query_as::<_, Account>(&sql)
            .bind(company_id)
            .bind(codes)
            .fetch_all(&mut *self.tx)
            .await
            .map_err(|e| LedgerError::store("Failed to fetch accounts", e))
    }

    // -------------------------------------------------------------------------
    // Ledger Operations
    // -------------------------------------------------------------------------

    #[instrument(skip(self, entry), fields(company_id = %entry.company_id, source_type = %entry.source_type))]
    async fn insert_entry(&mut self, entry: &NewLedgerEntry) -> Result<LedgerEntry, LedgerError> {
        let _timer = DB_QUERY_DURATION
            .with_label_values(&["insert_entry"])
            .start_timer();

        let sql = format!(
            r#"
            INSERT INTO ledger_entries (id, company_id, date, description, status, source_type, source_id)
            VALUES ($1, $2, $3, $4, $5, $6, $7)
            RETURNING {ENTRY_COLUMNS}
            "#
        );

        sqlx::query_as::<_, LedgerEntry>(&sql)
            .bind(Uuid::new_v4())
            .bind(entry.company_id)
            .bind(entry.date)
            .bind(&entry.description)
            .bind(entry.status.as_str())
            .bind(entry.source_type.as_str())
            .bind(entry.source_id)
            .fetch_one(&mut *self.tx)
            .await
            .map_err(|e| LedgerError::store("Failed to insert ledger entry", e))
    }

    #[instrument(skip(self), fields(company_id = %company_id, entry_id = %entry_id))]
    async fn get_entry(
        &mut self,
        company_id: Uuid,
        entry_id: Uuid,
    ) -> Result<Option<LedgerEntry>, LedgerError> {
        let _timer = DB_QUERY_DURATION
            .with_label_values(&["get_entry"])
            .start_timer();

        let sql = format!(
            "SELECT {ENTRY_COLUMNS} FROM ledger_entries WHERE company_id = $1 AND id = $2 FOR UPDATE"
        );

        sqlx::query_as::<_, LedgerEntry>(&sql)
            .bind(company_id)
            .bind(entry_id)
            .fetch_optional(&mut *self.tx)
            .await
            .map_err(|e| LedgerError::store("Failed to get ledger entry", e))
    }

    #[instrument(skip(self, lines), fields(entry_id = %entry_id, line_count = lines.len()))]
    async fn insert_lines(
        &mut self,
        entry_id: Uuid,
        lines: &[NewLedgerLine],
    ) -> Result<Vec<LedgerLine>, LedgerError> {
        let _timer = DB_QUERY_DURATION
            .with_label_values(&["insert_lines"])
            .start_timer();

        let mut inserted = Vec::with_capacity(lines.len());
        for line in lines {
            let row = sqlx::query_as::<_, LedgerLine>(
                r#"
                INSERT INTO ledger_lines (id, ledger_entry_id, account_id, debit, credit)
                VALUES ($1, $2, $3, $4, $5)
                RETURNING id, ledger_entry_id, account_id, debit, credit
                "#,
            )
            .bind(Uuid::new_v4())
            .bind(entry_id)
            .bind(line.account_id)
            .bind(line.debit)
            .bind(line.credit)
            .fetch_one(&mut *self.tx)
            .await
            .map_err(|e| LedgerError::store("Failed to insert ledger line", e))?;
            inserted.push(row);
        }

        Ok(inserted)
    }

    #[instrument(skip(self), fields(company_id = %company_id, entry_id = %entry_id))]
    async fn set_entry_status(
        &mut self,
        company_id: Uuid,
        entry_id: Uuid,
        status: EntryStatus,
    ) -> Result<bool, LedgerError> {
        let _timer = DB_QUERY_DURATION
            .with_label_values(&["set_entry_status"])
            .start_timer();

        let result = sqlx::query(
            "UPDATE ledger_entries SET status = $3 WHERE company_id = $1 AND id = $2",
        )
        .bind(company_id)
        .bind(entry_id)
        .bind(status.as_str())
        .execute(&mut *self.tx)
        .await
        .map_err(|e| LedgerError::store("Failed to update ledger entry", e))?;

        Ok(result.rows_affected() > 0)
    }

    #[instrument(skip(self), fields(company_id = %company_id, source_id = %source_id))]
    async fn find_pending_entry(
        &mut self,
        company_id: Uuid,
        source_type: SourceType,
        source_id: Uuid,
    ) -> Result<Option<LedgerEntry>, LedgerError> {
        let _timer = DB_QUERY_DURATION
            .with_label_values(&["find_pending_entry"])
            .start_timer();

        // FOR UPDATE so two concurrent payments cannot both see the entry as pending
        let sql = format!(
            r#"
            SELECT {ENTRY_COLUMNS}
            FROM ledger_entries
            WHERE company_id = $1 AND source_type = $2 AND source_id = $3 AND status = 'pending'
            LIMIT 1
            FOR UPDATE
            "#
        );

        sqlx::query_as::<_, LedgerEntry>(&sql)
            .bind(company_id)
            .bind(source_type.as_str())
            .bind(source_id)
            .fetch_optional(&mut *self.tx)
            .await
            .map_err(|e| LedgerError::store("Failed to find pending entry", e))
    }

    #[instrument(skip(self), fields(company_id = %company_id))]
    async fn entry_lines(
        &mut self,
        company_id: Uuid,
        status: Option<EntryStatus>,
    ) -> Result<Vec<EntryLine>, LedgerError> {
        let _timer = DB_QUERY_DURATION
            .with_label_values(&["entry_lines"])
            .start_timer();

        sqlx::query_as::<_, EntryLine>(
            r#"
            SELECT e.id AS entry_id, e.date, e.description, e.status, e.source_type,
                   e.created_at AS entry_created_at,
                   a.code AS account_code, a.name AS account_name,
                   l.debit, l.credit
            FROM ledger_entries e
            JOIN ledger_lines l ON l.ledger_entry_id = e.id
            JOIN accounts a ON a.id = l.account_id
            WHERE e.company_id = $1
              AND ($2::varchar IS NULL OR e.status = $2)
            ORDER BY e.date DESC, e.created_at DESC, a.code ASC, l.created_at ASC
            "#,
        )
        .bind(company_id)
        .bind(status.map(|s| s.as_str()))
        .fetch_all(&mut *self.tx)
        .await
        .map_err(|e| LedgerError::store("Failed to read ledger lines", e))
    }

    #[instrument(skip(self), fields(entry_id = %entry_id))]
    async fn lines_for_entry(&mut self, entry_id: Uuid) -> Result<Vec<LedgerLine>, LedgerError> {
        let _timer = DB_QUERY_DURATION
            .with_label_values(&["lines_for_entry"])
            .start_timer();

        sqlx::query_as::<_, LedgerLine>(
            r#"
            SELECT id, ledger_entry_id, account_id, debit, credit
            FROM ledger_lines
            WHERE ledger_entry_id = $1
            ORDER BY created_at
            "#,
        )
        .bind(entry_id)
        .fetch_all(&mut *self.tx)
        .await
        .map_err(|e| LedgerError::store("Failed to read entry lines", e))
    }

    #[instrument(skip(self), fields(company_id = %company_id))]
    async fn count_entries(&mut self, company_id: Uuid) -> Result<i64, LedgerError> {
        sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM ledger_entries WHERE company_id = $1")
            .bind(company_id)
            .fetch_one(&mut *self.tx)
            .await
            .map_err(|e| LedgerError::store("Failed to count entries", e))
    }

    // -------------------------------------------------------------------------
    // Invoice Operations
    // -------------------------------------------------------------------------

    #[instrument(skip(self, input), fields(company_id = %input.company_id, invoice_number = %input.invoice_number))]
    async fn insert_invoice(&mut self, input: &CreateInvoice) -> Result<Invoice, LedgerError> {
        let _timer = DB_QUERY_DURATION
            .with_label_values(&["insert_invoice"])
            .start_timer();

        let sql = format!(
            r#"
            INSERT INTO invoices (id, company_id, customer_id, customer_name, invoice_number, date, subtotal, vat, total, status, payload)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11)
            RETURNING {INVOICE_COLUMNS}
            "#
        );

        sqlx::query_as::<_, Invoice>(&sql)
            .bind(Uuid::new_v4())
            .bind(input.company_id)
            .bind(input.customer_id)
            .bind(&input.customer_name)
            .bind(&input.invoice_number)
            .bind(input.date)
            .bind(input.subtotal)
            .bind(input.vat)
            .bind(input.total)
            .bind(InvoiceStatus::Sent.as_str())
            .bind(&input.payload)
            .fetch_one(&mut *self.tx)
            .await
            .map_err(|e| LedgerError::store("Failed to create invoice", e))
    }

    #[instrument(skip(self), fields(company_id = %company_id, invoice_id = %invoice_id))]
    async fn get_invoice(
        &mut self,
        company_id: Uuid,
        invoice_id: Uuid,
    ) -> Result<Option<Invoice>, LedgerError> {
        let _timer = DB_QUERY_DURATION
            .with_label_values(&["get_invoice"])
            .start_timer();

        let sql =
            format!("SELECT {INVOICE_COLUMNS} FROM invoices WHERE company_id = $1 AND id = $2");

        sqlx::query_as::<_, Invoice>(&sql)
            .bind(company_id)
            .bind(invoice_id)
            .fetch_optional(&mut *self.tx)
            .await
            .map_err(|e| LedgerError::store("Failed to get invoice", e))
    }

    #[instrument(skip(self), fields(company_id = %company_id, invoice_id = %invoice_id))]
    async fn set_invoice_status(
        &mut self,
        company_id: Uuid,
        invoice_id: Uuid,
        status: InvoiceStatus,
    ) -> Result<bool, LedgerError> {
        let _timer = DB_QUERY_DURATION
            .with_label_values(&["set_invoice_status"])
            .start_timer();

        let result =
            sqlx::query("UPDATE invoices SET status = $3 WHERE company_id = $1 AND id = $2")
                .bind(company_id)
                .bind(invoice_id)
                .bind(status.as_str())
                .execute(&mut *self.tx)
                .await
                .map_err(|e| LedgerError::store("Failed to update invoice", e))?;

        Ok(result.rows_affected() > 0)
    }

    #[instrument(skip(self), fields(company_id = %company_id))]
    async fn list_invoices(&mut self, company_id: Uuid) -> Result<Vec<Invoice>, LedgerError> {
        let _timer = DB_QUERY_DURATION
            .with_label_values(&["list_invoices"])
            .start_timer();

        let sql = format!(
            "SELECT {INVOICE_COLUMNS} FROM invoices WHERE company_id = $1 ORDER BY created_at DESC"
        );

        sqlx::query_as::<_, Invoice>(&sql)
            .bind(company_id)
            .fetch_all(&mut *self.tx)
            .await
            .map_err(|e| LedgerError::store("Failed to list invoices", e))
    }

    #[instrument(skip(self), fields(company_id = %company_id))]
    async fn count_invoices(&mut self, company_id: Uuid) -> Result<i64, LedgerError> {
        sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM invoices WHERE company_id = $1")
            .bind(company_id)
            .fetch_one(&mut *self.tx)
            .await
            .map_err(|e| LedgerError::store("Failed to count invoices", e))
    }

    // -------------------------------------------------------------------------
    // Settings Operations
    // -------------------------------------------------------------------------

    #[instrument(skip(self, settings), fields(company_id = %settings.company_id))]
    async fn upsert_tax_settings(
        &mut self,
        settings: &CompanyTaxSettings,
    ) -> Result<CompanyTaxSettings, LedgerError> {
        let _timer = DB_QUERY_DURATION
            .with_label_values(&["upsert_tax_settings"])
            .start_timer();

        sqlx::query_as::<_, CompanyTaxSettings>(
            r#"
            INSERT INTO company_tax_settings
                (company_id, vat_enabled, vat_rate, paye_enabled, withholding_enabled, stamp_duty_enabled, updated_at)
            VALUES ($1, $2, $3, $4, $5, $6, NOW())
            ON CONFLICT (company_id) DO UPDATE SET
                vat_enabled = EXCLUDED.vat_enabled,
                vat_rate = EXCLUDED.vat_rate,
                paye_enabled = EXCLUDED.paye_enabled,
                withholding_enabled = EXCLUDED.withholding_enabled,
                stamp_duty_enabled = EXCLUDED.stamp_duty_enabled,
                updated_at = NOW()
            RETURNING company_id, vat_enabled, vat_rate, paye_enabled, withholding_enabled, stamp_duty_enabled, updated_at
            "#,
        )
        .bind(settings.company_id)
        .bind(settings.vat_enabled)
        .bind(settings.vat_rate)
        .bind(settings.paye_enabled)
        .bind(settings.withholding_enabled)
        .bind(settings.stamp_duty_enabled)
        .fetch_one(&mut *self.tx)
        .await
        .map_err(|e| LedgerError::store("Failed to save tax settings", e))
    }

    #[instrument(skip(self), fields(company_id = %company_id))]
    async fn get_tax_settings(
        &mut self,
        company_id: Uuid,
    ) -> Result<Option<CompanyTaxSettings>, LedgerError> {
        sqlx::query_as::<_, CompanyTaxSettings>(
            r#"
            SELECT company_id, vat_enabled, vat_rate, paye_enabled, withholding_enabled, stamp_duty_enabled, updated_at
            FROM company_tax_settings
            WHERE company_id = $1
            "#,
        )
        .bind(company_id)
        .fetch_optional(&mut *self.tx)
        .await
        .map_err(|e| LedgerError::store("Failed to get tax settings", e))
    }

    #[instrument(skip(self, preferences), fields(company_id = %preferences.company_id))]
    async fn upsert_preferences(
        &mut self,
        preferences: &CompanyPreferences,
    ) -> Result<CompanyPreferences, LedgerError> {
        let _timer = DB_QUERY_DURATION
            .with_label_values(&["upsert_preferences"])
            .start_timer();

        sqlx::query_as::<_, CompanyPreferences>(
            r#"
            INSERT INTO company_preferences (company_id, default_currency, timezone, date_format, updated_at)
            VALUES ($1, $2, $3, $4, NOW())
            ON CONFLICT (company_id) DO UPDATE SET
                default_currency = EXCLUDED.default_currency,
                timezone = EXCLUDED.timezone,
                date_format = EXCLUDED.date_format,
                updated_at = NOW()
            RETURNING company_id, default_currency, timezone, date_format, updated_at
            "#,
        )
        .bind(preferences.company_id)
        .bind(&preferences.default_currency)
        .bind(&preferences.timezone)
        .bind(&preferences.date_format)
        .fetch_one(&mut *self.tx)
        .await
        .map_err(|e| LedgerError::store("Failed to save preferences", e))
    }

    #[instrument(skip(self), fields(company_id = %company_id))]
    async fn get_preferences(
        &mut self,
        company_id: Uuid,
    ) -> Result<Option<CompanyPreferences>, LedgerError> {
        sqlx::query_as::<_, CompanyPreferences>(
            r#"
            SELECT company_id, default_currency, timezone, date_format, updated_at
            FROM company_preferences
            WHERE company_id = $1
            "#,
        )
        .bind(company_id)
        .fetch_optional(&mut *self.tx)
        .await
        .map_err(|e| LedgerError::store("Failed to get preferences", e))
    }

    // -------------------------------------------------------------------------
    // Member Operations
    // -------------------------------------------------------------------------

    #[instrument(skip(self, user_email), fields(company_id = %company_id, role = %role))]
    async fn insert_company_user(
        &mut self,
        company_id: Uuid,
        user_email: &str,
        role: Role,
    ) -> Result<Option<CompanyUser>, LedgerError> {
        let _timer = DB_QUERY_DURATION
            .with_label_values(&["insert_company_user"])
            .start_timer();

        let sql = format!(
            r#"
            INSERT INTO company_users (id, company_id, user_email, role)
            VALUES ($1, $2, $3, $4)
            ON CONFLICT (company_id, user_email) DO NOTHING
            RETURNING {MEMBER_COLUMNS}
            "#
        );

        sqlx::query_as::<_, CompanyUser>(&sql)
            .bind(Uuid::new_v4())
            .bind(company_id)
            .bind(user_email)
            .bind(role.as_str())
            .fetch_optional(&mut *self.tx)
            .await
            .map_err(|e| LedgerError::store("Failed to add company user", e))
    }

    #[instrument(skip(self), fields(company_id = %company_id))]
    async fn list_company_users(
        &mut self,
        company_id: Uuid,
    ) -> Result<Vec<CompanyUser>, LedgerError> {
        let _timer = DB_QUERY_DURATION
            .with_label_values(&["list_company_users"])
            .start_timer();

        let sql = format!(
            "SELECT {MEMBER_COLUMNS} FROM company_users WHERE company_id = $1 ORDER BY created_at DESC"
        );

        sqlx::query_as::<_, CompanyUser>(&sql)
            .bind(company_id)
            .fetch_all(&mut *self.tx)
            .await
            .map_err(|e| LedgerError::store("Failed to list company users", e))
    }

    #[instrument(skip(self), fields(company_id = %company_id, member_id = %member_id, role = %role))]
    async fn update_company_user_role(
        &mut self,
        company_id: Uuid,
        member_id: Uuid,
        role: Role,
    ) -> Result<Option<CompanyUser>, LedgerError> {
        let _timer = DB_QUERY_DURATION
            .with_label_values(&["update_company_user_role"])
            .start_timer();

        let sql = format!(
            r#"
            UPDATE company_users
            SET role = $3, updated_at = NOW()
            WHERE company_id = $1 AND id = $2
            RETURNING {MEMBER_COLUMNS}
            "#
        );

        sqlx::query_as::<_, CompanyUser>(&sql)
            .bind(company_id)
            .bind(member_id)
            .bind(role.as_str())
            .fetch_optional(&mut *self.tx)
            .await
            .map_err(|e| LedgerError::store("Failed to update company user", e))
    }

    #[instrument(skip(self), fields(company_id = %company_id, member_id = %member_id))]
    async fn delete_company_user(
        &mut self,
        company_id: Uuid,
        member_id: Uuid,
    ) -> Result<bool, LedgerError> {
        let _timer = DB_QUERY_DURATION
            .with_label_values(&["delete_company_user"])
            .start_timer();

        let result = sqlx::query("DELETE FROM company_users WHERE company_id = $1 AND id = $2")
            .bind(company_id)
            .bind(member_id)
            .execute(&mut *self.tx)
            .await
            .map_err(|e| LedgerError::store("Failed to remove company user", e))?;

        Ok(result.rows_affected() > 0)
    }

    // -------------------------------------------------------------------------
    // Scope
    // -------------------------------------------------------------------------

    async fn commit(self: Box<Self>) -> Result<(), LedgerError> {
        self.tx
            .commit()
            .await
            .map_err(|e| LedgerError::store("Failed to commit transaction", e))
    }

    async fn rollback(self: Box<Self>) -> Result<(), LedgerError> {
        self.tx
            .rollback()
            .await
            .map_err(|e| LedgerError::store("Failed to roll back transaction", e))
    }
}
