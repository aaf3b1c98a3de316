//! Authenticated company context.
//!
//! The gateway authenticates the caller and forwards the company, user and
//! role as trusted headers. This service never authenticates on its own; it
//! only reads those headers and enforces the role on writes.

use axum::async_trait;
use axum::extract::FromRequestParts;
use axum::http::request::Parts;
use service_core::error::AppError;
use uuid::Uuid;

pub use crate::models::Role;

pub const COMPANY_ID_HEADER: &str = "x-company-id";
pub const USER_ID_HEADER: &str = "x-user-id";
pub const USER_ROLE_HEADER: &str = "x-user-role";

#[derive(Debug, Clone)]
pub struct CompanyContext {
    pub company_id: Uuid,
    pub user_id: Option<String>,
    pub role: Role,
}

impl CompanyContext {
    /// Writes to the books need the Accountant or Admin role.
    pub fn require_editor(&self) -> Result<(), AppError> {
        if self.role.can_edit_accounting() {
            Ok(())
        } else {
            Err(AppError::Forbidden(anyhow::anyhow!(
                "Role {:?} cannot modify accounting records",
                self.role
            )))
        }
    }

    /// Membership changes need the Admin role.
    pub fn require_admin(&self) -> Result<(), AppError> {
        if self.role.can_manage_members() {
            Ok(())
        } else {
            Err(AppError::Forbidden(anyhow::anyhow!(
                "Role {:?} cannot manage company members",
                self.role
            )))
        }
    }
}

fn header<'a>(parts: &'a Parts, name: &str) -> Option<&'a str> {
    parts.headers.get(name).and_then(|v| v.to_str().ok())
}

#[async_trait]
impl<S> FromRequestParts<S> for CompanyContext
where
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        let company_id = header(parts, COMPANY_ID_HEADER)
            .ok_or_else(|| {
                AppError::Unauthorized(anyhow::anyhow!(
                    "Missing X-Company-ID header (required from gateway)"
                ))
            })
            .and_then(|raw| {
                Uuid::parse_str(raw).map_err(|_| {
                    AppError::BadRequest(anyhow::anyhow!("X-Company-ID is not a valid UUID"))
                })
            })?;

        let role = match header(parts, USER_ROLE_HEADER) {
            Some(raw) => raw
                .parse::<Role>()
                .map_err(|e| AppError::Forbidden(anyhow::anyhow!(e)))?,
            None => Role::default(),
        };

        let user_id = header(parts, USER_ID_HEADER).map(str::to_string);

        // Record on the current request span
        let span = tracing::Span::current();
        span.record("company_id", tracing::field::display(company_id));
        if let Some(user_id) = &user_id {
            span.record("user_id", user_id.as_str());
        }

        Ok(CompanyContext {
            company_id,
            user_id,
            role,
        })
    }
}

/// Acting user for routes that run before a company exists.
#[derive(Debug, Clone)]
pub struct UserId(pub String);

#[async_trait]
impl<S> FromRequestParts<S> for UserId
where
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        let user_id = header(parts, USER_ID_HEADER).ok_or_else(|| {
            AppError::Unauthorized(anyhow::anyhow!(
                "Missing X-User-ID header (required from gateway)"
            ))
        })?;

        tracing::Span::current().record("user_id", user_id);

        Ok(UserId(user_id.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::Request;

    async fn extract(request: Request<()>) -> Result<CompanyContext, AppError> {
        let (mut parts, _) = request.into_parts();
        CompanyContext::from_request_parts(&mut parts, &()).await
    }

    #[tokio::test]
    async fn test_context_defaults_to_viewer() {
        let company_id = Uuid::new_v4();
        let request = Request::builder()
            .header(COMPANY_ID_HEADER, company_id.to_string())
            .body(())
            .unwrap();

        let ctx = extract(request).await.unwrap();
        assert_eq!(ctx.company_id, company_id);
        assert_eq!(ctx.role, Role::Viewer);
        assert!(ctx.require_editor().is_err());
        assert!(ctx.require_admin().is_err());
    }

    #[tokio::test]
    async fn test_context_reads_role_header() {
        let request = Request::builder()
            .header(COMPANY_ID_HEADER, Uuid::new_v4().to_string())
            .header(USER_ROLE_HEADER, "Admin")
            .body(())
            .unwrap();

        let ctx = extract(request).await.unwrap();
        assert_eq!(ctx.role, Role::Admin);
        assert!(ctx.require_admin().is_ok());
    }

    #[tokio::test]
    async fn test_context_requires_company_header() {
        let request = Request::builder().body(()).unwrap();
        assert!(matches!(
            extract(request).await,
            Err(AppError::Unauthorized(_))
        ));
    }

    #[tokio::test]
    async fn test_context_rejects_malformed_company_id() {
        let request = Request::builder()
            .header(COMPANY_ID_HEADER, "not-a-uuid")
            .body(())
            .unwrap();
        assert!(matches!(extract(request).await, Err(AppError::BadRequest(_))));
    }
}
