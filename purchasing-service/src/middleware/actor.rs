//! Actor context extractor.
//!
//! Identifies who is acting on a document. The headers are set by the
//! authenticating gateway in front of this service; the role header gates the
//! privileged operations (approval, payment deletion).

use axum::async_trait;
use axum::extract::FromRequestParts;
use axum::http::request::Parts;
use service_core::error::AppError;
use uuid::Uuid;

#[derive(Debug, Clone)]
pub struct ActorContext {
    pub user_id: Uuid,
    pub role: String,
}

impl ActorContext {
    pub fn is_admin(&self) -> bool {
        self.role == "admin"
    }
}

#[async_trait]
impl<S> FromRequestParts<S> for ActorContext
where
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        let user_id = parts
            .headers
            .get("X-User-ID")
            .and_then(|v| v.to_str().ok())
            .ok_or_else(|| {
                AppError::Unauthorized(anyhow::anyhow!(
                    "Missing X-User-ID header (required from gateway)"
                ))
            })?
            .parse::<Uuid>()
            .map_err(|_| {
                AppError::Unauthorized(anyhow::anyhow!("X-User-ID header is not a valid UUID"))
            })?;

        let role = parts
            .headers
            .get("X-User-Role")
            .and_then(|v| v.to_str().ok())
            .unwrap_or("user")
            .to_string();

        let span = tracing::Span::current();
        span.record("user_id", user_id.to_string().as_str());

        Ok(ActorContext { user_id, role })
    }
}
