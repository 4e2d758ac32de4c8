use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde::Serialize;

/// The error type for impersonation operations
#[derive(Debug, thiserror::Error)]
pub enum ImpersonateError {
    #[error("Already impersonating another user")]
    AlreadyImpersonating,

    #[error("Cannot impersonate yourself")]
    CantImpersonateSelf,

    #[error("Target user cannot be impersonated")]
    CantBeImpersonated,

    #[error("User is not allowed to impersonate")]
    CantImpersonate,

    #[error("Not currently impersonating")]
    NotImpersonating,

    #[error("Identity not found: {0}")]
    IdentityNotFound(String),

    #[error("Route not defined: {0}")]
    RouteNotDefined(String),

    #[error("Unauthenticated: {0}")]
    Unauthenticated(String),

    #[error("Session error: {0}")]
    Session(String),

    #[error("Invalid configuration: {0}")]
    Config(String),

    #[error("Internal error: {0}")]
    Internal(String),

    #[error(transparent)]
    Anyhow(#[from] anyhow::Error),
}

/// JSON body returned for failed impersonation requests.
#[derive(Serialize)]
pub struct ErrorResponse {
    error: String,
    error_id: String,
}

impl ImpersonateError {
    pub fn identity_not_found(id: impl Into<String>) -> Self {
        Self::IdentityNotFound(id.into())
    }

    pub fn unauthenticated(msg: impl Into<String>) -> Self {
        Self::Unauthenticated(msg.into())
    }

    pub fn session(msg: impl Into<String>) -> Self {
        Self::Session(msg.into())
    }

    pub fn internal(msg: impl Into<String>) -> Self {
        Self::Internal(msg.into())
    }

    /// Whether this error is a rejected precondition rather than an
    /// infrastructure failure.
    ///
    /// Rejections are caused by the caller (wrong state, missing capability)
    /// and retrying them without changing anything fails the same way.
    pub fn is_rejection(&self) -> bool {
        matches!(
            self,
            Self::AlreadyImpersonating
                | Self::CantImpersonateSelf
                | Self::CantBeImpersonated
                | Self::CantImpersonate
                | Self::NotImpersonating
                | Self::IdentityNotFound(_)
        )
    }

    pub fn status_code(&self) -> StatusCode {
        match self {
            Self::AlreadyImpersonating | Self::NotImpersonating => StatusCode::CONFLICT,
            Self::CantImpersonateSelf => StatusCode::BAD_REQUEST,
            Self::CantBeImpersonated | Self::CantImpersonate => StatusCode::FORBIDDEN,
            Self::IdentityNotFound(_) | Self::RouteNotDefined(_) => StatusCode::NOT_FOUND,
            Self::Unauthenticated(_) => StatusCode::UNAUTHORIZED,
            Self::Session(_) | Self::Config(_) | Self::Internal(_) | Self::Anyhow(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        }
    }

    /// Message suitable for clients. Server errors are replaced with a
    /// generic message; the full error is only logged.
    fn safe_message(&self) -> String {
        match self {
            Self::Session(_) | Self::Config(_) | Self::Internal(_) | Self::Anyhow(_) => {
                "Internal server error".to_string()
            }
            other => other.to_string(),
        }
    }
}

impl IntoResponse for ImpersonateError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        let error_id = uuid::Uuid::new_v4().to_string();

        if status.is_server_error() {
            tracing::error!(
                status = status.as_u16(),
                error_id = %error_id,
                error = %self,
                "Impersonation request failed"
            );
        } else {
            tracing::debug!(
                status = status.as_u16(),
                error_id = %error_id,
                error = %self,
                "Impersonation request rejected"
            );
        }

        let body = Json(ErrorResponse {
            error: self.safe_message(),
            error_id,
        });

        (status, body).into_response()
    }
}

/// Result type alias for impersonation operations
pub type Result<T> = std::result::Result<T, ImpersonateError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rejections_are_client_errors() {
        let rejections = [
            ImpersonateError::AlreadyImpersonating,
            ImpersonateError::CantImpersonateSelf,
            ImpersonateError::CantBeImpersonated,
            ImpersonateError::CantImpersonate,
            ImpersonateError::NotImpersonating,
            ImpersonateError::identity_not_found("42"),
        ];

        for err in rejections {
            assert!(err.is_rejection(), "{err} should be a rejection");
            assert!(err.status_code().is_client_error());
        }
    }

    #[test]
    fn test_infrastructure_errors_are_not_rejections() {
        assert!(!ImpersonateError::session("backend down").is_rejection());
        assert!(!ImpersonateError::internal("boom").is_rejection());
        assert_eq!(
            ImpersonateError::internal("boom").status_code(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }

    #[test]
    fn test_safe_message_hides_server_details() {
        let err = ImpersonateError::session("redis://secret-host refused");
        assert_eq!(err.safe_message(), "Internal server error");

        let err = ImpersonateError::CantImpersonate;
        assert_eq!(err.safe_message(), "User is not allowed to impersonate");
    }

    #[test]
    fn test_into_response_status() {
        let response = ImpersonateError::AlreadyImpersonating.into_response();
        assert_eq!(response.status(), StatusCode::CONFLICT);

        let response = ImpersonateError::unauthenticated("no user").into_response();
        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    }
}
