use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::Serialize;

use crate::authz::Capability;
use crate::lookup::LookupError;

pub type AppResult<T> = Result<T, AppError>;

/// Denial taxonomy. Every variant names the rule that fired.
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum AuthzError {
    #[error("authentication required")]
    Unauthenticated,
    #[error("role lacks the required capability ({rule})")]
    InsufficientRole {
        rule: &'static str,
        capability: Option<Capability>,
    },
    #[error("not a member of the project ({rule})")]
    NotAProjectMember { rule: &'static str },
    #[error("action narrowed for this role ({rule})")]
    NarrowedByRole {
        rule: &'static str,
        fields: Vec<String>,
    },
    #[error("candidate cannot be assigned ({rule})")]
    IneligibleAssignee { rule: &'static str },
    #[error("resource not found ({rule})")]
    ResourceNotFound { rule: &'static str },
}

impl AuthzError {
    pub fn code(&self) -> &'static str {
        match self {
            AuthzError::Unauthenticated => "unauthenticated",
            AuthzError::InsufficientRole { .. } => "insufficient_role",
            AuthzError::NotAProjectMember { .. } => "not_a_member",
            AuthzError::NarrowedByRole { .. } => "narrowed_by_role",
            AuthzError::IneligibleAssignee { .. } => "ineligible_role",
            AuthzError::ResourceNotFound { .. } => "not_found",
        }
    }

    pub fn status(&self) -> StatusCode {
        match self {
            AuthzError::Unauthenticated => StatusCode::UNAUTHORIZED,
            AuthzError::ResourceNotFound { .. } => StatusCode::NOT_FOUND,
            _ => StatusCode::FORBIDDEN,
        }
    }
}

#[derive(thiserror::Error, Debug)]
pub enum AppError {
    #[error(transparent)]
    Authz(#[from] AuthzError),
    #[error("lookup failed: {0}")]
    Lookup(#[from] LookupError),
    #[error("configuration error: {0}")]
    Configuration(String),
    #[error("internal server error: {0}")]
    Internal(String),
}

impl AppError {
    pub fn configuration(message: impl Into<String>) -> Self {
        Self::Configuration(message.into())
    }

    pub fn status(&self) -> StatusCode {
        match self {
            AppError::Authz(err) => err.status(),
            AppError::Lookup(_) | AppError::Configuration(_) | AppError::Internal(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        }
    }

    pub fn code(&self) -> &'static str {
        match self {
            AppError::Authz(err) => err.code(),
            AppError::Lookup(_) => "lookup",
            AppError::Configuration(_) => "configuration",
            AppError::Internal(_) => "internal",
        }
    }
}

#[derive(Serialize)]
struct ErrorResponse {
    error: String,
    message: String,
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status();

        if status.is_server_error() {
            tracing::error!(error = %self, "request failed");
        }

        let payload = ErrorResponse {
            error: self.code().to_string(),
            message: self.to_string(),
        };

        (status, Json(payload)).into_response()
    }
}

impl From<anyhow::Error> for AppError {
    fn from(value: anyhow::Error) -> Self {
        Self::Internal(value.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn denials_map_to_transport_status() {
        let cases = [
            (AuthzError::Unauthenticated, StatusCode::UNAUTHORIZED),
            (
                AuthzError::InsufficientRole {
                    rule: "role.missing_capability",
                    capability: None,
                },
                StatusCode::FORBIDDEN,
            ),
            (AuthzError::NotAProjectMember { rule: "membership.required" }, StatusCode::FORBIDDEN),
            (
                AuthzError::NarrowedByRole {
                    rule: "fields.outside_allow_list",
                    fields: vec!["title".into()],
                },
                StatusCode::FORBIDDEN,
            ),
            (AuthzError::IneligibleAssignee { rule: "assignee.client" }, StatusCode::FORBIDDEN),
            (AuthzError::ResourceNotFound { rule: "project.unresolved" }, StatusCode::NOT_FOUND),
        ];

        for (err, status) in cases {
            let response = AppError::from(err).into_response();
            assert_eq!(response.status(), status);
        }
    }

    #[test]
    fn lookup_failures_are_server_errors() {
        let err = AppError::from(LookupError::corrupt("bad uuid"));
        assert_eq!(err.status(), StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(err.code(), "lookup");
    }
}
