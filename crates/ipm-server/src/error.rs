//! Error responses.

use axum::{
    Json,
    extract::rejection::QueryRejection,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use ipm_core::CatalogError;
use serde::Serialize;
use thiserror::Error;

/// Application error type.
#[derive(Debug, Error)]
pub enum AppError {
    /// A catalog query failed.
    #[error(transparent)]
    Catalog(#[from] CatalogError),
    /// The request itself was malformed.
    #[error("{0}")]
    BadRequest(String),
}

/// Error response body.
#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub error: bool,
    pub code: String,
    pub message: String,
}

impl AppError {
    pub fn status(&self) -> StatusCode {
        match self {
            Self::Catalog(err) => match err {
                CatalogError::IpNotFound(_)
                | CatalogError::NoReleasesFound(_)
                | CatalogError::VersionNotFound { .. }
                | CatalogError::NoEligibleReleases(_) => StatusCode::NOT_FOUND,
                CatalogError::MalformedRepositoryReference { .. } => {
                    StatusCode::UNPROCESSABLE_ENTITY
                }
                CatalogError::StoreUnavailable(_) => StatusCode::SERVICE_UNAVAILABLE,
            },
            Self::BadRequest(_) => StatusCode::BAD_REQUEST,
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status();
        let (code, message) = match self {
            Self::Catalog(err) => {
                if err.is_transient() {
                    tracing::warn!(error = %err, "catalog store unavailable");
                }
                (err.code(), err.to_string())
            }
            Self::BadRequest(msg) => ("BAD_REQUEST", msg),
        };

        let body = ErrorResponse {
            error: true,
            code: code.to_string(),
            message,
        };

        (status, Json(body)).into_response()
    }
}

impl From<QueryRejection> for AppError {
    fn from(rejection: QueryRejection) -> Self {
        Self::BadRequest(rejection.body_text())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_mapping() {
        let cases = [
            (CatalogError::IpNotFound("a".into()), StatusCode::NOT_FOUND),
            (CatalogError::NoReleasesFound("a".into()), StatusCode::NOT_FOUND),
            (
                CatalogError::VersionNotFound {
                    name: "a".into(),
                    version: "1".into(),
                },
                StatusCode::NOT_FOUND,
            ),
            (CatalogError::NoEligibleReleases("a".into()), StatusCode::NOT_FOUND),
            (
                CatalogError::MalformedRepositoryReference {
                    name: "a".into(),
                    repo: "x".into(),
                },
                StatusCode::UNPROCESSABLE_ENTITY,
            ),
            (
                CatalogError::StoreUnavailable("down".into()),
                StatusCode::SERVICE_UNAVAILABLE,
            ),
        ];

        for (err, status) in cases {
            assert_eq!(AppError::from(err).status(), status);
        }
        assert_eq!(
            AppError::BadRequest("nope".into()).status(),
            StatusCode::BAD_REQUEST
        );
    }
}
