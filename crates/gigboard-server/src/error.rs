//! Request error taxonomy.
//!
//! Write-path failures are distinguished internally (for logging and tests)
//! but collapse to one generic notice in the response body.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use thiserror::Error;

/// Generic user-facing notice for rejected or failed listing operations.
pub const GENERIC_FAILURE: &str = "An error occurred. The listing could not be saved.";

#[derive(Debug, Error)]
pub enum ApiError {
    #[error("{0} not found")]
    NotFound(&'static str),

    #[error("validation failed: {0}")]
    Validation(String),

    #[error("referenced {0} does not exist")]
    Referential(&'static str),

    #[error("database error: {0}")]
    Db(#[from] sea_orm::DbErr),
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, body) = match &self {
            ApiError::NotFound(what) => (StatusCode::NOT_FOUND, format!("{what} not found")),
            ApiError::Validation(msg) => {
                tracing::warn!("listing rejected: {msg}");
                (StatusCode::UNPROCESSABLE_ENTITY, GENERIC_FAILURE.to_string())
            }
            ApiError::Referential(what) => {
                tracing::warn!("listing rejected: referenced {what} does not exist");
                (StatusCode::UNPROCESSABLE_ENTITY, GENERIC_FAILURE.to_string())
            }
            ApiError::Db(err) => {
                tracing::error!("database error: {err}");
                (StatusCode::INTERNAL_SERVER_ERROR, GENERIC_FAILURE.to_string())
            }
        };
        (status, body).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display_not_found() {
        let err = ApiError::NotFound("venue");
        assert_eq!(err.to_string(), "venue not found");
    }

    #[test]
    fn test_display_validation() {
        let err = ApiError::Validation("name must not be empty".into());
        assert_eq!(err.to_string(), "validation failed: name must not be empty");
    }

    #[test]
    fn test_display_referential() {
        let err = ApiError::Referential("artist");
        assert_eq!(err.to_string(), "referenced artist does not exist");
    }

    #[test]
    fn test_from_db_error() {
        let db_err = sea_orm::DbErr::Custom("boom".into());
        let err: ApiError = db_err.into();
        assert!(matches!(err, ApiError::Db(_)));
    }

    #[test]
    fn test_not_found_maps_to_404() {
        let resp = ApiError::NotFound("venue").into_response();
        assert_eq!(resp.status(), StatusCode::NOT_FOUND);
    }

    #[test]
    fn test_validation_maps_to_422() {
        let resp = ApiError::Validation("missing name".into()).into_response();
        assert_eq!(resp.status(), StatusCode::UNPROCESSABLE_ENTITY);
    }

    #[test]
    fn test_referential_maps_to_422() {
        let resp = ApiError::Referential("venue").into_response();
        assert_eq!(resp.status(), StatusCode::UNPROCESSABLE_ENTITY);
    }

    #[test]
    fn test_db_maps_to_500() {
        let resp = ApiError::Db(sea_orm::DbErr::Custom("boom".into())).into_response();
        assert_eq!(resp.status(), StatusCode::INTERNAL_SERVER_ERROR);
    }

    #[tokio::test]
    async fn test_write_failures_share_generic_body() {
        for err in [
            ApiError::Validation("missing name".into()),
            ApiError::Referential("venue"),
            ApiError::Db(sea_orm::DbErr::Custom("boom".into())),
        ] {
            let resp = err.into_response();
            let body = axum::body::to_bytes(resp.into_body(), usize::MAX)
                .await
                .unwrap();
            assert_eq!(&body[..], GENERIC_FAILURE.as_bytes());
        }
    }
}
