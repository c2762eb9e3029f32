/*
 * SPDX-FileCopyrightText: Copyright (c) 2025 NVIDIA CORPORATION & AFFILIATES. All rights reserved.
 * SPDX-License-Identifier: LicenseRef-NvidiaProprietary
 *
 * NVIDIA CORPORATION, its affiliates and licensors retain all intellectual
 * property and proprietary rights in and to this material, related
 * documentation and any modifications thereto. Any use, reproduction,
 * disclosure or distribution of this material and related documentation
 * without an express license agreement from NVIDIA CORPORATION or
 * its affiliates is strictly prohibited.
 */

use axum::Json;
use axum::extract::rejection::{JsonRejection, QueryRejection};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use db::DatabaseError;
use model::validation::{NON_FIELD_ERRORS, ValidationErrors};
use serde_json::json;

pub type ApiResult<T> = Result<T, ApiError>;

/// Everything a handler can fail with, and how it is shown to clients.
#[derive(thiserror::Error, Debug)]
pub enum ApiError {
    #[error("{0}")]
    Validation(ValidationErrors),

    #[error("{kind} not found: {id}")]
    NotFound { kind: &'static str, id: String },

    #[error("{0}")]
    Conflict(String),

    #[error("Malformed request: {0}")]
    MalformedRequest(String),

    #[error(transparent)]
    Database(DatabaseError),
}

impl ApiError {
    pub fn not_found(kind: &'static str, id: impl ToString) -> Self {
        ApiError::NotFound {
            kind,
            id: id.to_string(),
        }
    }
}

impl From<DatabaseError> for ApiError {
    fn from(error: DatabaseError) -> Self {
        match error {
            DatabaseError::Validation(errors) => ApiError::Validation(errors),
            DatabaseError::NotFoundError { kind, id } => ApiError::NotFound { kind, id },
            error @ (DatabaseError::Protected { .. } | DatabaseError::AlreadyFoundError { .. }) => {
                ApiError::Conflict(error.to_string())
            }
            DatabaseError::InvalidArgument(message) => ApiError::MalformedRequest(message),
            error => ApiError::Database(error),
        }
    }
}

impl From<ValidationErrors> for ApiError {
    fn from(errors: ValidationErrors) -> Self {
        ApiError::Validation(errors)
    }
}

impl From<model::FsuValidationError> for ApiError {
    fn from(error: model::FsuValidationError) -> Self {
        ApiError::Validation(error.into())
    }
}

impl From<JsonRejection> for ApiError {
    fn from(rejection: JsonRejection) -> Self {
        ApiError::MalformedRequest(rejection.body_text())
    }
}

impl From<QueryRejection> for ApiError {
    fn from(rejection: QueryRejection) -> Self {
        ApiError::MalformedRequest(rejection.body_text())
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        match self {
            ApiError::Validation(errors) => {
                tracing::debug!(%errors, "rejected request");
                (StatusCode::BAD_REQUEST, Json(errors)).into_response()
            }
            ApiError::MalformedRequest(message) => {
                tracing::debug!(%message, "malformed request");
                let mut errors = ValidationErrors::new();
                errors.add(NON_FIELD_ERRORS, message);
                (StatusCode::BAD_REQUEST, Json(errors)).into_response()
            }
            ApiError::NotFound { kind, id } => {
                tracing::debug!(kind, %id, "not found");
                (StatusCode::NOT_FOUND, Json(json!({"detail": "Not found."}))).into_response()
            }
            ApiError::Conflict(message) => {
                (StatusCode::CONFLICT, Json(json!({"detail": message}))).into_response()
            }
            ApiError::Database(error) => {
                tracing::error!(%error, "database error");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    Json(json!({"detail": "Internal server error."})),
                )
                    .into_response()
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use http_body_util::BodyExt;

    use super::*;

    async fn render(error: ApiError) -> (StatusCode, serde_json::Value) {
        let response = error.into_response();
        let status = response.status();
        let body = response.into_body().collect().await.unwrap().to_bytes();
        (status, serde_json::from_slice(&body).unwrap())
    }

    #[tokio::test]
    async fn validation_errors_are_field_maps() {
        let (status, body) =
            render(model::FsuValidationError::DeviceAndLocation.into()).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(
            body,
            json!({"non_field_errors": ["FSUs must be assigned to either a Device or a Storage location, but not both."]})
        );
    }

    #[tokio::test]
    async fn database_failures_stay_opaque() {
        let error = DatabaseError::Query {
            query: "SELECT secret FROM fsus".to_string(),
            source: sqlx::Error::PoolTimedOut,
        };
        let (status, body) = render(error.into()).await;
        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        assert!(!body.to_string().contains("secret"));
    }

    #[tokio::test]
    async fn protected_deletes_conflict() {
        let error = DatabaseError::Protected {
            kind: "fsu_type",
            id: "x".to_string(),
            referenced_by: "fsus".to_string(),
        };
        let (status, _) = render(error.into()).await;
        assert_eq!(status, StatusCode::CONFLICT);

        let (status, _) = render(ApiError::not_found("fsu", "x")).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
    }
}
