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

use std::time::Instant;

use axum::Router;
use axum::extract::Request;
use axum::middleware::Next;
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post};
use fsu_uuid::typed_uuids::{TypedUuid, UuidSubtype};
use model::fsu_kind::FsuKind;
use sqlx::PgPool;

pub use self::error::{ApiError, ApiResult};

mod error;
pub mod events;
pub mod fsu;
pub mod fsu_template;
pub mod fsu_type;

#[derive(Clone, Debug)]
pub struct AppState {
    pub pool: PgPool,
}

pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health))
        .route(
            "/api/fsu-types/{kind}",
            get(fsu_type::list).post(fsu_type::create),
        )
        .route(
            "/api/fsu-types/{kind}/{id}",
            get(fsu_type::detail).delete(fsu_type::delete),
        )
        .route(
            "/api/fsu-templates/{kind}",
            get(fsu_template::list).post(fsu_template::create),
        )
        .route(
            "/api/fsu-templates/{kind}/{id}",
            get(fsu_template::detail).delete(fsu_template::delete),
        )
        .route("/api/fsus/{kind}", get(fsu::list).post(fsu::create))
        .route(
            "/api/fsus/{kind}/{id}",
            get(fsu::detail).patch(fsu::update).delete(fsu::delete),
        )
        .route("/api/events/device-created", post(events::device_created))
        .layer(axum::middleware::from_fn(log_request))
        .with_state(state)
}

async fn health() -> impl IntoResponse {
    "OK"
}

async fn log_request(request: Request, next: Next) -> Response {
    let method = request.method().clone();
    let path = request.uri().path().to_string();
    let started = Instant::now();

    let response = next.run(request).await;

    tracing::info!(
        %method,
        path,
        status = response.status().as_u16(),
        elapsed_ms = started.elapsed().as_millis() as u64,
        "request"
    );
    response
}

/// Resolves the `{kind}` path segment. Unknown kinds are a 404 like any
/// other unknown path.
pub(crate) fn parse_kind(kind: &str) -> ApiResult<FsuKind> {
    kind.parse()
        .map_err(|_| ApiError::not_found("fsu kind", kind))
}

pub(crate) fn parse_id<T: UuidSubtype>(kind: &'static str, id: &str) -> ApiResult<TypedUuid<T>> {
    id.parse().map_err(|_| ApiError::not_found(kind, id))
}
