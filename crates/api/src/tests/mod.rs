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

//! Route tests. They drive the router in-process with
//! `tower::ServiceExt::oneshot`, against the fixtures in
//! `sqlx_testing::FIXTURES`.

use axum::Router;
use axum::body::Body;
use axum::http::{Method, Request, StatusCode};
use http_body_util::BodyExt;
use serde_json::Value;
use tower::ServiceExt;

use crate::web::{AppState, router};

mod device_events;

// Rows created by the fixtures, as they appear in request bodies.
pub const SERVER_A: &str = "00000000-0000-0000-0000-00000000d001";
pub const SERVER_B: &str = "00000000-0000-0000-0000-00000000d002";
pub const SPARES_CAGE: &str = "00000000-0000-0000-0000-00000000c001";
pub const MANUFACTURER: &str = "00000000-0000-0000-0000-00000000a001";
pub const DGX_DEVICE_TYPE: &str = "00000000-0000-0000-0000-00000000b001";
pub const PS1: &str = "00000000-0000-0000-0000-00000000f001";
pub const PS2: &str = "00000000-0000-0000-0000-00000000f002";
pub const MAINBOARD_TYPE: &str = "00000000-0000-0000-0000-000000001001";
pub const CPU_TYPE: &str = "00000000-0000-0000-0000-000000001002";
pub const GPU_BASEBOARD_TYPE: &str = "00000000-0000-0000-0000-000000001003";
pub const GPU_TYPE: &str = "00000000-0000-0000-0000-000000001004";
pub const PSU_TYPE: &str = "00000000-0000-0000-0000-000000001008";
pub const FAN_TYPE: &str = "00000000-0000-0000-0000-000000001009";

pub struct TestApp {
    router: Router,
}

impl TestApp {
    pub fn new(pool: sqlx::PgPool) -> Self {
        TestApp {
            router: router(AppState { pool }),
        }
    }

    /// An app whose pool never connects, for routes that fail before
    /// touching the database.
    pub fn without_database() -> Self {
        let pool = sqlx::postgres::PgPoolOptions::new()
            .connect_lazy("postgres://localhost/unused")
            .unwrap();
        Self::new(pool)
    }

    pub async fn send(&self, method: Method, uri: &str, body: Option<Value>) -> (StatusCode, Value) {
        let mut request = Request::builder().method(method).uri(uri);
        let body = match body {
            Some(body) => {
                request = request.header("content-type", "application/json");
                Body::from(body.to_string())
            }
            None => Body::empty(),
        };
        let response = self
            .router
            .clone()
            .oneshot(request.body(body).unwrap())
            .await
            .unwrap();

        let status = response.status();
        let bytes = response.into_body().collect().await.unwrap().to_bytes();
        let body = if bytes.is_empty() {
            Value::Null
        } else {
            serde_json::from_slice(&bytes)
                .unwrap_or_else(|_| Value::String(String::from_utf8_lossy(&bytes).to_string()))
        };
        (status, body)
    }

    pub async fn get(&self, uri: &str) -> (StatusCode, Value) {
        self.send(Method::GET, uri, None).await
    }

    pub async fn post(&self, uri: &str, body: Value) -> (StatusCode, Value) {
        self.send(Method::POST, uri, Some(body)).await
    }

    pub async fn patch(&self, uri: &str, body: Value) -> (StatusCode, Value) {
        self.send(Method::PATCH, uri, Some(body)).await
    }

    pub async fn delete(&self, uri: &str) -> (StatusCode, Value) {
        self.send(Method::DELETE, uri, None).await
    }

    /// Creates an FSU and returns its ID, failing the test on any error.
    pub async fn create_fsu(&self, kind: &str, body: Value) -> String {
        let (status, body) = self.post(&format!("/api/fsus/{kind}"), body).await;
        assert_eq!(status, StatusCode::CREATED, "{body}");
        body["id"].as_str().unwrap().to_string()
    }
}
