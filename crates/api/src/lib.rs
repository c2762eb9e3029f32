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

//! REST API for the FSU inventory.

use axum::ServiceExt;
use axum::extract::Request;
use db::template_instantiation::{self, InstantiationReport};
use fsu_uuid::dcim::DeviceId;
use model::device_event::DeviceEvent;
use sqlx::PgPool;
use sqlx::postgres::PgPoolOptions;
use tower_http::normalize_path::NormalizePath;

pub mod cfg;
pub mod logging;
pub mod web;

pub use cfg::command_line::{Command, Options};
pub use cfg::{Config, LogFormat};

#[cfg(test)]
pub use fsu_macros::sqlx_test;

#[cfg(test)]
mod tests;

pub async fn connect(database_url: &str, max_connections: u32) -> eyre::Result<PgPool> {
    let pool = PgPoolOptions::new()
        .max_connections(max_connections)
        .connect(database_url)
        .await?;
    Ok(pool)
}

/// Serves the API until the process receives Ctrl-C.
pub async fn run(config: Config) -> eyre::Result<()> {
    tracing::info!(listen = %config.listen, "starting fsu-api");
    let pool = connect(&config.database_url, config.max_database_connections).await?;

    let app = NormalizePath::trim_trailing_slash(web::router(web::AppState { pool }));
    let listener = tokio::net::TcpListener::bind(config.listen).await?;
    axum::serve(listener, ServiceExt::<Request>::into_make_service(app))
        .with_graceful_shutdown(async {
            if let Err(e) = tokio::signal::ctrl_c().await {
                tracing::error!("Failed to listen for shutdown signal: {e}");
            }
        })
        .await?;

    tracing::info!("fsu-api stopped");
    Ok(())
}

/// Dispatches a device creation event for every device, each in its own
/// transaction, and returns one outcome per device.
pub async fn instantiate_templates(
    pool: &PgPool,
    devices: &[DeviceId],
) -> Vec<(DeviceId, Result<InstantiationReport, db::DatabaseError>)> {
    let mut outcomes = Vec::with_capacity(devices.len());
    for &device_id in devices {
        let outcome =
            template_instantiation::handle_device_event(pool, DeviceEvent::Created { device_id })
                .await;
        if let Err(error) = &outcome {
            tracing::warn!(%device_id, %error, "template instantiation failed");
        }
        outcomes.push((device_id, outcome));
    }
    outcomes
}
