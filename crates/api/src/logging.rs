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

use tracing::metadata::LevelFilter;
use tracing_subscriber::filter::EnvFilter;
use tracing_subscriber::prelude::*;
use tracing_subscriber::util::SubscriberInitExt;

use crate::cfg::LogFormat;

// Crates that log every statement or connection at INFO.
const QUIET_DIRECTIVES: &[&str] = &["sqlx::query=warn", "hyper=warn", "h2=warn"];

/// Installs the global subscriber. `RUST_LOG` wins over `debug`, which
/// wins over the INFO default.
pub fn setup_logging(debug: u8, format: LogFormat) -> eyre::Result<()> {
    let level = match debug {
        0 => LevelFilter::INFO,
        1 => LevelFilter::DEBUG,
        _ => LevelFilter::TRACE,
    };

    let mut env_filter = EnvFilter::builder()
        .with_default_directive(level.into())
        .from_env_lossy();
    if std::env::var_os(EnvFilter::DEFAULT_ENV).is_none() {
        for directive in QUIET_DIRECTIVES {
            env_filter = env_filter.add_directive(directive.parse()?);
        }
    }

    let (text, json) = match format {
        LogFormat::Text => (Some(tracing_subscriber::fmt::layer().compact()), None),
        LogFormat::Json => (None, Some(tracing_subscriber::fmt::layer().json())),
    };

    tracing_subscriber::registry()
        .with(text)
        .with(json)
        .with(env_filter)
        .try_init()
        .map_err(|e| {
            eyre::eyre!(
                "Failed to initialize trace logging for fsu-api. It's possible some earlier \
                code path has already set a global default log subscriber: {e}"
            )
        })
}
