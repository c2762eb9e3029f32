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

use std::net::{Ipv6Addr, SocketAddr};
use std::path::Path;

use serde::{Deserialize, Serialize};

pub mod command_line;

/// Configuration for fsu-api. Fields are documented as comments in the
/// output of [`Config::into_annotated_config_file`].
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Config {
    #[serde(default = "Defaults::listen")]
    pub listen: SocketAddr,
    #[serde(default = "Defaults::database_url")]
    pub database_url: String,
    #[serde(default = "Defaults::max_database_connections")]
    pub max_database_connections: u32,
    #[serde(default)]
    pub log_format: LogFormat,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "snake_case")]
pub enum LogFormat {
    #[default]
    Text,
    Json,
}

impl LogFormat {
    fn as_str(self) -> &'static str {
        match self {
            LogFormat::Text => "text",
            LogFormat::Json => "json",
        }
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            listen: Defaults::listen(),
            database_url: Defaults::database_url(),
            max_database_connections: Defaults::max_database_connections(),
            log_format: LogFormat::default(),
        }
    }
}

impl Config {
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let cfg = std::fs::read_to_string(path).map_err(|error| ConfigError::CouldNotRead {
            path: path.to_string_lossy().to_string(),
            error,
        })?;
        Self::parse(&cfg).map_err(|error| ConfigError::InvalidToml {
            path: path.to_string_lossy().to_string(),
            error,
        })
    }

    pub fn parse(cfg: &str) -> Result<Self, toml::de::Error> {
        toml::from_str::<Self>(cfg)
    }

    pub fn into_annotated_config_file(self) -> String {
        let Self {
            listen,
            database_url,
            max_database_connections,
            log_format,
        } = self;
        let listen = listen.to_string();
        let log_format = log_format.as_str();

        format!(
            r#"
#####
## Default config file for fsu-api. Everything in this file is optional: every non-comment line
## simply repeats the default value.
#####

## Address the REST API listens on.
listen = {listen:?}

## Postgres connection string. Can be overridden with --database-url or DATABASE_URL.
database_url = {database_url:?}

## Upper bound of the database connection pool.
max_database_connections = {max_database_connections}

## Log output, "text" or "json". Verbosity is controlled with RUST_LOG.
log_format = {log_format:?}
"#
        )
    }
}

pub struct Defaults;

impl Defaults {
    pub fn listen() -> SocketAddr {
        SocketAddr::new(Ipv6Addr::UNSPECIFIED.into(), 8080)
    }

    pub fn database_url() -> String {
        "postgres://localhost/fsu".to_string()
    }

    pub fn max_database_connections() -> u32 {
        16
    }
}

#[derive(thiserror::Error, Debug)]
pub enum ConfigError {
    #[error("Could not read config file at {path}: {error}")]
    CouldNotRead { path: String, error: std::io::Error },
    #[error("TOML error reading config file at {path}: {error}")]
    InvalidToml {
        path: String,
        error: toml::de::Error,
    },
}
