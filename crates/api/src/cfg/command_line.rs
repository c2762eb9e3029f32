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

use std::net::{AddrParseError, SocketAddr};
use std::path::PathBuf;

use clap::{ArgAction, Parser};
use fsu_uuid::dcim::DeviceId;

use super::{Config, ConfigError, LogFormat};

#[derive(Parser, Debug)]
#[clap(name = "fsu-api")]
pub struct Options {
    #[clap(short, long, action = ArgAction::Count, help = "Turn on debug logging (same as RUST_LOG=debug)")]
    pub debug: u8,

    #[clap(long, value_enum, help = "Log output format, overriding configuration file")]
    pub log_format: Option<LogFormat>,

    #[clap(subcommand)]
    pub sub_cmd: Command,
}

#[derive(Parser, Debug)]
pub enum Command {
    #[clap(about = "Run the API service")]
    Run(Box<RunCommand>),

    #[clap(about = "Performs database migrations")]
    Migrate(Migrate),

    #[clap(about = "Create the FSUs described by the device type templates of existing devices")]
    InstantiateTemplates(InstantiateTemplates),

    #[clap(about = "Output a default TOML config file for use with run -f")]
    DefaultRunConfig,
}

#[derive(Parser, Debug)]
pub struct RunCommand {
    #[clap(long = "config", short = 'f', help = "Path to TOML configuration file")]
    pub config_path: Option<PathBuf>,
    #[clap(long, help = "Address to listen on, overriding configuration file")]
    pub listen: Option<String>,
    #[clap(
        long,
        env = "DATABASE_URL",
        help = "Postgres connection string, overriding configuration file"
    )]
    pub database_url: Option<String>,
}

#[derive(Parser, Debug)]
pub struct Migrate {
    #[clap(long, require_equals(true), env = "DATABASE_URL")]
    pub datastore: String,
}

#[derive(Parser, Debug)]
pub struct InstantiateTemplates {
    #[clap(long, require_equals(true), env = "DATABASE_URL")]
    pub datastore: String,
    #[clap(long = "device", required = true, num_args = 1.., help = "ID of a device to instantiate templates for")]
    pub devices: Vec<DeviceId>,
}

impl Options {
    pub fn load() -> Self {
        Self::parse()
    }
}

impl TryInto<Config> for RunCommand {
    type Error = CliError;

    // Load the config file, or the default, allowing CLI flags to override the corresponding settings.
    fn try_into(self) -> Result<Config, Self::Error> {
        let mut config = if let Some(config_path) = self.config_path {
            Config::load(&config_path)?
        } else {
            Config::default()
        };

        if let Some(listen) = self.listen {
            config.listen = listen
                .parse::<SocketAddr>()
                .map_err(|error| CliError::InvalidListeningAddress {
                    addr: listen,
                    error,
                })?;
        }
        if let Some(database_url) = self.database_url {
            config.database_url = database_url;
        }

        Ok(config)
    }
}

#[derive(thiserror::Error, Debug)]
pub enum CliError {
    #[error("Invalid listening address {addr}: {error}")]
    InvalidListeningAddress { addr: String, error: AddrParseError },
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),
}
