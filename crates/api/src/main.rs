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

use fsu_api::{Command, Config, Options};

#[tokio::main]
async fn main() -> eyre::Result<()> {
    let options = Options::load();

    match options.sub_cmd {
        Command::Run(run) => {
            let mut config: Config = (*run).try_into()?;
            if let Some(log_format) = options.log_format {
                config.log_format = log_format;
            }
            fsu_api::logging::setup_logging(options.debug, config.log_format)?;
            fsu_api::run(config).await?;
        }
        Command::Migrate(m) => {
            fsu_api::logging::setup_logging(options.debug, options.log_format.unwrap_or_default())?;
            tracing::info!("Running migrations");
            let pool = fsu_api::connect(&m.datastore, 1).await?;
            db::migrations::migrate(&pool).await?;
        }
        Command::InstantiateTemplates(cmd) => {
            fsu_api::logging::setup_logging(options.debug, options.log_format.unwrap_or_default())?;
            let pool = fsu_api::connect(&cmd.datastore, 1).await?;
            let mut failed = 0;
            for (device_id, outcome) in fsu_api::instantiate_templates(&pool, &cmd.devices).await {
                match outcome {
                    Ok(report) => println!("{device_id}: created {} FSUs", report.created.len()),
                    Err(error) => {
                        failed += 1;
                        println!("{device_id}: failed: {error}");
                    }
                }
            }
            if failed > 0 {
                eyre::bail!("template instantiation failed for {failed} device(s)");
            }
        }
        Command::DefaultRunConfig => {
            print!("{}", Config::default().into_annotated_config_file());
        }
    }

    Ok(())
}

