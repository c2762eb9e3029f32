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

//! Per-test databases for `#[sqlx_test]`.
//!
//! The first test in a process creates `fsu_test_template` and runs every
//! migration in it. Each test then gets its own copy of that template with
//! the requested fixtures loaded on top. The copy is dropped when the test
//! returns and kept for inspection when it panics.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

use sqlx::migrate::MigrateError;
use sqlx::postgres::{PgConnectOptions, PgPoolOptions};
use sqlx::{ConnectOptions, Connection, Executor, PgPool};
use tokio::sync::OnceCell;

const TEMPLATE_DB: &str = "fsu_test_template";
// Postgres truncates identifiers past this length.
const MAX_DB_NAME_LEN: usize = 63;
const POOL_CLOSE_TIMEOUT: Duration = Duration::from_secs(10);

static TEMPLATE_READY: OnceCell<()> = OnceCell::const_new();
static DB_NUMBER: AtomicUsize = AtomicUsize::new(0);

/// SQL fixtures shared by the database tests of every crate, by name.
///
/// - `dcim`: one manufacturer, two device types, the "Spares cage"
///   location, devices `server-a` and `server-b`, and their interfaces and
///   power ports.
/// - `fsu_types`: one FSU type per kind, made by the `dcim` manufacturer.
pub const FIXTURES: &[(&str, &str)] = &[
    ("dcim", include_str!("../fixtures/dcim.sql")),
    ("fsu_types", include_str!("../fixtures/fsu_types.sql")),
];

#[derive(thiserror::Error, Debug)]
pub enum HarnessError {
    #[error("DATABASE_URL is not set; database tests need a Postgres server")]
    NoDatabaseUrl,
    #[error("Unknown fixture {name:?}, expected one of {known:?}")]
    UnknownFixture {
        name: String,
        known: Vec<&'static str>,
    },
    #[error("Failed to load fixture {name}: {source}")]
    Fixture {
        name: &'static str,
        #[source]
        source: sqlx::Error,
    },
    #[error("Failed to migrate the template database: {0}")]
    Migrate(#[from] MigrateError),
    #[error("Database setup failed: {0}")]
    Database(#[from] sqlx::Error),
}

/// Runs one database test on a fresh database and returns what it returned.
///
/// Panics when the database cannot be prepared, including when
/// `DATABASE_URL` is unset. Crates using `#[sqlx_test]` mark those tests
/// ignored at build time instead, so they only reach this point when a
/// database was configured or when `--ignored` was asked for.
pub fn run<F, Fut>(test_path: &str, fixtures: &[&str], test_fn: F) -> Fut::Output
where
    F: FnOnce(PgPool) -> Fut,
    Fut: Future,
{
    let runtime = tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()
        .expect("failed to start the test runtime");

    runtime.block_on(async move {
        let test_db = TestDatabase::create(test_path, fixtures)
            .await
            .unwrap_or_else(|e| panic!("{test_path}: {e}"));

        let output = test_fn(test_db.pool.clone()).await;
        test_db.drop_database(test_path).await;
        output
    })
}

struct TestDatabase {
    name: String,
    server: PgConnectOptions,
    pool: PgPool,
}

impl TestDatabase {
    async fn create(test_path: &str, fixtures: &[&str]) -> Result<Self, HarnessError> {
        let fixtures = resolve_fixtures(fixtures)?;
        let server = server_options(std::env::var("DATABASE_URL").ok())?;
        TEMPLATE_READY
            .get_or_try_init(|| create_template(&server))
            .await?;

        let name = database_name(DB_NUMBER.fetch_add(1, Ordering::SeqCst), test_path);
        let mut admin = server.connect().await?;
        (&mut admin)
            .execute(format!(r#"DROP DATABASE IF EXISTS "{name}""#).as_str())
            .await?;
        (&mut admin)
            .execute(format!(r#"CREATE DATABASE "{name}" TEMPLATE "{TEMPLATE_DB}""#).as_str())
            .await?;
        admin.close().await?;

        let options = server.clone().database(&name);
        let mut conn = options.connect().await?;
        for (fixture, sql) in fixtures {
            (&mut conn)
                .execute(sql)
                .await
                .map_err(|source| HarnessError::Fixture {
                    name: fixture,
                    source,
                })?;
        }
        conn.close().await?;

        let pool = PgPoolOptions::new()
            .max_connections(5)
            .connect_with(options)
            .await?;
        Ok(TestDatabase { name, server, pool })
    }

    async fn drop_database(self, test_path: &str) {
        if tokio::time::timeout(POOL_CLOSE_TIMEOUT, self.pool.close())
            .await
            .is_err()
        {
            eprintln!("{test_path} held onto its pool after returning");
            return;
        }

        let result = async {
            let mut admin = self.server.connect().await?;
            (&mut admin)
                .execute(format!(r#"DROP DATABASE IF EXISTS "{}""#, self.name).as_str())
                .await?;
            admin.close().await
        }
        .await;
        if let Err(e) = result {
            eprintln!("failed to drop test database {}: {e}", self.name);
        }
    }
}

async fn create_template(server: &PgConnectOptions) -> Result<(), HarnessError> {
    let mut admin = server.connect().await?;
    (&mut admin)
        .execute(format!(r#"DROP DATABASE IF EXISTS "{TEMPLATE_DB}""#).as_str())
        .await?;
    (&mut admin)
        .execute(format!(r#"CREATE DATABASE "{TEMPLATE_DB}""#).as_str())
        .await?;
    admin.close().await?;

    // Postgres refuses to copy a template that still has connections.
    let template = PgPoolOptions::new()
        .max_connections(1)
        .connect_with(server.clone().database(TEMPLATE_DB))
        .await?;
    db::migrations::migrate(&template).await?;
    template.close().await;
    Ok(())
}

fn server_options(database_url: Option<String>) -> Result<PgConnectOptions, HarnessError> {
    let url = database_url.ok_or(HarnessError::NoDatabaseUrl)?;
    Ok(url.parse()?)
}

fn resolve_fixtures(names: &[&str]) -> Result<Vec<(&'static str, &'static str)>, HarnessError> {
    names
        .iter()
        .map(|name| {
            FIXTURES
                .iter()
                .find(|(known, _)| known == name)
                .copied()
                .ok_or_else(|| HarnessError::UnknownFixture {
                    name: name.to_string(),
                    known: FIXTURES.iter().map(|(known, _)| *known).collect(),
                })
        })
        .collect()
}

fn database_name(number: usize, test_path: &str) -> String {
    let mut name = format!("fsu_test_{number}_{}", test_path.replace("::", "_"));
    name.truncate(MAX_DB_NAME_LEN);
    name
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fixtures_resolve_in_request_order() {
        let resolved = resolve_fixtures(&["fsu_types", "dcim"]).unwrap();
        let names: Vec<_> = resolved.iter().map(|(name, _)| *name).collect();
        assert_eq!(names, ["fsu_types", "dcim"]);
        assert!(resolved[1].1.contains("INSERT INTO devices"));
    }

    #[test]
    fn unknown_fixture_lists_the_catalogue() {
        let err = resolve_fixtures(&["dcim", "racks"]).unwrap_err();
        assert_eq!(
            err.to_string(),
            r#"Unknown fixture "racks", expected one of ["dcim", "fsu_types"]"#
        );
    }

    #[test]
    fn missing_database_url_is_an_error() {
        assert!(matches!(
            server_options(None),
            Err(HarnessError::NoDatabaseUrl)
        ));
        assert!(server_options(Some("postgres://localhost/fsu".to_string())).is_ok());
    }

    #[test]
    fn database_names_fit_postgres_identifiers() {
        assert_eq!(
            database_name(3, "db::fsu::tests::find_by_kind"),
            "fsu_test_3_db_fsu_tests_find_by_kind"
        );
        let long = database_name(12, &"fsu_assignment::tests::".repeat(5));
        assert_eq!(long.len(), MAX_DB_NAME_LEN);
        assert!(long.starts_with("fsu_test_12_fsu_assignment_tests_"));
    }
}
