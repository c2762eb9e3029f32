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

//! Postgres persistence for the FSU inventory.
//!
//! Functions take a `&mut PgConnection` so that callers decide the
//! transaction boundary. The entry points in [`fsu_assignment`] and
//! [`template_instantiation`] expect to run inside one transaction per
//! request.

use model::validation::{FsuValidationError, ValidationErrors};
use sqlx::error::ErrorKind;

pub mod dcim;
pub mod fsu;
pub mod fsu_assignment;
pub mod fsu_child;
pub mod fsu_template;
pub mod fsu_type;
pub mod migrations;
pub mod template_instantiation;

#[cfg(test)]
pub use fsu_macros::sqlx_test;

pub type DatabaseResult<T> = Result<T, DatabaseError>;

#[derive(thiserror::Error, Debug)]
pub enum DatabaseError {
    #[error("Database query `{query}` failed: {source}")]
    Query {
        query: String,
        #[source]
        source: sqlx::Error,
    },

    #[error("Failed to acquire database connection: {0}")]
    Acquire(#[source] sqlx::Error),

    #[error("Failed to commit transaction: {0}")]
    TxnCommit(#[source] sqlx::Error),

    #[error("{kind} not found: {id}")]
    NotFoundError { kind: &'static str, id: String },

    #[error("{kind} already exists: {id}")]
    AlreadyFoundError { kind: &'static str, id: String },

    #[error("{kind} {id} is still referenced by {referenced_by} and cannot be deleted")]
    Protected {
        kind: &'static str,
        id: String,
        referenced_by: String,
    },

    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    #[error("{0}")]
    Validation(#[from] ValidationErrors),

    #[error("Failed to run migrations: {0}")]
    Migrate(#[from] sqlx::migrate::MigrateError),
}

impl DatabaseError {
    /// Wraps a failed query. Unique constraint violations the inventory knows
    /// about become field errors for the client instead.
    pub fn query(query: &str, source: sqlx::Error) -> Self {
        if let Some(error) = unique_violation(&source) {
            return DatabaseError::Validation(error.into());
        }
        DatabaseError::Query {
            query: query.to_string(),
            source,
        }
    }

    pub fn acquire(source: sqlx::Error) -> Self {
        DatabaseError::Acquire(source)
    }

    /// Like [`DatabaseError::query`] for DELETE statements: a foreign key
    /// violation means the row is still referenced.
    pub fn delete(query: &str, kind: &'static str, id: String, source: sqlx::Error) -> Self {
        if let sqlx::Error::Database(db_error) = &source {
            if db_error.kind() == ErrorKind::ForeignKeyViolation {
                return DatabaseError::Protected {
                    kind,
                    id,
                    referenced_by: db_error.table().unwrap_or("other records").to_string(),
                };
            }
        }
        DatabaseError::query(query, source)
    }

    pub fn is_not_found(&self) -> bool {
        matches!(self, DatabaseError::NotFoundError { .. })
    }
}

impl From<FsuValidationError> for DatabaseError {
    fn from(error: FsuValidationError) -> Self {
        DatabaseError::Validation(error.into())
    }
}

const DUPLICATE_FSU_ON_DEVICE: &str = "An FSU of this kind with this name already exists on this device.";
const DUPLICATE_FSU_IN_LOCATION: &str =
    "An FSU of this kind with this name already exists in this location.";
const DUPLICATE_ASSET_TAG: &str = "An FSU with this asset tag already exists.";
const DUPLICATE_PART_NUMBER: &str =
    "An FSU type with this manufacturer and part number already exists.";
const DUPLICATE_TEMPLATE: &str = "A template with this name already exists for this device type.";

fn unique_violation(error: &sqlx::Error) -> Option<FsuValidationError> {
    let sqlx::Error::Database(db_error) = error else {
        return None;
    };
    if db_error.kind() != ErrorKind::UniqueViolation {
        return None;
    }

    let (field, message) = match db_error.constraint()? {
        "fsus_device_name_key" => ("name", DUPLICATE_FSU_ON_DEVICE),
        "fsus_location_name_key" => ("name", DUPLICATE_FSU_IN_LOCATION),
        "fsus_asset_tag_key" => ("asset_tag", DUPLICATE_ASSET_TAG),
        "fsu_types_part_number_key" => ("part_number", DUPLICATE_PART_NUMBER),
        "fsu_templates_name_key" => ("name", DUPLICATE_TEMPLATE),
        _ => return None,
    };
    Some(FsuValidationError::Duplicate { field, message })
}

/// Opens a transaction on `pool`.
pub async fn begin(pool: &sqlx::PgPool) -> DatabaseResult<sqlx::PgTransaction<'static>> {
    pool.begin().await.map_err(DatabaseError::acquire)
}

pub async fn commit(txn: sqlx::PgTransaction<'_>) -> DatabaseResult<()> {
    txn.commit().await.map_err(DatabaseError::TxnCommit)
}

#[cfg(test)]
pub(crate) mod tests;
