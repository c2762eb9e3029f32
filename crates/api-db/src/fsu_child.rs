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

//! Uniform access to the children of a [`ChildRelationship`], whether they
//! are FSUs (CPUs, GPUs, Disks) or host platform records (interfaces, power
//! ports).

use std::collections::HashMap;

use fsu_uuid::dcim::DeviceId;
use fsu_uuid::fsu::FsuId;
use fsu_uuid::typed_uuids::{TypedUuid, UuidSubtype};
use model::assignment::{ChildRecord, ParentRef};
use model::dcim::DeviceRef;
use model::fsu_kind::{ChildRelationship, FsuKind};
use model::validation::FsuValidationError;
use serde::Serialize;
use sqlx::{PgConnection, Postgres, QueryBuilder};

use crate::{DatabaseError, DatabaseResult};

/// Where the children of a relationship are stored.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct ChildTable {
    table: &'static str,
    parent_column: &'static str,
    /// Set when the table holds more than one kind of child.
    kind: Option<FsuKind>,
}

impl ChildTable {
    fn for_relationship(relationship: ChildRelationship) -> Self {
        match relationship {
            ChildRelationship::NicInterfaces => ChildTable {
                table: "interfaces",
                parent_column: "parent_nic_id",
                kind: None,
            },
            ChildRelationship::PsuPowerPorts => ChildTable {
                table: "power_ports",
                parent_column: "parent_psu_id",
                kind: None,
            },
            other => ChildTable {
                table: "fsus",
                parent_column: "parent_id",
                kind: other.child_fsu_kind(),
            },
        }
    }

    fn select(&self) -> QueryBuilder<'static, Postgres> {
        let mut builder = QueryBuilder::new(format!(
            "SELECT c.id, c.name, d.id AS device_id, d.name AS device_name,
                    p.id AS parent_id, p.name AS parent_name
                FROM {table} c
                LEFT JOIN devices d ON d.id = c.device_id
                LEFT JOIN fsus p ON p.id = c.{parent_column}
                WHERE TRUE",
            table = self.table,
            parent_column = self.parent_column,
        ));
        if let Some(kind) = self.kind {
            builder.push(" AND c.kind = ").push_bind(kind);
        }
        builder
    }
}

#[derive(Debug, sqlx::FromRow)]
struct ChildRow {
    id: uuid::Uuid,
    name: String,
    device_id: Option<DeviceId>,
    device_name: Option<String>,
    parent_id: Option<FsuId>,
    parent_name: Option<String>,
}

impl ChildRow {
    fn into_record<T: UuidSubtype>(self) -> ChildRecord<TypedUuid<T>> {
        ChildRecord {
            id: TypedUuid::from_uuid(self.id),
            name: self.name,
            device: self
                .device_id
                .zip(self.device_name)
                .map(|(id, name)| DeviceRef { id, name }),
            parent: self
                .parent_id
                .zip(self.parent_name)
                .map(|(id, name)| ParentRef { id, name }),
        }
    }
}

/// A child as listed on its parent.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ChildSummary {
    pub id: uuid::Uuid,
    pub name: String,
}

/// The children currently pointing at `parent_id`, locked for update.
pub async fn find_assigned<T: UuidSubtype>(
    txn: &mut PgConnection,
    relationship: ChildRelationship,
    parent_id: FsuId,
) -> DatabaseResult<Vec<ChildRecord<TypedUuid<T>>>> {
    let table = ChildTable::for_relationship(relationship);
    let mut builder = table.select();
    builder
        .push(format!(" AND c.{} = ", table.parent_column))
        .push_bind(parent_id)
        .push(" ORDER BY c.name, c.id FOR UPDATE OF c");

    let rows: Vec<ChildRow> = builder
        .build_query_as()
        .fetch_all(txn)
        .await
        .map_err(|e| DatabaseError::query(builder.sql(), e))?;
    Ok(rows.into_iter().map(ChildRow::into_record).collect())
}

/// Loads the children a request names, in request order. Unknown IDs (or
/// IDs of another kind) are a field error on the relationship's child list.
pub async fn find_by_ids<T: UuidSubtype>(
    txn: &mut PgConnection,
    relationship: ChildRelationship,
    ids: &[TypedUuid<T>],
) -> DatabaseResult<Vec<ChildRecord<TypedUuid<T>>>> {
    if ids.is_empty() {
        return Ok(Vec::new());
    }

    let table = ChildTable::for_relationship(relationship);
    let mut builder = table.select();
    builder
        .push(" AND c.id = ANY(")
        .push_bind(ids.to_vec())
        .push(") FOR UPDATE OF c");

    let rows: Vec<ChildRow> = builder
        .build_query_as()
        .fetch_all(txn)
        .await
        .map_err(|e| DatabaseError::query(builder.sql(), e))?;
    let by_id: HashMap<TypedUuid<T>, ChildRecord<TypedUuid<T>>> = rows
        .into_iter()
        .map(|row| {
            let record = row.into_record();
            (record.id, record)
        })
        .collect();

    ids.iter()
        .map(|id| {
            by_id.get(id).cloned().ok_or_else(|| {
                FsuValidationError::UnknownReference {
                    field: relationship.children_field(),
                    id: id.to_string(),
                }
                .into()
            })
        })
        .collect()
}

/// Points every child in `ids` at `parent`, or clears their parent.
pub async fn set_parent<T: UuidSubtype>(
    txn: &mut PgConnection,
    relationship: ChildRelationship,
    ids: &[TypedUuid<T>],
    parent: Option<FsuId>,
) -> DatabaseResult<()> {
    if ids.is_empty() {
        return Ok(());
    }

    let table = ChildTable::for_relationship(relationship);
    let query = format!(
        "UPDATE {} SET {} = $1, updated = now() WHERE id = ANY($2)",
        table.table, table.parent_column
    );
    sqlx::query(&query)
        .bind(parent)
        .bind(ids.to_vec())
        .execute(txn)
        .await
        .map_err(|e| DatabaseError::query(&query, e))?;
    Ok(())
}

/// The children of `parent_id`, for display.
pub async fn list_children(
    txn: &mut PgConnection,
    relationship: ChildRelationship,
    parent_id: FsuId,
) -> DatabaseResult<Vec<ChildSummary>> {
    let table = ChildTable::for_relationship(relationship);
    let mut builder = table.select();
    builder
        .push(format!(" AND c.{} = ", table.parent_column))
        .push_bind(parent_id)
        .push(" ORDER BY c.name, c.id");

    let rows: Vec<ChildRow> = builder
        .build_query_as()
        .fetch_all(txn)
        .await
        .map_err(|e| DatabaseError::query(builder.sql(), e))?;
    Ok(rows
        .into_iter()
        .map(|row| ChildSummary {
            id: row.id,
            name: row.name,
        })
        .collect())
}
