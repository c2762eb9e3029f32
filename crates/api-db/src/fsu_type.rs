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

use fsu_uuid::fsu::FsuTypeId;
use model::fsu_kind::FsuKind;
use model::fsu_type::{FsuType, NewFsuType};
use model::validation::FsuValidationError;
use sqlx::PgConnection;

use crate::{DatabaseError, DatabaseResult, dcim};

/// Creates a catalog entry. Fails with a field error if the manufacturer
/// does not exist or the part number is already taken for this kind.
pub async fn create(
    txn: &mut PgConnection,
    id: FsuTypeId,
    new_type: &NewFsuType,
) -> DatabaseResult<FsuType> {
    new_type.validate()?;
    if dcim::find_manufacturer(txn, new_type.manufacturer_id)
        .await?
        .is_none()
    {
        return Err(FsuValidationError::UnknownReference {
            field: "manufacturer",
            id: new_type.manufacturer_id.to_string(),
        }
        .into());
    }

    let query = "INSERT INTO fsu_types
                (id, kind, manufacturer_id, model, part_number, description, comments, attributes)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
            RETURNING *";

    sqlx::query_as(query)
        .bind(id)
        .bind(new_type.kind())
        .bind(new_type.manufacturer_id)
        .bind(&new_type.model)
        .bind(&new_type.part_number)
        .bind(&new_type.description)
        .bind(&new_type.comments)
        .bind(sqlx::types::Json(&new_type.attributes))
        .fetch_one(txn)
        .await
        .map_err(|e| DatabaseError::query(query, e))
}

pub async fn find(txn: &mut PgConnection, id: FsuTypeId) -> DatabaseResult<Option<FsuType>> {
    let query = "SELECT * FROM fsu_types WHERE id = $1";
    sqlx::query_as(query)
        .bind(id)
        .fetch_optional(txn)
        .await
        .map_err(|e| DatabaseError::query(query, e))
}

/// Looks up the type referenced by an FSU or template request. A missing
/// type, or one of another kind, is a field error on `fsu_type`.
pub async fn load_for_kind(
    txn: &mut PgConnection,
    id: FsuTypeId,
    kind: FsuKind,
) -> DatabaseResult<FsuType> {
    let fsu_type = find(txn, id)
        .await?
        .ok_or_else(|| FsuValidationError::UnknownReference {
            field: "fsu_type",
            id: id.to_string(),
        })?;
    fsu_type.ensure_kind(kind, "fsu_type")?;
    Ok(fsu_type)
}

pub async fn find_by_kind(txn: &mut PgConnection, kind: FsuKind) -> DatabaseResult<Vec<FsuType>> {
    let query = "SELECT * FROM fsu_types WHERE kind = $1 ORDER BY model, part_number";
    sqlx::query_as(query)
        .bind(kind)
        .fetch_all(txn)
        .await
        .map_err(|e| DatabaseError::query(query, e))
}

/// Deletes a type. Types still used by FSUs or templates are protected.
pub async fn delete(txn: &mut PgConnection, kind: FsuKind, id: FsuTypeId) -> DatabaseResult<()> {
    let query = "DELETE FROM fsu_types WHERE id = $1 AND kind = $2";
    let result = sqlx::query(query)
        .bind(id)
        .bind(kind)
        .execute(txn)
        .await
        .map_err(|e| DatabaseError::delete(query, "fsu type", id.to_string(), e))?;

    if result.rows_affected() == 0 {
        return Err(DatabaseError::NotFoundError {
            kind: "fsu type",
            id: id.to_string(),
        });
    }
    Ok(())
}
