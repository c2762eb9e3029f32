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

//! Row level access to the `fsus` table. Cross record rules live in
//! [`crate::fsu_assignment`]; prefer it for anything a client can trigger.

use fsu_uuid::dcim::{DeviceId, LocationId};
use fsu_uuid::fsu::FsuId;
use model::fsu::{Fsu, FsuStatus, NewFsu};
use model::fsu_kind::FsuKind;
use sqlx::PgConnection;

use crate::{DatabaseError, DatabaseResult};

/// Optional list filters. Every set field narrows the result.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct FsuFilter {
    pub device: Option<DeviceId>,
    pub location: Option<LocationId>,
    pub status: Option<FsuStatus>,
}

pub async fn insert(txn: &mut PgConnection, id: FsuId, new_fsu: &NewFsu) -> DatabaseResult<Fsu> {
    let fields = new_fsu.fields.clone().normalized_for(new_fsu.kind);
    let query = "INSERT INTO fsus
                (id, kind, name, fsu_type_id, device_id, location_id, serial_number,
                 firmware_version, driver_name, driver_version, asset_tag, status,
                 description, comments, pci_slot_id, redundant, slot_id, parent_id)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13, $14, $15, $16, $17, $18)
            RETURNING *";

    sqlx::query_as(query)
        .bind(id)
        .bind(new_fsu.kind)
        .bind(&new_fsu.name)
        .bind(new_fsu.fsu_type_id)
        .bind(new_fsu.placement.device())
        .bind(new_fsu.placement.location())
        .bind(&new_fsu.serial_number)
        .bind(&new_fsu.firmware_version)
        .bind(&new_fsu.driver_name)
        .bind(&new_fsu.driver_version)
        .bind(&new_fsu.asset_tag)
        .bind(new_fsu.status)
        .bind(&new_fsu.description)
        .bind(&new_fsu.comments)
        .bind(&fields.pci_slot_id)
        .bind(fields.redundant)
        .bind(&fields.slot_id)
        .bind(new_fsu.parent_id)
        .fetch_one(txn)
        .await
        .map_err(|e| DatabaseError::query(query, e))
}

/// Writes every mutable column of `fsu` back.
pub async fn update(txn: &mut PgConnection, fsu: &Fsu) -> DatabaseResult<Fsu> {
    let query = "UPDATE fsus SET
                name = $2, fsu_type_id = $3, device_id = $4, location_id = $5,
                serial_number = $6, firmware_version = $7, driver_name = $8,
                driver_version = $9, asset_tag = $10, status = $11, description = $12,
                comments = $13, pci_slot_id = $14, redundant = $15, slot_id = $16,
                parent_id = $17, updated = now()
            WHERE id = $1
            RETURNING *";

    sqlx::query_as(query)
        .bind(fsu.id)
        .bind(&fsu.name)
        .bind(fsu.fsu_type_id)
        .bind(fsu.device_id())
        .bind(fsu.location_id())
        .bind(&fsu.serial_number)
        .bind(&fsu.firmware_version)
        .bind(&fsu.driver_name)
        .bind(&fsu.driver_version)
        .bind(&fsu.asset_tag)
        .bind(fsu.status)
        .bind(&fsu.description)
        .bind(&fsu.comments)
        .bind(&fsu.fields.pci_slot_id)
        .bind(fsu.fields.redundant)
        .bind(&fsu.fields.slot_id)
        .bind(fsu.parent_id)
        .fetch_one(txn)
        .await
        .map_err(|e| DatabaseError::query(query, e))
}

pub async fn find(txn: &mut PgConnection, id: FsuId) -> DatabaseResult<Option<Fsu>> {
    let query = "SELECT * FROM fsus WHERE id = $1";
    sqlx::query_as(query)
        .bind(id)
        .fetch_optional(txn)
        .await
        .map_err(|e| DatabaseError::query(query, e))
}

/// Loads an FSU of any kind and locks it for the rest of the transaction.
/// Child-side assignments take this lock on the parent before counting its
/// children.
pub async fn find_for_update(txn: &mut PgConnection, id: FsuId) -> DatabaseResult<Option<Fsu>> {
    let query = "SELECT * FROM fsus WHERE id = $1 FOR UPDATE";
    sqlx::query_as(query)
        .bind(id)
        .fetch_optional(txn)
        .await
        .map_err(|e| DatabaseError::query(query, e))
}

/// Loads an FSU of `kind` and locks it for the rest of the transaction.
pub async fn load_for_update(
    txn: &mut PgConnection,
    kind: FsuKind,
    id: FsuId,
) -> DatabaseResult<Fsu> {
    let query = "SELECT * FROM fsus WHERE id = $1 AND kind = $2 FOR UPDATE";
    sqlx::query_as(query)
        .bind(id)
        .bind(kind)
        .fetch_optional(txn)
        .await
        .map_err(|e| DatabaseError::query(query, e))?
        .ok_or_else(|| DatabaseError::NotFoundError {
            kind: "fsu",
            id: id.to_string(),
        })
}

pub async fn find_by_kind(
    txn: &mut PgConnection,
    kind: FsuKind,
    filter: FsuFilter,
) -> DatabaseResult<Vec<Fsu>> {
    let mut builder = sqlx::QueryBuilder::new("SELECT * FROM fsus WHERE kind = ");
    builder.push_bind(kind);

    if let Some(device) = filter.device {
        builder.push(" AND device_id = ").push_bind(device);
    }
    if let Some(location) = filter.location {
        builder.push(" AND location_id = ").push_bind(location);
    }
    if let Some(status) = filter.status {
        builder.push(" AND status = ").push_bind(status);
    }
    builder.push(" ORDER BY name, id");

    builder
        .build_query_as()
        .fetch_all(txn)
        .await
        .map_err(|e| DatabaseError::query(builder.sql(), e))
}

/// Number of FSUs whose parent is `parent_id`, not counting `except`.
pub async fn count_children(
    txn: &mut PgConnection,
    parent_id: FsuId,
    except: Option<FsuId>,
) -> DatabaseResult<usize> {
    let query = "SELECT COUNT(*) FROM fsus WHERE parent_id = $1 AND ($2::uuid IS NULL OR id <> $2)";
    let (count,): (i64,) = sqlx::query_as(query)
        .bind(parent_id)
        .bind(except)
        .fetch_one(txn)
        .await
        .map_err(|e| DatabaseError::query(query, e))?;
    usize::try_from(count)
        .map_err(|_| DatabaseError::InvalidArgument(format!("negative child count {count}")))
}

/// Deletes an FSU. Children keep existing and lose their parent.
pub async fn delete(txn: &mut PgConnection, kind: FsuKind, id: FsuId) -> DatabaseResult<()> {
    let query = "DELETE FROM fsus WHERE id = $1 AND kind = $2";
    let result = sqlx::query(query)
        .bind(id)
        .bind(kind)
        .execute(txn)
        .await
        .map_err(|e| DatabaseError::delete(query, "fsu", id.to_string(), e))?;

    if result.rows_affected() == 0 {
        return Err(DatabaseError::NotFoundError {
            kind: "fsu",
            id: id.to_string(),
        });
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use model::placement::Placement;

    use super::*;
    use crate::tests::{fan_type, server_a, spares_cage};

    #[crate::sqlx_test(fixtures("dcim", "fsu_types"))]
    async fn fsu_rows_round_trip(pool: sqlx::PgPool) {
        let mut txn = pool.begin().await.unwrap();

        let mut new_fan = NewFsu::new(FsuKind::Fan, "fan0", fan_type(), Placement::Device(server_a()));
        new_fan.serial_number = "SN-1".to_string();
        let fan = insert(&mut txn, FsuId::new(), &new_fan).await.unwrap();
        assert_eq!(fan.placement, Placement::Device(server_a()));
        assert_eq!(fan.status, FsuStatus::Available);

        let stored = insert(
            &mut txn,
            FsuId::new(),
            &NewFsu::new(FsuKind::Fan, "fan0", fan_type(), Placement::Location(spares_cage())),
        )
        .await
        .unwrap();

        let mut locked = load_for_update(&mut txn, FsuKind::Fan, fan.id).await.unwrap();
        locked.status = FsuStatus::Maintenance;
        let updated = update(&mut txn, &locked).await.unwrap();
        assert_eq!(updated.status, FsuStatus::Maintenance);
        assert_eq!(updated.serial_number, "SN-1");

        let in_server = find_by_kind(
            &mut txn,
            FsuKind::Fan,
            FsuFilter {
                device: Some(server_a()),
                ..Default::default()
            },
        )
        .await
        .unwrap();
        assert_eq!(in_server, vec![updated]);

        let maintenance = FsuFilter {
            status: Some(FsuStatus::Maintenance),
            ..Default::default()
        };
        assert_eq!(find_by_kind(&mut txn, FsuKind::Fan, maintenance).await.unwrap().len(), 1);

        // Wrong kind behaves like a missing row.
        assert!(
            load_for_update(&mut txn, FsuKind::Psu, fan.id)
                .await
                .unwrap_err()
                .is_not_found()
        );

        delete(&mut txn, FsuKind::Fan, stored.id).await.unwrap();
        assert!(find(&mut txn, stored.id).await.unwrap().is_none());
    }

    #[crate::sqlx_test(fixtures("dcim", "fsu_types"))]
    async fn duplicate_names_and_asset_tags(pool: sqlx::PgPool) {
        let mut txn = pool.begin().await.unwrap();

        let mut first = NewFsu::new(FsuKind::Fan, "fan0", fan_type(), Placement::Device(server_a()));
        first.asset_tag = Some("AT-1".to_string());
        insert(&mut txn, FsuId::new(), &first).await.unwrap();

        let mut savepoint = sqlx::Connection::begin(&mut *txn).await.unwrap();
        let err = insert(&mut savepoint, FsuId::new(), &first).await.unwrap_err();
        let DatabaseError::Validation(errors) = err else {
            panic!("unexpected error: {err:?}");
        };
        // Postgres reports the first violated constraint only.
        assert_eq!(errors.fields().count(), 1);
        savepoint.rollback().await.unwrap();

        let mut other_name = first.clone();
        other_name.name = "fan1".to_string();
        let err = insert(&mut txn, FsuId::new(), &other_name).await.unwrap_err();
        let DatabaseError::Validation(errors) = err else {
            panic!("unexpected error: {err:?}");
        };
        assert_eq!(
            errors.get("asset_tag").unwrap(),
            ["An FSU with this asset tag already exists."]
        );
    }
}
