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

//! Reads (and, for tests and tooling, writes) the host platform's records
//! the FSU inventory refers to.

use fsu_uuid::dcim::{DeviceId, DeviceTypeId, InterfaceId, LocationId, ManufacturerId, PowerPortId};
use model::dcim::{Device, DeviceType, Interface, Location, Manufacturer, PowerPort};
use sqlx::PgConnection;

use crate::{DatabaseError, DatabaseResult};

pub async fn find_manufacturer(
    txn: &mut PgConnection,
    id: ManufacturerId,
) -> DatabaseResult<Option<Manufacturer>> {
    let query = "SELECT id, name FROM manufacturers WHERE id = $1";
    sqlx::query_as(query)
        .bind(id)
        .fetch_optional(txn)
        .await
        .map_err(|e| DatabaseError::query(query, e))
}

pub async fn find_device_type(
    txn: &mut PgConnection,
    id: DeviceTypeId,
) -> DatabaseResult<Option<DeviceType>> {
    let query = "SELECT id, manufacturer_id, model FROM device_types WHERE id = $1";
    sqlx::query_as(query)
        .bind(id)
        .fetch_optional(txn)
        .await
        .map_err(|e| DatabaseError::query(query, e))
}

pub async fn find_location(
    txn: &mut PgConnection,
    id: LocationId,
) -> DatabaseResult<Option<Location>> {
    let query = "SELECT id, name FROM locations WHERE id = $1";
    sqlx::query_as(query)
        .bind(id)
        .fetch_optional(txn)
        .await
        .map_err(|e| DatabaseError::query(query, e))
}

pub async fn find_device(txn: &mut PgConnection, id: DeviceId) -> DatabaseResult<Option<Device>> {
    let query = "SELECT id, name, device_type_id, location_id FROM devices WHERE id = $1";
    sqlx::query_as(query)
        .bind(id)
        .fetch_optional(txn)
        .await
        .map_err(|e| DatabaseError::query(query, e))
}

pub async fn load_device(txn: &mut PgConnection, id: DeviceId) -> DatabaseResult<Device> {
    find_device(txn, id)
        .await?
        .ok_or_else(|| DatabaseError::NotFoundError {
            kind: "device",
            id: id.to_string(),
        })
}

pub async fn find_interfaces_by_device(
    txn: &mut PgConnection,
    device_id: DeviceId,
) -> DatabaseResult<Vec<Interface>> {
    let query = "SELECT id, name, device_id, parent_nic_id FROM interfaces WHERE device_id = $1 ORDER BY name";
    sqlx::query_as(query)
        .bind(device_id)
        .fetch_all(txn)
        .await
        .map_err(|e| DatabaseError::query(query, e))
}

pub async fn find_power_ports_by_device(
    txn: &mut PgConnection,
    device_id: DeviceId,
) -> DatabaseResult<Vec<PowerPort>> {
    let query = "SELECT id, name, device_id, parent_psu_id FROM power_ports WHERE device_id = $1 ORDER BY name";
    sqlx::query_as(query)
        .bind(device_id)
        .fetch_all(txn)
        .await
        .map_err(|e| DatabaseError::query(query, e))
}

pub async fn create_device(
    txn: &mut PgConnection,
    name: &str,
    device_type_id: DeviceTypeId,
    location_id: Option<LocationId>,
) -> DatabaseResult<Device> {
    let query = "INSERT INTO devices (id, name, device_type_id, location_id)
            VALUES ($1, $2, $3, $4)
            RETURNING id, name, device_type_id, location_id";
    sqlx::query_as(query)
        .bind(DeviceId::new())
        .bind(name)
        .bind(device_type_id)
        .bind(location_id)
        .fetch_one(txn)
        .await
        .map_err(|e| DatabaseError::query(query, e))
}

pub async fn create_interface(
    txn: &mut PgConnection,
    device_id: DeviceId,
    name: &str,
) -> DatabaseResult<Interface> {
    let query = "INSERT INTO interfaces (id, name, device_id) VALUES ($1, $2, $3)
            RETURNING id, name, device_id, parent_nic_id";
    sqlx::query_as(query)
        .bind(InterfaceId::new())
        .bind(name)
        .bind(device_id)
        .fetch_one(txn)
        .await
        .map_err(|e| DatabaseError::query(query, e))
}

pub async fn create_power_port(
    txn: &mut PgConnection,
    device_id: DeviceId,
    name: &str,
) -> DatabaseResult<PowerPort> {
    let query = "INSERT INTO power_ports (id, name, device_id) VALUES ($1, $2, $3)
            RETURNING id, name, device_id, parent_psu_id";
    sqlx::query_as(query)
        .bind(PowerPortId::new())
        .bind(name)
        .bind(device_id)
        .fetch_one(txn)
        .await
        .map_err(|e| DatabaseError::query(query, e))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tests::{dgx_device_type, server_a, spares_cage};

    #[crate::sqlx_test(fixtures("dcim"))]
    async fn devices_and_their_ports(pool: sqlx::PgPool) {
        let mut txn = pool.begin().await.unwrap();

        let device = load_device(&mut txn, server_a()).await.unwrap();
        assert_eq!(device.name, "server-a");
        assert_eq!(device.device_type_id, dgx_device_type());

        let interfaces = find_interfaces_by_device(&mut txn, server_a()).await.unwrap();
        assert_eq!(
            interfaces.iter().map(|i| i.name.as_str()).collect::<Vec<_>>(),
            ["eth0", "eth1", "eth2"]
        );
        assert!(interfaces.iter().all(|i| i.parent_nic_id.is_none()));

        let rack = create_device(&mut txn, "server-c", dgx_device_type(), Some(spares_cage()))
            .await
            .unwrap();
        let port = create_power_port(&mut txn, rack.id, "PS1").await.unwrap();
        create_interface(&mut txn, rack.id, "bmc").await.unwrap();
        assert_eq!(
            find_power_ports_by_device(&mut txn, rack.id).await.unwrap(),
            vec![port]
        );
        assert!(find_location(&mut txn, spares_cage()).await.unwrap().is_some());

        let missing = load_device(&mut txn, DeviceId::new()).await.unwrap_err();
        assert!(missing.is_not_found());
    }
}
