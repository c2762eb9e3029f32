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

//! Shared pieces of the database tests.

use fsu_uuid::dcim::{
    DeviceId, DeviceTypeId, InterfaceId, LocationId, ManufacturerId, PowerPortId,
};
use fsu_uuid::fsu::FsuTypeId;
use fsu_uuid::typed_uuids::{TypedUuid, UuidSubtype};

fn id<T: UuidSubtype>(s: &str) -> TypedUuid<T> {
    s.parse().unwrap()
}

// Rows created by the `dcim` fixture.
pub fn manufacturer() -> ManufacturerId {
    id("00000000-0000-0000-0000-00000000a001")
}
pub fn dgx_device_type() -> DeviceTypeId {
    id("00000000-0000-0000-0000-00000000b001")
}
pub fn ovx_device_type() -> DeviceTypeId {
    id("00000000-0000-0000-0000-00000000b002")
}
pub fn spares_cage() -> LocationId {
    id("00000000-0000-0000-0000-00000000c001")
}
pub fn server_a() -> DeviceId {
    id("00000000-0000-0000-0000-00000000d001")
}
pub fn server_b() -> DeviceId {
    id("00000000-0000-0000-0000-00000000d002")
}
/// eth0, eth1 and eth2 on server-a.
pub fn server_a_interfaces() -> [InterfaceId; 3] {
    [
        id("00000000-0000-0000-0000-00000000e001"),
        id("00000000-0000-0000-0000-00000000e002"),
        id("00000000-0000-0000-0000-00000000e003"),
    ]
}
pub fn server_b_interface() -> InterfaceId {
    id("00000000-0000-0000-0000-00000000e101")
}
/// PS1 and PS2 on server-a.
pub fn server_a_power_ports() -> [PowerPortId; 2] {
    [
        id("00000000-0000-0000-0000-00000000f001"),
        id("00000000-0000-0000-0000-00000000f002"),
    ]
}

// Rows created by the `fsu_types` fixture.
pub fn mainboard_type() -> FsuTypeId {
    id("00000000-0000-0000-0000-000000001001")
}
pub fn cpu_type() -> FsuTypeId {
    id("00000000-0000-0000-0000-000000001002")
}
pub fn gpu_baseboard_type() -> FsuTypeId {
    id("00000000-0000-0000-0000-000000001003")
}
pub fn gpu_type() -> FsuTypeId {
    id("00000000-0000-0000-0000-000000001004")
}
pub fn hba_type() -> FsuTypeId {
    id("00000000-0000-0000-0000-000000001005")
}
pub fn disk_type() -> FsuTypeId {
    id("00000000-0000-0000-0000-000000001006")
}
pub fn nic_type() -> FsuTypeId {
    id("00000000-0000-0000-0000-000000001007")
}
pub fn psu_type() -> FsuTypeId {
    id("00000000-0000-0000-0000-000000001008")
}
pub fn fan_type() -> FsuTypeId {
    id("00000000-0000-0000-0000-000000001009")
}
