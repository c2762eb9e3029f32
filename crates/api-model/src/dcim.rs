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

//! Records owned by the host inventory platform. The FSU inventory reads
//! them to resolve placements and owns only the parent references on
//! interfaces and power ports.

use std::fmt;

use fsu_uuid::dcim::{
    DeviceId, DeviceTypeId, InterfaceId, LocationId, ManufacturerId, PowerPortId,
};
use fsu_uuid::fsu::FsuId;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, sqlx::FromRow)]
pub struct Manufacturer {
    pub id: ManufacturerId,
    pub name: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, sqlx::FromRow)]
pub struct DeviceType {
    pub id: DeviceTypeId,
    pub manufacturer_id: ManufacturerId,
    pub model: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, sqlx::FromRow)]
pub struct Location {
    pub id: LocationId,
    pub name: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, sqlx::FromRow)]
pub struct Device {
    pub id: DeviceId,
    pub name: String,
    pub device_type_id: DeviceTypeId,
    pub location_id: Option<LocationId>,
}

impl Device {
    pub fn to_ref(&self) -> DeviceRef {
        DeviceRef {
            id: self.id,
            name: self.name.clone(),
        }
    }
}

/// A device as it appears in validation messages: the ID for comparisons,
/// the name for humans.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct DeviceRef {
    pub id: DeviceId,
    pub name: String,
}

impl fmt::Display for DeviceRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.name)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, sqlx::FromRow)]
pub struct Interface {
    pub id: InterfaceId,
    pub name: String,
    pub device_id: DeviceId,
    pub parent_nic_id: Option<FsuId>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, sqlx::FromRow)]
pub struct PowerPort {
    pub id: PowerPortId,
    pub name: String,
    pub device_id: DeviceId,
    pub parent_psu_id: Option<FsuId>,
}
