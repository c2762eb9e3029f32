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

//! Identifiers for records owned by the host inventory platform. The FSU
//! inventory only references these.

use crate::typed_uuids::{TypedUuid, UuidSubtype};

pub struct DeviceMarker {}

impl UuidSubtype for DeviceMarker {
    const TYPE_NAME: &'static str = "DeviceId";
}

pub type DeviceId = TypedUuid<DeviceMarker>;

pub struct DeviceTypeMarker {}

impl UuidSubtype for DeviceTypeMarker {
    const TYPE_NAME: &'static str = "DeviceTypeId";
}

pub type DeviceTypeId = TypedUuid<DeviceTypeMarker>;

pub struct LocationMarker {}

impl UuidSubtype for LocationMarker {
    const TYPE_NAME: &'static str = "LocationId";
}

pub type LocationId = TypedUuid<LocationMarker>;

pub struct ManufacturerMarker {}

impl UuidSubtype for ManufacturerMarker {
    const TYPE_NAME: &'static str = "ManufacturerId";
}

pub type ManufacturerId = TypedUuid<ManufacturerMarker>;

pub struct InterfaceMarker {}

impl UuidSubtype for InterfaceMarker {
    const TYPE_NAME: &'static str = "InterfaceId";
}

pub type InterfaceId = TypedUuid<InterfaceMarker>;

pub struct PowerPortMarker {}

impl UuidSubtype for PowerPortMarker {
    const TYPE_NAME: &'static str = "PowerPortId";
}

pub type PowerPortId = TypedUuid<PowerPortMarker>;
