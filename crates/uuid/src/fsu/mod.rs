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

//! Identifiers for the records owned by the FSU inventory itself.

use crate::typed_uuids::{TypedUuid, UuidSubtype};

pub struct FsuMarker {}

impl UuidSubtype for FsuMarker {
    const TYPE_NAME: &'static str = "FsuId";
}

/// Identifies a single physical FSU instance, whatever its kind.
pub type FsuId = TypedUuid<FsuMarker>;

pub struct FsuTypeMarker {}

impl UuidSubtype for FsuTypeMarker {
    const TYPE_NAME: &'static str = "FsuTypeId";
}

/// Identifies a catalog entry (manufacturer + part number).
pub type FsuTypeId = TypedUuid<FsuTypeMarker>;

pub struct FsuTemplateMarker {}

impl UuidSubtype for FsuTemplateMarker {
    const TYPE_NAME: &'static str = "FsuTemplateId";
}

pub type FsuTemplateId = TypedUuid<FsuTemplateMarker>;
