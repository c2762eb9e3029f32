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

//! Where an FSU physically is: installed in a device, sitting in a storage
//! location, or neither. Never both.

use fsu_uuid::dcim::{DeviceId, LocationId};
use serde::{Deserialize, Serialize};

use crate::validation::FsuValidationError;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(tag = "type", content = "id", rename_all = "snake_case")]
pub enum Placement {
    #[default]
    Unassigned,
    Device(DeviceId),
    Location(LocationId),
}

impl Placement {
    /// Builds a placement from a `device`/`location` pair as found in a
    /// create request or a database row.
    pub fn from_parts(
        device: Option<DeviceId>,
        location: Option<LocationId>,
    ) -> Result<Self, FsuValidationError> {
        match (device, location) {
            (Some(_), Some(_)) => Err(FsuValidationError::DeviceAndLocation),
            (Some(device), None) => Ok(Placement::Device(device)),
            (None, Some(location)) => Ok(Placement::Location(location)),
            (None, None) => Ok(Placement::Unassigned),
        }
    }

    pub fn device(&self) -> Option<DeviceId> {
        match self {
            Placement::Device(device) => Some(*device),
            _ => None,
        }
    }

    pub fn location(&self) -> Option<LocationId> {
        match self {
            Placement::Location(location) => Some(*location),
            _ => None,
        }
    }

    pub fn is_in_storage(&self) -> bool {
        matches!(self, Placement::Location(_))
    }

    /// Applies a partial update to the current placement.
    ///
    /// Each argument is `None` when the field was absent from the request,
    /// `Some(None)` when it was explicitly cleared. A device always wins over
    /// a location that is merely left over from the current placement, and
    /// setting a location without mentioning the device clears the device.
    /// Naming both a device and a location is rejected.
    pub fn update(
        self,
        device: Option<Option<DeviceId>>,
        location: Option<Option<LocationId>>,
    ) -> Result<PlacementChange, FsuValidationError> {
        let after = match (device, location) {
            (Some(Some(_)), Some(Some(_))) => return Err(FsuValidationError::DeviceAndLocation),
            (Some(Some(device)), _) => Placement::Device(device),
            (_, Some(Some(location))) => Placement::Location(location),
            (Some(None), Some(None)) => Placement::Unassigned,
            (Some(None), None) => match self {
                Placement::Device(_) => Placement::Unassigned,
                other => other,
            },
            (None, Some(None)) => match self {
                Placement::Location(_) => Placement::Unassigned,
                other => other,
            },
            (None, None) => self,
        };

        Ok(PlacementChange {
            before: self,
            after,
            location_set: matches!(location, Some(Some(_))),
        })
    }
}

/// The outcome of [`Placement::update`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PlacementChange {
    pub before: Placement,
    pub after: Placement,
    /// The request explicitly assigned a storage location.
    pub location_set: bool,
}

impl PlacementChange {
    /// The FSU is being put into storage by this request. A parent FSU in
    /// storage cannot keep its children.
    pub fn moved_to_storage(&self) -> bool {
        self.location_set && self.after.is_in_storage()
    }

    /// The FSU no longer sits in the device it was in before.
    pub fn left_device(&self) -> bool {
        self.before.device().is_some() && self.before.device() != self.after.device()
    }
}
