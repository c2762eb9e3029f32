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

use std::fmt;

use chrono::prelude::*;
use fsu_uuid::dcim::{DeviceId, InterfaceId, LocationId, PowerPortId};
use fsu_uuid::fsu::{FsuId, FsuTypeId};
use serde::{Deserialize, Serialize};
use sqlx::Row;
use sqlx::postgres::PgRow;

use crate::fsu_kind::{ChildRelationship, FsuKind};
use crate::placement::Placement;
use crate::validation::{FsuValidationError, ValidationErrors};

/// Lifecycle status of a physical unit.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize, sqlx::Type)]
#[serde(rename_all = "snake_case")]
#[sqlx(type_name = "fsu_status", rename_all = "snake_case")]
pub enum FsuStatus {
    Active,
    #[default]
    Available,
    Maintenance,
    Offline,
}

impl fmt::Display for FsuStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let string = match self {
            FsuStatus::Active => "Active",
            FsuStatus::Available => "Available",
            FsuStatus::Maintenance => "Maintenance",
            FsuStatus::Offline => "Offline",
        };
        write!(f, "{string}")
    }
}

/* ********************************** */
/*             KindFields             */
/* ********************************** */

/// Scalar fields that exist only for some kinds: `pci_slot_id` (GPU, HBA,
/// NIC), `redundant` (PSU) and `slot_id` (RAM module). Shared between
/// templates and instances.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct KindFields {
    pub pci_slot_id: Option<String>,
    pub redundant: Option<bool>,
    pub slot_id: Option<String>,
}

impl KindFields {
    pub fn validate_for(&self, kind: FsuKind, errors: &mut ValidationErrors) {
        let not_applicable = |field| FsuValidationError::NotApplicable {
            field,
            kind: kind.verbose_name(),
        };
        if self.pci_slot_id.is_some() && !kind.has_pci_slot_id() {
            errors.push(not_applicable("pci_slot_id"));
        }
        if self.redundant.is_some() && !kind.has_redundant() {
            errors.push(not_applicable("redundant"));
        }
        if self.slot_id.is_some() && !kind.has_slot_id() {
            errors.push(not_applicable("slot_id"));
        }
    }

    /// Fills in the defaults a kind carries; PSUs are non-redundant unless
    /// stated otherwise.
    pub fn normalized_for(mut self, kind: FsuKind) -> Self {
        if kind.has_redundant() && self.redundant.is_none() {
            self.redundant = Some(false);
        }
        self
    }

    fn from_row(row: &PgRow) -> Result<Self, sqlx::Error> {
        Ok(KindFields {
            pci_slot_id: row.try_get("pci_slot_id")?,
            redundant: row.try_get("redundant")?,
            slot_id: row.try_get("slot_id")?,
        })
    }
}

/* ********************************** */
/*                 Fsu                */
/* ********************************** */

/// A physical unit tracked in inventory.
///
/// `parent_id` is the child side of a [`ChildRelationship`]: the Mainboard
/// of a CPU, the GPU Baseboard of a GPU or the HBA of a Disk. It is always
/// `None` for other kinds.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Fsu {
    pub id: FsuId,
    pub kind: FsuKind,
    pub name: String,
    pub fsu_type_id: FsuTypeId,
    pub placement: Placement,
    pub serial_number: String,
    pub firmware_version: String,
    pub driver_name: String,
    pub driver_version: String,
    pub asset_tag: Option<String>,
    pub status: FsuStatus,
    pub description: String,
    pub comments: String,
    pub fields: KindFields,
    pub parent_id: Option<FsuId>,
    pub created: DateTime<Utc>,
    pub updated: DateTime<Utc>,
}

impl Fsu {
    pub fn device_id(&self) -> Option<DeviceId> {
        self.placement.device()
    }

    pub fn location_id(&self) -> Option<LocationId> {
        self.placement.location()
    }

    /// Re-checks the per-record rules after a patch has been applied.
    pub fn validate(&self) -> Result<(), ValidationErrors> {
        validate_common(self.kind, &self.name, &self.fields, self.parent_id)
    }
}

impl<'r> sqlx::FromRow<'r, PgRow> for Fsu {
    fn from_row(row: &'r PgRow) -> Result<Self, sqlx::Error> {
        let placement = Placement::from_parts(row.try_get("device_id")?, row.try_get("location_id")?)
            .map_err(|e| sqlx::Error::Decode(Box::new(e)))?;

        Ok(Fsu {
            id: row.try_get("id")?,
            kind: row.try_get("kind")?,
            name: row.try_get("name")?,
            fsu_type_id: row.try_get("fsu_type_id")?,
            placement,
            serial_number: row.try_get("serial_number")?,
            firmware_version: row.try_get("firmware_version")?,
            driver_name: row.try_get("driver_name")?,
            driver_version: row.try_get("driver_version")?,
            asset_tag: row.try_get("asset_tag")?,
            status: row.try_get("status")?,
            description: row.try_get("description")?,
            comments: row.try_get("comments")?,
            fields: KindFields::from_row(row)?,
            parent_id: row.try_get("parent_id")?,
            created: row.try_get("created")?,
            updated: row.try_get("updated")?,
        })
    }
}

fn validate_common(
    kind: FsuKind,
    name: &str,
    fields: &KindFields,
    parent_id: Option<FsuId>,
) -> Result<(), ValidationErrors> {
    let mut errors = ValidationErrors::new();
    if name.trim().is_empty() {
        errors.push(FsuValidationError::Blank { field: "name" });
    }
    fields.validate_for(kind, &mut errors);
    if parent_id.is_some() && kind.owning_parent().is_none() {
        errors.push(FsuValidationError::NotApplicable {
            field: "parent",
            kind: kind.verbose_name(),
        });
    }
    errors.into_result()
}

/* ********************************** */
/*            Child selections        */
/* ********************************** */

/// The children requested for a parent FSU, typed by what they are.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ChildIds {
    Fsus(Vec<FsuId>),
    Interfaces(Vec<InterfaceId>),
    PowerPorts(Vec<PowerPortId>),
}

impl ChildIds {
    pub fn len(&self) -> usize {
        match self {
            ChildIds::Fsus(ids) => ids.len(),
            ChildIds::Interfaces(ids) => ids.len(),
            ChildIds::PowerPorts(ids) => ids.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Whether these IDs can be children in `relationship`.
    pub fn fits(&self, relationship: ChildRelationship) -> bool {
        match self {
            ChildIds::Fsus(_) => relationship.child_fsu_kind().is_some(),
            ChildIds::Interfaces(_) => relationship == ChildRelationship::NicInterfaces,
            ChildIds::PowerPorts(_) => relationship == ChildRelationship::PsuPowerPorts,
        }
    }
}

/// The data needed to create an FSU, either from a request or from a
/// template.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewFsu {
    pub kind: FsuKind,
    pub name: String,
    pub fsu_type_id: FsuTypeId,
    pub placement: Placement,
    pub serial_number: String,
    pub firmware_version: String,
    pub driver_name: String,
    pub driver_version: String,
    pub asset_tag: Option<String>,
    pub status: FsuStatus,
    pub description: String,
    pub comments: String,
    pub fields: KindFields,
    pub parent_id: Option<FsuId>,
    pub children: Option<ChildIds>,
}

impl NewFsu {
    pub fn new(
        kind: FsuKind,
        name: impl Into<String>,
        fsu_type_id: FsuTypeId,
        placement: Placement,
    ) -> Self {
        NewFsu {
            kind,
            name: name.into(),
            fsu_type_id,
            placement,
            serial_number: String::new(),
            firmware_version: String::new(),
            driver_name: String::new(),
            driver_version: String::new(),
            asset_tag: None,
            status: FsuStatus::default(),
            description: String::new(),
            comments: String::new(),
            fields: KindFields::default().normalized_for(kind),
            parent_id: None,
            children: None,
        }
    }

    pub fn validate(&self) -> Result<(), ValidationErrors> {
        let mut errors = match validate_common(self.kind, &self.name, &self.fields, self.parent_id)
        {
            Ok(()) => ValidationErrors::new(),
            Err(errors) => errors,
        };
        if let Some(children) = &self.children {
            validate_children(self.kind, children, &mut errors);
        }
        errors.into_result()
    }
}

fn validate_children(kind: FsuKind, children: &ChildIds, errors: &mut ValidationErrors) {
    match kind.owned_children() {
        Some(relationship) if children.fits(relationship) => {}
        Some(relationship) => errors.push(FsuValidationError::NotApplicable {
            field: relationship.children_field(),
            kind: kind.verbose_name(),
        }),
        None => errors.push(FsuValidationError::NotApplicable {
            field: "children",
            kind: kind.verbose_name(),
        }),
    }
}

/// A partial update. `None` leaves a field untouched; for nullable fields
/// `Some(None)` clears it.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FsuPatch {
    pub name: Option<String>,
    pub fsu_type_id: Option<FsuTypeId>,
    pub device: Option<Option<DeviceId>>,
    pub location: Option<Option<LocationId>>,
    pub serial_number: Option<String>,
    pub firmware_version: Option<String>,
    pub driver_name: Option<String>,
    pub driver_version: Option<String>,
    pub asset_tag: Option<Option<String>>,
    pub status: Option<FsuStatus>,
    pub description: Option<String>,
    pub comments: Option<String>,
    pub pci_slot_id: Option<Option<String>>,
    pub redundant: Option<bool>,
    pub slot_id: Option<Option<String>>,
    pub parent: Option<Option<FsuId>>,
    pub children: Option<ChildIds>,
}

impl FsuPatch {
    /// Copies every plain field of the patch onto `fsu`. Placement, parent
    /// and children need lookups and are handled by the caller.
    pub fn apply_scalars(&self, fsu: &mut Fsu) {
        if let Some(name) = &self.name {
            fsu.name = name.clone();
        }
        if let Some(fsu_type_id) = self.fsu_type_id {
            fsu.fsu_type_id = fsu_type_id;
        }
        if let Some(serial_number) = &self.serial_number {
            fsu.serial_number = serial_number.clone();
        }
        if let Some(firmware_version) = &self.firmware_version {
            fsu.firmware_version = firmware_version.clone();
        }
        if let Some(driver_name) = &self.driver_name {
            fsu.driver_name = driver_name.clone();
        }
        if let Some(driver_version) = &self.driver_version {
            fsu.driver_version = driver_version.clone();
        }
        if let Some(asset_tag) = &self.asset_tag {
            fsu.asset_tag = asset_tag.clone();
        }
        if let Some(status) = self.status {
            fsu.status = status;
        }
        if let Some(description) = &self.description {
            fsu.description = description.clone();
        }
        if let Some(comments) = &self.comments {
            fsu.comments = comments.clone();
        }
        if let Some(pci_slot_id) = &self.pci_slot_id {
            fsu.fields.pci_slot_id = pci_slot_id.clone();
        }
        if let Some(redundant) = self.redundant {
            fsu.fields.redundant = Some(redundant);
        }
        if let Some(slot_id) = &self.slot_id {
            fsu.fields.slot_id = slot_id.clone();
        }
    }

    pub fn validate_children(&self, kind: FsuKind) -> Result<(), ValidationErrors> {
        let mut errors = ValidationErrors::new();
        if let Some(children) = &self.children {
            validate_children(kind, children, &mut errors);
        }
        errors.into_result()
    }
}
