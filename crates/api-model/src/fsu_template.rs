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

use chrono::prelude::*;
use fsu_uuid::dcim::{DeviceId, DeviceTypeId};
use fsu_uuid::fsu::{FsuTemplateId, FsuTypeId};
use serde::{Deserialize, Serialize};
use sqlx::Row;
use sqlx::postgres::PgRow;

use crate::fsu::{KindFields, NewFsu};
use crate::fsu_kind::FsuKind;
use crate::placement::Placement;
use crate::validation::{FsuValidationError, ValidationErrors};

/// A blueprint for an FSU that every new device of `device_type_id` gets.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FsuTemplate {
    pub id: FsuTemplateId,
    pub kind: FsuKind,
    pub name: String,
    pub fsu_type_id: FsuTypeId,
    pub device_type_id: DeviceTypeId,
    pub description: String,
    pub fields: KindFields,
    pub created: DateTime<Utc>,
    pub updated: DateTime<Utc>,
}

impl FsuTemplate {
    /// The FSU this template produces inside `device_id`.
    pub fn instantiate(&self, device_id: DeviceId) -> NewFsu {
        let mut fsu = NewFsu::new(
            self.kind,
            self.name.clone(),
            self.fsu_type_id,
            Placement::Device(device_id),
        );
        fsu.fields = self.fields.clone().normalized_for(self.kind);
        fsu
    }
}

impl<'r> sqlx::FromRow<'r, PgRow> for FsuTemplate {
    fn from_row(row: &'r PgRow) -> Result<Self, sqlx::Error> {
        Ok(FsuTemplate {
            id: row.try_get("id")?,
            kind: row.try_get("kind")?,
            name: row.try_get("name")?,
            fsu_type_id: row.try_get("fsu_type_id")?,
            device_type_id: row.try_get("device_type_id")?,
            description: row.try_get("description")?,
            fields: KindFields {
                pci_slot_id: row.try_get("pci_slot_id")?,
                redundant: row.try_get("redundant")?,
                slot_id: row.try_get("slot_id")?,
            },
            created: row.try_get("created")?,
            updated: row.try_get("updated")?,
        })
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewFsuTemplate {
    pub kind: FsuKind,
    pub name: String,
    pub fsu_type_id: FsuTypeId,
    pub device_type_id: DeviceTypeId,
    pub description: String,
    pub fields: KindFields,
}

impl NewFsuTemplate {
    pub fn validate(&self) -> Result<(), ValidationErrors> {
        let mut errors = ValidationErrors::new();
        if self.name.trim().is_empty() {
            errors.push(FsuValidationError::Blank { field: "name" });
        }
        self.fields.validate_for(self.kind, &mut errors);
        errors.into_result()
    }
}
