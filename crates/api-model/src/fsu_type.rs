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
use fsu_uuid::dcim::ManufacturerId;
use fsu_uuid::fsu::FsuTypeId;
use serde::{Deserialize, Serialize};
use sqlx::Row;
use sqlx::postgres::PgRow;

use crate::fsu_kind::{ChildRelationship, FsuKind};
use crate::validation::{FsuValidationError, ValidationErrors};

/* ********************************** */
/*     Kind specific type attributes  */
/* ********************************** */

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum CpuArchitecture {
    X86,
    Arm,
    RiscV,
    Power,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum DiskType {
    Ssd,
    Hdd,
    Nvme,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum PsuFeedType {
    Ac,
    Dc,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum RamModuleType {
    Udimm,
    Rdimm,
    Lrdimm,
    Sodimm,
    Other,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum MemoryTechnology {
    Ddr3,
    Ddr4,
    Ddr5,
    Other,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct CpuTypeAttributes {
    pub architecture: Option<CpuArchitecture>,
    /// GHz
    pub cpu_speed: Option<f64>,
    pub cores: Option<u32>,
    pub pcie_generation: Option<u8>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct DiskTypeAttributes {
    pub disk_type: Option<DiskType>,
    /// GB
    pub size: Option<u32>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct GpuBaseboardTypeAttributes {
    pub slot_count: Option<u32>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct MainboardTypeAttributes {
    pub cpu_socket_count: Option<u32>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct NicTypeAttributes {
    pub interface_count: Option<u32>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct PsuTypeAttributes {
    pub feed_type: Option<PsuFeedType>,
    /// Watts
    pub power_provided: Option<u32>,
    pub required_voltage: Option<String>,
    pub hot_swappable: bool,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct RamModuleTypeAttributes {
    pub module_type: Option<RamModuleType>,
    pub technology: Option<MemoryTechnology>,
    /// MHz
    pub speed: Option<u32>,
    /// GB
    pub capacity: Option<u32>,
    pub quantity: Option<u32>,
}

/// The part attributes that only make sense for one kind of hardware.
/// Stored as JSON next to the common catalog columns.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum FsuTypeAttributes {
    Cpu(CpuTypeAttributes),
    Disk(DiskTypeAttributes),
    Fan,
    Gpu,
    GpuBaseboard(GpuBaseboardTypeAttributes),
    Hba,
    Mainboard(MainboardTypeAttributes),
    Nic(NicTypeAttributes),
    OtherFsu,
    Psu(PsuTypeAttributes),
    RamModule(RamModuleTypeAttributes),
}

impl FsuTypeAttributes {
    /// Builds the attributes for `kind` from an untagged JSON object as sent
    /// by clients. `null` means "all defaults".
    pub fn for_kind(kind: FsuKind, value: serde_json::Value) -> Result<Self, serde_json::Error> {
        let mut object = match value {
            serde_json::Value::Null => serde_json::Map::new(),
            serde_json::Value::Object(object) => object,
            other => {
                return Err(serde::de::Error::custom(format!(
                    "expected an object of {} attributes, got {other}",
                    kind.verbose_name()
                )));
            }
        };
        object.insert("kind".to_string(), serde_json::to_value(kind)?);
        serde_json::from_value(serde_json::Value::Object(object))
    }

    pub fn kind(&self) -> FsuKind {
        match self {
            FsuTypeAttributes::Cpu(_) => FsuKind::Cpu,
            FsuTypeAttributes::Disk(_) => FsuKind::Disk,
            FsuTypeAttributes::Fan => FsuKind::Fan,
            FsuTypeAttributes::Gpu => FsuKind::Gpu,
            FsuTypeAttributes::GpuBaseboard(_) => FsuKind::GpuBaseboard,
            FsuTypeAttributes::Hba => FsuKind::Hba,
            FsuTypeAttributes::Mainboard(_) => FsuKind::Mainboard,
            FsuTypeAttributes::Nic(_) => FsuKind::Nic,
            FsuTypeAttributes::OtherFsu => FsuKind::OtherFsu,
            FsuTypeAttributes::Psu(_) => FsuKind::Psu,
            FsuTypeAttributes::RamModule(_) => FsuKind::RamModule,
        }
    }

    /// How many children an instance of this type can own. `None` means
    /// unlimited, either because the relationship has no capacity or
    /// because the type leaves it unset.
    pub fn capacity(&self) -> Option<u32> {
        match self {
            FsuTypeAttributes::Mainboard(a) => a.cpu_socket_count,
            FsuTypeAttributes::GpuBaseboard(a) => a.slot_count,
            FsuTypeAttributes::Nic(a) => a.interface_count,
            _ => None,
        }
    }

    pub fn validate(&self, errors: &mut ValidationErrors) {
        match self {
            FsuTypeAttributes::Cpu(cpu) => {
                if cpu.cpu_speed.is_some_and(|speed| speed.is_nan() || speed <= 0.0) {
                    errors.add("cpu_speed", "Ensure this value is greater than 0.");
                }
                if cpu.pcie_generation.is_some_and(|g| !(1..=6).contains(&g)) {
                    errors.add("pcie_generation", "Ensure this value is between 1 and 6.");
                }
            }
            FsuTypeAttributes::Psu(psu) => {
                if psu
                    .required_voltage
                    .as_deref()
                    .is_some_and(|v| v.trim().is_empty())
                {
                    errors.push(FsuValidationError::Blank {
                        field: "required_voltage",
                    });
                }
            }
            _ => {}
        }
    }
}

/* ********************************** */
/*               FsuType              */
/* ********************************** */

/// A catalog entry for a purchasable part. `(manufacturer, part_number)` is
/// unique within a kind.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FsuType {
    pub id: FsuTypeId,
    pub manufacturer_id: ManufacturerId,
    pub model: String,
    pub part_number: String,
    pub description: String,
    pub comments: String,
    pub attributes: FsuTypeAttributes,
    pub created: DateTime<Utc>,
    pub updated: DateTime<Utc>,
}

impl FsuType {
    pub fn kind(&self) -> FsuKind {
        self.attributes.kind()
    }

    /// Capacity of instances of this type in `relationship`. `None` when the
    /// type does not own children in that relationship or sets no limit.
    pub fn capacity_for(&self, relationship: ChildRelationship) -> Option<u32> {
        if relationship.parent_kind() != self.kind() || !relationship.is_capacitated() {
            return None;
        }
        self.attributes.capacity()
    }

    /// Fails unless this type can be used for an FSU of `expected` kind.
    pub fn ensure_kind(
        &self,
        expected: FsuKind,
        field: &'static str,
    ) -> Result<(), FsuValidationError> {
        if self.kind() == expected {
            return Ok(());
        }
        Err(FsuValidationError::WrongFsuTypeKind {
            field,
            name: self.model.clone(),
            actual: self.kind().verbose_name(),
            expected: expected.verbose_name(),
        })
    }
}

impl<'r> sqlx::FromRow<'r, PgRow> for FsuType {
    fn from_row(row: &'r PgRow) -> Result<Self, sqlx::Error> {
        let attributes: sqlx::types::Json<FsuTypeAttributes> = row.try_get("attributes")?;
        let kind: FsuKind = row.try_get("kind")?;
        if attributes.0.kind() != kind {
            return Err(sqlx::Error::ColumnDecode {
                index: "attributes".to_string(),
                source: format!(
                    "attributes are for {} but the row is a {}",
                    attributes.0.kind(),
                    kind
                )
                .into(),
            });
        }

        Ok(FsuType {
            id: row.try_get("id")?,
            manufacturer_id: row.try_get("manufacturer_id")?,
            model: row.try_get("model")?,
            part_number: row.try_get("part_number")?,
            description: row.try_get("description")?,
            comments: row.try_get("comments")?,
            attributes: attributes.0,
            created: row.try_get("created")?,
            updated: row.try_get("updated")?,
        })
    }
}

/// The data needed to create an FSU type.
#[derive(Debug, Clone, PartialEq)]
pub struct NewFsuType {
    pub manufacturer_id: ManufacturerId,
    pub model: String,
    pub part_number: String,
    pub description: String,
    pub comments: String,
    pub attributes: FsuTypeAttributes,
}

impl NewFsuType {
    pub fn kind(&self) -> FsuKind {
        self.attributes.kind()
    }

    pub fn validate(&self) -> Result<(), ValidationErrors> {
        let mut errors = ValidationErrors::new();
        if self.model.trim().is_empty() {
            errors.push(FsuValidationError::Blank { field: "model" });
        }
        if self.part_number.trim().is_empty() {
            errors.push(FsuValidationError::Blank {
                field: "part_number",
            });
        }
        self.attributes.validate(&mut errors);
        errors.into_result()
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    fn new_type(attributes: FsuTypeAttributes) -> NewFsuType {
        NewFsuType {
            manufacturer_id: ManufacturerId::new(),
            model: "X1".to_string(),
            part_number: "PN-1".to_string(),
            description: String::new(),
            comments: String::new(),
            attributes,
        }
    }

    #[test]
    fn attributes_for_kind_injects_the_tag() {
        let attrs =
            FsuTypeAttributes::for_kind(FsuKind::Mainboard, json!({"cpu_socket_count": 2}))
                .unwrap();
        assert_eq!(
            attrs,
            FsuTypeAttributes::Mainboard(MainboardTypeAttributes {
                cpu_socket_count: Some(2)
            })
        );
        assert_eq!(attrs.capacity(), Some(2));

        let fan = FsuTypeAttributes::for_kind(FsuKind::Fan, serde_json::Value::Null).unwrap();
        assert_eq!(fan, FsuTypeAttributes::Fan);
        assert_eq!(fan.capacity(), None);
    }

    #[test]
    fn attributes_reject_fields_of_other_kinds() {
        assert!(
            FsuTypeAttributes::for_kind(FsuKind::Disk, json!({"cpu_socket_count": 2})).is_err()
        );
        assert!(FsuTypeAttributes::for_kind(FsuKind::Disk, json!([1, 2])).is_err());
    }

    #[test]
    fn psu_and_ram_attributes_parse() {
        let psu = FsuTypeAttributes::for_kind(
            FsuKind::Psu,
            json!({"feed_type": "AC", "power_provided": 1600, "hot_swappable": true}),
        )
        .unwrap();
        let FsuTypeAttributes::Psu(psu) = psu else {
            panic!("expected PSU attributes");
        };
        assert_eq!(psu.feed_type, Some(PsuFeedType::Ac));
        assert!(psu.hot_swappable);

        let ram = FsuTypeAttributes::for_kind(
            FsuKind::RamModule,
            json!({"module_type": "RDIMM", "technology": "DDR5", "capacity": 64, "quantity": 1}),
        )
        .unwrap();
        assert_eq!(ram.kind(), FsuKind::RamModule);
    }

    #[test]
    fn validate_reports_blank_and_out_of_range_fields() {
        let mut bad = new_type(FsuTypeAttributes::Cpu(CpuTypeAttributes {
            cpu_speed: Some(0.0),
            pcie_generation: Some(9),
            ..Default::default()
        }));
        bad.part_number = "  ".to_string();
        let errors = bad.validate().unwrap_err();
        assert_eq!(
            errors.fields().collect::<Vec<_>>(),
            vec!["cpu_speed", "part_number", "pcie_generation"]
        );

        assert!(new_type(FsuTypeAttributes::Gpu).validate().is_ok());
    }

    #[test]
    fn capacity_only_applies_to_the_owning_relationship() {
        let now = Utc::now();
        let fsu_type = FsuType {
            id: FsuTypeId::new(),
            manufacturer_id: ManufacturerId::new(),
            model: "Board".to_string(),
            part_number: "MB-1".to_string(),
            description: String::new(),
            comments: String::new(),
            attributes: FsuTypeAttributes::Mainboard(MainboardTypeAttributes {
                cpu_socket_count: Some(2),
            }),
            created: now,
            updated: now,
        };
        assert_eq!(fsu_type.capacity_for(ChildRelationship::MainboardCpus), Some(2));
        assert_eq!(fsu_type.capacity_for(ChildRelationship::GpuBaseboardGpus), None);
        assert!(fsu_type.ensure_kind(FsuKind::Mainboard, "fsu_type").is_ok());
        let err = fsu_type.ensure_kind(FsuKind::Cpu, "fsu_type").unwrap_err();
        assert_eq!(err.to_string(), "Board is a Mainboard type, expected a CPU type");
    }
}
