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
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/* ********************************** */
/*               FsuKind              */
/* ********************************** */

/// The hardware category of an FSU. Every FSU, FSU type and FSU template
/// carries exactly one kind, and the kind decides which extra fields and
/// which parent/child relationship apply.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Hash,
    PartialOrd,
    Ord,
    Serialize,
    Deserialize,
    sqlx::Type,
    strum_macros::EnumIter,
)]
#[serde(rename_all = "snake_case")]
#[sqlx(type_name = "fsu_kind", rename_all = "snake_case")]
pub enum FsuKind {
    Cpu,
    Disk,
    Fan,
    Gpu,
    GpuBaseboard,
    Hba,
    Mainboard,
    Nic,
    OtherFsu,
    Psu,
    RamModule,
}

impl FsuKind {
    /// Human readable name used in every user facing message.
    pub fn verbose_name(self) -> &'static str {
        match self {
            FsuKind::Cpu => "CPU",
            FsuKind::Disk => "Disk",
            FsuKind::Fan => "Fan",
            FsuKind::Gpu => "GPU",
            FsuKind::GpuBaseboard => "GPU Baseboard",
            FsuKind::Hba => "HBA",
            FsuKind::Mainboard => "Mainboard",
            FsuKind::Nic => "NIC",
            FsuKind::OtherFsu => "Other FSU",
            FsuKind::Psu => "PSU",
            FsuKind::RamModule => "RAM Module",
        }
    }

    /// URL path segment for this kind, e.g. `gpu-baseboard`.
    pub fn slug(self) -> &'static str {
        match self {
            FsuKind::Cpu => "cpu",
            FsuKind::Disk => "disk",
            FsuKind::Fan => "fan",
            FsuKind::Gpu => "gpu",
            FsuKind::GpuBaseboard => "gpu-baseboard",
            FsuKind::Hba => "hba",
            FsuKind::Mainboard => "mainboard",
            FsuKind::Nic => "nic",
            FsuKind::OtherFsu => "other-fsu",
            FsuKind::Psu => "psu",
            FsuKind::RamModule => "ram-module",
        }
    }

    pub fn has_pci_slot_id(self) -> bool {
        matches!(self, FsuKind::Gpu | FsuKind::Hba | FsuKind::Nic)
    }

    pub fn has_redundant(self) -> bool {
        matches!(self, FsuKind::Psu)
    }

    pub fn has_slot_id(self) -> bool {
        matches!(self, FsuKind::RamModule)
    }

    /// The relationship in which FSUs of this kind own children, if any.
    pub fn owned_children(self) -> Option<ChildRelationship> {
        match self {
            FsuKind::Mainboard => Some(ChildRelationship::MainboardCpus),
            FsuKind::GpuBaseboard => Some(ChildRelationship::GpuBaseboardGpus),
            FsuKind::Hba => Some(ChildRelationship::HbaDisks),
            FsuKind::Nic => Some(ChildRelationship::NicInterfaces),
            FsuKind::Psu => Some(ChildRelationship::PsuPowerPorts),
            _ => None,
        }
    }

    /// The relationship in which FSUs of this kind are owned by a parent FSU.
    pub fn owning_parent(self) -> Option<ChildRelationship> {
        match self {
            FsuKind::Cpu => Some(ChildRelationship::MainboardCpus),
            FsuKind::Gpu => Some(ChildRelationship::GpuBaseboardGpus),
            FsuKind::Disk => Some(ChildRelationship::HbaDisks),
            _ => None,
        }
    }
}

impl fmt::Display for FsuKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.verbose_name())
    }
}

#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
#[error("Unknown FSU kind: {0}")]
pub struct UnknownFsuKind(pub String);

impl FromStr for FsuKind {
    type Err = UnknownFsuKind;

    /// Accepts both the URL slug (`gpu-baseboard`) and the serialized
    /// form (`gpu_baseboard`).
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let normalized = s.trim().to_ascii_lowercase().replace('_', "-");
        <FsuKind as strum::IntoEnumIterator>::iter()
            .find(|kind| kind.slug() == normalized)
            .ok_or_else(|| UnknownFsuKind(s.to_string()))
    }
}

/* ********************************** */
/*          ChildRelationship         */
/* ********************************** */

/// A composite hardware relationship in which one FSU owns a set of
/// children that must live on the same device.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ChildRelationship {
    MainboardCpus,
    GpuBaseboardGpus,
    HbaDisks,
    NicInterfaces,
    PsuPowerPorts,
}

impl ChildRelationship {
    pub fn parent_kind(self) -> FsuKind {
        match self {
            ChildRelationship::MainboardCpus => FsuKind::Mainboard,
            ChildRelationship::GpuBaseboardGpus => FsuKind::GpuBaseboard,
            ChildRelationship::HbaDisks => FsuKind::Hba,
            ChildRelationship::NicInterfaces => FsuKind::Nic,
            ChildRelationship::PsuPowerPorts => FsuKind::Psu,
        }
    }

    /// The FSU kind of the children, or `None` when the children are
    /// records of the host platform (interfaces, power ports).
    pub fn child_fsu_kind(self) -> Option<FsuKind> {
        match self {
            ChildRelationship::MainboardCpus => Some(FsuKind::Cpu),
            ChildRelationship::GpuBaseboardGpus => Some(FsuKind::Gpu),
            ChildRelationship::HbaDisks => Some(FsuKind::Disk),
            ChildRelationship::NicInterfaces | ChildRelationship::PsuPowerPorts => None,
        }
    }

    pub fn child_verbose_name(self) -> &'static str {
        match self.child_fsu_kind() {
            Some(kind) => kind.verbose_name(),
            None if self == ChildRelationship::NicInterfaces => "Interface",
            None => "Power Port",
        }
    }

    pub fn child_verbose_name_plural(self) -> String {
        format!("{}s", self.child_verbose_name())
    }

    /// Request field carrying the child list on the parent.
    pub fn children_field(self) -> &'static str {
        match self {
            ChildRelationship::MainboardCpus => "cpus",
            ChildRelationship::GpuBaseboardGpus => "gpus",
            ChildRelationship::HbaDisks => "disks",
            ChildRelationship::NicInterfaces => "interfaces",
            ChildRelationship::PsuPowerPorts => "power_ports",
        }
    }

    /// Field on the child pointing back at its parent.
    pub fn parent_field(self) -> &'static str {
        match self {
            ChildRelationship::MainboardCpus => "parent_mainboard",
            ChildRelationship::GpuBaseboardGpus => "parent_gpubaseboard",
            ChildRelationship::HbaDisks => "parent_hba",
            ChildRelationship::NicInterfaces => "parent_nic",
            ChildRelationship::PsuPowerPorts => "parent_psu",
        }
    }

    /// Unit counted by the parent type's capacity field. `None` for
    /// relationships without a capacity.
    pub fn capacity_unit(self) -> Option<&'static str> {
        match self {
            ChildRelationship::MainboardCpus => Some("sockets"),
            ChildRelationship::GpuBaseboardGpus => Some("slots"),
            ChildRelationship::NicInterfaces => Some("connections"),
            ChildRelationship::HbaDisks | ChildRelationship::PsuPowerPorts => None,
        }
    }

    /// Noun used when a parent is full, e.g. "CPU sockets".
    pub fn capacity_noun(self) -> Option<&'static str> {
        match self {
            ChildRelationship::MainboardCpus => Some("CPU sockets"),
            ChildRelationship::GpuBaseboardGpus => Some("GPU slots"),
            ChildRelationship::NicInterfaces => Some("interface connections"),
            ChildRelationship::HbaDisks | ChildRelationship::PsuPowerPorts => None,
        }
    }

    pub fn is_capacitated(self) -> bool {
        self.capacity_unit().is_some()
    }
}

impl fmt::Display for ChildRelationship {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} -> {}",
            self.parent_kind().verbose_name(),
            self.child_verbose_name_plural()
        )
    }
}

#[cfg(test)]
mod tests {
    use strum::IntoEnumIterator;

    use super::*;

    #[test]
    fn slugs_round_trip_through_from_str() {
        for kind in FsuKind::iter() {
            assert_eq!(kind.slug().parse::<FsuKind>().unwrap(), kind);
        }
        assert_eq!("gpu_baseboard".parse::<FsuKind>().unwrap(), FsuKind::GpuBaseboard);
        assert_eq!("RAM-MODULE".parse::<FsuKind>().unwrap(), FsuKind::RamModule);
        assert!("toaster".parse::<FsuKind>().is_err());
    }

    #[test]
    fn owning_and_owned_relationships_agree() {
        for kind in FsuKind::iter() {
            if let Some(rel) = kind.owned_children() {
                assert_eq!(rel.parent_kind(), kind);
            }
            if let Some(rel) = kind.owning_parent() {
                assert_eq!(rel.child_fsu_kind(), Some(kind));
            }
        }
        assert_eq!(FsuKind::Fan.owned_children(), None);
        assert_eq!(FsuKind::Fan.owning_parent(), None);
    }

    #[test]
    fn only_pci_kinds_have_a_pci_slot() {
        let pci: Vec<_> = FsuKind::iter().filter(|k| k.has_pci_slot_id()).collect();
        assert_eq!(pci, vec![FsuKind::Gpu, FsuKind::Hba, FsuKind::Nic]);
    }

    #[test]
    fn relationship_labels() {
        let rel = ChildRelationship::PsuPowerPorts;
        assert_eq!(rel.child_verbose_name_plural(), "Power Ports");
        assert_eq!(rel.capacity_unit(), None);
        assert!(!rel.is_capacitated());
        assert_eq!(ChildRelationship::NicInterfaces.children_field(), "interfaces");
        assert_eq!(ChildRelationship::MainboardCpus.to_string(), "Mainboard -> CPUs");
    }
}
