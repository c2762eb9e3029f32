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

//! Parent/child ownership rules for composite hardware.
//!
//! Everything here is pure: callers fetch the current and requested
//! children as concrete [`ChildRecord`]s, ask for a [`ChildAssignmentPlan`],
//! and apply it themselves.

use std::collections::HashSet;
use std::fmt;
use std::hash::Hash;

use fsu_uuid::fsu::FsuId;
use itertools::Itertools;
use serde::{Deserialize, Serialize};

use crate::dcim::DeviceRef;
use crate::fsu_kind::{ChildRelationship, FsuKind};
use crate::validation::FsuValidationError;

/// Name printed for a child that is not installed in any device.
const NO_DEVICE: &str = "None";

/// The owner of a child, as shown in messages.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ParentRef {
    pub id: FsuId,
    pub name: String,
}

impl fmt::Display for ParentRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.name)
    }
}

/// A child (an FSU, interface or power port) as seen by the ownership rules.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChildRecord<I> {
    pub id: I,
    pub name: String,
    pub device: Option<DeviceRef>,
    pub parent: Option<ParentRef>,
}

/// What has to change on the child side once a parent mutation is accepted.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChildAssignmentPlan<I> {
    /// Children whose parent reference must be set to the parent.
    pub attach: Vec<I>,
    /// Children whose parent reference must be cleared.
    pub detach: Vec<I>,
}

impl<I> Default for ChildAssignmentPlan<I> {
    fn default() -> Self {
        Self {
            attach: Vec::new(),
            detach: Vec::new(),
        }
    }
}

impl<I> ChildAssignmentPlan<I> {
    pub fn is_noop(&self) -> bool {
        self.attach.is_empty() && self.detach.is_empty()
    }
}

/// Every child must already sit in the device the parent is (or is about
/// to be) installed in.
pub fn validate_parent_device<I>(
    relationship: ChildRelationship,
    children: &[ChildRecord<I>],
    parent_device: Option<&DeviceRef>,
) -> Result<(), FsuValidationError> {
    let field = relationship.children_field();
    let Some(parent_device) = parent_device else {
        return Err(FsuValidationError::NoParentDevice { field });
    };

    match children
        .iter()
        .find(|child| child.device.as_ref().map(|d| d.id) != Some(parent_device.id))
    {
        Some(child) => Err(FsuValidationError::MismatchedDevice {
            field,
            child_kind: relationship.child_verbose_name(),
            child_name: child.name.clone(),
            child_device: device_name(child.device.as_ref()),
            parent_device: parent_device.name.clone(),
        }),
        None => Ok(()),
    }
}

/// Rejects `requested` children when the parent type limits the
/// relationship to fewer. A missing or zero capacity means unlimited.
pub fn check_capacity(
    relationship: ChildRelationship,
    requested: usize,
    capacity: Option<u32>,
) -> Result<(), FsuValidationError> {
    let (Some(unit), Some(capacity)) = (relationship.capacity_unit(), capacity) else {
        return Ok(());
    };
    if capacity == 0 || requested <= capacity as usize {
        return Ok(());
    }

    Err(FsuValidationError::CapacityExceeded {
        field: relationship.children_field(),
        child_plural: relationship.child_verbose_name_plural(),
        parent_kind: relationship.parent_kind().verbose_name(),
        requested,
        unit,
        capacity,
    })
}

/// Plans the children of a parent FSU that does not exist yet.
pub fn plan_create<I>(
    relationship: ChildRelationship,
    requested: &[ChildRecord<I>],
    parent_device: Option<&DeviceRef>,
    capacity: Option<u32>,
) -> Result<ChildAssignmentPlan<I>, FsuValidationError>
where
    I: Copy + Eq + Hash,
{
    let requested = dedup(requested);
    if requested.is_empty() {
        return Ok(ChildAssignmentPlan::default());
    }

    validate_parent_device(relationship, &requested, parent_device)?;
    check_capacity(relationship, requested.len(), capacity)?;

    // Any existing owner is by definition a different parent.
    if let Some((child, owner)) = requested
        .iter()
        .find_map(|child| child.parent.as_ref().map(|owner| (child, owner)))
    {
        return Err(already_assigned(relationship, child, owner));
    }

    Ok(ChildAssignmentPlan {
        attach: requested.iter().map(|child| child.id).collect(),
        detach: Vec::new(),
    })
}

/// Inputs for [`plan_update`].
#[derive(Debug, Clone)]
pub struct ChildUpdate<'a, I> {
    pub relationship: ChildRelationship,
    pub parent_id: FsuId,
    /// Children currently pointing at the parent.
    pub current: &'a [ChildRecord<I>],
    /// `None` when the request did not mention the child list at all.
    pub requested: Option<&'a [ChildRecord<I>]>,
    /// The device the parent will be in after the update. `None` when it
    /// ends up in storage or unassigned.
    pub parent_device: Option<&'a DeviceRef>,
    /// The request moves the parent into a storage location.
    pub moved_to_storage: bool,
    pub capacity: Option<u32>,
}

/// Reconciles the children of an existing parent against a request.
///
/// Children keep their identity: only the difference between the current
/// and the requested set is touched, and re-submitting the current set
/// produces an empty plan.
pub fn plan_update<I>(update: ChildUpdate<'_, I>) -> Result<ChildAssignmentPlan<I>, FsuValidationError>
where
    I: Copy + Eq + Hash,
{
    let current_ids: Vec<I> = update.current.iter().map(|child| child.id).collect();

    let Some(requested) = update.requested else {
        if update.moved_to_storage {
            return Ok(ChildAssignmentPlan {
                attach: Vec::new(),
                detach: current_ids,
            });
        }
        return Ok(ChildAssignmentPlan::default());
    };

    let requested = dedup(requested);
    if requested.is_empty() {
        return Ok(ChildAssignmentPlan {
            attach: Vec::new(),
            detach: current_ids,
        });
    }

    validate_parent_device(update.relationship, &requested, update.parent_device)?;
    if requested.len() > current_ids.len() {
        check_capacity(update.relationship, requested.len(), update.capacity)?;
    }

    let current: HashSet<I> = current_ids.iter().copied().collect();
    let mut attach = Vec::new();
    for child in &requested {
        if current.contains(&child.id) {
            continue;
        }
        match &child.parent {
            Some(owner) if owner.id != update.parent_id => {
                return Err(already_assigned(update.relationship, child, owner));
            }
            Some(_) => {}
            None => attach.push(child.id),
        }
    }

    let keep: HashSet<I> = requested.iter().map(|child| child.id).collect();
    let detach = current_ids
        .into_iter()
        .filter(|id| !keep.contains(id))
        .collect();

    Ok(ChildAssignmentPlan { attach, detach })
}

/// A parent FSU named from the child side, e.g. the `parent_mainboard` of a
/// CPU, together with what is needed to check it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParentCandidate {
    pub id: FsuId,
    pub name: String,
    pub kind: FsuKind,
    pub device: Option<DeviceRef>,
    pub capacity: Option<u32>,
    /// Children currently assigned, not counting the child being checked.
    pub assigned_children: usize,
}

/// Checks that a child may point at `parent`.
pub fn check_parent_assignment(
    relationship: ChildRelationship,
    child_name: &str,
    child_device: Option<&DeviceRef>,
    parent: &ParentCandidate,
) -> Result<(), FsuValidationError> {
    let field = relationship.parent_field();
    if parent.kind != relationship.parent_kind() {
        return Err(FsuValidationError::WrongParentKind {
            field,
            name: parent.name.clone(),
            actual: parent.kind.verbose_name(),
            expected: relationship.parent_kind().verbose_name(),
        });
    }

    let Some(parent_device) = parent.device.as_ref() else {
        return Err(FsuValidationError::NoParentDevice { field });
    };
    if child_device.map(|d| d.id) != Some(parent_device.id) {
        return Err(FsuValidationError::MismatchedDevice {
            field,
            child_kind: relationship.child_verbose_name(),
            child_name: child_name.to_string(),
            child_device: device_name(child_device),
            parent_device: parent_device.name.clone(),
        });
    }

    if let (Some(noun), Some(capacity)) = (relationship.capacity_noun(), parent.capacity) {
        if capacity > 0 && parent.assigned_children >= capacity as usize {
            return Err(FsuValidationError::NoAvailableCapacity {
                field,
                parent_kind: relationship.parent_kind().verbose_name(),
                noun,
            });
        }
    }

    Ok(())
}

fn dedup<I>(children: &[ChildRecord<I>]) -> Vec<ChildRecord<I>>
where
    I: Copy + Eq + Hash,
{
    children
        .iter()
        .unique_by(|child| child.id)
        .cloned()
        .collect()
}

fn device_name(device: Option<&DeviceRef>) -> String {
    device
        .map(|d| d.name.clone())
        .unwrap_or_else(|| NO_DEVICE.to_string())
}

fn already_assigned<I>(
    relationship: ChildRelationship,
    child: &ChildRecord<I>,
    owner: &ParentRef,
) -> FsuValidationError {
    FsuValidationError::AlreadyAssigned {
        field: relationship.children_field(),
        child_kind: relationship.child_verbose_name(),
        child_name: child.name.clone(),
        current_parent: owner.to_string(),
    }
}
