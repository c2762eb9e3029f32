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

//! Creating and updating FSUs together with their parent and child links.
//!
//! Every check runs before the first write, and all writes for one request
//! happen on the caller's transaction: either the FSU and all of its child
//! links change, or nothing does.

use fsu_uuid::dcim::{InterfaceMarker, PowerPortMarker};
use fsu_uuid::fsu::{FsuId, FsuMarker};
use fsu_uuid::typed_uuids::{TypedUuid, UuidSubtype};
use model::assignment::{self, ChildAssignmentPlan, ChildUpdate, ParentCandidate};
use model::dcim::DeviceRef;
use model::fsu::{ChildIds, Fsu, FsuPatch, NewFsu};
use model::fsu_kind::{ChildRelationship, FsuKind};
use model::placement::Placement;
use model::validation::FsuValidationError;
use sqlx::PgConnection;

use crate::{DatabaseResult, dcim, fsu, fsu_child, fsu_type};

/// Creates an FSU, assigns it to its parent (for CPUs, GPUs and Disks) and
/// takes ownership of the requested children (for parent kinds).
#[tracing::instrument(skip(txn, new_fsu), fields(kind = %new_fsu.kind, name = %new_fsu.name))]
pub async fn create_fsu(txn: &mut PgConnection, id: FsuId, new_fsu: &NewFsu) -> DatabaseResult<Fsu> {
    new_fsu.validate()?;
    let fsu_type = fsu_type::load_for_kind(txn, new_fsu.fsu_type_id, new_fsu.kind).await?;
    let device = resolve_placement(txn, new_fsu.placement).await?;

    if let (Some(relationship), Some(parent_id)) = (new_fsu.kind.owning_parent(), new_fsu.parent_id)
    {
        let parent = parent_candidate(txn, relationship, parent_id, None).await?;
        assignment::check_parent_assignment(
            relationship,
            &new_fsu.name,
            device.as_ref(),
            &parent,
        )?;
    }

    let children = match new_fsu.kind.owned_children() {
        Some(relationship) => {
            let context = PlanContext {
                parent_device: device.as_ref(),
                capacity: fsu_type.capacity_for(relationship),
                stage: Stage::Create,
            };
            let plan =
                plan_children(txn, relationship, new_fsu.children.as_ref(), context).await?;
            Some((relationship, plan))
        }
        None => None,
    };

    let created = fsu::insert(txn, id, new_fsu).await?;
    if let Some((relationship, plan)) = children {
        plan.apply(txn, relationship, created.id).await?;
    }

    tracing::info!(fsu_id = %created.id, "created FSU");
    Ok(created)
}

/// Applies a partial update to an FSU of `kind`, reconciling its children.
#[tracing::instrument(skip(txn, patch), fields(kind = %kind, fsu_id = %id))]
pub async fn update_fsu(
    txn: &mut PgConnection,
    kind: FsuKind,
    id: FsuId,
    patch: &FsuPatch,
) -> DatabaseResult<Fsu> {
    let current = fsu::load_for_update(txn, kind, id).await?;
    patch.validate_children(kind)?;
    let change = current.placement.update(patch.device, patch.location)?;

    let mut updated = current.clone();
    patch.apply_scalars(&mut updated);
    updated.placement = change.after;
    match patch.parent {
        Some(parent_id) => updated.parent_id = parent_id,
        // A parent on another device is never kept implicitly.
        None if change.left_device() => updated.parent_id = None,
        None => {}
    }
    updated.validate()?;

    let fsu_type = fsu_type::load_for_kind(txn, updated.fsu_type_id, kind).await?;
    let device = resolve_placement(txn, updated.placement).await?;

    if let (Some(relationship), Some(Some(parent_id))) = (kind.owning_parent(), patch.parent) {
        let parent = parent_candidate(txn, relationship, parent_id, Some(id)).await?;
        assignment::check_parent_assignment(
            relationship,
            &updated.name,
            device.as_ref(),
            &parent,
        )?;
    }

    let children = match kind.owned_children() {
        Some(relationship) => {
            let context = PlanContext {
                parent_device: device.as_ref(),
                capacity: fsu_type.capacity_for(relationship),
                stage: Stage::Update {
                    parent_id: id,
                    moved_to_storage: change.moved_to_storage(),
                },
            };
            let plan = plan_children(txn, relationship, patch.children.as_ref(), context).await?;
            Some((relationship, plan))
        }
        None => None,
    };

    let saved = fsu::update(txn, &updated).await?;
    if let Some((relationship, plan)) = children {
        plan.apply(txn, relationship, id).await?;
    }
    Ok(saved)
}

/// Checks that the placement's device or location exists and returns the
/// device, if any.
async fn resolve_placement(
    txn: &mut PgConnection,
    placement: Placement,
) -> DatabaseResult<Option<DeviceRef>> {
    match placement {
        Placement::Device(device_id) => {
            let device = dcim::find_device(txn, device_id).await?.ok_or_else(|| {
                FsuValidationError::UnknownReference {
                    field: "device",
                    id: device_id.to_string(),
                }
            })?;
            Ok(Some(device.to_ref()))
        }
        Placement::Location(location_id) => {
            if dcim::find_location(txn, location_id).await?.is_none() {
                return Err(FsuValidationError::UnknownReference {
                    field: "location",
                    id: location_id.to_string(),
                }
                .into());
            }
            Ok(None)
        }
        Placement::Unassigned => Ok(None),
    }
}

async fn parent_candidate(
    txn: &mut PgConnection,
    relationship: ChildRelationship,
    parent_id: FsuId,
    child_id: Option<FsuId>,
) -> DatabaseResult<ParentCandidate> {
    let parent = fsu::find_for_update(txn, parent_id).await?.ok_or_else(|| {
        FsuValidationError::UnknownReference {
            field: relationship.parent_field(),
            id: parent_id.to_string(),
        }
    })?;

    let device = match parent.device_id() {
        Some(device_id) => dcim::find_device(txn, device_id)
            .await?
            .map(|device| device.to_ref()),
        None => None,
    };
    let capacity = fsu_type::find(txn, parent.fsu_type_id)
        .await?
        .and_then(|parent_type| parent_type.capacity_for(relationship));
    let assigned_children = fsu::count_children(txn, parent_id, child_id).await?;

    Ok(ParentCandidate {
        id: parent.id,
        name: parent.name,
        kind: parent.kind,
        device,
        capacity,
        assigned_children,
    })
}

#[derive(Debug, Clone, Copy)]
enum Stage {
    Create,
    Update {
        parent_id: FsuId,
        moved_to_storage: bool,
    },
}

#[derive(Debug, Clone, Copy)]
struct PlanContext<'a> {
    parent_device: Option<&'a DeviceRef>,
    capacity: Option<u32>,
    stage: Stage,
}

/// A [`ChildAssignmentPlan`] for whichever kind of child a relationship has.
#[derive(Debug)]
enum ChildPlan {
    Fsus(ChildAssignmentPlan<FsuId>),
    Interfaces(ChildAssignmentPlan<TypedUuid<InterfaceMarker>>),
    PowerPorts(ChildAssignmentPlan<TypedUuid<PowerPortMarker>>),
}

impl ChildPlan {
    async fn apply(
        self,
        txn: &mut PgConnection,
        relationship: ChildRelationship,
        parent_id: FsuId,
    ) -> DatabaseResult<()> {
        match self {
            ChildPlan::Fsus(plan) => apply_plan(txn, relationship, parent_id, plan).await,
            ChildPlan::Interfaces(plan) => apply_plan(txn, relationship, parent_id, plan).await,
            ChildPlan::PowerPorts(plan) => apply_plan(txn, relationship, parent_id, plan).await,
        }
    }
}

async fn plan_children(
    txn: &mut PgConnection,
    relationship: ChildRelationship,
    children: Option<&ChildIds>,
    context: PlanContext<'_>,
) -> DatabaseResult<ChildPlan> {
    let plan = match (relationship, children) {
        (ChildRelationship::NicInterfaces, None) => ChildPlan::Interfaces(
            plan_for::<InterfaceMarker>(txn, relationship, None, context).await?,
        ),
        (ChildRelationship::NicInterfaces, Some(ChildIds::Interfaces(ids))) => {
            ChildPlan::Interfaces(plan_for(txn, relationship, Some(ids.as_slice()), context).await?)
        }
        (ChildRelationship::PsuPowerPorts, None) => ChildPlan::PowerPorts(
            plan_for::<PowerPortMarker>(txn, relationship, None, context).await?,
        ),
        (ChildRelationship::PsuPowerPorts, Some(ChildIds::PowerPorts(ids))) => {
            ChildPlan::PowerPorts(plan_for(txn, relationship, Some(ids.as_slice()), context).await?)
        }
        (_, None) if relationship.child_fsu_kind().is_some() => {
            ChildPlan::Fsus(plan_for::<FsuMarker>(txn, relationship, None, context).await?)
        }
        (_, Some(ChildIds::Fsus(ids))) if relationship.child_fsu_kind().is_some() => {
            ChildPlan::Fsus(plan_for(txn, relationship, Some(ids.as_slice()), context).await?)
        }
        _ => {
            return Err(FsuValidationError::NotApplicable {
                field: relationship.children_field(),
                kind: relationship.parent_kind().verbose_name(),
            }
            .into());
        }
    };
    Ok(plan)
}

async fn plan_for<T: UuidSubtype>(
    txn: &mut PgConnection,
    relationship: ChildRelationship,
    requested: Option<&[TypedUuid<T>]>,
    context: PlanContext<'_>,
) -> DatabaseResult<ChildAssignmentPlan<TypedUuid<T>>> {
    match context.stage {
        Stage::Create => {
            let Some(ids) = requested else {
                return Ok(ChildAssignmentPlan::default());
            };
            let records = fsu_child::find_by_ids(txn, relationship, ids).await?;
            Ok(assignment::plan_create(
                relationship,
                &records,
                context.parent_device,
                context.capacity,
            )?)
        }
        Stage::Update {
            parent_id,
            moved_to_storage,
        } => {
            let current = fsu_child::find_assigned::<T>(txn, relationship, parent_id).await?;
            let requested = match requested {
                Some(ids) => Some(fsu_child::find_by_ids(txn, relationship, ids).await?),
                None => None,
            };
            Ok(assignment::plan_update(ChildUpdate {
                relationship,
                parent_id,
                current: &current,
                requested: requested.as_deref(),
                parent_device: context.parent_device,
                moved_to_storage,
                capacity: context.capacity,
            })?)
        }
    }
}

async fn apply_plan<T: UuidSubtype>(
    txn: &mut PgConnection,
    relationship: ChildRelationship,
    parent_id: FsuId,
    plan: ChildAssignmentPlan<TypedUuid<T>>,
) -> DatabaseResult<()> {
    if plan.is_noop() {
        return Ok(());
    }
    tracing::debug!(
        %relationship,
        %parent_id,
        attached = plan.attach.len(),
        detached = plan.detach.len(),
        "reconciling children"
    );
    fsu_child::set_parent(txn, relationship, &plan.attach, Some(parent_id)).await?;
    fsu_child::set_parent(txn, relationship, &plan.detach, None).await
}

#[cfg(test)]
mod tests {
    use fsu_uuid::dcim::{InterfaceId, PowerPortId};
    use model::validation::ValidationErrors;

    use super::*;
    use crate::DatabaseError;
    use crate::tests::{
        cpu_type, disk_type, gpu_baseboard_type, gpu_type, hba_type, mainboard_type, nic_type,
        psu_type, server_a, server_a_interfaces, server_a_power_ports, server_b,
        server_b_interface, spares_cage,
    };

    fn validation(err: DatabaseError) -> ValidationErrors {
        match err {
            DatabaseError::Validation(errors) => errors,
            other => panic!("expected a validation error, got {other:?}"),
        }
    }

    async fn create(
        txn: &mut PgConnection,
        kind: FsuKind,
        name: &str,
        fsu_type_id: fsu_uuid::fsu::FsuTypeId,
        placement: Placement,
    ) -> Fsu {
        create_fsu(txn, FsuId::new(), &NewFsu::new(kind, name, fsu_type_id, placement))
            .await
            .unwrap()
    }

    async fn parent_of(txn: &mut PgConnection, id: FsuId) -> Option<FsuId> {
        fsu::find(txn, id).await.unwrap().unwrap().parent_id
    }

    async fn interface_parents(txn: &mut PgConnection) -> Vec<Option<FsuId>> {
        dcim::find_interfaces_by_device(txn, server_a())
            .await
            .unwrap()
            .into_iter()
            .map(|i| i.parent_nic_id)
            .collect()
    }

    #[crate::sqlx_test(fixtures("dcim", "fsu_types"))]
    async fn device_and_location_are_exclusive(pool: sqlx::PgPool) {
        let mut txn = pool.begin().await.unwrap();

        let fan = create(
            &mut txn,
            FsuKind::Fan,
            "fan0",
            crate::tests::fan_type(),
            Placement::Device(server_a()),
        )
        .await;

        let err = update_fsu(
            &mut txn,
            FsuKind::Fan,
            fan.id,
            &FsuPatch {
                device: Some(Some(server_b())),
                location: Some(Some(spares_cage())),
                ..Default::default()
            },
        )
        .await
        .unwrap_err();
        assert_eq!(
            validation(err).get("non_field_errors").unwrap(),
            ["FSUs must be assigned to either a Device or a Storage location, but not both."]
        );

        // Setting only the location clears the device.
        let stored = update_fsu(
            &mut txn,
            FsuKind::Fan,
            fan.id,
            &FsuPatch {
                location: Some(Some(spares_cage())),
                ..Default::default()
            },
        )
        .await
        .unwrap();
        assert_eq!(stored.device_id(), None);
        assert_eq!(stored.location_id(), Some(spares_cage()));
    }

    #[crate::sqlx_test(fixtures("dcim", "fsu_types"))]
    async fn mainboard_with_two_sockets(pool: sqlx::PgPool) {
        let mut txn = pool.begin().await.unwrap();
        let device = Placement::Device(server_a());

        let mainboard = create(&mut txn, FsuKind::Mainboard, "mb0", mainboard_type(), device).await;
        let cpu0 = create(&mut txn, FsuKind::Cpu, "cpu0", cpu_type(), device).await;
        let cpu1 = create(&mut txn, FsuKind::Cpu, "cpu1", cpu_type(), device).await;

        update_fsu(
            &mut txn,
            FsuKind::Mainboard,
            mainboard.id,
            &FsuPatch {
                children: Some(ChildIds::Fsus(vec![cpu0.id, cpu1.id])),
                ..Default::default()
            },
        )
        .await
        .unwrap();
        assert_eq!(parent_of(&mut txn, cpu0.id).await, Some(mainboard.id));
        assert_eq!(parent_of(&mut txn, cpu1.id).await, Some(mainboard.id));

        let mut cpu2 = NewFsu::new(FsuKind::Cpu, "cpu2", cpu_type(), device);
        cpu2.parent_id = Some(mainboard.id);
        let err = create_fsu(&mut txn, FsuId::new(), &cpu2).await.unwrap_err();
        assert_eq!(
            validation(err).get("parent_mainboard").unwrap(),
            ["Mainboard has no available CPU sockets."]
        );

        // A third CPU through the parent hits the capacity check instead.
        let cpu2 = create(&mut txn, FsuKind::Cpu, "cpu2", cpu_type(), device).await;
        let err = update_fsu(
            &mut txn,
            FsuKind::Mainboard,
            mainboard.id,
            &FsuPatch {
                children: Some(ChildIds::Fsus(vec![cpu0.id, cpu1.id, cpu2.id])),
                ..Default::default()
            },
        )
        .await
        .unwrap_err();
        assert_eq!(
            validation(err).get("cpus").unwrap(),
            ["Number of CPUs being added to Mainboard (3) is greater than the number of available sockets (2)"]
        );
    }

    #[crate::sqlx_test(fixtures("dcim", "fsu_types"))]
    async fn concurrent_cpus_cannot_overfill_a_mainboard(pool: sqlx::PgPool) {
        let device = Placement::Device(server_a());
        let mut setup = pool.begin().await.unwrap();
        let mainboard = create(&mut setup, FsuKind::Mainboard, "mb0", mainboard_type(), device).await;
        setup.commit().await.unwrap();

        let cpu_on_mainboard = |name: &str| {
            let mut cpu = NewFsu::new(FsuKind::Cpu, name, cpu_type(), device);
            cpu.parent_id = Some(mainboard.id);
            cpu
        };

        let mut first = pool.begin().await.unwrap();
        create_fsu(&mut first, FsuId::new(), &cpu_on_mainboard("cpu0"))
            .await
            .unwrap();
        create_fsu(&mut first, FsuId::new(), &cpu_on_mainboard("cpu1"))
            .await
            .unwrap();

        let second = tokio::spawn({
            let pool = pool.clone();
            let cpu = cpu_on_mainboard("cpu2");
            async move {
                let mut txn = pool.begin().await.unwrap();
                create_fsu(&mut txn, FsuId::new(), &cpu).await
            }
        });

        // The second transaction waits on the mainboard row until the first
        // one commits, then sees both of its CPUs.
        tokio::time::sleep(std::time::Duration::from_millis(200)).await;
        assert!(!second.is_finished());
        first.commit().await.unwrap();

        let err = second.await.unwrap().unwrap_err();
        assert_eq!(
            validation(err).get("parent_mainboard").unwrap(),
            ["Mainboard has no available CPU sockets."]
        );
    }

    #[crate::sqlx_test(fixtures("dcim", "fsu_types"))]
    async fn children_must_share_the_parent_device(pool: sqlx::PgPool) {
        let mut txn = pool.begin().await.unwrap();

        let disk = create(&mut txn, FsuKind::Disk, "disk0", disk_type(), Placement::Device(server_b()))
            .await;
        let mut hba = NewFsu::new(FsuKind::Hba, "hba0", hba_type(), Placement::Device(server_a()));
        hba.children = Some(ChildIds::Fsus(vec![disk.id]));

        let err = create_fsu(&mut txn, FsuId::new(), &hba).await.unwrap_err();
        assert_eq!(
            validation(err).get("disks").unwrap(),
            ["Disk disk0 has a different parent device (server-b) than that of its parent FSU (server-a)"]
        );
        assert_eq!(parent_of(&mut txn, disk.id).await, None);

        // A child naming a parent on another device fails the same way.
        let hba = create(&mut txn, FsuKind::Hba, "hba0", hba_type(), Placement::Device(server_a())).await;
        let err = update_fsu(
            &mut txn,
            FsuKind::Disk,
            disk.id,
            &FsuPatch {
                parent: Some(Some(hba.id)),
                ..Default::default()
            },
        )
        .await
        .unwrap_err();
        assert!(
            validation(err).get("parent_hba").unwrap()[0].contains("has a different parent device")
        );
    }

    #[crate::sqlx_test(fixtures("dcim", "fsu_types"))]
    async fn children_need_a_parent_in_a_device(pool: sqlx::PgPool) {
        let mut txn = pool.begin().await.unwrap();

        let [eth0, ..] = server_a_interfaces();
        let mut nic = NewFsu::new(FsuKind::Nic, "nic0", nic_type(), Placement::Location(spares_cage()));
        nic.children = Some(ChildIds::Interfaces(vec![eth0]));
        let err = create_fsu(&mut txn, FsuId::new(), &nic).await.unwrap_err();
        assert_eq!(
            validation(err).get("interfaces").unwrap(),
            ["Parent FSU must be assigned to a device in order to add child FSUs"]
        );
    }

    #[crate::sqlx_test(fixtures("dcim", "fsu_types"))]
    async fn baseboard_drops_only_the_removed_gpu(pool: sqlx::PgPool) {
        let mut txn = pool.begin().await.unwrap();
        let device = Placement::Device(server_a());

        let g1 = create(&mut txn, FsuKind::Gpu, "g1", gpu_type(), device).await;
        let g2 = create(&mut txn, FsuKind::Gpu, "g2", gpu_type(), device).await;
        let mut baseboard = NewFsu::new(FsuKind::GpuBaseboard, "bb0", gpu_baseboard_type(), device);
        baseboard.children = Some(ChildIds::Fsus(vec![g1.id, g2.id]));
        let baseboard = create_fsu(&mut txn, FsuId::new(), &baseboard).await.unwrap();

        update_fsu(
            &mut txn,
            FsuKind::GpuBaseboard,
            baseboard.id,
            &FsuPatch {
                children: Some(ChildIds::Fsus(vec![g1.id])),
                ..Default::default()
            },
        )
        .await
        .unwrap();

        assert_eq!(parent_of(&mut txn, g1.id).await, Some(baseboard.id));
        assert_eq!(parent_of(&mut txn, g2.id).await, None);
    }

    #[crate::sqlx_test(fixtures("dcim", "fsu_types"))]
    async fn resubmitting_children_changes_nothing(pool: sqlx::PgPool) {
        let mut txn = pool.begin().await.unwrap();
        let [eth0, eth1, _] = server_a_interfaces();

        let mut nic = NewFsu::new(FsuKind::Nic, "nic0", nic_type(), Placement::Device(server_a()));
        nic.children = Some(ChildIds::Interfaces(vec![eth0, eth1]));
        let nic = create_fsu(&mut txn, FsuId::new(), &nic).await.unwrap();
        let before = dcim::find_interfaces_by_device(&mut txn, server_a()).await.unwrap();

        update_fsu(
            &mut txn,
            FsuKind::Nic,
            nic.id,
            &FsuPatch {
                children: Some(ChildIds::Interfaces(vec![eth1, eth0])),
                ..Default::default()
            },
        )
        .await
        .unwrap();
        assert_eq!(
            dcim::find_interfaces_by_device(&mut txn, server_a()).await.unwrap(),
            before
        );
    }

    #[crate::sqlx_test(fixtures("dcim", "fsu_types"))]
    async fn owned_children_cannot_be_taken(pool: sqlx::PgPool) {
        let mut txn = pool.begin().await.unwrap();
        let [eth0, eth1, eth2] = server_a_interfaces();

        let mut first = NewFsu::new(FsuKind::Nic, "nic0", nic_type(), Placement::Device(server_a()));
        first.children = Some(ChildIds::Interfaces(vec![eth0]));
        let first = create_fsu(&mut txn, FsuId::new(), &first).await.unwrap();
        let second =
            create(&mut txn, FsuKind::Nic, "nic1", nic_type(), Placement::Device(server_a())).await;

        let err = update_fsu(
            &mut txn,
            FsuKind::Nic,
            second.id,
            &FsuPatch {
                children: Some(ChildIds::Interfaces(vec![eth1, eth0])),
                ..Default::default()
            },
        )
        .await
        .unwrap_err();
        assert_eq!(
            validation(err).get("interfaces").unwrap(),
            ["Interface eth0 is already assigned to nic0"]
        );
        // eth1 was valid but nothing was applied.
        assert_eq!(
            interface_parents(&mut txn).await,
            vec![Some(first.id), None, None]
        );

        let err = update_fsu(
            &mut txn,
            FsuKind::Nic,
            second.id,
            &FsuPatch {
                children: Some(ChildIds::Interfaces(vec![eth1, eth2, server_b_interface()])),
                ..Default::default()
            },
        )
        .await
        .unwrap_err();
        assert!(validation(err).get("interfaces").is_some());
    }

    #[crate::sqlx_test(fixtures("dcim", "fsu_types"))]
    async fn psu_moved_to_storage_releases_its_power_ports(pool: sqlx::PgPool) {
        let mut txn = pool.begin().await.unwrap();
        let ports = server_a_power_ports();

        let mut psu = NewFsu::new(FsuKind::Psu, "psu0", psu_type(), Placement::Device(server_a()));
        psu.children = Some(ChildIds::PowerPorts(ports.to_vec()));
        let psu = create_fsu(&mut txn, FsuId::new(), &psu).await.unwrap();
        assert_eq!(psu.fields.redundant, Some(false));

        let assigned = dcim::find_power_ports_by_device(&mut txn, server_a()).await.unwrap();
        assert!(assigned.iter().all(|p| p.parent_psu_id == Some(psu.id)));

        let stored = update_fsu(
            &mut txn,
            FsuKind::Psu,
            psu.id,
            &FsuPatch {
                location: Some(Some(spares_cage())),
                ..Default::default()
            },
        )
        .await
        .unwrap();
        assert_eq!(stored.placement, Placement::Location(spares_cage()));

        let released = dcim::find_power_ports_by_device(&mut txn, server_a()).await.unwrap();
        assert_eq!(
            released.iter().map(|p| p.id).collect::<Vec<PowerPortId>>(),
            ports.to_vec()
        );
        assert!(released.iter().all(|p| p.parent_psu_id.is_none()));
    }

    #[crate::sqlx_test(fixtures("dcim", "fsu_types"))]
    async fn empty_list_releases_all_children(pool: sqlx::PgPool) {
        let mut txn = pool.begin().await.unwrap();
        let [eth0, eth1, _] = server_a_interfaces();

        let mut nic = NewFsu::new(FsuKind::Nic, "nic0", nic_type(), Placement::Device(server_a()));
        nic.children = Some(ChildIds::Interfaces(vec![eth0, eth1]));
        let nic = create_fsu(&mut txn, FsuId::new(), &nic).await.unwrap();

        update_fsu(
            &mut txn,
            FsuKind::Nic,
            nic.id,
            &FsuPatch {
                children: Some(ChildIds::Interfaces(Vec::<InterfaceId>::new())),
                ..Default::default()
            },
        )
        .await
        .unwrap();
        assert_eq!(interface_parents(&mut txn).await, vec![None, None, None]);
    }

    #[crate::sqlx_test(fixtures("dcim", "fsu_types"))]
    async fn child_moving_devices_loses_its_parent(pool: sqlx::PgPool) {
        let mut txn = pool.begin().await.unwrap();
        let device = Placement::Device(server_a());

        let hba = create(&mut txn, FsuKind::Hba, "hba0", hba_type(), device).await;
        let mut disk = NewFsu::new(FsuKind::Disk, "disk0", disk_type(), device);
        disk.parent_id = Some(hba.id);
        let disk = create_fsu(&mut txn, FsuId::new(), &disk).await.unwrap();
        assert_eq!(disk.parent_id, Some(hba.id));

        let renamed = update_fsu(
            &mut txn,
            FsuKind::Disk,
            disk.id,
            &FsuPatch {
                name: Some("disk-a".to_string()),
                ..Default::default()
            },
        )
        .await
        .unwrap();
        assert_eq!(renamed.parent_id, Some(hba.id));

        let moved = update_fsu(
            &mut txn,
            FsuKind::Disk,
            disk.id,
            &FsuPatch {
                device: Some(Some(server_b())),
                ..Default::default()
            },
        )
        .await
        .unwrap();
        assert_eq!(moved.parent_id, None);
    }

    #[crate::sqlx_test(fixtures("dcim", "fsu_types"))]
    async fn unknown_references_are_field_errors(pool: sqlx::PgPool) {
        let mut txn = pool.begin().await.unwrap();

        let mut cpu = NewFsu::new(
            FsuKind::Cpu,
            "cpu0",
            cpu_type(),
            Placement::Device(fsu_uuid::dcim::DeviceId::new()),
        );
        let err = create_fsu(&mut txn, FsuId::new(), &cpu).await.unwrap_err();
        assert!(validation(err).get("device").is_some());

        cpu.placement = Placement::Device(server_a());
        cpu.fsu_type_id = gpu_type();
        let err = create_fsu(&mut txn, FsuId::new(), &cpu).await.unwrap_err();
        assert_eq!(
            validation(err).get("fsu_type").unwrap(),
            ["H100 is a GPU type, expected a CPU type"]
        );

        cpu.fsu_type_id = cpu_type();
        let gpu = create(&mut txn, FsuKind::Gpu, "gpu0", gpu_type(), Placement::Device(server_a())).await;
        cpu.parent_id = Some(gpu.id);
        let err = create_fsu(&mut txn, FsuId::new(), &cpu).await.unwrap_err();
        assert_eq!(
            validation(err).get("parent_mainboard").unwrap(),
            ["gpu0 is a GPU, expected a Mainboard"]
        );
    }
}
