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

use axum::Json;
use axum::extract::rejection::{JsonRejection, QueryRejection};
use axum::extract::{Path as AxumPath, Query, State as AxumState};
use axum::http::StatusCode;
use chrono::{DateTime, Utc};
use db::fsu::FsuFilter;
use db::fsu_child::ChildSummary;
use fsu_uuid::dcim::{DeviceId, InterfaceId, LocationId, PowerPortId};
use fsu_uuid::fsu::{FsuId, FsuMarker, FsuTypeId};
use model::fsu::{ChildIds, Fsu, FsuPatch, FsuStatus, KindFields, NewFsu};
use model::fsu_kind::{ChildRelationship, FsuKind};
use model::placement::Placement;
use model::validation::{FsuValidationError, ValidationErrors};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value, json};
use sqlx::PgConnection;

use super::{ApiError, ApiResult, AppState, parse_id, parse_kind};

/* ********************************** */
/*              Requests              */
/* ********************************** */

/// Child lists as they appear on a parent FSU. Only the list belonging to
/// the path kind may be present.
#[derive(Debug, Default, Deserialize)]
pub struct ChildLists {
    #[serde(default)]
    pub cpus: Option<Vec<FsuId>>,
    #[serde(default)]
    pub gpus: Option<Vec<FsuId>>,
    #[serde(default)]
    pub disks: Option<Vec<FsuId>>,
    #[serde(default)]
    pub interfaces: Option<Vec<InterfaceId>>,
    #[serde(default)]
    pub power_ports: Option<Vec<PowerPortId>>,
}

impl ChildLists {
    fn resolve(self, kind: FsuKind, errors: &mut ValidationErrors) -> Option<ChildIds> {
        let lists = [
            (ChildRelationship::MainboardCpus, self.cpus.map(ChildIds::Fsus)),
            (ChildRelationship::GpuBaseboardGpus, self.gpus.map(ChildIds::Fsus)),
            (ChildRelationship::HbaDisks, self.disks.map(ChildIds::Fsus)),
            (ChildRelationship::NicInterfaces, self.interfaces.map(ChildIds::Interfaces)),
            (ChildRelationship::PsuPowerPorts, self.power_ports.map(ChildIds::PowerPorts)),
        ];
        select_for_kind(
            kind,
            lists,
            |rel| Some(rel.parent_kind()),
            |rel| rel.children_field(),
            errors,
        )
    }
}

/// Picks the value of the one relationship that applies to `kind` and
/// reports every other value that was sent as not applicable.
fn select_for_kind<T>(
    kind: FsuKind,
    values: impl IntoIterator<Item = (ChildRelationship, Option<T>)>,
    side: impl Fn(ChildRelationship) -> Option<FsuKind>,
    field: impl Fn(ChildRelationship) -> &'static str,
    errors: &mut ValidationErrors,
) -> Option<T> {
    let mut selected = None;
    for (relationship, value) in values {
        let Some(value) = value else {
            continue;
        };
        if side(relationship) == Some(kind) {
            selected = Some(value);
        } else {
            errors.push(FsuValidationError::NotApplicable {
                field: field(relationship),
                kind: kind.verbose_name(),
            });
        }
    }
    selected
}

/// Body of `POST /api/fsus/{kind}`.
#[derive(Debug, Deserialize)]
pub struct FsuCreateRequest {
    pub name: String,
    pub fsu_type: FsuTypeId,
    #[serde(default)]
    pub device: Option<DeviceId>,
    #[serde(default)]
    pub location: Option<LocationId>,
    #[serde(default)]
    pub serial_number: String,
    #[serde(default)]
    pub firmware_version: String,
    #[serde(default)]
    pub driver_name: String,
    #[serde(default)]
    pub driver_version: String,
    #[serde(default)]
    pub asset_tag: Option<String>,
    #[serde(default)]
    pub status: FsuStatus,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub comments: String,
    #[serde(default)]
    pub parent_mainboard: Option<FsuId>,
    #[serde(default)]
    pub parent_gpubaseboard: Option<FsuId>,
    #[serde(default)]
    pub parent_hba: Option<FsuId>,
    #[serde(flatten)]
    pub fields: KindFields,
    #[serde(flatten)]
    pub children: ChildLists,
}

impl FsuCreateRequest {
    pub fn into_new_fsu(self, kind: FsuKind) -> ApiResult<NewFsu> {
        let mut errors = ValidationErrors::new();

        let placement = Placement::from_parts(self.device, self.location);
        if let Err(error) = &placement {
            errors.push(error.clone());
        }
        let parents = [
            (ChildRelationship::MainboardCpus, self.parent_mainboard),
            (ChildRelationship::GpuBaseboardGpus, self.parent_gpubaseboard),
            (ChildRelationship::HbaDisks, self.parent_hba),
        ];
        let parent_id = select_for_kind(
            kind,
            parents,
            |rel| rel.child_fsu_kind(),
            |rel| rel.parent_field(),
            &mut errors,
        );
        let children = self.children.resolve(kind, &mut errors);
        errors.into_result()?;

        Ok(NewFsu {
            kind,
            name: self.name,
            fsu_type_id: self.fsu_type,
            placement: placement?,
            serial_number: self.serial_number,
            firmware_version: self.firmware_version,
            driver_name: self.driver_name,
            driver_version: self.driver_version,
            asset_tag: self.asset_tag,
            status: self.status,
            description: self.description,
            comments: self.comments,
            fields: self.fields.normalized_for(kind),
            parent_id,
            children,
        })
    }
}

/// Body of `PATCH /api/fsus/{kind}/{id}`. Absent fields are left alone;
/// `null` clears a nullable field.
#[derive(Debug, Default, Deserialize)]
pub struct FsuPatchRequest {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub fsu_type: Option<FsuTypeId>,
    #[serde(default, with = "::serde_with::rust::double_option")]
    pub device: Option<Option<DeviceId>>,
    #[serde(default, with = "::serde_with::rust::double_option")]
    pub location: Option<Option<LocationId>>,
    #[serde(default)]
    pub serial_number: Option<String>,
    #[serde(default)]
    pub firmware_version: Option<String>,
    #[serde(default)]
    pub driver_name: Option<String>,
    #[serde(default)]
    pub driver_version: Option<String>,
    #[serde(default, with = "::serde_with::rust::double_option")]
    pub asset_tag: Option<Option<String>>,
    #[serde(default)]
    pub status: Option<FsuStatus>,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub comments: Option<String>,
    #[serde(default, with = "::serde_with::rust::double_option")]
    pub pci_slot_id: Option<Option<String>>,
    #[serde(default)]
    pub redundant: Option<bool>,
    #[serde(default, with = "::serde_with::rust::double_option")]
    pub slot_id: Option<Option<String>>,
    #[serde(default, with = "::serde_with::rust::double_option")]
    pub parent_mainboard: Option<Option<FsuId>>,
    #[serde(default, with = "::serde_with::rust::double_option")]
    pub parent_gpubaseboard: Option<Option<FsuId>>,
    #[serde(default, with = "::serde_with::rust::double_option")]
    pub parent_hba: Option<Option<FsuId>>,
    #[serde(flatten)]
    pub children: ChildLists,
}

impl FsuPatchRequest {
    pub fn into_patch(self, kind: FsuKind) -> ApiResult<FsuPatch> {
        let mut errors = ValidationErrors::new();
        let parents = [
            (ChildRelationship::MainboardCpus, self.parent_mainboard),
            (ChildRelationship::GpuBaseboardGpus, self.parent_gpubaseboard),
            (ChildRelationship::HbaDisks, self.parent_hba),
        ];
        let parent = select_for_kind(
            kind,
            parents,
            |rel| rel.child_fsu_kind(),
            |rel| rel.parent_field(),
            &mut errors,
        );
        let children = self.children.resolve(kind, &mut errors);
        errors.into_result()?;

        Ok(FsuPatch {
            name: self.name,
            fsu_type_id: self.fsu_type,
            device: self.device,
            location: self.location,
            serial_number: self.serial_number,
            firmware_version: self.firmware_version,
            driver_name: self.driver_name,
            driver_version: self.driver_version,
            asset_tag: self.asset_tag,
            status: self.status,
            description: self.description,
            comments: self.comments,
            pci_slot_id: self.pci_slot_id,
            redundant: self.redundant,
            slot_id: self.slot_id,
            parent,
            children,
        })
    }
}

#[derive(Debug, Default, Deserialize)]
pub struct FsuListQuery {
    pub device: Option<DeviceId>,
    pub location: Option<LocationId>,
    pub status: Option<FsuStatus>,
}

impl From<FsuListQuery> for FsuFilter {
    fn from(query: FsuListQuery) -> Self {
        FsuFilter {
            device: query.device,
            location: query.location,
            status: query.status,
        }
    }
}

/* ********************************** */
/*              Responses             */
/* ********************************** */

/// An FSU as returned to clients. Kind specific fields, the parent
/// reference and the child list only appear for the kinds they apply to.
#[derive(Debug, Serialize)]
pub struct FsuResponse {
    pub id: FsuId,
    pub kind: FsuKind,
    pub name: String,
    pub fsu_type: FsuTypeId,
    pub device: Option<DeviceId>,
    pub location: Option<LocationId>,
    pub serial_number: String,
    pub firmware_version: String,
    pub driver_name: String,
    pub driver_version: String,
    pub asset_tag: Option<String>,
    pub status: FsuStatus,
    pub description: String,
    pub comments: String,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
    pub created: DateTime<Utc>,
    pub updated: DateTime<Utc>,
}

impl FsuResponse {
    /// `children` is only listed on single-FSU responses.
    pub fn new(fsu: Fsu, children: Option<Vec<ChildSummary>>) -> Self {
        let kind = fsu.kind;
        let mut extra = Map::new();
        if kind.has_pci_slot_id() {
            extra.insert("pci_slot_id".to_string(), fsu.fields.pci_slot_id.into());
        }
        if kind.has_redundant() {
            extra.insert("redundant".to_string(), fsu.fields.redundant.into());
        }
        if kind.has_slot_id() {
            extra.insert("slot_id".to_string(), fsu.fields.slot_id.into());
        }
        if let Some(relationship) = kind.owning_parent() {
            extra.insert(
                relationship.parent_field().to_string(),
                fsu.parent_id.map(|id| id.to_string()).into(),
            );
        }
        if let (Some(relationship), Some(children)) = (kind.owned_children(), children) {
            let children = children
                .into_iter()
                .map(|child| json!({"id": child.id.to_string(), "name": child.name}))
                .collect();
            extra.insert(
                relationship.children_field().to_string(),
                Value::Array(children),
            );
        }

        FsuResponse {
            id: fsu.id,
            kind,
            device: fsu.placement.device(),
            location: fsu.placement.location(),
            name: fsu.name,
            fsu_type: fsu.fsu_type_id,
            serial_number: fsu.serial_number,
            firmware_version: fsu.firmware_version,
            driver_name: fsu.driver_name,
            driver_version: fsu.driver_version,
            asset_tag: fsu.asset_tag,
            status: fsu.status,
            description: fsu.description,
            comments: fsu.comments,
            extra,
            created: fsu.created,
            updated: fsu.updated,
        }
    }
}

pub(crate) async fn load_response(
    txn: &mut PgConnection,
    kind: FsuKind,
    id: FsuId,
) -> ApiResult<FsuResponse> {
    let fsu = db::fsu::find(txn, id)
        .await?
        .filter(|fsu| fsu.kind == kind)
        .ok_or_else(|| ApiError::not_found("fsu", id))?;
    let children = match kind.owned_children() {
        Some(relationship) => Some(db::fsu_child::list_children(txn, relationship, id).await?),
        None => None,
    };
    Ok(FsuResponse::new(fsu, children))
}

/* ********************************** */
/*              Handlers              */
/* ********************************** */

pub async fn list(
    AxumState(state): AxumState<AppState>,
    AxumPath(kind): AxumPath<String>,
    query: Result<Query<FsuListQuery>, QueryRejection>,
) -> ApiResult<Json<Vec<FsuResponse>>> {
    let kind = parse_kind(&kind)?;
    let Query(query) = query?;

    let mut txn = db::begin(&state.pool).await?;
    let fsus = db::fsu::find_by_kind(&mut txn, kind, query.into()).await?;
    db::commit(txn).await?;
    Ok(Json(
        fsus.into_iter()
            .map(|fsu| FsuResponse::new(fsu, None))
            .collect(),
    ))
}

pub async fn create(
    AxumState(state): AxumState<AppState>,
    AxumPath(kind): AxumPath<String>,
    payload: Result<Json<FsuCreateRequest>, JsonRejection>,
) -> ApiResult<(StatusCode, Json<FsuResponse>)> {
    let kind = parse_kind(&kind)?;
    let Json(request) = payload?;
    let new_fsu = request.into_new_fsu(kind)?;

    let mut txn = db::begin(&state.pool).await?;
    let created = db::fsu_assignment::create_fsu(&mut txn, FsuId::new(), &new_fsu).await?;
    let response = load_response(&mut txn, kind, created.id).await?;
    db::commit(txn).await?;
    Ok((StatusCode::CREATED, Json(response)))
}

pub async fn detail(
    AxumState(state): AxumState<AppState>,
    AxumPath((kind, id)): AxumPath<(String, String)>,
) -> ApiResult<Json<FsuResponse>> {
    let kind = parse_kind(&kind)?;
    let id = parse_id::<FsuMarker>("fsu", &id)?;

    let mut txn = db::begin(&state.pool).await?;
    let response = load_response(&mut txn, kind, id).await?;
    db::commit(txn).await?;
    Ok(Json(response))
}

pub async fn update(
    AxumState(state): AxumState<AppState>,
    AxumPath((kind, id)): AxumPath<(String, String)>,
    payload: Result<Json<FsuPatchRequest>, JsonRejection>,
) -> ApiResult<Json<FsuResponse>> {
    let kind = parse_kind(&kind)?;
    let id = parse_id::<FsuMarker>("fsu", &id)?;
    let Json(request) = payload?;
    let patch = request.into_patch(kind)?;

    let mut txn = db::begin(&state.pool).await?;
    db::fsu_assignment::update_fsu(&mut txn, kind, id, &patch).await?;
    let response = load_response(&mut txn, kind, id).await?;
    db::commit(txn).await?;
    Ok(Json(response))
}

pub async fn delete(
    AxumState(state): AxumState<AppState>,
    AxumPath((kind, id)): AxumPath<(String, String)>,
) -> ApiResult<StatusCode> {
    let kind = parse_kind(&kind)?;
    let id = parse_id::<FsuMarker>("fsu", &id)?;

    let mut txn = db::begin(&state.pool).await?;
    db::fsu::delete(&mut txn, kind, id).await?;
    db::commit(txn).await?;
    Ok(StatusCode::NO_CONTENT)
}
