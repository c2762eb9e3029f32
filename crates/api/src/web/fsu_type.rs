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
use axum::extract::rejection::JsonRejection;
use axum::extract::{Path as AxumPath, State as AxumState};
use axum::http::StatusCode;
use chrono::{DateTime, Utc};
use fsu_uuid::dcim::ManufacturerId;
use fsu_uuid::fsu::{FsuTypeId, FsuTypeMarker};
use model::fsu_kind::FsuKind;
use model::fsu_type::{FsuType, FsuTypeAttributes, NewFsuType};
use serde::{Deserialize, Serialize};

use super::{ApiError, ApiResult, AppState, parse_id, parse_kind};

/// Body of `POST /api/fsu-types/{kind}`. Everything that is not a catalog
/// column is read as an attribute of the kind.
#[derive(Debug, Deserialize)]
pub struct FsuTypeRequest {
    pub manufacturer: ManufacturerId,
    pub model: String,
    pub part_number: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub comments: String,
    #[serde(flatten)]
    pub attributes: serde_json::Map<String, serde_json::Value>,
}

impl FsuTypeRequest {
    pub fn into_new_fsu_type(self, kind: FsuKind) -> ApiResult<NewFsuType> {
        let attributes =
            FsuTypeAttributes::for_kind(kind, serde_json::Value::Object(self.attributes))
                .map_err(|e| ApiError::MalformedRequest(e.to_string()))?;
        Ok(NewFsuType {
            manufacturer_id: self.manufacturer,
            model: self.model,
            part_number: self.part_number,
            description: self.description,
            comments: self.comments,
            attributes,
        })
    }
}

#[derive(Debug, Serialize)]
pub struct FsuTypeResponse {
    pub id: FsuTypeId,
    pub manufacturer: ManufacturerId,
    pub model: String,
    pub part_number: String,
    pub description: String,
    pub comments: String,
    #[serde(flatten)]
    pub attributes: FsuTypeAttributes,
    pub created: DateTime<Utc>,
    pub updated: DateTime<Utc>,
}

impl From<FsuType> for FsuTypeResponse {
    fn from(fsu_type: FsuType) -> Self {
        FsuTypeResponse {
            id: fsu_type.id,
            manufacturer: fsu_type.manufacturer_id,
            model: fsu_type.model,
            part_number: fsu_type.part_number,
            description: fsu_type.description,
            comments: fsu_type.comments,
            attributes: fsu_type.attributes,
            created: fsu_type.created,
            updated: fsu_type.updated,
        }
    }
}

pub async fn list(
    AxumState(state): AxumState<AppState>,
    AxumPath(kind): AxumPath<String>,
) -> ApiResult<Json<Vec<FsuTypeResponse>>> {
    let kind = parse_kind(&kind)?;
    let mut txn = db::begin(&state.pool).await?;
    let types = db::fsu_type::find_by_kind(&mut txn, kind).await?;
    db::commit(txn).await?;
    Ok(Json(types.into_iter().map(Into::into).collect()))
}

pub async fn create(
    AxumState(state): AxumState<AppState>,
    AxumPath(kind): AxumPath<String>,
    payload: Result<Json<FsuTypeRequest>, JsonRejection>,
) -> ApiResult<(StatusCode, Json<FsuTypeResponse>)> {
    let kind = parse_kind(&kind)?;
    let Json(request) = payload?;
    let new_type = request.into_new_fsu_type(kind)?;

    let mut txn = db::begin(&state.pool).await?;
    let created = db::fsu_type::create(&mut txn, FsuTypeId::new(), &new_type).await?;
    db::commit(txn).await?;
    tracing::info!(fsu_type_id = %created.id, %kind, "created FSU type");
    Ok((StatusCode::CREATED, Json(created.into())))
}

pub async fn detail(
    AxumState(state): AxumState<AppState>,
    AxumPath((kind, id)): AxumPath<(String, String)>,
) -> ApiResult<Json<FsuTypeResponse>> {
    let kind = parse_kind(&kind)?;
    let id = parse_id::<FsuTypeMarker>("fsu_type", &id)?;

    let mut txn = db::begin(&state.pool).await?;
    let fsu_type = db::fsu_type::find(&mut txn, id)
        .await?
        .filter(|fsu_type| fsu_type.kind() == kind)
        .ok_or_else(|| ApiError::not_found("fsu_type", id))?;
    db::commit(txn).await?;
    Ok(Json(fsu_type.into()))
}

pub async fn delete(
    AxumState(state): AxumState<AppState>,
    AxumPath((kind, id)): AxumPath<(String, String)>,
) -> ApiResult<StatusCode> {
    let kind = parse_kind(&kind)?;
    let id = parse_id::<FsuTypeMarker>("fsu_type", &id)?;

    let mut txn = db::begin(&state.pool).await?;
    db::fsu_type::delete(&mut txn, kind, id).await?;
    db::commit(txn).await?;
    Ok(StatusCode::NO_CONTENT)
}
