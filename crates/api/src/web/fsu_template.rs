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
use fsu_uuid::dcim::DeviceTypeId;
use fsu_uuid::fsu::{FsuTemplateId, FsuTemplateMarker, FsuTypeId};
use model::fsu::KindFields;
use model::fsu_kind::FsuKind;
use model::fsu_template::{FsuTemplate, NewFsuTemplate};
use serde::{Deserialize, Serialize};

use super::{ApiError, ApiResult, AppState, parse_id, parse_kind};

#[derive(Debug, Deserialize)]
pub struct FsuTemplateRequest {
    pub name: String,
    pub fsu_type: FsuTypeId,
    pub device_type: DeviceTypeId,
    #[serde(default)]
    pub description: String,
    #[serde(flatten)]
    pub fields: KindFields,
}

impl FsuTemplateRequest {
    pub fn into_new_template(self, kind: FsuKind) -> NewFsuTemplate {
        NewFsuTemplate {
            kind,
            name: self.name,
            fsu_type_id: self.fsu_type,
            device_type_id: self.device_type,
            description: self.description,
            fields: self.fields,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct FsuTemplateResponse {
    pub id: FsuTemplateId,
    pub kind: FsuKind,
    pub name: String,
    pub fsu_type: FsuTypeId,
    pub device_type: DeviceTypeId,
    pub description: String,
    #[serde(flatten)]
    pub fields: KindFields,
    pub created: DateTime<Utc>,
    pub updated: DateTime<Utc>,
}

impl From<FsuTemplate> for FsuTemplateResponse {
    fn from(template: FsuTemplate) -> Self {
        FsuTemplateResponse {
            id: template.id,
            kind: template.kind,
            name: template.name,
            fsu_type: template.fsu_type_id,
            device_type: template.device_type_id,
            description: template.description,
            fields: template.fields,
            created: template.created,
            updated: template.updated,
        }
    }
}

pub async fn list(
    AxumState(state): AxumState<AppState>,
    AxumPath(kind): AxumPath<String>,
) -> ApiResult<Json<Vec<FsuTemplateResponse>>> {
    let kind = parse_kind(&kind)?;
    let mut txn = db::begin(&state.pool).await?;
    let templates = db::fsu_template::find_by_kind(&mut txn, kind).await?;
    db::commit(txn).await?;
    Ok(Json(templates.into_iter().map(Into::into).collect()))
}

pub async fn create(
    AxumState(state): AxumState<AppState>,
    AxumPath(kind): AxumPath<String>,
    payload: Result<Json<FsuTemplateRequest>, JsonRejection>,
) -> ApiResult<(StatusCode, Json<FsuTemplateResponse>)> {
    let kind = parse_kind(&kind)?;
    let Json(request) = payload?;
    let new_template = request.into_new_template(kind);

    let mut txn = db::begin(&state.pool).await?;
    let created = db::fsu_template::create(&mut txn, FsuTemplateId::new(), &new_template).await?;
    db::commit(txn).await?;
    Ok((StatusCode::CREATED, Json(created.into())))
}

pub async fn detail(
    AxumState(state): AxumState<AppState>,
    AxumPath((kind, id)): AxumPath<(String, String)>,
) -> ApiResult<Json<FsuTemplateResponse>> {
    let kind = parse_kind(&kind)?;
    let id = parse_id::<FsuTemplateMarker>("fsu_template", &id)?;

    let mut txn = db::begin(&state.pool).await?;
    let template = db::fsu_template::find(&mut txn, id)
        .await?
        .filter(|template| template.kind == kind)
        .ok_or_else(|| ApiError::not_found("fsu_template", id))?;
    db::commit(txn).await?;
    Ok(Json(template.into()))
}

pub async fn delete(
    AxumState(state): AxumState<AppState>,
    AxumPath((kind, id)): AxumPath<(String, String)>,
) -> ApiResult<StatusCode> {
    let kind = parse_kind(&kind)?;
    let id = parse_id::<FsuTemplateMarker>("fsu_template", &id)?;

    let mut txn = db::begin(&state.pool).await?;
    db::fsu_template::delete(&mut txn, kind, id).await?;
    db::commit(txn).await?;
    Ok(StatusCode::NO_CONTENT)
}
