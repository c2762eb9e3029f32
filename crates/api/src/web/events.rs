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
use axum::extract::State as AxumState;
use axum::extract::rejection::JsonRejection;
use axum::http::StatusCode;
use fsu_uuid::dcim::DeviceId;
use model::device_event::DeviceEvent;
use serde::{Deserialize, Serialize};

use super::fsu::FsuResponse;
use super::{ApiResult, AppState};

/// Sent by the host platform after it created a device.
#[derive(Debug, Deserialize)]
pub struct DeviceCreatedRequest {
    pub device_id: DeviceId,
}

#[derive(Debug, Serialize)]
pub struct DeviceCreatedResponse {
    pub device_id: DeviceId,
    pub created: Vec<FsuResponse>,
}

pub async fn device_created(
    AxumState(state): AxumState<AppState>,
    payload: Result<Json<DeviceCreatedRequest>, JsonRejection>,
) -> ApiResult<(StatusCode, Json<DeviceCreatedResponse>)> {
    let Json(request) = payload?;
    let event = DeviceEvent::Created {
        device_id: request.device_id,
    };
    let report = db::template_instantiation::handle_device_event(&state.pool, event).await?;

    Ok((
        StatusCode::CREATED,
        Json(DeviceCreatedResponse {
            device_id: report.device_id,
            created: report
                .created
                .into_iter()
                .map(|fsu| FsuResponse::new(fsu, None))
                .collect(),
        }),
    ))
}
