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

//! Turns a device type's FSU templates into FSUs when a device is created.

use fsu_uuid::dcim::DeviceId;
use fsu_uuid::fsu::FsuId;
use model::device_event::{self, DeviceEvent};
use model::fsu::Fsu;
use serde::Serialize;
use sqlx::{PgConnection, PgPool};

use crate::{DatabaseResult, dcim, fsu_assignment, fsu_template};

/// The FSUs created for one device.
#[derive(Debug, Clone, Serialize)]
pub struct InstantiationReport {
    pub device_id: DeviceId,
    pub created: Vec<Fsu>,
}

/// Creates one FSU per template of the device's type on `txn`.
///
/// The FSUs go through the same validation as API requests. The first
/// failure is returned and the caller is expected to roll back.
#[tracing::instrument(skip(txn))]
pub async fn instantiate_for_device(
    txn: &mut PgConnection,
    device_id: DeviceId,
) -> DatabaseResult<InstantiationReport> {
    let device = dcim::load_device(txn, device_id).await?;
    let templates = fsu_template::find_by_device_type(txn, device.device_type_id).await?;

    let mut created = Vec::with_capacity(templates.len());
    for new_fsu in device_event::plan_template_instantiation(device_id, &templates) {
        created.push(fsu_assignment::create_fsu(txn, FsuId::new(), &new_fsu).await?);
    }

    tracing::info!(
        device = %device.name,
        templates = templates.len(),
        "instantiated FSU templates"
    );
    Ok(InstantiationReport { device_id, created })
}

/// Handles a device event in its own transaction. Nothing is committed for
/// the device unless every template was instantiated.
pub async fn handle_device_event(
    pool: &PgPool,
    event: DeviceEvent,
) -> DatabaseResult<InstantiationReport> {
    let mut txn = crate::begin(pool).await?;
    let report = match event {
        DeviceEvent::Created { device_id } => instantiate_for_device(&mut txn, device_id).await?,
    };
    crate::commit(txn).await?;
    Ok(report)
}
