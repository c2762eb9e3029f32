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

//! Events the host platform raises about devices.

use fsu_uuid::dcim::DeviceId;
use serde::{Deserialize, Serialize};

use crate::fsu::NewFsu;
use crate::fsu_template::FsuTemplate;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "event", rename_all = "snake_case")]
pub enum DeviceEvent {
    /// A device was created and should receive the FSUs its device type's
    /// templates describe.
    Created { device_id: DeviceId },
}

impl DeviceEvent {
    pub fn device_id(&self) -> DeviceId {
        match self {
            DeviceEvent::Created { device_id } => *device_id,
        }
    }
}

/// One new FSU per template, in template order.
pub fn plan_template_instantiation(device_id: DeviceId, templates: &[FsuTemplate]) -> Vec<NewFsu> {
    templates
        .iter()
        .map(|template| template.instantiate(device_id))
        .collect()
}

#[cfg(test)]
mod tests {
    use chrono::Utc;
    use fsu_uuid::dcim::DeviceTypeId;
    use fsu_uuid::fsu::{FsuTemplateId, FsuTypeId};

    use super::*;
    use crate::fsu::KindFields;
    use crate::fsu_kind::FsuKind;

    #[test]
    fn every_template_becomes_an_fsu() {
        let device_type_id = DeviceTypeId::new();
        let now = Utc::now();
        let templates: Vec<_> = [(FsuKind::Mainboard, "mb"), (FsuKind::Cpu, "cpu0")]
            .into_iter()
            .map(|(kind, name)| FsuTemplate {
                id: FsuTemplateId::new(),
                kind,
                name: name.to_string(),
                fsu_type_id: FsuTypeId::new(),
                device_type_id,
                description: String::new(),
                fields: KindFields::default(),
                created: now,
                updated: now,
            })
            .collect();

        let device_id = DeviceId::new();
        let planned = plan_template_instantiation(device_id, &templates);
        assert_eq!(planned.len(), 2);
        assert_eq!(planned[0].kind, FsuKind::Mainboard);
        assert_eq!(planned[1].name, "cpu0");
        assert!(planned.iter().all(|fsu| fsu.placement.device() == Some(device_id)));
    }

    #[test]
    fn event_json_names_the_device() {
        let device_id = DeviceId::new();
        let event: DeviceEvent = serde_json::from_value(serde_json::json!({
            "event": "created",
            "device_id": device_id.to_string(),
        }))
        .unwrap();
        assert_eq!(event.device_id(), device_id);
    }
}
