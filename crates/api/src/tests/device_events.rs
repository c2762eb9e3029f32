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

use axum::http::StatusCode;
use serde_json::json;

use super::*;

#[crate::sqlx_test(fixtures("dcim", "fsu_types"))]
async fn device_created_event_instantiates_templates(pool: sqlx::PgPool) {
    let app = TestApp::new(pool);
    for (kind, name, fsu_type) in [
        ("mainboard", "mb0", MAINBOARD_TYPE),
        ("psu", "psu0", PSU_TYPE),
        ("psu", "psu1", PSU_TYPE),
    ] {
        let (status, body) = app
            .post(
                &format!("/api/fsu-templates/{kind}"),
                json!({"name": name, "fsu_type": fsu_type, "device_type": DGX_DEVICE_TYPE}),
            )
            .await;
        assert_eq!(status, StatusCode::CREATED, "{body}");
    }

    let (status, body) = app
        .post("/api/events/device-created", json!({"device_id": SERVER_B}))
        .await;
    assert_eq!(status, StatusCode::CREATED, "{body}");
    assert_eq!(body["device_id"], SERVER_B);
    let mut names: Vec<_> = body["created"]
        .as_array()
        .unwrap()
        .iter()
        .map(|fsu| fsu["name"].as_str().unwrap().to_string())
        .collect();
    names.sort();
    assert_eq!(names, ["mb0", "psu0", "psu1"]);

    let (_, psus) = app.get(&format!("/api/fsus/psu?device={SERVER_B}")).await;
    assert_eq!(psus.as_array().unwrap().len(), 2);

    // Replaying the event collides with the FSUs it already created.
    let (status, body) = app
        .post("/api/events/device-created", json!({"device_id": SERVER_B}))
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body.get("name").is_some(), "{body}");
    let (_, psus) = app.get(&format!("/api/fsus/psu?device={SERVER_B}")).await;
    assert_eq!(psus.as_array().unwrap().len(), 2);
}

#[crate::sqlx_test(fixtures("dcim", "fsu_types"))]
async fn unknown_device_is_not_found(pool: sqlx::PgPool) {
    let app = TestApp::new(pool);
    let (status, body) = app
        .post(
            "/api/events/device-created",
            json!({"device_id": "00000000-0000-0000-0000-00000000dfff"}),
        )
        .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body, json!({"detail": "Not found."}));
}
