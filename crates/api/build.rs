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

// `#[sqlx_test]` marks database tests ignored under this cfg.
fn main() {
    println!("cargo:rustc-check-cfg=cfg(no_test_database)");
    println!("cargo:rerun-if-env-changed=DATABASE_URL");
    if std::env::var_os("DATABASE_URL").is_none() {
        println!("cargo:rustc-cfg=no_test_database");
    }
}
