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

//! Domain model for field serviceable units (FSUs): the hardware kinds,
//! their catalog types and templates, placed instances, and the rules that
//! govern how composite hardware owns its children.

pub mod assignment;
pub mod dcim;
pub mod device_event;
pub mod fsu;
pub mod fsu_kind;
pub mod fsu_template;
pub mod fsu_type;
pub mod placement;
pub mod validation;

pub use fsu_kind::{ChildRelationship, FsuKind};
pub use validation::{FsuValidationError, ValidationErrors};
