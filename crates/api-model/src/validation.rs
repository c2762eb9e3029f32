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

use std::collections::BTreeMap;
use std::fmt;

use serde::{Deserialize, Serialize};

/// Key under which errors that do not belong to a single field are reported.
pub const NON_FIELD_ERRORS: &str = "non_field_errors";

/// A rejected FSU mutation. Each variant knows which request field it is
/// reported against; the message text is part of the public contract.
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum FsuValidationError {
    #[error("FSUs must be assigned to either a Device or a Storage location, but not both.")]
    DeviceAndLocation,

    #[error("Parent FSU must be assigned to a device in order to add child FSUs")]
    NoParentDevice { field: &'static str },

    #[error(
        "{child_kind} {child_name} has a different parent device ({child_device}) than that of its parent FSU ({parent_device})"
    )]
    MismatchedDevice {
        field: &'static str,
        child_kind: &'static str,
        child_name: String,
        child_device: String,
        parent_device: String,
    },

    #[error(
        "Number of {child_plural} being added to {parent_kind} ({requested}) is greater than the number of available {unit} ({capacity})"
    )]
    CapacityExceeded {
        field: &'static str,
        child_plural: String,
        parent_kind: &'static str,
        requested: usize,
        unit: &'static str,
        capacity: u32,
    },

    #[error("{parent_kind} has no available {noun}.")]
    NoAvailableCapacity {
        field: &'static str,
        parent_kind: &'static str,
        noun: &'static str,
    },

    #[error("{child_kind} {child_name} is already assigned to {current_parent}")]
    AlreadyAssigned {
        field: &'static str,
        child_kind: &'static str,
        child_name: String,
        current_parent: String,
    },

    #[error("{name} is a {actual} type, expected a {expected} type")]
    WrongFsuTypeKind {
        field: &'static str,
        name: String,
        actual: &'static str,
        expected: &'static str,
    },

    #[error("{name} is a {actual}, expected a {expected}")]
    WrongParentKind {
        field: &'static str,
        name: String,
        actual: &'static str,
        expected: &'static str,
    },

    #[error("This field is not valid for {kind} FSUs.")]
    NotApplicable {
        field: &'static str,
        kind: &'static str,
    },

    #[error("This field may not be blank.")]
    Blank { field: &'static str },

    #[error("Invalid pk \"{id}\" - object does not exist.")]
    UnknownReference { field: &'static str, id: String },

    #[error("{message}")]
    Duplicate {
        field: &'static str,
        message: &'static str,
    },
}

impl FsuValidationError {
    /// The request field this error is reported against.
    pub fn field(&self) -> &'static str {
        match self {
            FsuValidationError::DeviceAndLocation => NON_FIELD_ERRORS,
            FsuValidationError::NoParentDevice { field }
            | FsuValidationError::MismatchedDevice { field, .. }
            | FsuValidationError::CapacityExceeded { field, .. }
            | FsuValidationError::NoAvailableCapacity { field, .. }
            | FsuValidationError::AlreadyAssigned { field, .. }
            | FsuValidationError::WrongFsuTypeKind { field, .. }
            | FsuValidationError::WrongParentKind { field, .. }
            | FsuValidationError::NotApplicable { field, .. }
            | FsuValidationError::Blank { field }
            | FsuValidationError::UnknownReference { field, .. }
            | FsuValidationError::Duplicate { field, .. } => field,
        }
    }
}

/// Field name -> messages. This is the error body returned to API clients.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ValidationErrors(BTreeMap<String, Vec<String>>);

impl ValidationErrors {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add(&mut self, field: impl Into<String>, message: impl Into<String>) {
        self.0.entry(field.into()).or_default().push(message.into());
    }

    pub fn push(&mut self, error: FsuValidationError) {
        self.add(error.field(), error.to_string());
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn get(&self, field: &str) -> Option<&[String]> {
        self.0.get(field).map(Vec::as_slice)
    }

    pub fn fields(&self) -> impl Iterator<Item = &str> {
        self.0.keys().map(String::as_str)
    }

    /// `Ok(())` when nothing was collected, otherwise `Err(self)`.
    pub fn into_result(self) -> Result<(), ValidationErrors> {
        if self.is_empty() { Ok(()) } else { Err(self) }
    }
}

impl From<FsuValidationError> for ValidationErrors {
    fn from(error: FsuValidationError) -> Self {
        let mut errors = ValidationErrors::new();
        errors.push(error);
        errors
    }
}

impl fmt::Display for ValidationErrors {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut first = true;
        for (field, messages) in &self.0 {
            for message in messages {
                if !first {
                    write!(f, "; ")?;
                }
                first = false;
                write!(f, "{field}: {message}")?;
            }
        }
        Ok(())
    }
}

impl std::error::Error for ValidationErrors {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn exclusivity_is_a_non_field_error() {
        let errors = ValidationErrors::from(FsuValidationError::DeviceAndLocation);
        assert_eq!(
            errors.get(NON_FIELD_ERRORS).unwrap(),
            ["FSUs must be assigned to either a Device or a Storage location, but not both."]
        );
        assert_eq!(
            serde_json::to_value(&errors).unwrap(),
            serde_json::json!({
                "non_field_errors": [
                    "FSUs must be assigned to either a Device or a Storage location, but not both."
                ]
            })
        );
    }

    #[test]
    fn capacity_message_wording() {
        let err = FsuValidationError::CapacityExceeded {
            field: "cpus",
            child_plural: "CPUs".to_string(),
            parent_kind: "Mainboard",
            requested: 3,
            unit: "sockets",
            capacity: 2,
        };
        assert_eq!(err.field(), "cpus");
        assert_eq!(
            err.to_string(),
            "Number of CPUs being added to Mainboard (3) is greater than the number of available sockets (2)"
        );
    }

    #[test]
    fn messages_accumulate_per_field() {
        let mut errors = ValidationErrors::new();
        errors.push(FsuValidationError::Blank { field: "name" });
        errors.add("name", "second");
        errors.push(FsuValidationError::UnknownReference {
            field: "fsu_type",
            id: "abc".to_string(),
        });
        assert_eq!(errors.get("name").unwrap().len(), 2);
        assert_eq!(errors.fields().collect::<Vec<_>>(), vec!["fsu_type", "name"]);
        assert_eq!(
            errors.to_string(),
            "fsu_type: Invalid pk \"abc\" - object does not exist.; name: This field may not be blank.; name: second"
        );
        assert!(errors.into_result().is_err());
        assert!(ValidationErrors::new().into_result().is_ok());
    }
}
