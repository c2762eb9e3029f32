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

use std::cmp::Ordering;
use std::fmt;
use std::hash::{Hash, Hasher};
use std::marker::PhantomData;
use std::str::FromStr;

use serde::{Deserialize, Deserializer, Serialize, Serializer};
#[cfg(feature = "sqlx")]
use sqlx::{
    Database, Decode, Encode, Postgres,
    encode::IsNull,
    error::BoxDynError,
    postgres::{PgHasArrayType, PgTypeInfo},
};

use crate::UuidConversionError;

/// Marker trait naming the record a [`TypedUuid`] identifies.
pub trait UuidSubtype: 'static {
    const TYPE_NAME: &'static str;
}

/// A UUID tagged with the kind of record it identifies, so that e.g. a
/// device ID can never be passed where an FSU ID is expected.
pub struct TypedUuid<T: UuidSubtype> {
    uuid: uuid::Uuid,
    _marker: PhantomData<fn() -> T>,
}

impl<T: UuidSubtype> TypedUuid<T> {
    pub fn new() -> Self {
        uuid::Uuid::new_v4().into()
    }

    pub const fn from_uuid(uuid: uuid::Uuid) -> Self {
        Self {
            uuid,
            _marker: PhantomData,
        }
    }

    pub fn as_uuid(&self) -> &uuid::Uuid {
        &self.uuid
    }

    pub fn type_name(&self) -> &'static str {
        T::TYPE_NAME
    }
}

impl<T: UuidSubtype> Default for TypedUuid<T> {
    fn default() -> Self {
        Self::from_uuid(uuid::Uuid::nil())
    }
}

impl<T: UuidSubtype> Clone for TypedUuid<T> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<T: UuidSubtype> Copy for TypedUuid<T> {}

impl<T: UuidSubtype> PartialEq for TypedUuid<T> {
    fn eq(&self, other: &Self) -> bool {
        self.uuid == other.uuid
    }
}

impl<T: UuidSubtype> Eq for TypedUuid<T> {}

impl<T: UuidSubtype> PartialOrd for TypedUuid<T> {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl<T: UuidSubtype> Ord for TypedUuid<T> {
    fn cmp(&self, other: &Self) -> Ordering {
        self.uuid.cmp(&other.uuid)
    }
}

impl<T: UuidSubtype> Hash for TypedUuid<T> {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.uuid.hash(state)
    }
}

impl<T: UuidSubtype> fmt::Debug for TypedUuid<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}({})", T::TYPE_NAME, self.uuid)
    }
}

impl<T: UuidSubtype> fmt::Display for TypedUuid<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.uuid)
    }
}

/* ********************************************* */
/*  Basic trait implementations for conversions  */
/* ********************************************* */

impl<T: UuidSubtype> From<uuid::Uuid> for TypedUuid<T> {
    fn from(uuid: uuid::Uuid) -> Self {
        Self::from_uuid(uuid)
    }
}

impl<T: UuidSubtype> From<TypedUuid<T>> for uuid::Uuid {
    fn from(id: TypedUuid<T>) -> Self {
        id.uuid
    }
}

impl<T: UuidSubtype> FromStr for TypedUuid<T> {
    type Err = UuidConversionError;

    fn from_str(input: &str) -> Result<Self, Self::Err> {
        let uuid =
            uuid::Uuid::parse_str(input).map_err(|_| UuidConversionError::InvalidUuid {
                ty: T::TYPE_NAME,
                value: input.to_string(),
            })?;
        Ok(uuid.into())
    }
}

/* ********************************************* */
/*          Serde trait implementations          */
/* ********************************************* */

impl<T: UuidSubtype> Serialize for TypedUuid<T> {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        self.uuid.serialize(serializer)
    }
}

impl<'de, T: UuidSubtype> Deserialize<'de> for TypedUuid<T> {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        use serde::de::Error;

        let value = String::deserialize(deserializer)?;
        value
            .parse::<Self>()
            .map_err(|err| Error::custom(err.to_string()))
    }
}

/* ********************************************* */
/*           SQLX trait implementations          */
/* ********************************************* */

#[cfg(feature = "sqlx")]
impl<T: UuidSubtype> sqlx::Type<Postgres> for TypedUuid<T> {
    fn type_info() -> PgTypeInfo {
        <sqlx::types::Uuid as sqlx::Type<Postgres>>::type_info()
    }

    fn compatible(ty: &PgTypeInfo) -> bool {
        <sqlx::types::Uuid as sqlx::Type<Postgres>>::compatible(ty)
    }
}

#[cfg(feature = "sqlx")]
impl<'q, T: UuidSubtype> Encode<'q, Postgres> for TypedUuid<T> {
    fn encode_by_ref(
        &self,
        buf: &mut <Postgres as Database>::ArgumentBuffer<'q>,
    ) -> Result<IsNull, BoxDynError> {
        <sqlx::types::Uuid as Encode<'q, Postgres>>::encode_by_ref(&self.uuid, buf)
    }
}

#[cfg(feature = "sqlx")]
impl<'r, T: UuidSubtype> Decode<'r, Postgres> for TypedUuid<T> {
    fn decode(value: <Postgres as Database>::ValueRef<'r>) -> Result<Self, BoxDynError> {
        let uuid = <sqlx::types::Uuid as Decode<'r, Postgres>>::decode(value)?;
        Ok(uuid.into())
    }
}

#[cfg(feature = "sqlx")]
impl<T: UuidSubtype> PgHasArrayType for TypedUuid<T> {
    fn array_type_info() -> PgTypeInfo {
        <sqlx::types::Uuid as PgHasArrayType>::array_type_info()
    }

    fn array_compatible(ty: &PgTypeInfo) -> bool {
        <sqlx::types::Uuid as PgHasArrayType>::array_compatible(ty)
    }
}
