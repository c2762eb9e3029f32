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

use fsu_uuid::dcim::DeviceTypeId;
use fsu_uuid::fsu::FsuTemplateId;
use model::fsu_kind::FsuKind;
use model::fsu_template::{FsuTemplate, NewFsuTemplate};
use model::validation::FsuValidationError;
use sqlx::PgConnection;

use crate::{DatabaseError, DatabaseResult, dcim, fsu_type};

pub async fn create(
    txn: &mut PgConnection,
    id: FsuTemplateId,
    new_template: &NewFsuTemplate,
) -> DatabaseResult<FsuTemplate> {
    new_template.validate()?;
    fsu_type::load_for_kind(txn, new_template.fsu_type_id, new_template.kind).await?;
    if dcim::find_device_type(txn, new_template.device_type_id)
        .await?
        .is_none()
    {
        return Err(FsuValidationError::UnknownReference {
            field: "device_type",
            id: new_template.device_type_id.to_string(),
        }
        .into());
    }

    let fields = new_template.fields.clone().normalized_for(new_template.kind);
    let query = "INSERT INTO fsu_templates
                (id, kind, name, fsu_type_id, device_type_id, description, pci_slot_id, redundant, slot_id)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9)
            RETURNING *";

    sqlx::query_as(query)
        .bind(id)
        .bind(new_template.kind)
        .bind(&new_template.name)
        .bind(new_template.fsu_type_id)
        .bind(new_template.device_type_id)
        .bind(&new_template.description)
        .bind(&fields.pci_slot_id)
        .bind(fields.redundant)
        .bind(&fields.slot_id)
        .fetch_one(txn)
        .await
        .map_err(|e| DatabaseError::query(query, e))
}

pub async fn find(
    txn: &mut PgConnection,
    id: FsuTemplateId,
) -> DatabaseResult<Option<FsuTemplate>> {
    let query = "SELECT * FROM fsu_templates WHERE id = $1";
    sqlx::query_as(query)
        .bind(id)
        .fetch_optional(txn)
        .await
        .map_err(|e| DatabaseError::query(query, e))
}

pub async fn find_by_kind(
    txn: &mut PgConnection,
    kind: FsuKind,
) -> DatabaseResult<Vec<FsuTemplate>> {
    let query = "SELECT * FROM fsu_templates WHERE kind = $1 ORDER BY name";
    sqlx::query_as(query)
        .bind(kind)
        .fetch_all(txn)
        .await
        .map_err(|e| DatabaseError::query(query, e))
}

/// All templates of a device type, ordered by kind and name.
pub async fn find_by_device_type(
    txn: &mut PgConnection,
    device_type_id: DeviceTypeId,
) -> DatabaseResult<Vec<FsuTemplate>> {
    let query = "SELECT * FROM fsu_templates WHERE device_type_id = $1 ORDER BY kind, name";
    sqlx::query_as(query)
        .bind(device_type_id)
        .fetch_all(txn)
        .await
        .map_err(|e| DatabaseError::query(query, e))
}

pub async fn delete(
    txn: &mut PgConnection,
    kind: FsuKind,
    id: FsuTemplateId,
) -> DatabaseResult<()> {
    let query = "DELETE FROM fsu_templates WHERE id = $1 AND kind = $2";
    let result = sqlx::query(query)
        .bind(id)
        .bind(kind)
        .execute(txn)
        .await
        .map_err(|e| DatabaseError::delete(query, "fsu template", id.to_string(), e))?;

    if result.rows_affected() == 0 {
        return Err(DatabaseError::NotFoundError {
            kind: "fsu template",
            id: id.to_string(),
        });
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use model::fsu::KindFields;

    use super::*;
    use crate::tests::{dgx_device_type, fan_type, ovx_device_type, psu_type};

    fn psu_template(name: &str) -> NewFsuTemplate {
        NewFsuTemplate {
            kind: FsuKind::Psu,
            name: name.to_string(),
            fsu_type_id: psu_type(),
            device_type_id: dgx_device_type(),
            description: "rear".to_string(),
            fields: KindFields::default(),
        }
    }

    #[crate::sqlx_test(fixtures("dcim", "fsu_types"))]
    async fn template_crud(pool: sqlx::PgPool) {
        let mut txn = pool.begin().await.unwrap();

        let psu = create(&mut txn, FsuTemplateId::new(), &psu_template("PSU1"))
            .await
            .unwrap();
        assert_eq!(psu.fields.redundant, Some(false));
        assert_eq!(find(&mut txn, psu.id).await.unwrap(), Some(psu.clone()));

        let err = create(&mut txn, FsuTemplateId::new(), &psu_template("PSU1"))
            .await
            .unwrap_err();
        let DatabaseError::Validation(errors) = err else {
            panic!("unexpected error: {err:?}");
        };
        assert_eq!(
            errors.get("name").unwrap(),
            ["A template with this name already exists for this device type."]
        );

        assert_eq!(
            find_by_device_type(&mut txn, dgx_device_type()).await.unwrap(),
            vec![psu.clone()]
        );
        assert!(
            find_by_device_type(&mut txn, ovx_device_type())
                .await
                .unwrap()
                .is_empty()
        );

        delete(&mut txn, FsuKind::Psu, psu.id).await.unwrap();
        assert!(find_by_kind(&mut txn, FsuKind::Psu).await.unwrap().is_empty());
    }

    #[crate::sqlx_test(fixtures("dcim", "fsu_types"))]
    async fn template_type_must_match_kind(pool: sqlx::PgPool) {
        let mut txn = pool.begin().await.unwrap();

        let mut template = psu_template("PSU1");
        template.fsu_type_id = fan_type();
        let err = create(&mut txn, FsuTemplateId::new(), &template)
            .await
            .unwrap_err();
        let DatabaseError::Validation(errors) = err else {
            panic!("unexpected error: {err:?}");
        };
        assert_eq!(
            errors.get("fsu_type").unwrap(),
            ["Fan 80mm is a Fan type, expected a PSU type"]
        );
    }
}
