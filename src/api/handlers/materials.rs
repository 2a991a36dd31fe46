use super::{audit, created, deleted, invalid, ok, read_error, write_error, JsonResponse};
use crate::api::auth::AdminUser;
use crate::db::materials::MATERIAL_SORT_COLUMNS;
use crate::db::models::{
    DeleteResponse, Material, MaterialChangeset, MaterialListParams, MaterialListResponse,
    NewMaterial,
};
use crate::db::DbClient;
use crate::logging::log_to_file;
use crate::validation::{validate_material, validate_material_changes, validate_sort_column};
use axum::{
    extract::{Path, Query, State},
    Extension, Json,
};
use serde_json::json;
use uuid::Uuid;

/// # Endpoint: GET /materials
///
/// Query: `type`, `search`, `sort` (whitelisted column), `order` (`asc`/`desc`)
pub(crate) async fn list_materials(
    State(db): State<DbClient>,
    Query(params): Query<MaterialListParams>,
) -> JsonResponse<MaterialListResponse> {
    if let Some(column) = params.sort.as_deref() {
        if let Err(e) = validate_sort_column(column, &MATERIAL_SORT_COLUMNS) {
            return invalid(e);
        }
    }

    match db.list_materials(&params).await {
        Ok(items) => ok(MaterialListResponse { items }),
        Err(err) => read_error(err, "Failed to list materials"),
    }
}

/// # Endpoint: POST /materials
pub(crate) async fn create_material(
    State(db): State<DbClient>,
    Extension(admin): Extension<AdminUser>,
    Json(payload): Json<NewMaterial>,
) -> JsonResponse<Material> {
    log_to_file(
        "POST",
        "/materials",
        Some(&json!({ "title": payload.title, "type": payload.content_type })),
    );

    if let Err(e) = validate_material(&payload) {
        return invalid(e);
    }

    match db.create_material(&payload).await {
        Ok(material) => {
            audit(
                &db,
                admin,
                "create_material",
                "content",
                Some(material.id.to_string()),
                Some(json!({ "title": material.title, "type": material.content_type })),
            )
            .await;
            created(material)
        }
        Err(err) => write_error(err, "Failed to create material"),
    }
}

/// # Endpoint: PUT /materials/:id
pub(crate) async fn update_material(
    State(db): State<DbClient>,
    Extension(admin): Extension<AdminUser>,
    Path(material_id): Path<Uuid>,
    Json(changes): Json<MaterialChangeset>,
) -> JsonResponse<Material> {
    log_to_file("PUT", &format!("/materials/{material_id}"), None);

    if let Err(e) = validate_material_changes(&changes) {
        return invalid(e);
    }

    match db.update_material(material_id, &changes).await {
        Ok(material) => {
            audit(
                &db,
                admin,
                "update_material",
                "content",
                Some(material_id.to_string()),
                None,
            )
            .await;
            ok(material)
        }
        Err(err) => write_error(err, "Failed to update material"),
    }
}

/// # Endpoint: DELETE /materials/:id
pub(crate) async fn delete_material(
    State(db): State<DbClient>,
    Extension(admin): Extension<AdminUser>,
    Path(material_id): Path<Uuid>,
) -> JsonResponse<DeleteResponse> {
    log_to_file("DELETE", &format!("/materials/{material_id}"), None);

    match db.delete_material(material_id).await {
        Ok(count) => {
            if count > 0 {
                audit(
                    &db,
                    admin,
                    "delete_material",
                    "content",
                    Some(material_id.to_string()),
                    None,
                )
                .await;
            }
            deleted(count)
        }
        Err(err) => write_error(err, "Failed to delete material"),
    }
}
