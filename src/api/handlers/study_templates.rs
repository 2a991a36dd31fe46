use super::{audit, created, deleted, invalid, ok, read_error, write_error, JsonResponse};
use crate::api::auth::AdminUser;
use crate::db::models::{
    CreateTemplateParams, DeleteResponse, NewStudyTemplate, StudyTemplate, TemplateChangeset,
    TemplateListParams, TemplateListResponse, UpdateTemplateParams,
};
use crate::db::study_templates::TEMPLATE_SORT_COLUMNS;
use crate::db::DbClient;
use crate::errors::ApiError;
use crate::logging::log_to_file;
use crate::validation::{validate_sort_column, validate_template, validate_template_changes};
use axum::{
    extract::{Path, Query, State},
    Extension, Json,
};
use serde_json::json;
use uuid::Uuid;

/// # Endpoint: GET /templates
///
/// Query: `search` (title), `sort` (`created_at` or `title`), `order` (`asc`/`desc`)
pub(crate) async fn list_templates(
    State(db): State<DbClient>,
    Query(params): Query<TemplateListParams>,
) -> JsonResponse<TemplateListResponse> {
    if let Some(column) = params.sort.as_deref() {
        if let Err(e) = validate_sort_column(column, &TEMPLATE_SORT_COLUMNS) {
            return invalid(e);
        }
    }

    match db.list_templates(&params).await {
        Ok(items) => ok(TemplateListResponse { items }),
        Err(err) => read_error(err, "Failed to list study templates"),
    }
}

/// # Endpoint: POST /templates
pub(crate) async fn create_template(
    State(db): State<DbClient>,
    Extension(admin): Extension<AdminUser>,
    Json(payload): Json<CreateTemplateParams>,
) -> JsonResponse<StudyTemplate> {
    log_to_file(
        "POST",
        "/templates",
        Some(&json!({ "title": payload.title, "tasks": payload.tasks.len() })),
    );

    if let Err(e) = validate_template(&payload) {
        return invalid(e);
    }
    let template = match NewStudyTemplate::try_from(payload) {
        Ok(template) => template,
        Err(err) => return write_error(ApiError::Json(err), "Failed to encode template tasks"),
    };

    match db.create_template(&template).await {
        Ok(template) => {
            audit(
                &db,
                admin,
                "create_template",
                "study_templates",
                Some(template.id.to_string()),
                Some(json!({ "title": template.title })),
            )
            .await;
            created(template)
        }
        Err(err) => write_error(err, "Failed to create study template"),
    }
}

/// # Endpoint: PUT /templates/:id
pub(crate) async fn update_template(
    State(db): State<DbClient>,
    Extension(admin): Extension<AdminUser>,
    Path(template_id): Path<Uuid>,
    Json(payload): Json<UpdateTemplateParams>,
) -> JsonResponse<StudyTemplate> {
    log_to_file("PUT", &format!("/templates/{template_id}"), None);

    if let Err(e) = validate_template_changes(&payload) {
        return invalid(e);
    }
    let changes = match TemplateChangeset::try_from(payload) {
        Ok(changes) => changes,
        Err(err) => return write_error(ApiError::Json(err), "Failed to encode template tasks"),
    };

    match db.update_template(template_id, &changes).await {
        Ok(template) => {
            audit(
                &db,
                admin,
                "update_template",
                "study_templates",
                Some(template_id.to_string()),
                None,
            )
            .await;
            ok(template)
        }
        Err(err) => write_error(err, "Failed to update study template"),
    }
}

/// # Endpoint: POST /templates/:id/duplicate
pub(crate) async fn duplicate_template(
    State(db): State<DbClient>,
    Extension(admin): Extension<AdminUser>,
    Path(template_id): Path<Uuid>,
) -> JsonResponse<StudyTemplate> {
    log_to_file("POST", &format!("/templates/{template_id}/duplicate"), None);

    match db.duplicate_template(template_id).await {
        Ok(copy) => {
            audit(
                &db,
                admin,
                "duplicate_template",
                "study_templates",
                Some(copy.id.to_string()),
                Some(json!({ "source": template_id })),
            )
            .await;
            created(copy)
        }
        Err(err) => write_error(err, "Failed to duplicate study template"),
    }
}

/// # Endpoint: DELETE /templates/:id
pub(crate) async fn delete_template(
    State(db): State<DbClient>,
    Extension(admin): Extension<AdminUser>,
    Path(template_id): Path<Uuid>,
) -> JsonResponse<DeleteResponse> {
    log_to_file("DELETE", &format!("/templates/{template_id}"), None);

    match db.delete_template(template_id).await {
        Ok(count) => {
            if count > 0 {
                audit(
                    &db,
                    admin,
                    "delete_template",
                    "study_templates",
                    Some(template_id.to_string()),
                    None,
                )
                .await;
            }
            deleted(count)
        }
        Err(err) => write_error(err, "Failed to delete study template"),
    }
}
