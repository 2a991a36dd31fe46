use super::{audit, created, deleted, invalid, ok, read_error, write_error, JsonResponse};
use crate::api::auth::AdminUser;
use crate::db::models::{Banner, CreateBannerParams, DeleteResponse, NewBanner};
use crate::db::DbClient;
use crate::logging::log_to_file;
use crate::validation::validate_banner;
use axum::{
    extract::{Path, State},
    Extension, Json,
};
use serde_json::json;
use uuid::Uuid;

/// # Endpoint: GET /banners
pub(crate) async fn list_banners(State(db): State<DbClient>) -> JsonResponse<Vec<Banner>> {
    match db.list_banners().await {
        Ok(banners) => ok(banners),
        Err(err) => read_error(err, "Failed to list banners"),
    }
}

/// # Endpoint: POST /banners
pub(crate) async fn create_banner(
    State(db): State<DbClient>,
    Extension(admin): Extension<AdminUser>,
    Json(payload): Json<CreateBannerParams>,
) -> JsonResponse<Banner> {
    log_to_file("POST", "/banners", Some(&json!({ "title": payload.title })));

    if let Err(e) = validate_banner(&payload) {
        return invalid(e);
    }

    match db.create_banner(&NewBanner::from(payload)).await {
        Ok(banner) => {
            audit(
                &db,
                admin,
                "create_banner",
                "app_banners",
                Some(banner.id.to_string()),
                Some(json!({ "title": banner.title })),
            )
            .await;
            created(banner)
        }
        Err(err) => write_error(err, "Failed to create banner"),
    }
}

/// # Endpoint: PATCH /banners/:id/toggle
pub(crate) async fn toggle_banner(
    State(db): State<DbClient>,
    Extension(admin): Extension<AdminUser>,
    Path(banner_id): Path<Uuid>,
) -> JsonResponse<Banner> {
    log_to_file("PATCH", &format!("/banners/{banner_id}/toggle"), None);

    match db.toggle_banner(banner_id).await {
        Ok(banner) => {
            audit(
                &db,
                admin,
                "toggle_banner",
                "app_banners",
                Some(banner_id.to_string()),
                Some(json!({ "is_active": banner.is_active })),
            )
            .await;
            ok(banner)
        }
        Err(err) => write_error(err, "Failed to toggle banner"),
    }
}

/// # Endpoint: DELETE /banners/:id
pub(crate) async fn delete_banner(
    State(db): State<DbClient>,
    Extension(admin): Extension<AdminUser>,
    Path(banner_id): Path<Uuid>,
) -> JsonResponse<DeleteResponse> {
    log_to_file("DELETE", &format!("/banners/{banner_id}"), None);

    match db.delete_banner(banner_id).await {
        Ok(count) => {
            if count > 0 {
                audit(
                    &db,
                    admin,
                    "delete_banner",
                    "app_banners",
                    Some(banner_id.to_string()),
                    None,
                )
                .await;
            }
            deleted(count)
        }
        Err(err) => write_error(err, "Failed to delete banner"),
    }
}
