use super::{audit, deleted, invalid, ok, read_error, write_error, JsonResponse};
use crate::api::auth::AdminUser;
use crate::db::models::{BulkDeleteParams, DeleteResponse, NewsItem, Page, SearchPageParams};
use crate::db::DbClient;
use crate::logging::log_to_file;
use axum::{
    extract::{Path, Query, State},
    Extension, Json,
};
use serde_json::json;
use uuid::Uuid;

/// # Endpoint: GET /news
pub(crate) async fn list_news(
    State(db): State<DbClient>,
    Query(params): Query<SearchPageParams>,
) -> JsonResponse<Page<NewsItem>> {
    match db.list_news(&params).await {
        Ok(page) => ok(page),
        Err(err) => read_error(err, "Failed to list news"),
    }
}

/// # Endpoint: DELETE /news/:id
pub(crate) async fn delete_news_item(
    State(db): State<DbClient>,
    Extension(admin): Extension<AdminUser>,
    Path(news_id): Path<Uuid>,
) -> JsonResponse<DeleteResponse> {
    log_to_file("DELETE", &format!("/news/{news_id}"), None);

    match db.delete_news(&[news_id]).await {
        Ok(count) => {
            if count > 0 {
                audit(&db, admin, "delete_news", "news", Some(news_id.to_string()), None).await;
            }
            deleted(count)
        }
        Err(err) => write_error(err, "Failed to delete news item"),
    }
}

/// # Endpoint: POST /news/bulk-delete
pub(crate) async fn bulk_delete_news(
    State(db): State<DbClient>,
    Extension(admin): Extension<AdminUser>,
    Json(payload): Json<BulkDeleteParams>,
) -> JsonResponse<DeleteResponse> {
    log_to_file("POST", "/news/bulk-delete", Some(&json!({ "ids": payload.ids })));

    if payload.ids.is_empty() {
        return invalid("ids must not be empty");
    }

    match db.delete_news(&payload.ids).await {
        Ok(count) => {
            if count > 0 {
                audit(
                    &db,
                    admin,
                    "bulk_delete_news",
                    "news",
                    None,
                    Some(json!({ "ids": payload.ids, "deleted": count })),
                )
                .await;
            }
            deleted(count)
        }
        Err(err) => write_error(err, "Failed to delete news"),
    }
}
