use super::{audit, created, deleted, invalid, ok, read_error, write_error, JsonResponse};
use crate::api::auth::AdminUser;
use crate::db::models::{DeleteResponse, NewNotification, Notification, SendNotificationParams};
use crate::db::DbClient;
use crate::logging::log_to_file;
use crate::validation::validate_notification;
use axum::{
    extract::{Path, State},
    Extension, Json,
};
use serde_json::json;
use uuid::Uuid;

/// # Endpoint: GET /notifications
///
/// The most recently sent notifications
pub(crate) async fn list_notifications(
    State(db): State<DbClient>,
) -> JsonResponse<Vec<Notification>> {
    match db.list_notifications().await {
        Ok(notifications) => ok(notifications),
        Err(err) => read_error(err, "Failed to list notifications"),
    }
}

/// # Endpoint: POST /notifications
pub(crate) async fn send_notification(
    State(db): State<DbClient>,
    Extension(admin): Extension<AdminUser>,
    Json(payload): Json<SendNotificationParams>,
) -> JsonResponse<Notification> {
    log_to_file(
        "POST",
        "/notifications",
        Some(&json!({ "title": payload.title, "audience": payload.target_audience })),
    );

    if let Err(e) = validate_notification(&payload) {
        return invalid(e);
    }

    match db.send_notification(&NewNotification::from(payload)).await {
        Ok(notification) => {
            audit(
                &db,
                admin,
                "send_notification",
                "app_notifications",
                Some(notification.id.to_string()),
                Some(json!({
                    "title": notification.title,
                    "target_audience": notification.target_audience,
                })),
            )
            .await;
            created(notification)
        }
        Err(err) => write_error(err, "Failed to send notification"),
    }
}

/// # Endpoint: DELETE /notifications/:id
pub(crate) async fn delete_notification(
    State(db): State<DbClient>,
    Extension(admin): Extension<AdminUser>,
    Path(notification_id): Path<Uuid>,
) -> JsonResponse<DeleteResponse> {
    log_to_file("DELETE", &format!("/notifications/{notification_id}"), None);

    match db.delete_notification(notification_id).await {
        Ok(count) => {
            if count > 0 {
                audit(
                    &db,
                    admin,
                    "delete_notification",
                    "app_notifications",
                    Some(notification_id.to_string()),
                    None,
                )
                .await;
            }
            deleted(count)
        }
        Err(err) => write_error(err, "Failed to delete notification"),
    }
}
