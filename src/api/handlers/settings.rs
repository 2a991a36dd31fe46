use super::{audit, error_response, invalid, ok, read_error, write_error, JsonResponse};
use crate::api::auth::AdminUser;
use crate::db::models::{
    GrantAdminParams, MessageResponse, SaveSettingsParams, SettingsResponse, User,
};
use crate::db::DbClient;
use crate::logging::{log_to_file, ACTION_LOG_TARGET};
use crate::validation::validate_required;
use axum::{
    extract::{Path, State},
    http::StatusCode,
    Extension, Json,
};
use serde_json::json;
use tracing::info;
use uuid::Uuid;

/// # Endpoint: GET /settings
pub(crate) async fn get_settings(State(db): State<DbClient>) -> JsonResponse<SettingsResponse> {
    match db.get_settings().await {
        Ok(settings) => ok(SettingsResponse { settings }),
        Err(err) => read_error(err, "Failed to load settings"),
    }
}

/// # Endpoint: PUT /settings
///
/// Upserts every given section concurrently
pub(crate) async fn save_settings(
    State(db): State<DbClient>,
    Extension(admin): Extension<AdminUser>,
    Json(payload): Json<SaveSettingsParams>,
) -> JsonResponse<MessageResponse> {
    let sections: Vec<&String> = payload.sections.keys().collect();
    log_to_file("PUT", "/settings", Some(&json!({ "sections": sections })));

    if payload.sections.is_empty() {
        return invalid("sections must not be empty");
    }

    match db.save_settings(&payload.sections).await {
        Ok(saved) => {
            audit(
                &db,
                admin,
                "save_settings",
                "settings",
                None,
                Some(json!({ "sections": sections })),
            )
            .await;
            ok(MessageResponse::success(format!("Saved {saved} settings sections")))
        }
        Err(err) => write_error(err, "Failed to save settings"),
    }
}

/// # Endpoint: GET /settings/admins
pub(crate) async fn list_admins(State(db): State<DbClient>) -> JsonResponse<Vec<User>> {
    match db.list_admins().await {
        Ok(admins) => ok(admins),
        Err(err) => read_error(err, "Failed to list admins"),
    }
}

/// # Endpoint: POST /settings/admins
///
/// Grants admin access to an existing account by email
pub(crate) async fn grant_admin(
    State(db): State<DbClient>,
    Extension(admin): Extension<AdminUser>,
    Json(payload): Json<GrantAdminParams>,
) -> JsonResponse<User> {
    let email = payload.email.trim();
    log_to_file("POST", "/settings/admins", Some(&json!({ "email": email })));

    if let Err(e) = validate_required("email", email) {
        return invalid(e);
    }

    match db.grant_admin(email).await {
        Ok(Some(user)) => {
            info!(target: ACTION_LOG_TARGET, "Admin {} granted admin access to {}", admin.id, user.id);
            audit(
                &db,
                admin,
                "grant_admin",
                "users",
                Some(user.id.to_string()),
                Some(json!({ "email": email })),
            )
            .await;
            ok(user)
        }
        Ok(None) => error_response(
            StatusCode::NOT_FOUND,
            "User not found. They need to sign up first.",
        ),
        Err(err) => write_error(err, "Failed to grant admin access"),
    }
}

/// # Endpoint: DELETE /settings/admins/:id
///
/// Returns the account to the free plan. Admins cannot revoke themselves.
pub(crate) async fn revoke_admin(
    State(db): State<DbClient>,
    Extension(admin): Extension<AdminUser>,
    Path(user_id): Path<Uuid>,
) -> JsonResponse<MessageResponse> {
    log_to_file("DELETE", &format!("/settings/admins/{user_id}"), None);

    if user_id == admin.id {
        return invalid("You cannot revoke your own admin access");
    }

    match db.get_user(user_id).await {
        Ok(user) if user.is_admin() => {}
        Ok(_) => return invalid("User is not an admin"),
        Err(err) => return read_error(err, "Failed to look up admin"),
    }

    match db.revoke_admin(user_id).await {
        Ok(_) => {
            info!(target: ACTION_LOG_TARGET, "Admin {} revoked admin access of {}", admin.id, user_id);
            audit(&db, admin, "revoke_admin", "users", Some(user_id.to_string()), None).await;
            ok(MessageResponse::success("Admin access removed"))
        }
        Err(err) => write_error(err, "Failed to revoke admin access"),
    }
}
