use super::{attachment, audit, deleted, invalid, ok, read_error, write_error, JsonResponse};
use crate::api::auth::AdminUser;
use crate::db::models::{
    DeleteResponse, MessageResponse, Page, User, UserDetailResponse, UserListParams,
};
use crate::db::{browser::BrowsableTable, DbClient};
use crate::logging::log_to_file;
use crate::services::csv_export::{export_file_name, rows_to_csv};
use crate::validation::{validate_one_of, PLANS};
use axum::{
    extract::{Path, Query, State},
    response::{IntoResponse, Response},
    Extension,
};
use chrono::Utc;
use tracing::info;
use uuid::Uuid;

/// # Endpoint: GET /users
///
/// Query: `page`, `page_size`, `plan` (`all` or a plan name), `search` over name, phone and email
pub(crate) async fn list_users(
    State(db): State<DbClient>,
    Query(params): Query<UserListParams>,
) -> JsonResponse<Page<User>> {
    if let Some(plan) = params.plan.as_deref().filter(|p| *p != "all") {
        if let Err(e) = validate_one_of("plan", plan, &PLANS) {
            return invalid(e);
        }
    }

    match db.list_users(&params).await {
        Ok(page) => ok(page),
        Err(err) => read_error(err, "Failed to list users"),
    }
}

/// # Endpoint: GET /users/:id
pub(crate) async fn get_user(
    State(db): State<DbClient>,
    Path(user_id): Path<Uuid>,
) -> JsonResponse<UserDetailResponse> {
    match db.get_user_detail(user_id).await {
        Ok(detail) => ok(detail),
        Err(err) => read_error(err, "Failed to load user detail"),
    }
}

/// # Endpoint: DELETE /users/:id
pub(crate) async fn delete_user(
    State(db): State<DbClient>,
    Extension(admin): Extension<AdminUser>,
    Path(user_id): Path<Uuid>,
) -> JsonResponse<DeleteResponse> {
    log_to_file("DELETE", &format!("/users/{user_id}"), None);

    match db.delete_user(user_id).await {
        Ok(count) => {
            if count > 0 {
                audit(&db, admin, "delete_user", "users", Some(user_id.to_string()), None).await;
            }
            deleted(count)
        }
        Err(err) => write_error(err, "Failed to delete user"),
    }
}

/// # Endpoint: GET /users/export
///
/// Every user as a CSV download
pub(crate) async fn export_users(State(db): State<DbClient>) -> Response {
    let users = match db.export_table(BrowsableTable::Users).await {
        Ok(users) => users,
        Err(err) => return read_error::<()>(err, "Failed to export users").into_response(),
    };

    info!("Exporting {} users", users.len());
    match rows_to_csv(&users) {
        Some(csv) => attachment(
            "text/csv; charset=utf-8",
            &export_file_name("users", Utc::now()),
            csv,
        ),
        None => ok(MessageResponse::success("No users to export")).into_response(),
    }
}
