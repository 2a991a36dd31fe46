//! Admin request handlers, one module per resource.
//! Handlers answer with `(StatusCode, Json<ApiResponse<T>>)`; downloads build a raw response.

pub mod audit_logs;
pub mod banners;
pub mod dashboard;
pub mod database;
pub mod exam_tests;
pub mod health;
pub mod import;
pub mod materials;
pub mod news;
pub mod notifications;
pub mod questions;
pub mod reports;
pub mod settings;
pub mod study_templates;
pub mod users;

pub(crate) use audit_logs::{list_audit_logs, list_login_logs};
pub(crate) use banners::{create_banner, delete_banner, list_banners, toggle_banner};
pub(crate) use dashboard::{export_analytics, get_analytics, get_dashboard_stats};
pub(crate) use database::{
    browse_table, bulk_delete_table_rows, delete_table_row, export_table, list_tables,
};
pub(crate) use exam_tests::{
    add_test_questions, create_test, delete_test, get_test, list_tests, remove_test_question,
    update_test,
};
pub(crate) use health::health_check;
pub(crate) use import::{
    download_import_template, get_import_status, preview_import, start_import,
};
pub(crate) use materials::{create_material, delete_material, list_materials, update_material};
pub(crate) use news::{bulk_delete_news, delete_news_item, list_news};
pub(crate) use notifications::{delete_notification, list_notifications, send_notification};
pub(crate) use questions::{
    bulk_delete_questions, create_question, delete_question, get_question, list_questions,
    update_question,
};
pub(crate) use reports::{list_reports, update_report};
pub(crate) use settings::{get_settings, grant_admin, list_admins, revoke_admin, save_settings};
pub(crate) use study_templates::{
    create_template, delete_template, duplicate_template, list_templates, update_template,
};
pub(crate) use users::{delete_user, export_users, get_user, list_users};

use crate::api::auth::AdminUser;
use crate::db::models::{ApiResponse, DeleteResponse, ErrorResponse, NewAuditLog, Status};
use crate::db::DbClient;
use crate::errors::{ApiError, ErrorMessages};
use axum::{
    http::{header, StatusCode},
    response::{IntoResponse, Response},
    Json,
};
use serde_json::Value;
use tracing::{error, warn};

pub(crate) type JsonResponse<T> = (StatusCode, Json<ApiResponse<T>>);

pub(crate) fn ok<T>(body: T) -> JsonResponse<T> {
    (StatusCode::OK, Json(ApiResponse::Success(body)))
}

pub(crate) fn created<T>(body: T) -> JsonResponse<T> {
    (StatusCode::CREATED, Json(ApiResponse::Success(body)))
}

pub(crate) fn accepted<T>(body: T) -> JsonResponse<T> {
    (StatusCode::ACCEPTED, Json(ApiResponse::Success(body)))
}

pub(crate) fn error_response<T>(status: StatusCode, message: impl ToString) -> JsonResponse<T> {
    (
        status,
        Json(
            ErrorResponse {
                status: Status::Error,
                error: message.to_string(),
            }
            .into(),
        ),
    )
}

/// 400 with the validation message
pub(crate) fn invalid<T>(message: impl ToString) -> JsonResponse<T> {
    error_response(StatusCode::BAD_REQUEST, message)
}

/// Maps an error to the HTTP status the admin UI expects
pub(crate) fn status_for(err: &ApiError) -> StatusCode {
    match err {
        ApiError::Diesel(diesel::result::Error::NotFound) => StatusCode::NOT_FOUND,
        // An update with every field absent
        ApiError::Diesel(diesel::result::Error::QueryBuilderError(_))
        | ApiError::Validation(_)
        | ApiError::Csv(_)
        | ApiError::Spreadsheet(_)
        | ApiError::Multipart(_) => StatusCode::BAD_REQUEST,
        _ => StatusCode::INTERNAL_SERVER_ERROR,
    }
}

fn failure<T>(err: ApiError, context: &str, surface_internal: bool) -> JsonResponse<T> {
    let status = status_for(&err);
    let message = match status {
        StatusCode::NOT_FOUND => {
            warn!("{}: {}", context, err);
            ErrorMessages::NotFound.to_string()
        }
        StatusCode::INTERNAL_SERVER_ERROR => {
            error!("{}: {}", context, err);
            if surface_internal {
                err.to_string()
            } else if matches!(err, ApiError::Diesel(_) | ApiError::DbPool(_)) {
                ErrorMessages::DB.to_string()
            } else {
                ErrorMessages::Unexpected.to_string()
            }
        }
        _ => {
            warn!("{}: {}", context, err);
            err.to_string()
        }
    };
    error_response(status, message)
}

/// Failed reads never expose raw database errors
pub(crate) fn read_error<T>(err: ApiError, context: &str) -> JsonResponse<T> {
    failure(err, context, false)
}

/// Failed writes report the underlying message back to the admin
pub(crate) fn write_error<T>(err: ApiError, context: &str) -> JsonResponse<T> {
    failure(err, context, true)
}

/// Delete outcome; zero matched rows is a 404
pub(crate) fn deleted(count: usize) -> JsonResponse<DeleteResponse> {
    if count == 0 {
        return error_response(StatusCode::NOT_FOUND, ErrorMessages::NotFound);
    }
    ok(DeleteResponse {
        status: Status::Success,
        deleted: count,
    })
}

/// Records an admin mutation in `audit_logs`. Failures are logged, never returned.
pub(crate) async fn audit(
    db: &DbClient,
    admin: AdminUser,
    action: &str,
    table: &str,
    record_id: Option<String>,
    details: Option<Value>,
) {
    db.record_audit(NewAuditLog {
        action: action.to_string(),
        table_name: Some(table.to_string()),
        record_id,
        details,
        user_id: admin.id,
    })
    .await;
}

/// File download with `Content-Disposition: attachment`
pub(crate) fn attachment(content_type: &str, file_name: &str, body: impl IntoResponse) -> Response {
    (
        [
            (header::CONTENT_TYPE, content_type.to_string()),
            (
                header::CONTENT_DISPOSITION,
                format!("attachment; filename=\"{file_name}\""),
            ),
        ],
        body,
    )
        .into_response()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_mapping() {
        assert_eq!(
            status_for(&ApiError::Diesel(diesel::result::Error::NotFound)),
            StatusCode::NOT_FOUND
        );
        assert_eq!(
            status_for(&ApiError::Spreadsheet(calamine::Error::Msg("not a workbook"))),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            status_for(&ApiError::Validation("bad".to_string())),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            status_for(&ApiError::Diesel(
                diesel::result::Error::QueryBuilderError("empty".into())
            )),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            status_for(&ApiError::Custom("boom".to_string())),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }

    #[test]
    fn test_read_errors_hide_database_details() {
        let (status, Json(body)) = read_error::<()>(
            ApiError::Diesel(diesel::result::Error::BrokenTransactionManager),
            "listing users",
        );
        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        match body {
            ApiResponse::Error(e) => assert_eq!(e.error, ErrorMessages::DB.to_string()),
            ApiResponse::Success(_) => panic!("expected an error body"),
        }
    }

    #[test]
    fn test_write_errors_surface_message() {
        let (status, Json(body)) =
            write_error::<()>(ApiError::Custom("duplicate slug".to_string()), "creating test");
        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        match body {
            ApiResponse::Error(e) => assert!(e.error.contains("duplicate slug")),
            ApiResponse::Success(_) => panic!("expected an error body"),
        }
    }

    #[test]
    fn test_deleted_zero_rows_is_not_found() {
        let (status, _) = deleted(0);
        assert_eq!(status, StatusCode::NOT_FOUND);
        let (status, Json(body)) = deleted(3);
        assert_eq!(status, StatusCode::OK);
        match body {
            ApiResponse::Success(r) => assert_eq!(r.deleted, 3),
            ApiResponse::Error(_) => panic!("expected success"),
        }
    }

    #[test]
    fn test_attachment_headers() {
        let response = attachment("text/csv", "users-1.csv", "id\n1");
        let headers = response.headers();
        assert_eq!(headers[header::CONTENT_TYPE], "text/csv");
        assert_eq!(
            headers[header::CONTENT_DISPOSITION],
            "attachment; filename=\"users-1.csv\""
        );
    }
}
