use super::{audit, invalid, ok, read_error, write_error, JsonResponse};
use crate::api::auth::AdminUser;
use crate::db::models::{Report, ReportListParams, UpdateReportParams};
use crate::db::DbClient;
use crate::logging::log_to_file;
use crate::validation::{validate_one_of, validate_report_update, REPORT_STATUSES};
use axum::{
    extract::{Path, Query, State},
    Extension, Json,
};
use serde_json::json;
use uuid::Uuid;

/// # Endpoint: GET /reports
///
/// Query: `status`, defaulting to `pending`; `all` lists every report
pub(crate) async fn list_reports(
    State(db): State<DbClient>,
    Query(params): Query<ReportListParams>,
) -> JsonResponse<Vec<Report>> {
    if let Some(status) = params.status.as_deref().filter(|s| *s != "all") {
        if let Err(e) = validate_one_of("status", status, &REPORT_STATUSES) {
            return invalid(e);
        }
    }

    match db.list_reports(params.status.as_deref()).await {
        Ok(reports) => ok(reports),
        Err(err) => read_error(err, "Failed to list reports"),
    }
}

/// # Endpoint: PUT /reports/:id
pub(crate) async fn update_report(
    State(db): State<DbClient>,
    Extension(admin): Extension<AdminUser>,
    Path(report_id): Path<Uuid>,
    Json(payload): Json<UpdateReportParams>,
) -> JsonResponse<Report> {
    log_to_file(
        "PUT",
        &format!("/reports/{report_id}"),
        Some(&json!({ "status": payload.status })),
    );

    if let Err(e) = validate_report_update(&payload) {
        return invalid(e);
    }

    match db.update_report(report_id, &payload).await {
        Ok(report) => {
            audit(
                &db,
                admin,
                "update_report",
                "user_reports",
                Some(report_id.to_string()),
                Some(json!({ "status": report.status, "admin_note": report.admin_note })),
            )
            .await;
            ok(report)
        }
        Err(err) => write_error(err, "Failed to update report"),
    }
}
