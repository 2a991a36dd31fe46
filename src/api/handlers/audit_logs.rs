use super::{ok, read_error, JsonResponse};
use crate::db::models::{AuditLog, LoginLogsResponse, Page, SearchPageParams};
use crate::db::DbClient;
use axum::extract::{Query, State};

/// # Endpoint: GET /audit-logs
///
/// Newest first; `search` matches the action name
pub(crate) async fn list_audit_logs(
    State(db): State<DbClient>,
    Query(params): Query<SearchPageParams>,
) -> JsonResponse<Page<AuditLog>> {
    match db.list_audit_logs(&params).await {
        Ok(page) => ok(page),
        Err(err) => read_error(err, "Failed to list audit logs"),
    }
}

/// # Endpoint: GET /login-logs
///
/// The ten latest admin sign-ins and the number of admins active in the last 24 hours
pub(crate) async fn list_login_logs(State(db): State<DbClient>) -> JsonResponse<LoginLogsResponse> {
    match db.list_login_logs().await {
        Ok(logs) => ok(logs),
        Err(err) => read_error(err, "Failed to list login logs"),
    }
}
