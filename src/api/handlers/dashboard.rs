use super::{attachment, ok, read_error, JsonResponse};
use crate::db::analytics::AnalyticsRange;
use crate::db::models::{AnalyticsParams, AnalyticsReport, DashboardStats};
use crate::db::DbClient;
use crate::services::analytics_report::render_report;
use crate::Result;
use axum::{
    extract::{Query, State},
    response::{IntoResponse, Response},
};
use tracing::info;

/// Missing range means the default window
fn requested_range(params: &AnalyticsParams) -> Result<AnalyticsRange> {
    params
        .range
        .as_deref()
        .map_or(Ok(AnalyticsRange::default()), str::parse)
}

/// # Endpoint: GET /dashboard/stats
///
/// Totals of users, tests and questions plus users active in the last week.
/// Any failed counter fails the whole response.
pub(crate) async fn get_dashboard_stats(
    State(db): State<DbClient>,
) -> JsonResponse<DashboardStats> {
    match db.get_dashboard_stats().await {
        Ok(stats) => ok(stats),
        Err(err) => read_error(err, "Failed to load dashboard stats"),
    }
}

/// # Endpoint: GET /analytics?range=7days|30days|90days|1year
pub(crate) async fn get_analytics(
    State(db): State<DbClient>,
    Query(params): Query<AnalyticsParams>,
) -> JsonResponse<AnalyticsReport> {
    let range = match requested_range(&params) {
        Ok(range) => range,
        Err(err) => return read_error(err, "Bad analytics range"),
    };

    match db.get_analytics(range).await {
        Ok(report) => ok(report),
        Err(err) => read_error(err, "Failed to load analytics"),
    }
}

/// # Endpoint: GET /analytics/export?range=...
///
/// The analytics summary as a text download
pub(crate) async fn export_analytics(
    State(db): State<DbClient>,
    Query(params): Query<AnalyticsParams>,
) -> Response {
    let range = match requested_range(&params) {
        Ok(range) => range,
        Err(err) => return read_error::<()>(err, "Bad analytics range").into_response(),
    };

    match db.get_analytics(range).await {
        Ok(report) => {
            info!("Exporting {} analytics report", range.as_str());
            let file_name = format!(
                "analytics-report-{}-{}.txt",
                range.as_str(),
                report.generated_at.timestamp_millis()
            );
            attachment("text/plain; charset=utf-8", &file_name, render_report(&report))
        }
        Err(err) => read_error::<()>(err, "Failed to export analytics").into_response(),
    }
}
