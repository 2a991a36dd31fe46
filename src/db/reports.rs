use super::{filter_value, DbClient};
use crate::db::models::{Report, UpdateReportParams};
use crate::Result;
use diesel::{expression_methods::ExpressionMethods, query_dsl::QueryDsl, SelectableHelper};
use diesel_async::RunQueryDsl;
use tracing::info;
use uuid::Uuid;

/// Reports screen opens on the queue still waiting for triage
pub const DEFAULT_REPORT_STATUS: &str = "pending";

impl DbClient {
    /// Reports newest first. `None` means pending; `all` disables the filter.
    pub async fn list_reports(&self, report_status: Option<&str>) -> Result<Vec<Report>> {
        use crate::schema::user_reports::dsl::*;

        let mut query = user_reports.into_boxed();
        let requested = report_status.unwrap_or(DEFAULT_REPORT_STATUS);
        if let Some(value) = filter_value(Some(requested)) {
            query = query.filter(status.eq(value));
        }

        let conn = &mut self.get_db_conn().await?;
        query
            .order(created_at.desc())
            .select(Report::as_select())
            .load::<Report>(conn)
            .await
            .map_err(Into::into)
    }

    pub async fn update_report(&self, report_id: Uuid, params: &UpdateReportParams) -> Result<Report> {
        use crate::schema::user_reports::dsl::*;

        let conn = &mut self.get_db_conn().await?;
        let updated = diesel::update(user_reports.filter(id.eq(report_id)))
            .set((status.eq(&params.status), admin_note.eq(&params.admin_note)))
            .returning(Report::as_returning())
            .get_result::<Report>(conn)
            .await?;
        info!("Report {} moved to {}", updated.id, updated.status);
        Ok(updated)
    }
}
