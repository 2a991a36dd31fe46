use super::{search_pattern, DbClient};
use crate::db::models::{AuditLog, NewAuditLog, Page, SearchPageParams};
use crate::schema::audit_logs;
use crate::Result;
use diesel::pg::Pg;
use diesel::{
    expression_methods::{ExpressionMethods, PgTextExpressionMethods},
    query_dsl::QueryDsl,
    SelectableHelper,
};
use diesel_async::RunQueryDsl;
use tracing::error;

pub const AUDIT_LOGS_PAGE_SIZE: i64 = 50;

fn filtered_logs<'a>(params: &'a SearchPageParams) -> audit_logs::BoxedQuery<'a, Pg> {
    use crate::schema::audit_logs::dsl::*;

    let mut query = audit_logs.into_boxed();
    if let Some(pattern) = search_pattern(params.search.as_deref()) {
        query = query.filter(action.ilike(pattern));
    }
    query
}

impl DbClient {
    pub async fn list_audit_logs(&self, params: &SearchPageParams) -> Result<Page<AuditLog>> {
        use crate::schema::audit_logs::dsl::*;

        let page = params.page_params().resolve(AUDIT_LOGS_PAGE_SIZE);
        let conn = &mut self.get_db_conn().await?;

        let total = filtered_logs(params).count().get_result::<i64>(conn).await?;
        let items = filtered_logs(params)
            .order(created_at.desc())
            .limit(page.page_size)
            .offset(page.offset())
            .select(AuditLog::as_select())
            .load::<AuditLog>(conn)
            .await?;

        Ok(Page {
            items,
            page: page.page,
            page_size: page.page_size,
            total,
            total_pages: page.total_pages(total),
        })
    }

    pub async fn insert_audit_log(&self, entry: &NewAuditLog) -> Result<usize> {
        use crate::schema::audit_logs::dsl::*;

        let conn = &mut self.get_db_conn().await?;
        diesel::insert_into(audit_logs)
            .values(entry)
            .execute(conn)
            .await
            .map_err(Into::into)
    }

    /// Records an admin action. A failed write is logged and otherwise ignored so the
    /// action itself still succeeds.
    pub async fn record_audit(&self, entry: NewAuditLog) {
        if let Err(err) = self.insert_audit_log(&entry).await {
            error!(
                "Failed to record audit entry {} on {:?} by {}: {}",
                entry.action, entry.table_name, entry.user_id, err
            );
        }
    }
}
