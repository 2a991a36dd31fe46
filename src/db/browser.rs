use super::{search_pattern, CountRow, DbClient, JsonRow};
use crate::db::models::{Page, SearchPageParams};
use crate::errors::ApiError;
use crate::Result;
use diesel::pg::Pg;
use diesel::sql_query;
use diesel::sql_types::{Array, BigInt, Text};
use diesel_async::RunQueryDsl;
use serde_json::Value;
use std::fmt;
use std::str::FromStr;
use tracing::info;
use uuid::Uuid;

pub const BROWSER_PAGE_SIZE: i64 = 50;

/// Tables the raw database browser may read and delete from
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BrowsableTable {
    Users,
    Tests,
    Questions,
    Content,
    TestAttempts,
    Payments,
    News,
    UserReports,
    AuditLogs,
    AppBanners,
    AppNotifications,
}

impl BrowsableTable {
    pub const ALL: [BrowsableTable; 11] = [
        BrowsableTable::Users,
        BrowsableTable::Tests,
        BrowsableTable::Questions,
        BrowsableTable::Content,
        BrowsableTable::TestAttempts,
        BrowsableTable::Payments,
        BrowsableTable::News,
        BrowsableTable::UserReports,
        BrowsableTable::AuditLogs,
        BrowsableTable::AppBanners,
        BrowsableTable::AppNotifications,
    ];

    pub fn name(&self) -> &'static str {
        match self {
            BrowsableTable::Users => "users",
            BrowsableTable::Tests => "tests",
            BrowsableTable::Questions => "questions",
            BrowsableTable::Content => "content",
            BrowsableTable::TestAttempts => "test_attempts",
            BrowsableTable::Payments => "payments",
            BrowsableTable::News => "news",
            BrowsableTable::UserReports => "user_reports",
            BrowsableTable::AuditLogs => "audit_logs",
            BrowsableTable::AppBanners => "app_banners",
            BrowsableTable::AppNotifications => "app_notifications",
        }
    }

    /// Columns matched by the browser search box; None when the table is not searchable
    pub fn search_columns(&self) -> Option<&'static [&'static str]> {
        match self {
            BrowsableTable::Users => Some(&["name", "email"]),
            BrowsableTable::Tests => Some(&["title", "description"]),
            BrowsableTable::Questions => Some(&["question_text", "question_text_hi"]),
            BrowsableTable::Content => Some(&["title", "title_hi"]),
            _ => None,
        }
    }

    /// `WHERE` clause for a search bound as `$1`
    fn search_clause(&self) -> Result<String> {
        let columns = self.search_columns().ok_or_else(|| {
            ApiError::Validation(format!("Search is not supported for table '{}'", self))
        })?;
        let matches: Vec<String> = columns
            .iter()
            .map(|column| format!("t.{column} ILIKE $1"))
            .collect();
        Ok(format!("WHERE {}", matches.join(" OR ")))
    }
}

impl fmt::Display for BrowsableTable {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for BrowsableTable {
    type Err = ApiError;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        BrowsableTable::ALL
            .into_iter()
            .find(|table| table.name() == s)
            .ok_or_else(|| ApiError::Validation(format!("Table '{s}' cannot be browsed")))
    }
}

/// Browser search text with commas removed, as an ILIKE pattern
pub fn browser_search(term: Option<&str>) -> Option<String> {
    let cleaned = term.map(|t| t.replace(',', ""));
    search_pattern(cleaned.as_deref())
}

impl DbClient {
    pub async fn browse_table(
        &self,
        table: BrowsableTable,
        params: &SearchPageParams,
    ) -> Result<Page<Value>> {
        let page = params.page_params().resolve(BROWSER_PAGE_SIZE);
        let pattern = browser_search(params.search.as_deref());

        let (where_clause, limit_param, offset_param) = match pattern {
            Some(_) => (table.search_clause()?, "$2", "$3"),
            None => (String::new(), "$1", "$2"),
        };

        let count_sql = format!("SELECT COUNT(*) AS count FROM {table} t {where_clause}");
        let rows_sql = format!(
            "SELECT row_to_json(t) AS row FROM {table} t {where_clause} \
             ORDER BY t.created_at DESC LIMIT {limit_param} OFFSET {offset_param}"
        );

        let mut count_query = sql_query(count_sql).into_boxed::<Pg>();
        let mut rows_query = sql_query(rows_sql).into_boxed::<Pg>();
        if let Some(pattern) = pattern {
            count_query = count_query.bind::<Text, _>(pattern.clone());
            rows_query = rows_query.bind::<Text, _>(pattern);
        }
        let rows_query = rows_query
            .bind::<BigInt, _>(page.page_size)
            .bind::<BigInt, _>(page.offset());

        let conn = &mut self.get_db_conn().await?;
        let total = count_query.get_result::<CountRow>(conn).await?.count;
        let items = rows_query
            .load::<JsonRow>(conn)
            .await?
            .into_iter()
            .map(|r| r.row)
            .collect();

        Ok(Page {
            items,
            page: page.page,
            page_size: page.page_size,
            total,
            total_pages: page.total_pages(total),
        })
    }

    /// Every row of a table, newest first, for CSV export
    pub async fn export_table(&self, table: BrowsableTable) -> Result<Vec<Value>> {
        let conn = &mut self.get_db_conn().await?;
        let rows = sql_query(format!(
            "SELECT row_to_json(t) AS row FROM {table} t ORDER BY t.created_at DESC"
        ))
        .load::<JsonRow>(conn)
        .await?;

        info!("Exporting {} rows from {}", rows.len(), table);
        Ok(rows.into_iter().map(|r| r.row).collect())
    }

    pub async fn delete_table_rows(&self, table: BrowsableTable, ids: &[Uuid]) -> Result<usize> {
        let conn = &mut self.get_db_conn().await?;
        let deleted = sql_query(format!("DELETE FROM {table} WHERE id = ANY($1)"))
            .bind::<Array<diesel::sql_types::Uuid>, _>(ids)
            .execute(conn)
            .await?;

        info!("Deleted {} rows from {}", deleted, table);
        Ok(deleted)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_table_whitelist() {
        for table in BrowsableTable::ALL {
            assert_eq!(table.name().parse::<BrowsableTable>().unwrap(), table);
        }
        assert!(matches!(
            "settings".parse::<BrowsableTable>(),
            Err(ApiError::Validation(_))
        ));
        assert!("users; drop table users".parse::<BrowsableTable>().is_err());
    }

    #[test]
    fn test_search_clause() {
        assert_eq!(
            BrowsableTable::Users.search_clause().unwrap(),
            "WHERE t.name ILIKE $1 OR t.email ILIKE $1"
        );
        assert!(matches!(
            BrowsableTable::Payments.search_clause(),
            Err(ApiError::Validation(_))
        ));
    }

    #[test]
    fn test_browser_search_strips_commas() {
        assert_eq!(browser_search(Some("a,b")), Some("%ab%".to_string()));
        assert_eq!(browser_search(Some(",,,")), None);
        assert_eq!(browser_search(None), None);
    }
}
