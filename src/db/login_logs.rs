use super::DbClient;
use crate::db::models::{LoginLogEntry, LoginLogsResponse};
use crate::schema::{admin_login_logs, users};
use crate::Result;
use chrono::{DateTime, Duration, Utc};
use diesel::dsl::count_distinct;
use diesel::{
    expression_methods::{ExpressionMethods, NullableExpressionMethods},
    query_dsl::QueryDsl,
};
use diesel_async::RunQueryDsl;
use tracing::error;

const RECENT_LOGINS: i64 = 10;
const ACTIVE_WINDOW_HOURS: i64 = 24;

/// Start of the window in which an admin counts as active
pub fn active_since(now: DateTime<Utc>) -> DateTime<Utc> {
    now - Duration::hours(ACTIVE_WINDOW_HOURS)
}

/// DbClient helper functions for the admin sign-in log
impl DbClient {
    async fn recent_logins(&self) -> Result<Vec<LoginLogEntry>> {
        let conn = &mut self.get_db_conn().await?;
        admin_login_logs::table
            .left_join(users::table)
            .order(admin_login_logs::login_time.desc())
            .limit(RECENT_LOGINS)
            .select((
                admin_login_logs::id,
                admin_login_logs::user_id,
                admin_login_logs::ip_address,
                admin_login_logs::location,
                admin_login_logs::user_agent,
                admin_login_logs::login_time,
                users::email.nullable(),
            ))
            .load::<LoginLogEntry>(conn)
            .await
            .map_err(|e| {
                error!("Failed to fetch login logs: {}", e);
                e.into()
            })
    }

    async fn count_active_admins(&self, since: DateTime<Utc>) -> Result<i64> {
        let conn = &mut self.get_db_conn().await?;
        admin_login_logs::table
            .filter(admin_login_logs::login_time.ge(since))
            .select(count_distinct(admin_login_logs::user_id))
            .get_result::<i64>(conn)
            .await
            .map_err(Into::into)
    }

    /// The latest sign-ins with emails, plus distinct admins seen in the last day
    pub async fn list_login_logs(&self) -> Result<LoginLogsResponse> {
        let (logs, active_admins) = tokio::try_join!(
            self.recent_logins(),
            self.count_active_admins(active_since(Utc::now())),
        )?;
        Ok(LoginLogsResponse {
            logs,
            active_admins,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_active_window_is_one_day() {
        let now = Utc::now();
        assert_eq!(now - active_since(now), Duration::days(1));
    }

    #[tokio::test]
    #[ignore = "requires TEST_DATABASE_URL and TEST_REDIS_URL"]
    async fn test_list_login_logs() {
        dotenv::dotenv().ok();
        let db_url = std::env::var("TEST_DATABASE_URL").unwrap();
        let redis_url = std::env::var("TEST_REDIS_URL").unwrap();
        let client = DbClient::new(&db_url, &redis_url);

        let response = client.list_login_logs().await.unwrap();
        assert!(response.logs.len() as i64 <= RECENT_LOGINS);
        assert!(response.active_admins >= 0);
        assert!(response
            .logs
            .windows(2)
            .all(|pair| pair[0].login_time >= pair[1].login_time));
    }
}
