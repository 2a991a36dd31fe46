use super::{DbClient, JsonRow};
use crate::db::models::{
    AnalyticsReport, ContentMetrics, DashboardStats, RevenueMetrics, TestMetrics, UserMetrics,
};
use crate::errors::ApiError;
use crate::Result;
use chrono::{DateTime, Duration, Utc};
use diesel::dsl::count_star;
use diesel::sql_types::{BigInt, Double, Integer, Timestamptz};
use diesel::{
    expression_methods::ExpressionMethods, query_dsl::QueryDsl, sql_query, QueryableByName,
};
use diesel_async::RunQueryDsl;
use serde_json::Value;
use std::str::FromStr;
use tracing::error;

const ACTIVE_WINDOW_DAYS: i64 = 7;
const POPULAR_TESTS_LIMIT: i32 = 5;

/// Reporting window of the analytics screen
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum AnalyticsRange {
    SevenDays,
    #[default]
    ThirtyDays,
    NinetyDays,
    OneYear,
}

impl AnalyticsRange {
    pub fn days(&self) -> i32 {
        match self {
            AnalyticsRange::SevenDays => 7,
            AnalyticsRange::ThirtyDays => 30,
            AnalyticsRange::NinetyDays => 90,
            AnalyticsRange::OneYear => 365,
        }
    }

    /// Months of revenue history charted for this window
    pub fn revenue_months(&self) -> i32 {
        match self {
            AnalyticsRange::OneYear => 12,
            _ => 6,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            AnalyticsRange::SevenDays => "7days",
            AnalyticsRange::ThirtyDays => "30days",
            AnalyticsRange::NinetyDays => "90days",
            AnalyticsRange::OneYear => "1year",
        }
    }

    pub fn since(&self, now: DateTime<Utc>) -> DateTime<Utc> {
        now - Duration::days(self.days() as i64)
    }
}

impl FromStr for AnalyticsRange {
    type Err = ApiError;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s {
            "7days" => Ok(AnalyticsRange::SevenDays),
            "30days" => Ok(AnalyticsRange::ThirtyDays),
            "90days" => Ok(AnalyticsRange::NinetyDays),
            "1year" => Ok(AnalyticsRange::OneYear),
            other => Err(ApiError::Validation(format!(
                "Unknown range '{other}', expected one of 7days, 30days, 90days, 1year"
            ))),
        }
    }
}

#[derive(Debug, QueryableByName)]
struct AttemptStats {
    #[diesel(sql_type = BigInt)]
    total: i64,
    #[diesel(sql_type = BigInt)]
    completed: i64,
    #[diesel(sql_type = Double)]
    avg_score: f64,
}

#[derive(Debug, QueryableByName)]
struct RevenueTotal {
    #[diesel(sql_type = BigInt)]
    total: i64,
}

fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

/// Share of completed attempts, in percent
fn completion_rate(completed: i64, total: i64) -> f64 {
    if total == 0 {
        0.0
    } else {
        round2(completed as f64 / total as f64 * 100.0)
    }
}

impl DbClient {
    async fn count_users(&self) -> Result<i64> {
        use crate::schema::users::dsl::*;
        let conn = &mut self.get_db_conn().await?;
        users.count().get_result::<i64>(conn).await.map_err(Into::into)
    }

    async fn count_tests(&self) -> Result<i64> {
        use crate::schema::tests::dsl::*;
        let conn = &mut self.get_db_conn().await?;
        tests.count().get_result::<i64>(conn).await.map_err(Into::into)
    }

    async fn count_questions(&self) -> Result<i64> {
        use crate::schema::questions::dsl::*;
        let conn = &mut self.get_db_conn().await?;
        questions.count().get_result::<i64>(conn).await.map_err(Into::into)
    }

    async fn count_active_users(&self, since: DateTime<Utc>) -> Result<i64> {
        use crate::schema::users::dsl::*;
        let conn = &mut self.get_db_conn().await?;
        users
            .filter(last_active_date.ge(since))
            .count()
            .get_result::<i64>(conn)
            .await
            .map_err(Into::into)
    }

    /// Dashboard counters, fetched concurrently. Any failing count fails the whole response.
    pub async fn get_dashboard_stats(&self) -> Result<DashboardStats> {
        let active_since = Utc::now() - Duration::days(ACTIVE_WINDOW_DAYS);
        let (total_users, total_tests, total_questions, active_users) = tokio::try_join!(
            self.count_users(),
            self.count_tests(),
            self.count_questions(),
            self.count_active_users(active_since),
        )?;

        Ok(DashboardStats {
            total_users,
            total_tests,
            total_questions,
            active_users,
        })
    }

    async fn user_metrics(&self) -> Result<UserMetrics> {
        use crate::schema::users::dsl::*;
        let conn = &mut self.get_db_conn().await?;
        let by_plan = users
            .group_by(plan)
            .select((plan, count_star()))
            .load::<(String, i64)>(conn)
            .await?;

        let mut metrics = UserMetrics::default();
        for (user_plan, count) in by_plan {
            metrics.total_users += count;
            match user_plan.as_str() {
                "free" => metrics.free_users += count,
                "pro" => metrics.pro_users += count,
                _ => {}
            }
        }
        Ok(metrics)
    }

    async fn content_metrics(&self) -> Result<ContentMetrics> {
        use crate::schema::content::dsl::*;
        let conn = &mut self.get_db_conn().await?;
        let groups = content
            .group_by((content_type, is_free))
            .select((content_type, is_free, count_star()))
            .load::<(String, bool, i64)>(conn)
            .await?;

        let mut metrics = ContentMetrics::default();
        for (kind, free, count) in groups {
            metrics.total_content += count;
            if free {
                metrics.free_content += count;
            }
            match kind.as_str() {
                "pdf" => metrics.pdfs += count,
                "formula" => metrics.formulas += count,
                "current_affairs" => metrics.current_affairs += count,
                _ => {}
            }
        }
        metrics.premium_content = metrics.total_content - metrics.free_content;
        Ok(metrics)
    }

    async fn test_metrics(&self, since: DateTime<Utc>) -> Result<TestMetrics> {
        let total_tests = self.count_tests().await?;

        let conn = &mut self.get_db_conn().await?;
        let stats = sql_query(
            r#"
            SELECT COUNT(*) AS total,
                   COUNT(*) FILTER (WHERE status = 'completed') AS completed,
                   COALESCE(AVG(COALESCE(score, 0)), 0)::float8 AS avg_score
            FROM test_attempts
            WHERE created_at >= $1
            "#,
        )
        .bind::<Timestamptz, _>(since)
        .get_result::<AttemptStats>(conn)
        .await?;

        Ok(TestMetrics {
            total_tests,
            total_attempts: stats.total,
            avg_score: round2(stats.avg_score),
            completion_rate: completion_rate(stats.completed, stats.total),
            popular_tests: Vec::new(),
        })
    }

    async fn revenue_total(&self, since: DateTime<Utc>) -> Result<i64> {
        let conn = &mut self.get_db_conn().await?;
        let revenue = sql_query(
            "SELECT COALESCE(SUM(amount), 0)::int8 AS total FROM payments WHERE created_at >= $1",
        )
        .bind::<Timestamptz, _>(since)
        .get_result::<RevenueTotal>(conn)
        .await?;
        Ok(revenue.total)
    }

    /// Rows of a set-returning stored procedure taking one integer argument.
    /// Failures are logged and yield an empty series.
    async fn call_series_procedure(&self, procedure: &'static str, arg: i32) -> Vec<Value> {
        let rows: Result<Vec<JsonRow>> = async {
            let conn = &mut self.get_db_conn().await?;
            let query = format!("SELECT row_to_json(r) AS row FROM {procedure}($1) r");
            sql_query(query)
                .bind::<Integer, _>(arg)
                .load::<JsonRow>(conn)
                .await
                .map_err(ApiError::from)
        }
        .await;

        match rows {
            Ok(rows) => rows.into_iter().map(|r| r.row).collect(),
            Err(err) => {
                error!("Error calling {}({}): {}", procedure, arg, err);
                Vec::new()
            }
        }
    }

    pub async fn get_analytics(&self, range: AnalyticsRange) -> Result<AnalyticsReport> {
        let now = Utc::now();
        let since = range.since(now);

        let (mut user_metrics, content_metrics, mut test_metrics, total_revenue) = tokio::try_join!(
            self.user_metrics(),
            self.content_metrics(),
            self.test_metrics(since),
            self.revenue_total(since),
        )?;

        let (user_growth, popular_tests, revenue_growth) = tokio::join!(
            self.call_series_procedure("get_daily_registrations", range.days()),
            self.call_series_procedure("get_popular_tests", POPULAR_TESTS_LIMIT),
            self.call_series_procedure("get_monthly_revenue", range.revenue_months()),
        );
        user_metrics.user_growth = user_growth;
        test_metrics.popular_tests = popular_tests;

        Ok(AnalyticsReport {
            range: range.as_str().to_string(),
            generated_at: now,
            user_metrics,
            content_metrics,
            test_metrics,
            revenue_metrics: RevenueMetrics {
                total_revenue,
                revenue_growth,
            },
        })
    }
}
