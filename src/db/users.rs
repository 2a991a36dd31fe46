use super::{filter_value, search_pattern, DbClient, JsonRow};
use crate::db::models::{
    Page, User, UserDetailResponse, UserListParams, ADMIN_PLAN, DEFAULT_PLAN,
};
use crate::schema::users;
use crate::Result;
use diesel::pg::Pg;
use diesel::{
    expression_methods::{BoolExpressionMethods, ExpressionMethods, PgTextExpressionMethods},
    query_dsl::QueryDsl,
    sql_query, OptionalExtension, SelectableHelper,
};
use diesel_async::RunQueryDsl;
use tracing::{error, info, warn};
use uuid::Uuid;

pub const USERS_PAGE_SIZE: i64 = 20;
const RECENT_ATTEMPTS: i64 = 10;

fn filtered_users<'a>(params: &'a UserListParams) -> users::BoxedQuery<'a, Pg> {
    use crate::schema::users::dsl::*;

    let mut query = users.into_boxed();

    if let Some(plan_filter) = filter_value(params.plan.as_deref()) {
        query = query.filter(plan.eq(plan_filter));
    }

    if let Some(pattern) = search_pattern(params.search.as_deref()) {
        query = query.filter(
            phone
                .ilike(pattern.clone())
                .or(name.ilike(pattern.clone()))
                .or(email.ilike(pattern)),
        );
    }

    query
}

/// DbClient helper functions for the users table
impl DbClient {
    /// Page of users, newest first, filtered by plan and a name/phone/email search
    pub async fn list_users(&self, params: &UserListParams) -> Result<Page<User>> {
        use crate::schema::users::dsl::*;

        let page = params.page_params().resolve(USERS_PAGE_SIZE);
        let conn = &mut self.get_db_conn().await?;

        let total = filtered_users(params).count().get_result::<i64>(conn).await?;
        let items = filtered_users(params)
            .order(created_at.desc())
            .limit(page.page_size)
            .offset(page.offset())
            .select(User::as_select())
            .load::<User>(conn)
            .await
            .map_err(|e| {
                error!("Failed to fetch users: {}", e);
                e
            })?;

        Ok(Page {
            items,
            page: page.page,
            page_size: page.page_size,
            total,
            total_pages: page.total_pages(total),
        })
    }

    pub async fn get_user(&self, user_id: Uuid) -> Result<User> {
        use crate::schema::users::dsl::*;

        let conn = &mut self.get_db_conn().await?;
        users
            .filter(id.eq(user_id))
            .select(User::as_select())
            .first::<User>(conn)
            .await
            .map_err(Into::into)
    }

    pub async fn find_user_by_email(&self, user_email: &str) -> Result<Option<User>> {
        use crate::schema::users::dsl::*;

        let conn = &mut self.get_db_conn().await?;
        users
            .filter(email.eq(user_email))
            .select(User::as_select())
            .first::<User>(conn)
            .await
            .optional()
            .map_err(Into::into)
    }

    /// User detail view: the user row plus performance views and recent attempts,
    /// fetched concurrently. Only the user lookup is fatal; the views may be empty
    /// for users who never attempted a test.
    pub async fn get_user_detail(&self, user_id: Uuid) -> Result<UserDetailResponse> {
        let (user, performance, subjects, recent_attempts) = tokio::join!(
            self.get_user(user_id),
            self.get_user_performance(user_id),
            self.get_user_subject_performance(user_id),
            self.get_recent_attempts(user_id),
        );

        let user = user?;
        let performance = performance.unwrap_or_else(|e| {
            warn!("Failed to load performance summary for {}: {}", user_id, e);
            None
        });
        let subjects = subjects.unwrap_or_else(|e| {
            warn!("Failed to load subject performance for {}: {}", user_id, e);
            Vec::new()
        });
        let recent_attempts = recent_attempts.unwrap_or_else(|e| {
            warn!("Failed to load recent attempts for {}: {}", user_id, e);
            Vec::new()
        });

        Ok(UserDetailResponse {
            user,
            performance,
            subjects,
            recent_attempts,
        })
    }

    async fn get_user_performance(&self, user_id: Uuid) -> Result<Option<serde_json::Value>> {
        let conn = &mut self.get_db_conn().await?;
        let row = sql_query(
            "SELECT row_to_json(p) AS row FROM user_performance_summary p WHERE p.user_id = $1 LIMIT 1",
        )
        .bind::<diesel::sql_types::Uuid, _>(user_id)
        .get_result::<JsonRow>(conn)
        .await
        .optional()?;

        Ok(row.map(|r| r.row))
    }

    async fn get_user_subject_performance(&self, user_id: Uuid) -> Result<Vec<serde_json::Value>> {
        let conn = &mut self.get_db_conn().await?;
        let rows = sql_query(
            "SELECT row_to_json(s) AS row FROM user_subject_performance s WHERE s.user_id = $1",
        )
        .bind::<diesel::sql_types::Uuid, _>(user_id)
        .load::<JsonRow>(conn)
        .await?;

        Ok(rows.into_iter().map(|r| r.row).collect())
    }

    async fn get_recent_attempts(&self, user_id: Uuid) -> Result<Vec<serde_json::Value>> {
        let conn = &mut self.get_db_conn().await?;
        let rows = sql_query(
            r#"
            SELECT row_to_json(a) AS row FROM (
                SELECT ta.*, t.title AS test_title
                FROM test_attempts ta
                LEFT JOIN tests t ON t.id = ta.test_id
                WHERE ta.user_id = $1
                  AND ta.completed_at IS NOT NULL
                ORDER BY ta.completed_at DESC
                LIMIT $2
            ) a
            "#,
        )
        .bind::<diesel::sql_types::Uuid, _>(user_id)
        .bind::<diesel::sql_types::BigInt, _>(RECENT_ATTEMPTS)
        .load::<JsonRow>(conn)
        .await?;

        Ok(rows.into_iter().map(|r| r.row).collect())
    }

    pub async fn delete_user(&self, user_id: Uuid) -> Result<usize> {
        use crate::schema::users::dsl::*;

        let conn = &mut self.get_db_conn().await?;
        info!("Deleting user: {}", user_id);
        diesel::delete(users.filter(id.eq(user_id)))
            .execute(conn)
            .await
            .map_err(Into::into)
    }

    pub async fn list_admins(&self) -> Result<Vec<User>> {
        use crate::schema::users::dsl::*;

        let conn = &mut self.get_db_conn().await?;
        users
            .filter(plan.eq(ADMIN_PLAN))
            .order(created_at.asc())
            .select(User::as_select())
            .load::<User>(conn)
            .await
            .map_err(Into::into)
    }

    pub async fn set_user_plan(&self, user_id: Uuid, new_plan: &str) -> Result<usize> {
        use crate::schema::users::dsl::*;

        let conn = &mut self.get_db_conn().await?;
        info!("Setting plan of user {} to {}", user_id, new_plan);
        diesel::update(users.filter(id.eq(user_id)))
            .set(plan.eq(new_plan))
            .execute(conn)
            .await
            .map_err(Into::into)
    }

    /// Grants admin access to an existing account
    pub async fn grant_admin(&self, user_email: &str) -> Result<Option<User>> {
        let Some(user) = self.find_user_by_email(user_email).await? else {
            return Ok(None);
        };
        self.set_user_plan(user.id, ADMIN_PLAN).await?;
        Ok(Some(User {
            plan: ADMIN_PLAN.to_string(),
            ..user
        }))
    }

    /// Revokes admin access, returning the account to the free plan
    pub async fn revoke_admin(&self, user_id: Uuid) -> Result<usize> {
        self.set_user_plan(user_id, DEFAULT_PLAN).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    #[ignore = "requires TEST_DATABASE_URL and TEST_REDIS_URL"]
    async fn test_list_users() {
        dotenv::dotenv().ok();
        let db_url = std::env::var("TEST_DATABASE_URL").unwrap();
        let redis_url = std::env::var("TEST_REDIS_URL").unwrap();
        let client = DbClient::new(&db_url, &redis_url);

        let params = UserListParams {
            plan: Some("all".to_string()),
            ..Default::default()
        };
        let result = client.list_users(&params).await;
        assert!(result.is_ok());
        let page = result.unwrap();
        assert!(page.items.len() as i64 <= USERS_PAGE_SIZE);
    }
}
