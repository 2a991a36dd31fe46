use super::questions::{insert_links, max_order_index};
use super::{filter_value, search_pattern, DbClient};
use crate::db::models::{
    CreateTestParams, LinkedQuestion, NewTest, Question, Test, TestChangeset, TestDetailResponse,
    TestListParams, TestQuestion, DEFAULT_DIFFICULTY,
};
use crate::schema::{questions, test_questions};
use crate::validation::slugify;
use crate::Result;
use diesel::pg::Pg;
use diesel::{
    expression_methods::{BoolExpressionMethods, ExpressionMethods, PgTextExpressionMethods},
    query_dsl::QueryDsl,
    OptionalExtension, SelectableHelper,
};
use diesel_async::scoped_futures::ScopedFutureExt;
use diesel_async::{AsyncConnection, AsyncPgConnection, RunQueryDsl};
use std::collections::HashSet;
use tracing::{error, info};
use uuid::Uuid;

const DEFAULT_TEST_TYPE: &str = "mock";
const DEFAULT_DURATION_MINUTES: i32 = 60;
const DEFAULT_TOTAL_MARKS: i32 = 200;
const DEFAULT_PASSING_MARKS: i32 = 70;

impl From<CreateTestParams> for NewTest {
    fn from(params: CreateTestParams) -> Self {
        NewTest {
            slug: slugify(&params.title),
            title: params.title,
            title_hi: params.title_hi,
            description: params.description,
            test_type: params
                .test_type
                .unwrap_or_else(|| DEFAULT_TEST_TYPE.to_string()),
            duration_minutes: params.duration_minutes.unwrap_or(DEFAULT_DURATION_MINUTES),
            total_marks: params.total_marks.unwrap_or(DEFAULT_TOTAL_MARKS),
            passing_marks: params.passing_marks.unwrap_or(DEFAULT_PASSING_MARKS),
            difficulty: params
                .difficulty
                .unwrap_or_else(|| DEFAULT_DIFFICULTY.to_string()),
            is_free: params.is_free.unwrap_or(false),
            total_questions: 0,
            total_attempts: 0,
        }
    }
}

fn filtered_tests<'a>(params: &'a TestListParams) -> crate::schema::tests::BoxedQuery<'a, Pg> {
    use crate::schema::tests::dsl::*;

    let mut query = tests.into_boxed();

    if let Some(kind) = filter_value(params.test_type.as_deref()) {
        query = query.filter(test_type.eq(kind));
    }

    if let Some(pattern) = search_pattern(params.search.as_deref()) {
        query = query.filter(title.ilike(pattern.clone()).or(title_hi.ilike(pattern)));
    }

    query
}

/// DbClient helper functions for tests and their question links
impl DbClient {
    pub async fn list_tests(&self, params: &TestListParams) -> Result<Vec<Test>> {
        use crate::schema::tests::dsl::*;

        let conn = &mut self.get_db_conn().await?;
        filtered_tests(params)
            .order(created_at.desc())
            .select(Test::as_select())
            .load::<Test>(conn)
            .await
            .map_err(|e| {
                error!("Failed to fetch tests: {}", e);
                e.into()
            })
    }

    pub async fn get_test(&self, test_id: Uuid) -> Result<Test> {
        use crate::schema::tests::dsl::*;

        let conn = &mut self.get_db_conn().await?;
        tests
            .filter(id.eq(test_id))
            .select(Test::as_select())
            .first::<Test>(conn)
            .await
            .map_err(Into::into)
    }

    pub async fn test_exists(&self, test_id: Uuid) -> Result<bool> {
        use crate::schema::tests::dsl::*;

        let conn = &mut self.get_db_conn().await?;
        let found = tests
            .filter(id.eq(test_id))
            .select(id)
            .first::<Uuid>(conn)
            .await
            .optional()?;
        Ok(found.is_some())
    }

    /// The test with its questions in test order
    pub async fn get_test_detail(&self, test_id: Uuid) -> Result<TestDetailResponse> {
        let test = self.get_test(test_id).await?;

        let conn = &mut self.get_db_conn().await?;
        let rows = test_questions::table
            .inner_join(questions::table)
            .filter(test_questions::test_id.eq(test_id))
            .order(test_questions::order_index.asc())
            .select((test_questions::order_index, Question::as_select()))
            .load::<(i32, Question)>(conn)
            .await?;

        let questions = rows
            .into_iter()
            .map(|(order_index, question)| LinkedQuestion {
                order_index,
                question,
            })
            .collect();

        Ok(TestDetailResponse { test, questions })
    }

    pub async fn create_test(&self, new_test: NewTest) -> Result<Test> {
        let conn = &mut self.get_db_conn().await?;
        let test = diesel::insert_into(crate::schema::tests::table)
            .values(&new_test)
            .returning(Test::as_returning())
            .get_result::<Test>(conn)
            .await
            .map_err(|e| {
                error!("Failed to create test {}: {}", new_test.slug, e);
                e
            })?;

        info!("Created test {} ({})", test.id, test.slug);
        Ok(test)
    }

    pub async fn update_test(&self, test_id: Uuid, changes: &TestChangeset) -> Result<Test> {
        use crate::schema::tests::dsl::*;

        let conn = &mut self.get_db_conn().await?;
        diesel::update(tests.filter(id.eq(test_id)))
            .set(changes)
            .returning(Test::as_returning())
            .get_result::<Test>(conn)
            .await
            .map_err(Into::into)
    }

    pub async fn delete_test(&self, test_id: Uuid) -> Result<usize> {
        use crate::schema::tests::dsl::*;

        let conn = &mut self.get_db_conn().await?;
        info!("Deleting test: {}", test_id);
        diesel::delete(tests.filter(id.eq(test_id)))
            .execute(conn)
            .await
            .map_err(Into::into)
    }

    /// Links existing questions after the test's highest `order_index`, keeping the given
    /// order. Repeated ids are linked once.
    pub async fn add_questions_to_test(
        &self,
        test_id: Uuid,
        question_ids: &[Uuid],
    ) -> Result<Vec<TestQuestion>> {
        let question_ids = unique_ids(question_ids);

        let mut pooled = self.get_db_conn().await?;
        let conn: &mut AsyncPgConnection = &mut pooled;
        let links = conn
            .transaction::<_, diesel::result::Error, _>(|conn| {
                async move {
                    let base = max_order_index(conn, test_id).await?;
                    let links = build_links(test_id, &question_ids, base);
                    insert_links(conn, &links).await?;
                    Ok(links)
                }
                .scope_boxed()
            })
            .await?;

        info!("Linked {} questions into test {}", links.len(), test_id);
        Ok(links)
    }

    pub async fn remove_question_from_test(&self, test_id: Uuid, question_id: Uuid) -> Result<usize> {
        let conn = &mut self.get_db_conn().await?;
        diesel::delete(
            test_questions::table
                .filter(test_questions::test_id.eq(test_id))
                .filter(test_questions::question_id.eq(question_id)),
        )
        .execute(conn)
        .await
        .map_err(Into::into)
    }
}

/// Drops repeated ids, keeping the first occurrence
pub fn unique_ids(ids: &[Uuid]) -> Vec<Uuid> {
    let mut seen = HashSet::new();
    ids.iter().copied().filter(|id| seen.insert(*id)).collect()
}

/// Junction rows for `question_ids`, numbered base+1, base+2, ... in input order
pub fn build_links(test_id: Uuid, question_ids: &[Uuid], base: i32) -> Vec<TestQuestion> {
    question_ids
        .iter()
        .zip(base + 1..)
        .map(|(question_id, order_index)| TestQuestion {
            test_id,
            question_id: *question_id,
            order_index,
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_build_links_continues_existing_order() {
        let test_id = Uuid::new_v4();
        let ids: Vec<Uuid> = (0..3).map(|_| Uuid::new_v4()).collect();

        let links = build_links(test_id, &ids, 4);
        let orders: Vec<i32> = links.iter().map(|l| l.order_index).collect();
        assert_eq!(orders, vec![5, 6, 7]);
        assert!(links.iter().zip(&ids).all(|(l, id)| l.question_id == *id));
        assert!(links.iter().all(|l| l.test_id == test_id));

        assert!(build_links(test_id, &[], 0).is_empty());
    }

    #[test]
    fn test_repeated_ids_link_once_after_gap() {
        let test_id = Uuid::new_v4();
        let (a, b, c) = (Uuid::new_v4(), Uuid::new_v4(), Uuid::new_v4());

        let ids = unique_ids(&[a, b, a, c, b]);
        assert_eq!(ids, vec![a, b, c]);

        // Links 1..=5 with 3 removed leave a maximum of 5 but only four rows
        let links = build_links(test_id, &ids, 5);
        let orders: Vec<i32> = links.iter().map(|l| l.order_index).collect();
        assert_eq!(orders, vec![6, 7, 8]);
    }

    #[test]
    fn test_new_test_defaults() {
        let params = CreateTestParams {
            title: "SSC CGL Tier 1 Mock #3".to_string(),
            title_hi: None,
            description: None,
            test_type: None,
            duration_minutes: None,
            total_marks: None,
            passing_marks: None,
            difficulty: None,
            is_free: None,
        };
        let new_test = NewTest::from(params);
        assert_eq!(new_test.slug, "ssc-cgl-tier-1-mock-3");
        assert_eq!(new_test.test_type, "mock");
        assert_eq!(new_test.duration_minutes, 60);
        assert_eq!(new_test.total_marks, 200);
        assert_eq!(new_test.passing_marks, 70);
        assert_eq!(new_test.difficulty, "medium");
        assert!(!new_test.is_free);
        assert_eq!(new_test.total_questions, 0);
        assert_eq!(new_test.total_attempts, 0);
    }

    #[tokio::test]
    #[ignore = "requires TEST_DATABASE_URL and TEST_REDIS_URL"]
    async fn test_test_exists_for_random_id() {
        dotenv::dotenv().ok();
        let db_url = std::env::var("TEST_DATABASE_URL").unwrap();
        let redis_url = std::env::var("TEST_REDIS_URL").unwrap();
        let client = DbClient::new(&db_url, &redis_url);

        let exists = client.test_exists(Uuid::new_v4()).await.unwrap();
        assert!(!exists);
    }
}
