use super::{filter_value, search_pattern, DbClient};
use crate::db::models::{
    CreatedQuestionResponse, NewQuestion, Page, Question, QuestionChangeset, QuestionListParams,
    TestQuestion,
};
use crate::schema::{questions, test_questions};
use crate::Result;
use diesel::dsl::max;
use diesel::pg::Pg;
use diesel::{
    expression_methods::{ExpressionMethods, PgTextExpressionMethods},
    query_dsl::QueryDsl,
    QueryResult, SelectableHelper,
};
use diesel_async::scoped_futures::ScopedFutureExt;
use diesel_async::{AsyncConnection, AsyncPgConnection, RunQueryDsl};
use tracing::{error, info};
use uuid::Uuid;

pub const QUESTIONS_PAGE_SIZE: i64 = 20;

/// Inserts one batch of questions, returning their ids in insertion order
pub async fn insert_questions(
    conn: &mut AsyncPgConnection,
    batch: &[NewQuestion],
) -> QueryResult<Vec<Uuid>> {
    diesel::insert_into(questions::table)
        .values(batch)
        .returning(questions::id)
        .get_results::<Uuid>(conn)
        .await
}

pub async fn insert_links(conn: &mut AsyncPgConnection, links: &[TestQuestion]) -> QueryResult<usize> {
    diesel::insert_into(test_questions::table)
        .values(links)
        .execute(conn)
        .await
}

/// Highest `order_index` linked into a test, 0 for a test without questions
pub async fn max_order_index(conn: &mut AsyncPgConnection, test_id: Uuid) -> QueryResult<i32> {
    let current = test_questions::table
        .filter(test_questions::test_id.eq(test_id))
        .select(max(test_questions::order_index))
        .first::<Option<i32>>(conn)
        .await?;
    Ok(current.unwrap_or(0))
}

fn filtered_questions<'a>(params: &'a QuestionListParams) -> questions::BoxedQuery<'a, Pg> {
    use crate::schema::questions::dsl::*;

    let mut query = questions.into_boxed();

    if let Some(value) = filter_value(params.subject.as_deref()) {
        query = query.filter(subject.eq(value));
    }

    if let Some(value) = filter_value(params.difficulty.as_deref()) {
        query = query.filter(difficulty.eq(value));
    }

    if let Some(pattern) = search_pattern(params.search.as_deref()) {
        query = query.filter(question_text.ilike(pattern));
    }

    query
}

/// DbClient helper functions for the question bank
impl DbClient {
    pub async fn list_questions(&self, params: &QuestionListParams) -> Result<Page<Question>> {
        use crate::schema::questions::dsl::*;

        let page = params.page_params().resolve(QUESTIONS_PAGE_SIZE);
        let conn = &mut self.get_db_conn().await?;

        let total = filtered_questions(params)
            .count()
            .get_result::<i64>(conn)
            .await?;
        let items = filtered_questions(params)
            .order(created_at.desc())
            .limit(page.page_size)
            .offset(page.offset())
            .select(Question::as_select())
            .load::<Question>(conn)
            .await
            .map_err(|e| {
                error!("Failed to fetch questions: {}", e);
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

    pub async fn get_question(&self, question_id: Uuid) -> Result<Question> {
        use crate::schema::questions::dsl::*;

        let conn = &mut self.get_db_conn().await?;
        questions
            .filter(id.eq(question_id))
            .select(Question::as_select())
            .first::<Question>(conn)
            .await
            .map_err(Into::into)
    }

    /// Creates a question and, when a test is given, links it after the test's last question.
    /// Both writes share one transaction.
    pub async fn create_question(
        &self,
        new_question: NewQuestion,
        test_id: Option<Uuid>,
    ) -> Result<CreatedQuestionResponse> {
        let mut pooled = self.get_db_conn().await?;
        let conn: &mut AsyncPgConnection = &mut pooled;

        let created = conn
            .transaction::<_, diesel::result::Error, _>(|conn| {
                async move {
                    let question = diesel::insert_into(questions::table)
                        .values(&new_question)
                        .returning(Question::as_returning())
                        .get_result::<Question>(conn)
                        .await?;

                    let order_index = match test_id {
                        Some(test_id) => {
                            let next = max_order_index(conn, test_id).await? + 1;
                            let link = TestQuestion {
                                test_id,
                                question_id: question.id,
                                order_index: next,
                            };
                            insert_links(conn, &[link]).await?;
                            Some(next)
                        }
                        None => None,
                    };

                    Ok(CreatedQuestionResponse {
                        question,
                        order_index,
                    })
                }
                .scope_boxed()
            })
            .await?;

        info!(
            "Created question {} (linked at {:?})",
            created.question.id, created.order_index
        );
        Ok(created)
    }

    pub async fn update_question(
        &self,
        question_id: Uuid,
        changes: &QuestionChangeset,
    ) -> Result<Question> {
        use crate::schema::questions::dsl::*;

        let conn = &mut self.get_db_conn().await?;
        diesel::update(questions.filter(id.eq(question_id)))
            .set(changes)
            .returning(Question::as_returning())
            .get_result::<Question>(conn)
            .await
            .map_err(Into::into)
    }

    pub async fn delete_question(&self, question_id: Uuid) -> Result<usize> {
        self.delete_questions(&[question_id]).await
    }

    pub async fn delete_questions(&self, ids: &[Uuid]) -> Result<usize> {
        use crate::schema::questions::dsl::*;

        let conn = &mut self.get_db_conn().await?;
        let deleted = diesel::delete(questions.filter(id.eq_any(ids)))
            .execute(conn)
            .await?;
        info!("Deleted {} of {} questions", deleted, ids.len());
        Ok(deleted)
    }
}
