use crate::db::exam_tests::build_links;
use crate::db::models::{NewQuestion, TestQuestion};
use crate::db::questions;
use crate::errors::ApiError;
use diesel_async::AsyncPgConnection;
use std::future::Future;
use thiserror::Error;
use tracing::info;
use uuid::Uuid;

/// Half of the progress bar belongs to inserting questions, the other half to linking them
const QUESTION_PHASE_SHARE: f64 = 50.0;

/// Where imported questions and their test links are written
pub trait QuestionStore: Send {
    fn insert_questions(
        &mut self,
        batch: &[NewQuestion],
    ) -> impl Future<Output = Result<Vec<Uuid>, ApiError>> + Send;

    fn insert_links(
        &mut self,
        links: &[TestQuestion],
    ) -> impl Future<Output = Result<usize, ApiError>> + Send;

    /// Highest `order_index` already linked into the test, 0 when it has none
    fn max_order_index(&mut self, test_id: Uuid) -> impl Future<Output = Result<i32, ApiError>> + Send;
}

/// Receives progress after every committed batch
pub trait ProgressSink: Send {
    fn report(&mut self, progress: UploadProgress) -> impl Future<Output = ()> + Send;
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct UploadProgress {
    /// 0-100
    pub percent: f64,
    pub questions_inserted: usize,
    pub links_inserted: usize,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct UploadSummary {
    pub questions_inserted: usize,
    pub links_inserted: usize,
    /// `order_index` of the first new link
    pub first_order_index: i32,
}

/// A failed upload, with how much was written before the failing batch
#[derive(Debug, Error)]
#[error("Import stopped after {questions_inserted} questions and {links_inserted} links: {source}")]
pub struct UploadAbort {
    pub questions_inserted: usize,
    pub links_inserted: usize,
    #[source]
    pub source: ApiError,
}

impl From<diesel::result::Error> for UploadAbort {
    fn from(err: diesel::result::Error) -> Self {
        UploadAbort {
            questions_inserted: 0,
            links_inserted: 0,
            source: err.into(),
        }
    }
}

fn phase_percent(done: usize, total: usize, offset: f64) -> f64 {
    if total == 0 {
        offset + QUESTION_PHASE_SHARE
    } else {
        offset + QUESTION_PHASE_SHARE * done as f64 / total as f64
    }
}

/// Inserts `questions` in batches of `batch_size`, then links every inserted question into
/// `test_id` after the test's current last question, again in batches.
/// Batches run one after another; the first failing batch stops the upload.
pub async fn upload_questions<S, P>(
    store: &mut S,
    progress: &mut P,
    test_id: Uuid,
    questions: &[NewQuestion],
    batch_size: usize,
) -> Result<UploadSummary, UploadAbort>
where
    S: QuestionStore,
    P: ProgressSink,
{
    let batch_size = batch_size.max(1);
    let total = questions.len();
    let mut inserted_ids: Vec<Uuid> = Vec::with_capacity(total);

    let abort = |questions_inserted: usize, links_inserted: usize| {
        move |source: ApiError| UploadAbort {
            questions_inserted,
            links_inserted,
            source,
        }
    };

    for batch in questions.chunks(batch_size) {
        let ids = store
            .insert_questions(batch)
            .await
            .map_err(abort(inserted_ids.len(), 0))?;
        inserted_ids.extend(ids);

        progress
            .report(UploadProgress {
                percent: phase_percent(inserted_ids.len(), total, 0.0),
                questions_inserted: inserted_ids.len(),
                links_inserted: 0,
            })
            .await;
    }

    let base = store
        .max_order_index(test_id)
        .await
        .map_err(abort(inserted_ids.len(), 0))?;
    let links = build_links(test_id, &inserted_ids, base);

    let mut links_inserted = 0;
    for batch in links.chunks(batch_size) {
        store
            .insert_links(batch)
            .await
            .map_err(abort(inserted_ids.len(), links_inserted))?;
        links_inserted += batch.len();

        progress
            .report(UploadProgress {
                percent: phase_percent(links_inserted, links.len(), QUESTION_PHASE_SHARE),
                questions_inserted: inserted_ids.len(),
                links_inserted,
            })
            .await;
    }

    info!(
        "Uploaded {} questions into test {} starting at order {}",
        inserted_ids.len(),
        test_id,
        base + 1
    );

    Ok(UploadSummary {
        questions_inserted: inserted_ids.len(),
        links_inserted,
        first_order_index: base + 1,
    })
}

/// Question store over a single Postgres connection, possibly inside a transaction
pub struct PgQuestionStore<'c> {
    conn: &'c mut AsyncPgConnection,
}

impl<'c> PgQuestionStore<'c> {
    pub fn new(conn: &'c mut AsyncPgConnection) -> Self {
        Self { conn }
    }
}

impl QuestionStore for PgQuestionStore<'_> {
    async fn insert_questions(&mut self, batch: &[NewQuestion]) -> Result<Vec<Uuid>, ApiError> {
        questions::insert_questions(self.conn, batch)
            .await
            .map_err(Into::into)
    }

    async fn insert_links(&mut self, links: &[TestQuestion]) -> Result<usize, ApiError> {
        questions::insert_links(self.conn, links)
            .await
            .map_err(Into::into)
    }

    async fn max_order_index(&mut self, test_id: Uuid) -> Result<i32, ApiError> {
        questions::max_order_index(self.conn, test_id)
            .await
            .map_err(Into::into)
    }
}
