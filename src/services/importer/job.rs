use super::upload::{
    upload_questions, PgQuestionStore, ProgressSink, UploadAbort, UploadProgress, UploadSummary,
};
use crate::db::models::{ImportJobState, JobStatus, NewQuestion};
use crate::db::DbClient;
use crate::logging::ACTION_LOG_TARGET;
use diesel_async::scoped_futures::ScopedFutureExt;
use diesel_async::{AsyncConnection, AsyncPgConnection};
use tracing::{error, info};
use uuid::Uuid;

/// How the insert-then-link sequence is committed
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CommitMode {
    /// One transaction; a failure leaves the database untouched
    Atomic,
    /// Every batch commits on its own; a failure leaves earlier batches in place
    PerBatch,
}

impl CommitMode {
    pub fn from_flag(atomic: bool) -> Self {
        if atomic {
            CommitMode::Atomic
        } else {
            CommitMode::PerBatch
        }
    }
}

/// Mirrors upload progress into the job state pollers read from redis
pub struct JobTracker {
    db: DbClient,
    state: ImportJobState,
}

impl JobTracker {
    pub fn new(db: DbClient, state: ImportJobState) -> Self {
        Self { db, state }
    }

    async fn save(&self) {
        if let Err(err) = self.db.set_import_job(&self.state).await {
            error!("Failed to store state of import job {}: {}", self.state.job_id, err);
        }
    }
}

impl ProgressSink for JobTracker {
    async fn report(&mut self, progress: UploadProgress) {
        self.state.progress = progress.percent;
        self.state.questions_inserted = progress.questions_inserted;
        self.state.links_inserted = progress.links_inserted;
        self.save().await;
    }
}

/// Final job state for a finished upload
pub fn finish_state(
    mut state: ImportJobState,
    outcome: &Result<UploadSummary, UploadAbort>,
    mode: CommitMode,
) -> ImportJobState {
    match outcome {
        Ok(summary) => {
            state.status = JobStatus::Completed;
            state.progress = 100.0;
            state.questions_inserted = summary.questions_inserted;
            state.links_inserted = summary.links_inserted;
            state.message = format!(
                "Imported {} questions, linked from position {}",
                summary.questions_inserted, summary.first_order_index
            );
        }
        Err(abort) => {
            state.status = JobStatus::Failed;
            match mode {
                CommitMode::Atomic => {
                    state.questions_inserted = 0;
                    state.links_inserted = 0;
                    state.message = format!("Import rolled back, nothing was saved: {}", abort.source);
                }
                CommitMode::PerBatch => {
                    state.questions_inserted = abort.questions_inserted;
                    state.links_inserted = abort.links_inserted;
                    state.message = format!(
                        "Import stopped after saving {} questions and {} links: {}",
                        abort.questions_inserted, abort.links_inserted, abort.source
                    );
                }
            }
        }
    }
    state
}

async fn run_upload(
    conn: &mut AsyncPgConnection,
    tracker: &mut JobTracker,
    test_id: Uuid,
    questions: &[NewQuestion],
    batch_size: usize,
    mode: CommitMode,
) -> Result<UploadSummary, UploadAbort> {
    match mode {
        CommitMode::Atomic => {
            conn.transaction::<_, UploadAbort, _>(|conn| {
                async move {
                    let mut store = PgQuestionStore::new(conn);
                    upload_questions(&mut store, tracker, test_id, questions, batch_size).await
                }
                .scope_boxed()
            })
            .await
        }
        CommitMode::PerBatch => {
            let mut store = PgQuestionStore::new(conn);
            upload_questions(&mut store, tracker, test_id, questions, batch_size).await
        }
    }
}

/// Runs an accepted import to completion, recording the outcome in redis
pub async fn run_import_job(
    db: DbClient,
    state: ImportJobState,
    questions: Vec<NewQuestion>,
    batch_size: usize,
    mode: CommitMode,
) -> ImportJobState {
    let job_id = state.job_id;
    let test_id = state.test_id;
    let mut tracker = JobTracker::new(db.clone(), state);
    tracker.save().await;

    let outcome = match db.get_db_conn().await {
        Ok(mut pooled) => {
            run_upload(&mut pooled, &mut tracker, test_id, &questions, batch_size, mode).await
        }
        Err(err) => Err(UploadAbort {
            questions_inserted: 0,
            links_inserted: 0,
            source: err.into(),
        }),
    };

    let final_state = finish_state(tracker.state, &outcome, mode);
    match &outcome {
        Ok(_) => info!(
            target: ACTION_LOG_TARGET,
            "Import job {} into test {} completed: {}", job_id, test_id, final_state.message
        ),
        Err(_) => error!(
            target: ACTION_LOG_TARGET,
            "Import job {} into test {} failed: {}", job_id, test_id, final_state.message
        ),
    }

    if let Err(err) = db.set_import_job(&final_state).await {
        error!("Failed to store final state of import job {}: {}", job_id, err);
    }
    final_state
}

/// Starts the import on a background task and returns immediately
pub fn spawn_import_job(
    db: DbClient,
    state: ImportJobState,
    questions: Vec<NewQuestion>,
    batch_size: usize,
    mode: CommitMode,
) {
    tokio::spawn(async move {
        info!(
            "Spawning import job {} with {} questions ({:?})",
            state.job_id,
            questions.len(),
            mode
        );
        run_import_job(db, state, questions, batch_size, mode).await;
    });
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::errors::ApiError;

    fn started() -> ImportJobState {
        ImportJobState::started(Uuid::new_v4(), Uuid::new_v4(), 250)
    }

    fn abort() -> Result<UploadSummary, UploadAbort> {
        Err(UploadAbort {
            questions_inserted: 200,
            links_inserted: 100,
            source: ApiError::Custom("connection reset".to_string()),
        })
    }

    #[test]
    fn test_commit_mode_from_flag() {
        assert_eq!(CommitMode::from_flag(true), CommitMode::Atomic);
        assert_eq!(CommitMode::from_flag(false), CommitMode::PerBatch);
    }

    #[test]
    fn test_finished_job_state() {
        let outcome = Ok(UploadSummary {
            questions_inserted: 250,
            links_inserted: 250,
            first_order_index: 11,
        });
        let state = finish_state(started(), &outcome, CommitMode::Atomic);

        assert_eq!(state.status, JobStatus::Completed);
        assert_eq!(state.progress, 100.0);
        assert_eq!(state.links_inserted, 250);
        assert!(state.message.contains("position 11"));
    }

    #[test]
    fn test_atomic_failure_reports_nothing_saved() {
        let state = finish_state(started(), &abort(), CommitMode::Atomic);

        assert_eq!(state.status, JobStatus::Failed);
        assert_eq!(state.questions_inserted, 0);
        assert_eq!(state.links_inserted, 0);
        assert!(state.message.contains("rolled back"));
        assert!(state.message.contains("connection reset"));
    }

    #[test]
    fn test_per_batch_failure_reports_partial_commit() {
        let state = finish_state(started(), &abort(), CommitMode::PerBatch);

        assert_eq!(state.status, JobStatus::Failed);
        assert_eq!(state.questions_inserted, 200);
        assert_eq!(state.links_inserted, 100);
        assert!(state.message.contains("200 questions and 100 links"));
    }
}
