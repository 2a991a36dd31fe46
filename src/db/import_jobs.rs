use super::DbClient;
use crate::db::models::ImportJobState;
use crate::errors::ApiError;
use crate::Result;
use redis::AsyncCommands;
use uuid::Uuid;

/// Jobs stay pollable for an hour after their last update
pub const IMPORT_JOB_EXPIRY_SECONDS: u64 = 60 * 60;

pub fn import_job_key(job_id: Uuid) -> String {
    format!("import_job:{job_id}")
}

impl DbClient {
    pub async fn set_import_job(&self, state: &ImportJobState) -> Result<()> {
        let mut redis_conn = self.get_async_redis_conn().await.map_err(|err| {
            tracing::error!("Redis connection error: {}", err);
            ApiError::from(err)
        })?;

        let payload = serde_json::to_string(state)?;
        let _: () = redis_conn
            .set_ex(import_job_key(state.job_id), payload, IMPORT_JOB_EXPIRY_SECONDS)
            .await
            .map_err(|err| {
                tracing::error!("Redis SET failed for import job {}: {}", state.job_id, err);
                ApiError::from(err)
            })?;
        Ok(())
    }

    pub async fn get_import_job(&self, job_id: Uuid) -> Result<Option<ImportJobState>> {
        let mut redis_conn = self.get_async_redis_conn().await.map_err(|err| {
            tracing::error!("Redis connection error: {}", err);
            ApiError::from(err)
        })?;

        let value: Option<String> = redis_conn.get(import_job_key(job_id)).await?;
        match value {
            Some(payload) => Ok(Some(serde_json::from_str(&payload)?)),
            None => Ok(None),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::models::JobStatus;

    #[test]
    fn test_import_job_key() {
        let id = Uuid::nil();
        assert_eq!(
            import_job_key(id),
            "import_job:00000000-0000-0000-0000-000000000000"
        );
    }

    #[tokio::test]
    #[ignore = "requires TEST_DATABASE_URL and TEST_REDIS_URL"]
    async fn test_import_job_state_roundtrip() {
        dotenv::dotenv().ok();
        let db_url = std::env::var("TEST_DATABASE_URL").unwrap();
        let redis_url = std::env::var("TEST_REDIS_URL").unwrap();
        let client = DbClient::new(&db_url, &redis_url);

        let state = ImportJobState::started(Uuid::new_v4(), Uuid::new_v4(), 12);
        client.set_import_job(&state).await.unwrap();

        let stored = client.get_import_job(state.job_id).await.unwrap().unwrap();
        assert_eq!(stored.status, JobStatus::InProgress);
        assert_eq!(stored.total_questions, 12);

        assert!(client.get_import_job(Uuid::new_v4()).await.unwrap().is_none());
    }
}
