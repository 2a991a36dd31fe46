use crate::db::models::HealthResponse;
use crate::db::DbClient;
use axum::{extract::State, http::StatusCode, Json};
use diesel_async::RunQueryDsl;
use serde_json::json;

/// Health check reporting Postgres and redis connectivity
///
/// # Endpoint: GET /health
pub async fn health_check(State(db): State<DbClient>) -> (StatusCode, Json<HealthResponse>) {
    let database_status = match db.get_db_conn().await {
        Err(e) => json!({
            "status": "error",
            "message": e.to_string()
        }),
        Ok(mut conn) => match diesel::sql_query("SELECT 1").execute(&mut conn).await {
            Ok(_) => json!("connected"),
            Err(e) => json!({
                "status": "error",
                "message": e.to_string()
            }),
        },
    };

    let redis_status = match db.get_async_redis_conn().await {
        Err(e) => json!({
            "status": "error",
            "message": e.to_string()
        }),
        Ok(_) => json!("connected"),
    };

    let healthy = database_status == "connected" && redis_status == "connected";
    let status_code = if healthy {
        StatusCode::OK
    } else {
        StatusCode::SERVICE_UNAVAILABLE
    };

    (
        status_code,
        Json(HealthResponse {
            status: if healthy { "ok" } else { "degraded" }.to_string(),
            database: database_status,
            redis: redis_status,
            timestamp: chrono::Utc::now(),
        }),
    )
}
