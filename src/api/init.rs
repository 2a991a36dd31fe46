use crate::db::DbClient;
use axum::{
    error_handling::HandleErrorLayer,
    extract::DefaultBodyLimit,
    http::{Method, StatusCode},
    middleware,
    routing::{delete, get, patch, post, put},
    BoxError, Router,
};
use std::time::Duration;
use tower::{buffer::BufferLayer, limit::RateLimitLayer, ServiceBuilder};
use tower_governor::{
    governor::GovernorConfigBuilder, key_extractor::SmartIpKeyExtractor, GovernorLayer,
};
use tower_http::{
    compression::CompressionLayer,
    cors::{Any, CorsLayer},
    trace::{DefaultMakeSpan, DefaultOnRequest, DefaultOnResponse, TraceLayer},
};
use tracing::Level;

use super::{auth::require_admin, handlers::*, index::index};

/// Largest spreadsheet accepted by the importer
const IMPORT_BODY_LIMIT: usize = 10 * 1024 * 1024;

pub fn initialize_router(db: DbClient) -> Router {
    let error_handler = || {
        ServiceBuilder::new().layer(HandleErrorLayer::new(|err: BoxError| async move {
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                format!("Unhandled error: {}", err),
            )
        }))
    };

    let global_rate_limit = |req_per_sec: u64| {
        ServiceBuilder::new()
            .layer(error_handler())
            .layer(BufferLayer::new(1024))
            .layer(RateLimitLayer::new(req_per_sec, Duration::from_secs(1)))
    };

    let rate_limit_per_ip = |timeout: u64, limit: u32| {
        let config = Box::new(
            GovernorConfigBuilder::default()
                .per_second(timeout)
                .burst_size(limit)
                .use_headers()
                .key_extractor(SmartIpKeyExtractor)
                .finish()
                .expect("rate limit settings are non-zero"),
        );

        ServiceBuilder::new()
            .layer(error_handler())
            .layer(GovernorLayer {
                config: Box::leak(config),
            })
    };

    let cors = |methods: Vec<Method>| {
        ServiceBuilder::new().layer(
            CorsLayer::new()
                .allow_methods(methods)
                .allow_headers(Any)
                .allow_origin(Any),
        )
    };

    let trace_layer = TraceLayer::new_for_http()
        .make_span_with(DefaultMakeSpan::new().include_headers(true))
        .on_request(DefaultOnRequest::new().level(Level::INFO))
        .on_response(DefaultOnResponse::new().level(Level::INFO));

    // Define routes with their rate limits
    Router::new()
        // Bulk import (strictest limits, larger bodies)
        .route("/questions/import/preview", post(preview_import))
        .route("/questions/import", post(start_import))
        .layer(
            global_rate_limit(5)
                .layer(rate_limit_per_ip(10, 3))
                .layer(cors(vec![Method::POST]))
                .layer(DefaultBodyLimit::max(IMPORT_BODY_LIMIT)),
        )
        // Writes
        .route("/users/:id", delete(delete_user))
        .route("/tests", post(create_test))
        .route("/tests/:id", put(update_test).delete(delete_test))
        .route("/tests/:id/questions", post(add_test_questions))
        .route(
            "/tests/:id/questions/:question_id",
            delete(remove_test_question),
        )
        .route("/questions", post(create_question))
        .route("/questions/:id", put(update_question).delete(delete_question))
        .route("/questions/bulk-delete", post(bulk_delete_questions))
        .route("/materials", post(create_material))
        .route("/materials/:id", put(update_material).delete(delete_material))
        .route("/templates", post(create_template))
        .route("/templates/:id", put(update_template).delete(delete_template))
        .route("/templates/:id/duplicate", post(duplicate_template))
        .route("/banners", post(create_banner))
        .route("/banners/:id", delete(delete_banner))
        .route("/banners/:id/toggle", patch(toggle_banner))
        .route("/notifications", post(send_notification))
        .route("/notifications/:id", delete(delete_notification))
        .route("/news/:id", delete(delete_news_item))
        .route("/news/bulk-delete", post(bulk_delete_news))
        .route("/reports/:id", put(update_report))
        .route("/settings", put(save_settings))
        .route("/settings/admins", post(grant_admin))
        .route("/settings/admins/:id", delete(revoke_admin))
        .route("/database/:table/:id", delete(delete_table_row))
        .route("/database/:table/bulk-delete", post(bulk_delete_table_rows))
        .layer(
            global_rate_limit(100)
                .layer(rate_limit_per_ip(1, 30))
                .layer(cors(vec![
                    Method::POST,
                    Method::PUT,
                    Method::PATCH,
                    Method::DELETE,
                ]))
                .layer(CompressionLayer::new().zstd(true)),
        )
        // Reads
        .route("/dashboard/stats", get(get_dashboard_stats))
        .route("/analytics", get(get_analytics))
        .route("/analytics/export", get(export_analytics))
        .route("/users", get(list_users))
        .route("/users/export", get(export_users))
        .route("/users/:id", get(get_user))
        .route("/tests", get(list_tests))
        .route("/tests/:id", get(get_test))
        .route("/questions", get(list_questions))
        .route("/questions/:id", get(get_question))
        .route("/questions/import/template", get(download_import_template))
        .route("/questions/import/:job_id", get(get_import_status))
        .route("/materials", get(list_materials))
        .route("/templates", get(list_templates))
        .route("/banners", get(list_banners))
        .route("/notifications", get(list_notifications))
        .route("/news", get(list_news))
        .route("/reports", get(list_reports))
        .route("/audit-logs", get(list_audit_logs))
        .route("/login-logs", get(list_login_logs))
        .route("/settings", get(get_settings))
        .route("/settings/admins", get(list_admins))
        .route("/database/tables", get(list_tables))
        .route("/database/:table", get(browse_table))
        .route("/database/:table/export", get(export_table))
        .layer(
            global_rate_limit(1000)
                .layer(rate_limit_per_ip(1, 100))
                .layer(cors(vec![Method::GET]))
                .layer(CompressionLayer::new().zstd(true)),
        )
        // Every route above is admin only
        .route_layer(middleware::from_fn_with_state(db.clone(), require_admin))
        // Base routes
        .route("/", get(|| async { index() }))
        .route("/health", get(health_check))
        // Apply common middleware
        .layer(trace_layer)
        .with_state(db)
}
