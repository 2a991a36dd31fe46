use super::{attachment, audit, deleted, invalid, ok, read_error, write_error, JsonResponse};
use crate::api::auth::AdminUser;
use crate::db::browser::BrowsableTable;
use crate::db::models::{
    BulkDeleteParams, DeleteResponse, MessageResponse, Page, SearchPageParams,
};
use crate::db::DbClient;
use crate::logging::log_to_file;
use crate::services::csv_export::{export_file_name, rows_to_csv};
use axum::{
    extract::{Path, Query, State},
    response::{IntoResponse, Response},
    Extension, Json,
};
use chrono::Utc;
use serde_json::{json, Value};
use tracing::info;
use uuid::Uuid;

/// # Endpoint: GET /database/tables
pub(crate) async fn list_tables() -> JsonResponse<Vec<&'static str>> {
    ok(BrowsableTable::ALL.iter().map(BrowsableTable::name).collect())
}

/// # Endpoint: GET /database/:table
///
/// Raw rows, newest first. Only some tables support `search`.
pub(crate) async fn browse_table(
    State(db): State<DbClient>,
    Path(table): Path<String>,
    Query(params): Query<SearchPageParams>,
) -> JsonResponse<Page<Value>> {
    let table = match table.parse::<BrowsableTable>() {
        Ok(table) => table,
        Err(err) => return read_error(err, "Unknown table"),
    };

    match db.browse_table(table, &params).await {
        Ok(page) => ok(page),
        Err(err) => read_error(err, "Failed to browse table"),
    }
}

/// # Endpoint: GET /database/:table/export
pub(crate) async fn export_table(
    State(db): State<DbClient>,
    Path(table): Path<String>,
) -> Response {
    let table = match table.parse::<BrowsableTable>() {
        Ok(table) => table,
        Err(err) => return read_error::<()>(err, "Unknown table").into_response(),
    };

    let rows = match db.export_table(table).await {
        Ok(rows) => rows,
        Err(err) => return read_error::<()>(err, "Failed to export table").into_response(),
    };

    info!("Exporting {} rows of {}", rows.len(), table);
    match rows_to_csv(&rows) {
        Some(csv) => attachment(
            "text/csv; charset=utf-8",
            &export_file_name(table.name(), Utc::now()),
            csv,
        ),
        None => ok(MessageResponse::success(format!("{table} has no rows to export")))
            .into_response(),
    }
}

/// # Endpoint: DELETE /database/:table/:id
pub(crate) async fn delete_table_row(
    State(db): State<DbClient>,
    Extension(admin): Extension<AdminUser>,
    Path((table, row_id)): Path<(String, Uuid)>,
) -> JsonResponse<DeleteResponse> {
    log_to_file("DELETE", &format!("/database/{table}/{row_id}"), None);

    let table = match table.parse::<BrowsableTable>() {
        Ok(table) => table,
        Err(err) => return read_error(err, "Unknown table"),
    };

    match db.delete_table_rows(table, &[row_id]).await {
        Ok(count) => {
            if count > 0 {
                audit(&db, admin, "delete_row", table.name(), Some(row_id.to_string()), None)
                    .await;
            }
            deleted(count)
        }
        Err(err) => write_error(err, "Failed to delete row"),
    }
}

/// # Endpoint: POST /database/:table/bulk-delete
pub(crate) async fn bulk_delete_table_rows(
    State(db): State<DbClient>,
    Extension(admin): Extension<AdminUser>,
    Path(table): Path<String>,
    Json(payload): Json<BulkDeleteParams>,
) -> JsonResponse<DeleteResponse> {
    log_to_file(
        "POST",
        &format!("/database/{table}/bulk-delete"),
        Some(&json!({ "ids": payload.ids })),
    );

    let table = match table.parse::<BrowsableTable>() {
        Ok(table) => table,
        Err(err) => return read_error(err, "Unknown table"),
    };
    if payload.ids.is_empty() {
        return invalid("ids must not be empty");
    }

    match db.delete_table_rows(table, &payload.ids).await {
        Ok(count) => {
            if count > 0 {
                audit(
                    &db,
                    admin,
                    "bulk_delete_rows",
                    table.name(),
                    None,
                    Some(json!({ "ids": payload.ids, "deleted": count })),
                )
                .await;
            }
            deleted(count)
        }
        Err(err) => write_error(err, "Failed to delete rows"),
    }
}
