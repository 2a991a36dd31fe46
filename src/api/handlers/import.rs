use super::{
    accepted, attachment, audit, error_response, ok, read_error, write_error, JsonResponse,
};
use crate::api::auth::AdminUser;
use crate::db::models::{
    ImportAcceptedResponse, ImportJobState, ImportParams, ImportPreviewResponse, JobStatus,
    TemplateParams,
};
use crate::db::DbClient;
use crate::errors::{ApiError, ErrorMessages};
use crate::logging::{log_to_file, ACTION_LOG_TARGET};
use crate::services::importer::{
    parse_spreadsheet, question_template, spawn_import_job, validate_rows, CommitMode,
    ImportPreview, TemplateFormat, PREVIEW_SAMPLE_SIZE,
};
use crate::{Result, CONFIG};
use axum::{
    extract::{Multipart, Path, Query, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    Extension,
};
use serde_json::json;
use tracing::info;
use uuid::Uuid;

/// Multipart field carrying the spreadsheet
const FILE_FIELD: &str = "file";

/// Name and contents of the uploaded spreadsheet
async fn read_upload(mut multipart: Multipart) -> Result<(String, Vec<u8>)> {
    while let Some(field) = multipart.next_field().await? {
        if field.name() == Some(FILE_FIELD) {
            let file_name = field.file_name().unwrap_or_default().to_string();
            let bytes = field.bytes().await?;
            return Ok((file_name, bytes.to_vec()));
        }
    }
    Err(ApiError::Validation(format!(
        "Missing multipart field '{FILE_FIELD}'"
    )))
}

async fn parse_upload(multipart: Multipart) -> Result<(String, ImportPreview)> {
    let (file_name, bytes) = read_upload(multipart).await?;
    let rows = parse_spreadsheet(&file_name, &bytes)?;
    info!("Parsed {} rows from {}", rows.len(), file_name);
    Ok((file_name, validate_rows(&rows)))
}

fn preview_response(preview: &ImportPreview) -> ImportPreviewResponse {
    ImportPreviewResponse {
        valid_count: preview.valid.len(),
        error_count: preview.errors.len(),
        errors: preview.errors.clone(),
        sample: preview
            .valid
            .iter()
            .take(PREVIEW_SAMPLE_SIZE)
            .cloned()
            .collect(),
    }
}

/// Why a validated file cannot be uploaded
fn rejection_message(preview: &ImportPreview) -> String {
    if preview.errors.is_empty() {
        "No valid questions found in the file".to_string()
    } else {
        format!(
            "Fix {} invalid rows before uploading: {}",
            preview.errors.len(),
            preview.errors.join("; ")
        )
    }
}

/// # Endpoint: POST /questions/import/preview
///
/// Parses and validates the multipart `file` without writing anything
pub(crate) async fn preview_import(multipart: Multipart) -> JsonResponse<ImportPreviewResponse> {
    match parse_upload(multipart).await {
        Ok((_, preview)) => ok(preview_response(&preview)),
        Err(err) => read_error(err, "Failed to read import file"),
    }
}

/// # Endpoint: POST /questions/import?test_id=...
///
/// Validates the file synchronously, then uploads it on a background job.
/// Files with any invalid row are refused with 422.
pub(crate) async fn start_import(
    State(db): State<DbClient>,
    Extension(admin): Extension<AdminUser>,
    Query(params): Query<ImportParams>,
    multipart: Multipart,
) -> JsonResponse<ImportAcceptedResponse> {
    let test_id = params.test_id;
    log_to_file(
        "POST",
        "/questions/import",
        Some(&json!({ "test_id": test_id })),
    );

    let (file_name, preview) = match parse_upload(multipart).await {
        Ok(parsed) => parsed,
        Err(err) => return read_error(err, "Failed to read import file"),
    };

    if !preview.is_uploadable() {
        return error_response(
            StatusCode::UNPROCESSABLE_ENTITY,
            rejection_message(&preview),
        );
    }

    match db.test_exists(test_id).await {
        Ok(true) => {}
        Ok(false) => return error_response(StatusCode::NOT_FOUND, ErrorMessages::NotFound),
        Err(err) => return read_error(err, "Failed to look up test"),
    }

    let job_id = Uuid::new_v4();
    let total = preview.valid.len();
    let state = ImportJobState::started(job_id, test_id, total);
    if let Err(err) = db.set_import_job(&state).await {
        return write_error(err, "Failed to record import job");
    }

    info!(
        target: ACTION_LOG_TARGET,
        "Admin {} started import job {} of {} questions from {} into test {}",
        admin.id, job_id, total, file_name, test_id
    );
    audit(
        &db,
        admin,
        "import_questions",
        "questions",
        Some(test_id.to_string()),
        Some(json!({ "job_id": job_id, "file_name": file_name, "questions": total })),
    )
    .await;

    spawn_import_job(
        db.clone(),
        state,
        preview.valid,
        CONFIG.import_batch_size,
        CommitMode::from_flag(CONFIG.import_atomic),
    );

    job_accepted(job_id, total)
}

/// 202 pointing the caller at the job to poll
fn job_accepted(job_id: Uuid, total: usize) -> JsonResponse<ImportAcceptedResponse> {
    accepted(ImportAcceptedResponse {
        status: JobStatus::InProgress,
        job_id,
        message: format!("Importing {total} questions"),
    })
}

/// # Endpoint: GET /questions/import/:job_id
pub(crate) async fn get_import_status(
    State(db): State<DbClient>,
    Path(job_id): Path<Uuid>,
) -> JsonResponse<ImportJobState> {
    match db.get_import_job(job_id).await {
        Ok(Some(state)) => ok(state),
        Ok(None) => error_response(StatusCode::NOT_FOUND, ErrorMessages::ImportJobMissing),
        Err(err) => read_error(err, "Failed to read import job"),
    }
}

/// # Endpoint: GET /questions/import/template?format=csv|xlsx
pub(crate) async fn download_import_template(Query(params): Query<TemplateParams>) -> Response {
    let format = match params.format.as_deref() {
        Some(requested) => match requested.parse::<TemplateFormat>() {
            Ok(format) => format,
            Err(err) => return read_error::<()>(err, "Bad template format").into_response(),
        },
        None => TemplateFormat::default(),
    };

    match question_template(format) {
        Ok(bytes) => attachment(format.content_type(), format.file_name(), bytes),
        Err(err) => read_error::<()>(err, "Failed to build template").into_response(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::services::importer::upload::tests::question;
    use axum::Json;

    #[test]
    fn test_preview_samples_first_valid_questions() {
        let preview = ImportPreview {
            valid: (1..=5).map(question).collect(),
            errors: vec!["Row 4: Missing subject".to_string()],
        };
        let response = preview_response(&preview);

        assert_eq!(response.valid_count, 5);
        assert_eq!(response.error_count, 1);
        assert_eq!(response.sample.len(), PREVIEW_SAMPLE_SIZE);
        assert_eq!(response.sample[0], question(1));
    }

    #[test]
    fn test_rejection_message() {
        let empty = ImportPreview {
            valid: Vec::new(),
            errors: Vec::new(),
        };
        assert_eq!(rejection_message(&empty), "No valid questions found in the file");

        let invalid = ImportPreview {
            valid: vec![question(1)],
            errors: vec![
                "Row 3: Invalid correct_option (must be a, b, c, or d)".to_string(),
                "Row 5: Missing options".to_string(),
            ],
        };
        assert_eq!(
            rejection_message(&invalid),
            "Fix 2 invalid rows before uploading: \
             Row 3: Invalid correct_option (must be a, b, c, or d); Row 5: Missing options"
        );
    }

    #[test]
    fn test_accepted_job_points_at_job() {
        let job_id = Uuid::new_v4();
        let (status, Json(body)) = job_accepted(job_id, 12);

        assert_eq!(status, StatusCode::ACCEPTED);
        let body = serde_json::to_value(body).unwrap();
        assert_eq!(body["job_id"], json!(job_id));
        assert_eq!(body["status"], json!(JobStatus::InProgress));
        assert_eq!(body["message"], "Importing 12 questions");
    }
}
