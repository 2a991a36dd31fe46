use super::{
    audit, created, deleted, error_response, invalid, ok, read_error, write_error, JsonResponse,
};
use crate::api::auth::AdminUser;
use crate::db::models::{
    BulkDeleteParams, CreateQuestionParams, CreatedQuestionResponse, DeleteResponse, NewQuestion,
    Page, Question, QuestionChangeset, QuestionListParams,
};
use crate::db::DbClient;
use crate::errors::ErrorMessages;
use crate::logging::log_to_file;
use crate::validation::{validate_new_question, validate_question_changes};
use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Extension, Json,
};
use serde_json::json;
use uuid::Uuid;

/// # Endpoint: GET /questions
///
/// Query: `page`, `page_size`, `subject`, `difficulty`, `search` over the question text
pub(crate) async fn list_questions(
    State(db): State<DbClient>,
    Query(params): Query<QuestionListParams>,
) -> JsonResponse<Page<Question>> {
    match db.list_questions(&params).await {
        Ok(page) => ok(page),
        Err(err) => read_error(err, "Failed to list questions"),
    }
}

/// # Endpoint: GET /questions/:id
pub(crate) async fn get_question(
    State(db): State<DbClient>,
    Path(question_id): Path<Uuid>,
) -> JsonResponse<Question> {
    match db.get_question(question_id).await {
        Ok(question) => ok(question),
        Err(err) => read_error(err, "Failed to load question"),
    }
}

/// # Endpoint: POST /questions
///
/// With `test_id`, the new question is linked after the test's last question
pub(crate) async fn create_question(
    State(db): State<DbClient>,
    Extension(admin): Extension<AdminUser>,
    Json(payload): Json<CreateQuestionParams>,
) -> JsonResponse<CreatedQuestionResponse> {
    log_to_file(
        "POST",
        "/questions",
        Some(&json!({ "subject": payload.subject, "test_id": payload.test_id })),
    );

    if let Err(e) = validate_new_question(&payload) {
        return invalid(e);
    }

    let test_id = payload.test_id;
    if let Some(test_id) = test_id {
        match db.test_exists(test_id).await {
            Ok(true) => {}
            Ok(false) => return error_response(StatusCode::NOT_FOUND, ErrorMessages::NotFound),
            Err(err) => return read_error(err, "Failed to look up test"),
        }
    }

    match db.create_question(NewQuestion::from(payload), test_id).await {
        Ok(response) => {
            audit(
                &db,
                admin,
                "create_question",
                "questions",
                Some(response.question.id.to_string()),
                Some(json!({ "test_id": test_id, "order_index": response.order_index })),
            )
            .await;
            created(response)
        }
        Err(err) => write_error(err, "Failed to create question"),
    }
}

/// # Endpoint: PUT /questions/:id
pub(crate) async fn update_question(
    State(db): State<DbClient>,
    Extension(admin): Extension<AdminUser>,
    Path(question_id): Path<Uuid>,
    Json(mut changes): Json<QuestionChangeset>,
) -> JsonResponse<Question> {
    log_to_file("PUT", &format!("/questions/{question_id}"), None);

    changes.correct_answer = changes.correct_answer.map(|a| a.trim().to_lowercase());
    changes.difficulty = changes.difficulty.map(|d| d.trim().to_lowercase());
    if let Err(e) = validate_question_changes(&changes) {
        return invalid(e);
    }

    match db.update_question(question_id, &changes).await {
        Ok(question) => {
            audit(
                &db,
                admin,
                "update_question",
                "questions",
                Some(question_id.to_string()),
                None,
            )
            .await;
            ok(question)
        }
        Err(err) => write_error(err, "Failed to update question"),
    }
}

/// # Endpoint: DELETE /questions/:id
pub(crate) async fn delete_question(
    State(db): State<DbClient>,
    Extension(admin): Extension<AdminUser>,
    Path(question_id): Path<Uuid>,
) -> JsonResponse<DeleteResponse> {
    log_to_file("DELETE", &format!("/questions/{question_id}"), None);

    match db.delete_question(question_id).await {
        Ok(count) => {
            if count > 0 {
                audit(
                    &db,
                    admin,
                    "delete_question",
                    "questions",
                    Some(question_id.to_string()),
                    None,
                )
                .await;
            }
            deleted(count)
        }
        Err(err) => write_error(err, "Failed to delete question"),
    }
}

/// # Endpoint: POST /questions/bulk-delete
pub(crate) async fn bulk_delete_questions(
    State(db): State<DbClient>,
    Extension(admin): Extension<AdminUser>,
    Json(payload): Json<BulkDeleteParams>,
) -> JsonResponse<DeleteResponse> {
    log_to_file(
        "POST",
        "/questions/bulk-delete",
        Some(&json!({ "ids": payload.ids })),
    );

    if payload.ids.is_empty() {
        return invalid("ids must not be empty");
    }

    match db.delete_questions(&payload.ids).await {
        Ok(count) => {
            if count > 0 {
                audit(
                    &db,
                    admin,
                    "bulk_delete_questions",
                    "questions",
                    None,
                    Some(json!({ "ids": payload.ids, "deleted": count })),
                )
                .await;
            }
            deleted(count)
        }
        Err(err) => write_error(err, "Failed to delete questions"),
    }
}
