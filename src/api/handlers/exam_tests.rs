use super::{
    audit, created, deleted, error_response, invalid, ok, read_error, write_error, JsonResponse,
};
use crate::api::auth::AdminUser;
use crate::db::models::{
    AddQuestionsParams, CreateTestParams, DeleteResponse, NewTest, Test, TestChangeset,
    TestDetailResponse, TestListParams, TestQuestion,
};
use crate::db::DbClient;
use crate::errors::ErrorMessages;
use crate::logging::log_to_file;
use crate::validation::{validate_new_test, validate_test_changes};
use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Extension, Json,
};
use serde_json::json;
use uuid::Uuid;

/// # Endpoint: GET /tests
pub(crate) async fn list_tests(
    State(db): State<DbClient>,
    Query(params): Query<TestListParams>,
) -> JsonResponse<Vec<Test>> {
    match db.list_tests(&params).await {
        Ok(tests) => ok(tests),
        Err(err) => read_error(err, "Failed to list tests"),
    }
}

/// # Endpoint: GET /tests/:id
///
/// The test with its linked questions in test order
pub(crate) async fn get_test(
    State(db): State<DbClient>,
    Path(test_id): Path<Uuid>,
) -> JsonResponse<TestDetailResponse> {
    match db.get_test_detail(test_id).await {
        Ok(detail) => ok(detail),
        Err(err) => read_error(err, "Failed to load test"),
    }
}

/// # Endpoint: POST /tests
///
/// The slug is derived from the title; counters start at zero
pub(crate) async fn create_test(
    State(db): State<DbClient>,
    Extension(admin): Extension<AdminUser>,
    Json(payload): Json<CreateTestParams>,
) -> JsonResponse<Test> {
    log_to_file("POST", "/tests", Some(&json!({ "title": payload.title })));

    if let Err(e) = validate_new_test(&payload) {
        return invalid(e);
    }

    match db.create_test(NewTest::from(payload)).await {
        Ok(test) => {
            audit(
                &db,
                admin,
                "create_test",
                "tests",
                Some(test.id.to_string()),
                Some(json!({ "title": test.title, "slug": test.slug })),
            )
            .await;
            created(test)
        }
        Err(err) => write_error(err, "Failed to create test"),
    }
}

/// # Endpoint: PUT /tests/:id
pub(crate) async fn update_test(
    State(db): State<DbClient>,
    Extension(admin): Extension<AdminUser>,
    Path(test_id): Path<Uuid>,
    Json(changes): Json<TestChangeset>,
) -> JsonResponse<Test> {
    log_to_file("PUT", &format!("/tests/{test_id}"), None);

    if let Err(e) = validate_test_changes(&changes) {
        return invalid(e);
    }

    match db.update_test(test_id, &changes).await {
        Ok(test) => {
            audit(&db, admin, "update_test", "tests", Some(test_id.to_string()), None).await;
            ok(test)
        }
        Err(err) => write_error(err, "Failed to update test"),
    }
}

/// # Endpoint: DELETE /tests/:id
pub(crate) async fn delete_test(
    State(db): State<DbClient>,
    Extension(admin): Extension<AdminUser>,
    Path(test_id): Path<Uuid>,
) -> JsonResponse<DeleteResponse> {
    log_to_file("DELETE", &format!("/tests/{test_id}"), None);

    match db.delete_test(test_id).await {
        Ok(count) => {
            if count > 0 {
                audit(&db, admin, "delete_test", "tests", Some(test_id.to_string()), None).await;
            }
            deleted(count)
        }
        Err(err) => write_error(err, "Failed to delete test"),
    }
}

/// # Endpoint: POST /tests/:id/questions
///
/// Links existing questions after the test's current ones
pub(crate) async fn add_test_questions(
    State(db): State<DbClient>,
    Extension(admin): Extension<AdminUser>,
    Path(test_id): Path<Uuid>,
    Json(payload): Json<AddQuestionsParams>,
) -> JsonResponse<Vec<TestQuestion>> {
    log_to_file(
        "POST",
        &format!("/tests/{test_id}/questions"),
        Some(&json!({ "question_ids": payload.question_ids })),
    );

    if payload.question_ids.is_empty() {
        return invalid("question_ids must not be empty");
    }

    match db.test_exists(test_id).await {
        Ok(true) => {}
        Ok(false) => return error_response(StatusCode::NOT_FOUND, ErrorMessages::NotFound),
        Err(err) => return read_error(err, "Failed to look up test"),
    }

    match db.add_questions_to_test(test_id, &payload.question_ids).await {
        Ok(links) => {
            audit(
                &db,
                admin,
                "add_test_questions",
                "test_questions",
                Some(test_id.to_string()),
                Some(json!({ "question_ids": payload.question_ids })),
            )
            .await;
            created(links)
        }
        Err(err) => write_error(err, "Failed to link questions"),
    }
}

/// # Endpoint: DELETE /tests/:id/questions/:question_id
pub(crate) async fn remove_test_question(
    State(db): State<DbClient>,
    Extension(admin): Extension<AdminUser>,
    Path((test_id, question_id)): Path<(Uuid, Uuid)>,
) -> JsonResponse<DeleteResponse> {
    log_to_file(
        "DELETE",
        &format!("/tests/{test_id}/questions/{question_id}"),
        None,
    );

    match db.remove_question_from_test(test_id, question_id).await {
        Ok(count) => {
            if count > 0 {
                audit(
                    &db,
                    admin,
                    "remove_test_question",
                    "test_questions",
                    Some(test_id.to_string()),
                    Some(json!({ "question_id": question_id })),
                )
                .await;
            }
            deleted(count)
        }
        Err(err) => write_error(err, "Failed to unlink question"),
    }
}
