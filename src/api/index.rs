use axum::Json;
use serde_json::{json, Value};
use std::sync::OnceLock;

/// Static JSON response for the index endpoint
static INDEX_JSON: OnceLock<Value> = OnceLock::new();

fn endpoint(method: &str, path: &str, description: &str, params: Value) -> Value {
    json!({
        "path": path,
        "method": method,
        "description": description,
        "params": params
    })
}

fn paging(extra: Value) -> Value {
    let mut params = json!({
        "page": { "type": "integer", "required": false, "description": "1-based page number" },
        "page_size": { "type": "integer", "required": false, "description": "Rows per page, at most 100" }
    });
    if let (Some(params), Value::Object(extra)) = (params.as_object_mut(), extra) {
        params.extend(extra);
    }
    params
}

/// Handler for the index endpoint that provides API documentation
///
/// # Endpoint: GET /
///
/// Every route except `/` and `/health` requires the `Authorization` service secret and an
/// `X-Admin-Id` header naming a user on the `admin` plan.
pub fn index() -> Json<Value> {
    let value = INDEX_JSON.get_or_init(|| {
        json!({
            "auth": {
                "headers": ["Authorization", "X-Admin-Id"],
                "description": "Service secret plus the id of a user on the admin plan"
            },
            "endpoints": [
                endpoint("GET", "/", "API endpoint documentation", json!({})),
                endpoint("GET", "/health", "Database and redis connectivity", json!({})),
                endpoint("GET", "/dashboard/stats", "User, test and question totals and weekly active users", json!({})),
                endpoint("GET", "/analytics", "Platform analytics for a window", json!({
                    "range": { "type": "string", "required": false, "description": "7days, 30days (default), 90days or 1year" }
                })),
                endpoint("GET", "/analytics/export", "Analytics summary as a text download", json!({
                    "range": { "type": "string", "required": false, "description": "Same as /analytics" }
                })),
                endpoint("GET", "/users", "Paginated users, newest first", paging(json!({
                    "plan": { "type": "string", "required": false, "description": "free, pro, admin or all" },
                    "search": { "type": "string", "required": false, "description": "Matches name, phone or email" }
                }))),
                endpoint("GET", "/users/export", "All users as CSV", json!({})),
                endpoint("GET", "/users/:id", "User with performance summary, subject performance and recent attempts", json!({})),
                endpoint("DELETE", "/users/:id", "Delete a user", json!({})),
                endpoint("GET", "/tests", "Tests, newest first", json!({
                    "test_type": { "type": "string", "required": false, "description": "mock, sectional, pyq, daily_practice or all" },
                    "search": { "type": "string", "required": false, "description": "Matches the English or Hindi title" }
                })),
                endpoint("POST", "/tests", "Create a test; the slug is derived from the title", json!({
                    "title": { "type": "string", "required": true },
                    "title_hi": { "type": "string", "required": false },
                    "description": { "type": "string", "required": false },
                    "test_type": { "type": "string", "required": false, "description": "Defaults to mock" },
                    "duration_minutes": { "type": "integer", "required": false, "description": "Defaults to 60" },
                    "total_marks": { "type": "integer", "required": false, "description": "Defaults to 200" },
                    "passing_marks": { "type": "integer", "required": false, "description": "Defaults to 70" },
                    "difficulty": { "type": "string", "required": false, "description": "Defaults to medium" },
                    "is_free": { "type": "boolean", "required": false }
                })),
                endpoint("GET", "/tests/:id", "Test with linked questions in order", json!({})),
                endpoint("PUT", "/tests/:id", "Update a test; the slug never changes", json!({})),
                endpoint("DELETE", "/tests/:id", "Delete a test", json!({})),
                endpoint("POST", "/tests/:id/questions", "Link existing questions after the current ones", json!({
                    "question_ids": { "type": "array", "items": "string", "required": true }
                })),
                endpoint("DELETE", "/tests/:id/questions/:question_id", "Unlink a question from a test", json!({})),
                endpoint("GET", "/questions", "Paginated questions", paging(json!({
                    "subject": { "type": "string", "required": false },
                    "difficulty": { "type": "string", "required": false },
                    "search": { "type": "string", "required": false, "description": "Matches the question text" }
                }))),
                endpoint("POST", "/questions", "Create a question, optionally linking it to a test", json!({
                    "test_id": { "type": "string", "required": false, "description": "Links the question after the test's last question" }
                })),
                endpoint("GET", "/questions/:id", "Single question", json!({})),
                endpoint("PUT", "/questions/:id", "Update a question", json!({})),
                endpoint("DELETE", "/questions/:id", "Delete a question", json!({})),
                endpoint("POST", "/questions/bulk-delete", "Delete several questions", json!({
                    "ids": { "type": "array", "items": "string", "required": true }
                })),
                endpoint("POST", "/questions/import/preview", "Validate a CSV/XLSX question file without saving", json!({
                    "file": { "type": "multipart file", "required": true }
                })),
                endpoint("POST", "/questions/import", "Start a background import into a test", json!({
                    "test_id": { "type": "string", "required": true, "description": "Query parameter" },
                    "file": { "type": "multipart file", "required": true }
                })),
                endpoint("GET", "/questions/import/template", "Download the import template", json!({
                    "format": { "type": "string", "required": false, "description": "csv or xlsx (default)" }
                })),
                endpoint("GET", "/questions/import/:job_id", "Progress of an import job", json!({})),
                endpoint("GET", "/materials", "Study materials", json!({
                    "type": { "type": "string", "required": false },
                    "search": { "type": "string", "required": false },
                    "sort": { "type": "string", "required": false, "description": "created_at, title, type, language or file_size" },
                    "order": { "type": "string", "required": false, "description": "asc or desc" }
                })),
                endpoint("POST", "/materials", "Create a study material; pdf needs file_url, others content_text", json!({})),
                endpoint("PUT", "/materials/:id", "Update a study material", json!({})),
                endpoint("DELETE", "/materials/:id", "Delete a study material", json!({})),
                endpoint("GET", "/templates", "Study plan templates", json!({
                    "search": { "type": "string", "required": false, "description": "Matches the title" },
                    "sort": { "type": "string", "required": false, "description": "created_at (default) or title" },
                    "order": { "type": "string", "required": false, "description": "asc or desc" }
                })),
                endpoint("POST", "/templates", "Create a study plan template", json!({
                    "title": { "type": "string", "required": true },
                    "description": { "type": "string", "required": false },
                    "tasks": { "type": "array", "items": "{ title, subject, description? }", "required": true },
                    "is_active": { "type": "boolean", "required": false }
                })),
                endpoint("PUT", "/templates/:id", "Update a study plan template", json!({})),
                endpoint("POST", "/templates/:id/duplicate", "Copy a template with \"(Copy)\" appended to the title", json!({})),
                endpoint("DELETE", "/templates/:id", "Delete a study plan template", json!({})),
                endpoint("GET", "/banners", "Banners by display order", json!({})),
                endpoint("POST", "/banners", "Create an active banner", json!({
                    "title": { "type": "string", "required": true },
                    "image_url": { "type": "string", "required": true },
                    "target_type": { "type": "string", "required": false, "description": "none, link, test or material" },
                    "target_value": { "type": "string", "required": false },
                    "display_order": { "type": "integer", "required": false }
                })),
                endpoint("PATCH", "/banners/:id/toggle", "Flip a banner's active flag", json!({})),
                endpoint("DELETE", "/banners/:id", "Delete a banner", json!({})),
                endpoint("GET", "/notifications", "Most recent notifications", json!({})),
                endpoint("POST", "/notifications", "Send a notification", json!({
                    "title": { "type": "string", "required": true },
                    "message": { "type": "string", "required": true },
                    "type": { "type": "string", "required": false, "description": "info (default), alert or promo" },
                    "target_audience": { "type": "string", "required": false, "description": "all (default), free or pro" }
                })),
                endpoint("DELETE", "/notifications/:id", "Delete a notification", json!({})),
                endpoint("GET", "/news", "Paginated news by publication date", paging(json!({
                    "search": { "type": "string", "required": false, "description": "Matches the title" }
                }))),
                endpoint("DELETE", "/news/:id", "Delete a news item", json!({})),
                endpoint("POST", "/news/bulk-delete", "Delete several news items", json!({
                    "ids": { "type": "array", "items": "string", "required": true }
                })),
                endpoint("GET", "/reports", "User reports", json!({
                    "status": { "type": "string", "required": false, "description": "pending (default), investigating, resolved, ignored or all" }
                })),
                endpoint("PUT", "/reports/:id", "Update report status and admin note", json!({
                    "status": { "type": "string", "required": true },
                    "admin_note": { "type": "string", "required": false }
                })),
                endpoint("GET", "/audit-logs", "Admin audit trail, newest first", paging(json!({
                    "search": { "type": "string", "required": false, "description": "Matches the action" }
                }))),
                endpoint("GET", "/login-logs", "Ten latest admin sign-ins and admins active in the last day", json!({})),
                endpoint("GET", "/settings", "All settings sections", json!({})),
                endpoint("PUT", "/settings", "Save settings sections", json!({
                    "sections": { "type": "object", "required": true, "description": "Section name to value" }
                })),
                endpoint("GET", "/settings/admins", "Users on the admin plan", json!({})),
                endpoint("POST", "/settings/admins", "Grant admin access by email", json!({
                    "email": { "type": "string", "required": true }
                })),
                endpoint("DELETE", "/settings/admins/:id", "Revoke admin access", json!({})),
                endpoint("GET", "/database/tables", "Tables the database browser can open", json!({})),
                endpoint("GET", "/database/:table", "Raw table rows, newest first", paging(json!({
                    "search": { "type": "string", "required": false, "description": "Only users, tests, questions and content" }
                }))),
                endpoint("GET", "/database/:table/export", "Whole table as CSV", json!({})),
                endpoint("DELETE", "/database/:table/:id", "Delete a row", json!({})),
                endpoint("POST", "/database/:table/bulk-delete", "Delete several rows", json!({
                    "ids": { "type": "array", "items": "string", "required": true }
                }))
            ]
        })
    });

    Json(value.clone())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_index_lists_endpoints() {
        let Json(value) = index();
        let endpoints = value["endpoints"].as_array().unwrap();
        assert!(endpoints
            .iter()
            .any(|e| e["path"] == "/questions/import" && e["method"] == "POST"));
        assert!(endpoints.iter().all(|e| e["params"].is_object()));
    }

    #[test]
    fn test_paging_merges_extra_params() {
        let params = paging(json!({ "search": { "type": "string" } }));
        let keys: Vec<&String> = params.as_object().unwrap().keys().collect();
        assert_eq!(keys, vec!["page", "page_size", "search"]);
    }
}
