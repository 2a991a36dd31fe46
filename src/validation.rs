use crate::db::models::{
    CreateBannerParams, CreateQuestionParams, CreateTemplateParams, CreateTestParams,
    MaterialChangeset, NewMaterial, QuestionChangeset, SendNotificationParams, TemplateTask,
    TestChangeset, UpdateReportParams, UpdateTemplateParams,
};

pub const TEST_TYPES: [&str; 4] = ["mock", "sectional", "pyq", "daily_practice"];
pub const DIFFICULTIES: [&str; 3] = ["easy", "medium", "hard"];
pub const REPORT_STATUSES: [&str; 4] = ["pending", "investigating", "resolved", "ignored"];
pub const CONTENT_TYPES: [&str; 3] = ["pdf", "formula", "current_affairs"];
pub const BANNER_TARGETS: [&str; 4] = ["none", "link", "test", "material"];
pub const NOTIFICATION_TYPES: [&str; 3] = ["info", "alert", "promo"];
pub const AUDIENCES: [&str; 3] = ["all", "free", "pro"];
pub const PLANS: [&str; 3] = ["free", "pro", "admin"];
pub const ANSWER_OPTIONS: [&str; 4] = ["a", "b", "c", "d"];

/// Validates that a required text field has content
pub fn validate_required(field: &str, value: &str) -> Result<(), String> {
    if value.trim().is_empty() {
        return Err(format!("{field} is required"));
    }
    Ok(())
}

/// Validates an enumerated value against its allowed set
pub fn validate_one_of(field: &str, value: &str, allowed: &[&str]) -> Result<(), String> {
    if allowed.contains(&value) {
        Ok(())
    } else {
        Err(format!(
            "Invalid {field} '{value}', expected one of: {}",
            allowed.join(", ")
        ))
    }
}

fn validate_optional_one_of(
    field: &str,
    value: Option<&str>,
    allowed: &[&str],
) -> Result<(), String> {
    value.map_or(Ok(()), |v| validate_one_of(field, v, allowed))
}

/// Validates HTTP/HTTPS URL
pub fn validate_http_url(value: &str) -> Result<(), String> {
    if value.trim().is_empty() {
        return Err("URL cannot be empty".to_string());
    }
    let url = url::Url::parse(value).map_err(|e| format!("Invalid URL: {}", e))?;
    match url.scheme() {
        "http" | "https" => {}
        _ => return Err("URL must use http or https scheme".to_string()),
    }
    if url.host_str().filter(|h| !h.is_empty()).is_none() {
        return Err("URL must have a valid host".to_string());
    }
    Ok(())
}

/// URL-safe slug: lowercase, with every run of other characters collapsed to one hyphen
pub fn slugify(title: &str) -> String {
    let mut slug = String::with_capacity(title.len());
    for c in title.chars() {
        if c.is_ascii_alphanumeric() {
            slug.push(c.to_ascii_lowercase());
        } else if !slug.is_empty() && !slug.ends_with('-') {
            slug.push('-');
        }
    }
    while slug.ends_with('-') {
        slug.pop();
    }
    slug
}

/// Sortable lists only accept whitelisted column names
pub fn validate_sort_column(value: &str, allowed: &[&str]) -> Result<(), String> {
    validate_one_of("sort column", value, allowed)
}

pub fn validate_new_test(params: &CreateTestParams) -> Result<(), String> {
    validate_required("title", &params.title)?;
    if slugify(&params.title).is_empty() {
        return Err("title must contain at least one letter or digit".to_string());
    }
    validate_optional_one_of("test_type", params.test_type.as_deref(), &TEST_TYPES)?;
    validate_optional_one_of("difficulty", params.difficulty.as_deref(), &DIFFICULTIES)?;
    if let (Some(total), Some(passing)) = (params.total_marks, params.passing_marks) {
        if passing > total {
            return Err("passing_marks cannot exceed total_marks".to_string());
        }
    }
    Ok(())
}

pub fn validate_new_question(params: &CreateQuestionParams) -> Result<(), String> {
    validate_required("question_text", &params.question_text)?;
    for (field, value) in [
        ("option_a", &params.option_a),
        ("option_b", &params.option_b),
        ("option_c", &params.option_c),
        ("option_d", &params.option_d),
    ] {
        validate_required(field, value)?;
    }
    validate_one_of(
        "correct_answer",
        &params.correct_answer.to_lowercase(),
        &ANSWER_OPTIONS,
    )?;
    validate_required("subject", &params.subject)?;
    validate_optional_one_of(
        "difficulty",
        params.difficulty.as_deref().map(str::to_lowercase).as_deref(),
        &DIFFICULTIES,
    )
}

pub fn validate_test_changes(changes: &TestChangeset) -> Result<(), String> {
    if let Some(title) = &changes.title {
        validate_required("title", title)?;
    }
    validate_optional_one_of("test_type", changes.test_type.as_deref(), &TEST_TYPES)?;
    validate_optional_one_of("difficulty", changes.difficulty.as_deref(), &DIFFICULTIES)
}

pub fn validate_question_changes(changes: &QuestionChangeset) -> Result<(), String> {
    for (field, value) in [
        ("question_text", &changes.question_text),
        ("option_a", &changes.option_a),
        ("option_b", &changes.option_b),
        ("option_c", &changes.option_c),
        ("option_d", &changes.option_d),
        ("subject", &changes.subject),
    ] {
        if let Some(value) = value {
            validate_required(field, value)?;
        }
    }
    validate_optional_one_of(
        "correct_answer",
        changes.correct_answer.as_deref(),
        &ANSWER_OPTIONS,
    )?;
    validate_optional_one_of("difficulty", changes.difficulty.as_deref(), &DIFFICULTIES)
}

/// PDFs need a file; every other material type carries its text inline
pub fn validate_material(material: &NewMaterial) -> Result<(), String> {
    validate_required("title", &material.title)?;
    validate_one_of("type", &material.content_type, &CONTENT_TYPES)?;
    if material.content_type == "pdf" {
        let file_url = material.file_url.as_deref().unwrap_or_default();
        validate_http_url(file_url).map_err(|e| format!("file_url: {e}"))
    } else {
        validate_required("content_text", material.content_text.as_deref().unwrap_or_default())
    }
}

pub fn validate_material_changes(changes: &MaterialChangeset) -> Result<(), String> {
    if let Some(title) = &changes.title {
        validate_required("title", title)?;
    }
    validate_optional_one_of("type", changes.content_type.as_deref(), &CONTENT_TYPES)?;
    if let Some(file_url) = &changes.file_url {
        validate_http_url(file_url).map_err(|e| format!("file_url: {e}"))?;
    }
    Ok(())
}

pub fn validate_banner(params: &CreateBannerParams) -> Result<(), String> {
    validate_required("title", &params.title)?;
    validate_http_url(&params.image_url).map_err(|e| format!("image_url: {e}"))?;
    validate_optional_one_of("target_type", params.target_type.as_deref(), &BANNER_TARGETS)?;
    if params.target_type.as_deref() == Some("link") {
        validate_http_url(params.target_value.as_deref().unwrap_or_default())
            .map_err(|e| format!("target_value: {e}"))?;
    }
    Ok(())
}

pub fn validate_notification(params: &SendNotificationParams) -> Result<(), String> {
    validate_required("title", &params.title)?;
    validate_required("message", &params.message)?;
    validate_optional_one_of("type", params.notification_type.as_deref(), &NOTIFICATION_TYPES)?;
    validate_optional_one_of(
        "target_audience",
        params.target_audience.as_deref(),
        &AUDIENCES,
    )
}

pub fn validate_report_update(params: &UpdateReportParams) -> Result<(), String> {
    validate_one_of("status", &params.status, &REPORT_STATUSES)
}

/// A template needs at least one task, each with a title and a subject
fn validate_template_tasks(tasks: &[TemplateTask]) -> Result<(), String> {
    if tasks.is_empty() {
        return Err("At least one task is required".to_string());
    }
    for (index, task) in tasks.iter().enumerate() {
        let number = index + 1;
        validate_required("title", &task.title).map_err(|e| format!("Task {number}: {e}"))?;
        validate_required("subject", &task.subject).map_err(|e| format!("Task {number}: {e}"))?;
    }
    Ok(())
}

pub fn validate_template(params: &CreateTemplateParams) -> Result<(), String> {
    validate_required("title", &params.title)?;
    validate_template_tasks(&params.tasks)
}

pub fn validate_template_changes(params: &UpdateTemplateParams) -> Result<(), String> {
    if let Some(title) = &params.title {
        validate_required("title", title)?;
    }
    match &params.tasks {
        Some(tasks) => validate_template_tasks(tasks),
        None => Ok(()),
    }
}
