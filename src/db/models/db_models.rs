use crate::schema::{
    app_banners, app_notifications, audit_logs, content, news, questions, settings,
    study_templates, test_questions, tests, user_reports, users,
};
use chrono::{DateTime, Utc};
use diesel::prelude::*;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use uuid::Uuid;

pub const ADMIN_PLAN: &str = "admin";
pub const DEFAULT_PLAN: &str = "free";
pub const DEFAULT_DIFFICULTY: &str = "medium";

#[derive(Clone, Debug, Serialize, Deserialize, Queryable, Selectable, Identifiable)]
#[diesel(table_name = users, check_for_backend(diesel::pg::Pg))]
pub struct User {
    pub id: Uuid,
    pub phone: String,
    pub email: Option<String>,
    pub name: Option<String>,
    pub plan: String,
    pub exam_type: Option<String>,
    pub coins: i32,
    pub streak_days: i32,
    pub created_at: DateTime<Utc>,
    pub last_active_date: Option<DateTime<Utc>>,
}

impl User {
    pub fn is_admin(&self) -> bool {
        self.plan == ADMIN_PLAN
    }
}

#[derive(Clone, Debug, Serialize, Deserialize, Queryable, Selectable, Identifiable)]
#[diesel(table_name = tests, check_for_backend(diesel::pg::Pg))]
pub struct Test {
    pub id: Uuid,
    pub title: String,
    pub title_hi: Option<String>,
    pub description: Option<String>,
    pub slug: String,
    pub test_type: String,
    pub duration_minutes: i32,
    pub total_marks: i32,
    pub passing_marks: i32,
    pub difficulty: String,
    pub is_free: bool,
    pub total_questions: i32,
    pub total_attempts: i32,
    pub created_at: DateTime<Utc>,
}

#[derive(Clone, Debug, Insertable)]
#[diesel(table_name = tests)]
pub struct NewTest {
    pub title: String,
    pub title_hi: Option<String>,
    pub description: Option<String>,
    pub slug: String,
    pub test_type: String,
    pub duration_minutes: i32,
    pub total_marks: i32,
    pub passing_marks: i32,
    pub difficulty: String,
    pub is_free: bool,
    pub total_questions: i32,
    pub total_attempts: i32,
}

/// Partial update of a test. The slug is deliberately absent so published URLs stay stable.
#[derive(Clone, Debug, Default, Deserialize, AsChangeset)]
#[diesel(table_name = tests)]
pub struct TestChangeset {
    pub title: Option<String>,
    pub title_hi: Option<String>,
    pub description: Option<String>,
    pub test_type: Option<String>,
    pub duration_minutes: Option<i32>,
    pub total_marks: Option<i32>,
    pub passing_marks: Option<i32>,
    pub difficulty: Option<String>,
    pub is_free: Option<bool>,
}

#[derive(Clone, Debug, Serialize, Deserialize, Queryable, Selectable, Identifiable)]
#[diesel(table_name = questions, check_for_backend(diesel::pg::Pg))]
pub struct Question {
    pub id: Uuid,
    pub question_text: String,
    pub question_text_hi: Option<String>,
    pub option_a: String,
    pub option_a_hi: Option<String>,
    pub option_b: String,
    pub option_b_hi: Option<String>,
    pub option_c: String,
    pub option_c_hi: Option<String>,
    pub option_d: String,
    pub option_d_hi: Option<String>,
    pub correct_answer: String,
    pub subject: String,
    pub topic: Option<String>,
    pub difficulty: String,
    pub explanation: Option<String>,
    pub explanation_hi: Option<String>,
    pub created_at: DateTime<Utc>,
}

/// Storage shape of a question, produced by the create form and the bulk importer
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize, Insertable)]
#[diesel(table_name = questions)]
pub struct NewQuestion {
    pub question_text: String,
    pub question_text_hi: Option<String>,
    pub option_a: String,
    pub option_a_hi: Option<String>,
    pub option_b: String,
    pub option_b_hi: Option<String>,
    pub option_c: String,
    pub option_c_hi: Option<String>,
    pub option_d: String,
    pub option_d_hi: Option<String>,
    pub correct_answer: String,
    pub subject: String,
    pub topic: Option<String>,
    pub difficulty: String,
    pub explanation: Option<String>,
    pub explanation_hi: Option<String>,
}

#[derive(Clone, Debug, Default, Deserialize, AsChangeset)]
#[diesel(table_name = questions)]
pub struct QuestionChangeset {
    pub question_text: Option<String>,
    pub question_text_hi: Option<String>,
    pub option_a: Option<String>,
    pub option_a_hi: Option<String>,
    pub option_b: Option<String>,
    pub option_b_hi: Option<String>,
    pub option_c: Option<String>,
    pub option_c_hi: Option<String>,
    pub option_d: Option<String>,
    pub option_d_hi: Option<String>,
    pub correct_answer: Option<String>,
    pub subject: Option<String>,
    pub topic: Option<String>,
    pub difficulty: Option<String>,
    pub explanation: Option<String>,
    pub explanation_hi: Option<String>,
}

/// Row of the test/question junction table
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize, Queryable, Insertable)]
#[diesel(table_name = test_questions)]
pub struct TestQuestion {
    pub test_id: Uuid,
    pub question_id: Uuid,
    pub order_index: i32,
}

/// Study material, stored in the `content` table
#[derive(Clone, Debug, Serialize, Deserialize, Queryable, Selectable, Identifiable)]
#[diesel(table_name = content, check_for_backend(diesel::pg::Pg))]
pub struct Material {
    pub id: Uuid,
    pub title: String,
    pub title_hi: Option<String>,
    #[serde(rename = "type")]
    pub content_type: String,
    pub language: String,
    pub is_free: bool,
    pub file_url: Option<String>,
    pub file_size: Option<i64>,
    pub page_count: Option<i32>,
    pub content_text: Option<String>,
    pub description_en: Option<String>,
    pub description_hi: Option<String>,
    pub created_at: DateTime<Utc>,
}

#[derive(Clone, Debug, Deserialize, Insertable)]
#[diesel(table_name = content)]
pub struct NewMaterial {
    pub title: String,
    pub title_hi: Option<String>,
    #[serde(rename = "type")]
    pub content_type: String,
    pub language: String,
    pub is_free: bool,
    pub file_url: Option<String>,
    pub file_size: Option<i64>,
    pub page_count: Option<i32>,
    pub content_text: Option<String>,
    pub description_en: Option<String>,
    pub description_hi: Option<String>,
}

#[derive(Clone, Debug, Default, Deserialize, AsChangeset)]
#[diesel(table_name = content)]
pub struct MaterialChangeset {
    pub title: Option<String>,
    pub title_hi: Option<String>,
    #[serde(rename = "type")]
    pub content_type: Option<String>,
    pub language: Option<String>,
    pub is_free: Option<bool>,
    pub file_url: Option<String>,
    pub file_size: Option<i64>,
    pub page_count: Option<i32>,
    pub content_text: Option<String>,
    pub description_en: Option<String>,
    pub description_hi: Option<String>,
}

/// Study plan template offered to users
#[derive(Clone, Debug, Serialize, Deserialize, Queryable, Selectable, Identifiable)]
#[diesel(table_name = study_templates, check_for_backend(diesel::pg::Pg))]
pub struct StudyTemplate {
    pub id: Uuid,
    pub title: String,
    pub description: Option<String>,
    /// Array of [`TemplateTask`] objects
    pub tasks: Value,
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
}

/// One task of a study plan template
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct TemplateTask {
    pub title: String,
    pub subject: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

#[derive(Clone, Debug, PartialEq, Insertable)]
#[diesel(table_name = study_templates)]
pub struct NewStudyTemplate {
    pub title: String,
    pub description: Option<String>,
    pub tasks: Value,
    pub is_active: bool,
}

impl NewStudyTemplate {
    /// Copy of an existing template under a "(Copy)" title
    pub fn copy_of(template: &StudyTemplate) -> Self {
        Self {
            title: format!("{} (Copy)", template.title),
            description: template.description.clone(),
            tasks: template.tasks.clone(),
            is_active: template.is_active,
        }
    }
}

#[derive(Clone, Debug, Default, AsChangeset)]
#[diesel(table_name = study_templates)]
pub struct TemplateChangeset {
    pub title: Option<String>,
    pub description: Option<String>,
    pub tasks: Option<Value>,
    pub is_active: Option<bool>,
}

/// Admin sign-in joined with the admin's email
#[derive(Clone, Debug, Serialize, Queryable)]
pub struct LoginLogEntry {
    pub id: Uuid,
    pub user_id: Uuid,
    pub ip_address: Option<String>,
    pub location: Option<Value>,
    pub user_agent: Option<String>,
    pub login_time: DateTime<Utc>,
    pub email: Option<String>,
}

#[derive(Clone, Debug, Serialize, Deserialize, Queryable, Selectable, Identifiable)]
#[diesel(table_name = app_banners, check_for_backend(diesel::pg::Pg))]
pub struct Banner {
    pub id: Uuid,
    pub title: String,
    pub image_url: String,
    pub target_type: String,
    pub target_value: Option<String>,
    pub display_order: i32,
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
}

#[derive(Clone, Debug, Insertable)]
#[diesel(table_name = app_banners)]
pub struct NewBanner {
    pub title: String,
    pub image_url: String,
    pub target_type: String,
    pub target_value: Option<String>,
    pub display_order: i32,
    pub is_active: bool,
}

#[derive(Clone, Debug, Serialize, Deserialize, Queryable, Selectable, Identifiable)]
#[diesel(table_name = app_notifications, check_for_backend(diesel::pg::Pg))]
pub struct Notification {
    pub id: Uuid,
    pub title: String,
    pub message: String,
    #[serde(rename = "type")]
    pub notification_type: String,
    pub target_audience: String,
    pub created_at: DateTime<Utc>,
}

#[derive(Clone, Debug, Insertable)]
#[diesel(table_name = app_notifications)]
pub struct NewNotification {
    pub title: String,
    pub message: String,
    pub notification_type: String,
    pub target_audience: String,
}

#[derive(Clone, Debug, Serialize, Deserialize, Queryable, Selectable, Identifiable)]
#[diesel(table_name = news, check_for_backend(diesel::pg::Pg))]
pub struct NewsItem {
    pub id: Uuid,
    pub title: String,
    pub link: String,
    pub description: Option<String>,
    pub pub_date: Option<DateTime<Utc>>,
    pub source: Option<String>,
    pub created_at: DateTime<Utc>,
}

#[derive(Clone, Debug, Serialize, Deserialize, Queryable, Selectable, Identifiable)]
#[diesel(table_name = user_reports, check_for_backend(diesel::pg::Pg))]
pub struct Report {
    pub id: Uuid,
    pub user_id: Uuid,
    #[serde(rename = "type")]
    pub report_type: String,
    pub target_id: Option<String>,
    pub message: String,
    pub status: String,
    pub admin_note: Option<String>,
    pub created_at: DateTime<Utc>,
}

#[derive(Clone, Debug, Serialize, Deserialize, Queryable, Selectable, Identifiable)]
#[diesel(table_name = audit_logs, check_for_backend(diesel::pg::Pg))]
pub struct AuditLog {
    pub id: Uuid,
    pub action: String,
    pub table_name: Option<String>,
    pub record_id: Option<String>,
    pub details: Option<Value>,
    pub user_id: Uuid,
    pub created_at: DateTime<Utc>,
}

#[derive(Clone, Debug, Insertable)]
#[diesel(table_name = audit_logs)]
pub struct NewAuditLog {
    pub action: String,
    pub table_name: Option<String>,
    pub record_id: Option<String>,
    pub details: Option<Value>,
    pub user_id: Uuid,
}

#[derive(Clone, Debug, Serialize, Deserialize, Queryable, Selectable, Insertable)]
#[diesel(table_name = settings, check_for_backend(diesel::pg::Pg))]
pub struct Setting {
    pub key: String,
    pub value: Value,
    pub updated_at: DateTime<Utc>,
}
