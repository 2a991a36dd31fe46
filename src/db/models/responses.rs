use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use uuid::Uuid;

use super::{LoginLogEntry, Material, NewQuestion, Question, StudyTemplate, Test, User};

/// General API response status
/// Used to indicate success or failure of operations
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Status {
    /// Operation completed successfully
    Success,
    /// Operation encountered an error
    Error,
}

/// Standard error response structure
/// Used when an operation fails
#[derive(Debug, Serialize, Deserialize)]
pub struct ErrorResponse {
    /// Status will always be Error for this type
    pub status: Status,
    /// Detailed error message explaining what went wrong
    pub error: String,
}

/// Acknowledgement for writes that return no record
#[derive(Debug, Serialize, Deserialize)]
pub struct MessageResponse {
    pub status: Status,
    pub message: String,
}

impl MessageResponse {
    pub fn success(message: impl Into<String>) -> Self {
        Self {
            status: Status::Success,
            message: message.into(),
        }
    }
}

/// Main API response enum, either the payload or an error body
#[derive(Debug, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ApiResponse<T> {
    Success(T),
    Error(ErrorResponse),
}

impl<T> From<ErrorResponse> for ApiResponse<T> {
    fn from(value: ErrorResponse) -> Self {
        Self::Error(value)
    }
}

/// One page of a list endpoint
#[derive(Debug, Serialize, Deserialize)]
pub struct Page<T> {
    pub items: Vec<T>,
    pub page: i64,
    pub page_size: i64,
    pub total: i64,
    pub total_pages: i64,
}

/// Number of rows removed by a delete
#[derive(Debug, Serialize, Deserialize)]
pub struct DeleteResponse {
    pub status: Status,
    pub deleted: usize,
}

/// A user together with the aggregates shown on the user detail view
#[derive(Debug, Serialize)]
pub struct UserDetailResponse {
    pub user: User,
    pub performance: Option<Value>,
    pub subjects: Vec<Value>,
    pub recent_attempts: Vec<Value>,
}

/// Question linked into a test, in test order
#[derive(Debug, Serialize)]
pub struct LinkedQuestion {
    pub order_index: i32,
    pub question: Question,
}

#[derive(Debug, Serialize)]
pub struct TestDetailResponse {
    pub test: Test,
    pub questions: Vec<LinkedQuestion>,
}

#[derive(Debug, Serialize)]
pub struct CreatedQuestionResponse {
    pub question: Question,
    /// Position in the linked test, when a test was given
    pub order_index: Option<i32>,
}

#[derive(Debug, Serialize)]
pub struct MaterialListResponse {
    pub items: Vec<Material>,
}

#[derive(Debug, Serialize)]
pub struct TemplateListResponse {
    pub items: Vec<StudyTemplate>,
}

/// Latest admin sign-ins and the number of distinct admins seen in the last day
#[derive(Debug, Serialize)]
pub struct LoginLogsResponse {
    pub logs: Vec<LoginLogEntry>,
    pub active_admins: i64,
}

/// Dashboard counters
#[derive(Debug, Serialize, Deserialize, PartialEq, Eq)]
pub struct DashboardStats {
    pub total_users: i64,
    pub total_tests: i64,
    pub total_questions: i64,
    pub active_users: i64,
}

#[derive(Debug, Serialize, Default)]
pub struct UserMetrics {
    pub total_users: i64,
    pub free_users: i64,
    pub pro_users: i64,
    pub user_growth: Vec<Value>,
}

#[derive(Debug, Serialize, Default)]
pub struct ContentMetrics {
    pub total_content: i64,
    pub pdfs: i64,
    pub formulas: i64,
    pub current_affairs: i64,
    pub free_content: i64,
    pub premium_content: i64,
}

#[derive(Debug, Serialize, Default)]
pub struct TestMetrics {
    pub total_tests: i64,
    pub total_attempts: i64,
    pub avg_score: f64,
    pub completion_rate: f64,
    pub popular_tests: Vec<Value>,
}

#[derive(Debug, Serialize, Default)]
pub struct RevenueMetrics {
    pub total_revenue: i64,
    pub revenue_growth: Vec<Value>,
}

#[derive(Debug, Serialize)]
pub struct AnalyticsReport {
    pub range: String,
    pub generated_at: DateTime<Utc>,
    pub user_metrics: UserMetrics,
    pub content_metrics: ContentMetrics,
    pub test_metrics: TestMetrics,
    pub revenue_metrics: RevenueMetrics,
}

/// Result of parsing and validating an import file without writing anything
#[derive(Debug, Serialize)]
pub struct ImportPreviewResponse {
    pub valid_count: usize,
    pub error_count: usize,
    pub errors: Vec<String>,
    pub sample: Vec<NewQuestion>,
}

/// Lifecycle of a bulk import job
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum JobStatus {
    #[serde(rename = "in_progress")]
    InProgress,
    #[serde(rename = "completed")]
    Completed,
    #[serde(rename = "failed")]
    Failed,
}

/// Import job state as stored in redis and returned to pollers
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ImportJobState {
    pub job_id: Uuid,
    pub test_id: Uuid,
    pub status: JobStatus,
    /// 0-50 while inserting questions, 50-100 while linking them
    pub progress: f64,
    pub total_questions: usize,
    pub questions_inserted: usize,
    pub links_inserted: usize,
    pub message: String,
}

impl ImportJobState {
    pub fn started(job_id: Uuid, test_id: Uuid, total_questions: usize) -> Self {
        Self {
            job_id,
            test_id,
            status: JobStatus::InProgress,
            progress: 0.0,
            total_questions,
            questions_inserted: 0,
            links_inserted: 0,
            message: "Import started".to_string(),
        }
    }
}

/// Response for a freshly accepted import
#[derive(Debug, Serialize)]
pub struct ImportAcceptedResponse {
    pub status: JobStatus,
    pub job_id: Uuid,
    pub message: String,
}

#[derive(Debug, Serialize)]
pub struct SettingsResponse {
    pub settings: serde_json::Map<String, Value>,
}

#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: String,
    pub database: Value,
    pub redis: Value,
    pub timestamp: DateTime<Utc>,
}
