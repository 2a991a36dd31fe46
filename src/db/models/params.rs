use serde::{Deserialize, Serialize};
use serde_json::Value;
use uuid::Uuid;

use super::{NewQuestion, TemplateTask, DEFAULT_DIFFICULTY};

/// Largest page a caller may request
pub const MAX_PAGE_SIZE: i64 = 100;

/// Highest page number whose offset still fits in an i64
const MAX_PAGE: i64 = i64::MAX / MAX_PAGE_SIZE;

/// Page selection shared by every list endpoint
#[derive(Debug, Clone, Copy, Default, Deserialize, Serialize)]
pub struct PageParams {
    pub page: Option<i64>,
    pub page_size: Option<i64>,
}

impl PageParams {
    /// Resolves the requested page against a resource default.
    /// Pages are 1-based and clamped to 1..=MAX_PAGE; sizes are clamped to 1..=MAX_PAGE_SIZE.
    pub fn resolve(&self, default_size: i64) -> Pagination {
        let page = self.page.unwrap_or(1).clamp(1, MAX_PAGE);
        let page_size = self
            .page_size
            .unwrap_or(default_size)
            .clamp(1, MAX_PAGE_SIZE);
        Pagination { page, page_size }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Pagination {
    pub page: i64,
    pub page_size: i64,
}

impl Pagination {
    pub fn offset(&self) -> i64 {
        (self.page - 1).saturating_mul(self.page_size)
    }

    pub fn total_pages(&self, total: i64) -> i64 {
        if total <= 0 {
            0
        } else {
            (total + self.page_size - 1) / self.page_size
        }
    }
}

/// Sort direction for sortable lists
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum SortOrder {
    Asc,
    #[default]
    Desc,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct UserListParams {
    pub page: Option<i64>,
    pub page_size: Option<i64>,
    pub plan: Option<String>,
    pub search: Option<String>,
}

/// Query structs carry `page`/`page_size` inline because `serde(flatten)` breaks numeric
/// fields in urlencoded queries.
macro_rules! paged {
    ($($params:ty),+) => {
        $(impl $params {
            pub fn page_params(&self) -> PageParams {
                PageParams {
                    page: self.page,
                    page_size: self.page_size,
                }
            }
        })+
    };
}

paged!(UserListParams, QuestionListParams, SearchPageParams);

#[derive(Debug, Clone, Default, Deserialize)]
pub struct TestListParams {
    pub test_type: Option<String>,
    pub search: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct QuestionListParams {
    pub page: Option<i64>,
    pub page_size: Option<i64>,
    pub subject: Option<String>,
    pub difficulty: Option<String>,
    pub search: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct MaterialListParams {
    #[serde(rename = "type")]
    pub content_type: Option<String>,
    pub search: Option<String>,
    pub sort: Option<String>,
    pub order: Option<SortOrder>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct SearchPageParams {
    pub page: Option<i64>,
    pub page_size: Option<i64>,
    pub search: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct ReportListParams {
    pub status: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct AnalyticsParams {
    pub range: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ImportParams {
    pub test_id: Uuid,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct TemplateParams {
    pub format: Option<String>,
}

/// Ids for bulk deletion
#[derive(Debug, Clone, Deserialize)]
pub struct BulkDeleteParams {
    pub ids: Vec<Uuid>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct CreateTestParams {
    pub title: String,
    pub title_hi: Option<String>,
    pub description: Option<String>,
    pub test_type: Option<String>,
    pub duration_minutes: Option<i32>,
    pub total_marks: Option<i32>,
    pub passing_marks: Option<i32>,
    pub difficulty: Option<String>,
    pub is_free: Option<bool>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct AddQuestionsParams {
    pub question_ids: Vec<Uuid>,
}

/// Single question form; optionally linked to a test at the end of its ordering
#[derive(Debug, Clone, Deserialize)]
pub struct CreateQuestionParams {
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
    pub difficulty: Option<String>,
    pub explanation: Option<String>,
    pub explanation_hi: Option<String>,
    pub test_id: Option<Uuid>,
}

impl From<CreateQuestionParams> for NewQuestion {
    fn from(params: CreateQuestionParams) -> Self {
        NewQuestion {
            question_text: params.question_text,
            question_text_hi: params.question_text_hi,
            option_a: params.option_a,
            option_a_hi: params.option_a_hi,
            option_b: params.option_b,
            option_b_hi: params.option_b_hi,
            option_c: params.option_c,
            option_c_hi: params.option_c_hi,
            option_d: params.option_d,
            option_d_hi: params.option_d_hi,
            correct_answer: params.correct_answer.to_lowercase(),
            subject: params.subject,
            topic: params.topic,
            difficulty: params
                .difficulty
                .map(|d| d.to_lowercase())
                .unwrap_or_else(|| DEFAULT_DIFFICULTY.to_string()),
            explanation: params.explanation,
            explanation_hi: params.explanation_hi,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct CreateBannerParams {
    pub title: String,
    pub image_url: String,
    pub target_type: Option<String>,
    pub target_value: Option<String>,
    pub display_order: Option<i32>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct SendNotificationParams {
    pub title: String,
    pub message: String,
    #[serde(rename = "type")]
    pub notification_type: Option<String>,
    pub target_audience: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct UpdateReportParams {
    pub status: String,
    pub admin_note: Option<String>,
}

/// Settings sections keyed by name (`app`, `payment`, `email`, ...)
#[derive(Debug, Clone, Deserialize)]
pub struct SaveSettingsParams {
    pub sections: serde_json::Map<String, Value>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct GrantAdminParams {
    pub email: String,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct TemplateListParams {
    pub search: Option<String>,
    pub sort: Option<String>,
    pub order: Option<SortOrder>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct CreateTemplateParams {
    pub title: String,
    pub description: Option<String>,
    pub tasks: Vec<TemplateTask>,
    pub is_active: Option<bool>,
}

/// Partial update; absent fields stay as they are
#[derive(Debug, Clone, Default, Deserialize)]
pub struct UpdateTemplateParams {
    pub title: Option<String>,
    pub description: Option<String>,
    pub tasks: Option<Vec<TemplateTask>>,
    pub is_active: Option<bool>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_page_resolution_clamps_values() {
        let params = PageParams {
            page: Some(0),
            page_size: Some(1000),
        };
        let page = params.resolve(20);
        assert_eq!(page.page, 1);
        assert_eq!(page.page_size, MAX_PAGE_SIZE);
        assert_eq!(page.offset(), 0);

        let page = PageParams::default().resolve(20);
        assert_eq!(page, Pagination { page: 1, page_size: 20 });

        let page = PageParams {
            page: Some(3),
            page_size: None,
        }
        .resolve(50);
        assert_eq!(page.offset(), 100);
    }

    #[test]
    fn test_huge_page_number_does_not_overflow() {
        let page = PageParams {
            page: Some(i64::MAX),
            page_size: Some(MAX_PAGE_SIZE),
        }
        .resolve(20);
        assert_eq!(page.page, MAX_PAGE);
        assert!(page.offset() > 0);

        let page = PageParams {
            page: Some(i64::MIN),
            page_size: None,
        }
        .resolve(20);
        assert_eq!(page.offset(), 0);

        let unclamped = Pagination {
            page: i64::MAX,
            page_size: MAX_PAGE_SIZE,
        };
        assert_eq!(unclamped.offset(), i64::MAX);
    }

    #[test]
    fn test_total_pages_rounds_up() {
        let page = Pagination { page: 1, page_size: 20 };
        assert_eq!(page.total_pages(0), 0);
        assert_eq!(page.total_pages(1), 1);
        assert_eq!(page.total_pages(20), 1);
        assert_eq!(page.total_pages(21), 2);
    }

    #[test]
    fn test_question_form_normalizes_answer_and_difficulty() {
        let params = CreateQuestionParams {
            question_text: "What is 2 + 2?".to_string(),
            question_text_hi: None,
            option_a: "3".to_string(),
            option_a_hi: None,
            option_b: "4".to_string(),
            option_b_hi: None,
            option_c: "5".to_string(),
            option_c_hi: None,
            option_d: "6".to_string(),
            option_d_hi: None,
            correct_answer: "B".to_string(),
            subject: "Quantitative Aptitude".to_string(),
            topic: None,
            difficulty: None,
            explanation: None,
            explanation_hi: None,
            test_id: None,
        };
        let question = NewQuestion::from(params);
        assert_eq!(question.correct_answer, "b");
        assert_eq!(question.difficulty, "medium");
    }
}
