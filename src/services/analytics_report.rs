use crate::db::models::AnalyticsReport;
use std::fmt::Write;

/// Plain-text summary offered as the analytics download
pub fn render_report(report: &AnalyticsReport) -> String {
    let users = &report.user_metrics;
    let content = &report.content_metrics;
    let tests = &report.test_metrics;

    let mut out = String::new();
    // Writing into a String cannot fail
    let _ = writeln!(out, "SSC Exam Hub - Analytics Report");
    let _ = writeln!(out, "Generated: {}", report.generated_at.to_rfc3339());
    let _ = writeln!(out, "Range: {}", report.range);

    let _ = writeln!(out, "\nUSER METRICS");
    let _ = writeln!(out, "Total Users: {}", users.total_users);
    let _ = writeln!(out, "Free Users: {}", users.free_users);
    let _ = writeln!(out, "Pro Users: {}", users.pro_users);

    let _ = writeln!(out, "\nCONTENT METRICS");
    let _ = writeln!(out, "Total Content: {}", content.total_content);
    let _ = writeln!(out, "PDFs: {}", content.pdfs);
    let _ = writeln!(out, "Formulas: {}", content.formulas);
    let _ = writeln!(out, "Current Affairs: {}", content.current_affairs);
    let _ = writeln!(out, "Free Content: {}", content.free_content);
    let _ = writeln!(out, "Premium Content: {}", content.premium_content);

    let _ = writeln!(out, "\nTEST METRICS");
    let _ = writeln!(out, "Total Tests: {}", tests.total_tests);
    let _ = writeln!(out, "Total Attempts: {}", tests.total_attempts);
    let _ = writeln!(out, "Average Score: {}%", tests.avg_score);
    let _ = writeln!(out, "Completion Rate: {}%", tests.completion_rate);

    let _ = writeln!(out, "\nREVENUE METRICS");
    let _ = write!(out, "Total Revenue: ₹{}", report.revenue_metrics.total_revenue);

    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::models::{ContentMetrics, RevenueMetrics, TestMetrics, UserMetrics};
    use chrono::Utc;

    #[test]
    fn test_render_report() {
        let report = AnalyticsReport {
            range: "7days".to_string(),
            generated_at: Utc::now(),
            user_metrics: UserMetrics {
                total_users: 120,
                free_users: 100,
                pro_users: 20,
                user_growth: Vec::new(),
            },
            content_metrics: ContentMetrics::default(),
            test_metrics: TestMetrics {
                avg_score: 61.25,
                completion_rate: 80.0,
                ..Default::default()
            },
            revenue_metrics: RevenueMetrics {
                total_revenue: 4990,
                revenue_growth: Vec::new(),
            },
        };

        let text = render_report(&report);
        assert!(text.starts_with("SSC Exam Hub - Analytics Report\n"));
        assert!(text.contains("Range: 7days\n"));
        assert!(text.contains("Pro Users: 20\n"));
        assert!(text.contains("Average Score: 61.25%\n"));
        assert!(text.contains("Completion Rate: 80%\n"));
        assert!(text.ends_with("Total Revenue: ₹4990"));
    }
}
