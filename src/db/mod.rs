pub mod analytics;
pub mod audit_logs;
pub mod banners;
pub mod browser;
pub mod connection;
pub mod exam_tests;
pub mod import_jobs;
pub mod login_logs;
pub mod materials;
pub mod models;
pub mod news;
pub mod notifications;
pub mod questions;
pub mod reports;
pub mod settings;
pub mod study_templates;
pub mod users;

pub use connection::DbClient;

use diesel::sql_types::{BigInt, Json};
use diesel::QueryableByName;
use serde_json::Value;

/// One row rendered by Postgres as a JSON object (`row_to_json(..) AS row`).
/// Used where the row shape belongs to a view, a stored procedure or an arbitrary table.
#[derive(Debug, QueryableByName)]
pub struct JsonRow {
    #[diesel(sql_type = Json)]
    pub row: Value,
}

#[derive(Debug, QueryableByName)]
pub struct CountRow {
    #[diesel(sql_type = BigInt)]
    pub count: i64,
}

/// Builds an ILIKE pattern matching `term` anywhere, or None for a blank term.
/// LIKE wildcards typed by the admin are matched literally.
pub(crate) fn search_pattern(term: Option<&str>) -> Option<String> {
    let term = term.map(str::trim).filter(|t| !t.is_empty())?;
    let escaped = term
        .replace('\\', "\\\\")
        .replace('%', "\\%")
        .replace('_', "\\_");
    Some(format!("%{escaped}%"))
}

/// Treats a missing value and the literal `all` as "no filter"
pub(crate) fn filter_value(value: Option<&str>) -> Option<&str> {
    value
        .map(str::trim)
        .filter(|v| !v.is_empty() && !v.eq_ignore_ascii_case("all"))
}
