use chrono::{DateTime, Utc};
use serde_json::Value;
use std::borrow::Cow;

/// Quotes a field when it contains a separator, quote or line break, doubling inner quotes
pub fn escape_field(field: &str) -> Cow<'_, str> {
    if field.contains(|c: char| matches!(c, ',' | '"' | '\n' | '\r')) {
        Cow::Owned(format!("\"{}\"", field.replace('"', "\"\"")))
    } else {
        Cow::Borrowed(field)
    }
}

/// Text of a JSON value as it appears in a CSV cell; null is empty, nested values stay JSON
pub fn field_text(value: &Value) -> Cow<'_, str> {
    match value {
        Value::Null => Cow::Borrowed(""),
        Value::String(s) => Cow::Borrowed(s),
        other => Cow::Owned(other.to_string()),
    }
}

/// Renders JSON row objects as CSV. Columns follow the first row's key order; keys missing
/// from later rows become empty cells. Returns None when there is nothing to export.
pub fn rows_to_csv(rows: &[Value]) -> Option<String> {
    let headers: Vec<&String> = rows.first()?.as_object()?.keys().collect();

    let mut lines = Vec::with_capacity(rows.len() + 1);
    lines.push(
        headers
            .iter()
            .map(|h| escape_field(h))
            .collect::<Vec<_>>()
            .join(","),
    );

    for row in rows {
        let line = headers
            .iter()
            .map(|header| {
                let text = row.get(header.as_str()).map(field_text).unwrap_or_default();
                escape_field(&text).into_owned()
            })
            .collect::<Vec<_>>()
            .join(",");
        lines.push(line);
    }

    Some(lines.join("\n"))
}

/// Download name such as `users-1718000000000.csv`
pub fn export_file_name(prefix: &str, now: DateTime<Utc>) -> String {
    format!("{}-{}.csv", prefix, now.timestamp_millis())
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn parse(text: &str) -> Vec<Vec<String>> {
        let mut reader = csv::ReaderBuilder::new()
            .has_headers(false)
            .from_reader(text.as_bytes());
        reader
            .records()
            .map(|r| r.unwrap().iter().map(str::to_string).collect())
            .collect()
    }

    #[test]
    fn test_escape_field() {
        assert_eq!(escape_field("plain"), "plain");
        assert_eq!(escape_field("a,b"), "\"a,b\"");
        assert_eq!(escape_field("say \"hi\""), "\"say \"\"hi\"\"\"");
        assert_eq!(escape_field("two\nlines"), "\"two\nlines\"");
        assert_eq!(escape_field(""), "");
    }

    #[test]
    fn test_field_text() {
        assert_eq!(field_text(&Value::Null), "");
        assert_eq!(field_text(&json!(true)), "true");
        assert_eq!(field_text(&json!(12.5)), "12.5");
        assert_eq!(field_text(&json!("x")), "x");
        assert_eq!(field_text(&json!({"k": [1, 2]})), "{\"k\":[1,2]}");
    }

    #[test]
    fn test_header_follows_first_row() {
        let rows = vec![
            json!({"id": "1", "name": "Asha", "plan": "free"}),
            json!({"id": "2", "plan": "pro"}),
        ];
        let csv = rows_to_csv(&rows).unwrap();
        assert_eq!(csv, "id,name,plan\n1,Asha,free\n2,,pro");
    }

    #[test]
    fn test_empty_export() {
        assert_eq!(rows_to_csv(&[]), None);
    }

    #[test]
    fn test_round_trip_through_csv_reader() {
        let awkward = [
            "comma, inside",
            "quote \" inside",
            "\"fully quoted\"",
            "line\nbreak",
            "crlf\r\nbreak",
            "  spaced  ",
            "हिंदी, प्रश्न",
        ];
        let rows: Vec<Value> = awkward
            .iter()
            .enumerate()
            .map(|(i, text)| json!({"id": i, "text": text, "note": null}))
            .collect();

        let exported = rows_to_csv(&rows).unwrap();
        let records = parse(&exported);

        assert_eq!(records[0], vec!["id", "text", "note"]);
        for (i, text) in awkward.iter().enumerate() {
            let record = &records[i + 1];
            assert_eq!(record[0], i.to_string());
            assert_eq!(record[1], *text);
            assert_eq!(record[2], "");
        }
    }

    #[test]
    fn test_nested_json_round_trips() {
        let rows = vec![json!({"details": {"count": 3, "ids": ["a", "b"]}})];
        let exported = rows_to_csv(&rows).unwrap();
        let records = parse(&exported);

        let restored: Value = serde_json::from_str(&records[1][0]).unwrap();
        assert_eq!(restored, json!({"count": 3, "ids": ["a", "b"]}));
    }

    #[test]
    fn test_export_file_name() {
        let now = DateTime::from_timestamp(1_700_000_000, 0).unwrap();
        assert_eq!(export_file_name("users", now), "users-1700000000000.csv");
    }
}
