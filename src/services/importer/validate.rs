use super::parse::SheetRow;
use crate::db::models::{NewQuestion, DEFAULT_DIFFICULTY};
use crate::validation::ANSWER_OPTIONS;

/// Rows split into storable questions and one error line per rejected row
#[derive(Debug, Default, PartialEq, Eq)]
pub struct ImportPreview {
    pub valid: Vec<NewQuestion>,
    pub errors: Vec<String>,
}

impl ImportPreview {
    pub fn is_uploadable(&self) -> bool {
        self.errors.is_empty() && !self.valid.is_empty()
    }
}

fn owned(row: &SheetRow, column: &str) -> Option<String> {
    row.get(column).map(str::to_string)
}

/// Checks one row; the first failing rule decides its error
pub fn validate_row(row: &SheetRow) -> Result<NewQuestion, String> {
    let n = row.row_number;

    let question_text = row
        .get("question_en")
        .ok_or_else(|| format!("Row {n}: Missing question_en"))?;

    let options: Vec<&str> = ["option_a_en", "option_b_en", "option_c_en", "option_d_en"]
        .iter()
        .filter_map(|column| row.get(column))
        .collect();
    let [option_a, option_b, option_c, option_d] = options[..] else {
        return Err(format!("Row {n}: Missing options"));
    };

    let correct_answer = row
        .get("correct_option")
        .map(str::to_ascii_lowercase)
        .filter(|answer| ANSWER_OPTIONS.contains(&answer.as_str()))
        .ok_or_else(|| format!("Row {n}: Invalid correct_option (must be a, b, c, or d)"))?;

    let subject = row
        .get("subject")
        .ok_or_else(|| format!("Row {n}: Missing subject"))?;

    Ok(NewQuestion {
        question_text: question_text.to_string(),
        question_text_hi: owned(row, "question_hi"),
        option_a: option_a.to_string(),
        option_a_hi: owned(row, "option_a_hi"),
        option_b: option_b.to_string(),
        option_b_hi: owned(row, "option_b_hi"),
        option_c: option_c.to_string(),
        option_c_hi: owned(row, "option_c_hi"),
        option_d: option_d.to_string(),
        option_d_hi: owned(row, "option_d_hi"),
        correct_answer,
        subject: subject.to_string(),
        topic: owned(row, "topic"),
        difficulty: row
            .get("difficulty")
            .map(str::to_lowercase)
            .unwrap_or_else(|| DEFAULT_DIFFICULTY.to_string()),
        explanation: owned(row, "explanation_en").or_else(|| owned(row, "explanation")),
        explanation_hi: owned(row, "explanation_hi"),
    })
}

pub fn validate_rows(rows: &[SheetRow]) -> ImportPreview {
    rows.iter()
        .fold(ImportPreview::default(), |mut preview, row| {
            match validate_row(row) {
                Ok(question) => preview.valid.push(question),
                Err(error) => preview.errors.push(error),
            }
            preview
        })
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn row(row_number: usize, cells: &[(&str, &str)]) -> SheetRow {
        let cells: HashMap<String, String> = cells
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        SheetRow::new(row_number, cells)
    }

    fn complete(row_number: usize, correct: &str) -> SheetRow {
        row(
            row_number,
            &[
                ("question_en", "Which is a prime number?"),
                ("question_hi", "अभाज्य संख्या कौन सी है?"),
                ("option_a_en", "4"),
                ("option_b_en", "6"),
                ("option_c_en", "7"),
                ("option_d_en", "9"),
                ("correct_option", correct),
                ("subject", "Quantitative Aptitude"),
            ],
        )
    }

    #[test]
    fn test_valid_row_is_normalized() {
        let question = validate_row(&complete(2, " C ")).unwrap();
        assert_eq!(question.correct_answer, "c");
        assert_eq!(question.difficulty, "medium");
        assert_eq!(question.option_c, "7");
        assert_eq!(question.question_text_hi.as_deref(), Some("अभाज्य संख्या कौन सी है?"));
        assert_eq!(question.option_a_hi, None);
        assert_eq!(question.explanation, None);
    }

    #[test]
    fn test_difficulty_and_explanation_columns() {
        let cells = row(
            2,
            &[
                ("question_en", "Q"),
                ("option_a_en", "1"),
                ("option_b_en", "2"),
                ("option_c_en", "3"),
                ("option_d_en", "4"),
                ("correct_option", "A"),
                ("subject", "GK"),
                ("difficulty", "HARD"),
                ("explanation", "template column"),
            ],
        );
        let question = validate_row(&cells).unwrap();
        assert_eq!(question.difficulty, "hard");
        assert_eq!(question.explanation.as_deref(), Some("template column"));

        let preferred = row(
            3,
            &[
                ("question_en", "Q"),
                ("option_a_en", "1"),
                ("option_b_en", "2"),
                ("option_c_en", "3"),
                ("option_d_en", "4"),
                ("correct_option", "d"),
                ("subject", "GK"),
                ("explanation", "fallback"),
                ("explanation_en", "preferred"),
            ],
        );
        let question = validate_row(&preferred).unwrap();
        assert_eq!(question.explanation.as_deref(), Some("preferred"));
    }

    #[test]
    fn test_each_missing_field_has_its_own_message() {
        let missing_question = row(2, &[("option_a_en", "x")]);
        assert_eq!(
            validate_row(&missing_question).unwrap_err(),
            "Row 2: Missing question_en"
        );

        let missing_option = row(
            5,
            &[
                ("question_en", "Q"),
                ("option_a_en", "1"),
                ("option_b_en", "2"),
                ("option_c_en", "   "),
                ("option_d_en", "4"),
            ],
        );
        assert_eq!(validate_row(&missing_option).unwrap_err(), "Row 5: Missing options");

        let no_subject = row(
            7,
            &[
                ("question_en", "Q"),
                ("option_a_en", "1"),
                ("option_b_en", "2"),
                ("option_c_en", "3"),
                ("option_d_en", "4"),
                ("correct_option", "b"),
            ],
        );
        assert_eq!(validate_row(&no_subject).unwrap_err(), "Row 7: Missing subject");
    }

    #[test]
    fn test_correct_option_outside_a_to_d_rejected() {
        for bad in ["e", "ab", "1", ""] {
            let error = validate_row(&complete(4, bad)).unwrap_err();
            assert_eq!(error, "Row 4: Invalid correct_option (must be a, b, c, or d)");
        }
        for good in ["a", "B", "c", "D"] {
            assert!(validate_row(&complete(4, good)).is_ok());
        }
    }

    #[test]
    fn test_three_rows_with_bad_middle_option() {
        let rows = vec![complete(2, "a"), complete(3, "e"), complete(4, "d")];
        let preview = validate_rows(&rows);

        assert_eq!(preview.valid.len(), 2);
        assert_eq!(preview.valid[0].correct_answer, "a");
        assert_eq!(preview.valid[1].correct_answer, "d");
        assert_eq!(
            preview.errors,
            vec!["Row 3: Invalid correct_option (must be a, b, c, or d)".to_string()]
        );
        assert!(!preview.is_uploadable());
    }

    #[test]
    fn test_csv_error_cites_row_after_blank_line() {
        let data = "question_en,option_a_en,option_b_en,option_c_en,option_d_en,correct_option,subject\n\
                    Q1,1,2,3,4,a,GK\n\
                    \n\
                    Q2,1,2,3,4,e,GK\n";
        let rows = crate::services::importer::parse_spreadsheet("questions.csv", data.as_bytes()).unwrap();
        let preview = validate_rows(&rows);

        assert_eq!(preview.valid.len(), 1);
        assert_eq!(
            preview.errors,
            vec!["Row 4: Invalid correct_option (must be a, b, c, or d)".to_string()]
        );
    }

    #[test]
    fn test_every_row_is_either_valid_or_one_error() {
        let rows: Vec<SheetRow> = (0..40)
            .map(|i| match i % 4 {
                0 => complete(i + 2, "a"),
                1 => complete(i + 2, "z"),
                2 => row(i + 2, &[("subject", "GK")]),
                _ => complete(i + 2, "C"),
            })
            .collect();
        let preview = validate_rows(&rows);

        assert_eq!(preview.valid.len() + preview.errors.len(), rows.len());
        assert_eq!(preview.errors.len(), 20);
        for (error, rejected) in preview
            .errors
            .iter()
            .zip(rows.iter().filter(|r| validate_row(r).is_err()))
        {
            assert!(error.starts_with(&format!("Row {}:", rejected.row_number)));
        }
    }

    #[test]
    fn test_empty_preview_is_not_uploadable() {
        assert!(!validate_rows(&[]).is_uploadable());
        assert!(validate_rows(&[complete(2, "a")]).is_uploadable());
    }
}
