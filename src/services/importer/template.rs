use crate::errors::ApiError;
use crate::Result;
use rust_xlsxwriter::{Format, Workbook};
use std::str::FromStr;

/// Columns of the downloadable import template, in sheet order
pub const TEMPLATE_COLUMNS: [&str; 15] = [
    "question_en",
    "question_hi",
    "option_a_en",
    "option_a_hi",
    "option_b_en",
    "option_b_hi",
    "option_c_en",
    "option_c_hi",
    "option_d_en",
    "option_d_hi",
    "correct_option",
    "subject",
    "difficulty",
    "explanation",
    "explanation_hi",
];

const EXAMPLE_ROW: [&str; 15] = [
    "What is 2 + 2?",
    "2 + 2 क्या है?",
    "3",
    "3",
    "4",
    "4",
    "5",
    "5",
    "6",
    "6",
    "b",
    "Quantitative Aptitude",
    "easy",
    "2 + 2 equals 4",
    "2 + 2 बराबर 4",
];

const SHEET_NAME: &str = "Questions";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum TemplateFormat {
    Csv,
    #[default]
    Xlsx,
}

impl TemplateFormat {
    pub fn file_name(&self) -> &'static str {
        match self {
            TemplateFormat::Csv => "question_template.csv",
            TemplateFormat::Xlsx => "question_template.xlsx",
        }
    }

    pub fn content_type(&self) -> &'static str {
        match self {
            TemplateFormat::Csv => "text/csv; charset=utf-8",
            TemplateFormat::Xlsx => {
                "application/vnd.openxmlformats-officedocument.spreadsheetml.sheet"
            }
        }
    }
}

impl FromStr for TemplateFormat {
    type Err = ApiError;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "csv" => Ok(TemplateFormat::Csv),
            "xlsx" => Ok(TemplateFormat::Xlsx),
            other => Err(ApiError::Validation(format!(
                "Unknown template format '{other}', expected csv or xlsx"
            ))),
        }
    }
}

/// Sample import file with the header row and one example question
pub fn question_template(format: TemplateFormat) -> Result<Vec<u8>> {
    match format {
        TemplateFormat::Csv => csv_template(),
        TemplateFormat::Xlsx => xlsx_template(),
    }
}

fn csv_template() -> Result<Vec<u8>> {
    let mut writer = csv::Writer::from_writer(Vec::new());
    writer.write_record(TEMPLATE_COLUMNS)?;
    writer.write_record(EXAMPLE_ROW)?;
    writer
        .into_inner()
        .map_err(|err| ApiError::Custom(format!("Failed to write CSV template: {err}")))
}

fn xlsx_template() -> Result<Vec<u8>> {
    let mut workbook = Workbook::new();
    let header = Format::new().set_bold();

    let worksheet = workbook.add_worksheet();
    worksheet.set_name(SHEET_NAME)?;
    for (col, (name, example)) in TEMPLATE_COLUMNS.iter().zip(EXAMPLE_ROW).enumerate() {
        let col = col as u16;
        worksheet.write_string_with_format(0, col, *name, &header)?;
        worksheet.write_string(1, col, example)?;
    }

    Ok(workbook.save_to_buffer()?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::services::importer::{parse_spreadsheet, validate_rows};

    #[test]
    fn test_template_format_parsing() {
        assert_eq!("CSV".parse::<TemplateFormat>().unwrap(), TemplateFormat::Csv);
        assert_eq!("xlsx".parse::<TemplateFormat>().unwrap(), TemplateFormat::Xlsx);
        assert!("pdf".parse::<TemplateFormat>().is_err());
        assert_eq!(TemplateFormat::default().file_name(), "question_template.xlsx");
    }

    #[test]
    fn test_csv_template_passes_the_importer() {
        let bytes = question_template(TemplateFormat::Csv).unwrap();
        let rows = parse_spreadsheet(TemplateFormat::Csv.file_name(), &bytes).unwrap();
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].row_number, 2);

        let preview = validate_rows(&rows);
        assert!(preview.errors.is_empty());
        let question = &preview.valid[0];
        assert_eq!(question.correct_answer, "b");
        assert_eq!(question.difficulty, "easy");
        assert_eq!(question.explanation.as_deref(), Some("2 + 2 equals 4"));
        assert_eq!(question.question_text_hi.as_deref(), Some("2 + 2 क्या है?"));
    }

    #[test]
    fn test_xlsx_template_passes_the_importer() {
        let bytes = question_template(TemplateFormat::Xlsx).unwrap();
        let rows = parse_spreadsheet(TemplateFormat::Xlsx.file_name(), &bytes).unwrap();
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].row_number, 2);

        let preview = validate_rows(&rows);
        assert_eq!(preview.valid.len(), 1);
        assert_eq!(preview.valid[0].subject, "Quantitative Aptitude");
    }
}
