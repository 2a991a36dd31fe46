use crate::errors::ApiError;
use crate::Result;
use calamine::{open_workbook_auto_from_rs, Data, Range, Reader};
use std::collections::HashMap;
use std::io::Cursor;
use std::path::Path;

/// One data row of an uploaded sheet
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SheetRow {
    /// Row number as shown by a spreadsheet program; the header is row 1
    pub row_number: usize,
    cells: HashMap<String, String>,
}

impl SheetRow {
    pub fn new(row_number: usize, cells: HashMap<String, String>) -> Self {
        Self { row_number, cells }
    }

    /// Trimmed cell text, None when the column is absent or blank
    pub fn get(&self, column: &str) -> Option<&str> {
        self.cells
            .get(column)
            .map(|value| value.trim())
            .filter(|value| !value.is_empty())
    }

    fn is_blank(&self) -> bool {
        self.cells.values().all(|value| value.trim().is_empty())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SheetFormat {
    Csv,
    Workbook,
}

impl SheetFormat {
    pub fn from_file_name(file_name: &str) -> Result<Self> {
        let extension = Path::new(file_name)
            .extension()
            .and_then(|ext| ext.to_str())
            .map(|ext| ext.to_ascii_lowercase());

        match extension.as_deref() {
            Some("csv") => Ok(SheetFormat::Csv),
            Some("xlsx" | "xlsm" | "xlsb" | "xls" | "ods") => Ok(SheetFormat::Workbook),
            _ => Err(ApiError::Validation(format!(
                "Unsupported file '{file_name}', upload a .csv, .xlsx, .xls or .ods file"
            ))),
        }
    }
}

fn header_name(raw: &str) -> String {
    raw.trim().to_ascii_lowercase()
}

fn zip_row<I>(headers: &[String], row_number: usize, values: I) -> SheetRow
where
    I: IntoIterator<Item = String>,
{
    let cells = headers
        .iter()
        .cloned()
        .zip(values)
        .filter(|(header, _)| !header.is_empty())
        .collect();
    SheetRow::new(row_number, cells)
}

/// Parses an uploaded sheet into data rows keyed by lowercased header name.
/// Blank rows are dropped without renumbering the rows after them.
pub fn parse_spreadsheet(file_name: &str, bytes: &[u8]) -> Result<Vec<SheetRow>> {
    let rows = match SheetFormat::from_file_name(file_name)? {
        SheetFormat::Csv => parse_csv(bytes)?,
        SheetFormat::Workbook => parse_workbook(bytes)?,
    };
    Ok(rows.into_iter().filter(|row| !row.is_blank()).collect())
}

fn parse_csv(bytes: &[u8]) -> Result<Vec<SheetRow>> {
    let mut reader = csv::ReaderBuilder::new()
        .flexible(true)
        .trim(csv::Trim::All)
        .from_reader(bytes);

    let headers: Vec<String> = reader.headers()?.iter().map(header_name).collect();
    if headers.iter().all(|h| h.is_empty()) {
        return Err(ApiError::Validation("The file has no header row".to_string()));
    }

    // The reader skips empty lines, so rows are numbered from the line breaks between records
    let mut rows = Vec::new();
    let mut record = csv::StringRecord::new();
    let mut row_number = 1;
    let mut previous_start = 0;
    while reader.read_record(&mut record)? {
        let start = record
            .position()
            .map_or(previous_start, |pos| pos.byte() as usize);
        let span = bytes.get(previous_start..start).unwrap_or_default();
        row_number += trailing_line_breaks(span).max(1);
        previous_start = start;

        rows.push(zip_row(
            &headers,
            row_number,
            record.iter().map(str::to_string),
        ));
    }
    Ok(rows)
}

/// Line breaks ending `span`, with `\r\n` counted once
fn trailing_line_breaks(span: &[u8]) -> usize {
    let tail_len = span
        .iter()
        .rev()
        .take_while(|byte| matches!(byte, b'\r' | b'\n'))
        .count();
    let tail = &span[span.len() - tail_len..];
    tail.iter()
        .enumerate()
        .filter(|&(i, &byte)| byte == b'\n' || tail.get(i + 1) != Some(&b'\n'))
        .count()
}

fn parse_workbook(bytes: &[u8]) -> Result<Vec<SheetRow>> {
    let mut workbook = open_workbook_auto_from_rs(Cursor::new(bytes.to_vec()))?;
    let range = workbook
        .worksheet_range_at(0)
        .ok_or_else(|| ApiError::Validation("The workbook has no sheets".to_string()))??;
    rows_from_range(&range)
}

fn rows_from_range(range: &Range<Data>) -> Result<Vec<SheetRow>> {
    // A range starts at its first non-empty cell, not necessarily at A1
    let first_row = range.start().map(|(row, _)| row as usize).unwrap_or(0);
    let mut lines = range.rows();

    let headers: Vec<String> = match lines.next() {
        Some(cells) => cells.iter().map(|c| header_name(&c.to_string())).collect(),
        None => return Err(ApiError::Validation("The sheet is empty".to_string())),
    };

    Ok(lines
        .enumerate()
        .map(|(index, cells)| {
            // zero-based header row + 1 for the data offset + 1 for 1-based numbering
            let row_number = first_row + index + 2;
            zip_row(&headers, row_number, cells.iter().map(|c| c.to_string()))
        })
        .collect())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_from_file_name() {
        assert_eq!(SheetFormat::from_file_name("q.CSV").unwrap(), SheetFormat::Csv);
        assert_eq!(
            SheetFormat::from_file_name("bank.xlsx").unwrap(),
            SheetFormat::Workbook
        );
        assert_eq!(
            SheetFormat::from_file_name("old.xls").unwrap(),
            SheetFormat::Workbook
        );
        assert!(matches!(
            SheetFormat::from_file_name("notes.txt"),
            Err(ApiError::Validation(_))
        ));
        assert!(SheetFormat::from_file_name("no_extension").is_err());
    }

    #[test]
    fn test_csv_rows_keep_sheet_numbering() {
        let data = "Question_EN,option_a_en,correct_option\n\
                    What is 2+2?,4,a\n\
                    \n\
                    Capital of India?,Delhi,B\n";
        let rows = parse_spreadsheet("questions.csv", data.as_bytes()).unwrap();

        assert_eq!(rows.len(), 2);
        assert_eq!(rows[0].row_number, 2);
        assert_eq!(rows[0].get("question_en"), Some("What is 2+2?"));
        assert_eq!(rows[1].row_number, 4);
        assert_eq!(rows[1].get("correct_option"), Some("B"));
    }

    #[test]
    fn test_csv_crlf_and_repeated_blank_lines() {
        let data = "question_en,correct_option\r\n\
                    First?,a\r\n\
                    \r\n\
                    \r\n\
                    Second?,b\r\n\
                    Third?,c\r\n";
        let rows = parse_spreadsheet("q.csv", data.as_bytes()).unwrap();

        let numbers: Vec<usize> = rows.iter().map(|row| row.row_number).collect();
        assert_eq!(numbers, vec![2, 5, 6]);
    }

    #[test]
    fn test_multiline_cell_is_one_row() {
        let data = "question_en,correct_option\n\"Line one\nline two\",a\n\nNext?,b\n";
        let rows = parse_spreadsheet("q.csv", data.as_bytes()).unwrap();

        assert_eq!(rows[0].row_number, 2);
        assert_eq!(rows[0].get("question_en"), Some("Line one\nline two"));
        assert_eq!(rows[1].row_number, 4);
    }

    #[test]
    fn test_trailing_line_breaks() {
        assert_eq!(trailing_line_breaks(b"a,b\n"), 1);
        assert_eq!(trailing_line_breaks(b"a,b\r\n\r\n"), 2);
        assert_eq!(trailing_line_breaks(b"a,b\r\r"), 2);
        assert_eq!(trailing_line_breaks(b"\"x\ny\",b\n\n"), 2);
        assert_eq!(trailing_line_breaks(b""), 0);
    }

    #[test]
    fn test_csv_blank_cells_are_missing() {
        let data = "question_en,subject\n   ,Reasoning\n,,\n";
        let rows = parse_spreadsheet("q.csv", data.as_bytes()).unwrap();

        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].get("question_en"), None);
        assert_eq!(rows[0].get("subject"), Some("Reasoning"));
        assert_eq!(rows[0].get("not_a_column"), None);
    }

    #[test]
    fn test_csv_quoted_fields() {
        let data = "question_en,option_a_en\n\"Which of these, if any?\",\"He said \"\"yes\"\"\"\n";
        let rows = parse_spreadsheet("q.csv", data.as_bytes()).unwrap();

        assert_eq!(rows[0].get("question_en"), Some("Which of these, if any?"));
        assert_eq!(rows[0].get("option_a_en"), Some("He said \"yes\""));
    }

    #[test]
    fn test_malformed_workbook_fails() {
        let result = parse_spreadsheet("questions.xlsx", b"definitely not a zip archive");
        assert!(result.is_err());
    }

    #[test]
    fn test_workbook_rows_from_range() {
        let mut range: Range<Data> = Range::new((0, 0), (2, 1));
        range.set_value((0, 0), Data::String("question_en".to_string()));
        range.set_value((0, 1), Data::String("difficulty".to_string()));
        range.set_value((1, 0), Data::String("Odd one out?".to_string()));
        range.set_value((1, 1), Data::String("Hard".to_string()));
        range.set_value((2, 0), Data::Float(42.0));

        let rows = rows_from_range(&range).unwrap();
        assert_eq!(rows.len(), 2);
        assert_eq!(rows[0].row_number, 2);
        assert_eq!(rows[0].get("difficulty"), Some("Hard"));
        assert_eq!(rows[1].row_number, 3);
        assert_eq!(rows[1].get("question_en"), Some("42"));
        assert_eq!(rows[1].get("difficulty"), None);
    }
}
