//! Spreadsheet reader (xlsx, xlsm, xls, ods) built on calamine.
//!
//! Only the first worksheet is read. Its first row holds the headers.

use calamine::{open_workbook_auto, Data, Reader};
use serde_json::{json, Map, Value};
use std::path::Path;

use super::ParseResult;
use crate::error::{SourceError, SourceResult};

/// Read the first worksheet of a workbook on disk.
pub fn parse_workbook(path: &Path) -> SourceResult<ParseResult> {
    let mut workbook = open_workbook_auto(path)?;
    let range = workbook
        .worksheet_range_at(0)
        .ok_or(SourceError::NoWorksheet)??;

    let mut rows = range.rows();
    let headers: Vec<String> = rows
        .next()
        .ok_or(SourceError::NoHeaders)?
        .iter()
        .map(|cell| header_text(cell))
        .collect();

    if headers.iter().all(|h| h.is_empty()) {
        return Err(SourceError::NoHeaders);
    }

    let mut records = Vec::new();
    for row in rows {
        if row.iter().all(|cell| matches!(cell, Data::Empty)) {
            continue;
        }

        let mut obj = Map::new();
        for (i, header) in headers.iter().enumerate() {
            if header.is_empty() {
                continue;
            }
            let value = row.get(i).map(convert_cell).unwrap_or(Value::Null);
            obj.insert(header.clone(), value);
        }
        records.push(Value::Object(obj));
    }

    Ok(ParseResult {
        records,
        headers: headers.into_iter().filter(|h| !h.is_empty()).collect(),
        encoding: None,
        delimiter: None,
    })
}

fn header_text(cell: &Data) -> String {
    match cell {
        Data::Empty => String::new(),
        other => other.to_string().trim().to_string(),
    }
}

/// Map a cell onto the loosely typed JSON row representation.
///
/// Error cells become null so that coercion treats them as missing. Dates
/// are kept as ISO text, never as serial numbers.
fn convert_cell(cell: &Data) -> Value {
    match cell {
        Data::Empty => Value::Null,
        Data::Bool(v) => Value::Bool(*v),
        Data::Int(v) => json!(*v),
        Data::Float(v) => json!(*v),
        Data::String(v) => Value::String(v.trim().to_string()),
        Data::Error(_) => Value::Null,
        Data::DateTime(v) => v
            .as_datetime()
            .map(|dt| Value::String(dt.format("%Y-%m-%dT%H:%M:%S").to_string()))
            .unwrap_or(Value::Null),
        Data::DateTimeIso(v) => Value::String(v.clone()),
        Data::DurationIso(v) => Value::String(v.clone()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_xlsxwriter::{Format, Workbook};
    use tempfile::tempdir;

    /// Header row with a blank column, a blank row, and a date typed into `Year`.
    fn write_sales_workbook(path: &Path) {
        let mut workbook = Workbook::new();
        let sheet = workbook.add_worksheet();
        let date = Format::new().set_num_format("yyyy-mm-dd");

        for (col, header) in ["Year", "Fabricante Produtor", "Country", "Type", "", "Box 9L"]
            .iter()
            .enumerate()
        {
            if !header.is_empty() {
                sheet.write_string(0, col as u16, *header).unwrap();
            }
        }

        sheet.write_number(1, 0, 2020).unwrap();
        sheet.write_string(1, 1, "A").unwrap();
        sheet.write_string(1, 2, "BR").unwrap();
        sheet.write_string(1, 3, "X").unwrap();
        sheet.write_string(1, 4, "nota").unwrap();
        sheet.write_number(1, 5, 10).unwrap();

        sheet.write_number(3, 0, 2020).unwrap();
        sheet.write_string(3, 1, "B").unwrap();
        sheet.write_string(3, 2, "BR").unwrap();
        sheet.write_string(3, 3, "X").unwrap();
        sheet.write_number(3, 5, 30).unwrap();

        // 2020-01-01
        sheet.write_number_with_format(4, 0, 43831, &date).unwrap();
        sheet.write_string(4, 1, "C").unwrap();
        sheet.write_string(4, 2, "BR").unwrap();
        sheet.write_string(4, 3, "X").unwrap();
        sheet.write_number(4, 5, 5).unwrap();

        workbook.save(path).unwrap();
    }

    #[test]
    fn test_parse_workbook_rows_and_headers() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("vendas.xlsx");
        write_sales_workbook(&path);

        let result = parse_workbook(&path).unwrap();

        assert_eq!(
            result.headers,
            vec!["Year", "Fabricante Produtor", "Country", "Type", "Box 9L"]
        );
        // The blank row is skipped.
        assert_eq!(result.records.len(), 3);

        let first = result.records[0].as_object().unwrap();
        assert_eq!(first.len(), 5);
        assert_eq!(first["Year"].as_f64(), Some(2020.0));
        assert_eq!(first["Fabricante Produtor"], "A");
        assert_eq!(first["Box 9L"].as_f64(), Some(10.0));
        assert!(!first.values().any(|v| v == "nota"));
    }

    #[test]
    fn test_date_cell_is_iso_text() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("vendas.xlsx");
        write_sales_workbook(&path);

        let result = parse_workbook(&path).unwrap();
        let year = result.records[2]["Year"].as_str().unwrap();
        assert!(year.starts_with("2020-01-01"), "{}", year);
    }

    #[test]
    fn test_convert_cell_types() {
        assert_eq!(convert_cell(&Data::Empty), Value::Null);
        assert_eq!(convert_cell(&Data::Int(2020)), json!(2020));
        assert_eq!(convert_cell(&Data::Float(12.5)), json!(12.5));
        assert_eq!(convert_cell(&Data::String(" Brasil ".into())), json!("Brasil"));
        assert_eq!(
            convert_cell(&Data::Error(calamine::CellErrorType::Value)),
            Value::Null
        );
    }

    #[test]
    fn test_header_text_trims() {
        assert_eq!(header_text(&Data::String(" Box 9L ".into())), "Box 9L");
        assert_eq!(header_text(&Data::Empty), "");
    }

    #[test]
    fn test_missing_workbook_is_error() {
        let dir = tempfile::tempdir().unwrap();
        let result = parse_workbook(&dir.path().join("missing.xlsx"));
        assert!(result.is_err());
    }
}
