//! Delimited text (CSV/TSV) reader with encoding and delimiter auto-detection.
//!
//! Rows become JSON objects keyed by header. Every cell stays a string;
//! numeric coercion happens in the store.

use serde_json::{Map, Value};
use std::path::Path;

use super::ParseResult;
use crate::error::{SourceError, SourceResult};

/// Detect the encoding of raw bytes using chardet
pub fn detect_encoding(bytes: &[u8]) -> String {
    let charset = chardet::detect(bytes).0;

    match charset.to_lowercase().as_str() {
        "ascii" | "utf-8" | "utf8" | "utf-8-sig" => "utf-8".to_string(),
        "iso-8859-1" | "iso-8859-15" | "latin-1" | "latin1" => "iso-8859-1".to_string(),
        "windows-1252" | "cp1252" => "windows-1252".to_string(),
        other => other.to_string(),
    }
}

/// Decode bytes to a string using the given encoding label.
///
/// Unknown labels fall back to lossy UTF-8.
pub fn decode_content(bytes: &[u8], encoding: &str) -> SourceResult<String> {
    let bytes = bytes.strip_prefix(b"\xEF\xBB\xBF").unwrap_or(bytes);

    match encoding.to_lowercase().as_str() {
        "utf-8" | "utf8" | "ascii" => Ok(String::from_utf8(bytes.to_vec())
            .unwrap_or_else(|_| String::from_utf8_lossy(bytes).into_owned())),
        // WHATWG maps the latin-1 labels onto windows-1252, a superset.
        "iso-8859-1" | "latin-1" | "latin1" | "windows-1252" | "cp1252" => {
            Ok(encoding_rs::WINDOWS_1252.decode(bytes).0.into_owned())
        }
        label => match encoding_rs::Encoding::for_label(label.as_bytes()) {
            Some(enc) => {
                let (text, _, had_errors) = enc.decode(bytes);
                if had_errors {
                    return Err(SourceError::Encoding(format!(
                        "invalid byte sequence for {}",
                        enc.name()
                    )));
                }
                Ok(text.into_owned())
            }
            None => Ok(String::from_utf8_lossy(bytes).into_owned()),
        },
    }
}

/// Detect the delimiter by counting occurrences in the first line
pub fn detect_delimiter(content: &str) -> char {
    let first_line = content.lines().next().unwrap_or("");

    let separators = [';', ',', '\t', '|'];
    let mut best_sep = ',';
    let mut best_count = 0;

    for &sep in &separators {
        let count = first_line.matches(sep).count();
        if count > best_count {
            best_count = count;
            best_sep = sep;
        }
    }

    best_sep
}

/// Parse decoded text with an explicit delimiter.
pub fn parse_str(content: &str, delimiter: char, encoding: String) -> SourceResult<ParseResult> {
    let delimiter = u8::try_from(delimiter)
        .map_err(|_| SourceError::UnsupportedFormat(format!("non-ASCII delimiter '{}'", delimiter)))?;

    let mut reader = csv::ReaderBuilder::new()
        .delimiter(delimiter)
        .flexible(true)
        .trim(csv::Trim::All)
        .from_reader(content.as_bytes());

    let headers: Vec<String> = reader
        .headers()?
        .iter()
        .map(|h| h.to_string())
        .collect();

    if headers.iter().all(|h| h.is_empty()) {
        return Err(SourceError::NoHeaders);
    }

    let mut records = Vec::new();
    for row in reader.records() {
        let row = row?;
        if row.iter().all(|cell| cell.is_empty()) {
            continue;
        }

        let mut obj = Map::new();
        for (i, header) in headers.iter().enumerate() {
            let cell = row.get(i).unwrap_or("");
            obj.insert(header.clone(), Value::String(cell.to_string()));
        }
        records.push(Value::Object(obj));
    }

    Ok(ParseResult {
        records,
        headers,
        encoding: Some(encoding),
        delimiter: Some(delimiter as char),
    })
}

/// Parse delimited bytes with auto-detection of encoding and delimiter.
pub fn parse_bytes_auto(bytes: &[u8]) -> SourceResult<ParseResult> {
    if bytes.iter().all(|b| b.is_ascii_whitespace()) {
        return Err(SourceError::NoHeaders);
    }

    let encoding = detect_encoding(bytes);
    let content = decode_content(bytes, &encoding)?;
    let delimiter = detect_delimiter(&content);

    parse_str(&content, delimiter, encoding)
}

/// Parse a delimited file from disk with auto-detection.
pub fn parse_file_auto(path: &Path) -> SourceResult<ParseResult> {
    let bytes = std::fs::read(path)?;
    parse_bytes_auto(&bytes)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_simple_csv() {
        let csv = "Year;Fabricante Produtor;Box 9L\n2020;A;10\n2021;B;5";
        let result = parse_bytes_auto(csv.as_bytes()).unwrap();

        assert_eq!(result.delimiter, Some(';'));
        assert_eq!(result.records.len(), 2);
        assert_eq!(result.records[0]["Fabricante Produtor"], "A");
        assert_eq!(result.records[1]["Box 9L"], "5");
        assert_eq!(result.headers, vec!["Year", "Fabricante Produtor", "Box 9L"]);
    }

    #[test]
    fn test_quoted_values_with_delimiter() {
        let csv = "Country,Type\n\"Brasil, BR\",\"Vinho\"";
        let result = parse_bytes_auto(csv.as_bytes()).unwrap();

        assert_eq!(result.records[0]["Country"], "Brasil, BR");
        assert_eq!(result.records[0]["Type"], "Vinho");
    }

    #[test]
    fn test_empty_lines_skipped() {
        let csv = "a;b\n1;2\n\n;\n3;4\n";
        let result = parse_bytes_auto(csv.as_bytes()).unwrap();
        assert_eq!(result.records.len(), 2);
    }

    #[test]
    fn test_short_rows_padded() {
        let csv = "a;b;c\n1;2";
        let result = parse_bytes_auto(csv.as_bytes()).unwrap();

        assert_eq!(result.records[0]["a"], "1");
        assert_eq!(result.records[0]["c"], "");
    }

    #[test]
    fn test_empty_input_has_no_headers() {
        let err = parse_bytes_auto(b"  \n").unwrap_err();
        assert!(matches!(err, SourceError::NoHeaders));
    }

    #[test]
    fn test_detect_delimiter() {
        assert_eq!(detect_delimiter("a;b;c\n1;2;3"), ';');
        assert_eq!(detect_delimiter("a,b,c\n1,2,3"), ',');
        assert_eq!(detect_delimiter("a\tb\tc\n1\t2\t3"), '\t');
        assert_eq!(detect_delimiter("a|b|c\n1|2|3"), '|');
        assert_eq!(detect_delimiter("single"), ',');
    }

    #[test]
    fn test_latin1_decoding() {
        // "País" in ISO-8859-1
        let bytes: &[u8] = &[0x50, 0x61, 0xED, 0x73];
        let decoded = decode_content(bytes, "iso-8859-1").unwrap();
        assert_eq!(decoded, "País");
    }

    #[test]
    fn test_utf8_bom_stripped() {
        let bytes = b"\xEF\xBB\xBFYear,Month\n2020,1";
        let result = parse_bytes_auto(bytes).unwrap();
        assert_eq!(result.headers[0], "Year");
    }
}
