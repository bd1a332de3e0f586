//! CSV row parser with encoding and delimiter auto-detection.
//!
//! Turns a raw document into [`RawRow`]s keyed by header text exactly as it
//! appears in the header row. No dashboard-specific logic here; structure
//! inference happens in [`crate::transform`].

use crate::error::{CsvError, CsvResult};
use crate::models::RawRow;

/// Result of parsing with metadata
#[derive(Debug, Clone)]
pub struct ParseResult {
    /// Parsed records, one per non-blank data row
    pub records: Vec<RawRow>,
    /// Detected or used encoding
    pub encoding: String,
    /// Detected or used delimiter
    pub delimiter: char,
    /// Column headers in source order
    pub headers: Vec<String>,
}

/// Detect the encoding of raw bytes using chardet.
///
/// Unknown charsets are reported as `utf-8`; decoding then falls back to
/// lossy conversion.
pub fn detect_encoding(bytes: &[u8]) -> String {
    let charset = chardet::detect(bytes).0;

    match charset.to_lowercase().as_str() {
        "ascii" | "utf-8" | "utf8" | "" => "utf-8".to_string(),
        "iso-8859-1" | "iso-8859-15" | "latin-1" | "latin1" => "iso-8859-1".to_string(),
        "windows-1252" | "cp1252" => "windows-1252".to_string(),
        other => {
            if encoding_rs::Encoding::for_label(other.as_bytes()).is_some() {
                other.to_string()
            } else {
                "utf-8".to_string()
            }
        }
    }
}

/// Decode bytes to a string using the given encoding label.
pub fn decode_content(bytes: &[u8], encoding: &str) -> CsvResult<String> {
    let text = match encoding.to_lowercase().as_str() {
        "utf-8" | "utf8" | "ascii" => match String::from_utf8(bytes.to_vec()) {
            Ok(s) => s,
            Err(_) => String::from_utf8_lossy(bytes).into_owned(),
        },
        "iso-8859-1" | "latin-1" | "latin1" => {
            encoding_rs::ISO_8859_15.decode(bytes).0.into_owned()
        }
        "windows-1252" | "cp1252" => encoding_rs::WINDOWS_1252.decode(bytes).0.into_owned(),
        label => {
            let enc = encoding_rs::Encoding::for_label(label.as_bytes()).ok_or_else(|| {
                CsvError::EncodingError(format!("unsupported encoding '{}'", label))
            })?;
            enc.decode(bytes).0.into_owned()
        }
    };

    Ok(text.trim_start_matches('\u{feff}').to_string())
}

/// Detect the delimiter by counting occurrences in the first line.
///
/// Quoted sections are ignored so a header like `"Sales, total"` does not
/// vote for a comma.
pub fn detect_delimiter(content: &str) -> char {
    let first_line = content.lines().next().unwrap_or("");

    let mut unquoted = String::with_capacity(first_line.len());
    let mut in_quotes = false;
    for c in first_line.chars() {
        if c == '"' {
            in_quotes = !in_quotes;
        } else if !in_quotes {
            unquoted.push(c);
        }
    }

    let separators = [',', ';', '\t', '|'];
    let mut best_sep = ',';
    let mut best_count = 0;

    for &sep in &separators {
        let count = unquoted.matches(sep).count();
        if count > best_count {
            best_count = count;
            best_sep = sep;
        }
    }

    best_sep
}

/// Parse delimited text into rows with an explicit delimiter.
///
/// # Example
/// ```ignore
/// use pulseboard::parser::parse_text;
///
/// let csv = "L1 metric,MTM\nBookings,Total Bookings";
/// let result = parse_text(csv, ',').unwrap();
///
/// assert_eq!(result.records.len(), 1);
/// assert_eq!(result.records[0]["MTM"], "Total Bookings");
/// ```
pub fn parse_text(content: &str, delimiter: char) -> CsvResult<ParseResult> {
    parse_string_with_metadata(content, delimiter, "utf-8".to_string())
}

/// Parse CSV bytes with auto-detection of encoding and delimiter.
pub fn parse_bytes_auto(bytes: &[u8]) -> CsvResult<ParseResult> {
    if bytes.is_empty() {
        return Err(CsvError::EmptyFile);
    }

    let encoding = detect_encoding(bytes);
    let content = decode_content(bytes, &encoding)?;
    let delimiter = detect_delimiter(&content);

    parse_string_with_metadata(&content, delimiter, encoding)
}

/// Parse CSV text with auto-detection of the delimiter.
pub fn parse_text_auto(content: &str) -> CsvResult<ParseResult> {
    let content = content.trim_start_matches('\u{feff}');
    parse_string_with_metadata(content, detect_delimiter(content), "utf-8".to_string())
}

/// Parse CSV string with explicit delimiter and return metadata.
///
/// Cells missing from short rows are left out of the row map entirely;
/// rows where every cell is blank are skipped.
pub fn parse_string_with_metadata(
    content: &str,
    delimiter: char,
    encoding: String,
) -> CsvResult<ParseResult> {
    if content.trim().is_empty() {
        return Err(CsvError::EmptyFile);
    }

    let delimiter_byte = u8::try_from(delimiter).map_err(|_| CsvError::ParseError {
        line: 0,
        message: format!("delimiter '{}' is not a single-byte character", delimiter),
    })?;

    let mut reader = csv::ReaderBuilder::new()
        .delimiter(delimiter_byte)
        .has_headers(true)
        .flexible(true)
        .from_reader(content.as_bytes());

    let headers: Vec<String> = reader.headers()?.iter().map(String::from).collect();

    if headers.iter().all(|h| h.trim().is_empty()) {
        return Err(CsvError::NoHeaders);
    }

    let mut records = Vec::new();

    for result in reader.records() {
        let record = result?;

        if record.iter().all(|cell| cell.trim().is_empty()) {
            continue;
        }

        let row: RawRow = headers
            .iter()
            .zip(record.iter())
            .map(|(header, cell)| (header.clone(), cell.to_string()))
            .collect();

        records.push(row);
    }

    Ok(ParseResult {
        records,
        encoding,
        delimiter,
        headers,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_simple_csv() {
        let csv = "L1 metric,MTM\nBookings,Total Bookings\n,Brand Android";
        let result = parse_text(csv, ',').unwrap();

        assert_eq!(result.records.len(), 2);
        assert_eq!(result.records[0]["L1 metric"], "Bookings");
        assert_eq!(result.records[0]["MTM"], "Total Bookings");
        assert_eq!(result.records[1]["L1 metric"], "");
        assert_eq!(result.records[1]["MTM"], "Brand Android");
    }

    #[test]
    fn test_quoted_thousands_separator() {
        let csv = "MTM,10 Mar - 16 Mar\nTotal Bookings,\"100,955\"";
        let result = parse_text_auto(csv).unwrap();

        assert_eq!(result.delimiter, ',');
        assert_eq!(result.records[0]["10 Mar - 16 Mar"], "100,955");
    }

    #[test]
    fn test_headers_kept_verbatim() {
        let csv = " L1 metric ,MTM\nBookings,Total";
        let result = parse_text(csv, ',').unwrap();

        assert_eq!(result.headers, vec![" L1 metric ", "MTM"]);
        assert!(result.records[0].contains_key(" L1 metric "));
    }

    #[test]
    fn test_blank_rows_skipped() {
        let csv = "a,b\n1,2\n,\n\n3,4\n";
        let result = parse_text(csv, ',').unwrap();

        assert_eq!(result.records.len(), 2);
    }

    #[test]
    fn test_short_rows_leave_cells_absent() {
        let csv = "a,b,c\n1,2";
        let result = parse_text(csv, ',').unwrap();

        assert_eq!(result.records[0]["a"], "1");
        assert!(!result.records[0].contains_key("c"));
    }

    #[test]
    fn test_empty_csv_error() {
        assert!(matches!(parse_text("", ','), Err(CsvError::EmptyFile)));
        assert!(matches!(parse_text("   \n", ','), Err(CsvError::EmptyFile)));
        assert!(matches!(parse_bytes_auto(b""), Err(CsvError::EmptyFile)));
    }

    #[test]
    fn test_blank_header_row_rejected() {
        assert!(matches!(parse_text(",,\n1,2,3", ','), Err(CsvError::NoHeaders)));
    }

    #[test]
    fn test_header_only_yields_no_records() {
        let result = parse_text("a,b", ',').unwrap();
        assert!(result.records.is_empty());
        assert_eq!(result.headers.len(), 2);
    }

    #[test]
    fn test_detect_delimiter() {
        assert_eq!(detect_delimiter("a;b;c\n1;2;3"), ';');
        assert_eq!(detect_delimiter("a,b,c\n1,2,3"), ',');
        assert_eq!(detect_delimiter("a\tb\tc\n1\t2\t3"), '\t');
        assert_eq!(detect_delimiter("a|b|c\n1|2|3"), '|');
    }

    #[test]
    fn test_detect_delimiter_ignores_quoted() {
        assert_eq!(detect_delimiter("\"a,b,c\";d;e"), ';');
    }

    #[test]
    fn test_auto_parse_bytes() {
        let csv = "\u{feff}MTM;Feb Avg\nTotal;97892";
        let result = parse_bytes_auto(csv.as_bytes()).unwrap();

        assert_eq!(result.delimiter, ';');
        assert_eq!(result.headers, vec!["MTM", "Feb Avg"]);
        assert_eq!(result.records[0]["Feb Avg"], "97892");
    }

    #[test]
    fn test_latin1_decoding() {
        // "Société" in ISO-8859-1
        let bytes: &[u8] = &[0x53, 0x6F, 0x63, 0x69, 0xE9, 0x74, 0xE9];
        let decoded = decode_content(bytes, "iso-8859-1").unwrap();
        assert_eq!(decoded, "Société");
    }

    #[test]
    fn test_unknown_encoding_label() {
        assert!(matches!(
            decode_content(b"abc", "not-a-charset"),
            Err(CsvError::EncodingError(_))
        ));
    }
}
