//! Cell text to [`PeriodValue`].
//!
//! Tolerant by construction: nothing here fails. Text that does not look
//! like a number comes back unchanged so it can still be displayed.

use crate::models::PeriodValue;

/// Raw input to the value parser.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum RawCell<'a> {
    /// Absent or null cell.
    Missing,
    /// Cell text as read from the source.
    Text(&'a str),
    /// Already-numeric input.
    Number(f64),
}

impl<'a> From<&'a str> for RawCell<'a> {
    fn from(s: &'a str) -> Self {
        RawCell::Text(s)
    }
}

impl<'a> From<&'a String> for RawCell<'a> {
    fn from(s: &'a String) -> Self {
        RawCell::Text(s.as_str())
    }
}

impl<'a> From<Option<&'a str>> for RawCell<'a> {
    fn from(s: Option<&'a str>) -> Self {
        s.map_or(RawCell::Missing, RawCell::Text)
    }
}

impl<'a> From<Option<&'a String>> for RawCell<'a> {
    fn from(s: Option<&'a String>) -> Self {
        s.map_or(RawCell::Missing, |s| RawCell::Text(s.as_str()))
    }
}

impl From<f64> for RawCell<'_> {
    fn from(n: f64) -> Self {
        RawCell::Number(n)
    }
}

/// Parse one cell.
///
/// - missing or blank → [`PeriodValue::Empty`]
/// - finite numeric input → returned as-is; NaN and infinities → text
/// - contains `%` → kept verbatim as text
/// - thousands separators are stripped before the numeric attempt
/// - anything else that is not a finite number → original text
pub fn parse_value<'a>(raw: impl Into<RawCell<'a>>) -> PeriodValue {
    match raw.into() {
        RawCell::Missing => PeriodValue::Empty,
        RawCell::Number(n) if n.is_finite() => PeriodValue::Number(n),
        RawCell::Number(n) => PeriodValue::Text(n.to_string()),
        RawCell::Text(text) => parse_text(text),
    }
}

fn parse_text(text: &str) -> PeriodValue {
    let trimmed = text.trim();
    if trimmed.is_empty() {
        return PeriodValue::Empty;
    }

    if trimmed.contains('%') {
        return PeriodValue::Text(text.to_string());
    }

    let candidate = trimmed.replace(',', "");
    match candidate.parse::<f64>() {
        // f64::from_str accepts "inf" and "NaN"; those are text here.
        Ok(n) if n.is_finite() => PeriodValue::Number(n),
        _ => PeriodValue::Text(text.to_string()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_thousands_separator() {
        assert_eq!(parse_value("1,234.5"), PeriodValue::Number(1234.5));
        assert_eq!(parse_value("100,955"), PeriodValue::Number(100955.0));
    }

    #[test]
    fn test_percentage_kept_verbatim() {
        assert_eq!(parse_value("4.70%"), PeriodValue::Text("4.70%".into()));
        assert_eq!(parse_value("1,000%"), PeriodValue::Text("1,000%".into()));
    }

    #[test]
    fn test_empty_inputs() {
        assert_eq!(parse_value(""), PeriodValue::Empty);
        assert_eq!(parse_value("   "), PeriodValue::Empty);
        assert_eq!(parse_value(None::<&str>), PeriodValue::Empty);
        assert_eq!(parse_value(RawCell::Missing), PeriodValue::Empty);
    }

    #[test]
    fn test_numeric_passthrough() {
        assert_eq!(parse_value(42.0), PeriodValue::Number(42.0));
        assert_eq!(parse_value(0.0), PeriodValue::Number(0.0));
    }

    #[test]
    fn test_non_finite_numbers_are_text() {
        assert_eq!(parse_value(f64::NAN), PeriodValue::Text("NaN".into()));
        assert_eq!(parse_value(f64::INFINITY), PeriodValue::Text("inf".into()));
        assert_eq!(parse_value(f64::NEG_INFINITY), PeriodValue::Text("-inf".into()));
        assert_eq!(parse_value(f64::NAN).as_number(), None);
    }

    #[test]
    fn test_text_fallbacks_keep_original_cell() {
        assert_eq!(parse_value(" 4.70% "), PeriodValue::Text(" 4.70% ".into()));
        assert_eq!(parse_value(" n/a "), PeriodValue::Text(" n/a ".into()));
    }

    #[test]
    fn test_plain_numbers() {
        assert_eq!(parse_value("0.71"), PeriodValue::Number(0.71));
        assert_eq!(parse_value(" -12 "), PeriodValue::Number(-12.0));
        assert_eq!(parse_value("0"), PeriodValue::Number(0.0));
    }

    #[test]
    fn test_unparseable_falls_back_to_text() {
        assert_eq!(parse_value("n/a"), PeriodValue::Text("n/a".into()));
        assert_eq!(parse_value("12abc"), PeriodValue::Text("12abc".into()));
        assert_eq!(parse_value("inf"), PeriodValue::Text("inf".into()));
        assert_eq!(parse_value("NaN"), PeriodValue::Text("NaN".into()));
    }

    #[test]
    fn test_owned_string_input() {
        let cell = String::from("27,623");
        assert_eq!(parse_value(&cell), PeriodValue::Number(27623.0));
        assert_eq!(parse_value(Some(&cell)), PeriodValue::Number(27623.0));
    }
}
