//! Extract a number and unit from an HTML title fragment.
//!
//! Source titles look like `World Seaborne Trade <b>12,345.6 bt</b>`. The
//! bolded block must hold a numeric token immediately followed by an optional
//! unit token; anything else in the block means the block does not match.
//!
//! Cleaning drops thousands separators, parentheses and whitespace before
//! matching, so `<b>(1.5 %)</b>` reads as `1.5` with unit `%`.

use crate::domain::{RATE_MARKER, UNIT_SENTINEL, Value, is_rate_unit};
use crate::error::AppError;

const OPEN_TAG: &str = "<b>";
const CLOSE_TAG: &str = "</b>";

const MAX_NUMBER_LEN: usize = 32;
const MAX_UNIT_LEN: usize = 100;

/// A value extracted from one fragment.
#[derive(Debug, Clone, PartialEq)]
pub struct ParsedValue {
    pub value: Value,
    /// Unit token as written; may be empty.
    pub unit: String,
}

impl ParsedValue {
    /// The unit, or `"index"` when the fragment carried none.
    pub fn unit_or_sentinel(&self) -> &str {
        if self.unit.is_empty() { UNIT_SENTINEL } else { &self.unit }
    }
}

/// Parse the first bolded numeric token (and its unit) out of `raw`.
///
/// The value is an integer when the parsed unit token contains `$/day`
/// (case-insensitive), a float otherwise. No numeric token is an error; callers
/// must abort rather than store a placeholder.
pub fn parse_value(raw: &str) -> Result<ParsedValue, AppError> {
    let cleaned = clean(raw);

    let (number, unit) = bold_blocks(&cleaned)
        .find_map(split_number_unit)
        .ok_or_else(|| AppError::new(3, format!("No numeric token in fragment '{raw}'.")))?;

    let value = if is_rate_unit(unit) {
        Value::parse_for_unit(number, RATE_MARKER)
    } else {
        number.parse::<f64>().ok().filter(|v| v.is_finite()).map(Value::Float)
    }
    .ok_or_else(|| AppError::new(3, format!("Invalid numeric token '{number}' in fragment '{raw}'.")))?;

    Ok(ParsedValue {
        value,
        unit: unit.to_string(),
    })
}

fn clean(raw: &str) -> String {
    raw.chars()
        .filter(|c| !matches!(c, ',' | '(' | ')') && !c.is_whitespace())
        .collect()
}

/// Inner text of every `<b>...</b>` block, case-insensitive on the tags.
fn bold_blocks(s: &str) -> impl Iterator<Item = &str> {
    let lc = s.to_ascii_lowercase();
    let mut from = 0usize;
    std::iter::from_fn(move || {
        let open = lc.get(from..)?.find(OPEN_TAG)? + from;
        let inner_start = open + OPEN_TAG.len();
        let close = lc[inner_start..].find(CLOSE_TAG)? + inner_start;
        from = close + CLOSE_TAG.len();
        Some(&s[inner_start..close])
    })
}

/// Split a cleaned block into `(number, unit)`.
///
/// Returns `None` unless the block is exactly an optional sign, a non-empty run
/// of digits and dots holding at least one digit, then a run of unit characters (letters, `%`, `$`, `/`).
fn split_number_unit(block: &str) -> Option<(&str, &str)> {
    let signed = block.starts_with(['-', '+']);
    let body = if signed { &block[1..] } else { block };

    let digits = body
        .find(|c: char| !(c.is_ascii_digit() || c == '.'))
        .unwrap_or(body.len());
    if digits > MAX_NUMBER_LEN || !body[..digits].contains(|c: char| c.is_ascii_digit()) {
        return None;
    }

    let unit = &body[digits..];
    let unit_ok = unit.len() <= MAX_UNIT_LEN
        && unit.chars().all(|c| c.is_ascii_alphabetic() || matches!(c, '%' | '$' | '/'));
    if !unit_ok {
        return None;
    }

    let number_end = digits + usize::from(signed);
    Some((&block[..number_end], unit))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_float_with_unit() {
        let p = parse_value("<b>1234.5 bt</b>").unwrap();
        assert_eq!(p.value, Value::Float(1234.5));
        assert!(matches!(p.value, Value::Float(_)));
        assert_eq!(p.unit, "bt");
    }

    #[test]
    fn rate_unit_yields_integer() {
        let p = parse_value("<b>12,345 $/day</b>").unwrap();
        assert!(matches!(p.value, Value::Int(12345)));
        assert_eq!(p.unit, "$/day");

        let p = parse_value("ClarkSea Index <b>21,000 $/Day</b>").unwrap();
        assert!(matches!(p.value, Value::Int(21000)));
    }

    #[test]
    fn strips_separators_parentheses_and_whitespace() {
        let p = parse_value("World Seaborne Trade <B> 12,816.3  bt </B> (2024)").unwrap();
        assert_eq!(p.value, Value::Float(12816.3));
        assert_eq!(p.unit, "bt");

        let p = parse_value("y-o-y <b>(2.1%)</b>").unwrap();
        assert_eq!(p.value, Value::Float(2.1));
        assert_eq!(p.unit, "%");
    }

    #[test]
    fn empty_unit_falls_back_to_sentinel() {
        let p = parse_value("Newbuild Price Index <b>185.6</b>").unwrap();
        assert_eq!(p.unit, "");
        assert_eq!(p.unit_or_sentinel(), "index");
    }

    #[test]
    fn negative_growth_is_accepted() {
        let p = parse_value("<b>-0.8%</b>").unwrap();
        assert_eq!(p.value, Value::Float(-0.8));
    }

    #[test]
    fn skips_bold_blocks_without_a_number() {
        let p = parse_value("<b>Trade</b> volume <b>99.5 bt</b>").unwrap();
        assert_eq!(p.value, Value::Float(99.5));

        let p = parse_value("<b>.</b><b>-.</b><b>5 bt</b>").unwrap();
        assert_eq!(p.value, Value::Float(5.0));
        assert_eq!(p.unit, "bt");
    }

    #[test]
    fn missing_numeric_token_is_an_extraction_error() {
        for raw in ["<b>n/a</b>", "no markup 123", "<b>bt</b>", "", "<b>12 bt"] {
            let err = parse_value(raw).unwrap_err();
            assert_eq!(err.exit_code(), 3, "fragment {raw:?}");
        }
    }

    #[test]
    fn malformed_number_is_an_extraction_error() {
        assert_eq!(parse_value("<b>1.2.3 bt</b>").unwrap_err().exit_code(), 3);
        assert_eq!(parse_value("<b>123.5 $/day</b>").unwrap_err().exit_code(), 3);
    }

    #[test]
    fn rate_beyond_i64_is_an_extraction_error() {
        let err = parse_value("<b>99999999999999999999999 $/day</b>").unwrap_err();
        assert_eq!(err.exit_code(), 3);

        let p = parse_value("<b>9,223,372,036,854,775,807 $/day</b>").unwrap();
        assert_eq!(p.value, Value::Int(i64::MAX));
    }
}
