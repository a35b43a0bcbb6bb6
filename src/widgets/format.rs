use num_format::{Locale, ToFormattedString};
use serde_json::{Number, Value};

use crate::json_path::FieldPath;

pub const NOT_AVAILABLE: &str = "N/A";

/// Numbers strictly inside this range are shown as prices.
const CURRENCY_RANGE: (f64, f64) = (0.0, 1_000_000.0);
/// Fraction digits kept for plain numbers.
const MAX_PLAIN_FRACTION_DIGITS: usize = 3;

/// Display string for a projected value.
pub fn format_value(value: &Value) -> String {
    match value {
        Value::Null => NOT_AVAILABLE.to_string(),
        Value::Number(number) => format_number(number),
        Value::Bool(true) => "Yes".to_string(),
        Value::Bool(false) => "No".to_string(),
        Value::Array(items) => format!("[{} items]", items.len()),
        Value::Object(_) => value.to_string(),
        Value::String(text) => text.clone(),
    }
}

pub fn format_number(number: &Number) -> String {
    let Some(float) = number.as_f64() else {
        return number.to_string();
    };

    if float > CURRENCY_RANGE.0 && float < CURRENCY_RANGE.1 {
        return format!("${}", group_decimal(&format!("{float:.2}")));
    }

    if let Some(int) = number.as_i64() {
        return int.to_formatted_string(&Locale::en);
    }
    if let Some(uint) = number.as_u64() {
        return uint.to_formatted_string(&Locale::en);
    }

    let fixed = format!("{float:.prec$}", prec = MAX_PLAIN_FRACTION_DIGITS);
    let trimmed = fixed.trim_end_matches('0').trim_end_matches('.');
    group_decimal(trimmed)
}

/// Inserts thousands separators into the integer part of a decimal string.
fn group_decimal(decimal: &str) -> String {
    let (sign, unsigned) = match decimal.strip_prefix('-') {
        Some(rest) => ("-", rest),
        None => ("", decimal),
    };
    let (int_part, frac_part) = match unsigned.split_once('.') {
        Some((int_part, frac_part)) => (int_part, Some(frac_part)),
        None => (unsigned, None),
    };

    let grouped = int_part
        .parse::<u128>()
        .map(|int| int.to_formatted_string(&Locale::en))
        .unwrap_or_else(|_| int_part.to_string());

    match frac_part {
        Some(frac) => format!("{sign}{grouped}.{frac}"),
        None => format!("{sign}{grouped}"),
    }
}

/// Human label from a path's last segment: `items[].lastPrice` → `Last Price`,
/// `52_week_high` → `52 Week High`.
pub fn field_label(path: &str) -> String {
    let path = FieldPath::new(path);
    let leaf = path.leaf_key();

    let mut spaced = String::with_capacity(leaf.len() + 4);
    let mut prev: Option<char> = None;
    for ch in leaf.chars() {
        let boundary = ch.is_uppercase()
            && prev.is_some_and(|p| p.is_lowercase() || p.is_ascii_digit());
        if boundary {
            spaced.push(' ');
        }
        spaced.push(if ch == '_' { ' ' } else { ch });
        prev = Some(ch);
    }

    let mut label = String::with_capacity(spaced.len());
    let mut word_start = true;
    for ch in spaced.chars() {
        if word_start && ch.is_alphanumeric() {
            label.extend(ch.to_uppercase());
        } else {
            label.push(ch);
        }
        word_start = !ch.is_alphanumeric();
    }
    label
}
