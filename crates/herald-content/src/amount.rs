//! Amount formatting.

use crate::event::Amount;
use serde_json::Value;

/// Format a token amount for display.
///
/// Values that coerce to a finite number are formatted with
/// [`format_number`]; booleans coerce to `1` and `0`. Anything else falls
/// back to its raw text (compact JSON for arrays and objects).
pub fn format_amount(value: &Amount) -> String {
    match coerce(value) {
        Some(number) => format_number(number),
        None => value.to_string(),
    }
}

/// `|n| >= 1000`: thousands separators, no decimals.
/// Otherwise: at most four decimals with trailing zeros removed.
pub fn format_number(number: f64) -> String {
    if number.abs() >= 1000.0 {
        return group_thousands(&format!("{:.0}", number));
    }

    let fixed = format!("{:.4}", number);
    let trimmed = fixed.trim_end_matches('0').trim_end_matches('.');
    match trimmed {
        "-0" | "" => "0".to_string(),
        other => other.to_string(),
    }
}

fn coerce(value: &Amount) -> Option<f64> {
    let number = match value {
        Amount::Number(n) => n.as_f64(),
        Amount::Text(s) => s.trim().parse::<f64>().ok(),
        Amount::Other(Value::Bool(b)) => Some(if *b { 1.0 } else { 0.0 }),
        Amount::Other(_) => None,
    }?;
    number.is_finite().then_some(number)
}

fn group_thousands(digits: &str) -> String {
    let (sign, digits) = match digits.strip_prefix('-') {
        Some(rest) => ("-", rest),
        None => ("", digits),
    };

    let mut grouped = String::with_capacity(digits.len() + digits.len() / 3 + 1);
    for (i, c) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(c);
    }
    format!("{}{}", sign, grouped)
}
