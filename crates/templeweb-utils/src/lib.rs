//! Formatting and HTML helpers shared by the page renderers

use rust_decimal::{Decimal, RoundingStrategy};

/// Group the integer digits of a plain number string with `sep`
pub fn format_number(digits: &str, sep: &str) -> String {
    let (sign, digits) = match digits.strip_prefix('-') {
        Some(rest) => ("-", rest),
        None => ("", digits),
    };
    let mut result = String::new();
    let mut count = 0;
    for c in digits.chars().rev() {
        if count == 3 {
            result.push_str(&sep.chars().rev().collect::<String>());
            count = 0;
        }
        result.push(c);
        count += 1;
    }
    let grouped: String = result.chars().rev().collect();
    format!("{}{}", sign, grouped)
}

/// Format a money amount with a fixed number of decimals and grouped thousands
///
/// Rounds half away from zero, so `0.005` shows as `0.01`.
pub fn format_amount(value: Decimal, decimal_places: u32, thousands_sep: &str) -> String {
    let rounded = value.round_dp_with_strategy(decimal_places, RoundingStrategy::MidpointAwayFromZero);
    let text = format!("{:.*}", decimal_places as usize, rounded);
    match text.split_once('.') {
        Some((int_part, frac)) => format!("{}.{}", format_number(int_part, thousands_sep), frac),
        None => format_number(&text, thousands_sep),
    }
}

/// Escape text for use in HTML bodies and quoted attributes
pub fn escape_html(content: &str) -> String {
    let mut out = String::with_capacity(content.len());
    for c in content.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            _ => out.push(c),
        }
    }
    out
}
