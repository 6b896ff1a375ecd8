//! Minor-unit amount formatting.
//!
//! The gateway transacts in minor units (kobo, cents); emails and logs show
//! major units with two decimals and thousands separators.

use rust_decimal::Decimal;

/// Render a gateway amount as a currency string, e.g. `format_amount(3990000, "NGN")`
/// is `"₦39,900.00"`. Currencies without a known symbol fall back to the code:
/// `"XOF 1,000.00"`.
pub fn format_amount(minor_units: i64, currency: &str) -> String {
    // All supported gateway currencies use two-decimal minor units
    let major = Decimal::new(minor_units, 2);
    let formatted = group_thousands(major);
    match currency_symbol(currency) {
        Some(symbol) => format!("{symbol}{formatted}"),
        None => format!("{currency} {formatted}"),
    }
}

fn currency_symbol(currency: &str) -> Option<&'static str> {
    match currency {
        "NGN" => Some("₦"),
        "USD" => Some("$"),
        "GBP" => Some("£"),
        "EUR" => Some("€"),
        "GHS" => Some("GH₵"),
        "ZAR" => Some("R"),
        "KES" => Some("KSh "),
        _ => None,
    }
}

/// "39900.00" -> "39,900.00"
fn group_thousands(amount: Decimal) -> String {
    let rendered = format!("{amount:.2}");
    let (integer, fraction) = rendered.split_once('.').unwrap_or((rendered.as_str(), "00"));
    let (sign, digits) = match integer.strip_prefix('-') {
        Some(rest) => ("-", rest),
        None => ("", integer),
    };

    let mut grouped = String::with_capacity(digits.len() + digits.len() / 3);
    for (i, c) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(c);
    }

    format!("{sign}{grouped}.{fraction}")
}
