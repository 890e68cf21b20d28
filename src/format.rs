//! Display formatting for commission amounts.
//!
//! Format: currency symbol + number with thousands separator + two decimals.
//! Amounts are summed unrounded elsewhere; rounding to cents happens here.

use serde::{Deserialize, Serialize};

use crate::services::commission::CommissionSummary;

/// The two currencies commissions are tracked in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Currency {
    Usd,
    Cdf,
}

impl Currency {
    pub fn code(&self) -> &'static str {
        match self {
            Self::Usd => "USD",
            Self::Cdf => "CDF",
        }
    }

    pub fn symbol(&self) -> &'static str {
        match self {
            Self::Usd => "$",
            Self::Cdf => "FC",
        }
    }
}

/// Format an amount: `$1,234.50` for USD, `1,234.50 FC` for CDF.
pub fn format_amount(value: f64, currency: Currency) -> String {
    let cents = to_cents(value);
    let is_negative = cents < 0;
    let abs_cents = cents.unsigned_abs();
    let whole = group_thousands(abs_cents / 100, ',');
    let number = format!("{}.{:02}", whole, abs_cents % 100);
    let sign = if is_negative { "-" } else { "" };

    match currency {
        Currency::Usd => format!("{}{}{}", sign, currency.symbol(), number),
        Currency::Cdf => format!("{}{} {}", sign, number, currency.symbol()),
    }
}

fn to_cents(value: f64) -> i64 {
    if value.is_finite() {
        (value * 100.0).round() as i64
    } else {
        0
    }
}

/// Group the digits of a non-negative whole amount in threes.
fn group_thousands(whole: u64, sep: char) -> String {
    let digits = whole.to_string();
    let len = digits.len();
    digits
        .chars()
        .enumerate()
        .fold(String::with_capacity(len + len / 3), |mut out, (i, digit)| {
            if i > 0 && (len - i) % 3 == 0 {
                out.push(sep);
            }
            out.push(digit);
            out
        })
}

/// Summary totals ready for display.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FormattedSummary {
    pub total_usd: String,
    pub total_cdf: String,
    pub count: usize,
}

pub fn format_summary(summary: &CommissionSummary) -> FormattedSummary {
    FormattedSummary {
        total_usd: format_amount(summary.total_usd, Currency::Usd),
        total_cdf: format_amount(summary.total_cdf, Currency::Cdf),
        count: summary.count,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_usd() {
        assert_eq!(format_amount(123.45, Currency::Usd), "$123.45");
    }

    #[test]
    fn test_cdf() {
        assert_eq!(format_amount(5000.0, Currency::Cdf), "5,000.00 FC");
    }

    #[test]
    fn test_zero() {
        assert_eq!(format_amount(0.0, Currency::Usd), "$0.00");
    }

    #[test]
    fn test_thousands_separator() {
        assert_eq!(format_amount(1234567.891, Currency::Usd), "$1,234,567.89");
    }

    #[test]
    fn test_group_thousands_boundaries() {
        assert_eq!(group_thousands(0, ','), "0");
        assert_eq!(group_thousands(999, ','), "999");
        assert_eq!(group_thousands(1000, ','), "1,000");
        assert_eq!(group_thousands(100000, ','), "100,000");
        assert_eq!(group_thousands(1000000, ' '), "1 000 000");
    }

    #[test]
    fn test_negative_amount() {
        assert_eq!(format_amount(-1500.0, Currency::Cdf), "-1,500.00 FC");
    }

    #[test]
    fn test_rounds_half_cent_up() {
        assert_eq!(format_amount(0.125, Currency::Usd), "$0.13");
    }

    #[test]
    fn test_non_finite_is_zero() {
        assert_eq!(format_amount(f64::NAN, Currency::Cdf), "0.00 FC");
    }

    #[test]
    fn test_summary() {
        let summary = CommissionSummary {
            total_usd: 10.5,
            total_cdf: 250000.0,
            count: 3,
        };
        let formatted = format_summary(&summary);
        assert_eq!(formatted.total_usd, "$10.50");
        assert_eq!(formatted.total_cdf, "250,000.00 FC");
        assert_eq!(formatted.count, 3);
    }
}
