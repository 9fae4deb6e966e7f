use super::types::RateSlice;

const CURRENCY: &str = "руб.";
const ALLOWANCE_SUFFIX: &str = "(РК/СН)";

/// Groups thousands with a space: `1200000` becomes `"1 200 000"`.
pub fn format_number(n: i64) -> String {
    let digits = n.unsigned_abs().to_string();
    let mut out = String::with_capacity(digits.len() + digits.len() / 3 + 1);
    if n < 0 {
        out.push('-');
    }
    for (i, ch) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            out.push(' ');
        }
        out.push(ch);
    }
    out
}

/// Human-readable list of the rates a month's income was taxed at.
///
/// Regular slices come first, then allowance slices marked with the РК/СН
/// suffix. Zero-amount slices are skipped.
pub fn format_rate_breakdown(regular: &[RateSlice], allowance: &[RateSlice]) -> String {
    let regular_parts = regular
        .iter()
        .filter(|s| s.amount > 0.0)
        .map(|s| format_slice(s, None));
    let allowance_parts = allowance
        .iter()
        .filter(|s| s.amount > 0.0)
        .map(|s| format_slice(s, Some(ALLOWANCE_SUFFIX)));

    let parts: Vec<String> = regular_parts.chain(allowance_parts).collect();
    if parts.is_empty() {
        format!("0% на 0 {CURRENCY}")
    } else {
        parts.join(" + ")
    }
}

fn format_slice(slice: &RateSlice, suffix: Option<&str>) -> String {
    let amount = format_number(slice.amount.round() as i64);
    match suffix {
        Some(suffix) => format!("{}% на {amount} {CURRENCY} {suffix}", slice.rate_percent),
        None => format!("{}% на {amount} {CURRENCY}", slice.rate_percent),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn format_number_groups_thousands() {
        assert_eq!(format_number(0), "0");
        assert_eq!(format_number(999), "999");
        assert_eq!(format_number(1_000), "1 000");
        assert_eq!(format_number(1_200_000), "1 200 000");
        assert_eq!(format_number(12_345_678), "12 345 678");
        assert_eq!(format_number(-45_000), "-45 000");
    }

    #[test]
    fn breakdown_lists_regular_then_allowance() {
        let regular = [RateSlice {
            rate_percent: 13,
            amount: 100_000.0,
        }];
        let allowance = [RateSlice {
            rate_percent: 13,
            amount: 50_000.4,
        }];

        assert_eq!(
            format_rate_breakdown(&regular, &allowance),
            "13% на 100 000 руб. + 13% на 50 000 руб. (РК/СН)"
        );
    }

    #[test]
    fn breakdown_joins_multiple_rates() {
        let regular = [
            RateSlice {
                rate_percent: 13,
                amount: 40_000.0,
            },
            RateSlice {
                rate_percent: 15,
                amount: 60_000.0,
            },
        ];

        assert_eq!(
            format_rate_breakdown(&regular, &[]),
            "13% на 40 000 руб. + 15% на 60 000 руб."
        );
    }

    #[test]
    fn empty_breakdown_reads_zero() {
        assert_eq!(format_rate_breakdown(&[], &[]), "0% на 0 руб.");

        let zero = [RateSlice {
            rate_percent: 13,
            amount: 0.0,
        }];
        assert_eq!(format_rate_breakdown(&zero, &zero), "0% на 0 руб.");
    }
}
