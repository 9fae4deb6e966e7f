use super::types::{RateSlice, TaxBracket, TaxComputation, TaxSchedule};

pub const REGULAR_BRACKETS: [TaxBracket; 5] = [
    TaxBracket {
        threshold: Some(2_400_000.0),
        rate_percent: 13,
    },
    TaxBracket {
        threshold: Some(5_000_000.0),
        rate_percent: 15,
    },
    TaxBracket {
        threshold: Some(20_000_000.0),
        rate_percent: 18,
    },
    TaxBracket {
        threshold: Some(50_000_000.0),
        rate_percent: 20,
    },
    TaxBracket {
        threshold: None,
        rate_percent: 22,
    },
];

pub const ALLOWANCE_BRACKETS: [TaxBracket; 2] = [
    TaxBracket {
        threshold: Some(5_000_000.0),
        rate_percent: 13,
    },
    TaxBracket {
        threshold: None,
        rate_percent: 15,
    },
];

/// Largest income the engine handles. Beyond 2^53 an `f64` no longer holds
/// every whole number, and rounded taxes stop fitting cleanly in `i64`.
pub const MAX_EXACT_AMOUNT: f64 = 9_007_199_254_740_992.0;

impl TaxSchedule {
    pub fn brackets(self) -> &'static [TaxBracket] {
        match self {
            Self::Regular => &REGULAR_BRACKETS,
            Self::Allowance => &ALLOWANCE_BRACKETS,
        }
    }
}

/// Tax owed on a year-to-date income under `schedule`.
///
/// Walks the brackets in ascending order, filling each one up to its width
/// before moving on. The returned slices list only brackets that received
/// income, so their amounts sum to `cumulative_income` and their rates are
/// strictly ascending. The tax is rounded to the nearest whole unit.
///
/// Callers keep `cumulative_income` within [`MAX_EXACT_AMOUNT`].
pub fn compute_tax(cumulative_income: f64, schedule: TaxSchedule) -> TaxComputation {
    let mut tax = 0.0;
    let mut slices = Vec::new();
    let mut remaining = cumulative_income;
    let mut lower = 0.0;

    for bracket in schedule.brackets() {
        if remaining <= 0.0 {
            break;
        }
        let slice = match bracket.threshold {
            Some(upper) => remaining.min(upper - lower),
            None => remaining,
        };
        if slice > 0.0 {
            tax += slice * f64::from(bracket.rate_percent) / 100.0;
            slices.push(RateSlice {
                rate_percent: bracket.rate_percent,
                amount: slice,
            });
        }
        remaining -= slice;
        if let Some(upper) = bracket.threshold {
            lower = upper;
        }
    }

    TaxComputation {
        tax: tax.round() as i64,
        slices,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use proptest::prelude::{prop_assert, prop_assert_eq, proptest};

    fn slice(rate_percent: u32, amount: f64) -> RateSlice {
        RateSlice {
            rate_percent,
            amount,
        }
    }

    #[test]
    fn zero_income_owes_nothing() {
        assert_eq!(
            compute_tax(0.0, TaxSchedule::Regular),
            TaxComputation::default()
        );
        assert_eq!(
            compute_tax(0.0, TaxSchedule::Allowance),
            TaxComputation::default()
        );
    }

    #[test]
    fn negative_income_owes_nothing() {
        assert_eq!(
            compute_tax(-5_000.0, TaxSchedule::Regular),
            TaxComputation::default()
        );
    }

    #[test]
    fn income_inside_first_bracket_uses_base_rate() {
        let result = compute_tax(100_000.0, TaxSchedule::Regular);

        assert_eq!(result.tax, 13_000);
        assert_eq!(result.slices, vec![slice(13, 100_000.0)]);
    }

    #[test]
    fn threshold_is_inclusive() {
        let result = compute_tax(2_400_000.0, TaxSchedule::Regular);

        assert_eq!(result.tax, 312_000);
        assert_eq!(result.slices, vec![slice(13, 2_400_000.0)]);
    }

    #[test]
    fn income_crossing_threshold_splits_across_brackets() {
        let result = compute_tax(3_000_000.0, TaxSchedule::Regular);

        assert_eq!(result.tax, 312_000 + 90_000);
        assert_eq!(
            result.slices,
            vec![slice(13, 2_400_000.0), slice(15, 600_000.0)]
        );
    }

    #[test]
    fn top_bracket_is_unbounded() {
        let result = compute_tax(60_000_000.0, TaxSchedule::Regular);

        // 312_000 + 390_000 + 2_700_000 + 6_000_000 + 2_200_000
        assert_eq!(result.tax, 11_602_000);
        assert_eq!(
            result.slices,
            vec![
                slice(13, 2_400_000.0),
                slice(15, 2_600_000.0),
                slice(18, 15_000_000.0),
                slice(20, 30_000_000.0),
                slice(22, 10_000_000.0),
            ]
        );
    }

    #[test]
    fn allowance_schedule_has_two_brackets() {
        let result = compute_tax(6_000_000.0, TaxSchedule::Allowance);

        assert_eq!(result.tax, 650_000 + 150_000);
        assert_eq!(
            result.slices,
            vec![slice(13, 5_000_000.0), slice(15, 1_000_000.0)]
        );
    }

    #[test]
    fn tax_is_rounded_to_whole_units() {
        // 13% of 1_003 is 130.39
        assert_eq!(compute_tax(1_003.0, TaxSchedule::Regular).tax, 130);
        // 13% of 1_005 is 130.65
        assert_eq!(compute_tax(1_005.0, TaxSchedule::Regular).tax, 131);
    }

    #[test]
    fn bracket_tables_are_strictly_increasing() {
        for schedule in [TaxSchedule::Regular, TaxSchedule::Allowance] {
            let brackets = schedule.brackets();
            let bounded: Vec<f64> = brackets.iter().filter_map(|b| b.threshold).collect();
            assert_eq!(bounded.len(), brackets.len() - 1);
            assert!(bounded.windows(2).all(|w| w[0] < w[1]));
            assert_eq!(brackets.last().and_then(|b| b.threshold), None);
        }
    }

    proptest! {
        #[test]
        fn prop_regular_tax_is_monotone(
            income in 0u64..80_000_000,
            extra in 0u64..10_000_000
        ) {
            let lower = compute_tax(income as f64, TaxSchedule::Regular);
            let higher = compute_tax((income + extra) as f64, TaxSchedule::Regular);
            prop_assert!(lower.tax <= higher.tax);
        }

        #[test]
        fn prop_slices_cover_income_with_ascending_rates(
            income in 0u64..80_000_000,
            allowance in proptest::bool::ANY
        ) {
            let schedule = if allowance { TaxSchedule::Allowance } else { TaxSchedule::Regular };
            let result = compute_tax(income as f64, schedule);

            let covered: f64 = result.slices.iter().map(|s| s.amount).sum();
            prop_assert!((covered - income as f64).abs() < 1e-6);
            prop_assert!(result.slices.iter().all(|s| s.amount > 0.0));
            prop_assert!(result.slices.windows(2).all(|w| w[0].rate_percent < w[1].rate_percent));
            if income == 0 {
                prop_assert_eq!(result.slices.len(), 0);
            }
        }
    }
}
