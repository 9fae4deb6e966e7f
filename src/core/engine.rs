use std::collections::HashMap;

use tracing::{debug, trace};

use super::error::{ComputationError, PayrollError};
use super::format::format_rate_breakdown;
use super::tax::{MAX_EXACT_AMOUNT, compute_tax};
use super::types::{
    AnnualTotals, KpiNote, KpiPeriod, MONTH_NAMES, MONTHS_PER_YEAR, MonthlyRecord, Projection,
    RateSlice, SalaryInputs, TaxComputation, TaxSchedule,
};
use super::validate::salary_inputs_from_fields;

/// Income figures that repeat unchanged every month.
#[derive(Debug, Clone, Copy, PartialEq)]
struct MonthlyBase {
    base_income: f64,
    allowance_income: f64,
    taxable_income: f64,
}

/// A KPI accrual window and the months its payout lands in.
#[derive(Debug, Clone, Copy)]
struct KpiWindow {
    first_month: usize,
    last_month: usize,
    pay_month: usize,
    allowance_month: usize,
}

impl KpiWindow {
    const fn new(
        first_month: usize,
        last_month: usize,
        pay_month: usize,
        allowance_month: usize,
    ) -> Self {
        Self {
            first_month,
            last_month,
            pay_month,
            allowance_month,
        }
    }

    fn len(self) -> usize {
        self.last_month - self.first_month + 1
    }
}

const QUARTER_WINDOWS: [KpiWindow; 4] = [
    KpiWindow::new(0, 2, 2, 2),
    KpiWindow::new(3, 5, 5, 5),
    KpiWindow::new(6, 8, 8, 8),
    KpiWindow::new(9, 11, 11, 11),
];

// Half-year payouts are deferred: H1 is paid in August with the РК/СН share
// in September, H2 is paid in March with the share in February.
const HALF_YEAR_WINDOWS: [KpiWindow; 2] =
    [KpiWindow::new(0, 5, 7, 8), KpiWindow::new(6, 11, 2, 1)];

fn kpi_windows(period: KpiPeriod) -> &'static [KpiWindow] {
    match period {
        KpiPeriod::Quarter => &QUARTER_WINDOWS,
        KpiPeriod::HalfYear => &HALF_YEAR_WINDOWS,
    }
}

/// KPI payouts attributed to the month they are paid in.
#[derive(Debug, Clone, Default, PartialEq)]
struct KpiPayouts {
    base: [f64; MONTHS_PER_YEAR],
    allowance: [f64; MONTHS_PER_YEAR],
    notes: [Option<KpiNote>; MONTHS_PER_YEAR],
}

/// Year-to-date position under one tax schedule.
#[derive(Debug, Clone, Default)]
struct ScheduleSnapshot {
    cumulative_income: f64,
    computation: TaxComputation,
}

impl ScheduleSnapshot {
    fn advance(&self, month_income: f64, schedule: TaxSchedule) -> Self {
        let cumulative_income = self.cumulative_income + month_income;
        Self {
            cumulative_income,
            computation: compute_tax(cumulative_income, schedule),
        }
    }
}

fn monthly_base(inputs: &SalaryInputs) -> MonthlyBase {
    let base_income = inputs.salary + inputs.monthly_bonus;
    let regional = if inputs.regional_multiplier > 1.0 {
        base_income * (inputs.regional_multiplier - 1.0)
    } else {
        0.0
    };
    let northern = if inputs.allowance_percentage > 0.0 {
        base_income * (inputs.allowance_percentage / 100.0)
    } else {
        0.0
    };
    let allowance_income = regional + northern;

    MonthlyBase {
        base_income,
        allowance_income,
        taxable_income: base_income + allowance_income,
    }
}

fn kpi_payouts(inputs: &SalaryInputs, base: MonthlyBase) -> KpiPayouts {
    let mut payouts = KpiPayouts::default();
    if !(inputs.kpi_enabled && inputs.kpi_percentage > 0.0) {
        return payouts;
    }

    let share_rate = inputs.kpi_percentage / 100.0;
    let allowance_ratio = if base.taxable_income > 0.0 {
        base.allowance_income / base.taxable_income
    } else {
        0.0
    };

    for window in kpi_windows(inputs.kpi_period) {
        let window_income = base.taxable_income * window.len() as f64;
        let kpi_total = window_income * share_rate;
        let allowance_share = kpi_total * allowance_ratio;

        payouts.base[window.pay_month] += kpi_total - allowance_share;
        payouts.allowance[window.allowance_month] += allowance_share;
        payouts.notes[window.allowance_month] = Some(KpiNote::Allowance);
    }

    payouts
}

/// Slices taxed this month: the current year-to-date slices minus what the
/// same rates had already absorbed by the end of last month.
fn marginal_slices(
    previous: &[RateSlice],
    current: &[RateSlice],
    month_income: f64,
) -> Vec<RateSlice> {
    if month_income <= 0.0 {
        return Vec::new();
    }

    current
        .iter()
        .filter_map(|slice| {
            let before: f64 = previous
                .iter()
                .filter(|p| p.rate_percent == slice.rate_percent)
                .map(|p| p.amount)
                .sum();
            let delta = (slice.amount - before).max(0.0);
            (delta > 0.0).then(|| RateSlice {
                rate_percent: slice.rate_percent,
                amount: delta.min(month_income),
            })
        })
        .collect()
}

/// Rejects figures that cannot be rounded into an exact `i64`.
fn ensure_in_range(value: f64, what: &'static str, month: usize) -> Result<f64, ComputationError> {
    if !value.is_finite() {
        Err(ComputationError::NonFinite { what, month })
    } else if value.abs() > MAX_EXACT_AMOUNT {
        Err(ComputationError::Overflow { what, month })
    } else {
        Ok(value)
    }
}

fn checked_sum(a: i64, b: i64, what: &'static str, month: usize) -> Result<i64, ComputationError> {
    a.checked_add(b).ok_or(ComputationError::Overflow { what, month })
}

/// Projects a year of payroll for `inputs`.
///
/// Months are processed in calendar order because each month's tax is the
/// difference between the year-to-date tax after and before it.
pub fn project_salary(inputs: &SalaryInputs) -> Result<Projection, ComputationError> {
    let base = monthly_base(inputs);
    let kpi = kpi_payouts(inputs, base);
    debug!(
        base_income = base.base_income,
        allowance_income = base.allowance_income,
        kpi_enabled = inputs.kpi_enabled,
        "projecting salary"
    );

    let mut regular = ScheduleSnapshot::default();
    let mut allowance = ScheduleSnapshot::default();
    let mut annual_income = 0.0;
    let mut annual_tax = 0_i64;
    let mut months = Vec::with_capacity(MONTHS_PER_YEAR);

    for (month, name) in MONTH_NAMES.into_iter().enumerate() {
        let total_income = ensure_in_range(
            base.taxable_income + kpi.base[month] + kpi.allowance[month],
            "monthly income",
            month,
        )?;
        let allowance_income = ensure_in_range(
            base.allowance_income + kpi.allowance[month],
            "allowance income",
            month,
        )?;
        let regular_income = total_income - allowance_income;
        let cumulative_income = ensure_in_range(
            regular.cumulative_income + allowance.cumulative_income + total_income,
            "cumulative income",
            month,
        )?;

        let next_regular = regular.advance(regular_income, TaxSchedule::Regular);
        let next_allowance = allowance.advance(allowance_income, TaxSchedule::Allowance);

        let regular_tax = next_regular.computation.tax - regular.computation.tax;
        let allowance_tax = next_allowance.computation.tax - allowance.computation.tax;
        let total_tax = checked_sum(regular_tax, allowance_tax, "monthly tax", month)?;

        let regular_slices = marginal_slices(
            &regular.computation.slices,
            &next_regular.computation.slices,
            regular_income,
        );
        let allowance_slices = marginal_slices(
            &allowance.computation.slices,
            &next_allowance.computation.slices,
            allowance_income,
        );
        trace!(month, regular_tax, allowance_tax, "month taxed");

        annual_income += total_income;
        annual_tax = checked_sum(annual_tax, total_tax, "annual tax", month)?;

        months.push(MonthlyRecord {
            month_index: month,
            month: name,
            total_income: total_income.round() as i64,
            kpi_bonus: (kpi.base[month] + kpi.allowance[month]).round() as i64,
            kpi_note: kpi.notes[month],
            total_tax,
            net_income: (total_income - total_tax as f64).round() as i64,
            rate_breakdown: format_rate_breakdown(&regular_slices, &allowance_slices),
            regular_slices,
            allowance_slices,
            cumulative_income: cumulative_income.round() as i64,
        });

        regular = next_regular;
        allowance = next_allowance;
    }

    let annual_income = annual_income.round() as i64;
    Ok(Projection {
        months,
        annual: AnnualTotals {
            annual_income,
            annual_tax,
            annual_net_income: annual_income - annual_tax,
        },
    })
}

/// Validates raw form fields and projects the year they describe.
pub fn project_from_fields(fields: &HashMap<String, String>) -> Result<Projection, PayrollError> {
    let inputs = salary_inputs_from_fields(fields)?;
    Ok(project_salary(&inputs)?)
}
