use serde::Serialize;

pub const MONTHS_PER_YEAR: usize = 12;

pub const MONTH_NAMES: [&str; MONTHS_PER_YEAR] = [
    "Январь",
    "Февраль",
    "Март",
    "Апрель",
    "Май",
    "Июнь",
    "Июль",
    "Август",
    "Сентябрь",
    "Октябрь",
    "Ноябрь",
    "Декабрь",
];

/// Which bracket table a cumulative income is taxed against.
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub enum TaxSchedule {
    /// Ordinary income.
    Regular,
    /// Regional coefficient and northern allowance income (РК/СН).
    Allowance,
}

#[derive(Copy, Clone, Debug, PartialEq)]
pub struct TaxBracket {
    /// Inclusive upper bound of the bracket; `None` for the catch-all.
    pub threshold: Option<f64>,
    /// Whole percent, e.g. 13 for 13%.
    pub rate_percent: u32,
}

/// One slice of income taxed at a single rate.
#[derive(Copy, Clone, Debug, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RateSlice {
    pub rate_percent: u32,
    pub amount: f64,
}

#[derive(Clone, Debug, Default, PartialEq)]
pub struct TaxComputation {
    pub tax: i64,
    pub slices: Vec<RateSlice>,
}

#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub enum KpiPeriod {
    Quarter,
    HalfYear,
}

impl KpiPeriod {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Quarter => "quarter",
            Self::HalfYear => "halfyear",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "quarter" => Some(Self::Quarter),
            "halfyear" => Some(Self::HalfYear),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct SalaryInputs {
    pub salary: f64,
    pub monthly_bonus: f64,
    pub kpi_enabled: bool,
    /// Percent of period income, e.g. 10 for 10%.
    pub kpi_percentage: f64,
    pub kpi_period: KpiPeriod,
    pub regional_multiplier: f64,
    /// Northern allowance in percent of base income.
    pub allowance_percentage: f64,
}

impl Default for SalaryInputs {
    fn default() -> Self {
        Self {
            salary: 0.0,
            monthly_bonus: 0.0,
            kpi_enabled: false,
            kpi_percentage: 0.0,
            kpi_period: KpiPeriod::Quarter,
            regional_multiplier: 1.0,
            allowance_percentage: 0.0,
        }
    }
}

#[derive(Copy, Clone, Debug, Eq, PartialEq, Serialize)]
pub enum KpiNote {
    #[serde(rename = "РК/СН")]
    Allowance,
}

impl KpiNote {
    pub fn label(self) -> &'static str {
        match self {
            Self::Allowance => "РК/СН",
        }
    }
}

/// Rounded figures for one month of the projection.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MonthlyRecord {
    pub month_index: usize,
    pub month: &'static str,
    pub total_income: i64,
    pub kpi_bonus: i64,
    pub kpi_note: Option<KpiNote>,
    pub total_tax: i64,
    pub net_income: i64,
    pub regular_slices: Vec<RateSlice>,
    pub allowance_slices: Vec<RateSlice>,
    pub rate_breakdown: String,
    pub cumulative_income: i64,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AnnualTotals {
    pub annual_income: i64,
    pub annual_tax: i64,
    pub annual_net_income: i64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Projection {
    pub months: Vec<MonthlyRecord>,
    pub annual: AnnualTotals,
}
