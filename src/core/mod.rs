mod engine;
mod error;
mod format;
mod tax;
mod types;
mod validate;

pub use engine::{project_from_fields, project_salary};
pub use error::{COMPUTATION_FAILED_MESSAGE, ComputationError, PayrollError};
pub use format::{format_number, format_rate_breakdown};
pub use tax::{ALLOWANCE_BRACKETS, MAX_EXACT_AMOUNT, REGULAR_BRACKETS, compute_tax};
pub use types::{
    AnnualTotals, KpiNote, KpiPeriod, MONTH_NAMES, MONTHS_PER_YEAR, MonthlyRecord, Projection,
    RateSlice, SalaryInputs, TaxBracket, TaxComputation, TaxSchedule,
};
pub use validate::{
    FIELD_KPI_ENABLED, FIELD_KPI_PERCENTAGE, FIELD_KPI_PERIOD, FIELD_MONTHLY_BONUS, FIELD_RK_RATE,
    FIELD_SALARY, FIELD_SN_PERCENTAGE, salary_inputs_from_fields, validate,
};
