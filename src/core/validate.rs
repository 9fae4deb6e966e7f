use std::collections::HashMap;

use super::error::{ComputationError, PayrollError};
use super::types::{KpiPeriod, SalaryInputs};

pub const FIELD_SALARY: &str = "salary";
pub const FIELD_MONTHLY_BONUS: &str = "monthly_bonus";
pub const FIELD_KPI_ENABLED: &str = "kpi_enabled";
pub const FIELD_KPI_PERCENTAGE: &str = "kpi_percentage";
pub const FIELD_KPI_PERIOD: &str = "kpi_period";
pub const FIELD_RK_RATE: &str = "rk_rate";
pub const FIELD_SN_PERCENTAGE: &str = "sn_percentage";

pub const KPI_PERIOD_INVALID: &str = "Недопустимый период KPI.";

/// A numeric form field together with its default and acceptance rule.
struct NumericField {
    key: &'static str,
    default: f64,
    /// Treat a present but empty value like an absent one.
    empty_is_default: bool,
    violates: fn(f64) -> bool,
    not_a_number: &'static str,
    violated: &'static str,
}

const SALARY: NumericField = NumericField {
    key: FIELD_SALARY,
    default: 0.0,
    empty_is_default: false,
    violates: not_positive,
    not_a_number: "Оклад должен быть числом.",
    violated: "Оклад должен быть больше 0.",
};

const MONTHLY_BONUS: NumericField = NumericField {
    key: FIELD_MONTHLY_BONUS,
    default: 0.0,
    empty_is_default: true,
    violates: negative,
    not_a_number: "Ежемесячная премия должна быть числом или пустой.",
    violated: "Ежемесячная премия не может быть отрицательной.",
};

const RK_RATE: NumericField = NumericField {
    key: FIELD_RK_RATE,
    default: 1.0,
    empty_is_default: false,
    violates: below_one,
    not_a_number: "Районный коэффициент должен быть числом.",
    violated: "Районный коэффициент должен быть не менее 1.0.",
};

const SN_PERCENTAGE: NumericField = NumericField {
    key: FIELD_SN_PERCENTAGE,
    default: 0.0,
    empty_is_default: false,
    violates: negative,
    not_a_number: "Северная надбавка должна быть числом.",
    violated: "Северная надбавка не может быть отрицательной.",
};

const KPI_PERCENTAGE: NumericField = NumericField {
    key: FIELD_KPI_PERCENTAGE,
    default: 0.0,
    empty_is_default: true,
    violates: negative,
    not_a_number: "Процент премии KPI должен быть числом.",
    violated: "Процент премии KPI не может быть отрицательным.",
};

fn not_positive(v: f64) -> bool {
    v <= 0.0
}

fn negative(v: f64) -> bool {
    v < 0.0
}

fn below_one(v: f64) -> bool {
    v < 1.0
}

impl NumericField {
    fn read(&self, fields: &HashMap<String, String>) -> Option<f64> {
        match fields.get(self.key) {
            None => Some(self.default),
            Some(raw) if raw.is_empty() && self.empty_is_default => Some(self.default),
            Some(raw) => raw.trim().parse::<f64>().ok(),
        }
    }

    fn check(&self, fields: &HashMap<String, String>, errors: &mut Vec<String>) {
        match self.read(fields) {
            Some(value) if (self.violates)(value) => errors.push(self.violated.to_string()),
            Some(_) => {}
            None => errors.push(self.not_a_number.to_string()),
        }
    }

    fn parse(&self, fields: &HashMap<String, String>) -> Result<f64, ComputationError> {
        self.read(fields)
            .ok_or_else(|| ComputationError::UnparsedField {
                field: self.key,
                value: fields.get(self.key).cloned().unwrap_or_default(),
            })
    }
}

fn kpi_enabled(fields: &HashMap<String, String>) -> bool {
    fields.get(FIELD_KPI_ENABLED).map(String::as_str) == Some("on")
}

fn kpi_period_raw(fields: &HashMap<String, String>) -> &str {
    fields
        .get(FIELD_KPI_PERIOD)
        .map(String::as_str)
        .unwrap_or(KpiPeriod::Quarter.as_str())
}

/// Checks raw form fields and returns every problem found.
///
/// An empty list means the fields can be turned into [`SalaryInputs`]. A
/// field reports either its parse failure or its constraint failure, never
/// both. KPI fields are only checked when KPI is switched on.
pub fn validate(fields: &HashMap<String, String>) -> Vec<String> {
    let mut errors = Vec::new();

    for field in [&SALARY, &MONTHLY_BONUS, &RK_RATE, &SN_PERCENTAGE] {
        field.check(fields, &mut errors);
    }

    if kpi_enabled(fields) {
        KPI_PERCENTAGE.check(fields, &mut errors);
        if KpiPeriod::parse(kpi_period_raw(fields)).is_none() {
            errors.push(KPI_PERIOD_INVALID.to_string());
        }
    }

    errors
}

/// Validates `fields` and converts them into computation inputs.
pub fn salary_inputs_from_fields(
    fields: &HashMap<String, String>,
) -> Result<SalaryInputs, PayrollError> {
    let errors = validate(fields);
    if !errors.is_empty() {
        return Err(PayrollError::Validation(errors));
    }

    let kpi_enabled = kpi_enabled(fields);
    let kpi_period = if kpi_enabled {
        let raw = kpi_period_raw(fields);
        KpiPeriod::parse(raw).ok_or_else(|| ComputationError::UnparsedField {
            field: FIELD_KPI_PERIOD,
            value: raw.to_string(),
        })?
    } else {
        KpiPeriod::Quarter
    };

    Ok(SalaryInputs {
        salary: SALARY.parse(fields)?,
        monthly_bonus: MONTHLY_BONUS.parse(fields)?,
        kpi_enabled,
        kpi_percentage: if kpi_enabled {
            KPI_PERCENTAGE.parse(fields)?
        } else {
            0.0
        },
        kpi_period,
        regional_multiplier: RK_RATE.parse(fields)?,
        allowance_percentage: SN_PERCENTAGE.parse(fields)?,
    })
}
