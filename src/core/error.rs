use thiserror::Error;

/// Text shown to the user for any internal failure.
pub const COMPUTATION_FAILED_MESSAGE: &str = "Ошибка при расчёте. Проверьте введённые данные.";

#[derive(Debug, Error, PartialEq)]
pub enum ComputationError {
    #[error("field `{field}` passed validation but could not be parsed: {value:?}")]
    UnparsedField { field: &'static str, value: String },

    #[error("{what} is not finite in month {month}")]
    NonFinite { what: &'static str, month: usize },

    #[error("{what} is out of range in month {month}")]
    Overflow { what: &'static str, month: usize },
}

#[derive(Debug, Error, PartialEq)]
pub enum PayrollError {
    #[error("invalid input: {}", .0.join("; "))]
    Validation(Vec<String>),

    #[error(transparent)]
    Computation(#[from] ComputationError),
}

impl PayrollError {
    /// Messages safe to show to the end user.
    pub fn user_messages(&self) -> Vec<String> {
        match self {
            Self::Validation(messages) => messages.clone(),
            Self::Computation(_) => vec![COMPUTATION_FAILED_MESSAGE.to_string()],
        }
    }
}
