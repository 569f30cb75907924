use crate::data::Field;

#[derive(Debug, thiserror::Error)]
pub enum SalesError {
    #[error("Unknown column: {0}")]
    UnknownColumn(String),

    #[error("Column is not categorical: {0}")]
    NotCategorical(Field),

    #[error("Column is not numeric: {0}")]
    NotNumeric(Field),

    #[error("Not enough data in {field}: need at least {required} values, got {actual}")]
    InsufficientData {
        field: Field,
        required: usize,
        actual: usize,
    },
}

pub type Result<T> = std::result::Result<T, SalesError>;
