use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum CoreError {
    #[error("Invalid input for {0}: {1}")]
    InvalidInput(String, String),

    #[error("Record {index} has no usable '{field}' value")]
    DataFieldMissing { index: usize, field: &'static str },
}
