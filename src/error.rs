use thiserror::Error;

#[derive(Error, Debug)]
pub enum DecimError {
    #[error("Invalid parameter: {0}")]
    InvalidParameter(String),

    #[error("Filter design failed: {0}")]
    Design(String),

    #[error("Output buffer too small: need {needed} samples, have {capacity}")]
    BufferTooSmall { needed: usize, capacity: usize },

    #[error("Decimator used after close")]
    UseAfterClose,
}

pub type Result<T> = std::result::Result<T, DecimError>;
