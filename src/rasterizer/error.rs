//! Error type for mesh and framebuffer configuration

use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum RasterError {
    #[error("Invalid argument: {0}")]
    InvalidArgument(String),
    #[error("{what} index {index} out of range (len {len})")]
    OutOfRange {
        what: &'static str,
        index: usize,
        len: usize,
    },
}

impl RasterError {
    pub(crate) fn invalid(msg: impl Into<String>) -> Self {
        RasterError::InvalidArgument(msg.into())
    }
}

pub type RasterResult<T> = Result<T, RasterError>;
