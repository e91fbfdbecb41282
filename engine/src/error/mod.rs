use std::error::Error;
use std::fmt::{Display, Formatter};

/// A custom error message for the analysis engine
#[derive(Debug, Clone)]
pub enum EngineError {
    /// Error during the loading of a serialized program
    LoadingError(String),
    /// Invalid assumption made about the program
    InvalidAssumption(String),
    /// Invariant violation
    InvariantViolation(String),
}

pub type EngineResult<T> = Result<T, EngineError>;

impl Display for EngineError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::LoadingError(msg) => {
                write!(f, "[cprop::loading] {}", msg)
            }
            Self::InvalidAssumption(msg) => {
                write!(f, "[cprop::assumption] {}", msg)
            }
            Self::InvariantViolation(msg) => {
                write!(f, "[cprop::invariant] {}", msg)
            }
        }
    }
}

impl Error for EngineError {}
