//! Runtime error taxonomy and the evaluator's escape signal.

use crate::values::Value;
use thiserror::Error;

/// Recoverable runtime errors. One variant per taxonomy kind; the rendered
/// form leads with the kind tag.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum RuntimeError {
    #[error("NameError: {0}")]
    Name(String),
    #[error("TypeError: {0}")]
    Type(String),
    #[error("IndexError: {0}")]
    Index(String),
    #[error("ValueError: {0}")]
    Value(String),
    #[error("ImportError: {0}")]
    Import(String),
    #[error("RuntimeError: {0}")]
    Runtime(String),
}

impl RuntimeError {
    pub fn kind(&self) -> &'static str {
        match self {
            RuntimeError::Name(_) => "NameError",
            RuntimeError::Type(_) => "TypeError",
            RuntimeError::Index(_) => "IndexError",
            RuntimeError::Value(_) => "ValueError",
            RuntimeError::Import(_) => "ImportError",
            RuntimeError::Runtime(_) => "RuntimeError",
        }
    }
}

/// Evaluator-level escape. `Return` is control flow, not an error: it is
/// absorbed at the function-call evaluation point and must never be caught
/// by `try/catch`.
#[derive(Debug, Clone)]
pub enum Signal {
    Error(RuntimeError),
    Return(Value),
}

impl From<RuntimeError> for Signal {
    fn from(err: RuntimeError) -> Self {
        Signal::Error(err)
    }
}
