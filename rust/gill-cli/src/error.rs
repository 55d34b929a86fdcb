//! Unified CLI error type: every subcommand funnels its failures through
//! `GillError` so reporting and exit codes live in one place.

use gill_compiler::CompileError;
use gill_rt::RuntimeError;
use std::io;
use std::path::Path;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum GillError {
    #[error(transparent)]
    Compile(#[from] CompileError),
    #[error(transparent)]
    Runtime(#[from] RuntimeError),
    #[error("cannot read {path}: {source}")]
    Read { path: String, source: io::Error },
    #[error("cannot write {path}: {source}")]
    Write { path: String, source: io::Error },
    #[error("cannot serialize AST: {0}")]
    Json(#[from] serde_json::Error),
}

impl GillError {
    pub fn read(path: &Path, source: io::Error) -> Self {
        GillError::Read {
            path: path.display().to_string(),
            source,
        }
    }

    pub fn write(path: &Path, source: io::Error) -> Self {
        GillError::Write {
            path: path.display().to_string(),
            source,
        }
    }
}
