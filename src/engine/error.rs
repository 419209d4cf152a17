//! Error type for the job-graph translator.

use crate::error::{SourcePosition, WdlError};
use crate::runtime::error::RuntimeError;
use thiserror::Error;

/// Errors raised while building or executing the job graph for a workflow.
///
/// Every variant maps onto one of the error kinds a Node Job, Section Job or
/// Task Job can produce; collaborator errors from the parser/evaluator
/// (`WdlError`) and from task execution (`RuntimeError`) are wrapped rather
/// than re-described, so a `--debug` run still shows the original message.
#[derive(Error, Debug)]
pub enum EngineError {
    #[error("name resolution failed for '{name}': {message}")]
    NameResolution { name: String, message: String },

    #[error("type mismatch: {message}")]
    TypeMismatch { message: String, pos: Option<SourcePosition> },

    #[error("expression evaluation failed: {0}")]
    Evaluation(#[from] WdlError),

    #[error("invalid callee for call '{name}': {message}")]
    InvalidCallee { name: String, message: String },

    #[error("unimplemented workflow node: {kind}")]
    UnimplementedNode { kind: String },

    #[error("command execution failed: {0}")]
    CommandFailure(#[from] RuntimeErrorWrapper),

    #[error("i/o error: {0}")]
    Io(#[from] std::io::Error),

    #[error("missing required input '{name}'")]
    MissingRequiredInput { name: String },

    #[error("job scheduling error: {message}")]
    Scheduling { message: String },
}

/// `RuntimeError` does not implement `std::error::Error`'s auto-from-friendly
/// shape (it carries a trait object), so it is wrapped once here rather than
/// given a blanket `#[from]` on the bare type.
#[derive(Debug)]
pub struct RuntimeErrorWrapper(pub RuntimeError);

impl std::fmt::Display for RuntimeErrorWrapper {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl std::error::Error for RuntimeErrorWrapper {}

impl From<RuntimeError> for EngineError {
    fn from(e: RuntimeError) -> Self {
        EngineError::CommandFailure(RuntimeErrorWrapper(e))
    }
}

pub type EngineResult<T> = Result<T, EngineError>;
