//! Configuration errors.
//!
//! Every variant is fatal at dispatch time: a workflow that fails validation
//! never produces job instances.

use thiserror::Error;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error("invalid glob pattern '{pattern}': {message}")]
    InvalidPattern { pattern: String, message: String },

    #[error("matrix axis '{0}' has no values")]
    EmptyAxis(String),

    #[error("matrix axis '{0}' is declared more than once")]
    DuplicateAxis(String),

    #[error("matrix axis '{axis}' lists value '{value}' more than once")]
    DuplicateValue { axis: String, value: String },

    #[error("matrix {section} entry references undeclared axis '{axis}'")]
    UnknownAxis { section: &'static str, axis: String },

    #[error("step #{index} must set exactly one of `uses` or `run`")]
    AmbiguousStep { index: usize },

    #[error("step #{index} references unknown action '{action}'")]
    UnknownAction { index: usize, action: String },

    #[error("expression '${{{{ {expr} }}}}' cannot be resolved: {message}")]
    UnresolvedExpression { expr: String, message: String },

    #[error("workflow has no steps")]
    NoSteps,

    #[error("`max_parallel` must be at least 1")]
    ZeroParallelism,
}
