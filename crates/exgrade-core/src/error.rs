//! Engine and configuration error types.
//!
//! Defined in `exgrade-core` so embedding hosts can match on failure
//! kinds without string matching.

use thiserror::Error;

/// Caller errors from event dispatch and accessors.
///
/// An unknown id leaves every other widget and section untouched.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum EngineError {
    /// The event referenced a widget id that is not registered.
    #[error("unknown widget id: {0}")]
    WidgetNotFound(String),

    /// The event referenced a section id that is not registered.
    #[error("unknown section id: {0}")]
    SectionNotFound(String),

    /// The event referenced a solution block id that is not registered.
    #[error("unknown solution id: {0}")]
    SolutionNotFound(String),
}

/// A malformed widget configuration, reported once at engine init.
///
/// The offending widget grades always-neutral afterwards instead of
/// failing later evaluations.
#[derive(Debug, Clone, Error, PartialEq)]
#[error("widget '{widget_id}': {problem}")]
pub struct ConfigIssue {
    pub widget_id: String,
    #[source]
    pub problem: ConfigProblem,
}

/// What was wrong with a widget's configuration.
#[derive(Debug, Clone, Error, PartialEq)]
pub enum ConfigProblem {
    /// The OR-joined accepted answers do not form a valid regex.
    #[error("invalid answer pattern '{pattern}': {message}")]
    InvalidRegex { pattern: String, message: String },

    /// Tolerance must be strictly positive to mean anything.
    #[error("tolerance must be greater than zero, got {tolerance}")]
    UnusableTolerance { tolerance: f64 },

    /// Tolerance matching needs at least one numeric accepted answer.
    #[error("tolerance is set but no accepted answer parses as a number")]
    NoNumericAnswers,
}
