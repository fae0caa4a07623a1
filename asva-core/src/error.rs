//! Structured errors
//!
//! Every failure in the engine is an `AsvaError` value carrying a
//! machine-readable code, so a batch over many columns can record the
//! failure of one column and keep going.

use crate::DatasetError;
use serde::{Deserialize, Serialize};

/// Standard error codes (machine-readable)
pub mod codes {
    pub const TOO_FEW_GROUPS: &str = "TOO_FEW_GROUPS";
    pub const UNSUPPORTED_GROUP_COUNT: &str = "UNSUPPORTED_GROUP_COUNT";
    pub const MISSING_PAIRWISE_ENTRY: &str = "MISSING_PAIRWISE_ENTRY";
    pub const NEGATIVE_MEASUREMENT_VALUE: &str = "NEGATIVE_MEASUREMENT_VALUE";
    pub const UNKNOWN_COLUMN: &str = "UNKNOWN_COLUMN";
    pub const TYPE_ERROR: &str = "TYPE_ERROR";
    pub const DOMAIN_ERROR: &str = "DOMAIN_ERROR";
    pub const DATASET_ERROR: &str = "DATASET_ERROR";
    pub const IO_ERROR: &str = "IO_ERROR";
    pub const INTERNAL: &str = "INTERNAL";
}

/// Severity level of an error
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    /// Analysis continued with a degraded result
    Warning,
    /// Analysis failed for this column
    Error,
    /// Programming defect; should never reach a user
    Fatal,
}

/// Context about where an error occurred
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ErrorContext {
    /// Measurement column being analyzed
    #[serde(skip_serializing_if = "Option::is_none")]
    pub column: Option<String>,

    /// Grouping column
    #[serde(skip_serializing_if = "Option::is_none")]
    pub group_column: Option<String>,

    /// Propagation notes
    #[serde(skip_serializing_if = "Vec::is_empty", default)]
    pub notes: Vec<String>,
}

/// Structured error
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AsvaError {
    /// Machine-readable error code
    pub code: String,

    /// Human-readable error message
    pub message: String,

    /// Suggestion for fixing the error
    #[serde(skip_serializing_if = "Option::is_none")]
    pub suggestion: Option<String>,

    /// Where the error occurred
    #[serde(skip_serializing_if = "Option::is_none")]
    pub context: Option<ErrorContext>,

    /// Severity level
    pub severity: Severity,
}

/// Result alias used throughout the workspace
pub type AsvaResult<T> = Result<T, AsvaError>;

impl AsvaError {
    /// Create a new error
    pub fn new(code: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            code: code.into(),
            message: message.into(),
            suggestion: None,
            context: None,
            severity: Severity::Error,
        }
    }

    /// True when this error carries the given code
    pub fn is(&self, code: &str) -> bool {
        self.code == code
    }

    /// Builder: add suggestion
    pub fn with_suggestion(mut self, suggestion: impl Into<String>) -> Self {
        self.suggestion = Some(suggestion.into());
        self
    }

    /// Builder: add context
    pub fn with_context(mut self, context: ErrorContext) -> Self {
        self.context = Some(context);
        self
    }

    /// Builder: set measurement column context
    pub fn in_column(mut self, column: impl Into<String>) -> Self {
        let ctx = self.context.get_or_insert_with(ErrorContext::default);
        ctx.column = Some(column.into());
        self
    }

    /// Builder: set grouping column context
    pub fn grouped_by(mut self, group_column: impl Into<String>) -> Self {
        let ctx = self.context.get_or_insert_with(ErrorContext::default);
        ctx.group_column = Some(group_column.into());
        self
    }

    /// Builder: add propagation note
    pub fn with_note(mut self, note: impl Into<String>) -> Self {
        let ctx = self.context.get_or_insert_with(ErrorContext::default);
        ctx.notes.push(note.into());
        self
    }

    /// Builder: set severity
    pub fn with_severity(mut self, severity: Severity) -> Self {
        self.severity = severity;
        self
    }

    // ========== Common Error Constructors ==========

    pub fn too_few_groups(found: usize) -> Self {
        Self::new(
            codes::TOO_FEW_GROUPS,
            format!("At least 2 groups are required, found {}", found),
        )
        .with_suggestion("Check that the grouping column holds two or more distinct labels")
    }

    pub fn unsupported_group_count(found: usize) -> Self {
        Self::new(
            codes::UNSUPPORTED_GROUP_COUNT,
            format!("Annotated plots support 2 to 4 groups, found {}", found),
        )
        .with_suggestion("Test results are still available; only the plot is skipped")
    }

    pub fn missing_pairwise_entry(a: &str, b: &str) -> Self {
        Self::new(
            codes::MISSING_PAIRWISE_ENTRY,
            format!("No pairwise comparison recorded for '{}' vs '{}'", a, b),
        )
        .with_suggestion("This is a bug, please report it")
        .with_severity(Severity::Fatal)
    }

    pub fn negative_measurement(min: f64) -> Self {
        Self::new(
            codes::NEGATIVE_MEASUREMENT_VALUE,
            format!("Values are too small to lay out a plot (minimum {})", min),
        )
        .with_suggestion("Plots require non-negative measurements; test results are unaffected")
    }

    pub fn unknown_column(name: &str) -> Self {
        Self::new(codes::UNKNOWN_COLUMN, format!("Unknown column: {}", name))
            .with_suggestion(format!("Check the spelling of '{}'", name))
    }

    pub fn type_error(expected: &str, got: &str) -> Self {
        Self::new(codes::TYPE_ERROR, format!("Expected {}, got {}", expected, got))
    }

    pub fn domain_error(details: impl Into<String>) -> Self {
        Self::new(codes::DOMAIN_ERROR, format!("Domain error: {}", details.into()))
    }

    pub fn io_error(details: impl Into<String>) -> Self {
        Self::new(codes::IO_ERROR, format!("I/O error: {}", details.into()))
    }

    pub fn internal(details: impl Into<String>) -> Self {
        Self::new(codes::INTERNAL, format!("Internal error: {}", details.into()))
            .with_suggestion("This is a bug, please report it")
            .with_severity(Severity::Fatal)
    }
}

impl std::fmt::Display for AsvaError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "[{}] {}", self.code, self.message)?;
        if let Some(ref suggestion) = self.suggestion {
            write!(f, " (suggestion: {})", suggestion)?;
        }
        Ok(())
    }
}

impl std::error::Error for AsvaError {}

impl From<DatasetError> for AsvaError {
    fn from(err: DatasetError) -> Self {
        Self::new(codes::DATASET_ERROR, err.to_string())
    }
}

impl From<std::io::Error> for AsvaError {
    fn from(err: std::io::Error) -> Self {
        Self::io_error(err.to_string())
    }
}
