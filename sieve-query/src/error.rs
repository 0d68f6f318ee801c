//! Error types for filter parsing and SQL compilation.
//!
//! Every error carries an [`ErrorCode`] for programmatic handling, a message,
//! and an [`ErrorContext`] describing the field or operator involved.
//!
//! # Error Codes
//!
//! Error codes follow a pattern: F{category}{number}
//! - 1xxx: Parse errors (malformed payload, unsupported operand, unknown operator)
//! - 2xxx: Compile errors (empty membership list, pagination, parameters)
//! - 3xxx: Configuration errors
//!
//! Parse errors in the 1xxx range other than `MalformedInput` are non-fatal:
//! the parser drops the offending clause and keeps going.
//!
//! ```rust
//! use sieve_query::{ErrorCode, FilterError};
//!
//! let err = FilterError::empty_membership_list("status");
//! assert_eq!(err.code, ErrorCode::EmptyMembershipList);
//! assert_eq!(err.code.code(), "F2001");
//! assert!(err.is_fatal());
//! ```

use std::fmt;
use thiserror::Error;

/// Result type for filter operations.
pub type FilterResult<T> = Result<T, FilterError>;

/// Error codes for programmatic error handling.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorCode {
    // Parse errors (1xxx)
    /// Payload is not valid JSON or breaks the top-level grammar (F1001).
    MalformedInput = 1001,
    /// Operand shape cannot be represented (F1002).
    UnsupportedOperand = 1002,
    /// Operator token outside the supported set (F1003).
    UnknownOperator = 1003,

    // Compile errors (2xxx)
    /// `$in` / `$nin` with an empty list (F2001).
    EmptyMembershipList = 2001,
    /// Negative or out-of-range limit/offset (F2002).
    InvalidPagination = 2002,
    /// Invalid argument to a builder (F2003).
    InvalidParameter = 2003,

    // Configuration errors (3xxx)
    /// Invalid configuration value (F3001).
    InvalidConfiguration = 3001,
}

impl ErrorCode {
    /// Get the error code string (e.g., "F1001").
    pub fn code(&self) -> String {
        format!("F{}", *self as u16)
    }

    /// Get a short description of the error code.
    pub fn description(&self) -> &'static str {
        match self {
            Self::MalformedInput => "Malformed filter input",
            Self::UnsupportedOperand => "Unsupported operand",
            Self::UnknownOperator => "Unknown operator",
            Self::EmptyMembershipList => "Empty membership list",
            Self::InvalidPagination => "Invalid pagination",
            Self::InvalidParameter => "Invalid parameter",
            Self::InvalidConfiguration => "Invalid configuration",
        }
    }
}

impl fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.code())
    }
}

/// Additional context for an error.
#[derive(Debug, Clone, Default)]
pub struct ErrorContext {
    /// The field involved.
    pub field: Option<String>,
    /// The operator token involved.
    pub operator: Option<String>,
    /// The offending input fragment.
    pub input: Option<String>,
    /// Suggestions for fixing the error.
    pub suggestions: Vec<String>,
    /// Help text.
    pub help: Option<String>,
}

/// Errors produced while parsing or compiling a filter.
#[derive(Error, Debug)]
pub struct FilterError {
    /// The error code.
    pub code: ErrorCode,
    /// The error message.
    pub message: String,
    /// Additional context.
    pub context: ErrorContext,
    /// The source error (if any).
    #[source]
    pub source: Option<Box<dyn std::error::Error + Send + Sync>>,
}

impl fmt::Display for FilterError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}] {}", self.code.code(), self.message)
    }
}

impl FilterError {
    /// Create a new error with the given code and message.
    pub fn new(code: ErrorCode, message: impl Into<String>) -> Self {
        Self {
            code,
            message: message.into(),
            context: ErrorContext::default(),
            source: None,
        }
    }

    /// Set the field.
    pub fn with_field(mut self, field: impl Into<String>) -> Self {
        self.context.field = Some(field.into());
        self
    }

    /// Set the operator token.
    pub fn with_operator(mut self, operator: impl Into<String>) -> Self {
        self.context.operator = Some(operator.into());
        self
    }

    /// Set the offending input fragment.
    pub fn with_input(mut self, input: impl Into<String>) -> Self {
        self.context.input = Some(input.into());
        self
    }

    /// Add a suggestion for fixing the error.
    pub fn with_suggestion(mut self, suggestion: impl Into<String>) -> Self {
        self.context.suggestions.push(suggestion.into());
        self
    }

    /// Add help text.
    pub fn with_help(mut self, help: impl Into<String>) -> Self {
        self.context.help = Some(help.into());
        self
    }

    /// Set the source error.
    pub fn with_source<E: std::error::Error + Send + Sync + 'static>(mut self, source: E) -> Self {
        self.source = Some(Box::new(source));
        self
    }

    // ============== Constructor Functions ==============

    /// Create a malformed input error.
    pub fn malformed(message: impl Into<String>) -> Self {
        Self::new(
            ErrorCode::MalformedInput,
            format!("Malformed filter: {}", message.into()),
        )
        .with_help(r#"Expected {"field": value, ...} or {"$or": [{...}, {...}]}"#)
    }

    /// Create a malformed input error from a JSON syntax error.
    pub fn invalid_json(source: serde_json::Error) -> Self {
        Self::malformed(format!("invalid JSON: {}", source)).with_source(source)
    }

    /// Create an unsupported operand error.
    pub fn unsupported_operand(field: impl Into<String>, found: &str) -> Self {
        let field = field.into();
        Self::new(
            ErrorCode::UnsupportedOperand,
            format!("Unsupported operand for {}: {}", field, found),
        )
        .with_field(field)
        .with_suggestion("Use a boolean, string, integer, or a list of those")
    }

    /// Create an unknown operator error.
    pub fn unknown_operator(field: impl Into<String>, operator: impl Into<String>) -> Self {
        let field = field.into();
        let operator = operator.into();
        Self::new(
            ErrorCode::UnknownOperator,
            format!("Unknown operator {} on {}", operator, field),
        )
        .with_field(field)
        .with_operator(operator)
        .with_suggestion("Supported operators: $eq, $lt, $lte, $gt, $gte, $ne, $in, $nin, $like")
    }

    /// Create an empty membership list error.
    pub fn empty_membership_list(field: impl Into<String>) -> Self {
        let field = field.into();
        Self::new(
            ErrorCode::EmptyMembershipList,
            format!("Membership test on {} has an empty list", field),
        )
        .with_field(field)
        .with_suggestion("Provide at least one value or drop the condition")
    }

    /// Create an invalid pagination error.
    pub fn invalid_pagination(name: &str, message: impl Into<String>) -> Self {
        Self::new(
            ErrorCode::InvalidPagination,
            format!("Invalid {}: {}", name, message.into()),
        )
        .with_field(name)
    }

    /// Create an invalid parameter error.
    pub fn invalid_parameter(message: impl Into<String>) -> Self {
        Self::new(ErrorCode::InvalidParameter, message.into())
    }

    /// Create an invalid configuration error.
    pub fn invalid_configuration(key: impl Into<String>, message: impl Into<String>) -> Self {
        let key = key.into();
        Self::new(
            ErrorCode::InvalidConfiguration,
            format!("Invalid configuration '{}': {}", key, message.into()),
        )
        .with_field(key)
    }

    // ============== Error Checks ==============

    /// Whether the error aborts the operation.
    ///
    /// Unsupported operands and unknown operators only drop the clause they
    /// occur in when they come out of the parser.
    pub fn is_fatal(&self) -> bool {
        !matches!(
            self.code,
            ErrorCode::UnsupportedOperand | ErrorCode::UnknownOperator
        )
    }

    /// Display the full error with all context and suggestions.
    pub fn display_full(&self) -> String {
        let mut output = String::new();

        output.push_str(&format!("Error [{}]: {}\n", self.code.code(), self.message));

        if let Some(ref field) = self.context.field {
            output.push_str(&format!("  → Field: {}\n", field));
        }
        if let Some(ref op) = self.context.operator {
            output.push_str(&format!("  → Operator: {}\n", op));
        }
        if let Some(ref input) = self.context.input {
            let shown = if input.len() > 120 {
                let mut end = 120;
                while !input.is_char_boundary(end) {
                    end -= 1;
                }
                format!("{}...", &input[..end])
            } else {
                input.clone()
            };
            output.push_str(&format!("  → Input: {}\n", shown));
        }

        if !self.context.suggestions.is_empty() {
            output.push_str("\nSuggestions:\n");
            for (i, suggestion) in self.context.suggestions.iter().enumerate() {
                output.push_str(&format!("  {}. {}\n", i + 1, suggestion));
            }
        }

        if let Some(ref help) = self.context.help {
            output.push_str(&format!("\nHelp: {}\n", help));
        }

        output
    }
}
