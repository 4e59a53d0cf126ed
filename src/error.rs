use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::fmt;

use crate::enums::ResourceKind;

/// Which tier of the engine produced a [`FieldError`].
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FieldErrorClass {
    /// A single field failed its registered predicate.
    Format,
    /// A cross-field invariant was violated.
    Semantic,
    /// A selector or query failed to parse, or used a disallowed atom.
    Grammar,
}

/// One validation failure: the offending field, its value and a human-readable reason.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct FieldError {
    pub field: String,
    pub value: Value,
    pub reason: String,
    pub class: FieldErrorClass,
}

impl FieldError {
    pub fn new(
        class: FieldErrorClass,
        field: impl Into<String>,
        value: impl Into<Value>,
        reason: impl Into<String>,
    ) -> Self {
        FieldError {
            field: field.into(),
            value: value.into(),
            reason: reason.into(),
            class,
        }
    }
}

/// Renders a field value the way it appears inside `'…'` in error messages.
pub(crate) fn display_value(value: &Value) -> String {
    match value {
        Value::Null => String::new(),
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

impl fmt::Display for FieldError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "error with field {} = '{}' ({})",
            self.field,
            display_value(&self.value),
            self.reason
        )
    }
}

impl std::error::Error for FieldError {}

/// Aggregated result of a failed validation. Never empty.
///
/// Errors are kept in discovery order: all field-level errors first, then (only
/// when there were none) the struct-level errors.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "Vec<FieldError>", into = "Vec<FieldError>")]
pub struct ValidationError {
    errors: Vec<FieldError>,
}

impl TryFrom<Vec<FieldError>> for ValidationError {
    type Error = &'static str;

    fn try_from(errors: Vec<FieldError>) -> Result<Self, Self::Error> {
        match ValidationError::check(errors) {
            Ok(()) => Err("a validation error holds at least one field error"),
            Err(e) => Ok(e),
        }
    }
}

impl From<ValidationError> for Vec<FieldError> {
    fn from(e: ValidationError) -> Self {
        e.errors
    }
}

impl ValidationError {
    /// Wraps a list of errors, or returns `Ok(())` when the list is empty.
    pub fn check(errors: Vec<FieldError>) -> Result<(), ValidationError> {
        if errors.is_empty() {
            Ok(())
        } else {
            Err(ValidationError { errors })
        }
    }

    pub fn errors(&self) -> &[FieldError] {
        &self.errors
    }

    pub fn into_errors(self) -> Vec<FieldError> {
        self.errors
    }

    pub fn len(&self) -> usize {
        self.errors.len()
    }

    /// Always false; present for symmetry with `len`.
    pub fn is_empty(&self) -> bool {
        self.errors.is_empty()
    }

    /// True if any error is reported against `field`.
    pub fn has_field(&self, field: &str) -> bool {
        self.errors.iter().any(|e| e.field == field)
    }
}

impl fmt::Display for ValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if let [only] = self.errors.as_slice() {
            return write!(f, "{}", only);
        }
        write!(f, "error with fields:")?;
        for e in &self.errors {
            write!(
                f,
                "\n-  {} = '{}' ({})",
                e.field,
                display_value(&e.value),
                e.reason
            )?;
        }
        Ok(())
    }
}

impl std::error::Error for ValidationError {}

/// Raised while assembling a [`RuleRegistry`](crate::registry::RuleRegistry) or
/// configuring the engine. These are programming/deployment errors, never data errors.
#[derive(Clone, Debug, PartialEq, Eq, thiserror::Error)]
pub enum ConfigurationError {
    #[error("field rule `{0}` is registered more than once")]
    DuplicateFieldRule(String),
    #[error("struct rule for kind {0} is registered more than once")]
    DuplicateStructRule(ResourceKind),
    #[error("field rule `{0}` is referenced but not registered")]
    MissingFieldRule(String),
    #[error("no struct rule is registered for kind {0}")]
    MissingStructRule(ResourceKind),
    #[error("unknown field rule `{0}`")]
    UnknownFieldRule(String),
    #[error("unknown resource kind `{0}`")]
    UnknownKind(String),
    #[error("invalid validator configuration: {0}")]
    InvalidConfig(String),
}

/// Broad cause of a [`ParseError`].
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ParseErrorKind {
    Syntax,
    TypeMismatch,
    UnknownKind,
}

/// A document that could not be decoded into a [`Resource`](crate::types::Resource).
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ParseError {
    pub kind: ParseErrorKind,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub path: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub line: Option<usize>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub column: Option<usize>,
}

impl ParseError {
    pub(crate) fn new(kind: ParseErrorKind, message: impl Into<String>) -> Self {
        ParseError {
            kind,
            message: message.into(),
            path: None,
            line: None,
            column: None,
        }
    }
}

impl fmt::Display for ParseError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if let (Some(line), Some(col)) = (self.line, self.column) {
            write!(f, "{}:{}: {}", line, col, self.message)
        } else {
            write!(f, "{}", self.message)
        }
    }
}

impl std::error::Error for ParseError {}

impl From<ConfigurationError> for ParseError {
    fn from(err: ConfigurationError) -> Self {
        let kind = match err {
            ConfigurationError::UnknownKind(_) => ParseErrorKind::UnknownKind,
            _ => ParseErrorKind::TypeMismatch,
        };
        ParseError::new(kind, err.to_string())
    }
}

/// Produced by `serialize` when a resource cannot be written back out.
#[derive(Clone, Debug, PartialEq, Eq, thiserror::Error)]
#[error("cannot serialize {kind} {name:?}: {message}")]
pub struct SerializeError {
    pub kind: ResourceKind,
    pub name: String,
    pub message: String,
}

/// Either failure `load` can hit: undecodable YAML or an invalid resource.
#[derive(Clone, Debug)]
pub enum LoadError {
    Parse(ParseError),
    Validation(ValidationError),
}

impl fmt::Display for LoadError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LoadError::Parse(e) => write!(f, "Parse error: {}", e),
            LoadError::Validation(e) => write!(f, "Validation error: {}", e),
        }
    }
}

impl std::error::Error for LoadError {}

impl From<ParseError> for LoadError {
    fn from(err: ParseError) -> Self {
        LoadError::Parse(err)
    }
}

impl From<ValidationError> for LoadError {
    fn from(err: ValidationError) -> Self {
        LoadError::Validation(err)
    }
}
