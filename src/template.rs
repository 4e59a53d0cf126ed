//! `${name}` placeholder extraction and substitution for alert text and queries.

use std::fmt;

use crate::primitives::go_quote;
use crate::types::Substitution;

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum TemplateError {
    /// `${` with no closing `}`.
    Unterminated { offset: usize },
    /// No substitution has the variable's name.
    NotFound(String),
    /// More than one substitution has the variable's name.
    Ambiguous(String),
    /// The matching substitution has only empty values.
    NoValues(String),
}

impl fmt::Display for TemplateError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TemplateError::Unterminated { offset } => {
                write!(f, "unterminated variable starting at offset {}", offset)
            }
            TemplateError::NotFound(name) => write!(f, "variable {} not found", name),
            TemplateError::Ambiguous(name) => {
                write!(f, "found more than one substitution for variable {}", name)
            }
            TemplateError::NoValues(name) => {
                write!(f, "substitution for variable {} has no values", name)
            }
        }
    }
}

impl std::error::Error for TemplateError {}

/// Returns the names of every `${…}` placeholder in order of appearance.
///
/// The name ends at the first `}` after `${`, so `${a${b}}` yields `a${b`.
/// A bare `$name` is literal text.
pub fn extract_variables(text: &str) -> Result<Vec<String>, TemplateError> {
    let mut vars = Vec::new();
    let mut offset = 0;
    let mut rest = text;
    while let Some(open) = rest.find("${") {
        let start = offset + open;
        rest = &rest[open + 2..];
        offset = start + 2;
        let close = rest
            .find('}')
            .ok_or(TemplateError::Unterminated { offset: start })?;
        vars.push(rest[..close].to_string());
        rest = &rest[close + 1..];
        offset += close + 1;
    }
    Ok(vars)
}

/// Finds the single substitution whose name matches `variable`, ignoring case.
pub fn find_substitution<'a>(
    substitutions: &'a [Substitution],
    variable: &str,
) -> Result<&'a Substitution, TemplateError> {
    let mut matches = substitutions
        .iter()
        .filter(|s| s.name.to_lowercase() == variable.to_lowercase());
    match (matches.next(), matches.next()) {
        (Some(found), None) => Ok(found),
        (None, _) => Err(TemplateError::NotFound(variable.to_string())),
        (Some(_), Some(_)) => Err(TemplateError::Ambiguous(variable.to_string())),
    }
}

/// Renders a substitution's non-empty values as a quoted set: `{"a","b"}`.
pub fn render_values(substitution: &Substitution) -> Option<String> {
    let values: Vec<String> = substitution
        .values
        .iter()
        .filter(|v| !v.is_empty())
        .map(|v| go_quote(v))
        .collect();
    if values.is_empty() {
        return None;
    }
    Some(format!("{{{}}}", values.join(",")))
}

/// Replaces each `${var}` in `query` with the rendered values of its substitution.
///
/// Each extracted variable replaces the first remaining occurrence, so a
/// variable used twice is substituted twice.
pub fn substitute_variables(
    query: &str,
    substitutions: &[Substitution],
) -> Result<String, TemplateError> {
    let mut out = query.to_string();
    for var in extract_variables(query)? {
        let sub = find_substitution(substitutions, &var)?;
        let rendered = render_values(sub).ok_or_else(|| TemplateError::NoValues(var.clone()))?;
        out = out.replacen(&format!("${{{}}}", var), &rendered, 1);
    }
    Ok(out)
}
