use serde_json::Value;

use crate::enums::ResourceKind;
use crate::error::{ParseError, ParseErrorKind};
use crate::types::Resource;

/// Parse a YAML string into an unvalidated [`Resource`].
///
/// Performs YAML deserialization and type mapping only. Values that are the
/// right shape but fail a rule (a malformed CIDR, an unknown enum value) are
/// accepted here and reported by `validate`.
pub fn parse(input: &str) -> Result<Resource, ParseError> {
    if input.trim().is_empty() {
        return Err(ParseError::new(ParseErrorKind::Syntax, "empty input"));
    }

    check_multi_document(input)?;

    // YAML → Value first so the kind can be checked before typed decoding.
    let mut value: Value = serde_saphyr::from_str(input).map_err(|e| {
        let msg = e.to_string();
        ParseError::new(classify_error(&msg), msg)
    })?;

    let Some(root) = value.as_object_mut() else {
        return Err(ParseError::new(
            ParseErrorKind::TypeMismatch,
            "document root must be a YAML mapping",
        ));
    };

    // A bare `spec:` decodes as null; treat it as absent.
    root.retain(|key, v| !(v.is_null() && matches!(key.as_str(), "metadata" | "spec")));

    let kind = match root.get("kind") {
        Some(Value::String(kind)) => kind,
        Some(_) => {
            return Err(ParseError {
                path: Some("kind".to_string()),
                ..ParseError::new(ParseErrorKind::TypeMismatch, "kind must be a string")
            });
        }
        None => {
            return Err(ParseError {
                path: Some("kind".to_string()),
                ..ParseError::new(ParseErrorKind::UnknownKind, "missing field `kind`")
            });
        }
    };
    let kind = ResourceKind::from_kind(kind)?;

    let resource: Resource = serde_json::from_value(value).map_err(|e| {
        let msg = e.to_string();
        ParseError::new(classify_error(&msg), msg)
    })?;

    tracing::debug!(%kind, name = %resource.metadata().name, "resource parsed");
    Ok(resource)
}

/// One resource per document; a second `---` marker at column 0 is refused.
fn check_multi_document(input: &str) -> Result<(), ParseError> {
    let markers = input
        .lines()
        .filter(|line| line.starts_with("---") && line[3..].trim().is_empty())
        .count();
    if markers > 1 {
        return Err(ParseError::new(
            ParseErrorKind::Syntax,
            "multi-document YAML is not supported",
        ));
    }
    Ok(())
}

fn classify_error(msg: &str) -> ParseErrorKind {
    let lower = msg.to_lowercase();
    if lower.contains("unknown variant") {
        ParseErrorKind::UnknownKind
    } else if lower.contains("invalid type")
        || lower.contains("missing field")
        || lower.contains("expected")
    {
        ParseErrorKind::TypeMismatch
    } else {
        ParseErrorKind::Syntax
    }
}
