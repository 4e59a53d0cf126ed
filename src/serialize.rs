//! [`Resource`] → YAML.

use crate::error::SerializeError;
use crate::types::Resource;

/// Writes a resource as a single YAML document.
///
/// Keys follow the struct declarations with `kind` leading, and unset optional
/// fields are left out, so `parse(&serialize(&r)?)` yields `r` again.
pub fn serialize(resource: &Resource) -> Result<String, SerializeError> {
    let fail = |message: String| SerializeError {
        kind: resource.kind(),
        name: resource.metadata().name.clone(),
        message,
    };
    let tree = serde_json::to_value(resource).map_err(|e| fail(e.to_string()))?;
    let yaml = serde_saphyr::to_string(&tree).map_err(|e| fail(e.to_string()))?;
    tracing::trace!(kind = %resource.kind(), bytes = yaml.len(), "resource serialized");
    Ok(yaml)
}
