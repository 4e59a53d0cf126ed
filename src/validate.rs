//! Two-tier validation: field rules first, struct rules only on a clean field pass.
//!
//! Returns **all** errors of the tier that failed, in discovery order. Validation
//! never modifies the resource.

use std::sync::LazyLock;

use crate::error::{FieldError, FieldErrorClass, ValidationError};
use crate::registry::{Report, RuleRegistry};
use crate::schema;
use crate::types::Resource;

static STANDARD: LazyLock<RuleRegistry> =
    LazyLock::new(|| RuleRegistry::standard().expect("stock rule catalog is consistent"));

/// Validates `resource` against the process-wide standard registry.
pub fn validate(resource: &Resource) -> Result<(), ValidationError> {
    STANDARD.validate(resource)
}

impl RuleRegistry {
    /// Runs every bound field rule, then (if none failed) the kind's struct rule.
    pub fn validate(&self, resource: &Resource) -> Result<(), ValidationError> {
        let kind = resource.kind();
        let name = resource.metadata().name.as_str();

        let mut errors = Vec::new();
        for binding in schema::bindings(resource) {
            // `build` refuses a catalog missing any name in `schema::REFERENCED`.
            let Some(rule) = self.fields.get(binding.rule) else {
                unreachable!("field rule `{}` is bound but not registered", binding.rule);
            };
            if let Some(reason) = rule.check(&binding.field, &binding.value) {
                tracing::debug!(
                    %kind,
                    name,
                    field = %binding.field,
                    rule = rule.name,
                    %reason,
                    "field rule failed"
                );
                errors.push(FieldError::new(
                    FieldErrorClass::Format,
                    binding.field,
                    binding.value,
                    reason,
                ));
            }
        }

        if errors.is_empty() {
            let mut report = Report::new(&self.limits);
            (self.struct_rule(kind).check)(resource, &mut report);
            errors = report.into_errors();
            for e in &errors {
                tracing::debug!(
                    %kind,
                    name,
                    field = %e.field,
                    class = ?e.class,
                    reason = %e.reason,
                    "struct rule failed"
                );
            }
        }

        ValidationError::check(errors)
    }
}
