//! The rule registry: field rules by name, struct rules by resource kind.
//!
//! A registry is assembled once through [`RuleRegistryBuilder`] and never
//! mutated afterwards. `build()` refuses inconsistent catalogs, so a built
//! registry can dispatch every kind and every rule the schema references.

use serde_json::Value;
use std::collections::{BTreeMap, BTreeSet};

use crate::checks;
use crate::config::{Limits, ValidatorConfig};
use crate::enums::ResourceKind;
use crate::error::{ConfigurationError, FieldError, FieldErrorClass};
use crate::fields::{self, FieldRule};
use crate::schema;
use crate::types::Resource;

// ─── Struct rules ───────────────────────────────────────────────────────────

/// Collects struct-level violations for one resource.
pub struct Report<'a> {
    limits: &'a Limits,
    errors: Vec<FieldError>,
}

impl<'a> Report<'a> {
    pub fn new(limits: &'a Limits) -> Self {
        Report {
            limits,
            errors: Vec::new(),
        }
    }

    pub fn limits(&self) -> &Limits {
        self.limits
    }

    /// Records a cross-field violation.
    pub fn semantic(&mut self, field: impl Into<String>, value: impl Into<Value>, reason: impl Into<String>) {
        self.errors
            .push(FieldError::new(FieldErrorClass::Semantic, field, value, reason));
    }

    /// Records a selector/query parse failure or a disallowed query atom.
    pub fn grammar(&mut self, field: impl Into<String>, value: impl Into<Value>, reason: impl Into<String>) {
        self.errors
            .push(FieldError::new(FieldErrorClass::Grammar, field, value, reason));
    }

    pub fn len(&self) -> usize {
        self.errors.len()
    }

    pub fn is_empty(&self) -> bool {
        self.errors.is_empty()
    }

    pub fn into_errors(self) -> Vec<FieldError> {
        self.errors
    }
}

pub type StructCheck = fn(&Resource, &mut Report<'_>);

/// Whole-object validator for one resource kind.
#[derive(Clone, Copy, Debug)]
pub struct StructRule {
    pub kind: ResourceKind,
    pub check: StructCheck,
}

impl StructRule {
    pub const fn new(kind: ResourceKind, check: StructCheck) -> Self {
        StructRule { kind, check }
    }
}

// ─── Registry ───────────────────────────────────────────────────────────────

/// Immutable rule catalog. `Send + Sync`; share it by reference.
#[derive(Debug)]
pub struct RuleRegistry {
    pub(crate) fields: BTreeMap<&'static str, FieldRule>,
    /// Indexed by `ResourceKind as usize`.
    pub(crate) structs: Vec<StructRule>,
    pub(crate) limits: Limits,
}

impl RuleRegistry {
    /// An empty builder.
    pub fn builder() -> RuleRegistryBuilder {
        RuleRegistryBuilder::default()
    }

    /// The stock catalog with the default configuration.
    pub fn standard() -> Result<RuleRegistry, ConfigurationError> {
        RuleRegistryBuilder::standard().build()
    }

    /// The stock catalog with a custom configuration.
    pub fn with_config(config: ValidatorConfig) -> Result<RuleRegistry, ConfigurationError> {
        RuleRegistryBuilder::standard().config(config).build()
    }

    pub fn field_rule(&self, name: &str) -> Result<&FieldRule, ConfigurationError> {
        self.fields
            .get(name)
            .ok_or_else(|| ConfigurationError::UnknownFieldRule(name.to_string()))
    }

    pub fn struct_rule(&self, kind: ResourceKind) -> &StructRule {
        &self.structs[kind as usize]
    }

    pub fn limits(&self) -> &Limits {
        &self.limits
    }
}

/// Accumulates rules and configuration for a [`RuleRegistry`].
#[derive(Default)]
pub struct RuleRegistryBuilder {
    fields: Vec<FieldRule>,
    structs: Vec<StructRule>,
    config: ValidatorConfig,
}

impl RuleRegistryBuilder {
    /// A builder preloaded with every stock field and struct rule.
    pub fn standard() -> Self {
        RuleRegistryBuilder {
            fields: fields::standard_rules(),
            structs: checks::standard_rules(),
            config: ValidatorConfig::default(),
        }
    }

    pub fn register_field(mut self, rule: FieldRule) -> Self {
        self.fields.push(rule);
        self
    }

    pub fn register_struct(mut self, rule: StructRule) -> Self {
        self.structs.push(rule);
        self
    }

    pub fn config(mut self, config: ValidatorConfig) -> Self {
        self.config = config;
        self
    }

    pub fn build(self) -> Result<RuleRegistry, ConfigurationError> {
        let mut fields = BTreeMap::new();
        for rule in self.fields {
            if fields.insert(rule.name, rule).is_some() {
                return Err(ConfigurationError::DuplicateFieldRule(rule.name.to_string()));
            }
        }
        if let Some(missing) = schema::REFERENCED.iter().find(|name| !fields.contains_key(*name)) {
            return Err(ConfigurationError::MissingFieldRule(missing.to_string()));
        }

        let mut seen = BTreeSet::new();
        for rule in &self.structs {
            if !seen.insert(rule.kind) {
                return Err(ConfigurationError::DuplicateStructRule(rule.kind));
            }
        }
        if let Some(missing) = ResourceKind::ALL.iter().find(|k| !seen.contains(*k)) {
            return Err(ConfigurationError::MissingStructRule(*missing));
        }
        let mut structs = self.structs;
        structs.sort_by_key(|r| r.kind);

        let limits = self.config.resolve()?;
        tracing::info!(
            field_rules = fields.len(),
            struct_rules = structs.len(),
            "rule registry built"
        );
        Ok(RuleRegistry {
            fields,
            structs,
            limits,
        })
    }
}
