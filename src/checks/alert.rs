//! GlobalAlert and GlobalAlertTemplate share one spec validator. Alert
//! exceptions filter the events those alerts raise.

use std::time::Duration;

use super::meta::{self, NameFormat};
use super::value_of;
use crate::enums::{ClosedSet, Dataset, GlobalAlertType, Metric};
use crate::primitives::{format_duration, parse_go_duration, parse_timestamp};
use crate::query;
use crate::registry::Report;
use crate::template::{self, TemplateError};
use crate::types::{AlertExceptionSpec, GlobalAlertSpec, Resource};

pub(super) fn global_alert(resource: &Resource, report: &mut Report<'_>) {
    if let Resource::GlobalAlert(alert) = resource {
        meta::object_meta(&alert.metadata, NameFormat::Subdomain, report);
        global_alert_spec(&alert.spec, report);
    }
}

pub(super) fn global_alert_template(resource: &Resource, report: &mut Report<'_>) {
    if let Resource::GlobalAlertTemplate(template) = resource {
        meta::object_meta(&template.metadata, NameFormat::Subdomain, report);
        global_alert_spec(&template.spec, report);
    }
}

pub(super) fn alert_exception(resource: &Resource, report: &mut Report<'_>) {
    if let Resource::AlertException(exception) = resource {
        meta::object_meta(&exception.metadata, NameFormat::Subdomain, report);
        alert_exception_spec(&exception.spec, report);
    }
}

fn global_alert_spec(spec: &GlobalAlertSpec, report: &mut Report<'_>) {
    if GlobalAlertType::parse(&spec.alert_type) == Some(GlobalAlertType::AnomalyDetection) {
        report.semantic(
            "spec.type",
            spec.alert_type.as_str(),
            "GlobalAlert type AnomalyDetection is no longer supported",
        );
    }

    let dataset = Dataset::parse(&spec.data_set);
    if dataset == Some(Dataset::Vulnerability) && !spec.aggregate_by.is_empty() {
        report.semantic(
            "spec.aggregateBy",
            value_of(&spec.aggregate_by),
            "aggregateBy is not supported for the vulnerability dataset",
        );
    }

    metric(spec, report);

    let limits = report.limits();
    let (min_period, min_lookback) = (limits.alert_min_period, limits.alert_min_lookback);
    window("period", spec.period.as_deref(), min_period, report);
    window("lookback", spec.lookback.as_deref(), min_lookback, report);

    text_variables("spec.description", &spec.description, spec, report);
    text_variables("spec.summary", &spec.summary, spec, report);

    if let Some(dataset) = dataset {
        alert_query(spec, dataset, report);
    }
}

/// `count` takes no field, every other metric needs one, and any metric needs a
/// condition to compare against.
fn metric(spec: &GlobalAlertSpec, report: &mut Report<'_>) {
    match Metric::parse(&spec.metric) {
        Some(Metric::Count) if !spec.field.is_empty() => report.semantic(
            "spec.field",
            spec.field.as_str(),
            "field must not be set for metric count",
        ),
        Some(m) if m != Metric::Count && spec.field.is_empty() => report.semantic(
            "spec.field",
            "",
            format!("metric {} requires a field", spec.metric),
        ),
        None if !spec.field.is_empty() => report.semantic(
            "spec.metric",
            "",
            "field requires a metric",
        ),
        _ => {}
    }
    if !spec.metric.is_empty() && spec.condition.is_empty() {
        report.semantic(
            "spec.condition",
            "",
            format!("metric {} requires a condition", spec.metric),
        );
    }
}

/// Negative durations fail to parse and count as too short.
fn window(name: &str, raw: Option<&str>, min: Duration, report: &mut Report<'_>) {
    let Some(raw) = raw else {
        return;
    };
    if !parse_go_duration(raw).is_ok_and(|d| d >= min) {
        report.semantic(
            format!("spec.{}", name),
            raw,
            format!("{} cannot be shorter than {}", name, format_duration(min)),
        );
    }
}

/// Every `${name}` in description or summary must name the metric or an aggregateBy key.
fn text_variables(field: &str, text: &str, spec: &GlobalAlertSpec, report: &mut Report<'_>) {
    let vars = match template::extract_variables(text) {
        Ok(vars) => vars,
        Err(e) => {
            report.grammar(field, text, e.to_string());
            return;
        }
    };
    for var in vars {
        let known = !var.is_empty()
            && (var == spec.metric || spec.aggregate_by.iter().any(|k| *k == var));
        if !known {
            report.semantic(
                field,
                text,
                format!("invalid variable ${{{}}}: must be the metric or an aggregateBy key", var),
            );
        }
    }
}

/// Substitutes `${var}` references, then parses the result and checks every
/// atom against the dataset's vocabulary.
fn alert_query(spec: &GlobalAlertSpec, dataset: Dataset, report: &mut Report<'_>) {
    let raw = spec.query.as_str();
    let substituted = match template::substitute_variables(raw, &spec.substitutions) {
        Ok(q) => q,
        Err(e @ TemplateError::Unterminated { .. }) => {
            report.grammar("spec.query", raw, e.to_string());
            return;
        }
        Err(e) => {
            report.semantic("spec.query", raw, e.to_string());
            return;
        }
    };
    let parsed = match query::parse(&substituted) {
        Ok(q) => q,
        Err(e) => {
            report.grammar("spec.query", raw, e.to_string());
            return;
        }
    };
    if let Err(reason) = parsed.validate_for(dataset) {
        report.grammar("spec.query", raw, reason);
    }
}

/// The selector is an events query; the window, when closed, must not be empty.
fn alert_exception_spec(spec: &AlertExceptionSpec, report: &mut Report<'_>) {
    let raw = spec.selector.as_str();
    let checked = query::parse(raw)
        .map_err(|e| e.to_string())
        .and_then(|q| q.validate(query::validate_events_atom));
    if let Err(reason) = checked {
        report.grammar(
            "spec.selector",
            raw,
            format!("Invalid selector ({}) in request: {}", raw, reason),
        );
    }

    let Some(end) = &spec.end_time else {
        return;
    };
    if let (Ok(from), Ok(to)) = (parse_timestamp(&spec.start_time), parse_timestamp(end)) {
        if to <= from {
            report.semantic("spec.endTime", end.as_str(), "must be set after startTime");
        }
    }
}
