//! Compliance reports and UI settings.

use std::collections::BTreeSet;

use super::meta::{self, NameFormat};
use crate::primitives::{NAME_LABEL_FMT, is_dns1123_label};
use crate::registry::Report;
use crate::report_template::{self, TemplateFault};
use crate::types::{ReportTemplate, Resource};

pub(super) fn global_report(resource: &Resource, report: &mut Report<'_>) {
    if let Resource::GlobalReport(r) = resource {
        meta::object_meta(&r.metadata, NameFormat::Subdomain, report);
    }
}

/// Every template must render against any report; names must be unique.
pub(super) fn global_report_type(resource: &Resource, report: &mut Report<'_>) {
    let Resource::GlobalReportType(rt) = resource else {
        return;
    };
    meta::object_meta(&rt.metadata, NameFormat::Subdomain, report);
    let spec = &rt.spec;

    report_template_check("spec.uiSummaryTemplate", &spec.ui_summary_template, report);
    let mut names = BTreeSet::from([spec.ui_summary_template.name.as_str()]);
    for (i, template) in spec.download_templates.iter().enumerate() {
        let path = format!("spec.downloadTemplates[{}]", i);
        report_template_check(&path, template, report);
        if !names.insert(template.name.as_str()) {
            report.semantic(
                format!("{}.name", path),
                template.name.as_str(),
                format!("template name '{}' is already in use.", template.name),
            );
        }
    }
}

fn report_template_check(path: &str, template: &ReportTemplate, report: &mut Report<'_>) {
    let Err(faults) = report_template::check(&template.template) else {
        return;
    };
    let field = format!("{}.template", path);
    for fault in faults {
        match &fault {
            TemplateFault::Syntax(_) => report.grammar(
                field.as_str(),
                template.template.as_str(),
                format!("Invalid template defined in: {}: {}", template.name, fault),
            ),
            TemplateFault::NilPointer { section, .. } => report.semantic(
                field.as_str(),
                template.template.as_str(),
                format!(
                    "Template does not handle nil pointer in reportData field: {}: {}",
                    section, fault
                ),
            ),
            TemplateFault::UnknownField { .. } | TemplateFault::NotIterable { .. } => report.semantic(
                field.as_str(),
                template.template.as_str(),
                format!("Invalid template defined in: {}: {}", template.name, fault),
            ),
        }
    }
}

pub(super) fn ui_settings_group(resource: &Resource, report: &mut Report<'_>) {
    if let Resource::UISettingsGroup(group) = resource {
        meta::object_meta(&group.metadata, NameFormat::Label, report);
    }
}

/// Settings live inside a group: the name carries the `<group>.` prefix and the
/// body holds exactly one of view, layer or dashboard.
pub(super) fn ui_settings(resource: &Resource, report: &mut Report<'_>) {
    let Resource::UISettings(settings) = resource else {
        return;
    };
    meta::object_meta(&settings.metadata, NameFormat::Subdomain, report);
    let spec = &settings.spec;

    if !is_dns1123_label(&spec.group) {
        report.semantic(
            "spec.group",
            spec.group.as_str(),
            format!(
                "name must only consist of lower case alphanumeric characters or '-' (regex: {})",
                NAME_LABEL_FMT
            ),
        );
    }
    let prefix = format!("{}.", spec.group);
    if !settings.metadata.name.starts_with(&prefix) {
        report.semantic(
            "metadata.name",
            settings.metadata.name.as_str(),
            "UISettings name is not prefixed by the UISettings group name",
        );
    }

    let bodies = [spec.view.is_some(), spec.layer.is_some(), spec.dashboard.is_some()];
    if bodies.iter().filter(|b| **b).count() != 1 {
        report.semantic(
            "spec",
            "",
            "UISettings should consists of exactly one View, Layer or Dashboard",
        );
    }
}
