//! Semantic validation of a typed metadata document.
//!
//! The pass never stops at the first problem: every issue is collected and
//! returned together so a user can fix a document in one round.

use std::collections::BTreeSet;
use std::fmt;

use crate::metadata::{ComponentType, Metadata, PresetMatrix, Project, SwComponent};

/// How serious a validation issue is.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Severity {
    Error,
    Warning,
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Error => f.write_str("error"),
            Self::Warning => f.write_str("warning"),
        }
    }
}

/// A validation issue found in a metadata document.
#[derive(Debug, Clone)]
pub struct ValidationIssue {
    pub severity: Severity,
    /// Human-readable description.
    pub message: String,
}

impl ValidationIssue {
    fn error(message: impl Into<String>) -> Self {
        Self {
            severity: Severity::Error,
            message: message.into(),
        }
    }

    fn warning(message: impl Into<String>) -> Self {
        Self {
            severity: Severity::Warning,
            message: message.into(),
        }
    }
}

impl fmt::Display for ValidationIssue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.severity, self.message)
    }
}

/// Validate a metadata document.
///
/// Returns `Ok(())` if no issue was found, or `Err(issues)` with every problem.
/// Warnings alone still produce `Err`; callers decide whether they are fatal.
pub fn validate_metadata(metadata: &Metadata) -> std::result::Result<(), Vec<ValidationIssue>> {
    let mut issues = Vec::new();

    validate_project(&metadata.project, &mut issues);
    validate_components(&metadata.source_tree.components, &mut issues);
    validate_preset_matrix(&metadata.preset_matrix, &mut issues);
    validate_references(metadata, &mut issues);

    if issues.is_empty() {
        Ok(())
    } else {
        Err(issues)
    }
}

fn validate_project(project: &Project, issues: &mut Vec<ValidationIssue>) {
    if project.name.is_empty() {
        issues.push(ValidationIssue::error("project.name is required"));
    }
    if project.version.is_empty() {
        issues.push(ValidationIssue::error("project.version is required"));
    }
}

fn has_source(c: &SwComponent) -> bool {
    c.source.is_some() || c.git.is_some()
}

fn validate_components(components: &[SwComponent], issues: &mut Vec<ValidationIssue>) {
    let mut ids = BTreeSet::new();
    for c in components {
        if c.id.is_empty() {
            issues.push(ValidationIssue::error("component id is required"));
        }
        if !ids.insert(c.id.as_str()) {
            issues.push(ValidationIssue::error(format!(
                "duplicate component id: {}",
                c.id
            )));
        }

        match c.kind {
            ComponentType::Executable if !has_source(c) => issues.push(ValidationIssue::error(
                format!("executable {} requires source or git", c.id),
            )),
            ComponentType::Library
                if !has_source(c)
                    && !c.is_hierarchical()
                    && c.library_type.as_deref() != Some("interface") =>
            {
                issues.push(ValidationIssue::error(format!(
                    "library {} requires source or git",
                    c.id
                )))
            }
            ComponentType::Variant => {
                if !has_source(c) {
                    issues.push(ValidationIssue::error(format!(
                        "variant {} requires source or git",
                        c.id
                    )));
                }
                if c.variations.as_ref().map_or(true, Vec::is_empty) {
                    issues.push(ValidationIssue::error(format!(
                        "variant {} requires variations",
                        c.id
                    )));
                }
            }
            ComponentType::External if c.conan_ref.is_none() => issues.push(
                ValidationIssue::error(format!("external {} requires conan_ref", c.id)),
            ),
            ComponentType::Layer if c.subdirs.as_ref().map_or(true, Vec::is_empty) => issues
                .push(ValidationIssue::error(format!(
                    "layer {} requires subdirs",
                    c.id
                ))),
            _ => {}
        }

        if let Some(git) = &c.git {
            if git.url.is_empty() {
                issues.push(ValidationIssue::error(format!(
                    "component {} git.url is required",
                    c.id
                )));
            }
        }
    }

    for c in components {
        for dep in c.dependencies.iter().flatten() {
            if !ids.contains(dep.as_str()) {
                issues.push(ValidationIssue::error(format!(
                    "component {} depends on unknown {}",
                    c.id, dep
                )));
            }
        }
        for sub in c.subdirs.iter().flatten() {
            if !ids.contains(sub.as_str()) {
                issues.push(ValidationIssue::error(format!(
                    "layer {} references unknown subdir {}",
                    c.id, sub
                )));
            }
        }
    }
}

fn validate_preset_matrix(pm: &PresetMatrix, issues: &mut Vec<ValidationIssue>) {
    if pm.dimensions.is_empty() {
        issues.push(ValidationIssue::error("preset_matrix.dimensions is required"));
    }
}

// Dangling hardware references do not break generation (the preset matrix
// skips them), so they are only warnings.
fn validate_references(metadata: &Metadata, issues: &mut Vec<ValidationIssue>) {
    for board in &metadata.boards {
        for soc in &board.socs {
            if metadata.soc(soc).is_none() {
                issues.push(ValidationIssue::warning(format!(
                    "board {} references unknown soc {}",
                    board.id, soc
                )));
            }
        }
    }
    for iv in &metadata.isa_variants {
        if metadata.toolchain(&iv.toolchain).is_none() {
            issues.push(ValidationIssue::warning(format!(
                "isa variant {} references unknown toolchain {}",
                iv.id, iv.toolchain
            )));
        }
    }
}
