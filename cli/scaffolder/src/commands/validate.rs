//! `scaffolder validate`: semantic checks of the metadata document.

use anyhow::{bail, Result};
use scaffolder_model::{validate_metadata, Metadata, Severity};

/// Report every issue; fail if any of them is an error.
pub fn run(metadata: &Metadata) -> Result<String> {
    let issues = match validate_metadata(metadata) {
        Ok(()) => return Ok(format!("{}: metadata is valid\n", metadata.project.name)),
        Err(issues) => issues,
    };

    let errors = issues
        .iter()
        .filter(|i| i.severity == Severity::Error)
        .count();
    if errors > 0 {
        let report: Vec<String> = issues.iter().map(ToString::to_string).collect();
        bail!(
            "{errors} validation error(s) in metadata:\n  {}",
            report.join("\n  ")
        );
    }

    let mut out = String::new();
    for issue in &issues {
        out.push_str(&format!("{issue}\n"));
    }
    out.push_str(&format!(
        "{}: metadata is valid ({} warning(s))\n",
        metadata.project.name,
        issues.len()
    ));
    Ok(out)
}
