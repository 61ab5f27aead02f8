//! `scaffolder toolchains`: flags of every generated toolchain file.

use anyhow::{bail, Result};
use scaffolder_model::Metadata;
use scaffolder_resolve::{resolve_all, ResolvedToolchain};

/// Render resolved toolchains, optionally restricted to one build variant.
pub fn run(metadata: &Metadata, variant: Option<&str>, json: bool) -> Result<String> {
    if let Some(id) = variant {
        if metadata.build_variant(id).is_none() {
            bail!("unknown build variant: '{id}'");
        }
    }

    let resolved: Vec<ResolvedToolchain> = resolve_all(metadata)
        .into_iter()
        .filter(|r| variant.map_or(true, |id| r.build_variant.as_deref() == Some(id)))
        .collect();

    if json {
        let mut out = serde_json::to_string_pretty(&resolved)?;
        out.push('\n');
        return Ok(out);
    }

    let mut out = String::new();
    for r in &resolved {
        out.push_str(&format!("=== {} ({}) ===\n", r.file_name, r.processor.as_str()));
        for (category, flags) in &r.flags {
            out.push_str(&format!("  {:<7} {}\n", category.as_str(), flags.join(" ")));
        }
        if !r.defines.is_empty() {
            out.push_str(&format!("  defines {}\n", r.defines.join(" ")));
        }
    }
    Ok(out)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::commands::fixture;

    #[test]
    fn renders_every_variant() {
        let out = run(&fixture::metadata(), None, false).unwrap();
        assert!(out.contains("=== gcc-arm-debug.cmake (arm) ==="));
        assert!(out.contains("=== gcc-arm-release.cmake (arm) ==="));
        assert!(out.contains("  c       -O0 -g\n"));
        assert!(out.contains("  c       -g -O2\n"));
        assert!(out.contains("  linker  -specs=nano.specs\n"));
    }

    #[test]
    fn filters_by_variant() {
        let out = run(&fixture::metadata(), Some("release"), true).unwrap();
        let value: serde_json::Value = serde_json::from_str(&out).unwrap();
        let files = value.as_array().unwrap();
        assert_eq!(files.len(), 1);
        assert_eq!(files[0]["file_name"], "gcc-arm-release.cmake");
        assert_eq!(files[0]["flags"]["c"], serde_json::json!(["-g", "-O2"]));
    }

    #[test]
    fn unknown_variant_is_error() {
        assert!(run(&fixture::metadata(), Some("profile"), false).is_err());
    }
}
