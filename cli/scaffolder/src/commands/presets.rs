//! `scaffolder presets`: the build preset matrix.

use std::path::Path;

use anyhow::Result;
use scaffolder_model::Metadata;
use scaffolder_resolve::{PresetDimensions, PresetsDocument};

/// Render the preset list, or the presets JSON document with `json`.
pub fn run(metadata: &Metadata, json: bool, source_dir: &Path) -> Result<String> {
    let combinations = PresetDimensions::from_metadata(metadata).compute_combinations();

    if json {
        let source_dir = source_dir.to_string_lossy().replace('\\', "/");
        let doc = PresetsDocument::build(metadata, &combinations, &source_dir);
        let mut out = serde_json::to_string_pretty(&doc)?;
        out.push('\n');
        return Ok(out);
    }

    let mut out = String::new();
    for c in &combinations {
        out.push_str(&format!("{:<40} {}\n", c.name, c.toolchain_id));
    }
    out.push_str(&format!("{} preset(s)\n", combinations.len()));
    Ok(out)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::commands::fixture;

    #[test]
    fn table_lists_surviving_presets() {
        let out = run(&fixture::metadata(), false, Path::new("/gen")).unwrap();
        let lines: Vec<&str> = out.lines().collect();
        assert_eq!(lines.len(), 4);
        assert!(lines[0].starts_with("nucleo_stm32h7_m7_debug"));
        assert!(lines[0].ends_with("gcc-arm"));
        assert!(lines[2].starts_with("disco_stm32f4_m4_debug"));
        assert_eq!(lines[3], "3 preset(s)");
    }

    #[test]
    fn json_document() {
        let out = run(&fixture::metadata(), true, Path::new("/gen")).unwrap();
        let value: serde_json::Value = serde_json::from_str(&out).unwrap();
        let presets = value["configurePresets"].as_array().unwrap();
        assert_eq!(presets.len(), 3);
        assert_eq!(presets[1]["name"], "nucleo_stm32h7_m7_release");
        assert_eq!(
            presets[1]["toolchainFile"],
            "/gen/toolchains/gcc-arm-release.cmake"
        );
        assert_eq!(presets[1]["binaryDir"], "/gen/build/nucleo_stm32h7_m7_release");
        assert_eq!(value["buildPresets"].as_array().unwrap().len(), 3);
    }
}
