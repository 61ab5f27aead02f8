//! Loading metadata documents from JSON, YAML or TOML.
//!
//! Every format is first read into a generic document tree, `${VAR}`
//! references are expanded, and only then is the tree typed as
//! [`Metadata`]. The three formats therefore share one schema.

use std::path::Path;

use serde_json::Value;
use tracing::debug;

use crate::env::EnvExpander;
use crate::error::{ModelError, Result};
use crate::metadata::Metadata;

/// Document syntax of a metadata file.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Format {
    Json,
    Yaml,
    Toml,
}

impl Format {
    /// Pick a format from a file extension.
    pub fn from_path(path: &Path) -> Result<Self> {
        let ext = path
            .extension()
            .and_then(|e| e.to_str())
            .unwrap_or_default()
            .to_ascii_lowercase();
        match ext.as_str() {
            "json" => Ok(Self::Json),
            "yaml" | "yml" => Ok(Self::Yaml),
            "toml" => Ok(Self::Toml),
            _ => Err(ModelError::UnsupportedFormat { extension: ext }),
        }
    }
}

/// Load and interpolate a metadata file.
pub fn load_metadata(path: &Path) -> Result<Metadata> {
    if !path.exists() {
        return Err(ModelError::NotFound {
            path: path.to_path_buf(),
        });
    }
    let format = Format::from_path(path)?;
    let content = std::fs::read_to_string(path)?;
    debug!(path = %path.display(), ?format, "loading metadata");
    parse_metadata(&content, format)
}

/// Parse and interpolate a metadata document held in memory.
pub fn parse_metadata(content: &str, format: Format) -> Result<Metadata> {
    let mut doc: Value = match format {
        Format::Json => serde_json::from_str(content)?,
        Format::Yaml => serde_yaml::from_str(content)?,
        Format::Toml => toml::from_str(content)?,
    };
    let expander = EnvExpander::from_document(&doc);
    expander.expand_document(&mut doc)?;
    let metadata: Metadata = serde_json::from_value(doc)?;
    Ok(metadata)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::metadata::{ComponentType, FilterMode};
    use crate::Condition;

    const SAMPLE_JSON: &str = r#"{
        "schema_version": 1,
        "env": {"GCC": "/opt/gcc/bin"},
        "project": {"name": "demo", "version": "1.0.0"},
        "socs": [{"id": "stm32h7", "isas": ["cortex-m7"]}],
        "boards": [{"id": "nucleo", "socs": ["stm32h7"]}],
        "toolchains": [{
            "id": "gcc-arm",
            "compiler": {"c": "${GCC}/arm-none-eabi-gcc", "cxx": "${GCC}/arm-none-eabi-g++", "asm": "${GCC}/arm-none-eabi-gcc"},
            "flags": {"c": ["-O0", "-g"]}
        }],
        "isa_variants": [{"id": "m7", "toolchain": "gcc-arm", "display_name": "cortex-m7 hard float"}],
        "build_variants": [{"id": "release", "remove_flags": {"c": ["-O0"]}, "flags": {"c": ["-O2"]}}],
        "source_tree": {"components": [
            {"id": "hal", "type": "variant", "source": "hal", "dest": "hal",
             "filters": {"exclude_paths": ["test"], "filter_mode": "exclude_first"},
             "variations": [{"subdir": "h7", "condition": {"var": "SOC", "op": "equals", "value": "stm32h7"}}]}
        ]},
        "preset_matrix": {"dimensions": ["board", "soc", "isa_variant", "build_variant"],
                          "exclude": [{"soc": "stm32f4"}]}
    }"#;

    #[test]
    fn parse_json_document() {
        let md = parse_metadata(SAMPLE_JSON, Format::Json).unwrap();
        assert_eq!(md.project.name, "demo");
        assert_eq!(md.project.cmake_minimum.minor, 23);
        assert_eq!(md.toolchains[0].compiler.c, "/opt/gcc/bin/arm-none-eabi-gcc");
        assert_eq!(md.build_variants[0].remove_flags["c"], vec!["-O0"]);
        let hal = md.component("hal").unwrap();
        assert_eq!(hal.kind, ComponentType::Variant);
        assert_eq!(
            hal.filters.as_ref().unwrap().filter_mode,
            FilterMode::ExcludeFirst
        );
        assert_eq!(
            hal.variations.as_ref().unwrap()[0].condition,
            Condition::equals("SOC", "stm32h7")
        );
        assert_eq!(md.preset_matrix.exclude[0].soc.as_deref(), Some("stm32f4"));
        assert_eq!(md.preset_matrix.binary_dir_pattern, "build/${preset}");
    }

    #[test]
    fn parse_yaml_document() {
        let yaml = r#"
project:
  name: demo
  version: "2.0"
env:
  - name: ARCH
    value: armv7e-m
toolchains:
  - id: gcc
    flags:
      c: ["-march=${ARCH}"]
build_variants:
  - id: debug
    add_flags:
      gcc:
        c: ["-Og"]
"#;
        let md = parse_metadata(yaml, Format::Yaml).unwrap();
        assert_eq!(md.project.version, "2.0");
        assert_eq!(md.env["ARCH"], "armv7e-m");
        assert_eq!(md.toolchains[0].flags["c"], vec!["-march=armv7e-m"]);
        assert_eq!(md.build_variants[0].add_flags["gcc"]["c"], vec!["-Og"]);
    }

    #[test]
    fn parse_toml_document() {
        let toml_str = r#"
[project]
name = "demo"
version = "0.3.0"

[[boards]]
id = "disco"
socs = ["stm32f4"]

[[preset_matrix.exclude]]
board = "disco"
build_variant = "release"
"#;
        let md = parse_metadata(toml_str, Format::Toml).unwrap();
        assert_eq!(md.boards[0].socs, vec!["stm32f4"]);
        let ex = &md.preset_matrix.exclude[0];
        assert_eq!(ex.board.as_deref(), Some("disco"));
        assert!(ex.soc.is_none());
    }

    #[test]
    fn unknown_variable_fails_parse() {
        let json = r#"{"project": {"name": "${SCAFFOLDER_SURELY_UNSET_VARIABLE}"}}"#;
        assert!(matches!(
            parse_metadata(json, Format::Json),
            Err(ModelError::EnvExpand { .. })
        ));
    }

    #[test]
    fn invalid_json_returns_error() {
        assert!(parse_metadata("{not json", Format::Json).is_err());
    }

    #[test]
    fn format_from_extension() {
        assert_eq!(Format::from_path(Path::new("m.json")).unwrap(), Format::Json);
        assert_eq!(Format::from_path(Path::new("m.YML")).unwrap(), Format::Yaml);
        assert_eq!(Format::from_path(Path::new("m.toml")).unwrap(), Format::Toml);
        assert!(matches!(
            Format::from_path(Path::new("m.ini")),
            Err(ModelError::UnsupportedFormat { .. })
        ));
    }

    #[test]
    fn load_not_found() {
        let result = load_metadata(Path::new("/nonexistent/metadata.json"));
        assert!(matches!(result.unwrap_err(), ModelError::NotFound { .. }));
    }

    #[test]
    fn load_from_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("metadata.json");
        std::fs::write(&path, SAMPLE_JSON).unwrap();
        let md = load_metadata(&path).unwrap();
        assert_eq!(md.boards[0].id, "nucleo");
    }
}
