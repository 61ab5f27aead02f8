//! Metadata model for the scaffolder.
//!
//! A metadata document declares a multi-target embedded software tree:
//! - **Hardware:** SoCs, boards and the ISAs their cores implement
//! - **Toolchains:** compilers, base flags and ISA variant bindings
//! - **Build variants:** flag removals and additions per profile
//! - **Source tree:** components, path filters and conditional variations
//! - **Preset matrix:** dimensions and exclusion rules for build presets
//!
//! This crate owns the typed schema, loading from JSON, YAML or TOML,
//! `${VAR}` interpolation and the semantic validation pass.

pub mod condition;
pub mod env;
pub mod error;
pub mod metadata;
pub mod parse;
pub mod validate;

pub use condition::{Condition, Operand, Operator};
pub use error::{ModelError, Result};
pub use metadata::{
    Board, BuildVariant, ComponentType, FilterMode, FlagCategory, FlagSet, IsaVariant, Metadata,
    PathFilters, PresetExclude, PresetMatrix, Soc, SwComponent, Toolchain, Variation,
};
pub use parse::{load_metadata, parse_metadata, Format};
pub use validate::{validate_metadata, Severity, ValidationIssue};
