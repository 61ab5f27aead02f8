//! Configuration resolution for the scaffolder.
//!
//! Four independent, pure engines decide what a generated build project
//! contains:
//! - **Conditions:** evaluate a condition tree now, or compile it into a CMake
//!   `if()` expression that behaves the same later
//! - **Path filters:** include/exclude decisions for source files
//! - **Flags:** toolchain base flags merged with build variant removals and
//!   additions
//! - **Presets:** the board × SoC × ISA variant × build variant matrix, minus
//!   exclusions
//!
//! None of them performs I/O or keeps state between calls.

pub mod condition;
pub mod filter;
pub mod flags;
pub mod preset;

pub use condition::{compile, evaluate, select_variation, variation_branches, Environment};
pub use filter::{matches_extension, PathFilter};
pub use flags::{merge_flags, resolve_all, resolve_toolchain, Processor, ResolvedToolchain};
pub use preset::{PresetCombination, PresetDimensions, PresetsDocument};

/// File name of the generated toolchain file for a toolchain and optional
/// build variant, e.g. `gcc-arm-debug.cmake`.
pub fn toolchain_file_name(toolchain_id: &str, build_variant: Option<&str>) -> String {
    match build_variant {
        Some(variant) => format!("{toolchain_id}-{variant}.cmake"),
        None => format!("{toolchain_id}.cmake"),
    }
}
