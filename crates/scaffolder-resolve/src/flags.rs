//! Compiler and linker flag composition.
//!
//! A toolchain declares base flags per category. A build variant edits them
//! in two phases: first every token listed in `remove_flags` is dropped from
//! the base, then an addition list is appended. Additions come from
//! `add_flags[toolchain][category]` when that list is non-empty, otherwise
//! from the variant's generic `flags[category]`. Additions never go through
//! the removal phase, so a variant may remove a flag and add it back at the
//! end of the list.

use std::collections::BTreeMap;

use scaffolder_model::metadata::Compiler;
use scaffolder_model::{BuildVariant, FlagCategory, Metadata, Toolchain};
use serde::Serialize;

use crate::toolchain_file_name;

/// Merge `base` with the edits of `variant` for one category.
///
/// Without a variant the base list is returned as is.
pub fn merge_flags(
    base: &[String],
    variant: Option<&BuildVariant>,
    toolchain_id: &str,
    category: FlagCategory,
) -> Vec<String> {
    let mut result = base.to_vec();
    let Some(variant) = variant else {
        return result;
    };

    let removals = category.lookup(&variant.remove_flags);
    if !removals.is_empty() {
        result.retain(|flag| !removals.contains(flag));
    }

    let specific = variant
        .add_flags
        .get(toolchain_id)
        .map(|set| category.lookup(set))
        .unwrap_or(&[]);
    let additions = if specific.is_empty() {
        category.lookup(&variant.flags)
    } else {
        specific
    };
    result.extend_from_slice(additions);
    result
}

/// Target processor family, as CMake's `CMAKE_SYSTEM_PROCESSOR` sees it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Processor {
    Arm,
    Riscv,
    Avr,
    Generic,
}

impl Processor {
    /// Guess the processor from the C compiler name.
    pub fn infer(compiler: &Compiler) -> Self {
        let c = compiler.c.as_str();
        if c.contains("arm") {
            Self::Arm
        } else if c.contains("riscv") {
            Self::Riscv
        } else if c.contains("avr") {
            Self::Avr
        } else {
            Self::Generic
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Arm => "arm",
            Self::Riscv => "riscv",
            Self::Avr => "avr",
            Self::Generic => "generic",
        }
    }
}

/// A toolchain with one build variant applied: the content of one
/// generated toolchain file.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ResolvedToolchain {
    pub toolchain_id: String,
    pub build_variant: Option<String>,
    pub display_name: String,
    pub processor: Processor,
    pub compiler: Compiler,
    /// Merged flags; categories that end up empty are omitted.
    pub flags: BTreeMap<FlagCategory, Vec<String>>,
    pub sysroot: String,
    pub defines: Vec<String>,
    pub lib_paths: Vec<String>,
    pub libs: Vec<String>,
    pub file_name: String,
}

/// Apply `variant` (if any) to every flag category of `toolchain`.
pub fn resolve_toolchain(toolchain: &Toolchain, variant: Option<&BuildVariant>) -> ResolvedToolchain {
    let flags = FlagCategory::ALL
        .into_iter()
        .filter_map(|category| {
            let merged = merge_flags(
                category.lookup(&toolchain.flags),
                variant,
                &toolchain.id,
                category,
            );
            (!merged.is_empty()).then_some((category, merged))
        })
        .collect();

    let build_variant = variant.map(|v| v.id.clone());
    ResolvedToolchain {
        toolchain_id: toolchain.id.clone(),
        file_name: toolchain_file_name(&toolchain.id, build_variant.as_deref()),
        build_variant,
        display_name: toolchain.display_name.clone(),
        processor: Processor::infer(&toolchain.compiler),
        compiler: toolchain.compiler.clone(),
        flags,
        sysroot: toolchain.sysroot.clone(),
        defines: toolchain.defines.clone(),
        lib_paths: toolchain.lib_paths.clone(),
        libs: toolchain.libs.clone(),
    }
}

/// Every toolchain file a metadata document generates.
///
/// One file per toolchain when no build variants are declared, otherwise one
/// per toolchain and build variant, toolchains outermost.
pub fn resolve_all(metadata: &Metadata) -> Vec<ResolvedToolchain> {
    if metadata.build_variants.is_empty() {
        return metadata
            .toolchains
            .iter()
            .map(|tc| resolve_toolchain(tc, None))
            .collect();
    }
    metadata
        .toolchains
        .iter()
        .flat_map(|tc| {
            metadata
                .build_variants
                .iter()
                .map(move |bv| resolve_toolchain(tc, Some(bv)))
        })
        .collect()
}
