//! Build preset matrix.
//!
//! Every board is expanded over its SoCs, every SoC over its ISAs, and every
//! ISA variant over the build variants. Candidates matching an exclusion
//! record are dropped. The output order is the iteration order, so generated
//! preset files diff cleanly between runs.

use std::collections::BTreeMap;

use scaffolder_model::metadata::CmakeVersion;
use scaffolder_model::{Board, BuildVariant, IsaVariant, Metadata, PresetExclude, Soc};
use serde::Serialize;
use tracing::{debug, warn};

use crate::toolchain_file_name;

/// One fully resolved build configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PresetCombination {
    pub board: String,
    pub soc: String,
    pub isa_variant: String,
    pub build_variant: String,
    /// Owning toolchain of the ISA variant, empty when the variant is unknown.
    pub toolchain_id: String,
    /// `<board>_<soc>_<isa_variant>_<build_variant>`.
    pub name: String,
}

impl PresetCombination {
    fn new(
        board: &str,
        soc: &str,
        isa_variant: &str,
        build_variant: &str,
        toolchain_id: &str,
    ) -> Self {
        Self {
            name: format!("{board}_{soc}_{isa_variant}_{build_variant}"),
            board: board.to_string(),
            soc: soc.to_string(),
            isa_variant: isa_variant.to_string(),
            build_variant: build_variant.to_string(),
            toolchain_id: toolchain_id.to_string(),
        }
    }

    /// Whether `exclusion` matches: every field it sets is equal.
    pub fn is_matched_by(&self, exclusion: &PresetExclude) -> bool {
        fn field_matches(filter: &Option<String>, value: &str) -> bool {
            filter.as_deref().map_or(true, |f| f == value)
        }
        field_matches(&exclusion.board, &self.board)
            && field_matches(&exclusion.soc, &self.soc)
            && field_matches(&exclusion.isa_variant, &self.isa_variant)
            && field_matches(&exclusion.build_variant, &self.build_variant)
    }
}

/// The dimensions of the preset matrix and its exclusion rules.
#[derive(Debug, Clone, Copy)]
pub struct PresetDimensions<'a> {
    pub boards: &'a [Board],
    pub socs: &'a [Soc],
    pub isa_variants: &'a [IsaVariant],
    pub build_variants: &'a [BuildVariant],
    pub exclude: &'a [PresetExclude],
}

impl<'a> PresetDimensions<'a> {
    pub fn from_metadata(metadata: &'a Metadata) -> Self {
        Self {
            boards: &metadata.boards,
            socs: &metadata.socs,
            isa_variants: &metadata.isa_variants,
            build_variants: &metadata.build_variants,
            exclude: &metadata.preset_matrix.exclude,
        }
    }

    /// Expand the matrix, in board → SoC → ISA → build variant order.
    pub fn compute_combinations(&self) -> Vec<PresetCombination> {
        let mut result = Vec::new();
        for board in self.boards {
            for soc_id in &board.socs {
                let Some(soc) = self.socs.iter().find(|s| &s.id == soc_id) else {
                    warn!(board = %board.id, soc = %soc_id, "board references unknown soc, skipping");
                    continue;
                };
                for isa in &soc.isas {
                    let isa_variant = self.resolve_isa_variant(isa);
                    let toolchain_id = self.toolchain_for(isa_variant);
                    for bv in self.build_variants {
                        let candidate = PresetCombination::new(
                            &board.id,
                            soc_id,
                            isa_variant,
                            &bv.id,
                            toolchain_id,
                        );
                        if self.is_excluded(&candidate) {
                            debug!(preset = %candidate.name, "excluded by preset_matrix rule");
                            continue;
                        }
                        result.push(candidate);
                    }
                }
            }
        }
        result
    }

    /// ISA variant id for a SoC ISA: exact id, else the first variant whose
    /// display name contains the ISA, else the ISA itself.
    fn resolve_isa_variant<'s>(&self, isa: &'s str) -> &'s str
    where
        'a: 's,
    {
        if let Some(iv) = self.isa_variants.iter().find(|iv| iv.id == isa) {
            return &iv.id;
        }
        if let Some(iv) = self
            .isa_variants
            .iter()
            .find(|iv| iv.display_name.contains(isa))
        {
            return &iv.id;
        }
        isa
    }

    fn toolchain_for(&self, isa_variant: &str) -> &'a str {
        self.isa_variants
            .iter()
            .find(|iv| iv.id == isa_variant)
            .map_or("", |iv| iv.toolchain.as_str())
    }

    /// Whether any exclusion record matches `candidate`.
    pub fn is_excluded(&self, candidate: &PresetCombination) -> bool {
        self.exclude.iter().any(|ex| candidate.is_matched_by(ex))
    }
}

/// Cache variable names the generated build files read.
const CACHE_BOARD: &str = "BOARD";
const CACHE_SOC: &str = "SOC";
const CACHE_ISA_VARIANT: &str = "ISA_VARIANT";
const CACHE_BUILD_VARIANT: &str = "BUILD_VARIANT";

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ConfigurePreset {
    pub name: String,
    pub binary_dir: String,
    pub toolchain_file: String,
    pub cache_variables: BTreeMap<String, String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BuildPreset {
    pub name: String,
    pub configure_preset: String,
}

/// Content of a `CMakePresets.json`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PresetsDocument {
    pub version: u32,
    pub cmake_minimum_required: CmakeVersion,
    pub configure_presets: Vec<ConfigurePreset>,
    pub build_presets: Vec<BuildPreset>,
}

impl PresetsDocument {
    /// Presets schema version written to the file.
    pub const SCHEMA_VERSION: u32 = 3;

    /// One configure and one build preset per combination.
    ///
    /// `source_dir` is the absolute root of the generated project, in
    /// forward-slash form.
    pub fn build(
        metadata: &Metadata,
        combinations: &[PresetCombination],
        source_dir: &str,
    ) -> Self {
        let source_dir = source_dir.trim_end_matches('/');
        let pattern = &metadata.preset_matrix.binary_dir_pattern;
        let per_variant = !metadata.build_variants.is_empty();

        let configure_presets = combinations
            .iter()
            .map(|c| {
                let tc_file = toolchain_file_name(
                    &c.toolchain_id,
                    per_variant.then_some(c.build_variant.as_str()),
                );
                let cache_variables = BTreeMap::from([
                    (CACHE_BOARD.to_string(), c.board.clone()),
                    (CACHE_SOC.to_string(), c.soc.clone()),
                    (CACHE_ISA_VARIANT.to_string(), c.isa_variant.clone()),
                    (CACHE_BUILD_VARIANT.to_string(), c.build_variant.clone()),
                ]);
                ConfigurePreset {
                    name: c.name.clone(),
                    binary_dir: format!("{source_dir}/{}", pattern.replace("${preset}", &c.name)),
                    toolchain_file: format!("{source_dir}/toolchains/{tc_file}"),
                    cache_variables,
                }
            })
            .collect();

        let build_presets = combinations
            .iter()
            .map(|c| BuildPreset {
                name: c.name.clone(),
                configure_preset: c.name.clone(),
            })
            .collect();

        Self {
            version: Self::SCHEMA_VERSION,
            cmake_minimum_required: metadata.project.cmake_minimum,
            configure_presets,
            build_presets,
        }
    }
}
