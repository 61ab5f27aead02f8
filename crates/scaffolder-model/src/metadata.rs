//! Typed metadata document.
//!
//! Field names follow the document spelling (`display_name`, `isa_variants`,
//! `remove_flags`, ...). Optional sections default to empty so that a
//! partial document still types; missing required data is reported by
//! [`crate::validate`], not here.

use std::collections::BTreeMap;

use serde::{Deserialize, Deserializer, Serialize};

use crate::condition::Condition;

/// Per-category flag lists, keyed by category name (`c`, `cxx`, `asm`, `linker`).
pub type FlagSet = BTreeMap<String, Vec<String>>;

/// One of the four compilation flag buckets.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FlagCategory {
    C,
    Cxx,
    Asm,
    Linker,
}

impl FlagCategory {
    /// All categories in output order.
    pub const ALL: [FlagCategory; 4] = [Self::C, Self::Cxx, Self::Asm, Self::Linker];

    /// Key used for this category in a [`FlagSet`].
    pub fn as_str(self) -> &'static str {
        match self {
            Self::C => "c",
            Self::Cxx => "cxx",
            Self::Asm => "asm",
            Self::Linker => "linker",
        }
    }

    /// Flags of this category in `set`, empty if absent.
    pub fn lookup(self, set: &FlagSet) -> &[String] {
        set.get(self.as_str()).map(Vec::as_slice).unwrap_or(&[])
    }
}

/// Minimum CMake version written into generated files.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct CmakeVersion {
    #[serde(default = "default_cmake_major")]
    pub major: u32,
    #[serde(default = "default_cmake_minor")]
    pub minor: u32,
    #[serde(default)]
    pub patch: u32,
}

fn default_cmake_major() -> u32 {
    3
}

fn default_cmake_minor() -> u32 {
    23
}

impl Default for CmakeVersion {
    fn default() -> Self {
        Self {
            major: default_cmake_major(),
            minor: default_cmake_minor(),
            patch: 0,
        }
    }
}

/// Project section.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Project {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub version: String,
    #[serde(default)]
    pub cmake_minimum: CmakeVersion,
}

/// A system-on-chip and the ISAs of its cores.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "SocDoc")]
pub struct Soc {
    pub id: String,
    pub display_name: String,
    pub description: String,
    pub isas: Vec<String>,
}

#[derive(Deserialize)]
struct SocDoc {
    #[serde(default)]
    id: String,
    #[serde(default)]
    display_name: String,
    #[serde(default)]
    description: String,
    #[serde(default)]
    isas: Option<Vec<String>>,
    #[serde(default)]
    isa_cores: Vec<IsaCore>,
}

#[derive(Deserialize)]
struct IsaCore {
    #[serde(default)]
    isa: String,
}

impl From<SocDoc> for Soc {
    fn from(doc: SocDoc) -> Self {
        // `isas` wins when both spellings are present.
        let isas = match doc.isas {
            Some(isas) => isas,
            None => doc
                .isa_cores
                .into_iter()
                .map(|core| core.isa)
                .filter(|isa| !isa.is_empty())
                .collect(),
        };
        Self {
            id: doc.id,
            display_name: doc.display_name,
            description: doc.description,
            isas,
        }
    }
}

/// A board carrying one or more SoCs.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Board {
    #[serde(default)]
    pub id: String,
    #[serde(default)]
    pub display_name: String,
    /// Referenced SoC ids, in preset iteration order.
    #[serde(default)]
    pub socs: Vec<String>,
    #[serde(default)]
    pub defines: Vec<String>,
}

/// Compiler executables of a toolchain.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Compiler {
    #[serde(default)]
    pub c: String,
    #[serde(default)]
    pub cxx: String,
    #[serde(default, rename = "asm")]
    pub asm_: String,
}

/// A cross toolchain.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Toolchain {
    #[serde(default)]
    pub id: String,
    #[serde(default)]
    pub display_name: String,
    #[serde(default)]
    pub compiler: Compiler,
    /// Base flags before any build variant is applied.
    #[serde(default)]
    pub flags: FlagSet,
    #[serde(default)]
    pub libs: Vec<String>,
    #[serde(default)]
    pub lib_paths: Vec<String>,
    #[serde(default)]
    pub defines: Vec<String>,
    #[serde(default)]
    pub sysroot: String,
}

/// Binding of an ISA to the toolchain that builds for it.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct IsaVariant {
    #[serde(default)]
    pub id: String,
    #[serde(default)]
    pub toolchain: String,
    #[serde(default)]
    pub display_name: String,
}

/// A named build profile (debug, release, ...).
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct BuildVariant {
    #[serde(default)]
    pub id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub inherits: Option<String>,
    /// Generic additions, used when no toolchain-specific list applies.
    #[serde(default)]
    pub flags: FlagSet,
    /// Tokens removed from the toolchain's base flags.
    #[serde(default)]
    pub remove_flags: FlagSet,
    /// Toolchain-specific additions: `add_flags[toolchain_id][category]`.
    #[serde(default)]
    pub add_flags: BTreeMap<String, FlagSet>,
}

/// Remote source of a component.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct GitSource {
    #[serde(default)]
    pub url: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tag: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub branch: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub commit: Option<String>,
}

/// How include and exclude patterns combine.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FilterMode {
    /// Keep iff included (or no include patterns) and not excluded.
    #[default]
    IncludeFirst,
    /// Keep iff not excluded, or rescued by an include pattern.
    ExcludeFirst,
}

/// Path filters of a component.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PathFilters {
    #[serde(default)]
    pub include_paths: Vec<String>,
    #[serde(default)]
    pub exclude_paths: Vec<String>,
    #[serde(default)]
    pub filter_mode: FilterMode,
}

/// One conditional branch of a variant component.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Variation {
    #[serde(default)]
    pub subdir: String,
    pub condition: Condition,
}

/// Kind of a source-tree component.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ComponentType {
    Executable,
    Library,
    External,
    Variant,
    Layer,
}

/// A component of the source tree.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SwComponent {
    #[serde(default)]
    pub id: String,
    #[serde(rename = "type")]
    pub kind: ComponentType,
    /// `interface`, `static` or `shared`.
    #[serde(default)]
    pub library_type: Option<String>,
    /// `hierarchical` for libraries made of nested sub-libraries.
    #[serde(default)]
    pub structure: Option<String>,
    /// Local path, relative to the metadata file.
    #[serde(default)]
    pub source: Option<String>,
    #[serde(default)]
    pub git: Option<GitSource>,
    #[serde(default)]
    pub dest: Option<String>,
    /// Build only when this holds.
    #[serde(default)]
    pub condition: Option<Condition>,
    #[serde(default)]
    pub filters: Option<PathFilters>,
    #[serde(default)]
    pub source_extensions: Option<Vec<String>>,
    #[serde(default)]
    pub include_extensions: Option<Vec<String>>,
    #[serde(default)]
    pub metadata_extensions: Option<Vec<String>>,
    #[serde(default)]
    pub dependencies: Option<Vec<String>>,
    #[serde(default)]
    pub conan_ref: Option<String>,
    #[serde(default)]
    pub variations: Option<Vec<Variation>>,
    #[serde(default)]
    pub subdirs: Option<Vec<String>>,
}

impl SwComponent {
    /// Source extensions, defaulting to C and C++ sources.
    pub fn source_extensions(&self) -> Vec<String> {
        self.source_extensions
            .clone()
            .unwrap_or_else(|| vec!["*.c".into(), "*.cpp".into(), "*.cc".into()])
    }

    /// Header extensions, defaulting to C and C++ headers.
    pub fn include_extensions(&self) -> Vec<String> {
        self.include_extensions
            .clone()
            .unwrap_or_else(|| vec!["*.h".into(), "*.hpp".into()])
    }

    /// Extra extensions copied verbatim (linker scripts, configs, ...).
    pub fn metadata_extensions(&self) -> Vec<String> {
        self.metadata_extensions.clone().unwrap_or_default()
    }

    /// Whether the component is a hierarchical library.
    pub fn is_hierarchical(&self) -> bool {
        self.structure.as_deref() == Some("hierarchical")
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SourceTree {
    #[serde(default)]
    pub components: Vec<SwComponent>,
}

/// Package-manager requirements.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Dependencies {
    #[serde(default)]
    pub tool_requires: Vec<String>,
    #[serde(default)]
    pub extra_requires: Vec<String>,
}

/// A partial preset tuple; unset fields match every value.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PresetExclude {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub board: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub soc: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub isa_variant: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub build_variant: Option<String>,
}

/// Preset matrix section.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PresetMatrix {
    #[serde(default)]
    pub dimensions: Vec<String>,
    #[serde(default)]
    pub exclude: Vec<PresetExclude>,
    #[serde(default = "default_naming")]
    pub naming: String,
    /// Binary directory, with `${preset}` standing for the preset name.
    #[serde(default = "default_binary_dir_pattern")]
    pub binary_dir_pattern: String,
}

fn default_naming() -> String {
    "{board}_{soc}_{isa}_{variant}".to_string()
}

fn default_binary_dir_pattern() -> String {
    "build/${preset}".to_string()
}

impl Default for PresetMatrix {
    fn default() -> Self {
        Self {
            dimensions: Vec::new(),
            exclude: Vec::new(),
            naming: default_naming(),
            binary_dir_pattern: default_binary_dir_pattern(),
        }
    }
}

/// The complete metadata document.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Metadata {
    #[serde(default = "default_schema_version")]
    pub schema_version: u32,
    /// User variables, already interpolated.
    #[serde(default, deserialize_with = "deserialize_env")]
    pub env: BTreeMap<String, String>,
    #[serde(default)]
    pub project: Project,
    #[serde(default)]
    pub socs: Vec<Soc>,
    #[serde(default)]
    pub boards: Vec<Board>,
    #[serde(default)]
    pub toolchains: Vec<Toolchain>,
    #[serde(default)]
    pub isa_variants: Vec<IsaVariant>,
    #[serde(default)]
    pub build_variants: Vec<BuildVariant>,
    #[serde(default)]
    pub source_tree: SourceTree,
    #[serde(default)]
    pub dependencies: Dependencies,
    #[serde(default)]
    pub preset_matrix: PresetMatrix,
}

fn default_schema_version() -> u32 {
    1
}

fn deserialize_env<'de, D>(deserializer: D) -> std::result::Result<BTreeMap<String, String>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = serde_json::Value::deserialize(deserializer)?;
    Ok(crate::env::env_table(&value))
}

impl Metadata {
    pub fn soc(&self, id: &str) -> Option<&Soc> {
        self.socs.iter().find(|s| s.id == id)
    }

    pub fn toolchain(&self, id: &str) -> Option<&Toolchain> {
        self.toolchains.iter().find(|t| t.id == id)
    }

    pub fn build_variant(&self, id: &str) -> Option<&BuildVariant> {
        self.build_variants.iter().find(|v| v.id == id)
    }

    pub fn component(&self, id: &str) -> Option<&SwComponent> {
        self.source_tree.components.iter().find(|c| c.id == id)
    }
}
