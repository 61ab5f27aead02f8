//! CLI command implementations.
//!
//! Each command renders its report into a `String`; `main` prints it.

pub mod eval;
pub mod files;
pub mod presets;
pub mod toolchains;
pub mod validate;

#[cfg(test)]
pub(crate) mod fixture {
    use scaffolder_model::{parse_metadata, Format, Metadata};

    pub const METADATA: &str = r#"{
        "project": {"name": "demo", "version": "1.0.0"},
        "socs": [
            {"id": "stm32h7", "isas": ["cortex-m7"]},
            {"id": "stm32f4", "isas": ["cortex-m4"]}
        ],
        "boards": [
            {"id": "nucleo", "socs": ["stm32h7"]},
            {"id": "disco", "socs": ["stm32f4"]}
        ],
        "toolchains": [{
            "id": "gcc-arm",
            "display_name": "GNU Arm",
            "compiler": {"c": "arm-none-eabi-gcc", "cxx": "arm-none-eabi-g++", "asm": "arm-none-eabi-gcc"},
            "flags": {"c": ["-O0", "-g"], "linker": ["-specs=nano.specs"]}
        }],
        "isa_variants": [
            {"id": "m7", "toolchain": "gcc-arm", "display_name": "cortex-m7"},
            {"id": "m4", "toolchain": "gcc-arm", "display_name": "cortex-m4"}
        ],
        "build_variants": [
            {"id": "debug"},
            {"id": "release", "remove_flags": {"c": ["-O0"]}, "flags": {"c": ["-O2"]}}
        ],
        "source_tree": {"components": [
            {"id": "app", "type": "executable", "source": "app", "dest": "app",
             "condition": {"var": "BOARD", "op": "in", "value": ["nucleo"]},
             "filters": {"exclude_paths": ["test"]}},
            {"id": "hal", "type": "variant", "source": "hal", "dest": "hal",
             "variations": [
                {"subdir": "h7", "condition": {"var": "SOC", "op": "equals", "value": "stm32h7"}},
                {"subdir": "generic", "condition": {"default": true}}
             ]},
            {"id": "conan_fmt", "type": "external", "conan_ref": "fmt/10.2.1"}
        ]},
        "preset_matrix": {"dimensions": ["board", "soc", "isa_variant", "build_variant"],
                          "exclude": [{"board": "disco", "build_variant": "release"}]}
    }"#;

    pub fn metadata() -> Metadata {
        parse_metadata(METADATA, Format::Json).unwrap()
    }
}
