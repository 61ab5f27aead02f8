//! `scaffolder files`: the source files a component contributes.

use std::path::Path;

use anyhow::{bail, Result};
use scaffolder_model::{ComponentType, Metadata, SwComponent};
use scaffolder_resolve::{matches_extension, PathFilter};
use tracing::debug;
use walkdir::WalkDir;

pub fn run(metadata: &Metadata, component_id: &str, root: &Path) -> Result<String> {
    let Some(component) = metadata.component(component_id) else {
        bail!("unknown component: '{component_id}'");
    };
    let mut out = String::new();
    for rel in component_files(component, root)? {
        out.push_str(&rel);
        out.push('\n');
    }
    Ok(out)
}

/// Sorted, forward-slash paths of the files `component` takes, relative to
/// its source directory.
pub fn component_files(component: &SwComponent, root: &Path) -> Result<Vec<String>> {
    if matches!(component.kind, ComponentType::External | ComponentType::Layer) {
        bail!("component '{}' has no local source tree", component.id);
    }
    let Some(source) = &component.source else {
        bail!(
            "component '{}' has no local source (git sources are not fetched)",
            component.id
        );
    };

    let base = root.join(source);
    if !base.is_dir() {
        bail!("source directory not found: {}", base.display());
    }

    let filters = component.filters.clone().unwrap_or_default();
    let filter = PathFilter::new(&filters);
    let extensions: Vec<String> = [
        component.source_extensions(),
        component.include_extensions(),
        component.metadata_extensions(),
    ]
    .concat();
    let keep_all = component.kind == ComponentType::Variant;

    let mut files = Vec::new();
    // Directory symlinks are not followed; unreadable entries are skipped.
    for entry in WalkDir::new(&base)
        .sort_by_file_name()
        .into_iter()
        .filter_map(|e| e.ok())
        .filter(|e| e.file_type().is_file())
    {
        let path = entry.path();
        if !filter.should_include(path, &base) {
            debug!(path = %path.display(), "filtered out");
            continue;
        }
        if keep_all || matches_extension(path, &extensions) {
            if let Ok(rel) = path.strip_prefix(&base) {
                files.push(rel.to_string_lossy().replace('\\', "/"));
            }
        }
    }
    files.sort();
    Ok(files)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    use crate::commands::fixture;
    use tempfile::TempDir;

    fn touch(root: &Path, rel: &str) {
        let path = root.join(rel);
        fs::create_dir_all(path.parent().unwrap()).unwrap();
        fs::write(path, "").unwrap();
    }

    fn tree() -> TempDir {
        let dir = TempDir::new().unwrap();
        for rel in [
            "app/main.c",
            "app/util.cpp",
            "app/util.h",
            "app/README.md",
            "app/test/unit.c",
            "hal/h7/gpio.c",
            "hal/generic/gpio.c",
            "hal/CMakeLists.txt",
        ] {
            touch(dir.path(), rel);
        }
        dir
    }

    #[test]
    fn filters_and_extensions() {
        let dir = tree();
        let out = run(&fixture::metadata(), "app", dir.path()).unwrap();
        assert_eq!(out, "main.c\nutil.cpp\nutil.h\n");
    }

    #[test]
    fn variant_keeps_every_file() {
        let dir = tree();
        let files = component_files(
            fixture::metadata().component("hal").unwrap(),
            dir.path(),
        )
        .unwrap();
        assert_eq!(files, vec!["CMakeLists.txt", "generic/gpio.c", "h7/gpio.c"]);
    }

    #[test]
    fn external_component_has_no_files() {
        let dir = tree();
        let err = run(&fixture::metadata(), "conan_fmt", dir.path()).unwrap_err();
        assert!(err.to_string().contains("no local source tree"));
    }

    #[test]
    fn missing_source_directory() {
        let dir = TempDir::new().unwrap();
        assert!(run(&fixture::metadata(), "app", dir.path()).is_err());
    }

    #[cfg(unix)]
    #[test]
    fn directory_symlink_loops_are_not_followed() {
        let dir = TempDir::new().unwrap();
        touch(dir.path(), "app/main.c");
        fs::create_dir_all(dir.path().join("app/sub")).unwrap();
        std::os::unix::fs::symlink("..", dir.path().join("app/sub/up")).unwrap();

        let out = run(&fixture::metadata(), "app", dir.path()).unwrap();
        assert_eq!(out, "main.c\n");
    }

    #[test]
    fn unknown_component() {
        let dir = tree();
        assert!(run(&fixture::metadata(), "nope", dir.path()).is_err());
    }
}
