//! Scaffolder CLI: resolve a multi-target embedded metadata document into
//! build presets, toolchain flags, conditional branches and file lists.

mod commands;

use std::path::{Path, PathBuf};
use std::process;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use scaffolder_model::Metadata;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "scaffolder", version, about = "Multi-target embedded build project scaffolder")]
struct Cli {
    /// Metadata document (.json, .yaml, .yml or .toml)
    #[arg(long, global = true, default_value = "metadata.json")]
    metadata: PathBuf,
    /// Enable debug logging
    #[arg(short, long, global = true)]
    verbose: bool,
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Check the metadata document for semantic problems
    Validate,
    /// List the build presets of the preset matrix
    Presets {
        /// Print the CMakePresets.json document instead of a table
        #[arg(long)]
        json: bool,
        /// Root of the generated project (default: current directory)
        #[arg(long)]
        source_dir: Option<PathBuf>,
    },
    /// Show resolved flags of every generated toolchain file
    Toolchains {
        /// Only show files for this build variant
        #[arg(long)]
        variant: Option<String>,
        /// Print as JSON
        #[arg(long)]
        json: bool,
    },
    /// Evaluate the conditions of a component
    Eval {
        /// Component id
        component: String,
        /// Variable assignment (e.g., SOC=stm32h7); repeatable
        #[arg(long = "var", value_name = "NAME=VALUE")]
        vars: Vec<String>,
    },
    /// List the files a component takes from its source tree
    Files {
        /// Component id
        component: String,
        /// Directory component sources are relative to (default: metadata file directory)
        #[arg(long)]
        root: Option<PathBuf>,
    },
}

fn main() {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    if let Err(e) = run(cli) {
        eprintln!("error: {e:#}");
        process::exit(1);
    }
}

fn init_tracing(verbose: bool) {
    let default_level = if verbose { "debug" } else { "warn" };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .without_time()
        .init();
}

fn load(path: &Path) -> Result<Metadata> {
    scaffolder_model::load_metadata(path)
        .with_context(|| format!("failed to load metadata from {}", path.display()))
}

fn run(cli: Cli) -> Result<()> {
    let metadata = load(&cli.metadata)?;

    let output = match cli.command {
        Commands::Validate => commands::validate::run(&metadata)?,
        Commands::Presets { json, source_dir } => {
            let source_dir = match source_dir {
                Some(dir) => dir,
                None => std::env::current_dir()?,
            };
            commands::presets::run(&metadata, json, &source_dir)?
        }
        Commands::Toolchains { variant, json } => {
            commands::toolchains::run(&metadata, variant.as_deref(), json)?
        }
        Commands::Eval { component, vars } => commands::eval::run(&metadata, &component, &vars)?,
        Commands::Files { component, root } => {
            let root = match root {
                Some(root) => root,
                None => metadata_dir(&cli.metadata),
            };
            commands::files::run(&metadata, &component, &root)?
        }
    };
    print!("{output}");
    Ok(())
}

/// Directory holding the metadata file; component sources are relative to it.
fn metadata_dir(path: &Path) -> PathBuf {
    match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent.to_path_buf(),
        _ => PathBuf::from("."),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn cli_parses_global_flags_after_subcommand() {
        let cli = Cli::try_parse_from([
            "scaffolder",
            "presets",
            "--json",
            "--metadata",
            "board.yaml",
            "-v",
        ])
        .unwrap();
        assert!(cli.verbose);
        assert_eq!(cli.metadata, PathBuf::from("board.yaml"));
        assert!(matches!(cli.command, Commands::Presets { json: true, .. }));
    }

    #[test]
    fn cli_collects_repeated_vars() {
        let cli = Cli::try_parse_from([
            "scaffolder",
            "eval",
            "hal",
            "--var",
            "SOC=h7",
            "--var",
            "BOARD=nucleo",
        ])
        .unwrap();
        match cli.command {
            Commands::Eval { component, vars } => {
                assert_eq!(component, "hal");
                assert_eq!(vars, vec!["SOC=h7", "BOARD=nucleo"]);
            }
            _ => panic!("expected eval"),
        }
    }

    #[test]
    fn metadata_dir_defaults_to_cwd() {
        assert_eq!(metadata_dir(Path::new("metadata.json")), PathBuf::from("."));
        assert_eq!(
            metadata_dir(Path::new("proj/metadata.json")),
            PathBuf::from("proj")
        );
    }

    #[test]
    fn run_reports_missing_metadata() {
        let cli = Cli::try_parse_from([
            "scaffolder",
            "validate",
            "--metadata",
            "/nonexistent/metadata.json",
        ])
        .unwrap();
        let err = run(cli).unwrap_err();
        assert!(format!("{err:#}").contains("metadata file not found"));
    }
}
