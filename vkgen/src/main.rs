//! vkgen: build the binding model of a Vulkan-style API registry.
//!
//! Supports two modes:
//!
//! - **stdin mode**: `vkgen < vk.xml`
//! - **file mode**: `vkgen -f json -o model.json vk.xml`
//!
//! The model is rendered in memory and written once, so a failed run never
//! leaves a partial output file behind.

mod render;
mod toc;

use anyhow::{Context, Result};
use clap::{ArgAction, Parser};
use std::fs;
use std::io::{self, Read};
use std::path::{Path, PathBuf};
use tracing::info;
use tracing_subscriber::EnvFilter;
use vkgen_registry::{build_model, RegistryConfig};

/// Output file name used when `--output` is a directory.
const DEFAULT_OUTPUT_STEM: &str = "registry";

#[derive(Parser)]
#[command(
    name = "vkgen",
    about = "Build the binding model of a Vulkan-style API registry"
)]
struct Cli {
    /// Registry XML file. If omitted, reads from stdin.
    registry: Option<PathBuf>,

    /// Output file, or directory to write registry.<ext> into. Defaults to stdout.
    #[arg(short = 'o', long)]
    output: Option<PathBuf>,

    /// Output format: markdown (default), json
    #[arg(short = 'f', long, default_value = "markdown")]
    format: String,

    /// Log more (-v info, -vv debug). RUST_LOG overrides.
    #[arg(short = 'v', long, action = ArgAction::Count)]
    verbose: u8,

    /// Prefix stripped from type names
    #[arg(long)]
    type_prefix: Option<String>,

    /// Prefix stripped from command names
    #[arg(long)]
    command_prefix: Option<String>,

    /// Macro prefix of enum literals
    #[arg(long)]
    literal_prefix: Option<String>,

    /// Name of the status-code enum (after prefix stripping)
    #[arg(long)]
    status_type: Option<String>,
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    // fail on a bad format before doing any work
    let renderer = render::create_renderer(&cli.format)?;
    let config = registry_config(&cli);

    let (xml, source) = read_registry(cli.registry.as_deref())?;
    let model = build_model(&xml, &config).with_context(|| format!("failed to build model from {}", source))?;
    let rendered = renderer.render(&model)?;

    match cli.output.as_deref() {
        None => print!("{}", rendered),
        Some(output) => {
            let out_path = resolve_output(output, renderer.file_extension());
            fs::write(&out_path, &rendered)
                .with_context(|| format!("failed to write {}", out_path.display()))?;
            info!(path = %out_path.display(), "wrote model");
        }
    }
    Ok(())
}

/// Logs go to stderr so stdout carries only the rendered model.
fn init_tracing(verbosity: u8) {
    let level = match verbosity {
        0 => "warn",
        1 => "info",
        _ => "debug",
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .try_init();
}

fn registry_config(cli: &Cli) -> RegistryConfig {
    let mut config = RegistryConfig::default();
    if let Some(ref prefix) = cli.type_prefix {
        config.type_prefix = prefix.clone();
    }
    if let Some(ref prefix) = cli.command_prefix {
        config.command_prefix = prefix.clone();
    }
    if let Some(ref prefix) = cli.literal_prefix {
        config.literal_prefix = prefix.clone();
    }
    if let Some(ref status) = cli.status_type {
        config.status_type = status.clone();
    }
    config
}

/// Read the registry text and a label naming where it came from.
fn read_registry(path: Option<&Path>) -> Result<(String, String)> {
    match path {
        Some(path) => {
            let xml = fs::read_to_string(path)
                .with_context(|| format!("failed to read {}", path.display()))?;
            Ok((xml, path.display().to_string()))
        }
        None => {
            let mut xml = String::new();
            io::stdin()
                .read_to_string(&mut xml)
                .context("failed to read stdin")?;
            Ok((xml, "stdin".to_string()))
        }
    }
}

/// A directory gets `registry.<ext>` inside it; anything else is used as is.
fn resolve_output(output: &Path, extension: &str) -> PathBuf {
    if output.is_dir() {
        output.join(format!("{}.{}", DEFAULT_OUTPUT_STEM, extension))
    } else {
        output.to_path_buf()
    }
}
