mod logging;

use crate::logging::CommonLogger;
use anyhow::Context;
use clap::Parser;
use std::path::PathBuf;
use vmatgen_texset::config::{DerivedPolicy, ReadMode};
use vmatgen_texset::{convert_directory, GeneratorConfig};

#[derive(Parser)]
#[command(version, about, long_about = None)]
struct CLI {
    /// Directory to look for texture-set descriptors in
    #[arg(short, long)]
    input: PathBuf,

    /// Directory the materials and their textures are written to.
    /// Mirrors the layout of the input directory
    #[arg(short, long)]
    output: PathBuf,

    /// TOML configuration file, defaults are used when omitted
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Use recursive read mode (true by default)
    #[arg(short, long)]
    recursive: Option<bool>,

    /// Key of the texture set object inside descriptors
    #[arg(long)]
    texture_set_key: Option<String>,

    /// Derive translucency masks again even if they already exist
    #[arg(long)]
    regenerate_masks: bool,

    /// Log resolution details and timings
    #[arg(short, long)]
    verbose: bool,
}

fn load_config(cli: &CLI) -> anyhow::Result<GeneratorConfig> {
    let mut config = match &cli.config {
        Some(path) => GeneratorConfig::from_file(path)
            .with_context(|| format!("Failed to load configuration {}", path.display()))?,
        None => GeneratorConfig::default(),
    };

    if let Some(recursive) = cli.recursive {
        config.read_mode = if recursive {
            ReadMode::Recursive
        } else {
            ReadMode::Flat
        };
    }
    if let Some(key) = &cli.texture_set_key {
        config.texture_set_key = key.clone();
    }
    if cli.regenerate_masks {
        config.derived_policy = DerivedPolicy::Regenerate;
    }

    Ok(config)
}

fn run(cli: CLI) -> anyhow::Result<()> {
    let config = load_config(&cli)?;
    let report = convert_directory(&cli.input, &cli.output, &config)
        .with_context(|| format!("Failed to convert {}", cli.input.display()))?;

    if !report.is_clean() {
        anyhow::bail!("{} descriptors failed", report.errored);
    }
    Ok(())
}

fn main() {
    let cli = CLI::parse();

    log::set_logger(&CommonLogger).unwrap();
    log::set_max_level(if cli.verbose {
        log::LevelFilter::Debug
    } else {
        log::LevelFilter::Info
    });

    log::info!("Input directory: {}", cli.input.display());
    log::info!("Output directory: {}", cli.output.display());

    run(cli).unwrap_or_else(|err| {
        log::error!("{:#}", err);
        std::process::exit(1);
    });
}
