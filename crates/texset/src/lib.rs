pub mod config;
pub mod descriptor;
pub mod materialize;
pub mod resolve;
pub mod scan;
pub mod translucency;
pub mod vmat;

use crate::descriptor::{parse_descriptor, ChannelCatalog, DescriptorError, ParseOutcome};
use crate::materialize::{materialize, MaterializeError};
use crate::scan::{scan_descriptors, DescriptorLocation, ScanError};
use crate::translucency::DerivedStatus;
use crate::vmat::{render_material, write_material, MaterialError, WriteOutcome};
use log::{debug, error, info};
use std::path::{Path, PathBuf};
use thiserror::Error;
use vmatgen_util::profile::Measure;

pub use crate::config::GeneratorConfig;

#[derive(Debug, Error)]
pub enum GeneratorError {
    #[error("Input {0} is not a directory")]
    InputNotADirectory(PathBuf),
    #[error("Failed to create output directory {0}: {1}")]
    CreateOutputRoot(PathBuf, std::io::Error),
    #[error("Scan error: {0}")]
    Scan(#[from] ScanError),
    #[error("Descriptor error: {0}")]
    Descriptor(#[from] DescriptorError),
    #[error("Failed to materialize assets: {0}")]
    Materialize(#[from] MaterializeError),
    #[error("Material error: {0}")]
    Material(#[from] MaterialError),
}

/// Counters of a single conversion run.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct RunReport {
    pub generated: usize,
    /// Materials left untouched because they already existed
    pub skipped: usize,
    /// Descriptor-named files without a texture set
    pub not_texture_sets: usize,
    pub errored: usize,
    pub copied: usize,
    pub masks_created: usize,
    pub masks_reused: usize,
    pub channels: ChannelCatalog,
}

impl RunReport {
    /// True when no descriptor failed
    pub fn is_clean(&self) -> bool {
        self.errored == 0
    }
}

fn process_descriptor(
    location: &DescriptorLocation,
    input_root: &Path,
    output_root: &Path,
    config: &GeneratorConfig,
    report: &mut RunReport,
) -> Result<(), GeneratorError> {
    let _measure = Measure::new(format!("Processed {}", location.path.display()));

    let descriptor = match parse_descriptor(location, &config.texture_set_key)? {
        ParseOutcome::Parsed(descriptor) => descriptor,
        ParseOutcome::NotATextureSet => {
            debug!("{} has no texture set", location.path.display());
            report.not_texture_sets += 1;
            return Ok(());
        }
    };
    report.channels.record(&descriptor);

    let materialized = materialize(&descriptor, input_root, output_root, config)?;
    report.copied += materialized.copied.len();
    match materialized.derived.as_ref().map(|d| d.status) {
        Some(DerivedStatus::Created) => report.masks_created += 1,
        Some(DerivedStatus::Reused) => report.masks_reused += 1,
        None => {}
    }

    let (file_name, document) = render_material(
        &descriptor.base_name,
        &materialized.textures,
        materialized.translucency.as_deref(),
        &config.material,
    );
    match write_material(&materialized.output_dir, &file_name, &document)? {
        WriteOutcome::Generated(_) => report.generated += 1,
        WriteOutcome::Skipped(_) => report.skipped += 1,
    }

    Ok(())
}

/// Convert every texture-set descriptor under `input_root` into a material
/// placed in the mirrored directory under `output_root`.
///
/// Only an unusable input or output root stops the run. Any failure of a
/// single descriptor is logged, counted in [`RunReport::errored`] and the
/// traversal moves on to the next one.
pub fn convert_directory(
    input_root: &Path,
    output_root: &Path,
    config: &GeneratorConfig,
) -> Result<RunReport, GeneratorError> {
    if !input_root.is_dir() {
        return Err(GeneratorError::InputNotADirectory(input_root.to_path_buf()));
    }
    std::fs::create_dir_all(output_root)
        .map_err(|e| GeneratorError::CreateOutputRoot(output_root.to_path_buf(), e))?;

    let _measure = Measure::new(format!("Converted {}", input_root.display()));
    info!(
        "Converting {} into {}",
        input_root.display(),
        output_root.display()
    );

    let mut report = RunReport::default();
    for location in scan_descriptors(input_root, &config.descriptor_suffix, config.read_mode) {
        let result = location.map_err(GeneratorError::from).and_then(|location| {
            process_descriptor(&location, input_root, output_root, config, &mut report)
        });

        if let Err(e) = result {
            error!("{}", e);
            report.errored += 1;
        }
    }

    if report.channels.is_empty() {
        info!("No texture sets found");
    } else {
        info!(
            "Channels: {}",
            report.channels.iter().collect::<Vec<_>>().join(", ")
        );
    }
    info!(
        "Done: {} generated, {} skipped, {} errors, {} files copied",
        report.generated, report.skipped, report.errored, report.copied
    );

    Ok(report)
}
