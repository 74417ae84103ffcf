use crate::config::{ColorFallback, GeneratorConfig};
use crate::descriptor::{ChannelValue, TextureSetDescriptor};
use crate::resolve::resolve_texture;
use crate::translucency::{derive_translucency, DerivedAsset};
use log::{debug, info};
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use thiserror::Error;

pub const COLOR_CHANNEL: &str = "color";

#[derive(Debug, Error)]
pub enum MaterializeError {
    #[error("Failed to create directory {0}: {1}")]
    CreateDir(PathBuf, std::io::Error),
    #[error("Failed to copy {from} to {to}: {source}")]
    Copy {
        from: PathBuf,
        to: PathBuf,
        source: std::io::Error,
    },
}

/// Channel name -> texture path relative to the input root, `/` separated.
/// Channels that did not resolve are stored as empty strings.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct TextureTable(BTreeMap<String, String>);

impl TextureTable {
    pub fn insert(&mut self, channel: &str, path: String) {
        self.0.insert(channel.to_string(), path);
    }

    /// Relative path of a channel, empty when unknown or unresolved
    pub fn get(&self, channel: &str) -> &str {
        self.0.get(channel).map(String::as_str).unwrap_or("")
    }

    /// First non-empty path among the given channels
    pub fn first_of<S: AsRef<str>>(&self, channels: &[S]) -> &str {
        channels
            .iter()
            .map(|c| self.get(c.as_ref()))
            .find(|p| !p.is_empty())
            .unwrap_or("")
    }
}

#[derive(Debug, Clone)]
pub struct Materialization {
    pub output_dir: PathBuf,
    pub textures: TextureTable,
    /// Relative path of the translucency mask, if one exists for this material
    pub translucency: Option<String>,
    pub derived: Option<DerivedAsset>,
    /// Destination of every copied file
    pub copied: Vec<PathBuf>,
}

/// Path of `path` relative to `root` with forward slashes.
pub fn relative_path(path: &Path, root: &Path) -> String {
    let relative = path.strip_prefix(root).unwrap_or(path);
    relative
        .components()
        .map(|c| c.as_os_str().to_string_lossy())
        .collect::<Vec<_>>()
        .join("/")
}

fn same_file(a: &Path, b: &Path) -> bool {
    match (a.canonicalize(), b.canonicalize()) {
        (Ok(a), Ok(b)) => a == b,
        _ => false,
    }
}

fn enqueue(queue: &mut Vec<PathBuf>, path: &Path) {
    if !queue.iter().any(|p| p == path) {
        queue.push(path.to_path_buf());
    }
}

fn color_name(descriptor: &TextureSetDescriptor, fallback: ColorFallback) -> Option<&str> {
    match descriptor.channel(COLOR_CHANNEL) {
        None => Some(&descriptor.base_name),
        Some(ChannelValue::Texture(name))
            if name.is_empty() && fallback == ColorFallback::WhenAbsentOrEmpty =>
        {
            Some(&descriptor.base_name)
        }
        Some(value) => value.texture_name(),
    }
}

fn copy_files(files: &[PathBuf], output_dir: &Path) -> Result<Vec<PathBuf>, MaterializeError> {
    let mut copied = Vec::with_capacity(files.len());
    for file in files {
        let Some(name) = file.file_name() else {
            continue;
        };
        let destination = output_dir.join(name);
        if same_file(file, &destination) {
            debug!("{} is already in place", file.display());
            continue;
        }

        std::fs::copy(file, &destination).map_err(|e| MaterializeError::Copy {
            from: file.clone(),
            to: destination.clone(),
            source: e,
        })?;
        info!("Copied {} to {}", file.display(), destination.display());
        copied.push(destination);
    }

    Ok(copied)
}

/// Resolve every texture of a descriptor, derive its translucency mask and
/// copy everything into the mirrored output directory.
pub fn materialize(
    descriptor: &TextureSetDescriptor,
    input_root: &Path,
    output_root: &Path,
    config: &GeneratorConfig,
) -> Result<Materialization, MaterializeError> {
    let relative_dir = descriptor
        .directory
        .strip_prefix(input_root)
        .unwrap_or(Path::new(""));
    let output_dir = output_root.join(relative_dir);
    std::fs::create_dir_all(&output_dir)
        .map_err(|e| MaterializeError::CreateDir(output_dir.clone(), e))?;

    let mut queue: Vec<PathBuf> = Vec::new();
    let mut textures = TextureTable::default();

    // Color goes first, it is the only source of the translucency mask
    let color = color_name(descriptor, config.color_fallback)
        .and_then(|name| resolve_texture(&descriptor.directory, name, &config.extensions));
    let mut derived = None;
    match &color {
        Some(color) => {
            enqueue(&mut queue, color);
            textures.insert(COLOR_CHANNEL, relative_path(color, input_root));

            derived =
                derive_translucency(color, &config.translucency_suffix, config.derived_policy);
            if let Some(mask) = &derived {
                enqueue(&mut queue, &mask.path);
            }
        }
        None => textures.insert(COLOR_CHANNEL, String::new()),
    }

    for (channel, value) in &descriptor.channels {
        if channel == COLOR_CHANNEL {
            continue;
        }

        let resolved = value
            .texture_name()
            .and_then(|name| resolve_texture(&descriptor.directory, name, &config.extensions));
        match resolved {
            Some(path) => {
                enqueue(&mut queue, &path);
                textures.insert(channel, relative_path(&path, input_root));
            }
            None => {
                debug!(
                    "Channel {} of {} is unavailable",
                    channel,
                    descriptor.path.display()
                );
                textures.insert(channel, String::new());
            }
        }
    }

    let copied = copy_files(&queue, &output_dir)?;
    let translucency = derived
        .as_ref()
        .map(|mask| relative_path(&mask.path, input_root));

    Ok(Materialization {
        output_dir,
        textures,
        translucency,
        derived,
        copied,
    })
}
