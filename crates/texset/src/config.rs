use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use thiserror::Error;

#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ReadMode {
    Flat,
    Recursive,
}

impl Default for ReadMode {
    fn default() -> Self {
        ReadMode::Recursive
    }
}

/// When the `color` channel falls back to the descriptor's base name.
#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ColorFallback {
    /// Only when the descriptor has no `color` key at all
    WhenAbsent,
    /// Also when the key is present but holds an empty name
    WhenAbsentOrEmpty,
}

impl Default for ColorFallback {
    fn default() -> Self {
        ColorFallback::WhenAbsent
    }
}

/// Write policy for derived translucency masks.
#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DerivedPolicy {
    /// An already present mask is reused, the color texture is not decoded again
    KeepExisting,
    /// The mask is derived again on every run and overwrites the previous one
    Regenerate,
}

impl Default for DerivedPolicy {
    fn default() -> Self {
        DerivedPolicy::KeepExisting
    }
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
#[serde(default)]
pub struct MaterialConfig {
    pub file_prefix: String,
    pub shader: String,
    pub ambient_occlusion: String,
    /// Channels bound to the normal slot, first non-empty wins
    pub normal_channels: Vec<String>,
    /// Channels bound to the roughness slot, first non-empty wins
    pub roughness_channels: Vec<String>,
}

impl Default for MaterialConfig {
    fn default() -> Self {
        Self {
            file_prefix: "pbr_".to_string(),
            shader: "csgo_lightmappedgeneric.vfx".to_string(),
            ambient_occlusion: "materials/default/default_ao.tga".to_string(),
            normal_channels: vec!["heightmap".to_string(), "normal".to_string()],
            roughness_channels: vec![
                "metalness_emissive_roughness".to_string(),
                "metalness_emissive_roughness_subsurface".to_string(),
            ],
        }
    }
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
#[serde(default)]
pub struct GeneratorConfig {
    pub read_mode: ReadMode,
    pub descriptor_suffix: String,
    pub texture_set_key: String,
    /// Extensions tried in order when a logical name has no file of its own
    pub extensions: Vec<String>,
    pub color_fallback: ColorFallback,
    pub translucency_suffix: String,
    pub derived_policy: DerivedPolicy,
    pub material: MaterialConfig,
}

impl Default for GeneratorConfig {
    fn default() -> Self {
        Self {
            read_mode: ReadMode::default(),
            descriptor_suffix: "_set.json".to_string(),
            texture_set_key: "minecraft:texture_set".to_string(),
            extensions: vec!["tga".to_string(), "png".to_string()],
            color_fallback: ColorFallback::default(),
            translucency_suffix: "_trans".to_string(),
            derived_policy: DerivedPolicy::default(),
            material: MaterialConfig::default(),
        }
    }
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config {0}: {1}")]
    Read(PathBuf, std::io::Error),
    #[error("Failed to parse config {0}: {1}")]
    Parse(PathBuf, toml::de::Error),
}

impl GeneratorConfig {
    pub fn from_toml(content: &str) -> Result<Self, toml::de::Error> {
        toml::from_str(content)
    }

    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path)
            .map_err(|e| ConfigError::Read(path.to_path_buf(), e))?;
        Self::from_toml(&content).map_err(|e| ConfigError::Parse(path.to_path_buf(), e))
    }
}
