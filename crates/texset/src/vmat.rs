use crate::config::MaterialConfig;
use crate::materialize::{TextureTable, COLOR_CHANNEL};
use log::{info, warn};
use std::fmt::{self, Display, Formatter};
use std::fs::{File, OpenOptions};
use std::io::{ErrorKind, Write};
use std::path::{Path, PathBuf};
use thiserror::Error;

const HEADER: &str = "// THIS FILE IS AUTO-GENERATED";
const WHITE_TINT: &str = "[1.000000 1.000000 1.000000 0.000000]";
const MATERIAL_EXTENSION: &str = ".vmat";
/// Descriptor word that sometimes ends a base name, dropped from file names
const REDUNDANT_SUFFIX: &str = ".texture";

/// Groups of the trailing `VariableState` block with their variables.
const VARIABLE_STATE: &[(&str, &[(&str, u32)])] = &[
    ("Color", &[]),
    ("Fog", &[]),
    ("Lighting", &[("Metalness", 0)]),
    (
        "PBR 1",
        &[
            ("Albedo", 0),
            ("Albedo Translucency", 0),
            ("Normal", 0),
            ("Roughness", 0),
            ("Ambient Occlusion", 0),
        ],
    ),
    ("Texture Address Mode", &[]),
    ("Translucent", &[]),
];

#[derive(Debug, Error)]
pub enum MaterialError {
    #[error("Failed to write material {0}: {1}")]
    Write(PathBuf, std::io::Error),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TextureSlot {
    AmbientOcclusion,
    Color,
    Normal,
    Roughness,
    Translucency,
}

impl TextureSlot {
    pub fn key(self) -> &'static str {
        match self {
            TextureSlot::AmbientOcclusion => "TextureLayer1AmbientOcclusion",
            TextureSlot::Color => "TextureLayer1Color",
            TextureSlot::Normal => "TextureLayer1Normal",
            TextureSlot::Roughness => "TextureLayer1Roughness",
            TextureSlot::Translucency => "TextureLayer1Translucency",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SlotBinding {
    pub slot: TextureSlot,
    /// Texture path as written into the material, empty when unresolved
    pub path: String,
}

/// Engine material for one texture set.
/// The translucency slot and the `F_TRANSLUCENT` flag are driven by the same
/// field, so a document is translucent exactly when it binds a mask.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MaterialDocument {
    shader: String,
    bindings: Vec<SlotBinding>,
    translucency: Option<String>,
}

impl MaterialDocument {
    pub fn build(
        textures: &TextureTable,
        translucency: Option<&str>,
        config: &MaterialConfig,
    ) -> Self {
        let bind = |slot, path: &str| SlotBinding {
            slot,
            path: path.to_string(),
        };

        Self {
            shader: config.shader.clone(),
            bindings: vec![
                bind(TextureSlot::AmbientOcclusion, &config.ambient_occlusion),
                bind(TextureSlot::Color, textures.get(COLOR_CHANNEL)),
                bind(TextureSlot::Normal, textures.first_of(&config.normal_channels)),
                bind(
                    TextureSlot::Roughness,
                    textures.first_of(&config.roughness_channels),
                ),
            ],
            translucency: translucency.map(str::to_string),
        }
    }

    pub fn bindings(&self) -> &[SlotBinding] {
        &self.bindings
    }

    pub fn binding(&self, slot: TextureSlot) -> Option<&str> {
        if slot == TextureSlot::Translucency {
            return self.translucency.as_deref();
        }
        self.bindings
            .iter()
            .find(|b| b.slot == slot)
            .map(|b| b.path.as_str())
    }

    pub fn is_translucent(&self) -> bool {
        self.translucency.is_some()
    }
}

fn section(f: &mut Formatter<'_>, title: &str) -> fmt::Result {
    writeln!(f)?;
    writeln!(f, "    //---- {} ----", title)
}

fn param(f: &mut Formatter<'_>, key: &str, value: &str) -> fmt::Result {
    writeln!(f, "    {} \"{}\"", key, value)
}

fn variable_state(f: &mut Formatter<'_>) -> fmt::Result {
    writeln!(f, "    VariableState")?;
    writeln!(f, "    {{")?;
    for (group, variables) in VARIABLE_STATE {
        writeln!(f, "        \"{}\"", group)?;
        writeln!(f, "        {{")?;
        for (name, value) in variables.iter() {
            writeln!(f, "            \"{}\" {}", name, value)?;
        }
        writeln!(f, "        }}")?;
    }
    writeln!(f, "    }}")
}

impl Display for MaterialDocument {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        writeln!(f, "{}", HEADER)?;
        writeln!(f)?;
        writeln!(f, "Layer0")?;
        writeln!(f, "{{")?;
        param(f, "shader", &self.shader)?;

        section(f, "Color")?;
        param(f, "g_flModelTintAmount", "1.000")?;
        param(f, "g_flVertexColorOpacityScale", "1.000")?;
        param(f, "g_vColorTint", WHITE_TINT)?;

        section(f, "Fog")?;
        param(f, "g_bFogEnabled", "1")?;

        section(f, "Lighting")?;
        param(f, "g_flMetalness", "0.000")?;

        section(f, "PBR 1")?;
        param(f, "g_vLayer1Tint", WHITE_TINT)?;
        for binding in &self.bindings {
            param(f, binding.slot.key(), &binding.path)?;
        }

        if let Some(mask) = &self.translucency {
            section(f, "Translucent")?;
            writeln!(f, "    F_TRANSLUCENT 1")?;
            param(f, TextureSlot::Translucency.key(), mask)?;
        }

        section(f, "Texture Address Mode")?;
        writeln!(f, "    g_nTextureAddressModeU \"0\" // Wrap")?;
        writeln!(f, "    g_nTextureAddressModeV \"0\" // Wrap")?;

        section(f, "Translucent")?;
        param(f, "g_flOpacityScale", "1.000")?;

        writeln!(f)?;
        variable_state(f)?;
        writeln!(f, "}}")
    }
}

/// `prefix + base_name + ".vmat"`, with a trailing `.texture.vmat`
/// collapsed to `.vmat`.
pub fn material_file_name(base_name: &str, prefix: &str) -> String {
    let name = format!("{}{}{}", prefix, base_name, MATERIAL_EXTENSION);
    match name.strip_suffix(&format!("{}{}", REDUNDANT_SUFFIX, MATERIAL_EXTENSION)) {
        Some(stem) => format!("{}{}", stem, MATERIAL_EXTENSION),
        None => name,
    }
}

/// Render the material of a texture set.
/// Returns the output file name and the document text.
pub fn render_material(
    base_name: &str,
    textures: &TextureTable,
    translucency: Option<&str>,
    config: &MaterialConfig,
) -> (String, String) {
    let document = MaterialDocument::build(textures, translucency, config);
    (
        material_file_name(base_name, &config.file_prefix),
        document.to_string(),
    )
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum WriteOutcome {
    Generated(PathBuf),
    Skipped(PathBuf),
}

/// Create `path` and fill it with `fill`.
/// A file that could not be filled completely is removed again, otherwise
/// later runs would skip it as an existing material.
fn create_material<F>(path: PathBuf, fill: F) -> Result<WriteOutcome, MaterialError>
where
    F: FnOnce(&mut File) -> std::io::Result<()>,
{
    let mut file = match OpenOptions::new().write(true).create_new(true).open(&path) {
        Ok(file) => file,
        Err(e) if e.kind() == ErrorKind::AlreadyExists => {
            info!("Skipped {} as it already exists", path.display());
            return Ok(WriteOutcome::Skipped(path));
        }
        Err(e) => return Err(MaterialError::Write(path, e)),
    };

    if let Err(e) = fill(&mut file).and_then(|_| file.flush()) {
        drop(file);
        if let Err(remove_err) = std::fs::remove_file(&path) {
            warn!(
                "Failed to remove incomplete material {}: {}",
                path.display(),
                remove_err
            );
        }
        return Err(MaterialError::Write(path, e));
    }

    info!("Generated {}", path.display());
    Ok(WriteOutcome::Generated(path))
}

/// Write a material unless a file with the same name already exists.
pub fn write_material(
    dir: &Path,
    file_name: &str,
    content: &str,
) -> Result<WriteOutcome, MaterialError> {
    create_material(dir.join(file_name), |file| file.write_all(content.as_bytes()))
}
