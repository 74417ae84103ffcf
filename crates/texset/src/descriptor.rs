use crate::scan::DescriptorLocation;
use log::debug;
use serde_json::Value;
use std::collections::BTreeSet;
use std::path::PathBuf;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum DescriptorError {
    #[error("Failed to read {0}: {1}")]
    Unreadable(PathBuf, std::io::Error),
    #[error("Error decoding JSON in file {0}: {1}")]
    MalformedJson(PathBuf, serde_json::Error),
    #[error("Texture set in {0} is not an object")]
    InvalidTextureSet(PathBuf),
}

/// Value of one channel of a texture set.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ChannelValue {
    /// Logical texture name, extension optional
    Texture(String),
    /// Inline value that names no file: `#RRGGBB` colors, numbers, arrays
    Uniform(String),
}

impl ChannelValue {
    fn from_json(value: &Value) -> Self {
        match value {
            Value::String(s) if s.starts_with('#') => ChannelValue::Uniform(s.clone()),
            Value::String(s) => ChannelValue::Texture(s.clone()),
            other => ChannelValue::Uniform(other.to_string()),
        }
    }

    pub fn texture_name(&self) -> Option<&str> {
        match self {
            ChannelValue::Texture(name) => Some(name),
            ChannelValue::Uniform(_) => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TextureSetDescriptor {
    pub path: PathBuf,
    pub directory: PathBuf,
    pub base_name: String,
    pub format_version: Option<String>,
    /// Channels in the order they are written in the file
    pub channels: Vec<(String, ChannelValue)>,
}

impl TextureSetDescriptor {
    pub fn channel(&self, name: &str) -> Option<&ChannelValue> {
        self.channels
            .iter()
            .find(|(channel, _)| channel == name)
            .map(|(_, value)| value)
    }

    pub fn channel_names(&self) -> impl Iterator<Item = &str> {
        self.channels.iter().map(|(name, _)| name.as_str())
    }
}

#[derive(Debug)]
pub enum ParseOutcome {
    Parsed(TextureSetDescriptor),
    /// Well-formed JSON without a texture set, not a material descriptor
    NotATextureSet,
}

fn parse_content(
    location: &DescriptorLocation,
    content: &str,
    texture_set_key: &str,
) -> Result<ParseOutcome, DescriptorError> {
    let root: Value = serde_json::from_str(content)
        .map_err(|e| DescriptorError::MalformedJson(location.path.clone(), e))?;

    let Some(object) = root.as_object() else {
        return Ok(ParseOutcome::NotATextureSet);
    };
    let Some(texture_set) = object.get(texture_set_key) else {
        return Ok(ParseOutcome::NotATextureSet);
    };
    let texture_set = texture_set
        .as_object()
        .ok_or_else(|| DescriptorError::InvalidTextureSet(location.path.clone()))?;

    let channels = texture_set
        .iter()
        .map(|(name, value)| (name.clone(), ChannelValue::from_json(value)))
        .collect::<Vec<_>>();

    Ok(ParseOutcome::Parsed(TextureSetDescriptor {
        path: location.path.clone(),
        directory: location.directory.clone(),
        base_name: location.base_name.clone(),
        format_version: object
            .get("format_version")
            .and_then(Value::as_str)
            .map(str::to_string),
        channels,
    }))
}

/// Load a descriptor file and extract its texture set.
/// Only unreadable files and malformed JSON are errors; a document without
/// the texture set key is reported as `NotATextureSet`.
pub fn parse_descriptor(
    location: &DescriptorLocation,
    texture_set_key: &str,
) -> Result<ParseOutcome, DescriptorError> {
    let content = std::fs::read_to_string(&location.path)
        .map_err(|e| DescriptorError::Unreadable(location.path.clone(), e))?;

    let outcome = parse_content(location, &content, texture_set_key)?;
    if let ParseOutcome::Parsed(descriptor) = &outcome {
        debug!(
            "Parsed {} (format {}): {} channels",
            descriptor.path.display(),
            descriptor.format_version.as_deref().unwrap_or("unknown"),
            descriptor.channels.len()
        );
    }
    Ok(outcome)
}

/// Every distinct channel name seen during one run, sorted.
/// Purely informational.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct ChannelCatalog(BTreeSet<String>);

impl ChannelCatalog {
    pub fn record(&mut self, descriptor: &TextureSetDescriptor) {
        self.0.extend(descriptor.channel_names().map(str::to_string));
    }

    pub fn merge(&mut self, other: ChannelCatalog) {
        self.0.extend(other.0);
    }

    pub fn contains(&self, name: &str) -> bool {
        self.0.contains(name)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.0.iter().map(String::as_str)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::Path;

    const KEY: &str = "minecraft:texture_set";

    fn location(dir: &Path, base_name: &str, content: &str) -> DescriptorLocation {
        let path = dir.join(format!("{}_set.json", base_name));
        std::fs::write(&path, content).unwrap();
        DescriptorLocation {
            path,
            directory: dir.to_path_buf(),
            base_name: base_name.to_string(),
        }
    }

    fn parsed(outcome: ParseOutcome) -> TextureSetDescriptor {
        match outcome {
            ParseOutcome::Parsed(descriptor) => descriptor,
            ParseOutcome::NotATextureSet => panic!("Expected a texture set"),
        }
    }

    #[test]
    fn test_parse_texture_set() {
        let dir = tempfile::tempdir().unwrap();
        let location = location(
            dir.path(),
            "brick",
            r##"{
                "format_version": "1.16.100",
                "minecraft:texture_set": {
                    "heightmap": "brick_n",
                    "color": "brick",
                    "metalness_emissive_roughness": "#00ff80"
                }
            }"##,
        );

        let descriptor = parsed(parse_descriptor(&location, KEY).unwrap());
        assert_eq!(descriptor.base_name, "brick");
        assert_eq!(descriptor.directory, dir.path());
        assert_eq!(descriptor.format_version.as_deref(), Some("1.16.100"));
        assert_eq!(
            descriptor.channel_names().collect::<Vec<_>>(),
            vec!["heightmap", "color", "metalness_emissive_roughness"]
        );
        assert_eq!(
            descriptor.channel("color"),
            Some(&ChannelValue::Texture("brick".to_string()))
        );
        assert_eq!(
            descriptor
                .channel("metalness_emissive_roughness")
                .and_then(ChannelValue::texture_name),
            None
        );
    }

    #[test]
    fn test_numeric_channels_are_uniform() {
        let dir = tempfile::tempdir().unwrap();
        let location = location(
            dir.path(),
            "gold",
            r#"{"minecraft:texture_set": {"color": [255, 200, 0, 255], "metalness_emissive_roughness": [255, 0, 64]}}"#,
        );

        let descriptor = parsed(parse_descriptor(&location, KEY).unwrap());
        assert_eq!(
            descriptor.channel("color"),
            Some(&ChannelValue::Uniform("[255,200,0,255]".to_string()))
        );
    }

    #[test]
    fn test_missing_key_is_not_a_texture_set() {
        let dir = tempfile::tempdir().unwrap();
        let other = location(dir.path(), "blocks", r#"{"format_version": "1.0", "textures": {}}"#);
        assert!(matches!(
            parse_descriptor(&other, KEY).unwrap(),
            ParseOutcome::NotATextureSet
        ));

        let array = location(dir.path(), "list", r#"[1, 2, 3]"#);
        assert!(matches!(
            parse_descriptor(&array, KEY).unwrap(),
            ParseOutcome::NotATextureSet
        ));
    }

    #[test]
    fn test_malformed_json() {
        let dir = tempfile::tempdir().unwrap();
        let location = location(
            dir.path(),
            "bad",
            r#"{"minecraft:texture_set": {"color": "bad",}"#,
        );

        let err = parse_descriptor(&location, KEY).unwrap_err();
        assert!(matches!(err, DescriptorError::MalformedJson(path, _) if path == location.path));
    }

    #[test]
    fn test_texture_set_must_be_an_object() {
        let dir = tempfile::tempdir().unwrap();
        let location = location(dir.path(), "odd", r#"{"minecraft:texture_set": "brick"}"#);

        let err = parse_descriptor(&location, KEY).unwrap_err();
        assert!(matches!(err, DescriptorError::InvalidTextureSet(_)));
    }

    #[test]
    fn test_unreadable() {
        let dir = tempfile::tempdir().unwrap();
        let location = DescriptorLocation {
            path: dir.path().join("gone_set.json"),
            directory: dir.path().to_path_buf(),
            base_name: "gone".to_string(),
        };

        let err = parse_descriptor(&location, KEY).unwrap_err();
        assert!(matches!(err, DescriptorError::Unreadable(_, _)));
    }

    #[test]
    fn test_catalog_collects_sorted_unique_names() {
        let dir = tempfile::tempdir().unwrap();
        let a = location(
            dir.path(),
            "a",
            r#"{"minecraft:texture_set": {"normal": "a_n", "color": "a"}}"#,
        );
        let b = location(
            dir.path(),
            "b",
            r#"{"minecraft:texture_set": {"color": "b", "heightmap": "b_h"}}"#,
        );

        let mut catalog = ChannelCatalog::default();
        assert!(catalog.is_empty());
        let first = parsed(parse_descriptor(&a, KEY).unwrap());
        catalog.record(&first);
        catalog.record(&first);
        assert_eq!(catalog.len(), 2);
        let mut other = ChannelCatalog::default();
        other.record(&parsed(parse_descriptor(&b, KEY).unwrap()));
        catalog.merge(other);

        assert_eq!(
            catalog.iter().collect::<Vec<_>>(),
            vec!["color", "heightmap", "normal"]
        );
        assert_eq!(catalog.len(), 3);
        assert!(catalog.contains("heightmap"));
    }
}
