use crate::config::DerivedPolicy;
use image::{DynamicImage, GrayImage, Luma};
use log::{debug, info, warn};
use std::path::{Path, PathBuf};
use thiserror::Error;

const TRANSPARENT: u8 = u8::MIN;
const OPAQUE: u8 = u8::MAX;

#[derive(Debug, Error)]
pub enum TranslucencyError {
    #[error("Failed to decode {0}: {1}")]
    Decode(PathBuf, image::ImageError),
    #[error("Failed to save mask {0}: {1}")]
    Encode(PathBuf, image::ImageError),
    #[error("Cannot derive a mask path for {0}")]
    InvalidPath(PathBuf),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DerivedStatus {
    Created,
    Reused,
}

/// Translucency mask derived from a color texture.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DerivedAsset {
    pub path: PathBuf,
    pub status: DerivedStatus,
}

/// `textures/brick.tga` -> `textures/brick_trans.png`.
/// Masks are always written as PNG whatever the color texture format is.
pub fn mask_path(color: &Path, suffix: &str) -> Option<PathBuf> {
    let mut name = color.file_stem()?.to_os_string();
    name.push(suffix);
    name.push(".png");
    let path = color.with_file_name(name);
    // Never point the mask at the texture it is derived from
    (path != color).then_some(path)
}

/// Binary alpha-presence mask: any alpha above zero becomes fully opaque.
pub fn alpha_mask(image: &DynamicImage) -> GrayImage {
    let rgba = image.to_rgba8();
    GrayImage::from_fn(rgba.width(), rgba.height(), |x, y| {
        if rgba.get_pixel(x, y)[3] > TRANSPARENT {
            Luma([OPAQUE])
        } else {
            Luma([TRANSPARENT])
        }
    })
}

/// Returns (min, max) of the mask, `None` for an empty image.
fn extrema(mask: &GrayImage) -> Option<(u8, u8)> {
    mask.pixels().fold(None, |acc, pixel| {
        let value = pixel[0];
        Some(match acc {
            None => (value, value),
            Some((lo, hi)) => (lo.min(value), hi.max(value)),
        })
    })
}

fn try_derive(
    color: &Path,
    suffix: &str,
    policy: DerivedPolicy,
) -> Result<Option<DerivedAsset>, TranslucencyError> {
    let path = mask_path(color, suffix)
        .ok_or_else(|| TranslucencyError::InvalidPath(color.into()))?;

    if policy == DerivedPolicy::KeepExisting && path.is_file() {
        debug!("Reusing translucency map {}", path.display());
        return Ok(Some(DerivedAsset {
            path,
            status: DerivedStatus::Reused,
        }));
    }

    let image = image::open(color).map_err(|e| TranslucencyError::Decode(color.into(), e))?;
    let mask = alpha_mask(&image);

    match extrema(&mask) {
        Some((_, hi)) if hi > TRANSPARENT => {}
        _ => {
            debug!("{} has no opaque pixels, no translucency map", color.display());
            return Ok(None);
        }
    }

    mask.save(&path).map_err(|e| TranslucencyError::Encode(path.clone(), e))?;
    info!("Created translucency map {}", path.display());

    Ok(Some(DerivedAsset {
        path,
        status: DerivedStatus::Created,
    }))
}

/// Derive the translucency mask of a color texture and store it next to it.
/// Returns `None` when the texture has no opaque alpha at all, or when it
/// cannot be decoded; failures are logged and never abort the run.
pub fn derive_translucency(
    color: &Path,
    suffix: &str,
    policy: DerivedPolicy,
) -> Option<DerivedAsset> {
    match try_derive(color, suffix, policy) {
        Ok(derived) => derived,
        Err(e) => {
            warn!(
                "Failed to generate translucency map for {}: {}",
                color.display(),
                e
            );
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::{Rgb, RgbImage, Rgba, RgbaImage};

    fn write_rgba(path: &Path, alpha: impl Fn(u32, u32) -> u8) {
        RgbaImage::from_fn(4, 4, |x, y| Rgba([120, 60, 30, alpha(x, y)]))
            .save(path)
            .unwrap();
    }

    #[test]
    fn test_mask_path() {
        assert_eq!(
            mask_path(Path::new("a/brick.png"), "_trans"),
            Some(PathBuf::from("a/brick_trans.png"))
        );
        assert_eq!(
            mask_path(Path::new("a/brick.tga"), "_trans"),
            Some(PathBuf::from("a/brick_trans.png"))
        );
        assert_eq!(mask_path(Path::new("a/brick.png"), ""), None);
    }

    #[test]
    fn test_fully_transparent_creates_nothing() {
        let dir = tempfile::tempdir().unwrap();
        let color = dir.path().join("glass.png");
        write_rgba(&color, |_, _| 0);

        let derived = derive_translucency(&color, "_trans", DerivedPolicy::Regenerate);
        assert_eq!(derived, None);
        assert!(!dir.path().join("glass_trans.png").exists());
    }

    #[test]
    fn test_partial_alpha_creates_binary_mask() {
        let dir = tempfile::tempdir().unwrap();
        let color = dir.path().join("leaves.png");
        // Left half transparent, right half with faint alpha
        write_rgba(&color, |x, _| if x < 2 { 0 } else { 3 });

        let derived = derive_translucency(&color, "_trans", DerivedPolicy::Regenerate).unwrap();
        assert_eq!(derived.path, dir.path().join("leaves_trans.png"));
        assert_eq!(derived.status, DerivedStatus::Created);

        let mask = image::open(&derived.path).unwrap().to_luma8();
        assert_eq!(mask.dimensions(), (4, 4));
        for (x, _, pixel) in mask.enumerate_pixels() {
            let expected = if x < 2 { 0 } else { 255 };
            assert_eq!(pixel[0], expected);
        }
    }

    #[test]
    fn test_opaque_texture_still_gets_mask() {
        let dir = tempfile::tempdir().unwrap();
        let color = dir.path().join("stone.png");
        RgbImage::from_pixel(2, 2, Rgb([10, 10, 10]))
            .save(&color)
            .unwrap();

        let derived = derive_translucency(&color, "_trans", DerivedPolicy::Regenerate).unwrap();
        let mask = image::open(&derived.path).unwrap().to_luma8();
        assert!(mask.pixels().all(|p| p[0] == 255));
    }

    #[test]
    fn test_tga_source_keeps_source_intact() {
        let dir = tempfile::tempdir().unwrap();
        let color = dir.path().join("ore.tga");
        write_rgba(&color, |x, y| if x == y { 255 } else { 0 });
        let before = std::fs::read(&color).unwrap();

        let derived = derive_translucency(&color, "_trans", DerivedPolicy::Regenerate).unwrap();
        assert_eq!(derived.path, dir.path().join("ore_trans.png"));
        assert_eq!(std::fs::read(&color).unwrap(), before);
    }

    #[test]
    fn test_corrupt_texture_yields_none() {
        let dir = tempfile::tempdir().unwrap();
        let color = dir.path().join("broken.png");
        std::fs::write(&color, b"definitely not a png").unwrap();

        assert_eq!(
            derive_translucency(&color, "_trans", DerivedPolicy::Regenerate),
            None
        );
        assert!(!dir.path().join("broken_trans.png").exists());
    }

    #[test]
    fn test_keep_existing_reuses_mask() {
        let dir = tempfile::tempdir().unwrap();
        let color = dir.path().join("leaves.png");
        write_rgba(&color, |_, _| 255);
        let existing = dir.path().join("leaves_trans.png");
        std::fs::write(&existing, b"previous run").unwrap();

        let derived = derive_translucency(&color, "_trans", DerivedPolicy::KeepExisting).unwrap();
        assert_eq!(derived.status, DerivedStatus::Reused);
        assert_eq!(std::fs::read(&existing).unwrap(), b"previous run");

        let derived = derive_translucency(&color, "_trans", DerivedPolicy::Regenerate).unwrap();
        assert_eq!(derived.status, DerivedStatus::Created);
        assert!(image::open(&existing).is_ok());
    }
}
