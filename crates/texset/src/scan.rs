use crate::config::ReadMode;
use std::path::{Path, PathBuf};
use thiserror::Error;
use walkdir::WalkDir;

#[derive(Debug, Error)]
pub enum ScanError {
    #[error("Failed to walk input tree: {0}")]
    Walk(#[from] walkdir::Error),
}

/// A descriptor file found in the input tree.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DescriptorLocation {
    pub path: PathBuf,
    /// Directory the descriptor lives in, base for texture resolution
    pub directory: PathBuf,
    /// File name without the descriptor suffix
    pub base_name: String,
}

/// Lazily walk `root` and yield every regular file whose name ends with `suffix`.
/// Entries are visited directory by directory, sorted by file name.
pub fn scan_descriptors<'a>(
    root: &Path,
    suffix: &'a str,
    read_mode: ReadMode,
) -> impl Iterator<Item = Result<DescriptorLocation, ScanError>> + 'a {
    let walker = match read_mode {
        ReadMode::Flat => WalkDir::new(root).max_depth(1),
        ReadMode::Recursive => WalkDir::new(root),
    };

    walker
        .sort_by_file_name()
        .into_iter()
        .filter_map(move |entry| {
            let entry = match entry {
                Ok(entry) => entry,
                Err(e) => return Some(Err(ScanError::Walk(e))),
            };
            if !entry.file_type().is_file() {
                return None;
            }

            // Non UTF-8 names can not carry the suffix we look for
            let base_name = entry.file_name().to_str()?.strip_suffix(suffix)?.to_string();
            let path = entry.into_path();
            let directory = path.parent()?.to_path_buf();
            Some(Ok(DescriptorLocation {
                path,
                directory,
                base_name,
            }))
        })
}
