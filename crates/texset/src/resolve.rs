use log::debug;
use std::path::{Path, PathBuf};

/// Append an extension without replacing an existing one,
/// so `brick.side` becomes `brick.side.tga`, not `brick.tga`.
fn with_appended_extension(path: &Path, extension: &str) -> PathBuf {
    let mut raw = path.as_os_str().to_os_string();
    raw.push(".");
    raw.push(extension);
    PathBuf::from(raw)
}

/// Find the file a logical texture name refers to.
/// The name itself is tried first, then each extension in order.
/// Returns `None` when nothing matches, which callers treat as
/// "channel unavailable" rather than an error.
pub fn resolve_texture<S: AsRef<str>>(
    base_dir: &Path,
    logical_name: &str,
    extensions: &[S],
) -> Option<PathBuf> {
    if logical_name.is_empty() {
        return None;
    }

    let verbatim = base_dir.join(logical_name);
    if verbatim.is_file() {
        return Some(verbatim);
    }

    for extension in extensions {
        let candidate = with_appended_extension(&verbatim, extension.as_ref());
        if candidate.is_file() {
            return Some(candidate);
        }
    }

    debug!(
        "Texture {} not found in {}",
        logical_name,
        base_dir.display()
    );
    None
}
