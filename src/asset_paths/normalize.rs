use std::path::Path;

const SEPARATORS: &[char] = &['/', '\\'];

/// Turn a path reported by the static finder into a project-relative asset reference.
///
/// The project root is stripped, surrounding separators are trimmed, and the result always uses
/// forward slashes so references look the same on every platform.
pub fn normalize_found_path(found: &Path, base_dir: &Path) -> String {
    let relative = found.strip_prefix(base_dir).unwrap_or(found);
    relative
        .to_string_lossy()
        .trim_matches(SEPARATORS)
        .replace('\\', "/")
}

/// Reference used when the finder has no match: the raw input without surrounding separators.
pub fn fallback_path(raw: &str) -> String {
    raw.trim_matches(SEPARATORS).to_string()
}
