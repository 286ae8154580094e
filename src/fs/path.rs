use std::path::{Component, Path, PathBuf};

/// Joins a served root with a client-supplied path.
///
/// Returns `None` when `requested` contains `..` anywhere, or when what is
/// left after stripping leading separators would still replace the root on
/// join (a drive prefix, for instance). Callers answer `None` with 404 so a
/// rejected path looks exactly like a missing file.
///
/// This is a blacklist on the raw string, not a check of the canonical
/// result against the root: symlinks inside the root are followed.
pub fn complete_served_path(top: &Path, requested: &str) -> Option<PathBuf> {
    if requested.contains("..") {
        return None;
    }

    let relative = Path::new(requested.trim_start_matches(['/', '\\']));
    let escapes = relative
        .components()
        .any(|c| matches!(c, Component::Prefix(_) | Component::RootDir));
    if escapes {
        return None;
    }

    Some(top.join(relative))
}
