//! Home-shorthand path resolution.

use std::path::{Path, PathBuf};

/// Expand a leading `~` to the current user's home directory.
///
/// Paths that do not start with `~` are returned unchanged, which makes the
/// function idempotent for already-resolved input.
pub fn resolve_home(path: &str) -> PathBuf {
    match dirs::home_dir() {
        Some(home) => resolve_home_in(path, &home),
        None => PathBuf::from(path),
    }
}

/// Expand a leading `~` against an explicit home directory.
pub fn resolve_home_in(path: &str, home: &Path) -> PathBuf {
    match path.strip_prefix('~') {
        Some(rest) => home.join(rest.trim_start_matches('/')),
        None => PathBuf::from(path),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn expands_leading_tilde() {
        let home = Path::new("/home/u");
        assert_eq!(
            resolve_home_in("~/docs/notes.org", home),
            PathBuf::from("/home/u/docs/notes.org")
        );
    }

    #[test]
    fn bare_tilde_resolves_to_home() {
        let home = Path::new("/home/u");
        assert_eq!(resolve_home_in("~", home), PathBuf::from("/home/u"));
    }

    #[test]
    fn leaves_absolute_paths_alone() {
        let home = Path::new("/home/u");
        assert_eq!(
            resolve_home_in("/tmp/notes.org", home),
            PathBuf::from("/tmp/notes.org")
        );
    }

    #[test]
    fn idempotent_for_resolved_input() {
        let home = Path::new("/home/u");
        let once = resolve_home_in("~/notes.org", home);
        let twice = resolve_home_in(once.to_str().unwrap(), home);
        assert_eq!(once, twice);
    }

    #[test]
    fn relative_paths_pass_through() {
        let home = Path::new("/home/u");
        assert_eq!(
            resolve_home_in("notes.org", home),
            PathBuf::from("notes.org")
        );
    }
}
