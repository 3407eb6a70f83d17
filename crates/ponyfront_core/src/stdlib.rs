//! Locates the Pony standard library on the host system.
//!
//! Used by corpus tests and tooling that want a large body of real source to
//! chew on. Resolution order: the `PONY_STDLIB` environment variable, then
//! the `packages` directory shipped next to a `ponyc` found on `PATH`.

use std::env;
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Environment variable that overrides stdlib discovery.
pub const STDLIB_ENV: &str = "PONY_STDLIB";

/// Packages every stdlib checkout is expected to carry. Used to reject
/// directories that merely look plausible.
const PROBE_PACKAGES: &[&str] = &["builtin", "builtin_test"];

#[derive(Debug, Error)]
pub enum StdlibError {
    #[error("`{STDLIB_ENV}` points at {0:?}, which does not look like a Pony stdlib")]
    BadOverride(PathBuf),
    #[error("no Pony standard library found (set `{STDLIB_ENV}` or put `ponyc` on PATH)")]
    NotFound,
}

/// Find the Pony standard library `packages` directory.
pub fn find_stdlib() -> Result<PathBuf, StdlibError> {
    if let Some(dir) = env::var_os(STDLIB_ENV) {
        let dir = PathBuf::from(dir);
        if looks_like_stdlib(&dir) {
            return Ok(dir);
        }
        return Err(StdlibError::BadOverride(dir));
    }

    if let Some(ponyc) = find_on_path("ponyc") {
        // An installed ponyc lives at <prefix>/bin/ponyc with the stdlib
        // at <prefix>/packages.
        if let Some(prefix) = ponyc.parent().and_then(Path::parent) {
            let candidate = prefix.join("packages");
            if looks_like_stdlib(&candidate) {
                return Ok(candidate);
            }
        }
    }

    Err(StdlibError::NotFound)
}

fn looks_like_stdlib(dir: &Path) -> bool {
    dir.is_dir() && PROBE_PACKAGES.iter().all(|pkg| dir.join(pkg).is_dir())
}

fn find_on_path(name: &str) -> Option<PathBuf> {
    let path = env::var_os("PATH")?;
    env::split_paths(&path)
        .map(|dir| dir.join(name))
        .find(|candidate| candidate.is_file())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rejects_non_stdlib_dir() {
        let tmp = env::temp_dir();
        assert!(!looks_like_stdlib(&tmp.join("definitely-not-a-stdlib")));
    }

    #[test]
    fn test_accepts_dir_with_probe_packages() {
        let root = env::temp_dir().join("ponyfront-stdlib-probe");
        for pkg in PROBE_PACKAGES {
            std::fs::create_dir_all(root.join(pkg)).expect("probe dirs");
        }
        assert!(looks_like_stdlib(&root));
    }
}
