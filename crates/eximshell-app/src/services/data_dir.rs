// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Platform-aware data directory resolution.

use std::path::{Path, PathBuf};

const APP_DIR: &str = "eximshell";

/// Return the application data directory, creating it if needed.
///
/// On desktop this uses a conventional location. On mobile `HOME` points
/// into the app sandbox, so the same rule lands inside it.
pub fn data_dir() -> PathBuf {
    let dir = resolve(
        std::env::var_os("XDG_DATA_HOME").as_deref().map(Path::new),
        std::env::var_os("HOME").as_deref().map(Path::new),
    );
    if let Err(e) = std::fs::create_dir_all(&dir) {
        tracing::warn!(path = %dir.display(), error = %e, "could not create data directory");
    }
    dir
}

fn resolve(xdg_data_home: Option<&Path>, home: Option<&Path>) -> PathBuf {
    // Try XDG data dir, then fallback to home
    let base = match (xdg_data_home, home) {
        (Some(xdg), _) if !xdg.as_os_str().is_empty() => xdg.to_path_buf(),
        (_, Some(home)) => home.join(".local").join("share"),
        // Last resort
        _ => std::env::temp_dir(),
    };
    base.join(APP_DIR)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn xdg_wins_over_home() {
        let dir = resolve(Some(Path::new("/xdg")), Some(Path::new("/home/u")));
        assert_eq!(dir, PathBuf::from("/xdg/eximshell"));
    }

    #[test]
    fn home_fallback() {
        let dir = resolve(Some(Path::new("")), Some(Path::new("/home/u")));
        assert_eq!(dir, PathBuf::from("/home/u/.local/share/eximshell"));
    }

    #[test]
    fn temp_as_last_resort() {
        assert_eq!(resolve(None, None), std::env::temp_dir().join("eximshell"));
    }
}
