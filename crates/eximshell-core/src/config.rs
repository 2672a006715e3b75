// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Application configuration.
//
// The hosted origin is deliberately absent from `ShellConfig`: the shell only
// ever loads `CONTENT_ORIGIN`, and no file on disk can point it elsewhere.

use std::path::Path;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::error::Result;
use crate::types::PickerOptions;

/// The single remote origin rendered by the content view.
pub const CONTENT_ORIGIN: &str = "https://eximbd.com.my/";

const CONFIG_FILE: &str = "config.json";

/// How the content view treats HTTP subresources on an HTTPS page.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MixedContentMode {
    Never,
    Compatibility,
    Always,
}

impl MixedContentMode {
    /// The matching `WebSettings.MIXED_CONTENT_*` constant on Android.
    pub fn android_constant(self) -> i32 {
        match self {
            Self::Always => 0,
            Self::Never => 1,
            Self::Compatibility => 2,
        }
    }
}

/// Embedded content view capabilities.
///
/// TRUST BOUNDARY: the defaults are fully permissive (scripts, DOM storage,
/// file access including cross-origin file URLs, mixed content). That is
/// acceptable only because the view never loads anything but
/// `CONTENT_ORIGIN`. Anything that lets the view navigate to a second origin
/// must revisit these flags.
///
/// The shell hands these to the platform web view when it mounts. A flag the
/// engine has no switch for keeps the engine's own behaviour.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct WebViewSettings {
    pub javascript_enabled: bool,
    pub dom_storage_enabled: bool,
    pub allows_file_access: bool,
    pub allow_file_access_from_file_urls: bool,
    pub allow_universal_access_from_file_urls: bool,
    pub mixed_content: MixedContentMode,
}

impl Default for WebViewSettings {
    fn default() -> Self {
        Self {
            javascript_enabled: true,
            dom_storage_enabled: true,
            allows_file_access: true,
            allow_file_access_from_file_urls: true,
            allow_universal_access_from_file_urls: true,
            mixed_content: MixedContentMode::Always,
        }
    }
}

impl WebViewSettings {
    /// Every capability switched on.
    pub fn is_fully_permissive(&self) -> bool {
        *self == Self::default()
    }
}

/// Reachability probing (used where the OS offers no change notifications).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ConnectivitySettings {
    pub probe_interval_ms: u64,
    pub probe_timeout_ms: u64,
}

impl Default for ConnectivitySettings {
    fn default() -> Self {
        Self {
            probe_interval_ms: 5_000,
            probe_timeout_ms: 3_000,
        }
    }
}

impl ConnectivitySettings {
    pub fn probe_interval(&self) -> Duration {
        Duration::from_millis(self.probe_interval_ms.max(250))
    }

    pub fn probe_timeout(&self) -> Duration {
        Duration::from_millis(self.probe_timeout_ms.max(100))
    }
}

/// Persistent shell settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ShellConfig {
    pub webview: WebViewSettings,
    pub picker: PickerOptions,
    pub connectivity: ConnectivitySettings,
    /// Register for push notifications on mount.
    pub notifications_enabled: bool,
    /// `tracing` filter used when `RUST_LOG` is unset.
    pub log_filter: String,
}

impl Default for ShellConfig {
    fn default() -> Self {
        Self {
            webview: WebViewSettings::default(),
            picker: PickerOptions::default(),
            connectivity: ConnectivitySettings::default(),
            notifications_enabled: true,
            log_filter: "info".into(),
        }
    }
}

impl ShellConfig {
    /// Load `config.json` from `dir`. Returns `None` when the file is missing
    /// or unreadable so callers can fall back to defaults.
    pub fn load(dir: &Path) -> Option<Self> {
        let path = dir.join(CONFIG_FILE);
        let data = std::fs::read_to_string(&path).ok()?;
        match serde_json::from_str(&data) {
            Ok(config) => Some(config),
            Err(e) => {
                tracing::warn!(path = %path.display(), error = %e, "ignoring unreadable config");
                None
            }
        }
    }

    /// Load from `dir`, writing the defaults there when no file exists yet.
    ///
    /// A file that exists but does not parse is left alone and the defaults
    /// are used for this run only.
    pub fn load_or_init(dir: &Path) -> Result<Self> {
        if dir.join(CONFIG_FILE).exists() {
            return Ok(Self::load(dir).unwrap_or_default());
        }
        let config = Self::default();
        config.persist(dir)?;
        Ok(config)
    }

    /// Write `config.json` into `dir`.
    pub fn persist(&self, dir: &Path) -> Result<()> {
        let path = dir.join(CONFIG_FILE);
        let json = serde_json::to_string_pretty(self)?;
        std::fs::write(&path, json)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_are_permissive() {
        let settings = WebViewSettings::default();
        assert!(settings.is_fully_permissive());
        assert_eq!(settings.mixed_content.android_constant(), 0);

        let narrowed = WebViewSettings {
            javascript_enabled: false,
            ..Default::default()
        };
        assert!(!narrowed.is_fully_permissive());
    }

    #[test]
    fn missing_file_loads_none() {
        let dir = tempfile::tempdir().unwrap();
        assert!(ShellConfig::load(dir.path()).is_none());
    }

    #[test]
    fn load_or_init_writes_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let config = ShellConfig::load_or_init(dir.path()).unwrap();
        assert_eq!(config, ShellConfig::default());
        assert!(dir.path().join(CONFIG_FILE).exists());
    }

    #[test]
    fn partial_file_fills_in_defaults() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(
            dir.path().join(CONFIG_FILE),
            r#"{ "notifications_enabled": false, "connectivity": { "probe_interval_ms": 1000 } }"#,
        )
        .unwrap();
        let config = ShellConfig::load(dir.path()).unwrap();
        assert!(!config.notifications_enabled);
        assert_eq!(config.connectivity.probe_interval_ms, 1000);
        assert_eq!(config.connectivity.probe_timeout_ms, 3000);
        assert!(config.picker.allows_editing);
    }

    #[test]
    fn garbage_file_falls_back() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join(CONFIG_FILE), "{{{").unwrap();
        assert!(ShellConfig::load(dir.path()).is_none());
    }

    #[test]
    fn unparsable_file_survives_load_or_init() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join(CONFIG_FILE);
        std::fs::write(&path, r#"{ "notifications_enabled": fals }"#).unwrap();

        let config = ShellConfig::load_or_init(dir.path()).unwrap();
        assert_eq!(config, ShellConfig::default());
        assert_eq!(
            std::fs::read_to_string(&path).unwrap(),
            r#"{ "notifications_enabled": fals }"#
        );
    }

    #[test]
    fn probe_durations_have_floors() {
        let settings = ConnectivitySettings {
            probe_interval_ms: 0,
            probe_timeout_ms: 0,
        };
        assert_eq!(settings.probe_interval(), Duration::from_millis(250));
        assert_eq!(settings.probe_timeout(), Duration::from_millis(100));
    }
}
