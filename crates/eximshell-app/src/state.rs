// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Global application state: reactive signals for the Dioxus UI.

use eximshell_core::config::WebViewSettings;
use eximshell_shell::ShellState;

use crate::services::app_services::AppServices;

/// Shared state accessible to all pages via `use_context`.
#[derive(Debug, Clone)]
pub struct AppState {
    /// Mirror of the controller's published state.
    pub shell: ShellState,
    /// Content view capabilities from the configuration.
    pub webview: WebViewSettings,
}

impl AppState {
    /// Create initial state from the shell services.
    pub fn new(svc: &AppServices) -> Self {
        Self {
            shell: svc.shell().state(),
            webview: svc.config().webview.clone(),
        }
    }
}
