// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Central service layer. Loads the configuration, builds the platform bridge
// and the shell controller, and hands the UI what it needs to drive them.
//
// The controller itself is moved onto its own task by `start_shell`; the UI
// only ever talks to it through the cloneable `ShellHandle`.

use std::sync::{Arc, Mutex};

use eximshell_core::ShellConfig;
use eximshell_core::error::Result;
use eximshell_shell::{ShellController, ShellHandle};
use tracing::{info, warn};

use super::data_dir;
use super::page_view::{PageLink, PageView};

/// Shared application services accessible from all Dioxus components via
/// `use_context::<AppServices>()`.
///
/// All fields are cheaply cloneable (Arc-wrapped) so that the struct can be
/// passed into closures and async blocks without lifetime issues.
#[derive(Clone)]
pub struct AppServices {
    config: Arc<ShellConfig>,
    platform: Arc<str>,
    shell: ShellHandle,
    page: PageView,
    page_link: Arc<Mutex<Option<PageLink>>>,
    controller: Arc<Mutex<Option<ShellController>>>,
}

impl AppServices {
    /// Initialise all services. Call once at app startup.
    ///
    /// Reads `config.json` from the data directory, writing the defaults
    /// there on first launch.
    pub fn init() -> Result<Self> {
        let dir = data_dir::data_dir();
        info!(path = %dir.display(), "initialising shell services");
        let config = ShellConfig::load_or_init(&dir)?;
        Ok(Self::assemble(config))
    }

    /// Services on built-in defaults, for when the data directory is unusable.
    pub fn fallback() -> Self {
        warn!("using default configuration without persistence");
        Self::assemble(ShellConfig::default())
    }

    fn assemble(config: ShellConfig) -> Self {
        if !config.webview.is_fully_permissive() {
            info!(settings = ?config.webview, "content view restricted by configuration");
        }

        let bridge = eximshell_bridge::platform_bridge(&config);
        let platform: Arc<str> = Arc::from(bridge.platform_name());
        let (page, page_link) = PageView::new();
        let controller = ShellController::new(bridge, Arc::new(page.clone()), config.clone());
        let shell = controller.handle();

        Self {
            config: Arc::new(config),
            platform,
            shell,
            page,
            page_link: Arc::new(Mutex::new(Some(page_link))),
            controller: Arc::new(Mutex::new(Some(controller))),
        }
    }

    pub fn config(&self) -> &ShellConfig {
        &self.config
    }

    pub fn platform(&self) -> &str {
        &self.platform
    }

    pub fn shell(&self) -> &ShellHandle {
        &self.shell
    }

    pub fn page(&self) -> &PageView {
        &self.page
    }

    /// The driver end of the content view. Only the first caller gets it.
    pub fn take_page_link(&self) -> Option<PageLink> {
        self.page_link
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .take()
    }

    /// Mount the controller and run its event loop on a background task.
    /// Later calls do nothing.
    pub fn start_shell(&self) {
        let controller = self
            .controller
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .take();
        match controller {
            Some(controller) => {
                tokio::spawn(controller.run());
            }
            None => warn!("shell controller already started"),
        }
    }
}
