// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Content surface: a wry child web view laid over the app window below the
// toolbar, with the origin as its top-level document.
//
// Lives on the UI thread. It is created when the shell shows the content,
// dropped for the offline placeholder, and rebuilt whenever the mount epoch
// changes.

use std::cell::{Cell, RefCell};
use std::sync::Arc;

use dioxus::desktop::tao::window::Window;
use dioxus::desktop::wry::{self, PageLoadEvent, WebView, WebViewBuilder};
use tokio::sync::mpsc;

use eximshell_core::CONTENT_ORIGIN;
use eximshell_core::config::WebViewSettings;
use eximshell_core::error::{Result, ShellError};

use super::page_view::{BRIDGE_JS, PageCommand, PageEvent};

/// Height of the toolbar row in logical pixels.
pub const TOOLBAR_HEIGHT: f64 = 40.0;

/// Height of the "Refreshing..." bar in logical pixels.
pub const REFRESH_BAR_HEIGHT: f64 = 24.0;

fn view_err(context: &str, e: wry::Error) -> ShellError {
    ShellError::ContentView(format!("{context}: {e}"))
}

/// Options for the builder derived from `WebViewSettings`. Engines behind
/// wry offer no file-URL or mixed-content switches.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct EngineOptions {
    javascript_disabled: bool,
    incognito: bool,
}

impl From<&WebViewSettings> for EngineOptions {
    fn from(settings: &WebViewSettings) -> Self {
        Self {
            javascript_disabled: !settings.javascript_enabled,
            incognito: !settings.dom_storage_enabled,
        }
    }
}

/// Vertical placement `(top, height)` of the surface in a window
/// `window_height` tall, below `offset` pixels of app chrome.
fn placement(window_height: f64, offset: f64) -> (f64, f64) {
    let top = offset.clamp(0.0, window_height.max(0.0));
    (top, window_height - top)
}

pub struct ContentSurface {
    window: Arc<Window>,
    options: EngineOptions,
    events: mpsc::UnboundedSender<PageEvent>,
    webview: RefCell<Option<(u64, WebView)>>,
    offset: Cell<f64>,
}

impl ContentSurface {
    pub fn new(
        window: Arc<Window>,
        settings: &WebViewSettings,
        events: mpsc::UnboundedSender<PageEvent>,
    ) -> Self {
        Self {
            window,
            options: EngineOptions::from(settings),
            events,
            webview: RefCell::new(None),
            offset: Cell::new(TOOLBAR_HEIGHT),
        }
    }

    /// Show the content for `mount`, building a fresh view when the epoch
    /// differs from the one on screen.
    pub fn show(&self, mount: u64) -> Result<()> {
        let mut slot = self.webview.borrow_mut();
        if let Some((current, _)) = slot.as_ref() {
            if *current == mount {
                return Ok(());
            }
        }
        // Drop the old view before the new one attaches to the window.
        slot.take();
        let webview = self.build()?;
        tracing::info!(mount, origin = CONTENT_ORIGIN, "content surface mounted");
        *slot = Some((mount, webview));
        Ok(())
    }

    /// Remove the view; the offline placeholder shows through.
    pub fn hide(&self) {
        if self.webview.borrow_mut().take().is_some() {
            tracing::info!("content surface removed");
        }
    }

    /// Move the top edge to `offset` logical pixels and refit.
    pub fn set_offset(&self, offset: f64) {
        self.offset.set(offset);
        self.fit();
    }

    /// Resize the view to the window.
    pub fn fit(&self) {
        if let Some((_, webview)) = self.webview.borrow().as_ref() {
            if let Err(e) = webview.set_bounds(self.bounds()) {
                tracing::warn!(error = %e, "content surface could not be resized");
            }
        }
    }

    /// Carry out one command from the controller.
    pub fn run(&self, command: &PageCommand) -> Result<()> {
        let slot = self.webview.borrow();
        let Some((_, webview)) = slot.as_ref() else {
            return Err(ShellError::ContentView("content surface is not mounted".into()));
        };
        match command.script() {
            Some(script) => webview
                .evaluate_script(&script)
                .map_err(|e| view_err("evaluate_script", e)),
            None => webview.reload().map_err(|e| view_err("reload", e)),
        }
    }

    fn bounds(&self) -> wry::Rect {
        let size = self
            .window
            .inner_size()
            .to_logical::<f64>(self.window.scale_factor());
        let (top, height) = placement(size.height, self.offset.get());
        wry::Rect {
            position: wry::dpi::Position::Logical(wry::dpi::LogicalPosition::new(0.0, top)),
            size: wry::dpi::Size::Logical(wry::dpi::LogicalSize::new(size.width, height)),
        }
    }

    fn build(&self) -> Result<WebView> {
        let ipc_events = self.events.clone();
        let load_events = self.events.clone();

        let mut builder = WebViewBuilder::new()
            .with_url(CONTENT_ORIGIN)
            .with_initialization_script(BRIDGE_JS)
            .with_ipc_handler(move |request| {
                match serde_json::from_str::<PageEvent>(request.body()) {
                    Ok(event) => {
                        if ipc_events.send(event).is_err() {
                            tracing::debug!("page driver gone, event dropped");
                        }
                    }
                    Err(e) => tracing::warn!(error = %e, "unreadable event from the page"),
                }
            })
            .with_on_page_load_handler(move |event, url| {
                if let PageLoadEvent::Finished = event {
                    tracing::debug!(%url, "page loaded");
                    if load_events.send(PageEvent::Load).is_err() {
                        tracing::debug!("page driver gone, load dropped");
                    }
                }
            })
            .with_incognito(self.options.incognito)
            .with_clipboard(true)
            .with_devtools(cfg!(debug_assertions))
            .with_bounds(self.bounds());
        if self.options.javascript_disabled {
            builder = builder.with_javascript_disabled();
        }

        builder
            .build_as_child(&*self.window)
            .map_err(|e| view_err("build_as_child", e))
    }
}
