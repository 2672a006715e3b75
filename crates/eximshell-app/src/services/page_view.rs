// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// The `ContentView` the controller talks to, and the driver that pumps its
// commands into the content surface on the UI thread.
//
// Rust -> page: `PageCommand`s (deliver a bridge message, go back, reload).
// Page -> Rust: `PageEvent`s, sent by `BRIDGE_JS` over the wry IPC channel
// plus the native page-load callback.
//
// The hosted page talks to the shell the way it does inside a React Native
// WebView: `window.ReactNativeWebView.postMessage(text)` out, and `message`
// events on `window` and `document` in.

use std::rc::Rc;
use std::sync::{Arc, Mutex, MutexGuard};

use serde::Deserialize;
use tokio::sync::mpsc;

use eximshell_core::error::{Result, ShellError};
use eximshell_shell::{ContentView, NavHistory, ShellHandle};

use super::surface::ContentSurface;

/// Injected into every document before the page's own scripts run.
pub const BRIDGE_JS: &str = r#"
(() => {
  if (window.__eximshell || !window.ipc) return;
  const send = (event) => window.ipc.postMessage(JSON.stringify(event));
  window.__eximshell = {
    deliver(data) {
      const init = { data, origin: location.origin };
      window.dispatchEvent(new MessageEvent("message", init));
      document.dispatchEvent(new MessageEvent("message", init));
    },
  };
  window.ReactNativeWebView = {
    postMessage(data) {
      send({ kind: "message", data: String(data) });
    },
  };
  const pushState = history.pushState;
  history.pushState = function (...args) {
    const result = pushState.apply(this, args);
    send({ kind: "navigate" });
    return result;
  };
  window.addEventListener("popstate", () => send({ kind: "pop" }));
  window.addEventListener("keydown", (e) => {
    if ((e.altKey && e.key === "ArrowLeft") || e.key === "BrowserBack") {
      e.preventDefault();
      send({ kind: "back" });
    }
  });
})();
"#;

/// Instruction for the content surface.
#[derive(Debug, Clone, PartialEq)]
pub enum PageCommand {
    Post { data: String },
    Back,
    Reload,
}

impl PageCommand {
    /// Script to evaluate in the page, or `None` when the surface handles
    /// the command natively.
    pub fn script(&self) -> Option<String> {
        match self {
            // A JSON string literal is a valid JS string literal.
            Self::Post { data } => Some(format!(
                "window.__eximshell && window.__eximshell.deliver({});",
                serde_json::Value::String(data.clone())
            )),
            Self::Back => Some("history.back();".into()),
            Self::Reload => None,
        }
    }
}

/// Report from the content surface.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(tag = "kind", rename_all = "lowercase")]
pub enum PageEvent {
    Message {
        #[serde(default)]
        data: serde_json::Value,
    },
    /// A document finished loading.
    Load,
    /// The page pushed a history entry.
    Navigate,
    /// The page popped a history entry.
    Pop,
    /// A back shortcut was pressed inside the page.
    Back,
}

fn lock(history: &Mutex<NavHistory>) -> MutexGuard<'_, NavHistory> {
    history.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
}

/// `ContentView` handed to the controller.
#[derive(Clone)]
pub struct PageView {
    commands: mpsc::UnboundedSender<PageCommand>,
    events: mpsc::UnboundedSender<PageEvent>,
    history: Arc<Mutex<NavHistory>>,
}

/// The driver's end of a `PageView`.
pub struct PageLink {
    commands: mpsc::UnboundedReceiver<PageCommand>,
    events: mpsc::UnboundedReceiver<PageEvent>,
    history: Arc<Mutex<NavHistory>>,
}

impl PageView {
    pub fn new() -> (Self, PageLink) {
        let (commands_tx, commands_rx) = mpsc::unbounded_channel();
        let (events_tx, events_rx) = mpsc::unbounded_channel();
        let history = Arc::new(Mutex::new(NavHistory::new()));
        (
            Self {
                commands: commands_tx,
                events: events_tx,
                history: Arc::clone(&history),
            },
            PageLink {
                commands: commands_rx,
                events: events_rx,
                history,
            },
        )
    }

    /// Where the content surface reports page events.
    pub fn events(&self) -> mpsc::UnboundedSender<PageEvent> {
        self.events.clone()
    }

    /// The surface was rebuilt (reconnect remount); its history is gone.
    pub fn remounted(&self) {
        lock(&self.history).reset();
    }

    fn send(&self, command: PageCommand) -> Result<()> {
        self.commands
            .send(command)
            .map_err(|_| ShellError::ContentView("page driver is not running".into()))
    }
}

impl ContentView for PageView {
    fn post_message(&self, json: &str) -> Result<()> {
        self.send(PageCommand::Post {
            data: json.to_string(),
        })
    }

    fn go_back(&self) -> bool {
        if !lock(&self.history).go_back() {
            return false;
        }
        match self.send(PageCommand::Back) {
            Ok(()) => true,
            Err(e) => {
                tracing::warn!(error = %e, "back navigation lost");
                false
            }
        }
    }

    /// Reloads the current entry in place; existing history stays.
    fn reload(&self) -> Result<()> {
        lock(&self.history).begin_reload();
        self.send(PageCommand::Reload)
    }
}

/// Page messages are usually strings; anything else is re-serialised.
fn message_text(data: serde_json::Value) -> String {
    match data {
        serde_json::Value::String(text) => text,
        other => other.to_string(),
    }
}

/// Apply one page event to the history and the controller.
fn on_event(history: &Mutex<NavHistory>, shell: &ShellHandle, event: PageEvent) {
    match event {
        PageEvent::Message { data } => shell.content_message(message_text(data)),
        PageEvent::Load => {
            lock(history).on_load();
            shell.content_loaded();
        }
        PageEvent::Navigate => lock(history).on_load(),
        PageEvent::Pop => lock(history).on_pop(),
        PageEvent::Back => {
            shell.back_pressed();
        }
    }
}

enum Step {
    Event(Option<PageEvent>),
    Command(Option<PageCommand>),
}

/// Pump messages between the content surface and the controller until
/// either side goes away. Call from a component future on the UI thread.
pub async fn drive(mut link: PageLink, surface: Rc<ContentSurface>, shell: ShellHandle) {
    tracing::debug!("page driver started");

    loop {
        let step = tokio::select! {
            event = link.events.recv() => Step::Event(event),
            command = link.commands.recv() => Step::Command(command),
        };

        match step {
            Step::Event(Some(event)) => on_event(&link.history, &shell, event),
            Step::Command(Some(command)) => {
                if let Err(e) = surface.run(&command) {
                    tracing::warn!(error = %e, ?command, "could not reach the page");
                }
            }
            Step::Event(None) | Step::Command(None) => break,
        }
    }
    tracing::debug!("page driver stopped");
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn page_events_parse() {
        let event: PageEvent =
            serde_json::from_value(json!({ "kind": "message", "data": "hi" })).unwrap();
        assert_eq!(event, PageEvent::Message { data: json!("hi") });
        let event: PageEvent = serde_json::from_value(json!({ "kind": "pop" })).unwrap();
        assert_eq!(event, PageEvent::Pop);
        assert!(serde_json::from_value::<PageEvent>(json!({ "kind": "resize" })).is_err());
    }

    #[test]
    fn object_messages_are_reserialised() {
        assert_eq!(message_text(json!("raw")), "raw");
        assert_eq!(
            message_text(json!({ "type": "requestImageUpload" })),
            r#"{"type":"requestImageUpload"}"#
        );
    }

    #[test]
    fn delivered_messages_are_quoted_for_the_page() {
        let command = PageCommand::Post {
            data: r#"{"type":"imageUpload","payload":{"uri":"file:///tmp/it's.jpg"}}"#.into(),
        };
        assert_eq!(
            command.script().unwrap(),
            r#"window.__eximshell && window.__eximshell.deliver("{\"type\":\"imageUpload\",\"payload\":{\"uri\":\"file:///tmp/it's.jpg\"}}");"#
        );
        assert_eq!(PageCommand::Reload.script(), None);
    }

    #[test]
    fn bridge_script_speaks_the_react_native_channel() {
        assert!(BRIDGE_JS.contains("window.ReactNativeWebView"));
        assert!(BRIDGE_JS.contains("window.ipc.postMessage"));
    }

    #[test]
    fn back_needs_history_and_a_driver() {
        let (view, link) = PageView::new();
        assert!(!view.go_back());

        lock(&link.history).on_load();
        lock(&link.history).on_load();
        assert!(view.go_back());

        lock(&link.history).on_load();
        lock(&link.history).on_load();
        drop(link);
        assert!(!view.go_back());
        assert!(matches!(view.post_message("{}"), Err(ShellError::ContentView(_))));
    }

    #[test]
    fn reload_keeps_back_history() {
        let (view, mut link) = PageView::new();
        lock(&link.history).on_load();
        lock(&link.history).on_load();

        view.reload().unwrap();
        assert_eq!(link.commands.try_recv().unwrap(), PageCommand::Reload);
        lock(&link.history).on_load();

        assert!(view.go_back());
        assert_eq!(link.commands.try_recv().unwrap(), PageCommand::Back);
    }

    #[test]
    fn in_page_navigation_counts_as_history() {
        let (view, link) = PageView::new();
        let (controller_view, _) = PageView::new();
        let controller = eximshell_shell::ShellController::new(
            eximshell_bridge::platform_bridge(&Default::default()),
            Arc::new(controller_view),
            Default::default(),
        );
        let shell = controller.handle();

        on_event(&link.history, &shell, PageEvent::Load);
        assert!(!view.go_back());
        on_event(&link.history, &shell, PageEvent::Navigate);
        assert!(view.go_back());
        on_event(&link.history, &shell, PageEvent::Pop);
        on_event(&link.history, &shell, PageEvent::Navigate);
        assert!(view.go_back());
    }
}
