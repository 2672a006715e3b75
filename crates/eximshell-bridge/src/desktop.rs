// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Desktop bridge for development builds and CI.
//
// Desktop has no push provider and no gallery permission model. The picker
// and alerts go through rfd's async dialogs (safe to drive from any thread),
// and reachability is a periodic TCP probe against the content origin.

use std::path::Path;

use eximshell_core::CONTENT_ORIGIN;
use eximshell_core::alerts::UserAlert;
use eximshell_core::config::{ConnectivitySettings, WebViewSettings};
use eximshell_core::error::{Result, ShellError};
use eximshell_core::types::{
    NotificationResponse, PermissionStatus, PickedImage, PickerOptions, PushNotification,
    PushToken,
};

use crate::subscription::{BackHandler, Listener, ListenerSlot, Subscription};
use crate::traits::*;

const IMAGE_EXTENSIONS: &[&str] = &["jpg", "jpeg", "png", "gif", "webp", "bmp", "heic"];

/// Bridge used on Linux, macOS and Windows.
pub struct DesktopBridge {
    settings: ConnectivitySettings,
    probe_target: Option<String>,
    connectivity: ListenerSlot<dyn Fn(bool) + Send + Sync>,
    notifications: ListenerSlot<dyn Fn(PushNotification) + Send + Sync>,
    responses: ListenerSlot<dyn Fn(NotificationResponse) + Send + Sync>,
    back: ListenerSlot<dyn Fn() -> bool + Send + Sync>,
}

impl DesktopBridge {
    pub fn new(settings: ConnectivitySettings) -> Self {
        Self {
            settings,
            probe_target: probe_target(CONTENT_ORIGIN),
            connectivity: ListenerSlot::new("connectivity"),
            notifications: ListenerSlot::new("foreground-notification"),
            responses: ListenerSlot::new("notification-response"),
            back: ListenerSlot::new("back-button"),
        }
    }

    /// Deliver a locally generated notification as if the push provider had
    /// sent it. Returns `false` when no listener is registered.
    pub fn deliver_notification(&self, notification: PushNotification) -> bool {
        self.notifications.emit(notification)
    }
}

impl PlatformBridge for DesktopBridge {
    fn platform_name(&self) -> &str {
        "Desktop"
    }
}

impl NativeConnectivity for DesktopBridge {
    fn watch_connectivity(&self, listener: Listener<bool>) -> Result<Subscription> {
        let Some(target) = self.probe_target.clone() else {
            return Err(ShellError::PlatformUnavailable);
        };
        let runtime = tokio::runtime::Handle::try_current()
            .map_err(|e| ShellError::Bridge(format!("connectivity probe needs a runtime: {e}")))?;

        let registration = self.connectivity.register(listener);
        let slot = self.connectivity.clone();
        let interval = self.settings.probe_interval();
        let timeout = self.settings.probe_timeout();

        tracing::info!(%target, ?interval, "Desktop: starting reachability probe");

        let task = runtime.spawn(async move {
            let mut last = None;
            loop {
                let online = probe(&target, timeout).await;
                if last != Some(online) {
                    tracing::debug!(online, "Desktop: reachability changed");
                    last = Some(online);
                    slot.emit(online);
                }
                tokio::time::sleep(interval).await;
            }
        });

        Ok(Subscription::new("connectivity", move || {
            task.abort();
            registration.release();
        }))
    }
}

impl NativeNotifications for DesktopBridge {
    fn notification_permission(&self) -> Result<PermissionStatus> {
        Ok(PermissionStatus::Granted)
    }

    fn request_notification_permission(&self) -> Result<PermissionStatus> {
        Ok(PermissionStatus::Granted)
    }

    fn push_token(&self) -> Result<PushToken> {
        tracing::warn!("NativeNotifications::push_token: no push provider on desktop");
        Err(ShellError::PlatformUnavailable)
    }

    fn on_foreground_notification(&self, listener: Listener<PushNotification>) -> Subscription {
        self.notifications.register(listener)
    }

    fn on_notification_response(
        &self,
        listener: Listener<NotificationResponse>,
    ) -> Subscription {
        self.responses.register(listener)
    }
}

impl NativeMediaPicker for DesktopBridge {
    fn request_gallery_permission(&self) -> Result<PermissionStatus> {
        Ok(PermissionStatus::Granted)
    }

    /// Desktop dialogs cannot crop; `allows_editing` and `quality` are ignored
    /// and the original file is returned untouched.
    fn pick_image(&self, options: &PickerOptions) -> Result<Option<PickedImage>> {
        let runtime = tokio::runtime::Handle::try_current()
            .map_err(|e| ShellError::Bridge(format!("file dialog needs a runtime: {e}")))?;

        tracing::info!(media = ?options.media, "Desktop: opening image file dialog");

        let picked = runtime.block_on(
            rfd::AsyncFileDialog::new()
                .set_title("Choose an image")
                .add_filter("Images", IMAGE_EXTENSIONS)
                .pick_file(),
        );

        Ok(picked.map(|handle| PickedImage {
            uri: file_uri(handle.path()),
        }))
    }
}

impl NativeAlert for DesktopBridge {
    fn show_alert(&self, alert: &UserAlert) -> Result<()> {
        let runtime = tokio::runtime::Handle::try_current()
            .map_err(|e| ShellError::Bridge(format!("message dialog needs a runtime: {e}")))?;

        tracing::info!(title = %alert.title, "Desktop: showing alert");

        runtime.block_on(
            rfd::AsyncMessageDialog::new()
                .set_level(rfd::MessageLevel::Warning)
                .set_title(alert.title.as_str())
                .set_description(alert.message.as_str())
                .set_buttons(rfd::MessageButtons::Ok)
                .show(),
        );
        Ok(())
    }
}

impl NativeBackButton for DesktopBridge {
    /// Desktop has no system back control; the UI routes keyboard shortcuts
    /// through the shell handle instead. The handler is still held so
    /// registration semantics match mobile.
    fn on_back_pressed(&self, handler: BackHandler) -> Subscription {
        self.back.register(handler)
    }
}

impl NativeContentSettings for DesktopBridge {
    /// The desktop content view is a wry child view built by the app, which
    /// reads the settings from the config itself.
    fn apply_content_settings(&self, settings: &WebViewSettings) -> Result<()> {
        tracing::debug!(?settings, "desktop content settings are applied by the view");
        Ok(())
    }
}

/// One reachability check: can we open TCP to the origin within `timeout`?
async fn probe(target: &str, timeout: std::time::Duration) -> bool {
    matches!(
        tokio::time::timeout(timeout, tokio::net::TcpStream::connect(target)).await,
        Ok(Ok(_))
    )
}

/// `host:port` to probe for an `http(s)://host[:port]/...` origin.
fn probe_target(origin: &str) -> Option<String> {
    let (scheme, rest) = origin.split_once("://")?;
    let default_port = match scheme {
        "https" => 443,
        "http" => 80,
        _ => return None,
    };
    let authority = rest.split('/').next().filter(|a| !a.is_empty())?;
    if authority.contains(':') {
        Some(authority.to_string())
    } else {
        Some(format!("{authority}:{default_port}"))
    }
}

/// `file://` URI for a local path.
fn file_uri(path: &Path) -> String {
    let text = path.to_string_lossy().replace('\\', "/");
    if text.starts_with('/') {
        format!("file://{text}")
    } else {
        format!("file:///{text}")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;
    use std::sync::atomic::{AtomicUsize, Ordering};

    #[test]
    fn probe_target_for_content_origin() {
        assert_eq!(probe_target(CONTENT_ORIGIN).as_deref(), Some("eximbd.com.my:443"));
    }

    #[test]
    fn probe_target_keeps_explicit_port() {
        assert_eq!(
            probe_target("http://localhost:8080/app").as_deref(),
            Some("localhost:8080")
        );
        assert_eq!(probe_target("ftp://example.com/"), None);
        assert_eq!(probe_target("https:///"), None);
    }

    #[test]
    fn file_uri_forms() {
        assert_eq!(file_uri(Path::new("/tmp/a b.png")), "file:///tmp/a b.png");
        assert_eq!(
            file_uri(Path::new("C:\\Users\\me\\cat.jpg")),
            "file:///C:/Users/me/cat.jpg"
        );
    }

    #[test]
    fn desktop_has_no_push_token() {
        let bridge = DesktopBridge::new(ConnectivitySettings::default());
        assert!(matches!(bridge.push_token(), Err(ShellError::PlatformUnavailable)));
        assert!(bridge.notification_permission().unwrap().is_granted());
    }

    #[test]
    fn local_notifications_reach_the_listener() {
        let bridge = DesktopBridge::new(ConnectivitySettings::default());
        let hits = Arc::new(AtomicUsize::new(0));
        let sink = Arc::clone(&hits);
        let sub = bridge.on_foreground_notification(Box::new(move |_| {
            sink.fetch_add(1, Ordering::SeqCst);
        }));
        let note = PushNotification::new(Some("Hi".into()), None, serde_json::Value::Null);
        assert!(bridge.deliver_notification(note.clone()));
        sub.release();
        assert!(!bridge.deliver_notification(note));
        assert_eq!(hits.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn connectivity_watch_requires_runtime() {
        let bridge = DesktopBridge::new(ConnectivitySettings::default());
        let result = bridge.watch_connectivity(Box::new(|_| {}));
        assert!(matches!(result, Err(ShellError::Bridge(_))));
    }

    #[tokio::test]
    async fn releasing_connectivity_watch_unregisters() {
        let bridge = DesktopBridge::new(ConnectivitySettings::default());
        let sub = bridge.watch_connectivity(Box::new(|_| {})).unwrap();
        assert!(bridge.connectivity.is_registered());
        sub.release();
        assert!(!bridge.connectivity.is_registered());
    }
}
