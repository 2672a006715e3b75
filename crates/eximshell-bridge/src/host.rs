// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Host inbox: results that only the host app can produce.
//
// Permission prompts, push tokens, picker results on Android, notification
// delivery and back presses all arrive on the Kotlin activity / Swift app
// delegate side. Host glue forwards them through the exported entry points in
// `android` / `ios`, which land here. Bridge methods that wait for one of
// these block on the matching condvar or channel.

use std::collections::HashMap;
use std::sync::mpsc;
use std::sync::{Condvar, Mutex, MutexGuard, OnceLock};

use eximshell_core::config::WebViewSettings;
use eximshell_core::types::{
    Capability, NotificationResponse, PermissionStatus, PickedImage, PushNotification, PushToken,
};

use crate::subscription::ListenerSlot;

#[derive(Default)]
struct PermissionBook {
    /// Latest reported status and how many reports have arrived.
    entries: HashMap<Capability, (u64, PermissionStatus)>,
}

/// Process-wide mailbox between host glue and the Rust bridge.
pub struct HostInbox {
    permissions: Mutex<PermissionBook>,
    permission_reported: Condvar,
    push_token: Mutex<Option<PushToken>>,
    token_reported: Condvar,
    picker: Mutex<Option<mpsc::Sender<Option<PickedImage>>>>,
    content_settings: Mutex<Option<WebViewSettings>>,
    pub(crate) connectivity: ListenerSlot<dyn Fn(bool) + Send + Sync>,
    pub(crate) notifications: ListenerSlot<dyn Fn(PushNotification) + Send + Sync>,
    pub(crate) responses: ListenerSlot<dyn Fn(NotificationResponse) + Send + Sync>,
    pub(crate) back: ListenerSlot<dyn Fn() -> bool + Send + Sync>,
}

/// The inbox shared by the bridge and the exported entry points.
pub fn inbox() -> &'static HostInbox {
    static INBOX: OnceLock<HostInbox> = OnceLock::new();
    INBOX.get_or_init(HostInbox::new)
}

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
}

impl HostInbox {
    fn new() -> Self {
        Self {
            permissions: Mutex::new(PermissionBook::default()),
            permission_reported: Condvar::new(),
            push_token: Mutex::new(None),
            token_reported: Condvar::new(),
            picker: Mutex::new(None),
            content_settings: Mutex::new(None),
            connectivity: ListenerSlot::new("connectivity"),
            notifications: ListenerSlot::new("foreground-notification"),
            responses: ListenerSlot::new("notification-response"),
            back: ListenerSlot::new("back-button"),
        }
    }

    // -- Permissions ---------------------------------------------------------

    /// Last status the host reported, `Undetermined` if none yet.
    pub fn permission(&self, capability: Capability) -> PermissionStatus {
        lock(&self.permissions)
            .entries
            .get(&capability)
            .map_or(PermissionStatus::Undetermined, |(_, status)| *status)
    }

    /// Marker to pass to [`HostInbox::wait_permission_after`]. Take it
    /// *before* asking the host to prompt so a fast answer is not missed.
    pub fn permission_marker(&self, capability: Capability) -> u64 {
        lock(&self.permissions)
            .entries
            .get(&capability)
            .map_or(0, |(count, _)| *count)
    }

    /// Block until the host reports `capability` again after `marker`.
    pub fn wait_permission_after(&self, capability: Capability, marker: u64) -> PermissionStatus {
        let mut book = lock(&self.permissions);
        loop {
            if let Some((count, status)) = book.entries.get(&capability)
                && *count > marker
            {
                return *status;
            }
            book = self
                .permission_reported
                .wait(book)
                .unwrap_or_else(|poisoned| poisoned.into_inner());
        }
    }

    pub fn report_permission(&self, capability: Capability, granted: bool) {
        let status = if granted {
            PermissionStatus::Granted
        } else {
            PermissionStatus::Denied
        };
        tracing::info!(%capability, ?status, "host reported permission");
        {
            let mut book = lock(&self.permissions);
            let entry = book.entries.entry(capability).or_insert((0, status));
            entry.0 += 1;
            entry.1 = status;
        }
        self.permission_reported.notify_all();
    }

    // -- Push token ----------------------------------------------------------

    pub fn report_push_token(&self, token: PushToken) {
        *lock(&self.push_token) = Some(token);
        self.token_reported.notify_all();
    }

    /// Block until the host has registered with the push provider.
    pub fn wait_push_token(&self) -> PushToken {
        let mut token = lock(&self.push_token);
        loop {
            if let Some(token) = token.as_ref() {
                return token.clone();
            }
            token = self
                .token_reported
                .wait(token)
                .unwrap_or_else(|poisoned| poisoned.into_inner());
        }
    }

    // -- Content view ---------------------------------------------------------

    /// Settings the host should build its web view with.
    pub fn set_content_settings(&self, settings: WebViewSettings) {
        *lock(&self.content_settings) = Some(settings);
    }

    /// `None` until the shell has mounted.
    pub fn content_settings(&self) -> Option<WebViewSettings> {
        lock(&self.content_settings).clone()
    }

    // -- Image picker --------------------------------------------------------

    /// Open a one-shot channel for the next picker result. A previous,
    /// unanswered pick is abandoned.
    pub fn begin_pick(&self) -> mpsc::Receiver<Option<PickedImage>> {
        let (tx, rx) = mpsc::channel();
        if lock(&self.picker).replace(tx).is_some() {
            tracing::warn!("previous image pick abandoned");
        }
        rx
    }

    /// Deliver the picker outcome. `None` means the user cancelled.
    pub fn report_pick(&self, uri: Option<String>) {
        match lock(&self.picker).take() {
            Some(tx) => {
                let _ = tx.send(uri.map(|uri| PickedImage { uri }));
            }
            None => tracing::warn!("picker result arrived with no pick pending"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    #[test]
    fn permission_wait_sees_reports_after_marker() {
        let inbox = Arc::new(HostInbox::new());
        inbox.report_permission(Capability::Gallery, false);
        let marker = inbox.permission_marker(Capability::Gallery);

        let host = Arc::clone(&inbox);
        let answer = std::thread::spawn(move || {
            host.report_permission(Capability::Gallery, true);
        });
        let status = inbox.wait_permission_after(Capability::Gallery, marker);
        answer.join().unwrap();
        assert_eq!(status, PermissionStatus::Granted);
    }

    #[test]
    fn unreported_permission_is_undetermined() {
        let inbox = HostInbox::new();
        assert_eq!(
            inbox.permission(Capability::Notifications),
            PermissionStatus::Undetermined
        );
    }

    #[test]
    fn pick_result_is_delivered_once() {
        let inbox = HostInbox::new();
        let rx = inbox.begin_pick();
        inbox.report_pick(Some("content://media/1".into()));
        inbox.report_pick(Some("content://media/2".into()));
        assert_eq!(rx.recv().unwrap().unwrap().uri, "content://media/1");
    }
}
