// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Connectivity monitor: turns native reachability reports into events.

use tokio::sync::mpsc::UnboundedSender;

use eximshell_bridge::{Listener, PlatformBridge, Subscription};
use eximshell_core::error::ShellError;

use crate::event::ShellEvent;

/// Subscribe to reachability changes.
///
/// Returns `None` when the platform cannot report status; the shell then
/// stays in its initial connected state.
pub fn watch(
    bridge: &dyn PlatformBridge,
    events: UnboundedSender<ShellEvent>,
) -> Option<Subscription> {
    let listener: Listener<bool> = Box::new(move |online| {
        let _ = events.send(ShellEvent::ConnectivityChanged(online));
    });

    match bridge.watch_connectivity(listener) {
        Ok(subscription) => Some(subscription),
        Err(ShellError::PlatformUnavailable) => {
            tracing::info!(
                platform = bridge.platform_name(),
                "reachability not observable, assuming connected"
            );
            None
        }
        Err(e) => {
            tracing::warn!(error = %e, "connectivity watch failed, assuming connected");
            None
        }
    }
}
