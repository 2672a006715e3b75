// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Notification service flows.
//
// `register` blocks on the permission prompt and the push provider, so the
// controller runs it on a blocking worker and receives the outcome as an
// event.

use eximshell_bridge::PlatformBridge;
use eximshell_core::alerts;
use eximshell_core::error::{Result, ShellError};
use eximshell_core::types::{Capability, PermissionStatus, PushNotification, PushToken};
use eximshell_core::BridgeMessage;

use crate::event::RegistrationOutcome;

/// Check the notification permission and prompt if it is not granted yet.
///
/// A refusal shows one alert and yields `PermissionDenied`. Nothing retries
/// it later in the session.
pub fn acquire_permission(bridge: &dyn PlatformBridge) -> Result<PermissionStatus> {
    let mut status = bridge.notification_permission()?;
    if !status.is_granted() {
        tracing::debug!(?status, "requesting notification permission");
        status = bridge.request_notification_permission()?;
    }

    if status.is_granted() {
        Ok(status)
    } else {
        let err = ShellError::PermissionDenied(Capability::Notifications);
        if let Some(alert) = alerts::alert_for(&err)
            && let Err(e) = bridge.show_alert(&alert)
        {
            tracing::warn!(error = %e, "could not show notification permission alert");
        }
        Err(err)
    }
}

/// Fetch the push-delivery token. Call only after permission was granted.
pub fn obtain_token(bridge: &dyn PlatformBridge) -> Result<PushToken> {
    bridge.push_token()
}

/// Full registration: permission, then token.
pub fn register(bridge: &dyn PlatformBridge) -> RegistrationOutcome {
    match acquire_permission(bridge) {
        Ok(_) => match obtain_token(bridge) {
            Ok(token) => RegistrationOutcome::Registered(token),
            Err(e) => RegistrationOutcome::Unavailable(e.to_string()),
        },
        Err(ShellError::PermissionDenied(_)) => RegistrationOutcome::Denied,
        Err(e) => RegistrationOutcome::Unavailable(e.to_string()),
    }
}

/// The bridge message carrying a foreground notification into the page.
pub fn forward(notification: PushNotification) -> BridgeMessage {
    BridgeMessage::PushNotification(notification.data)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn forwarded_payload_is_the_notification_data() {
        let content = json!({ "orderId": 7, "status": "ready" });
        let note = PushNotification::new(Some("Order".into()), None, content.clone());
        assert_eq!(forward(note), BridgeMessage::PushNotification(content));
    }
}
