// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Events processed by the controller loop.

use eximshell_core::types::{NotificationResponse, PickedImage, PushNotification, PushToken};

/// How an image pick ended.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PickerOutcome {
    Selected(PickedImage),
    Cancelled,
    /// Gallery access refused; the user has already been alerted.
    Denied,
    Failed(String),
}

/// How push registration ended.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RegistrationOutcome {
    Registered(PushToken),
    /// Permission refused; the user has already been alerted.
    Denied,
    /// Permission granted but no token could be obtained.
    Unavailable(String),
}

/// One unit of work for the controller.
#[derive(Debug, Clone)]
pub enum ShellEvent {
    ConnectivityChanged(bool),
    NotificationReceived(PushNotification),
    NotificationInteraction(NotificationResponse),
    /// Raw text the page sent through its message channel.
    ContentMessage(String),
    /// The content view finished loading a document.
    ContentLoaded,
    RefreshRequested,
    PickerFinished(PickerOutcome),
    PushRegistration(RegistrationOutcome),
    Teardown,
}

impl ShellEvent {
    /// Stable name used in logs and by [`ShellController::step`](crate::ShellController::step).
    pub fn name(&self) -> &'static str {
        match self {
            Self::ConnectivityChanged(_) => "connectivity-changed",
            Self::NotificationReceived(_) => "notification-received",
            Self::NotificationInteraction(_) => "notification-interaction",
            Self::ContentMessage(_) => "content-message",
            Self::ContentLoaded => "content-loaded",
            Self::RefreshRequested => "refresh-requested",
            Self::PickerFinished(_) => "picker-finished",
            Self::PushRegistration(_) => "push-registration",
            Self::Teardown => "teardown",
        }
    }
}
