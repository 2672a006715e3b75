// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Platform-agnostic trait definitions for native capabilities.
//
// Calls that wait on the user (permission prompts, the image picker, alerts)
// block the calling thread until the user answers. The shell only invokes them
// from blocking worker threads, never from its event loop.

use eximshell_core::alerts::UserAlert;
use eximshell_core::config::WebViewSettings;
use eximshell_core::error::Result;
use eximshell_core::types::{
    NotificationResponse, PermissionStatus, PickedImage, PickerOptions, PushNotification,
    PushToken,
};

use crate::subscription::{BackHandler, Listener, Subscription};

/// Unified bridge that groups all native capabilities the shell needs.
pub trait PlatformBridge:
    NativeConnectivity
    + NativeNotifications
    + NativeMediaPicker
    + NativeAlert
    + NativeBackButton
    + NativeContentSettings
    + Send
    + Sync
{
    /// Human-readable platform name (e.g. "iOS", "Android").
    fn platform_name(&self) -> &str;
}

/// Network reachability.
pub trait NativeConnectivity {
    /// Start observing reachability. The listener gets `true`/`false` on each
    /// change; implementations may deliver the current value right away.
    ///
    /// Platforms that cannot observe reachability return
    /// `ShellError::PlatformUnavailable`; callers then assume connected.
    fn watch_connectivity(&self, listener: Listener<bool>) -> Result<Subscription>;
}

/// Push notifications.
pub trait NativeNotifications {
    /// Current permission, without prompting.
    fn notification_permission(&self) -> Result<PermissionStatus>;

    /// Show the OS prompt and block until the user answers.
    fn request_notification_permission(&self) -> Result<PermissionStatus>;

    /// Delivery token from the push provider. Requires granted permission.
    fn push_token(&self) -> Result<PushToken>;

    /// Notifications arriving while the app is in the foreground.
    /// Re-registering replaces the previous listener.
    fn on_foreground_notification(&self, listener: Listener<PushNotification>) -> Subscription;

    /// The user tapped or acted on a delivered notification.
    fn on_notification_response(&self, listener: Listener<NotificationResponse>)
    -> Subscription;
}

/// Photo library access.
pub trait NativeMediaPicker {
    /// Ask for read access to the photo library; blocks until answered.
    fn request_gallery_permission(&self) -> Result<PermissionStatus>;

    /// Present the system image picker and block until the user picks one
    /// image (`Ok(Some(..))`) or cancels (`Ok(None)`).
    fn pick_image(&self, options: &PickerOptions) -> Result<Option<PickedImage>>;
}

/// Blocking OS alert with a single dismiss button.
pub trait NativeAlert {
    fn show_alert(&self, alert: &UserAlert) -> Result<()>;
}

/// Hardware / system back control.
pub trait NativeBackButton {
    /// Intercept back presses. When the handler returns `false` the press
    /// falls through to the OS default (usually leaving the app).
    fn on_back_pressed(&self, handler: BackHandler) -> Subscription;
}

/// Web view configuration owned by the platform host.
pub trait NativeContentSettings {
    /// Push the content view capabilities to whatever builds the platform
    /// web view. Platforms whose view is configured elsewhere return `Ok`.
    fn apply_content_settings(&self, settings: &WebViewSettings) -> Result<()>;
}
