// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Core domain types exchanged between the platform bridge and the shell.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// A platform capability that sits behind an OS permission prompt.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Capability {
    /// Push / local notification delivery.
    Notifications,
    /// Read access to the photo library.
    Gallery,
}

impl std::fmt::Display for Capability {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Notifications => write!(f, "notification"),
            Self::Gallery => write!(f, "gallery"),
        }
    }
}

/// Result of a permission check or prompt.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum PermissionStatus {
    Granted,
    Denied,
    /// The user has not been asked yet.
    Undetermined,
}

impl PermissionStatus {
    pub fn is_granted(self) -> bool {
        matches!(self, Self::Granted)
    }
}

/// Opaque push-delivery token issued by the platform push provider.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PushToken(pub String);

impl std::fmt::Display for PushToken {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// A notification delivered while the app is in the foreground.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PushNotification {
    /// Platform identifier, or a generated UUID when the platform has none.
    pub id: String,
    pub title: Option<String>,
    pub body: Option<String>,
    /// Structured content attached by the sender. This is what the hosted
    /// page receives as the `pushNotification` payload.
    #[serde(default)]
    pub data: serde_json::Value,
    #[serde(default = "Utc::now")]
    pub received_at: DateTime<Utc>,
}

impl PushNotification {
    /// Build a notification with a fresh identifier, stamped now.
    pub fn new(title: Option<String>, body: Option<String>, data: serde_json::Value) -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            title,
            body,
            data,
            received_at: Utc::now(),
        }
    }
}

/// Action identifier reported for a plain tap on a notification.
pub const DEFAULT_ACTION: &str = "default";

/// The user tapped (or otherwise acted on) a delivered notification.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NotificationResponse {
    pub notification_id: String,
    /// Platform action identifier; the default tap action on most platforms.
    pub action: String,
    #[serde(default = "Utc::now")]
    pub received_at: DateTime<Utc>,
}

impl NotificationResponse {
    pub fn new(notification_id: impl Into<String>, action: impl Into<String>) -> Self {
        Self {
            notification_id: notification_id.into(),
            action: action.into(),
            received_at: Utc::now(),
        }
    }
}

/// Which kind of media the picker offers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum MediaKind {
    Images,
}

/// Options passed to the native image picker.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PickerOptions {
    pub media: MediaKind,
    /// Let the user crop/edit before confirming.
    pub allows_editing: bool,
    /// Encoder quality in `0.0..=1.0`; `1.0` means no compression.
    pub quality: f32,
}

impl Default for PickerOptions {
    fn default() -> Self {
        Self {
            media: MediaKind::Images,
            allows_editing: true,
            quality: 1.0,
        }
    }
}

/// A single image chosen by the user.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PickedImage {
    /// Local reference (`file://` or `content://` URI) to the image.
    pub uri: String,
}
