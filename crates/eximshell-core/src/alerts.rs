// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// User-visible alert texts.
//
// Only permission denials interrupt the user. Everything else the shell can
// fail at is logged and swallowed, so `alert_for` returns `None` for it.

use crate::error::ShellError;
use crate::types::Capability;

/// Title and body of a blocking platform alert.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UserAlert {
    pub title: String,
    pub message: String,
}

impl UserAlert {
    pub fn new(title: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            message: message.into(),
        }
    }
}

/// Alert shown when the user refuses `capability`.
pub fn permission_denied(capability: Capability) -> UserAlert {
    match capability {
        Capability::Notifications => UserAlert::new(
            "Permission Denied",
            "Enable notifications in settings to receive updates.",
        ),
        Capability::Gallery => {
            UserAlert::new("Permission required", "We need access to your gallery.")
        }
    }
}

/// Map an error to the alert the user should see, if any.
pub fn alert_for(err: &ShellError) -> Option<UserAlert> {
    match err {
        ShellError::PermissionDenied(capability) => Some(permission_denied(*capability)),
        _ => None,
    }
}
