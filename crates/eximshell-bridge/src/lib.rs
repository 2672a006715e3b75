// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>

//! Eximshell: native platform bridge abstractions.
//!
//! This crate defines the capability traits the shell controller talks to and
//! the platform dispatch logic. High-level code reaches iOS (UIKit via objc2),
//! Android (ART via JNI) and desktop (rfd + a reachability probe) through one
//! interface.

pub mod subscription;
pub mod traits;

#[cfg(any(target_os = "ios", target_os = "android"))]
pub mod host;

#[cfg(target_os = "ios")]
pub mod ios;

#[cfg(target_os = "android")]
pub mod android;

#[cfg(not(any(target_os = "ios", target_os = "android")))]
pub mod desktop;

use std::sync::Arc;

use eximshell_core::ShellConfig;

pub use subscription::{BackHandler, Listener, ListenerSlot, Subscription};
pub use traits::PlatformBridge;

/// Builds the bridge implementation for the target operating system.
///
/// RETURNS: a shared trait object (`dyn PlatformBridge`) that hides the
/// underlying native SDK details.
pub fn platform_bridge(config: &ShellConfig) -> Arc<dyn PlatformBridge> {
    #[cfg(target_os = "ios")]
    {
        let _ = config;
        Arc::new(ios::IosBridge::new())
    }
    #[cfg(target_os = "android")]
    {
        let _ = config;
        Arc::new(android::AndroidBridge::new())
    }
    #[cfg(not(any(target_os = "ios", target_os = "android")))]
    {
        // DESKTOP: file dialogs via rfd, reachability via TCP probe.
        Arc::new(desktop::DesktopBridge::new(config.connectivity.clone()))
    }
}
