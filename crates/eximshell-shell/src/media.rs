// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Media picker flow. Blocks until the user answers; run it on a worker.

use eximshell_bridge::PlatformBridge;
use eximshell_core::alerts;
use eximshell_core::error::{Result, ShellError};
use eximshell_core::types::{Capability, PickedImage, PickerOptions};

use crate::event::PickerOutcome;

/// Ask for photo-library access. A refusal shows one alert and aborts.
pub fn request_gallery_access(bridge: &dyn PlatformBridge) -> Result<()> {
    if bridge.request_gallery_permission()?.is_granted() {
        return Ok(());
    }
    let err = ShellError::PermissionDenied(Capability::Gallery);
    if let Some(alert) = alerts::alert_for(&err)
        && let Err(e) = bridge.show_alert(&alert)
    {
        tracing::warn!(error = %e, "could not show gallery permission alert");
    }
    Err(err)
}

/// Present the picker once access is granted. `None` means cancelled.
pub fn pick_image(
    bridge: &dyn PlatformBridge,
    options: &PickerOptions,
) -> Result<Option<PickedImage>> {
    request_gallery_access(bridge)?;
    bridge.pick_image(options)
}

/// Run the whole flow and fold the result into an outcome.
pub fn run(bridge: &dyn PlatformBridge, options: &PickerOptions) -> PickerOutcome {
    match pick_image(bridge, options) {
        Ok(Some(image)) => PickerOutcome::Selected(image),
        Ok(None) => PickerOutcome::Cancelled,
        Err(ShellError::PermissionDenied(_)) => PickerOutcome::Denied,
        Err(e) => PickerOutcome::Failed(e.to_string()),
    }
}
