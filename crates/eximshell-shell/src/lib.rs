// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>

//! Eximshell: shell controller.
//!
//! Composes the platform bridge and the embedded content view: decides
//! between the content and the offline placeholder, relays native events into
//! the page and page requests into native actions. Every event is handled by
//! one loop, one at a time; flows that wait on the user run on blocking
//! workers and report back through the same loop.

pub mod connectivity;
pub mod content;
pub mod controller;
pub mod event;
pub mod media;
pub mod notifications;
pub mod state;

pub use content::{ContentView, NavHistory};
pub use controller::{BackNavigator, ShellController, ShellHandle};
pub use event::{PickerOutcome, RegistrationOutcome, ShellEvent};
pub use state::{Connectivity, Screen, ShellState};
