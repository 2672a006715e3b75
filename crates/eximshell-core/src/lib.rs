// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Eximshell core types, bridge message codec and error definitions shared
// across all crates.

pub mod alerts;
pub mod config;
pub mod error;
pub mod message;
pub mod types;

pub use config::{CONTENT_ORIGIN, ShellConfig};
pub use error::ShellError;
pub use message::BridgeMessage;
pub use types::*;
