// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Unified error types for Eximshell.

use thiserror::Error;

use crate::types::Capability;

/// Top-level error type for all shell operations.
#[derive(Debug, Error)]
pub enum ShellError {
    // -- Permissions --
    #[error("{0} permission denied")]
    PermissionDenied(Capability),

    // -- Bridge protocol --
    #[error("malformed bridge message: {0}")]
    MalformedMessage(String),

    #[error("content view error: {0}")]
    ContentView(String),

    // -- Configuration / persistence --
    #[error("configuration error: {0}")]
    Config(String),

    #[error("file I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    // -- Platform bridge --
    #[error("platform bridge error: {0}")]
    Bridge(String),

    #[error("feature not available on this platform")]
    PlatformUnavailable,
}

/// Alias used throughout the codebase.
pub type Result<T> = std::result::Result<T, ShellError>;
