// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Embedded content view seam.

use eximshell_core::error::Result;

/// The embedded browser view hosting the remote page.
///
/// Page-emitted messages travel the other way, through
/// [`ShellHandle::content_message`](crate::ShellHandle::content_message).
pub trait ContentView: Send + Sync {
    /// Deliver one encoded bridge message into the page.
    fn post_message(&self, json: &str) -> Result<()>;

    /// Navigate to the previous in-page history entry. Returns whether a
    /// navigation was started.
    fn go_back(&self) -> bool;

    /// Re-fetch the current page from the origin.
    fn reload(&self) -> Result<()>;
}

/// Back-stack bookkeeping for views whose history the host cannot read
/// synchronously.
///
/// The view reports finished document loads and in-page history pushes;
/// counting those, minus the ones `go_back` caused and the ones a reload
/// caused, gives the number of entries the view can return to.
#[derive(Debug, Default)]
pub struct NavHistory {
    depth: usize,
    loaded: bool,
    pending_back: bool,
    pending_reload: bool,
}

impl NavHistory {
    pub fn new() -> Self {
        Self::default()
    }

    /// Entries behind the current one.
    pub fn depth(&self) -> usize {
        self.depth
    }

    pub fn can_go_back(&self) -> bool {
        self.depth > 0
    }

    /// A document finished loading, or the page pushed a history entry.
    pub fn on_load(&mut self) {
        if !std::mem::replace(&mut self.loaded, true) {
            self.pending_reload = false;
            return;
        }
        if std::mem::take(&mut self.pending_reload) {
            return;
        }
        if !std::mem::take(&mut self.pending_back) {
            self.depth += 1;
        }
    }

    /// The page popped a history entry without loading a document.
    pub fn on_pop(&mut self) {
        self.pending_back = false;
    }

    /// Claim one history step. Returns `false` on an empty stack.
    pub fn go_back(&mut self) -> bool {
        if self.depth == 0 {
            return false;
        }
        self.depth -= 1;
        self.pending_back = true;
        true
    }

    /// The current entry is being reloaded in place; its next load adds no
    /// entry.
    pub fn begin_reload(&mut self) {
        self.pending_reload = true;
    }

    /// Forget everything; the view was rebuilt.
    pub fn reset(&mut self) {
        *self = Self::default();
    }
}
