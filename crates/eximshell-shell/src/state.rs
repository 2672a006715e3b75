// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Shell UI state.
//
// The controller owns the only mutable copy and changes it through the named
// transitions below; the UI observes published snapshots.

/// Latest reachability reported by the connectivity monitor.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Connectivity {
    /// Also the starting value: the shell fails open.
    #[default]
    Online,
    Offline,
}

/// What the UI should render.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Screen {
    /// The content view. A new `mount` value means a fresh view that loads
    /// the origin again.
    Online { mount: u64 },
    /// The placeholder with icon and explanatory text.
    Offline,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct ShellState {
    connectivity: Connectivity,
    refreshing: bool,
    mount_epoch: u64,
}

impl ShellState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn connectivity(&self) -> Connectivity {
        self.connectivity
    }

    pub fn is_online(&self) -> bool {
        self.connectivity == Connectivity::Online
    }

    /// Whether the refresh indicator is showing.
    pub fn is_refreshing(&self) -> bool {
        self.refreshing
    }

    pub fn mount_epoch(&self) -> u64 {
        self.mount_epoch
    }

    pub fn screen(&self) -> Screen {
        match self.connectivity {
            Connectivity::Online => Screen::Online {
                mount: self.mount_epoch,
            },
            Connectivity::Offline => Screen::Offline,
        }
    }

    /// Record a reachability report. Returns `true` when the state changed.
    ///
    /// Going offline drops any pending refresh; coming back online bumps the
    /// mount epoch so the content view is rebuilt.
    pub fn apply_connectivity(&mut self, online: bool) -> bool {
        let next = if online {
            Connectivity::Online
        } else {
            Connectivity::Offline
        };
        if next == self.connectivity {
            return false;
        }
        self.connectivity = next;
        match next {
            Connectivity::Online => self.mount_epoch += 1,
            Connectivity::Offline => self.refreshing = false,
        }
        true
    }

    /// Show the refresh indicator. Only meaningful while online.
    pub fn begin_refresh(&mut self) -> bool {
        if !self.is_online() || self.refreshing {
            return false;
        }
        self.refreshing = true;
        true
    }

    /// Hide the refresh indicator once the view reports load finished.
    pub fn finish_refresh(&mut self) -> bool {
        std::mem::replace(&mut self.refreshing, false)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn starts_online_on_first_mount() {
        let state = ShellState::new();
        assert_eq!(state.screen(), Screen::Online { mount: 0 });
        assert!(!state.is_refreshing());
    }

    #[test]
    fn screen_is_offline_iff_last_report_was_false() {
        let mut state = ShellState::new();
        for (report, expect_offline) in [(false, true), (false, true), (true, false), (false, true)]
        {
            state.apply_connectivity(report);
            assert_eq!(state.screen() == Screen::Offline, expect_offline);
        }
    }

    #[test]
    fn reconnect_remounts() {
        let mut state = ShellState::new();
        assert!(!state.apply_connectivity(true));
        assert!(state.apply_connectivity(false));
        assert!(state.apply_connectivity(true));
        assert_eq!(state.screen(), Screen::Online { mount: 1 });
    }

    #[test]
    fn going_offline_clears_refresh() {
        let mut state = ShellState::new();
        assert!(state.begin_refresh());
        assert!(!state.begin_refresh());
        state.apply_connectivity(false);
        assert!(!state.is_refreshing());
        assert!(!state.begin_refresh());
    }

    #[test]
    fn finish_refresh_reports_whether_it_was_showing() {
        let mut state = ShellState::new();
        assert!(!state.finish_refresh());
        state.begin_refresh();
        assert!(state.finish_refresh());
        assert!(!state.is_refreshing());
    }
}
