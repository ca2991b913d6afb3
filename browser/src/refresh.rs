//! The rescan state machine.
//!
//! A refresh walks `Idle -> Requesting -> WaitingForPings -> Idle`. The
//! session only orchestrates the collaborator (visibility marks, ping
//! resets, the discovery query) and the timing; list rebuilding stays with
//! the browser facade, which runs it while the session waits for pings.
//! Cancellation is synchronous: the session drops straight back to idle
//! and any reply still in flight is ignored by the slot state it finds.

use log::{debug, info};
use shared::backend::{LanBackend, Source};

/// Delay before polling starts, covering the discovery round-trip.
const LOCAL_QUERY_GRACE_MS: u64 = 1000;
const MASTER_QUERY_GRACE_MS: u64 = 5000;
const PING_RECHECK_MS: u64 = 1000;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RefreshState {
    Idle,
    Requesting,
    WaitingForPings,
}

/// What one tick of the session did.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RefreshOutcome {
    /// No refresh in progress.
    Inactive,
    /// Still waiting on the query or on outstanding pings.
    Waiting,
    /// All pings accounted for; the session just went idle and the caller
    /// should run its final list build.
    PingsDone,
}

#[derive(Debug)]
pub struct RefreshSession {
    state: RefreshState,
    source: Source,
    /// Not-before timestamp for ping polling.
    ready_at: u64,
}

impl RefreshSession {
    pub fn new(source: Source) -> Self {
        Self {
            state: RefreshState::Idle,
            source,
            ready_at: 0,
        }
    }

    pub fn state(&self) -> RefreshState {
        self.state
    }

    pub fn is_active(&self) -> bool {
        self.state != RefreshState::Idle
    }

    /// Kicks off a rescan. A full refresh re-marks every known host as
    /// visible and issues the discovery query; a partial one only resets
    /// pings so they are collected again.
    pub fn start(&mut self, lan: &mut dyn LanBackend, source: Source, full: bool, now: u64) {
        self.source = source;

        if !full {
            lan.reset_pings(source);
            self.state = RefreshState::WaitingForPings;
            self.ready_at = now + PING_RECHECK_MS;
            debug!("re-pinging known {} servers", source);
            return;
        }

        info!("starting full {} refresh", source);

        // mark all servers as visible so we store ping updates for them
        lan.mark_server_visible(source, None, true);
        lan.reset_pings(source);

        self.ready_at = now
            + match source {
                Source::Local => LOCAL_QUERY_GRACE_MS,
                _ => MASTER_QUERY_GRACE_MS,
            };

        // favorites are already known; there is nothing to ask for
        if source != Source::Favorites {
            lan.issue_discovery_query(source);
        }

        self.state = RefreshState::Requesting;
    }

    /// Immediate cancellation from any state.
    pub fn stop(&mut self) {
        self.state = RefreshState::Idle;
    }

    pub fn tick(&mut self, lan: &mut dyn LanBackend, now: u64) -> RefreshOutcome {
        if self.state == RefreshState::Idle {
            return RefreshOutcome::Inactive;
        }

        // the discovery query is fire-and-forget, so dispatch confirmation
        // is immediate
        if self.state == RefreshState::Requesting {
            self.state = RefreshState::WaitingForPings;
        }

        let wait = match self.source {
            Source::Favorites => false,
            // the local broadcast has not produced anything yet
            Source::Local => lan.server_count(self.source) == 0,
            // the master has not answered yet
            Source::Global => lan.server_count(self.source) < 0,
        };

        if now < self.ready_at && wait {
            return RefreshOutcome::Waiting;
        }

        if lan.update_visible_pings(self.source, now) {
            // still trying to retrieve pings
            self.ready_at = now + PING_RECHECK_MS;
            RefreshOutcome::Waiting
        } else if !wait {
            self.state = RefreshState::Idle;
            RefreshOutcome::PingsDone
        } else {
            RefreshOutcome::Waiting
        }
    }
}
