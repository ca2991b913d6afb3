//! Outstanding status-query bookkeeping.
//!
//! The service sends at most one status query per address at a time and
//! re-sends until a reply lands or the caller resets the request. The
//! resend cadence is derived from the request timeout so even a short
//! timeout leaves room for one retry.

use std::collections::HashMap;

/// Floor on the resend window, so pacing never degenerates into a flood.
const MIN_RESEND_MS: u64 = 50;

#[derive(Debug)]
struct Pending {
    sent_at: u64,
    resend_at: u64,
    reply: Option<String>,
}

#[derive(Debug)]
pub struct StatusTracker {
    pending: HashMap<String, Pending>,
    resend_ms: u64,
}

/// What `poll` decided about an address this tick.
#[derive(Debug, PartialEq, Eq)]
pub enum PollAction {
    /// A query (or re-query) should go on the wire now.
    Send,
    /// A query is outstanding and still within its resend window.
    Wait,
    /// The reply text is ready.
    Ready(String),
}

impl StatusTracker {
    /// `timeout_ms` is how long the caller waits on a request before
    /// reclaiming it; a resend fires at just under half of that.
    pub fn new(timeout_ms: u64) -> Self {
        Self {
            pending: HashMap::new(),
            resend_ms: (timeout_ms / 2).saturating_sub(10).max(MIN_RESEND_MS),
        }
    }

    /// Advances the request for `address`, starting one if none exists.
    pub fn poll(&mut self, address: &str, now: u64) -> PollAction {
        let resend_ms = self.resend_ms;
        match self.pending.get_mut(address) {
            None => {
                self.pending.insert(
                    address.to_string(),
                    Pending {
                        sent_at: now,
                        resend_at: now + resend_ms,
                        reply: None,
                    },
                );
                PollAction::Send
            }
            Some(p) => match &p.reply {
                Some(text) => PollAction::Ready(text.clone()),
                None if now >= p.resend_at => {
                    p.resend_at = now + resend_ms;
                    PollAction::Send
                }
                None => PollAction::Wait,
            },
        }
    }

    /// Stores a reply for an address we actually asked.
    pub fn record_reply(&mut self, address: &str, text: String) -> bool {
        match self.pending.get_mut(address) {
            Some(p) => {
                p.reply = Some(text);
                true
            }
            None => false,
        }
    }

    pub fn sent_at(&self, address: &str) -> Option<u64> {
        self.pending.get(address).map(|p| p.sent_at)
    }

    pub fn reset(&mut self, address: &str) {
        self.pending.remove(address);
    }

    pub fn reset_all(&mut self) {
        self.pending.clear();
    }
}
