//! Fixed-pool status polling over the display list.
//!
//! The scheduler keeps up to [`shared::STATUS_SLOTS`] status requests in
//! flight and sweeps the display list exactly once per coverage pass. A
//! slot cycles `Empty -> Assigned -> (Completed | Expired) -> Empty`;
//! within one tick, completion and reclamation for a slot always run
//! before it is handed a new address, so no host is polled twice
//! concurrently and each address is drawn at most once per pass.
//!
//! Nothing here suspends. A tick is a bounded pass over the pool, and the
//! waiting lives entirely in the slot state carried to the next tick.

use crate::display_list::DisplayList;
use crate::status::{self, ServerStatusInfo};
use log::debug;
use shared::backend::LanBackend;
use shared::{info, strings, STATUS_SLOTS};

/// One in-flight status request.
#[derive(Debug, Clone, Default)]
pub struct PendingSlot {
    pub address: String,
    /// Hostname snapshot taken at assignment, for user-facing progress.
    pub name: String,
    pub start_time: u64,
    pub valid: bool,
}

/// Sweeps the display list with a bounded pool of pending requests.
#[derive(Debug)]
pub struct PollScheduler {
    slots: Vec<PendingSlot>,
    cursor: usize,
    timeout_ms: u64,
    /// Replies parsed this pass.
    pub num_received: u32,
    /// Assigned slots reclaimed because their reply never came.
    pub num_timeouts: u32,
}

impl PollScheduler {
    pub fn new(timeout_ms: u64) -> Self {
        Self::with_slots(STATUS_SLOTS, timeout_ms)
    }

    pub fn with_slots(slots: usize, timeout_ms: u64) -> Self {
        Self {
            slots: vec![PendingSlot::default(); slots],
            cursor: 0,
            timeout_ms,
            num_received: 0,
            num_timeouts: 0,
        }
    }

    /// Starts a fresh coverage pass.
    pub fn reset(&mut self) {
        for slot in &mut self.slots {
            *slot = PendingSlot::default();
        }
        self.cursor = 0;
        self.num_received = 0;
        self.num_timeouts = 0;
    }

    /// How many display-list entries have been drawn into slots this pass.
    pub fn covered(&self) -> usize {
        self.cursor
    }

    pub fn in_flight(&self) -> usize {
        self.slots.iter().filter(|s| s.valid).count()
    }

    pub fn slot_count(&self) -> usize {
        self.slots.len()
    }

    /// Abandons the rest of the pass; in-flight slots still drain normally.
    pub fn finish_coverage(&mut self, list: &DisplayList) {
        self.cursor = list.len();
    }

    /// One cooperative tick: complete replies, reclaim empty or expired
    /// slots, and draw new addresses while uncovered entries remain.
    /// Each completed reply is parsed and handed to `on_status` along with
    /// the slot's display name. Returns true when the pass is done: every
    /// slot empty and the cursor at the end of the list.
    pub fn tick(
        &mut self,
        lan: &mut dyn LanBackend,
        list: &DisplayList,
        now: u64,
        mut on_status: impl FnMut(ServerStatusInfo, &str),
    ) -> bool {
        for i in 0..self.slots.len() {
            // a reply for this slot's address completes it
            if self.slots[i].valid {
                let address = self.slots[i].address.clone();
                if let Some(text) = lan.fetch_status(&address, now) {
                    let parsed = status::parse(&address, &text);
                    self.num_received += 1;
                    on_status(parsed, &self.slots[i].name);
                    self.slots[i].valid = false;
                }
            }

            let expired = self.slots[i].valid
                && now.saturating_sub(self.slots[i].start_time) > self.timeout_ms;

            if self.slots[i].valid && !expired {
                continue;
            }

            if expired {
                // a genuine timeout, not an already-empty slot
                self.num_timeouts += 1;
                debug!("status request to {} timed out", self.slots[i].address);
            }

            // drop whatever request may still be outstanding for the
            // slot's old address before reusing it
            if !self.slots[i].address.is_empty() {
                lan.reset_status_request(&self.slots[i].address);
            }
            self.slots[i].valid = false;

            if self.cursor < list.len() {
                let num = match list.get(self.cursor) {
                    Some(num) => num,
                    None => break,
                };

                let source = list.source();
                let info_str = lan.server_info(source, num);

                self.slots[i] = PendingSlot {
                    address: lan.server_address(source, num),
                    name: strings::clean(info::value_for_key(&info_str, "hostname")),
                    start_time: now,
                    valid: true,
                };
                self.cursor += 1;
            }
        }

        self.slots.iter().all(|s| !s.valid)
    }
}
