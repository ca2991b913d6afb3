//! Player-name search across every listed server.
//!
//! A search drives its own poll scheduler over the whole display list and
//! collects the servers whose status reply contains a player name matching
//! the query. Results are rows of (address, server name); one extra
//! trailing row carries the live progress text while the search runs and
//! the summary once it finishes.

use crate::display_list::DisplayList;
use crate::scheduler::PollScheduler;
use log::info;
use shared::backend::LanBackend;
use shared::{strings, MAX_FOUND_PLAYER_SERVERS};

/// Delay between search passes while requests are outstanding.
const SEARCH_TICK_MS: u64 = 25;

/// One search invocation's state; reset on every new search.
#[derive(Debug)]
pub struct FoundPlayerSearch {
    query: String,
    addresses: Vec<String>,
    /// One display name per found server, plus the progress/summary row.
    names: Vec<String>,
    scheduler: PollScheduler,
    /// Zero while idle; otherwise the next time a pass may run.
    next_refresh_at: u64,
    num_received: u32,
}

impl FoundPlayerSearch {
    pub fn new(status_timeout_ms: u64) -> Self {
        Self {
            query: String::new(),
            addresses: Vec::new(),
            names: Vec::new(),
            scheduler: PollScheduler::new(status_timeout_ms),
            next_refresh_at: 0,
            num_received: 0,
        }
    }

    pub fn is_active(&self) -> bool {
        self.next_refresh_at != 0
    }

    pub fn query(&self) -> &str {
        &self.query
    }

    /// Found servers, excluding the trailing progress/summary row.
    pub fn matches(&self) -> usize {
        self.addresses.len()
    }

    /// Rows for display: found server names followed by the status row.
    pub fn display_count(&self) -> usize {
        self.names.len()
    }

    pub fn display_name(&self, index: usize) -> &str {
        self.names.get(index).map(String::as_str).unwrap_or("")
    }

    /// Address backing a display row; the trailing status row has none.
    pub fn address(&self, index: usize) -> Option<&str> {
        self.addresses.get(index).map(String::as_str)
    }

    /// Begins a new search. An empty (post-cleaning) query aborts without
    /// issuing any request.
    pub fn start(&mut self, lan: &mut dyn LanBackend, list: &DisplayList, query: &str, now: u64) {
        self.scheduler.reset();
        self.addresses.clear();
        self.names.clear();
        self.num_received = 0;
        self.query = strings::clean(query);

        if self.query.is_empty() {
            self.next_refresh_at = 0;
            return;
        }

        info!("searching {} servers for player '{}'", list.len(), self.query);

        // drop every outstanding status request before this pass floods in
        lan.reset_status_requests();
        self.names.push(format!("searching {}...", self.scheduler.covered()));

        self.run_pass(lan, list, now);
    }

    /// Periodic drive while a search is outstanding; does nothing when
    /// idle or before the next scheduled pass.
    pub fn tick(&mut self, lan: &mut dyn LanBackend, list: &DisplayList, now: u64) {
        if self.next_refresh_at == 0 || self.next_refresh_at > now {
            return;
        }
        self.run_pass(lan, list, now);
    }

    fn run_pass(&mut self, lan: &mut dyn LanBackend, list: &DisplayList, now: u64) {
        let Self {
            query,
            addresses,
            names,
            scheduler,
            num_received,
            ..
        } = self;

        let mut cap_hit = false;

        let done = scheduler.tick(lan, list, now, |parsed, server_name| {
            *num_received += 1;

            for row in &parsed.rows {
                // player rows are the ones carrying ping info
                if row.ping.is_empty() {
                    continue;
                }

                let player = strings::clean(&row.value);
                let duplicate = addresses.iter().any(|a| a == &parsed.address);

                if strings::contains_ignore_case(&player, query) && !duplicate {
                    // always leave room for the trailing status row
                    if addresses.len() < MAX_FOUND_PLAYER_SERVERS - 1 {
                        addresses.push(parsed.address.clone());
                        let status_row = names.pop().unwrap_or_default();
                        names.push(server_name.to_string());
                        names.push(status_row);
                    } else {
                        cap_hit = true;
                    }
                }
            }
        });

        if cap_hit {
            // result list is full, don't bother covering the rest
            self.scheduler.finish_coverage(list);
        }

        if let Some(last) = self.names.last_mut() {
            *last = format!(
                "searching {}/{}...",
                self.num_received,
                self.scheduler.covered()
            );
        }

        if done {
            self.finish();
        } else {
            self.next_refresh_at = now + SEARCH_TICK_MS;
        }
    }

    fn finish(&mut self) {
        let summary = if self.addresses.is_empty() {
            "no servers found".to_string()
        } else {
            format!(
                "{} server{} found with player {}",
                self.addresses.len(),
                if self.addresses.len() == 1 { "" } else { "s" },
                self.query
            )
        };
        info!("player search complete: {}", summary);

        if let Some(last) = self.names.last_mut() {
            *last = summary;
        }
        self.next_refresh_at = 0;
    }
}
