//! The browser facade the UI layer talks to.
//!
//! `ServerBrowser` owns one source's display list, the refresh session,
//! the single-host status view, the player search, and a steady-state
//! status sweep that prefetches status tables for listed servers once a
//! refresh completes. Everything is driven by [`ServerBrowser::tick`]
//! from one control thread, once per frame.

use crate::config::BrowserConfig;
use crate::display_list::DisplayList;
use crate::refresh::{RefreshOutcome, RefreshSession};
use crate::scheduler::PollScheduler;
use crate::search::FoundPlayerSearch;
use crate::status::{self, ServerStatusInfo};
use log::{debug, info};
use shared::backend::{LanBackend, SortSpec, Source};
use shared::{info as info_str, strings};
use std::collections::HashMap;

/// Delay before retrying when the master has not answered, or when the
/// selected host's status has not arrived.
const RETRY_MS: u64 = 500;

/// Bound on prefetched status tables kept by the sweep.
const STATUS_CACHE_MAX: usize = 64;

/// Columns the display list can be rendered by.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Column {
    Hostname,
    Map,
    Clients,
    GameType,
    Ping,
    Address,
}

pub struct ServerBrowser {
    config: BrowserConfig,
    source: Source,
    list: DisplayList,
    refresh: RefreshSession,
    search: FoundPlayerSearch,

    /// Steady-state prefetch of status tables after a refresh.
    sweep: PollScheduler,
    sweep_active: bool,
    status_cache: HashMap<String, ServerStatusInfo>,

    /// Players counted across listed servers, duplicates included.
    num_players: u32,
    next_display_refresh: u64,

    selected: usize,
    status_address: String,
    status_info: ServerStatusInfo,
    /// Zero while the status view is idle; otherwise the retry time.
    next_status_refresh: u64,
}

impl ServerBrowser {
    pub fn new(source: Source, config: BrowserConfig) -> Self {
        let status_timeout = config.status_timeout_ms;
        Self {
            config,
            source,
            list: DisplayList::new(source),
            refresh: RefreshSession::new(source),
            search: FoundPlayerSearch::new(status_timeout),
            sweep: PollScheduler::new(status_timeout),
            sweep_active: false,
            status_cache: HashMap::new(),
            num_players: 0,
            next_display_refresh: 0,
            selected: 0,
            status_address: String::new(),
            status_info: ServerStatusInfo::default(),
            next_status_refresh: 0,
        }
    }

    pub fn source(&self) -> Source {
        self.source
    }

    /// Switches discovery channel, discarding everything tied to the old
    /// one.
    pub fn set_source(&mut self, source: Source) {
        self.source = source;
        self.list = DisplayList::new(source);
        self.refresh = RefreshSession::new(source);
        self.search = FoundPlayerSearch::new(self.config.status_timeout_ms);
        self.sweep = PollScheduler::new(self.config.status_timeout_ms);
        self.sweep_active = false;
        self.status_cache.clear();
        self.num_players = 0;
        self.next_display_refresh = 0;
        self.selected = 0;
        self.status_address.clear();
        self.status_info = ServerStatusInfo::default();
        self.next_status_refresh = 0;
    }

    pub fn list(&self) -> &DisplayList {
        &self.list
    }

    pub fn search(&self) -> &FoundPlayerSearch {
        &self.search
    }

    pub fn refresh_active(&self) -> bool {
        self.refresh.is_active()
    }

    // ---- refresh ---------------------------------------------------

    pub fn start_refresh(&mut self, lan: &mut dyn LanBackend, full: bool, now: u64) {
        if full {
            self.list.clear();
            self.num_players = 0;
            self.selected = 0;
            self.sweep_active = false;
            self.status_cache.clear();
            self.next_display_refresh = now + RETRY_MS;
        }
        self.refresh.start(lan, self.source, full, now);
    }

    /// User cancellation; partial results already listed stay listed.
    pub fn stop_refresh(&mut self, lan: &mut dyn LanBackend) {
        if !self.refresh.is_active() {
            return;
        }
        self.refresh.stop();
        self.log_refresh_summary(lan);
    }

    fn log_refresh_summary(&self, lan: &mut dyn LanBackend) {
        info!(
            "{} servers listed in browser with {} players.",
            self.list.len(),
            self.num_players.saturating_sub(self.list.duplicate_clients)
        );

        let count = lan.server_count(self.source);
        if count > 0 {
            let unlisted = count as i64
                - self.list.len() as i64
                - self.list.duplicate_servers as i64;
            if unlisted > 0 {
                info!(
                    "{} servers not listed due to packet loss, invalid info, or unanswered pings",
                    unlisted
                );
            }
        }
    }

    // ---- display list ----------------------------------------------

    /// Rebuilds the display list from newly visible hosts. With `force`
    /// the list is reset first; otherwise this is a periodic pass that
    /// only runs when due.
    pub fn build_display_list(&mut self, lan: &mut dyn LanBackend, force: bool, now: u64) {
        self.build_list(lan, force, force, now);
    }

    fn build_list(&mut self, lan: &mut dyn LanBackend, force: bool, reset: bool, now: u64) {
        if !(force || now > self.next_display_refresh) {
            return;
        }

        if reset {
            self.list.clear();
            self.num_players = 0;
            self.selected = 0;
            // mark all servers as visible so we store ping updates for them
            lan.mark_server_visible(self.source, None, true);
        }

        let count = lan.server_count(self.source);
        if count < 0 || (self.source == Source::Local && count == 0) {
            // still waiting on a response from the discovery query
            self.list.clear();
            self.num_players = 0;
            self.next_display_refresh = now + RETRY_MS;
            return;
        }

        for i in 0..count as usize {
            // only servers whose ping update we have not consumed yet
            if !lan.server_is_visible(self.source, i) {
                continue;
            }

            let ping = lan.server_ping(self.source, i);
            if ping <= 0 && self.source != Source::Favorites {
                continue;
            }

            let info = lan.server_info(self.source, i);
            let clients: u32 = info_str::value_for_key(&info, "clients").parse().unwrap_or(0);
            self.num_players += clients;

            if !self.config.show_empty && clients == 0 {
                lan.mark_server_visible(self.source, Some(i), false);
                continue;
            }

            if !self.config.show_full {
                let max: u32 = info_str::value_for_key(&info, "sv_maxclients")
                    .parse()
                    .unwrap_or(0);
                if clients == max {
                    lan.mark_server_visible(self.source, Some(i), false);
                    continue;
                }
            }

            // make sure we never add a favorite server twice
            if self.source == Source::Favorites {
                self.list.remove(i);
            }

            self.list.insert(lan, i);

            if ping > 0 {
                // ping consumed; drop the host from further passes
                lan.mark_server_visible(self.source, Some(i), false);
            }
        }

        self.next_display_refresh = now + self.config.display_refresh_ms;
    }

    pub fn display_count(&self) -> usize {
        self.list.len()
    }

    /// Text for one cell of the server table.
    pub fn display_entry_text(&self, lan: &dyn LanBackend, index: usize, column: Column) -> String {
        let num = match self.list.get(index) {
            Some(num) => num,
            None => return String::new(),
        };

        let info = lan.server_info(self.source, num);
        match column {
            Column::Hostname => strings::clean(info_str::value_for_key(&info, "hostname")),
            Column::Map => info_str::value_for_key(&info, "mapname").to_string(),
            Column::Clients => format!(
                "{}/{}",
                info_str::value_for_key(&info, "clients"),
                info_str::value_for_key(&info, "sv_maxclients")
            ),
            Column::GameType => info_str::value_for_key(&info, "gametype").to_string(),
            Column::Ping => lan.server_ping(self.source, num).to_string(),
            Column::Address => lan.server_address(self.source, num),
        }
    }

    /// Selects a row and points the status view at its address.
    pub fn select_display_entry(&mut self, lan: &dyn LanBackend, index: usize) {
        if let Some(num) = self.list.get(index) {
            self.selected = index;
            self.status_address = lan.server_address(self.source, num);
        }
    }

    pub fn selected(&self) -> usize {
        self.selected
    }

    // ---- sorting ---------------------------------------------------

    /// Applies a new sort spec. A no-op when the spec is unchanged,
    /// unless `force_resort` demands the full re-sort anyway.
    pub fn sort_by(&mut self, lan: &dyn LanBackend, sort: SortSpec, force_resort: bool) {
        if sort == self.list.sort_spec() && !force_resort {
            return;
        }
        self.list.full_resort(lan, sort);
    }

    // ---- single-host status view -----------------------------------

    pub fn server_status(&self) -> &ServerStatusInfo {
        &self.status_info
    }

    /// Status table prefetched by the steady-state sweep, if any.
    pub fn cached_status(&self, address: &str) -> Option<&ServerStatusInfo> {
        self.status_cache.get(address)
    }

    /// Fetches the selected host's status table. `force` restarts the
    /// request; otherwise this retries a pending fetch when due.
    pub fn build_server_status(&mut self, lan: &mut dyn LanBackend, force: bool, now: u64) {
        // the player search owns the status request budget while active
        if self.search.is_active() {
            return;
        }

        if !force {
            if self.next_status_refresh == 0 || self.next_status_refresh > now {
                return;
            }
        } else {
            self.status_info = ServerStatusInfo::default();
            lan.reset_status_requests();
        }

        if self.status_address.is_empty() || self.list.is_empty() {
            return;
        }

        match lan.fetch_status(&self.status_address, now) {
            Some(text) => {
                self.status_info = status::parse(&self.status_address, &text);
                lan.reset_status_request(&self.status_address);
                self.next_status_refresh = 0;
            }
            None => {
                self.next_status_refresh = now + RETRY_MS;
            }
        }
    }

    // ---- player search ---------------------------------------------

    pub fn build_player_search(
        &mut self,
        lan: &mut dyn LanBackend,
        query: &str,
        force: bool,
        now: u64,
    ) {
        if force {
            self.search.start(lan, &self.list, query, now);
        } else {
            self.search.tick(lan, &self.list, now);
        }
    }

    // ---- per-frame drive -------------------------------------------

    /// One cooperative tick, in the same order as the reference frame
    /// hook: refresh bookkeeping, then list maintenance, then the status
    /// view and player search, then the background status sweep.
    pub fn tick(&mut self, lan: &mut dyn LanBackend, now: u64) {
        match self.refresh.tick(lan, now) {
            RefreshOutcome::PingsDone => {
                // get the last servers into the list, then report
                self.build_list(lan, true, false, now);
                self.log_refresh_summary(lan);
                self.sweep.reset();
                self.sweep_active = true;
            }
            RefreshOutcome::Waiting | RefreshOutcome::Inactive => {}
        }

        self.build_list(lan, false, false, now);
        self.build_server_status(lan, false, now);
        self.search.tick(lan, &self.list, now);

        if self.sweep_active && !self.search.is_active() {
            let cache = &mut self.status_cache;
            let done = self.sweep.tick(lan, &self.list, now, |parsed, _| {
                if cache.len() < STATUS_CACHE_MAX || cache.contains_key(&parsed.address) {
                    cache.insert(parsed.address.clone(), parsed);
                }
            });
            if done {
                debug!(
                    "status sweep complete: {} tables cached, {} requests timed out",
                    self.status_cache.len(),
                    self.sweep.num_timeouts
                );
                self.sweep_active = false;
            }
        }
    }
}
