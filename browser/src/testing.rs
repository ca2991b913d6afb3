//! Scripted backend used by the engine's unit tests.
//!
//! `ScriptedLan` holds a single source's worth of hosts with fixed pings
//! and optionally time-gated status replies, so tick-driven behavior can
//! be tested against a deterministic clock.

use shared::backend::{CompareResult, FavoriteResult, LanBackend, SortDir, SortKey, SortSpec, Source};
use shared::{info, strings, MAX_FAVORITE_SERVERS};
use std::cmp::Ordering;
use std::collections::HashMap;

#[derive(Debug, Clone)]
pub struct ScriptedHost {
    pub address: String,
    pub info: String,
    pub ping: i32,
    pub visible: bool,
}

pub struct ScriptedLan {
    source: Source,
    pub hosts: Vec<ScriptedHost>,
    /// When true, `server_count` reports -1 as if the master had not
    /// answered yet.
    pub master_pending: bool,
    /// Remaining ticks `update_visible_pings` reports outstanding work.
    pub outstanding_pings: u32,
    /// Raw status text per address, available once `now` reaches the gate.
    status_replies: HashMap<String, (u64, String)>,
    pub queries_issued: Vec<Source>,
    pub status_resets: u32,
    favorites: Vec<(String, String)>,
}

impl ScriptedLan {
    pub fn new(source: Source) -> Self {
        Self {
            source,
            hosts: Vec::new(),
            master_pending: false,
            outstanding_pings: 0,
            status_replies: HashMap::new(),
            queries_issued: Vec::new(),
            status_resets: 0,
            favorites: Vec::new(),
        }
    }

    pub fn add_host(&mut self, address: &str, info: &str, ping: i32) -> usize {
        self.hosts.push(ScriptedHost {
            address: address.to_string(),
            info: info.to_string(),
            ping,
            visible: true,
        });
        self.hosts.len() - 1
    }

    /// Scripts the raw status text for `address`, deliverable once the
    /// caller's clock reaches `available_at`.
    pub fn add_status_reply(&mut self, address: &str, available_at: u64, text: &str) {
        self.status_replies
            .insert(address.to_string(), (available_at, text.to_string()));
    }

}

impl LanBackend for ScriptedLan {
    fn server_count(&self, source: Source) -> i32 {
        debug_assert_eq!(source, self.source);
        if self.master_pending {
            -1
        } else {
            self.hosts.len() as i32
        }
    }

    fn server_is_visible(&self, _source: Source, index: usize) -> bool {
        self.hosts.get(index).map(|h| h.visible).unwrap_or(false)
    }

    fn mark_server_visible(&mut self, _source: Source, index: Option<usize>, visible: bool) {
        match index {
            Some(i) => {
                if let Some(h) = self.hosts.get_mut(i) {
                    h.visible = visible;
                }
            }
            None => {
                for h in &mut self.hosts {
                    h.visible = visible;
                }
            }
        }
    }

    fn server_ping(&self, _source: Source, index: usize) -> i32 {
        self.hosts.get(index).map(|h| h.ping).unwrap_or(0)
    }

    fn server_info(&self, _source: Source, index: usize) -> String {
        self.hosts.get(index).map(|h| h.info.clone()).unwrap_or_default()
    }

    fn server_address(&self, _source: Source, index: usize) -> String {
        self.hosts
            .get(index)
            .map(|h| h.address.clone())
            .unwrap_or_default()
    }

    fn compare_servers(&self, _source: Source, spec: SortSpec, a: usize, b: usize) -> CompareResult {
        let ha = &self.hosts[a];
        let hb = &self.hosts[b];

        let ord = match spec.key {
            SortKey::Hostname => {
                let na = strings::clean(info::value_for_key(&ha.info, "hostname")).to_ascii_lowercase();
                let nb = strings::clean(info::value_for_key(&hb.info, "hostname")).to_ascii_lowercase();
                na.cmp(&nb)
            }
            SortKey::Map => {
                info::value_for_key(&ha.info, "mapname").cmp(info::value_for_key(&hb.info, "mapname"))
            }
            SortKey::Clients => {
                let ca: u32 = info::value_for_key(&ha.info, "clients").parse().unwrap_or(0);
                let cb: u32 = info::value_for_key(&hb.info, "clients").parse().unwrap_or(0);
                ca.cmp(&cb)
            }
            SortKey::GameType => {
                let ga: u32 = info::value_for_key(&ha.info, "gametype").parse().unwrap_or(0);
                let gb: u32 = info::value_for_key(&hb.info, "gametype").parse().unwrap_or(0);
                ga.cmp(&gb)
            }
            SortKey::Ping => ha.ping.cmp(&hb.ping),
        };

        let ord = match spec.dir {
            SortDir::Ascending => ord,
            SortDir::Descending => ord.reverse(),
        };

        match ord {
            Ordering::Less => CompareResult::Less,
            Ordering::Equal => CompareResult::Equal,
            Ordering::Greater => CompareResult::Greater,
        }
    }

    fn issue_discovery_query(&mut self, source: Source) {
        self.queries_issued.push(source);
    }

    fn reset_pings(&mut self, _source: Source) {}

    fn update_visible_pings(&mut self, _source: Source, _now: u64) -> bool {
        if self.outstanding_pings > 0 {
            self.outstanding_pings -= 1;
            true
        } else {
            false
        }
    }

    fn fetch_status(&mut self, address: &str, now: u64) -> Option<String> {
        match self.status_replies.get(address) {
            Some((available_at, text)) if now >= *available_at => Some(text.clone()),
            _ => None,
        }
    }

    fn reset_status_request(&mut self, _address: &str) {}

    fn reset_status_requests(&mut self) {
        self.status_resets += 1;
    }

    fn add_favorite(&mut self, name: &str, address: &str) -> FavoriteResult {
        if self.favorites.iter().any(|(_, a)| a == address) {
            return FavoriteResult::AlreadyPresent;
        }
        if self.favorites.len() >= MAX_FAVORITE_SERVERS {
            return FavoriteResult::ListFull;
        }
        self.favorites.push((name.to_string(), address.to_string()));
        FavoriteResult::Added
    }

    fn remove_favorite(&mut self, address: &str) {
        self.favorites.retain(|(_, a)| a != address);
    }
}
