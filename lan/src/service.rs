//! Concrete discovery backend.
//!
//! `LanService` owns the host registry, the favorites roster, and the
//! status tracker. It never touches a socket: every outgoing packet is
//! queued in an outbox that the network pump drains, and incoming
//! packets are fed in through `handle_packet`. That keeps the whole
//! backend deterministic and testable with a plain millisecond clock.

use crate::compare::compare_hosts;
use crate::favorites::FavoriteList;
use crate::registry::Registry;
use crate::status_track::{PollAction, StatusTracker};
use log::{debug, info, warn};
use shared::backend::{CompareResult, FavoriteResult, LanBackend, SortSpec, Source};
use shared::packet::Packet;

/// How long a ping probe may stay unanswered before the host is
/// written off for this refresh.
const PING_TIMEOUT_MS: u64 = 3000;

#[derive(Debug, Clone)]
pub struct ServiceConfig {
    /// Where local-network discovery queries are broadcast.
    pub broadcast_address: String,
    /// Master directory that answers `MasterRequest`.
    pub master_address: String,
    /// Protocol version sent to the master.
    pub protocol: i32,
    /// How long callers wait on a status request; status resend pacing
    /// is derived from it.
    pub status_timeout_ms: u64,
}

impl Default for ServiceConfig {
    fn default() -> Self {
        Self {
            broadcast_address: "255.255.255.255:30720".to_string(),
            master_address: "127.0.0.1:30710".to_string(),
            protocol: 70,
            status_timeout_ms: shared::DEFAULT_STATUS_TIMEOUT_MS,
        }
    }
}

pub struct LanService {
    config: ServiceConfig,
    registry: Registry,
    favorites: FavoriteList,
    tracker: StatusTracker,
    outbox: Vec<(String, Packet)>,
    /// Session challenge echoed back by well-behaved hosts.
    challenge: u32,
}

impl LanService {
    pub fn new(config: ServiceConfig) -> Self {
        let tracker = StatusTracker::new(config.status_timeout_ms);
        Self {
            config,
            registry: Registry::new(),
            favorites: FavoriteList::new(),
            tracker,
            outbox: Vec::new(),
            challenge: rand::random(),
        }
    }

    /// Packets queued for the wire since the last drain.
    pub fn take_outbox(&mut self) -> Vec<(String, Packet)> {
        std::mem::take(&mut self.outbox)
    }

    /// Puts packets the transport could not send back at the front of
    /// the queue, preserving their order.
    pub fn requeue(&mut self, packets: Vec<(String, Packet)>) {
        if !packets.is_empty() {
            let rest = std::mem::replace(&mut self.outbox, packets);
            self.outbox.extend(rest);
        }
    }

    fn queue(&mut self, to: &str, packet: Packet) {
        self.outbox.push((to.to_string(), packet));
    }

    /// Applies the ping measurement to every table that carries the
    /// address, so Favorites mirrors what Local/Global learned.
    fn apply_info(&mut self, from: &str, info: &str, now: u64) {
        let mut seen = false;
        for source in [Source::Local, Source::Global, Source::Favorites] {
            if let Some(index) = self.registry.find(source, from) {
                seen = true;
                if let Some(host) = self.registry.get_mut(source, index) {
                    host.info = info.to_string();
                    if let Some(sent) = host.ping_sent_at.take() {
                        host.ping = now.saturating_sub(sent).max(1) as i32;
                    }
                }
            }
        }
        if !seen {
            // An answer to our broadcast. Register the host with no
            // ping yet; the next ping pass probes it directly.
            let index = self.registry.upsert(Source::Local, from);
            if let Some(host) = self.registry.get_mut(Source::Local, index) {
                host.info = info.to_string();
            }
            debug!("discovered local host {} at {}ms", from, now);
        }
    }

    /// Feeds one decoded packet from the wire into the service.
    pub fn handle_packet(&mut self, from: &str, packet: Packet, now: u64) {
        match packet {
            Packet::InfoResponse { challenge, info } => {
                if challenge != self.challenge {
                    debug!("stale info challenge from {}", from);
                    return;
                }
                self.apply_info(from, &info, now);
            }
            Packet::MasterResponse { addresses } => {
                if from != self.config.master_address {
                    warn!("master response from unexpected source {}", from);
                    return;
                }
                self.registry.set_master_answered();
                for address in &addresses {
                    self.registry.upsert(Source::Global, address);
                }
                info!("master listed {} servers", addresses.len());
            }
            Packet::StatusResponse { challenge, text } => {
                if challenge != self.challenge {
                    debug!("stale status challenge from {}", from);
                    return;
                }
                if !self.tracker.record_reply(from, text) {
                    debug!("unsolicited status reply from {}", from);
                }
            }
            // We only ever issue requests; inbound ones are someone
            // else probing us and carry nothing we need.
            Packet::InfoRequest { .. }
            | Packet::StatusRequest { .. }
            | Packet::MasterRequest { .. } => {}
        }
    }
}

impl LanBackend for LanService {
    fn server_count(&self, source: Source) -> i32 {
        self.registry.count(source)
    }

    fn server_is_visible(&self, source: Source, index: usize) -> bool {
        self.registry
            .get(source, index)
            .map(|h| h.visible)
            .unwrap_or(false)
    }

    fn mark_server_visible(&mut self, source: Source, index: Option<usize>, visible: bool) {
        self.registry.mark_visible(source, index, visible);
    }

    fn server_ping(&self, source: Source, index: usize) -> i32 {
        self.registry.get(source, index).map(|h| h.ping).unwrap_or(0)
    }

    fn server_info(&self, source: Source, index: usize) -> String {
        self.registry
            .get(source, index)
            .map(|h| h.info.clone())
            .unwrap_or_default()
    }

    fn server_address(&self, source: Source, index: usize) -> String {
        self.registry
            .get(source, index)
            .map(|h| h.address.clone())
            .unwrap_or_default()
    }

    fn compare_servers(&self, source: Source, spec: SortSpec, a: usize, b: usize) -> CompareResult {
        match (self.registry.get(source, a), self.registry.get(source, b)) {
            (Some(ha), Some(hb)) => compare_hosts(ha, hb, spec),
            _ => CompareResult::Equal,
        }
    }

    fn issue_discovery_query(&mut self, source: Source) {
        let challenge = self.challenge;
        match source {
            Source::Local => {
                info!("broadcasting local discovery");
                let to = self.config.broadcast_address.clone();
                self.queue(&to, Packet::InfoRequest { challenge });
            }
            Source::Global => {
                info!("querying master {}", self.config.master_address);
                let to = self.config.master_address.clone();
                let protocol = self.config.protocol;
                self.queue(&to, Packet::MasterRequest { protocol });
            }
            Source::Favorites => {}
        }
    }

    fn reset_pings(&mut self, source: Source) {
        self.registry.reset_pings(source);
    }

    fn update_visible_pings(&mut self, source: Source, now: u64) -> bool {
        let challenge = self.challenge;
        let mut outstanding = false;
        let mut probes: Vec<String> = Vec::new();
        let count = self.registry.hosts(source).len();
        for index in 0..count {
            let Some(host) = self.registry.get_mut(source, index) else {
                continue;
            };
            if !host.visible || host.ping > 0 {
                continue;
            }
            match host.ping_sent_at {
                None => {
                    host.ping_sent_at = Some(now);
                    probes.push(host.address.clone());
                    outstanding = true;
                }
                Some(sent) if now.saturating_sub(sent) < PING_TIMEOUT_MS => {
                    outstanding = true;
                }
                Some(_) => {
                    // Timed out; leave ping at zero so the display
                    // list filters the host out.
                    host.visible = false;
                }
            }
        }
        for address in probes {
            self.queue(&address, Packet::InfoRequest { challenge });
        }
        outstanding
    }

    fn fetch_status(&mut self, address: &str, now: u64) -> Option<String> {
        match self.tracker.poll(address, now) {
            PollAction::Send => {
                let challenge = self.challenge;
                self.queue(address, Packet::StatusRequest { challenge });
                None
            }
            PollAction::Wait => None,
            PollAction::Ready(text) => Some(text),
        }
    }

    fn reset_status_request(&mut self, address: &str) {
        self.tracker.reset(address);
    }

    fn reset_status_requests(&mut self) {
        self.tracker.reset_all();
    }

    fn add_favorite(&mut self, name: &str, address: &str) -> FavoriteResult {
        let result = self.favorites.add(name, address);
        if result == FavoriteResult::Added {
            let index = self.registry.upsert(Source::Favorites, address);
            if let Some(host) = self.registry.get_mut(Source::Favorites, index) {
                if host.info.is_empty() {
                    host.info = format!("\\hostname\\{}", name);
                }
            }
            info!("favorite added: {} ({})", name, address);
        }
        result
    }

    fn remove_favorite(&mut self, address: &str) {
        self.favorites.remove(address);
        self.registry.remove(Source::Favorites, address);
    }
}
