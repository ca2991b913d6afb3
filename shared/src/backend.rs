//! The seam between the browser engine and the network layer.
//!
//! The engine never touches a socket. Everything it knows about the
//! outside world arrives through [`LanBackend`]: how many hosts a source
//! has advertised, their pings and info strings, raw status text, and the
//! comparator used to rank them. `lan::LanService` is the production
//! implementation; tests substitute scripted ones.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// A logical discovery channel.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Source {
    /// Hosts found by broadcasting on the local network.
    Local,
    /// Hosts advertised by the master directory.
    Global,
    /// The user's saved favorites.
    Favorites,
}

impl fmt::Display for Source {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Source::Local => write!(f, "local"),
            Source::Global => write!(f, "global"),
            Source::Favorites => write!(f, "favorites"),
        }
    }
}

impl FromStr for Source {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "local" => Ok(Source::Local),
            "global" => Ok(Source::Global),
            "favorites" => Ok(Source::Favorites),
            other => Err(format!("unknown source '{}'", other)),
        }
    }
}

/// Column the display list is ranked by.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SortKey {
    Hostname,
    Map,
    Clients,
    GameType,
    Ping,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SortDir {
    Ascending,
    Descending,
}

/// The active ranking: key plus direction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SortSpec {
    pub key: SortKey,
    pub dir: SortDir,
}

impl Default for SortSpec {
    fn default() -> Self {
        Self {
            key: SortKey::Ping,
            dir: SortDir::Ascending,
        }
    }
}

/// Three-way comparison result from the backend comparator.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CompareResult {
    Less,
    Equal,
    Greater,
}

/// Outcome of adding a server to the favorites list.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FavoriteResult {
    Added,
    AlreadyPresent,
    ListFull,
}

/// Network/discovery collaborator consumed by the browser engine.
///
/// All methods are bounded, non-suspending checks; "waiting" is state the
/// implementation carries between ticks. `now` parameters are the caller's
/// monotonic clock in milliseconds.
pub trait LanBackend {
    /// Number of hosts known for `source`. Negative means the master has
    /// not answered yet.
    fn server_count(&self, source: Source) -> i32;

    fn server_is_visible(&self, source: Source, index: usize) -> bool;

    /// Marks one host, or all hosts when `index` is `None`, as eligible
    /// (or not) for ping collection.
    fn mark_server_visible(&mut self, source: Source, index: Option<usize>, visible: bool);

    /// Last measured ping for a host; zero or negative means no reply yet.
    fn server_ping(&self, source: Source, index: usize) -> i32;

    /// The host's current info string (may be empty if nothing arrived).
    fn server_info(&self, source: Source, index: usize) -> String;

    fn server_address(&self, source: Source, index: usize) -> String;

    /// Ranks host `a` against host `b` under `spec`.
    fn compare_servers(&self, source: Source, spec: SortSpec, a: usize, b: usize) -> CompareResult;

    /// Fire-and-forget: broadcast locally or query the master.
    fn issue_discovery_query(&mut self, source: Source);

    /// Forgets all measured pings so a refresh collects fresh ones.
    fn reset_pings(&mut self, source: Source);

    /// True while pings are still outstanding for visible hosts.
    fn update_visible_pings(&mut self, source: Source, now: u64) -> bool;

    /// Returns the raw status text for `address` once a reply has arrived,
    /// issuing (or re-issuing) the request as needed. `None` means not yet.
    fn fetch_status(&mut self, address: &str, now: u64) -> Option<String>;

    /// Drops the outstanding status request for one address.
    fn reset_status_request(&mut self, address: &str);

    /// Drops every outstanding status request.
    fn reset_status_requests(&mut self);

    fn add_favorite(&mut self, name: &str, address: &str) -> FavoriteResult;

    fn remove_favorite(&mut self, address: &str);
}
