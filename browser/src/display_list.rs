//! The ranked, deduplicated list of discovered servers.
//!
//! The list stores backend host handles (indices into one source's
//! registry) in sorted order. New hosts are placed by binary-search
//! insertion against the backend comparator, so a discovery event costs
//! O(log n) comparisons plus the O(n) shift of the insertion itself; a
//! full re-sort only happens when the user changes the sort spec.
//!
//! Servers reachable under more than one protocol revision advertise one
//! entry per revision. Insertion reconciles those duplicates so only the
//! highest protocol tag stays listed, folding the losing entry's client
//! count into a counter instead of dropping it.

use log::debug;
use shared::backend::{CompareResult, LanBackend, SortSpec, Source};
use shared::{info, strings, MAX_DISPLAY_SERVERS};
use std::cmp::Ordering;

/// Number of characters a protocol tag appends to an advertised hostname.
const PROTOCOL_TAG_LEN: usize = 6;

/// Sorted, deduplicated view of one source's discovered hosts.
#[derive(Debug)]
pub struct DisplayList {
    source: Source,
    sort: SortSpec,
    entries: Vec<usize>,
    /// Entries dropped because a sibling protocol revision won.
    pub duplicate_servers: u32,
    /// Clients counted on dropped duplicate entries, so player totals
    /// are not inflated by multiprotocol listings.
    pub duplicate_clients: u32,
}

impl DisplayList {
    pub fn new(source: Source) -> Self {
        Self {
            source,
            sort: SortSpec::default(),
            entries: Vec::new(),
            duplicate_servers: 0,
            duplicate_clients: 0,
        }
    }

    pub fn source(&self) -> Source {
        self.source
    }

    pub fn sort_spec(&self) -> SortSpec {
        self.sort
    }

    /// Changes the spec new insertions are ranked under without touching
    /// existing order; see [`DisplayList::full_resort`] for the global fix-up.
    pub fn set_sort_spec(&mut self, sort: SortSpec) {
        self.sort = sort;
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn get(&self, index: usize) -> Option<usize> {
        self.entries.get(index).copied()
    }

    pub fn handles(&self) -> &[usize] {
        &self.entries
    }

    /// Drops all entries and resets the duplicate counters.
    pub fn clear(&mut self) {
        self.entries.clear();
        self.duplicate_servers = 0;
        self.duplicate_clients = 0;
    }

    /// Places `num` by binary search under the active sort spec.
    ///
    /// Returns false when the host was not listed: invalid metadata, a
    /// losing duplicate, or a full list. Matching the discovery path's
    /// error taxonomy, none of those are errors.
    pub fn insert(&mut self, lan: &dyn LanBackend, num: usize) -> bool {
        let mut len = self.entries.len();
        let mut mid = len;
        let mut offset = 0;
        let mut res = CompareResult::Equal;

        while mid > 0 {
            mid = len >> 1;

            res = lan.compare_servers(self.source, self.sort, num, self.entries[offset + mid]);

            match res {
                // equal ranks slot in right at the probe point
                CompareResult::Equal => return self.insert_at(lan, num, offset + mid),
                CompareResult::Greater => {
                    offset += mid;
                    len -= mid;
                }
                CompareResult::Less => len -= mid,
            }
        }

        if res == CompareResult::Greater {
            offset += 1;
        }

        self.insert_at(lan, num, offset)
    }

    /// Removes the entry holding `num`, shifting trailing entries left.
    pub fn remove(&mut self, num: usize) {
        if let Some(i) = self.entries.iter().position(|&h| h == num) {
            self.entries.remove(i);
        }
    }

    /// Re-sorts the whole list under `sort` with a stable general sort.
    /// Used when the user changes key or direction, where incremental
    /// insertion order is no longer meaningful.
    ///
    /// The comparator is trusted to be a total order; a non-monotonic one
    /// gives unspecified order here just as it does during insertion.
    pub fn full_resort(&mut self, lan: &dyn LanBackend, sort: SortSpec) {
        self.sort = sort;
        let source = self.source;
        self.entries.sort_by(|&a, &b| {
            match lan.compare_servers(source, sort, a, b) {
                CompareResult::Less => Ordering::Less,
                CompareResult::Equal => Ordering::Equal,
                CompareResult::Greater => Ordering::Greater,
            }
        });
    }

    fn insert_at(&mut self, lan: &dyn LanBackend, num: usize, position: usize) -> bool {
        if position > self.entries.len() || self.entries.len() >= MAX_DISPLAY_SERVERS {
            return false;
        }

        let info_str = lan.server_info(self.source, num);

        // don't list servers with invalid info
        if !info::is_valid(&info_str) {
            return false;
        }

        let address = lan.server_address(self.source, num);
        let protocol = protocol_from_address(&address);
        let port = port_from_address(&address);
        let base_hostname = sanitized_hostname(&info_str, protocol);

        let mut position = position;
        let mut i = 0;

        // reconcile duplicate listings of a multiprotocol server
        while i < self.entries.len() {
            let other = self.entries[i];
            let address2 = lan.server_address(self.source, other);

            if base_address(&address) != base_address(&address2) {
                i += 1;
                continue;
            }

            let protocol2 = protocol_from_address(&address2);
            let port2 = port_from_address(&address2);
            let info2 = lan.server_info(self.source, other);

            // differing ports can still be one host running two protocol
            // revisions; confirm identity through the sanitized hostnames
            if port != port2 && base_hostname != sanitized_hostname(&info2, protocol2) {
                i += 1;
                continue;
            }

            self.duplicate_servers += 1;

            if protocol > protocol2 {
                // the newcomer carries the newer protocol; drop the incumbent
                self.duplicate_clients += client_count(&info2);
                debug!(
                    "dropping duplicate listing {} in favor of {}",
                    address2, address
                );
                self.entries.remove(i);
                if i < position {
                    position -= 1;
                }
                continue;
            }

            // incumbent wins, including the equal-tag case
            self.duplicate_clients += client_count(&info_str);
            return false;
        }

        self.entries.insert(position, num);
        true
    }
}

/// Derives the protocol tag from an address string: `-1...` marks the 1.1
/// revision (tag 2), `-g...` the gpp revision (tag 1), anything else is
/// untagged (tag 0).
pub fn protocol_from_address(address: &str) -> u32 {
    let bytes = address.as_bytes();

    for (i, &b) in bytes.iter().enumerate() {
        if b == b'-' {
            return match bytes.get(i + 1) {
                Some(b'1') => 2,
                Some(b'g') => 1,
                _ => 0,
            };
        }
    }

    0
}

/// Digits following the `:` separator, or -1 when there is no port.
pub fn port_from_address(address: &str) -> i32 {
    let rest = match address.split_once(':') {
        Some((_, rest)) => rest,
        None => return -1,
    };

    let tail: String = rest.chars().take_while(|c| *c != ' ').collect();
    if tail.is_empty() {
        return -1;
    }

    // the port ends at the first non-digit, e.g. a trailing protocol tag
    let digits: String = tail.chars().take_while(|c| c.is_ascii_digit()).collect();
    digits.parse().unwrap_or(0)
}

fn base_address(address: &str) -> &str {
    address.split(':').next().unwrap_or(address)
}

/// Sanitized hostname with any trailing protocol tag stripped, the form
/// duplicate detection compares.
fn sanitized_hostname(info_str: &str, protocol: u32) -> String {
    let mut hostname = info::value_for_key(info_str, "hostname").to_string();

    if protocol != 0 && hostname.len() > PROTOCOL_TAG_LEN {
        hostname.truncate(hostname.len() - PROTOCOL_TAG_LEN);
    }

    strings::sanitize(&hostname)
}

fn client_count(info_str: &str) -> u32 {
    info::value_for_key(info_str, "clients").parse().unwrap_or(0)
}
