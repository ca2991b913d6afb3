//! Per-source host tables.
//!
//! Each discovery source keeps its own ordered table of hosts; the index
//! of a host in its table is the handle the browser engine carries
//! around. Entries are never reordered while a source is live, only
//! appended or removed.

use shared::backend::Source;
use std::collections::HashMap;

/// One advertised host as the service knows it.
#[derive(Debug, Clone)]
pub struct HostEntry {
    pub address: String,
    pub info: String,
    /// Last measured ping in milliseconds; zero or negative means no
    /// reply yet.
    pub ping: i32,
    /// Eligible for ping collection.
    pub visible: bool,
    /// When the ping probe went out, if one is outstanding.
    pub ping_sent_at: Option<u64>,
}

impl HostEntry {
    fn new(address: &str) -> Self {
        Self {
            address: address.to_string(),
            info: String::new(),
            ping: 0,
            visible: true,
            ping_sent_at: None,
        }
    }
}

#[derive(Debug, Default)]
pub struct Registry {
    tables: HashMap<Source, Vec<HostEntry>>,
    /// Whether the master directory has answered at least once.
    master_answered: bool,
}

impl Registry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn hosts(&self, source: Source) -> &[HostEntry] {
        self.tables.get(&source).map(Vec::as_slice).unwrap_or(&[])
    }

    pub fn get(&self, source: Source, index: usize) -> Option<&HostEntry> {
        self.hosts(source).get(index)
    }

    pub fn get_mut(&mut self, source: Source, index: usize) -> Option<&mut HostEntry> {
        self.tables.get_mut(&source)?.get_mut(index)
    }

    /// Count as the engine sees it: -1 while the master is still silent.
    pub fn count(&self, source: Source) -> i32 {
        if source == Source::Global && !self.master_answered {
            return -1;
        }
        self.hosts(source).len() as i32
    }

    pub fn master_answered(&self) -> bool {
        self.master_answered
    }

    pub fn set_master_answered(&mut self) {
        self.master_answered = true;
    }

    /// Returns the index of `address` in `source`, adding a fresh entry
    /// if it was unknown.
    pub fn upsert(&mut self, source: Source, address: &str) -> usize {
        let table = self.tables.entry(source).or_default();
        if let Some(i) = table.iter().position(|h| h.address == address) {
            return i;
        }
        table.push(HostEntry::new(address));
        table.len() - 1
    }

    pub fn find(&self, source: Source, address: &str) -> Option<usize> {
        self.hosts(source).iter().position(|h| h.address == address)
    }

    pub fn remove(&mut self, source: Source, address: &str) {
        if let Some(table) = self.tables.get_mut(&source) {
            table.retain(|h| h.address != address);
        }
    }

    pub fn mark_visible(&mut self, source: Source, index: Option<usize>, visible: bool) {
        let Some(table) = self.tables.get_mut(&source) else {
            return;
        };
        match index {
            Some(i) => {
                if let Some(host) = table.get_mut(i) {
                    host.visible = visible;
                }
            }
            None => {
                for host in table.iter_mut() {
                    host.visible = visible;
                }
            }
        }
    }

    /// Forgets measured pings so a refresh collects fresh ones.
    pub fn reset_pings(&mut self, source: Source) {
        if let Some(table) = self.tables.get_mut(&source) {
            for host in table.iter_mut() {
                host.ping = 0;
                host.ping_sent_at = None;
            }
        }
    }
}
