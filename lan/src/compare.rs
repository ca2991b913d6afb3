//! Host ordering for sorted display lists.

use crate::registry::HostEntry;
use shared::backend::{CompareResult, SortDir, SortKey, SortSpec};
use shared::info::value_for_key;
use shared::strings::clean;
use std::cmp::Ordering;

fn numeric(info: &str, key: &str) -> i64 {
    value_for_key(info, key).trim().parse().unwrap_or(0)
}

fn ordering(a: &HostEntry, b: &HostEntry, key: SortKey) -> Ordering {
    match key {
        SortKey::Hostname => {
            let ha = clean(&value_for_key(&a.info, "hostname")).to_lowercase();
            let hb = clean(&value_for_key(&b.info, "hostname")).to_lowercase();
            ha.cmp(&hb)
        }
        SortKey::Map => {
            let ma = value_for_key(&a.info, "mapname").to_lowercase();
            let mb = value_for_key(&b.info, "mapname").to_lowercase();
            ma.cmp(&mb)
        }
        SortKey::Clients => numeric(&a.info, "clients").cmp(&numeric(&b.info, "clients")),
        SortKey::GameType => numeric(&a.info, "gametype").cmp(&numeric(&b.info, "gametype")),
        SortKey::Ping => a.ping.cmp(&b.ping),
    }
}

/// Compares two hosts under a sort specification. Descending order
/// flips the result rather than the inputs, so equality is preserved.
pub fn compare_hosts(a: &HostEntry, b: &HostEntry, spec: SortSpec) -> CompareResult {
    let ord = ordering(a, b, spec.key);
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
