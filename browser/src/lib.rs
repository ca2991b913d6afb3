//! # Server Browser Engine
//!
//! This library implements the discovery and status-polling engine behind
//! the in-game server browser: it consumes hosts advertised by a master
//! directory or a local broadcast, maintains a ranked and deduplicated
//! list of them, and asynchronously gathers per-host status under a
//! bounded request budget.
//!
//! ## Architecture Overview
//!
//! The engine is single-threaded and tick-driven. Every part of it is a
//! bounded, non-suspending pass invoked once per frame; waiting is state
//! carried between ticks, never a blocked thread. That keeps ordering
//! deterministic: within one tick, slot reclamation always precedes new
//! coverage, so no host is ever polled twice concurrently, and a
//! cancelled operation simply stops being ticked.
//!
//! ## Module Organization
//!
//! ### Display List (`display_list`)
//! The sorted sequence of discovered hosts for one source:
//! - Binary-search insertion against the backend comparator
//! - Metadata validity gating
//! - Multiprotocol duplicate reconciliation
//! - Stable full re-sort on sort-spec changes
//!
//! ### Poll Scheduler (`scheduler`)
//! A fixed pool of in-flight status requests sweeping the display list
//! once per coverage pass, with timeout-based slot reclamation.
//!
//! ### Status Parser (`status`)
//! Decodes one host's raw status reply into an ordered, capped row table
//! of metadata and connected players.
//!
//! ### Player Search (`search`)
//! Drives its own slot pool across every listed server to find which of
//! them currently host a player matching a name substring.
//!
//! ### Refresh Session (`refresh`)
//! The `Idle -> Requesting -> WaitingForPings -> Idle` state machine that
//! orchestrates a rescan and hands off to steady-state list maintenance.
//!
//! ### Facade (`browser`)
//! `ServerBrowser` ties the pieces together behind the calls the UI layer
//! makes: list building, row text, selection, sorting, the single-host
//! status view, and the per-frame tick.
//!
//! All network knowledge lives behind `shared::LanBackend`; the engine
//! itself never opens a socket.

pub mod browser;
pub mod config;
pub mod display_list;
pub mod refresh;
pub mod scheduler;
pub mod search;
pub mod status;

#[cfg(test)]
mod testing;

pub use browser::{Column, ServerBrowser};
pub use config::BrowserConfig;
