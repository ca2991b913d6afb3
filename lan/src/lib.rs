//! # LAN Discovery Service
//!
//! This library is the network side of the server browser: it keeps the
//! per-source registry of advertised hosts, measures their pings, tracks
//! outstanding status requests, and stores the favorites list. It
//! implements `shared::LanBackend`, the only interface the browser engine
//! sees.
//!
//! ## Design
//!
//! The service itself is synchronous and socket-free: queries it wants
//! sent go into an outbox, replies are handed to it as decoded packets.
//! `net::LanSocket` is the thin tokio UDP pump that drains both
//! directions without ever blocking, so a caller can pump it from the
//! same tick loop that drives the browser engine.
//!
//! ## Module Organization
//!
//! ### Registry (`registry`)
//! Per-source host tables: address, info string, ping, visibility.
//!
//! ### Comparator (`compare`)
//! The sort-key comparator the display list ranks hosts with.
//!
//! ### Favorites (`favorites`)
//! The bounded favorites list, kept in insertion order.
//!
//! ### Status Tracking (`status_track`)
//! Outstanding status requests and their resend pacing.
//!
//! ### Service (`service`)
//! `LanService`, the `LanBackend` implementation behind the outbox.
//!
//! ### Transport (`net`)
//! Non-blocking UDP send/receive of `shared::Packet`s.

pub mod compare;
pub mod favorites;
pub mod net;
pub mod registry;
pub mod service;
pub mod status_track;

pub use service::{LanService, ServiceConfig};
