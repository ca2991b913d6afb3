pub mod backend;
pub mod info;
pub mod packet;
pub mod strings;

pub use backend::{CompareResult, FavoriteResult, LanBackend, SortDir, SortKey, SortSpec, Source};
pub use packet::Packet;

/// Upper bound on entries in the ranked display list.
pub const MAX_DISPLAY_SERVERS: usize = 2048;

/// Upper bound on rows in one parsed server status table.
pub const MAX_STATUS_ROWS: usize = 128;

/// Number of concurrent in-flight status requests per slot pool.
pub const STATUS_SLOTS: usize = 16;

/// Upper bound on player-search results, including the trailing summary line.
pub const MAX_FOUND_PLAYER_SERVERS: usize = 16;

/// Upper bound on stored favorite servers.
pub const MAX_FAVORITE_SERVERS: usize = 64;

/// Default milliseconds before an in-flight status request is reclaimed.
pub const DEFAULT_STATUS_TIMEOUT_MS: u64 = 7000;
