//! Engine policy knobs.

use shared::DEFAULT_STATUS_TIMEOUT_MS;

/// Filtering and timing policy for the browser engine.
///
/// These correspond to user preferences; the engine only reads them.
#[derive(Debug, Clone)]
pub struct BrowserConfig {
    /// List servers with zero connected clients.
    pub show_empty: bool,
    /// List servers whose client count has reached the maximum.
    pub show_full: bool,
    /// Milliseconds before an in-flight status request is reclaimed.
    pub status_timeout_ms: u64,
    /// Milliseconds between steady-state display list rebuilds.
    pub display_refresh_ms: u64,
}

impl Default for BrowserConfig {
    fn default() -> Self {
        Self {
            show_empty: true,
            show_full: true,
            status_timeout_ms: DEFAULT_STATUS_TIMEOUT_MS,
            display_refresh_ms: 500,
        }
    }
}
