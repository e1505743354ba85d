//! Shared constants for end-to-end tests
//!
//! When the fixture library changes, update only this file.

// ============================================================================
// Fixture Library Contents
// ============================================================================

/// Number of rows in the fixture `items` table
pub const TOTAL_ITEMS: u64 = 6;

/// Item on "Kid A", the only album the fake `beet` has art for
pub const KID_A_ITEM_ID: i64 = 1;

/// Item on "Mezzanine", which has no art
pub const MEZZANINE_ITEM_ID: i64 = 3;

/// Row without album metadata
pub const UNTITLED_ITEM_ID: i64 = 6;

pub const KID_A_TITLE: &str = "Idioteque";

pub const ARTIST_RADIOHEAD: &str = "Radiohead";
pub const ARTIST_MASSIVE_ATTACK: &str = "Massive Attack";
pub const ARTIST_PORTISHEAD: &str = "Portishead";

/// PNG signature written by the fake `beet albumart`
pub const FAKE_ART_BYTES: &[u8] = b"\x89PNG\r\n\x1a\n";

// ============================================================================
// Test Timeouts and Configuration
// ============================================================================

/// Maximum time to wait for server to become ready (milliseconds)
pub const SERVER_READY_TIMEOUT_MS: u64 = 5000;

/// Timeout for individual HTTP requests (seconds)
pub const REQUEST_TIMEOUT_SECS: u64 = 10;

/// Polling interval when waiting for server ready (milliseconds)
pub const SERVER_READY_POLL_INTERVAL_MS: u64 = 50;
