//! Shared constants for end-to-end tests
//!
//! When seeded test data changes, update only this file.

#![allow(dead_code)]

// ============================================================================
// Test Artist Credentials
// ============================================================================

/// Artist seeded in every test database
pub const TEST_ARTIST: &str = "amy";

pub const TEST_PASS: &str = "amypass123";

/// A second seeded artist, for ownership checks
pub const OTHER_ARTIST: &str = "bob";

pub const OTHER_PASS: &str = "bobpass123";

// ============================================================================
// Seeded Genres
// ============================================================================

pub const GENRE_ROCK: &str = "Rock";

pub const GENRE_ROCK_ID: i64 = 1;

pub const GENRE_JAZZ: &str = "Jazz";

pub const GENRE_JAZZ_ID: i64 = 2;

// ============================================================================
// Timeouts
// ============================================================================

/// How long to wait for a spawned server to answer
pub const SERVER_READY_TIMEOUT_MS: u64 = 5000;

/// Timeout of each request made by TestClient
pub const REQUEST_TIMEOUT_SECS: u64 = 10;

pub const SERVER_READY_POLL_INTERVAL_MS: u64 = 50;
