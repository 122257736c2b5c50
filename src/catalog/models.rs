//! Genre and track models, plus the read-only shapes returned by listings
//! and statistics.

use crate::artist::ArtistId;
use serde::{Deserialize, Serialize};

// =============================================================================
// Identifiers
// =============================================================================

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct GenreId(pub i64);

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TrackId(pub i64);

impl std::fmt::Display for GenreId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl std::fmt::Display for TrackId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

// =============================================================================
// Entities
// =============================================================================

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Genre {
    pub id: GenreId,
    pub title: String,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Track {
    pub id: TrackId,
    pub title: String,
    pub artist_id: ArtistId,
    /// Seconds, always positive.
    pub length: i64,
    pub genre_id: GenreId,
}

/// Validated content of a track, what gets written on create and update.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct NewTrack {
    pub title: String,
    pub length: i64,
    pub genre_id: GenreId,
}

/// Raw track fields as submitted by a client, before validation.
#[derive(Clone, Debug, Default, Deserialize)]
pub struct TrackForm {
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub length: Option<String>,
    #[serde(default)]
    pub genre_id: Option<String>,
}

// =============================================================================
// Read models
// =============================================================================

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct TrackListing {
    pub id: TrackId,
    pub title: String,
    pub artist_name: String,
    pub length: i64,
    pub genre_title: String,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct TitleAndLength {
    pub title: String,
    pub length: i64,
}

/// `average` is None when there are no tracks.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct DurationStats {
    pub average: Option<f64>,
    pub total: i64,
}
