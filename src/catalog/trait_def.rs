//! CatalogStore trait definition.

use super::models::{
    DurationStats, Genre, GenreId, NewTrack, TitleAndLength, Track, TrackId, TrackListing,
};
use crate::artist::ArtistId;
use anyhow::Result;

/// Storage backend for genres and tracks.
pub trait CatalogStore: Send + Sync {
    // =========================================================================
    // Genres
    // =========================================================================

    fn insert_genre(&self, title: &str) -> Result<GenreId>;

    fn genre_exists(&self, id: GenreId) -> Result<bool>;

    /// All genres ordered by id.
    fn list_genres(&self) -> Result<Vec<Genre>>;

    // =========================================================================
    // Tracks
    // =========================================================================

    fn insert_track(&self, owner: ArtistId, track: &NewTrack) -> Result<TrackId>;

    fn get_track(&self, id: TrackId) -> Result<Option<Track>>;

    /// Overwrites title, length and genre. Returns false if the track is gone.
    fn update_track(&self, id: TrackId, track: &NewTrack) -> Result<bool>;

    /// Returns false if the track did not exist.
    fn delete_track(&self, id: TrackId) -> Result<bool>;

    /// Every track joined with its owner and genre, ordered by owner name
    /// descending, then by track id.
    fn list_tracks(&self) -> Result<Vec<TrackListing>>;

    // =========================================================================
    // Aggregates
    // =========================================================================

    /// Number of distinct artists owning at least one track.
    fn count_track_owners(&self) -> Result<usize>;

    fn count_tracks(&self) -> Result<usize>;

    /// Tracks in genres with the given title, 0 when no genre matches.
    fn count_tracks_by_genre_title(&self, title: &str) -> Result<usize>;

    /// Ordered by track id.
    fn list_titles_and_lengths(&self) -> Result<Vec<TitleAndLength>>;

    fn duration_stats(&self) -> Result<DurationStats>;
}
