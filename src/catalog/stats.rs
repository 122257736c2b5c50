//! Read-only aggregates over the track table.

use super::{CatalogStore, DurationStats, TitleAndLength};
use crate::error::StreamingResult;
use std::sync::Arc;

pub struct StatsService {
    store: Arc<dyn CatalogStore>,
}

impl StatsService {
    pub fn new(store: Arc<dyn CatalogStore>) -> Self {
        Self { store }
    }

    /// Artists owning at least one track.
    pub fn count_distinct_artists(&self) -> StreamingResult<usize> {
        Ok(self.store.count_track_owners()?)
    }

    pub fn count_tracks(&self) -> StreamingResult<usize> {
        Ok(self.store.count_tracks()?)
    }

    pub fn count_tracks_by_genre(&self, genre_title: &str) -> StreamingResult<usize> {
        Ok(self.store.count_tracks_by_genre_title(genre_title)?)
    }

    pub fn list_titles_and_lengths(&self) -> StreamingResult<Vec<TitleAndLength>> {
        Ok(self.store.list_titles_and_lengths()?)
    }

    pub fn duration_stats(&self) -> StreamingResult<DurationStats> {
        Ok(self.store.duration_stats()?)
    }
}
