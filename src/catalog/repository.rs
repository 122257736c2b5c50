use super::{
    validation::{validate_genre_title, validate_track_form, ValidationError},
    CatalogStore, Genre, GenreId, NewTrack, Track, TrackForm, TrackId, TrackListing,
};
use crate::artist::{require_owner, ArtistIdentity};
use crate::error::{StreamingError, StreamingResult};
use std::sync::Arc;
use tracing::info;

/// Genre and track operations, with ownership enforced on writes.
pub struct TrackRepository {
    store: Arc<dyn CatalogStore>,
}

impl TrackRepository {
    pub fn new(store: Arc<dyn CatalogStore>) -> Self {
        Self { store }
    }

    pub fn create_genre(&self, title: Option<&str>) -> StreamingResult<GenreId> {
        let title = validate_genre_title(title)?;
        let id = self.store.insert_genre(&title)?;
        info!("Created genre {} \"{}\"", id, title);
        Ok(id)
    }

    pub fn list_genres(&self) -> StreamingResult<Vec<Genre>> {
        Ok(self.store.list_genres()?)
    }

    pub fn create_track(
        &self,
        owner: &ArtistIdentity,
        form: &TrackForm,
    ) -> StreamingResult<TrackId> {
        let track = self.validate(form)?;
        let id = self.store.insert_track(owner.id, &track)?;
        info!("Artist {} created track {}", owner.id, id);
        Ok(id)
    }

    /// Fetches a track. With `enforce_owner` set, the track must belong to
    /// that artist.
    pub fn get_track(
        &self,
        id: TrackId,
        enforce_owner: Option<&ArtistIdentity>,
    ) -> StreamingResult<Track> {
        let track = self.store.get_track(id)?.ok_or(StreamingError::NotFound)?;
        if let Some(artist) = enforce_owner {
            require_owner(artist, track.artist_id)?;
        }
        Ok(track)
    }

    pub fn update_track(
        &self,
        id: TrackId,
        form: &TrackForm,
        acting: &ArtistIdentity,
    ) -> StreamingResult<()> {
        self.get_track(id, Some(acting))?;
        let track = self.validate(form)?;
        if !self.store.update_track(id, &track)? {
            return Err(StreamingError::NotFound);
        }
        info!("Artist {} updated track {}", acting.id, id);
        Ok(())
    }

    pub fn delete_track(&self, id: TrackId, acting: &ArtistIdentity) -> StreamingResult<()> {
        self.get_track(id, Some(acting))?;
        if !self.store.delete_track(id)? {
            return Err(StreamingError::NotFound);
        }
        info!("Artist {} deleted track {}", acting.id, id);
        Ok(())
    }

    pub fn list_tracks(&self) -> StreamingResult<Vec<TrackListing>> {
        Ok(self.store.list_tracks()?)
    }

    fn validate(&self, form: &TrackForm) -> StreamingResult<NewTrack> {
        let track = validate_track_form(form)?;
        if !self.store.genre_exists(track.genre_id)? {
            return Err(ValidationError::UnknownGenre { id: track.genre_id }.into());
        }
        Ok(track)
    }
}
