use super::auth::{SessionToken, SessionTokenValue};
use super::models::{ArtistCredentials, ArtistId, ArtistIdentity};
use anyhow::Result;
use std::time::SystemTime;

pub trait ArtistStore: Send + Sync {
    /// Inserts a new artist with an already hashed password.
    /// Returns Ok(None) if the name is already taken, the check is the
    /// store's unique constraint so concurrent registrations cannot both win.
    fn create_artist(&self, name: &str, password_hash: &str) -> Result<Option<ArtistId>>;

    /// Returns the credentials of the artist with the given name.
    /// Returns Ok(None) if the artist does not exist.
    fn get_artist_credentials(&self, name: &str) -> Result<Option<ArtistCredentials>>;

    /// Returns Ok(None) if the artist does not exist.
    fn get_artist(&self, id: ArtistId) -> Result<Option<ArtistIdentity>>;
}

pub trait SessionStore: Send + Sync {
    fn add_session(&self, token: &SessionToken) -> Result<()>;

    /// Returns Ok(None) if the token does not exist.
    fn get_session(&self, value: &SessionTokenValue) -> Result<Option<SessionToken>>;

    /// Deletes a session given the token value.
    /// Returns Ok(None) if the token does not exist.
    fn delete_session(&self, value: &SessionTokenValue) -> Result<Option<SessionToken>>;

    fn touch_session(&self, value: &SessionTokenValue) -> Result<()>;

    /// Deletes sessions created before `cutoff`, returns how many were removed.
    fn prune_sessions_created_before(&self, cutoff: SystemTime) -> Result<usize>;
}

pub trait FullArtistStore: ArtistStore + SessionStore {}

impl<T: ArtistStore + SessionStore> FullArtistStore for T {}
