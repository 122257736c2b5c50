use super::{
    auth::{hash_password, verify_password},
    ArtistId, ArtistIdentity, FullArtistStore, SessionToken, SessionTokenValue,
};
use crate::error::{StreamingError, StreamingResult};
use std::{
    sync::Arc,
    time::{Duration, SystemTime},
};
use tracing::{debug, info, warn};

lazy_static::lazy_static! {
    // Verified against when the artist name is unknown, so both failure
    // paths pay for one argon2 verification.
    static ref DUMMY_PASSWORD_HASH: String =
        hash_password("not-a-real-password").unwrap_or_default();
}

const SECONDS_PER_DAY: u64 = 24 * 60 * 60;

pub struct ArtistManager {
    store: Arc<dyn FullArtistStore>,
    session_max_age: Duration,
}

impl ArtistManager {
    pub fn new(store: Arc<dyn FullArtistStore>, session_max_age_days: u64) -> Self {
        let max_age_secs = session_max_age_days.saturating_mul(SECONDS_PER_DAY);
        Self {
            store,
            session_max_age: Duration::from_secs(max_age_secs),
        }
    }

    pub fn register(&self, name: &str, password: &str) -> StreamingResult<ArtistId> {
        if name.is_empty() {
            return Err(StreamingError::validation("Artist name is required."));
        }
        if password.is_empty() {
            return Err(StreamingError::validation("Password is required."));
        }

        let password_hash = hash_password(password)?;
        match self.store.create_artist(name, &password_hash)? {
            Some(id) => {
                info!("Registered artist {} with id {}", name, id);
                Ok(id)
            }
            None => {
                debug!("Registration refused, artist {} already exists", name);
                Err(StreamingError::AlreadyExists)
            }
        }
    }

    pub fn verify(&self, name: &str, password: &str) -> StreamingResult<ArtistIdentity> {
        let credentials = self.store.get_artist_credentials(name)?;
        let Some(credentials) = credentials else {
            let _ = verify_password(password, DUMMY_PASSWORD_HASH.as_str());
            return Err(StreamingError::InvalidCredentials);
        };

        match verify_password(password, &credentials.password_hash) {
            Ok(true) => Ok(credentials.identity()),
            Ok(false) => Err(StreamingError::InvalidCredentials),
            Err(err) => {
                warn!(
                    "Stored password hash of artist {} is unreadable: {}",
                    credentials.id, err
                );
                Err(StreamingError::InvalidCredentials)
            }
        }
    }

    /// Binds a fresh token to `artist`, destroying `previous` first if given.
    pub fn create_session(
        &self,
        artist: &ArtistIdentity,
        previous: Option<&SessionTokenValue>,
    ) -> StreamingResult<SessionToken> {
        if let Some(previous) = previous {
            self.destroy_session(previous)?;
        }
        let token = SessionToken::new(artist.id);
        self.store.add_session(&token)?;
        Ok(token)
    }

    pub fn resolve_session(
        &self,
        value: &SessionTokenValue,
    ) -> StreamingResult<Option<ArtistIdentity>> {
        let Some(token) = self.store.get_session(value)? else {
            return Ok(None);
        };

        if self.is_expired(&token) {
            debug!("Session of artist {} expired", token.artist_id);
            self.store.delete_session(value)?;
            return Ok(None);
        }

        let Some(artist) = self.store.get_artist(token.artist_id)? else {
            return Ok(None);
        };
        self.store.touch_session(value)?;
        Ok(Some(artist))
    }

    pub fn destroy_session(&self, value: &SessionTokenValue) -> StreamingResult<()> {
        if let Some(removed) = self.store.delete_session(value)? {
            debug!("Destroyed a session of artist {}", removed.artist_id);
        }
        Ok(())
    }

    pub fn prune_expired_sessions(&self) -> StreamingResult<usize> {
        let cutoff = SystemTime::now()
            .checked_sub(self.session_max_age)
            .unwrap_or(SystemTime::UNIX_EPOCH);
        Ok(self.store.prune_sessions_created_before(cutoff)?)
    }

    fn is_expired(&self, token: &SessionToken) -> bool {
        match SystemTime::now().duration_since(token.created) {
            Ok(age) => age > self.session_max_age,
            Err(_) => false,
        }
    }
}
