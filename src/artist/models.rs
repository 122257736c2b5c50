use serde::{Deserialize, Serialize};

/// Stable surrogate key of an artist, tracks reference their owner by it.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Debug)]
#[serde(transparent)]
pub struct ArtistId(pub i64);

impl std::fmt::Display for ArtistId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// The authenticated artist as seen by request handlers.
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize, Debug)]
pub struct ArtistIdentity {
    pub id: ArtistId,
    pub name: String,
}

/// Stored credentials of an artist, only ever read to verify a login.
#[derive(Clone, Debug)]
pub struct ArtistCredentials {
    pub id: ArtistId,
    pub name: String,
    pub password_hash: String,
}

impl ArtistCredentials {
    pub fn identity(&self) -> ArtistIdentity {
        ArtistIdentity {
            id: self.id,
            name: self.name.clone(),
        }
    }
}
