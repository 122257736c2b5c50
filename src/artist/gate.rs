//! Guards for operations that need an artist, or a specific one.

use super::{ArtistId, ArtistIdentity};
use crate::error::{StreamingError, StreamingResult};

pub fn require_authenticated(artist: Option<&ArtistIdentity>) -> StreamingResult<&ArtistIdentity> {
    artist.ok_or(StreamingError::Unauthenticated)
}

pub fn require_owner(artist: &ArtistIdentity, owner: ArtistId) -> StreamingResult<()> {
    if artist.id == owner {
        Ok(())
    } else {
        Err(StreamingError::Forbidden)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn amy() -> ArtistIdentity {
        ArtistIdentity {
            id: ArtistId(1),
            name: "amy".to_string(),
        }
    }

    #[test]
    fn anonymous_is_unauthenticated() {
        assert!(matches!(
            require_authenticated(None),
            Err(StreamingError::Unauthenticated)
        ));
        let amy = amy();
        assert_eq!(require_authenticated(Some(&amy)).unwrap(), &amy);
    }

    #[test]
    fn ownership_compares_ids() {
        let amy = amy();
        assert!(require_owner(&amy, ArtistId(1)).is_ok());
        assert!(matches!(
            require_owner(&amy, ArtistId(2)),
            Err(StreamingError::Forbidden)
        ));
    }
}
