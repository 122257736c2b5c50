pub mod auth;
mod artist_manager;
mod artist_store;
pub mod gate;
mod models;

pub use artist_manager::ArtistManager;
pub use artist_store::{ArtistStore, FullArtistStore, SessionStore};
pub use auth::{SessionToken, SessionTokenValue};
pub use gate::{require_authenticated, require_owner};
pub use models::{ArtistCredentials, ArtistId, ArtistIdentity};
