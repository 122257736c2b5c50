mod schema;
mod sqlite_store;

pub use schema::VERSIONED_SCHEMAS;
pub use sqlite_store::SqliteStore;

use crate::artist::FullArtistStore;
use crate::catalog::CatalogStore;

/// Everything the server needs from persistence.
pub trait FullStore: FullArtistStore + CatalogStore {}

impl<T: FullArtistStore + CatalogStore> FullStore for T {}
