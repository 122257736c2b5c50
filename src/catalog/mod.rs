mod models;
mod repository;
mod stats;
mod trait_def;
pub mod validation;

pub use models::*;
pub use repository::TrackRepository;
pub use stats::StatsService;
pub use trait_def::CatalogStore;
