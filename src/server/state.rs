use axum::extract::FromRef;

use crate::artist::ArtistManager;
use crate::catalog::{StatsService, TrackRepository};
use std::sync::Arc;

use super::ServerConfig;

pub type GuardedArtistManager = Arc<ArtistManager>;
pub type GuardedTrackRepository = Arc<TrackRepository>;
pub type GuardedStatsService = Arc<StatsService>;

#[derive(Clone)]
pub struct ServerState {
    pub config: ServerConfig,
    pub artist_manager: GuardedArtistManager,
    pub track_repository: GuardedTrackRepository,
    pub stats_service: GuardedStatsService,
}

impl FromRef<ServerState> for GuardedArtistManager {
    fn from_ref(input: &ServerState) -> Self {
        input.artist_manager.clone()
    }
}

impl FromRef<ServerState> for GuardedTrackRepository {
    fn from_ref(input: &ServerState) -> Self {
        input.track_repository.clone()
    }
}

impl FromRef<ServerState> for GuardedStatsService {
    fn from_ref(input: &ServerState) -> Self {
        input.stats_service.clone()
    }
}
