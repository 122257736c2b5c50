use anyhow::{Context, Result};
use std::sync::Arc;

use tracing::{error, info};

use axum_extra::extract::cookie::{Cookie, SameSite};
use tower_http::services::ServeDir;

use axum::{
    extract::{Path, Query, State},
    http::{header, StatusCode},
    middleware,
    response::{IntoResponse, Redirect, Response},
    routing::{get, post},
    Form, Json, Router,
};
use serde::{Deserialize, Serialize};

use super::{
    log_requests, session::COOKIE_SESSION_TOKEN_KEY, state::*, RequestContext, ServerConfig,
};
use crate::artist::{require_authenticated, ArtistIdentity, ArtistManager};
use crate::catalog::{
    DurationStats, Genre, StatsService, TitleAndLength, Track, TrackForm, TrackId, TrackListing,
    TrackRepository,
};
use crate::error::{StreamingError, StreamingResult};
use crate::store::FullStore;

const LOGIN_PATH: &str = "/auth/login";

#[derive(Serialize)]
struct ErrorBody {
    error: String,
}

impl IntoResponse for StreamingError {
    fn into_response(self) -> Response {
        let message = self.to_string();
        match self {
            StreamingError::Unauthenticated => Redirect::to(LOGIN_PATH).into_response(),
            StreamingError::Forbidden => StatusCode::FORBIDDEN.into_response(),
            StreamingError::NotFound => StatusCode::NOT_FOUND.into_response(),
            StreamingError::Validation(_) => (
                StatusCode::UNPROCESSABLE_ENTITY,
                Json(ErrorBody { error: message }),
            )
                .into_response(),
            StreamingError::AlreadyExists => Redirect::to(&format!(
                "{}?message={}",
                LOGIN_PATH,
                urlencoding::encode(&message)
            ))
            .into_response(),
            StreamingError::InvalidCredentials => {
                (StatusCode::UNAUTHORIZED, Json(ErrorBody { error: message })).into_response()
            }
            StreamingError::Store(err) => {
                error!("Store failure: {:#}", err);
                StatusCode::INTERNAL_SERVER_ERROR.into_response()
            }
        }
    }
}

#[derive(Deserialize, Debug)]
struct CredentialsBody {
    #[serde(default, alias = "artist_name")]
    pub name: String,
    #[serde(default)]
    pub password: String,
}

#[derive(Deserialize, Debug)]
struct GenreBody {
    pub title: Option<String>,
}

#[derive(Deserialize, Debug)]
struct LoginPageQuery {
    pub message: Option<String>,
}

#[derive(Serialize)]
struct LoginPage {
    message: Option<String>,
}

#[derive(Serialize)]
struct LoginSuccessResponse {
    token: String,
    artist: ArtistIdentity,
}

#[derive(Serialize)]
struct CreatedResponse<T: Serialize> {
    id: T,
}

#[derive(Serialize)]
struct IndexResponse {
    artist: Option<ArtistIdentity>,
    tracks: Vec<TrackListing>,
}

#[derive(Serialize)]
struct UpdatePage {
    track: Track,
    genres: Vec<Genre>,
}

#[derive(Serialize)]
struct CountResponse {
    count: usize,
}

#[derive(Serialize)]
struct GenreCountResponse {
    genre: String,
    count: usize,
}

fn created<T: Serialize>(id: T) -> Response {
    (StatusCode::CREATED, Json(CreatedResponse { id })).into_response()
}

fn expired_session_cookie() -> Cookie<'static> {
    Cookie::build(Cookie::new(COOKIE_SESSION_TOKEN_KEY, ""))
        .path("/")
        .expires(time::OffsetDateTime::now_utc() - time::Duration::days(1))
        .same_site(SameSite::Lax)
        .build()
}

// =============================================================================
// Auth
// =============================================================================

async fn register(
    State(artist_manager): State<GuardedArtistManager>,
    Form(body): Form<CredentialsBody>,
) -> StreamingResult<Response> {
    let id = artist_manager.register(&body.name, &body.password)?;
    Ok(created(id))
}

async fn login_page(Query(query): Query<LoginPageQuery>) -> Json<LoginPage> {
    Json(LoginPage {
        message: query.message,
    })
}

async fn login(
    context: RequestContext,
    State(artist_manager): State<GuardedArtistManager>,
    Form(body): Form<CredentialsBody>,
) -> StreamingResult<Response> {
    let artist = artist_manager.verify(&body.name, &body.password)?;
    let session = artist_manager.create_session(&artist, context.token.as_ref())?;
    info!("Artist {} logged in", artist.id);

    let cookie = Cookie::build(Cookie::new(
        COOKIE_SESSION_TOKEN_KEY,
        session.value.0.clone(),
    ))
    .path("/")
    .http_only(true)
    .same_site(SameSite::Lax)
    .build();

    let body = LoginSuccessResponse {
        token: session.value.0,
        artist,
    };
    Ok((
        StatusCode::CREATED,
        [(header::SET_COOKIE, cookie.to_string())],
        Json(body),
    )
        .into_response())
}

async fn logout(
    context: RequestContext,
    State(artist_manager): State<GuardedArtistManager>,
) -> StreamingResult<Response> {
    if let Some(token) = &context.token {
        artist_manager.destroy_session(token)?;
    }
    Ok((
        [(header::SET_COOKIE, expired_session_cookie().to_string())],
        Redirect::to("/"),
    )
        .into_response())
}

// =============================================================================
// Genres and tracks
// =============================================================================

async fn index(
    context: RequestContext,
    State(repository): State<GuardedTrackRepository>,
) -> StreamingResult<Json<IndexResponse>> {
    Ok(Json(IndexResponse {
        artist: context.artist,
        tracks: repository.list_tracks()?,
    }))
}

async fn list_genres(
    State(repository): State<GuardedTrackRepository>,
) -> StreamingResult<Json<Vec<Genre>>> {
    Ok(Json(repository.list_genres()?))
}

async fn create_genre(
    context: RequestContext,
    State(repository): State<GuardedTrackRepository>,
    Form(body): Form<GenreBody>,
) -> StreamingResult<Response> {
    require_authenticated(context.artist.as_ref())?;
    let id = repository.create_genre(body.title.as_deref())?;
    Ok(created(id))
}

async fn create_track(
    context: RequestContext,
    State(repository): State<GuardedTrackRepository>,
    Form(form): Form<TrackForm>,
) -> StreamingResult<Response> {
    let artist = require_authenticated(context.artist.as_ref())?;
    let id = repository.create_track(artist, &form)?;
    Ok(created(id))
}

async fn get_update_page(
    context: RequestContext,
    State(repository): State<GuardedTrackRepository>,
    Path(id): Path<i64>,
) -> StreamingResult<Json<UpdatePage>> {
    let artist = require_authenticated(context.artist.as_ref())?;
    let track = repository.get_track(TrackId(id), Some(artist))?;
    Ok(Json(UpdatePage {
        track,
        genres: repository.list_genres()?,
    }))
}

async fn update_track(
    context: RequestContext,
    State(repository): State<GuardedTrackRepository>,
    Path(id): Path<i64>,
    Form(form): Form<TrackForm>,
) -> StreamingResult<Json<Track>> {
    let artist = require_authenticated(context.artist.as_ref())?;
    repository.update_track(TrackId(id), &form, artist)?;
    Ok(Json(repository.get_track(TrackId(id), None)?))
}

async fn delete_track(
    context: RequestContext,
    State(repository): State<GuardedTrackRepository>,
    Path(id): Path<i64>,
) -> StreamingResult<StatusCode> {
    let artist = require_authenticated(context.artist.as_ref())?;
    repository.delete_track(TrackId(id), artist)?;
    Ok(StatusCode::NO_CONTENT)
}

// =============================================================================
// Statistics
// =============================================================================

async fn count_artists(
    State(stats): State<GuardedStatsService>,
) -> StreamingResult<Json<CountResponse>> {
    Ok(Json(CountResponse {
        count: stats.count_distinct_artists()?,
    }))
}

async fn count_tracks(
    State(stats): State<GuardedStatsService>,
) -> StreamingResult<Json<CountResponse>> {
    Ok(Json(CountResponse {
        count: stats.count_tracks()?,
    }))
}

async fn count_tracks_by_genre(
    State(stats): State<GuardedStatsService>,
    Path(genre): Path<String>,
) -> StreamingResult<Json<GenreCountResponse>> {
    let count = stats.count_tracks_by_genre(&genre)?;
    Ok(Json(GenreCountResponse { genre, count }))
}

async fn titles_and_lengths(
    State(stats): State<GuardedStatsService>,
) -> StreamingResult<Json<Vec<TitleAndLength>>> {
    Ok(Json(stats.list_titles_and_lengths()?))
}

async fn duration_stats(
    State(stats): State<GuardedStatsService>,
) -> StreamingResult<Json<DurationStats>> {
    Ok(Json(stats.duration_stats()?))
}

impl ServerState {
    fn new<S: FullStore + 'static>(
        config: ServerConfig,
        store: Arc<S>,
        session_max_age_days: u64,
    ) -> ServerState {
        ServerState {
            config,
            artist_manager: Arc::new(ArtistManager::new(store.clone(), session_max_age_days)),
            track_repository: Arc::new(TrackRepository::new(store.clone())),
            stats_service: Arc::new(StatsService::new(store)),
        }
    }
}

pub fn make_app<S: FullStore + 'static>(
    config: ServerConfig,
    store: Arc<S>,
    session_max_age_days: u64,
) -> Result<Router> {
    let state = ServerState::new(config.clone(), store, session_max_age_days);

    let auth_routes: Router = Router::new()
        .route("/register", post(register))
        .route("/login", get(login_page).post(login))
        .route("/logout", get(logout))
        .with_state(state.clone());

    let track_routes: Router = Router::new()
        .route("/", get(index))
        .route("/genres", get(list_genres))
        .route("/create_genre", post(create_genre))
        .route("/create", post(create_track))
        .route("/{id}/update", get(get_update_page).post(update_track))
        .route("/{id}/delete", post(delete_track))
        .with_state(state.clone());

    let stats_routes: Router = Router::new()
        .route("/names", get(count_artists))
        .route("/tracks", get(count_tracks))
        .route("/tracks/{genre}", get(count_tracks_by_genre))
        .route("/tracks-sec", get(titles_and_lengths))
        .route("/tracks-sec/statistics", get(duration_stats))
        .with_state(state.clone());

    let mut app: Router = track_routes
        .merge(stats_routes)
        .nest("/auth", auth_routes);

    if let Some(frontend_path) = config.frontend_dir_path {
        let static_files_service =
            ServeDir::new(frontend_path).append_index_html_on_directories(true);
        app = app.fallback_service(static_files_service);
    }

    app = app.layer(middleware::from_fn_with_state(state.clone(), log_requests));

    Ok(app)
}

pub async fn run_server<S: FullStore + 'static>(
    store: Arc<S>,
    config: ServerConfig,
    session_max_age_days: u64,
) -> Result<()> {
    let port = config.port;
    let app = make_app(config, store, session_max_age_days)?;

    let listener = tokio::net::TcpListener::bind(format!("127.0.0.1:{}", port))
        .await
        .with_context(|| format!("Failed to bind port {}", port))?;
    info!("Listening on port {}", port);

    Ok(axum::serve(listener, app).await?)
}
