use super::state::ServerState;
use crate::artist::{ArtistIdentity, SessionTokenValue};
use crate::error::StreamingError;

use axum::{extract::FromRequestParts, http::request::Parts};
use axum_extra::extract::cookie::{Cookie, CookieJar};
use tracing::debug;

pub const COOKIE_SESSION_TOKEN_KEY: &str = "session_token";
pub const HEADER_SESSION_TOKEN_KEY: &str = "Authorization";

/// Who is making the request, resolved once and cached in the request
/// extensions. Extraction never rejects an anonymous request, handlers pass
/// `artist` to the gate themselves.
#[derive(Clone, Debug, Default)]
pub struct RequestContext {
    pub artist: Option<ArtistIdentity>,
    /// The token as presented, even if it did not resolve to an artist.
    pub token: Option<SessionTokenValue>,
}

fn extract_session_token_from_cookies(parts: &Parts) -> Option<String> {
    CookieJar::from_headers(&parts.headers)
        .get(COOKIE_SESSION_TOKEN_KEY)
        .map(Cookie::value)
        .filter(|s| !s.is_empty())
        .map(|s| s.to_string())
}

fn extract_session_token_from_headers(parts: &Parts) -> Option<String> {
    parts
        .headers
        .get(HEADER_SESSION_TOKEN_KEY)
        .map(|v| String::from_utf8_lossy(v.as_bytes()).into_owned())
        .filter(|s| !s.is_empty())
}

async fn resolve_request_context(
    parts: &Parts,
    ctx: &ServerState,
) -> Result<RequestContext, StreamingError> {
    let Some(token) = extract_session_token_from_cookies(parts)
        .or_else(|| extract_session_token_from_headers(parts))
    else {
        debug!("No token in cookies nor headers.");
        return Ok(RequestContext::default());
    };

    let token = SessionTokenValue(token);
    let artist = ctx.artist_manager.resolve_session(&token)?;
    match &artist {
        Some(artist) => debug!("Request made by artist {}", artist.id),
        None => debug!("Session token did not resolve to an artist"),
    }

    Ok(RequestContext {
        artist,
        token: Some(token),
    })
}

impl FromRequestParts<ServerState> for RequestContext {
    type Rejection = StreamingError;

    async fn from_request_parts(
        parts: &mut Parts,
        ctx: &ServerState,
    ) -> Result<Self, Self::Rejection> {
        if let Some(cached) = parts.extensions.get::<RequestContext>() {
            return Ok(cached.clone());
        }
        let context = resolve_request_context(parts, ctx).await?;
        parts.extensions.insert(context.clone());
        Ok(context)
    }
}
