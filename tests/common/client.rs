//! HTTP client for end-to-end tests
//!
//! Wraps reqwest with one method per server endpoint. When routes or form
//! fields change, update only this file.

#![allow(dead_code)]

use super::constants::*;
use reqwest::{redirect, Response};
use std::time::Duration;

/// HTTP test client with cookie-based session management
///
/// Redirects are not followed, so tests can assert on them.
pub struct TestClient {
    /// The underlying reqwest client (public for custom requests in tests)
    pub client: reqwest::Client,
    /// The base URL of the test server
    pub base_url: String,
}

impl TestClient {
    /// Creates a new anonymous client
    pub fn new(base_url: String) -> Self {
        let client = reqwest::Client::builder()
            .cookie_store(true)
            .redirect(redirect::Policy::none())
            .timeout(Duration::from_secs(REQUEST_TIMEOUT_SECS))
            .build()
            .expect("Failed to build reqwest client");

        Self { client, base_url }
    }

    /// Creates a client logged in as the seeded test artist
    ///
    /// # Panics
    ///
    /// Panics if authentication fails (indicates test infrastructure problem).
    pub async fn authenticated(base_url: String) -> Self {
        Self::authenticated_as(base_url, TEST_ARTIST, TEST_PASS).await
    }

    /// Creates a client logged in as the second seeded artist
    pub async fn authenticated_other(base_url: String) -> Self {
        Self::authenticated_as(base_url, OTHER_ARTIST, OTHER_PASS).await
    }

    pub async fn authenticated_as(base_url: String, name: &str, password: &str) -> Self {
        let client = Self::new(base_url);

        let response = client.login(name, password).await;
        assert_eq!(
            response.status(),
            reqwest::StatusCode::CREATED,
            "Authentication of {} failed: {:?}",
            name,
            response.text().await
        );

        client
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    async fn get(&self, path: &str) -> Response {
        self.client
            .get(self.url(path))
            .send()
            .await
            .unwrap_or_else(|e| panic!("GET {} failed: {}", path, e))
    }

    async fn post_form(&self, path: &str, form: &[(&str, &str)]) -> Response {
        self.client
            .post(self.url(path))
            .form(form)
            .send()
            .await
            .unwrap_or_else(|e| panic!("POST {} failed: {}", path, e))
    }

    // ========================================================================
    // Authentication Endpoints
    // ========================================================================

    /// POST /auth/register
    pub async fn register(&self, name: &str, password: &str) -> Response {
        self.post_form("/auth/register", &[("name", name), ("password", password)])
            .await
    }

    /// POST /auth/login
    pub async fn login(&self, name: &str, password: &str) -> Response {
        self.post_form("/auth/login", &[("name", name), ("password", password)])
            .await
    }

    /// GET /auth/logout
    pub async fn logout(&self) -> Response {
        self.get("/auth/logout").await
    }

    // ========================================================================
    // Genre and Track Endpoints
    // ========================================================================

    /// GET /
    pub async fn index(&self) -> Response {
        self.get("/").await
    }

    /// GET /genres
    pub async fn list_genres(&self) -> Response {
        self.get("/genres").await
    }

    /// POST /create_genre
    pub async fn create_genre(&self, title: &str) -> Response {
        self.post_form("/create_genre", &[("title", title)]).await
    }

    /// POST /create
    pub async fn create_track(&self, title: &str, length: &str, genre_id: i64) -> Response {
        let genre_id = genre_id.to_string();
        self.post_form(
            "/create",
            &[("title", title), ("length", length), ("genre_id", genre_id.as_str())],
        )
        .await
    }

    /// POST /create with arbitrary fields, for validation tests
    pub async fn create_track_raw(&self, form: &[(&str, &str)]) -> Response {
        self.post_form("/create", form).await
    }

    /// GET /{id}/update
    pub async fn get_update_page(&self, id: i64) -> Response {
        self.get(&format!("/{}/update", id)).await
    }

    /// POST /{id}/update
    pub async fn update_track(
        &self,
        id: i64,
        title: &str,
        length: &str,
        genre_id: i64,
    ) -> Response {
        let genre_id = genre_id.to_string();
        self.post_form(
            &format!("/{}/update", id),
            &[("title", title), ("length", length), ("genre_id", genre_id.as_str())],
        )
        .await
    }

    /// POST /{id}/delete
    pub async fn delete_track(&self, id: i64) -> Response {
        self.post_form(&format!("/{}/delete", id), &[]).await
    }

    // ========================================================================
    // Statistics Endpoints
    // ========================================================================

    /// GET /names
    pub async fn count_artists(&self) -> Response {
        self.get("/names").await
    }

    /// GET /tracks
    pub async fn count_tracks(&self) -> Response {
        self.get("/tracks").await
    }

    /// GET /tracks/{genre}
    pub async fn count_tracks_by_genre(&self, genre: &str) -> Response {
        self.get(&format!("/tracks/{}", urlencoding::encode(genre)))
            .await
    }

    /// GET /tracks-sec
    pub async fn titles_and_lengths(&self) -> Response {
        self.get("/tracks-sec").await
    }

    /// GET /tracks-sec/statistics
    pub async fn duration_stats(&self) -> Response {
        self.get("/tracks-sec/statistics").await
    }
}
