//! Typed HTTP client for the media API.

use std::time::Duration;

use reqwest::header::{HeaderValue, ACCEPT, CONTENT_TYPE};
use reqwest::{Method, Url};
use serde::de::DeserializeOwned;
use serde::Serialize;

use crate::auth::Credentials;
use crate::config::{AppConfig, YouTubeConfig};
use crate::error::{ApiError, Result};
use crate::types::{
    AlbumDetail, Album, Movie, MovieDetail, Page, PlaybackStateResponse, PlaybackUpdate, Track,
    TracksResponse, YouTubeSearchResults,
};
use crate::util::retry::RetryPolicy;

/// Page size used by every list endpoint unless the caller overrides it.
pub const DEFAULT_PAGE_SIZE: u32 = 20;
const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

/// Media API client.
///
/// Every call attaches `Authorization: Bearer <token>` when a token is
/// available (an explicit [`with_token`](Self::with_token) first, then the
/// access token in [`Credentials`]) and decodes 2xx JSON bodies. Other
/// statuses become [`ApiError::Http`].
///
/// # Example
/// ```no_run
/// use prasaddys::client::ApiClient;
///
/// # async fn run() -> prasaddys::error::Result<()> {
/// let client = ApiClient::new("https://media.example.com/api/media")?.with_token("token");
/// let page = client.fetch_albums(1, 20).await?;
/// for album in page.items {
///     println!("{} ({})", album.album_title, album.album_year);
/// }
/// # Ok(())
/// # }
/// ```
#[derive(Clone)]
pub struct ApiClient {
    http: reqwest::Client,
    base_url: Url,
    token: Option<String>,
    credentials: Option<Credentials>,
    youtube: Option<YouTubeConfig>,
    retry: RetryPolicy,
}

impl std::fmt::Debug for ApiClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ApiClient")
            .field("base_url", &self.base_url.as_str())
            .field("token", &self.token.as_ref().map(|_| ".."))
            .field("youtube", &self.youtube.is_some())
            .field("retry", &self.retry)
            .finish_non_exhaustive()
    }
}

impl ApiClient {
    pub fn new(base_url: impl AsRef<str>) -> Result<Self> {
        let raw = base_url.as_ref().trim_end_matches('/');
        let base_url =
            Url::parse(raw).map_err(|err| ApiError::InvalidUrl(format!("{raw}: {err}")))?;
        if base_url.cannot_be_a_base() {
            return Err(ApiError::InvalidUrl(raw.to_string()));
        }
        let http = reqwest::Client::builder()
            .timeout(REQUEST_TIMEOUT)
            .build()?;
        Ok(Self {
            http,
            base_url,
            token: None,
            credentials: None,
            youtube: None,
            retry: RetryPolicy::default(),
        })
    }

    /// Client for `API_URL`, with YouTube search when it is configured.
    pub fn from_config(config: &AppConfig) -> Result<Self> {
        let client = Self::new(config.api_url()?)?;
        Ok(match config.youtube() {
            Some(youtube) => client.with_youtube(youtube),
            None => client,
        })
    }

    pub fn with_token(mut self, token: impl Into<String>) -> Self {
        self.token = Some(token.into());
        self
    }

    pub fn with_credentials(mut self, credentials: Credentials) -> Self {
        self.credentials = Some(credentials);
        self
    }

    pub fn with_youtube(mut self, youtube: YouTubeConfig) -> Self {
        self.youtube = Some(youtube);
        self
    }

    pub fn with_retry_policy(mut self, retry: RetryPolicy) -> Self {
        self.retry = retry;
        self
    }

    pub fn with_http_client(mut self, http: reqwest::Client) -> Self {
        self.http = http;
        self
    }

    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    /// Join `path` onto the base URL, keeping the base path prefix.
    pub fn endpoint_url(&self, path: &str) -> Result<Url> {
        let joined = format!(
            "{}/{}",
            self.base_url.as_str().trim_end_matches('/'),
            path.trim_start_matches('/')
        );
        Url::parse(&joined).map_err(|err| ApiError::InvalidUrl(format!("{joined}: {err}")))
    }

    /// Base URL plus percent-encoded path segments.
    fn resource_url(&self, segments: &[&str]) -> Result<Url> {
        let mut url = self.base_url.clone();
        url.path_segments_mut()
            .map_err(|_| ApiError::InvalidUrl(self.base_url.to_string()))?
            .pop_if_empty()
            .extend(segments);
        Ok(url)
    }

    fn bearer_token(&self) -> Result<Option<String>> {
        if let Some(token) = &self.token {
            return Ok(Some(token.clone()));
        }
        match &self.credentials {
            Some(credentials) => Ok(credentials.access_token()?),
            None => Ok(None),
        }
    }

    fn user_id(&self) -> Result<String> {
        let credentials = self.credentials.as_ref().ok_or(ApiError::MissingUserId)?;
        credentials.user_id()?.ok_or(ApiError::MissingUserId)
    }

    // Generic operations

    /// GET a page-style endpoint with `page`/`limit`.
    pub async fn fetch_data<T: DeserializeOwned>(
        &self,
        endpoint: &str,
        page: u32,
        page_size: u32,
    ) -> Result<T> {
        let query = [("page", page.to_string()), ("limit", page_size.to_string())];
        self.perform_request(Method::GET, endpoint, &query, None::<&()>)
            .await
    }

    /// GET a search endpoint with `q`/`page`/`limit`.
    pub async fn search<T: DeserializeOwned>(
        &self,
        endpoint: &str,
        query: &str,
        page: u32,
        page_size: u32,
    ) -> Result<T> {
        let params = [
            ("q", query.to_string()),
            ("page", page.to_string()),
            ("limit", page_size.to_string()),
        ];
        self.perform_request(Method::GET, endpoint, &params, None::<&()>)
            .await
    }

    /// Send a request to `path` under the base URL and decode the JSON reply.
    pub async fn perform_request<T, B>(
        &self,
        method: Method,
        path: &str,
        query: &[(&str, String)],
        body: Option<&B>,
    ) -> Result<T>
    where
        T: DeserializeOwned,
        B: Serialize + ?Sized,
    {
        let url = self.endpoint_url(path)?;
        let bytes = self.request_bytes(method, url, query, body).await?;
        decode(&bytes)
    }

    /// GET an absolute URL with the client's auth and retry policy and return
    /// the raw body.
    pub async fn get_bytes(&self, url: &Url) -> Result<Vec<u8>> {
        self.request_bytes(Method::GET, url.clone(), &[], None::<&()>)
            .await
    }

    async fn request_bytes<B>(
        &self,
        method: Method,
        url: Url,
        query: &[(&str, String)],
        body: Option<&B>,
    ) -> Result<Vec<u8>>
    where
        B: Serialize + ?Sized,
    {
        let payload = body
            .map(serde_json::to_vec)
            .transpose()
            .map_err(ApiError::Encoding)?;
        let token = self.bearer_token()?;

        if method == Method::GET {
            self.retry
                .execute(|| self.send(Method::GET, &url, query, None, token.as_deref()))
                .await
        } else {
            self.send(method, &url, query, payload, token.as_deref())
                .await
        }
    }

    async fn send(
        &self,
        method: Method,
        url: &Url,
        query: &[(&str, String)],
        payload: Option<Vec<u8>>,
        token: Option<&str>,
    ) -> Result<Vec<u8>> {
        let mut request = self
            .http
            .request(method.clone(), url.clone())
            .header(ACCEPT, HeaderValue::from_static("application/json"));
        if !query.is_empty() {
            request = request.query(query);
        }
        if let Some(token) = token {
            request = request.bearer_auth(token);
        }
        if let Some(payload) = payload {
            request = request
                .header(CONTENT_TYPE, HeaderValue::from_static("application/json"))
                .body(payload);
        }

        let resp = request.send().await?;
        let status = resp.status();
        let bytes = resp.bytes().await?;
        tracing::debug!(
            method = %method,
            endpoint = url.path(),
            status = status.as_u16(),
            "request completed"
        );
        if !status.is_success() {
            return Err(ApiError::http(
                status.as_u16(),
                String::from_utf8_lossy(&bytes).into_owned(),
            ));
        }
        Ok(bytes.to_vec())
    }

    // Media operations

    pub async fn fetch_albums(&self, page: u32, page_size: u32) -> Result<Page<Album>> {
        self.fetch_data("/albums", page, page_size).await
    }

    pub async fn search_albums(
        &self,
        query: &str,
        page: u32,
        page_size: u32,
    ) -> Result<Page<Album>> {
        self.search("/albums/search", query, page, page_size).await
    }

    pub async fn fetch_movies(&self, page: u32, page_size: u32) -> Result<Page<Movie>> {
        self.fetch_data("/movies", page, page_size).await
    }

    pub async fn search_movies(
        &self,
        query: &str,
        page: u32,
        page_size: u32,
    ) -> Result<Page<Movie>> {
        self.search("/movies/search", query, page, page_size).await
    }

    pub async fn fetch_tracks(&self, page: u32, page_size: u32) -> Result<TracksResponse> {
        self.fetch_data("/tracks", page, page_size).await
    }

    pub async fn fetch_album_by_id(&self, album_rating_key: &str) -> Result<AlbumDetail> {
        let url = self.resource_url(&["albums", "album", album_rating_key])?;
        self.get_json(url).await
    }

    pub async fn fetch_movie_by_id(&self, movie_rating_key: &str) -> Result<MovieDetail> {
        let url = self.resource_url(&["movies", "movie", movie_rating_key])?;
        self.get_json(url).await
    }

    pub async fn fetch_track_by_id(&self, track_rating_key: &str) -> Result<Track> {
        let url = self.resource_url(&["tracks", "track", track_rating_key])?;
        self.get_json(url).await
    }

    async fn get_json<T: DeserializeOwned>(&self, url: Url) -> Result<T> {
        let bytes = self.request_bytes(Method::GET, url, &[], None::<&()>).await?;
        decode(&bytes)
    }

    /// Persist the player state for the signed-in user.
    ///
    /// Fails with [`ApiError::MissingUserId`] before any request when no
    /// user id is stored.
    pub async fn save_playback_state(&self, update: PlaybackUpdate) -> Result<()> {
        let payload = update.into_payload(self.user_id()?);
        let url = self.resource_url(&["user", "playback", "state", "save"])?;
        self.request_bytes(Method::POST, url, &[], Some(&payload))
            .await?;
        tracing::debug!("playback state saved");
        Ok(())
    }

    pub async fn fetch_playback_state(&self) -> Result<PlaybackStateResponse> {
        let user_id = self.user_id()?;
        let url = self.resource_url(&["user", "playback", "state", "get", &user_id])?;
        self.get_json(url).await
    }

    /// Search YouTube for videos. Needs `YT_API_KEY`.
    pub async fn search_youtube(
        &self,
        query: &str,
        page_token: Option<&str>,
    ) -> Result<YouTubeSearchResults> {
        let youtube = self.youtube.as_ref().ok_or_else(|| {
            ApiError::Configuration("YouTube API key or URL is missing".to_string())
        })?;
        let url = Url::parse(&youtube.api_url)
            .map_err(|err| ApiError::InvalidUrl(format!("{}: {err}", youtube.api_url)))?;

        let mut params = vec![
            ("part", "snippet".to_string()),
            ("q", query.to_string()),
            ("type", "video".to_string()),
            ("key", youtube.api_key.clone()),
        ];
        if let Some(token) = page_token {
            params.push(("pageToken", token.to_string()));
        }

        // Google authenticates by key; the media token stays off this request.
        let bytes = self
            .retry
            .execute(|| self.send(Method::GET, &url, &params, None, None))
            .await?;
        decode(&bytes)
    }
}

fn decode<T: DeserializeOwned>(bytes: &[u8]) -> Result<T> {
    serde_json::from_slice(bytes).map_err(|err| {
        tracing::warn!(error = %err, "failed to decode response");
        ApiError::Decoding(err)
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn endpoint_url_keeps_base_path() {
        let client = ApiClient::new("https://host.example.com/api/media/").unwrap();
        assert_eq!(
            client.endpoint_url("/albums").unwrap().as_str(),
            "https://host.example.com/api/media/albums"
        );
    }

    #[test]
    fn resource_ids_are_percent_encoded() {
        let client = ApiClient::new("https://host.example.com/api/media").unwrap();
        assert_eq!(
            client
                .resource_url(&["albums", "album", "a/b c"])
                .unwrap()
                .as_str(),
            "https://host.example.com/api/media/albums/album/a%2Fb%20c"
        );
    }

    #[test]
    fn invalid_base_url_is_rejected() {
        assert!(matches!(
            ApiClient::new("not a url"),
            Err(ApiError::InvalidUrl(_))
        ));
    }

    #[test]
    fn missing_credentials_means_missing_user_id() {
        let client = ApiClient::new("https://host.example.com").unwrap();
        assert!(matches!(client.user_id(), Err(ApiError::MissingUserId)));
    }
}
