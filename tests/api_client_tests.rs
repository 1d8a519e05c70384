mod support;

use std::time::Duration;

use prasaddys::auth::Token;
use prasaddys::client::ApiClient;
use prasaddys::config::YouTubeConfig;
use prasaddys::error::{ApiError, ErrorCategory};
use prasaddys::types::{Album, Page, PlaybackUpdate};
use prasaddys::util::retry::RetryPolicy;
use pretty_assertions::assert_eq;
use serde_json::{json, Value};
use wiremock::matchers::{body_json, header, method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

use support::memory_credentials;

fn album(key: &str) -> Value {
    json!({
        "album_artist": "A. R. Rahman",
        "album_title": format!("Album {key}"),
        "album_year": 1992,
        "album_rating_key": key,
        "album_thumbnail": format!("/library/metadata/{key}/thumb"),
    })
}

fn client(server: &MockServer) -> ApiClient {
    ApiClient::new(format!("{}/api/media", server.uri())).unwrap()
}

fn signed_in() -> prasaddys::auth::Credentials {
    let credentials = memory_credentials();
    credentials
        .save_token(&Token {
            access_token: "stored-token".to_string(),
            refresh_token: "refresh".to_string(),
            user_id: "u-42".to_string(),
            user_email: None,
            expires_at: None,
        })
        .unwrap();
    credentials
}

#[tokio::test]
async fn fetch_albums_sends_bearer_and_page_query() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/media/albums"))
        .and(query_param("page", "1"))
        .and(query_param("limit", "20"))
        .and(header("authorization", "Bearer stored-token"))
        .and(header("accept", "application/json"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "albums": [album("1"), album("2")],
            "pagination": {"current_page": 1, "total_pages": 3, "total_records": 42, "limit": 20}
        })))
        .expect(1)
        .mount(&server)
        .await;

    let page: Page<Album> = client(&server)
        .with_credentials(signed_in())
        .fetch_albums(1, 20)
        .await
        .unwrap();

    assert_eq!(page.len(), 2);
    assert!(page.len() <= 20);
    assert_eq!(page.items[1].id(), "2");
    let meta = page.pagination.unwrap();
    assert_eq!(meta.current_page, 1);
    assert_eq!(meta.total_records, 42);
    assert!(meta.has_next_page());
}

#[tokio::test]
async fn explicit_token_overrides_stored_token() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/media/albums/search"))
        .and(query_param("q", "roja"))
        .and(header("authorization", "Bearer explicit"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"items": [album("7")]})))
        .expect(1)
        .mount(&server)
        .await;

    let page = client(&server)
        .with_credentials(signed_in())
        .with_token("explicit")
        .search_albums("roja", 1, 20)
        .await
        .unwrap();
    assert_eq!(page.items[0].album_title, "Album 7");
}

#[tokio::test]
async fn non_success_status_keeps_body() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/media/albums/album/9"))
        .respond_with(ResponseTemplate::new(404).set_body_string("no such album"))
        .mount(&server)
        .await;

    let err = client(&server).fetch_album_by_id("9").await.unwrap_err();
    match &err {
        ApiError::Http { status, body } => {
            assert_eq!(*status, 404);
            assert_eq!(body, "no such album");
        }
        other => panic!("expected Http error, got {other:?}"),
    }
    assert_eq!(err.category(), ErrorCategory::Http);
}

#[tokio::test]
async fn malformed_body_is_decoding_error() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/media/tracks/track/5"))
        .respond_with(ResponseTemplate::new(200).set_body_string("{\"track_id\": 5"))
        .mount(&server)
        .await;

    let err = client(&server).fetch_track_by_id("5").await.unwrap_err();
    assert!(matches!(err, ApiError::Decoding(_)));
}

#[tokio::test]
async fn playback_save_without_user_sends_nothing() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(200))
        .expect(0)
        .mount(&server)
        .await;

    let update = PlaybackUpdate::builder().current_playing_track("t-1").build();
    let err = client(&server)
        .with_credentials(memory_credentials())
        .save_playback_state(update)
        .await
        .unwrap_err();
    assert!(matches!(err, ApiError::MissingUserId));
}

#[tokio::test]
async fn playback_save_posts_state_with_user_id() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/media/user/playback/state/save"))
        .and(header("content-type", "application/json"))
        .and(body_json(json!({
            "user_id": "u-42",
            "current_playing_track": "t-1",
            "playback_position": 12.5,
            "is_shuffle_enabled": true,
            "shuffled_track_context": ["t-3", "t-1"],
            "original_track_context": ["t-1", "t-3"]
        })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"status": "ok"})))
        .expect(1)
        .mount(&server)
        .await;

    let update = PlaybackUpdate::builder()
        .current_playing_track("t-1")
        .playback_position(12.5)
        .is_shuffle_enabled(true)
        .shuffled_track_context(vec!["t-3".into(), "t-1".into()])
        .original_track_context(vec!["t-1".into(), "t-3".into()])
        .build();
    client(&server)
        .with_credentials(signed_in())
        .save_playback_state(update)
        .await
        .unwrap();
}

#[tokio::test]
async fn playback_state_is_fetched_for_stored_user() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/media/user/playback/state/get/u-42"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "playback_state": {
                "playback_position": 30.0,
                "is_shuffle_enabled": false,
                "current_playing_track": "t-9",
                "tracks": []
            },
            "pagination": {"current_page": 1, "total_pages": 1, "total_records": 0, "limit": 20}
        })))
        .expect(1)
        .mount(&server)
        .await;

    let state = client(&server)
        .with_credentials(signed_in())
        .fetch_playback_state()
        .await
        .unwrap();
    assert_eq!(state.playback_state.current_playing_track.as_deref(), Some("t-9"));
    assert_eq!(state.playback_state.playback_position, 30.0);
}

#[tokio::test]
async fn youtube_search_uses_api_key_not_bearer() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/youtube/v3/search"))
        .and(query_param("part", "snippet"))
        .and(query_param("q", "ilaiyaraaja"))
        .and(query_param("type", "video"))
        .and(query_param("key", "yt-key"))
        .and(query_param("pageToken", "CAUQAA"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "nextPageToken": "CAoQAA",
            "items": [{
                "id": {"kind": "youtube#video", "videoId": "abc123"},
                "snippet": {
                    "title": "Song",
                    "description": "",
                    "thumbnails": {"high": {"url": "https://i.ytimg.com/vi/abc123/hq.jpg"}},
                    "channelTitle": "Channel"
                }
            }]
        })))
        .expect(1)
        .mount(&server)
        .await;

    let results = client(&server)
        .with_token("media-token")
        .with_youtube(YouTubeConfig {
            api_url: format!("{}/youtube/v3/search", server.uri()),
            api_key: "yt-key".to_string(),
        })
        .search_youtube("ilaiyaraaja", Some("CAUQAA"))
        .await
        .unwrap();

    assert_eq!(results.next_page_token.as_deref(), Some("CAoQAA"));
    assert_eq!(results.items[0].id(), "abc123");

    let requests = server.received_requests().await.unwrap();
    assert!(requests[0].headers.get("authorization").is_none());
}

#[tokio::test]
async fn youtube_search_without_config_is_configuration_error() {
    let server = MockServer::start().await;
    let err = client(&server).search_youtube("x", None).await.unwrap_err();
    assert!(matches!(err, ApiError::Configuration(_)));
}

#[tokio::test]
async fn get_retries_server_errors_under_policy() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/media/movies"))
        .respond_with(ResponseTemplate::new(503))
        .up_to_n_times(2)
        .expect(2)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/api/media/movies"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"movies": []})))
        .expect(1)
        .mount(&server)
        .await;

    let page = client(&server)
        .with_retry_policy(
            RetryPolicy::default()
                .with_max_attempts(3)
                .with_initial_backoff(Duration::from_millis(1)),
        )
        .fetch_movies(1, 20)
        .await
        .unwrap();
    assert!(page.is_empty());
}

#[tokio::test]
async fn default_policy_does_not_retry() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/media/movies"))
        .respond_with(ResponseTemplate::new(503))
        .expect(1)
        .mount(&server)
        .await;

    let err = client(&server).fetch_movies(1, 20).await.unwrap_err();
    assert!(err.is_retryable());
    assert!(matches!(err, ApiError::Http { status: 503, .. }));
}
