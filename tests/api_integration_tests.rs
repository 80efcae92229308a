//! Integration Tests for API Endpoints
//!
//! Drives the full router against a mock MFL upstream.

use axum::{
    body::Body,
    http::{HeaderValue, Request, StatusCode},
    Router,
};
use mfl_proxy::{create_router, AppState, Config, RateLimitSettings};
use serde_json::{json, Value};
use tower::ServiceExt;
use wiremock::matchers::{body_string_contains, method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

const CREDENTIAL: &str = "MFL_USER_ID=u55";

// == Helper Functions ==

fn create_test_app(server: &MockServer) -> Router {
    let config = Config::default().with_base_url(server.uri());
    create_router(AppState::from_config(&config).unwrap())
}

async fn send(app: &Router, mut request: Request<Body>) -> (StatusCode, Value) {
    if !request.headers().contains_key("x-forwarded-for") {
        request
            .headers_mut()
            .insert("x-forwarded-for", HeaderValue::from_static("203.0.113.7"));
    }
    let response = app.clone().oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    (status, serde_json::from_slice(&bytes).unwrap())
}

fn get(uri: &str) -> Request<Body> {
    Request::builder().uri(uri).body(Body::empty()).unwrap()
}

fn post_json(uri: &str, credential: Option<&str>, body: Value) -> Request<Body> {
    let mut builder = Request::builder()
        .method("POST")
        .uri(uri)
        .header("content-type", "application/json");
    if let Some(credential) = credential {
        builder = builder.header("x-mfl-cookie", credential);
    }
    builder.body(Body::from(body.to_string())).unwrap()
}

async fn mount_login(server: &MockServer) {
    Mock::given(method("POST"))
        .and(path("/login"))
        .respond_with(
            ResponseTemplate::new(200).set_body_string(r#"<status MFL_USER_ID="u55">OK</status>"#),
        )
        .mount(server)
        .await;
}

async fn mount_leagues(server: &MockServer) {
    Mock::given(method("GET"))
        .and(path("/export"))
        .and(query_param("TYPE", "myleagues"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "leagues": {"league": [{
                "league_id": "L1",
                "name": "Dynasty",
                "franchise_id": "0004",
                "franchise_name": "Sharks"
            }]}
        })))
        .mount(server)
        .await;
}

async fn login(app: &Router) {
    let (status, body) = send(
        app,
        post_json(
            "/api/auth/login",
            None,
            json!({"username": "coach", "password": "secret"}),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::OK, "login failed: {}", body);
}

// == Cached Reads ==

#[tokio::test]
async fn test_second_read_is_served_from_cache() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/export"))
        .and(query_param("TYPE", "leagueStandings"))
        .and(query_param("L", "L1"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "version": "1.0",
            "encoding": "utf-8",
            "leagueStandings": {"franchise": [{"id": "0001", "h2hw": "9"}]}
        })))
        .expect(1)
        .mount(&server)
        .await;
    let app = create_test_app(&server);

    let (status, first) = send(&app, get("/api/leagues/L1/standings")).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(first["success"], true);
    assert_eq!(first["data"]["franchise"][0]["h2hw"], "9");

    let (_, second) = send(&app, get("/api/leagues/L1/standings")).await;
    assert_eq!(first, second);

    let (_, stats) = send(&app, get("/api/stats")).await;
    assert_eq!(stats["data"]["cache"]["hits"], 1);
    assert_eq!(stats["data"]["cache"]["misses"], 1);
    assert_eq!(stats["data"]["queue"]["requestsPerSecond"], 2);
}

#[tokio::test]
async fn test_malformed_envelope_returns_500_and_is_not_cached() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/export"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "version": "1.0",
            "encoding": "utf-8"
        })))
        .expect(2)
        .mount(&server)
        .await;
    let app = create_test_app(&server);

    let (status, body) = send(&app, get("/api/leagues/L1")).await;
    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(body["success"], false);

    let (status, _) = send(&app, get("/api/leagues/L1")).await;
    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
}

#[tokio::test]
async fn test_upstream_failure_is_bad_gateway() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(503))
        .mount(&server)
        .await;
    let app = create_test_app(&server);

    let (status, body) = send(&app, get("/api/players?position=QB")).await;
    assert_eq!(status, StatusCode::BAD_GATEWAY);
    assert_eq!(body["details"]["upstreamStatus"], 503);
}

#[tokio::test]
async fn test_invalidate_league_endpoint() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(query_param("TYPE", "rosters"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "version": "1.0",
            "rosters": {"franchise": []}
        })))
        .expect(2)
        .mount(&server)
        .await;
    let app = create_test_app(&server);

    send(&app, get("/api/leagues/L1/rosters")).await;

    let request = Request::builder()
        .method("DELETE")
        .uri("/api/cache/leagues/L1")
        .body(Body::empty())
        .unwrap();
    let (status, body) = send(&app, request).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["removed"], 1);

    let (status, _) = send(&app, get("/api/leagues/L1/rosters")).await;
    assert_eq!(status, StatusCode::OK);
}

// == Auth ==

#[tokio::test]
async fn test_login_and_session() {
    let server = MockServer::start().await;
    mount_login(&server).await;
    mount_leagues(&server).await;
    let app = create_test_app(&server);

    let (status, body) = send(
        &app,
        post_json(
            "/api/auth/login",
            None,
            json!({"username": "coach", "password": "secret"}),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["message"], "Login successful");
    assert_eq!(body["data"]["cookie"], CREDENTIAL);
    assert_eq!(body["data"]["leagues"][0]["franchise_name"], "Sharks");

    let request = Request::builder()
        .uri("/api/auth/session")
        .header("x-mfl-cookie", CREDENTIAL)
        .body(Body::empty())
        .unwrap();
    let (status, body) = send(&app, request).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["username"], "coach");
}

#[tokio::test]
async fn test_login_with_league_failure_still_succeeds() {
    let server = MockServer::start().await;
    mount_login(&server).await;
    Mock::given(method("GET"))
        .and(query_param("TYPE", "myleagues"))
        .respond_with(ResponseTemplate::new(500))
        .mount(&server)
        .await;
    let app = create_test_app(&server);

    let (status, body) = send(
        &app,
        post_json(
            "/api/auth/login",
            None,
            json!({"username": "coach", "password": "secret"}),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["leagues"], json!([]));
}

#[tokio::test]
async fn test_invalid_login() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/login"))
        .respond_with(ResponseTemplate::new(200).set_body_string("<error>Invalid Password</error>"))
        .mount(&server)
        .await;
    let app = create_test_app(&server);

    let (status, body) = send(
        &app,
        post_json(
            "/api/auth/login",
            None,
            json!({"username": "coach", "password": "wrong"}),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["message"], "Invalid MFL credentials");
}

#[tokio::test]
async fn test_login_validation_never_calls_upstream() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(200))
        .expect(0)
        .mount(&server)
        .await;
    let app = create_test_app(&server);

    let (status, body) = send(
        &app,
        post_json("/api/auth/login", None, json!({"username": "   "})),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["details"][0]["message"], "MFL username is required");
    assert_eq!(body["details"][1]["message"], "MFL password is required");
}

#[tokio::test]
async fn test_logout_ends_session() {
    let server = MockServer::start().await;
    mount_login(&server).await;
    mount_leagues(&server).await;
    let app = create_test_app(&server);
    login(&app).await;

    let (status, body) = send(&app, post_json("/api/auth/logout", Some(CREDENTIAL), json!({}))).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["message"], "Logged out successfully");

    let request = Request::builder()
        .uri("/api/auth/session")
        .header("x-mfl-cookie", CREDENTIAL)
        .body(Body::empty())
        .unwrap();
    let (status, _) = send(&app, request).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
}

// == Write Passthroughs ==

#[tokio::test]
async fn test_write_without_session_makes_no_upstream_call() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/export"))
        .respond_with(ResponseTemplate::new(200).set_body_string("<status>OK</status>"))
        .expect(0)
        .mount(&server)
        .await;
    let app = create_test_app(&server);

    let (status, body) = send(
        &app,
        post_json(
            "/api/auth/L1/lineup",
            Some(CREDENTIAL),
            json!({"players": ["1"]}),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["message"], "Session expired");
}

#[tokio::test]
async fn test_write_for_unknown_league_is_404() {
    let server = MockServer::start().await;
    mount_login(&server).await;
    mount_leagues(&server).await;
    let app = create_test_app(&server);
    login(&app).await;

    let (status, _) = send(
        &app,
        post_json(
            "/api/auth/L9/waiver",
            Some(CREDENTIAL),
            json!({"addPlayerId": "13593"}),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_rejected_write_is_400() {
    let server = MockServer::start().await;
    mount_login(&server).await;
    mount_leagues(&server).await;
    Mock::given(method("POST"))
        .and(path("/export"))
        .and(body_string_contains("TYPE=waiver"))
        .respond_with(ResponseTemplate::new(200).set_body_string("<error>Player not available</error>"))
        .mount(&server)
        .await;
    let app = create_test_app(&server);
    login(&app).await;

    let (status, body) = send(
        &app,
        post_json(
            "/api/auth/L1/waiver",
            Some(CREDENTIAL),
            json!({"addPlayerId": "13593", "dropPlayerId": "9988"}),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["message"], "Player not available");
}

#[tokio::test]
async fn test_successful_write_invalidates_league_cache() {
    let server = MockServer::start().await;
    mount_login(&server).await;
    mount_leagues(&server).await;
    Mock::given(method("GET"))
        .and(query_param("TYPE", "rosters"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "version": "1.0",
            "rosters": {"franchise": []}
        })))
        .expect(2)
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path("/export"))
        .and(body_string_contains("TYPE=roster"))
        .respond_with(ResponseTemplate::new(200).set_body_string("<status>OK</status>"))
        .expect(1)
        .mount(&server)
        .await;
    let app = create_test_app(&server);
    login(&app).await;

    send(&app, get("/api/leagues/L1/rosters")).await;

    let (status, body) = send(
        &app,
        post_json(
            "/api/auth/L1/lineup",
            Some(CREDENTIAL),
            json!({"players": ["1", "2"]}),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["message"], "Lineup updated successfully");
    assert_eq!(body["data"]["status"]["_"], "OK");

    // Rosters were dropped by the write, so this goes upstream again
    send(&app, get("/api/leagues/L1/rosters")).await;
}

// == Misc ==

#[tokio::test]
async fn test_health_and_fallback() {
    let server = MockServer::start().await;
    let app = create_test_app(&server);

    let (status, body) = send(&app, get("/health")).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "OK");
    assert!(body.get("uptime").is_some());

    let (status, body) = send(&app, get("/api/unknown")).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["message"], "Route not found");
}

#[tokio::test]
async fn test_flush_keeps_counters() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "version": "1.0",
            "players": {"player": []}
        })))
        .mount(&server)
        .await;
    let app = create_test_app(&server);

    send(&app, get("/api/players")).await;
    let (status, _) = send(&app, post_json("/api/cache/flush", None, json!({}))).await;
    assert_eq!(status, StatusCode::OK);

    let (_, stats) = send(&app, get("/api/stats")).await;
    assert_eq!(stats["data"]["cache"]["totalEntries"], 0);
    assert_eq!(stats["data"]["cache"]["misses"], 1);
    assert_eq!(stats["data"]["cache"]["sets"], 1);
}

#[tokio::test]
async fn test_rate_limit_rejects_with_envelope() {
    let server = MockServer::start().await;
    let config = Config {
        rate_limit: RateLimitSettings {
            window_ms: 60_000,
            max_requests: 2,
        },
        ..Config::default().with_base_url(server.uri())
    };
    let app = create_router(AppState::from_config(&config).unwrap());

    for _ in 0..2 {
        let (status, _) = send(&app, get("/api/stats")).await;
        assert_eq!(status, StatusCode::OK);
    }

    let (status, body) = send(&app, get("/api/stats")).await;
    assert_eq!(status, StatusCode::TOO_MANY_REQUESTS);
    assert_eq!(body["success"], false);
    assert_eq!(
        body["message"],
        "Too many requests from this IP, please try again later."
    );

    let other = Request::builder()
        .uri("/api/stats")
        .header("x-forwarded-for", "198.51.100.20")
        .body(Body::empty())
        .unwrap();
    let (status, _) = send(&app, other).await;
    assert_eq!(status, StatusCode::OK);

    let (status, _) = send(&app, get("/health")).await;
    assert_eq!(status, StatusCode::OK);
}
