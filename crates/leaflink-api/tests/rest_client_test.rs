// Integration tests for `RestClient` and `WeatherClient` using wiremock.
#![allow(clippy::unwrap_used)]

use chrono::NaiveDate;
use secrecy::SecretString;
use serde_json::json;
use url::Url;
use wiremock::matchers::{body_json, header, method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

use leaflink_api::{Error, RestClient, WeatherClient};

// ── Helpers ─────────────────────────────────────────────────────────

async fn setup() -> (MockServer, RestClient) {
    let server = MockServer::start().await;
    let base = Url::parse(&format!("{}/", server.uri())).unwrap();
    let client = RestClient::with_client(reqwest::Client::new(), base);
    (server, client)
}

fn authed(client: RestClient) -> RestClient {
    client.with_token(SecretString::from("test-token"))
}

// ── Auth endpoints ──────────────────────────────────────────────────

#[tokio::test]
async fn login_success_returns_token() {
    let (server, client) = setup().await;

    Mock::given(method("POST"))
        .and(path("/auth/login"))
        .and(body_json(json!({ "email": "a@b.c", "password": "hunter2" })))
        .respond_with(
            ResponseTemplate::new(200).set_body_json(json!({ "pass": true, "token": "jwt-123" })),
        )
        .mount(&server)
        .await;

    let token = client.login("a@b.c", "hunter2").await.unwrap();
    use secrecy::ExposeSecret;
    assert_eq!(token.expose_secret(), "jwt-123");
}

#[tokio::test]
async fn login_rejection_is_authentication_error() {
    let (server, client) = setup().await;

    Mock::given(method("POST"))
        .and(path("/auth/login"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "pass": false })))
        .mount(&server)
        .await;

    let err = client.login("a@b.c", "wrong").await.unwrap_err();
    assert!(matches!(err, Error::Authentication { .. }));
}

#[tokio::test]
async fn check_token_passes_bearer_header() {
    let (server, client) = setup().await;

    Mock::given(method("POST"))
        .and(path("/auth/check-token"))
        .and(header("authorization", "Bearer test-token"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "pass": true })))
        .mount(&server)
        .await;

    assert!(authed(client).check_token().await.unwrap());
}

#[tokio::test]
async fn check_token_dead_token_is_false_not_error() {
    let (server, client) = setup().await;

    Mock::given(method("POST"))
        .and(path("/auth/check-token"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "pass": false })))
        .mount(&server)
        .await;

    assert!(!authed(client).check_token().await.unwrap());
}

#[tokio::test]
async fn check_token_401_is_false_not_error() {
    let (server, client) = setup().await;

    Mock::given(method("POST"))
        .and(path("/auth/check-token"))
        .respond_with(ResponseTemplate::new(401))
        .mount(&server)
        .await;

    assert!(!authed(client).check_token().await.unwrap());
}

#[tokio::test]
async fn check_token_without_token_is_false() {
    let (_server, client) = setup().await;
    assert!(!client.check_token().await.unwrap());
}

#[tokio::test]
async fn get_user_requires_token() {
    let (_server, client) = setup().await;

    let err = client.get_user().await.unwrap_err();
    assert!(matches!(err, Error::NotAuthenticated));
}

// ── Plant endpoints ─────────────────────────────────────────────────

#[tokio::test]
async fn get_plants_deserializes_records() {
    let (server, client) = setup().await;

    Mock::given(method("POST"))
        .and(path("/user/get-plants"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([
            {
                "uuid": "abc-123",
                "nickname": "Mr. Leafy",
                "species": "Monstera",
                "birth": "2025-06-01",
                "location": "{\"display_name\":\"Berlin\",\"lat\":\"52.5\",\"lon\":\"13.4\"}"
            },
            { "uuid": "def-456", "nickname": "Spiky" }
        ])))
        .mount(&server)
        .await;

    let plants = authed(client).get_plants().await.unwrap();
    assert_eq!(plants.len(), 2);
    assert_eq!(plants[0].uuid, "abc-123");
    assert_eq!(plants[0].nickname, "Mr. Leafy");
    assert_eq!(plants[0].birth, NaiveDate::from_ymd_opt(2025, 6, 1));
    assert_eq!(plants[1].species, None);
    assert_eq!(plants[1].location, None);
}

#[tokio::test]
async fn get_plants_null_body_is_empty_list() {
    let (server, client) = setup().await;

    Mock::given(method("POST"))
        .and(path("/user/get-plants"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!(null)))
        .mount(&server)
        .await;

    let plants = authed(client).get_plants().await.unwrap();
    assert!(plants.is_empty());
}

#[tokio::test]
async fn create_plant_returns_credential() {
    let (server, client) = setup().await;

    Mock::given(method("POST"))
        .and(path("/plant/create"))
        .and(body_json(json!({
            "nickname": "Mr. Leafy",
            "birthDate": "2025-06-01",
            "location": "{\"display_name\":\"Berlin\",\"lat\":\"52.5\",\"lon\":\"13.4\"}",
            "species": "Monstera",
        })))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(json!({ "token": "device-token-xyz", "uuid": "new-uuid-1" })),
        )
        .mount(&server)
        .await;

    let cred = authed(client)
        .create_plant(
            "Mr. Leafy",
            NaiveDate::from_ymd_opt(2025, 6, 1).unwrap(),
            "{\"display_name\":\"Berlin\",\"lat\":\"52.5\",\"lon\":\"13.4\"}",
            "Monstera",
        )
        .await
        .unwrap();

    assert_eq!(cred.token, "device-token-xyz");
    assert_eq!(cred.uuid, "new-uuid-1");
}

#[tokio::test]
async fn join_plant_invalid_code_surfaces_message() {
    let (server, client) = setup().await;

    Mock::given(method("POST"))
        .and(path("/plants/join"))
        .respond_with(
            ResponseTemplate::new(400).set_body_json(json!({ "message": "Invalid sharing code." })),
        )
        .mount(&server)
        .await;

    let err = authed(client).join_plant("BAD-CODE").await.unwrap_err();
    match err {
        Error::Backend { message, status } => {
            assert_eq!(message, "Invalid sharing code.");
            assert_eq!(status, 400);
        }
        other => panic!("expected Backend error, got {other:?}"),
    }
}

// ── Weather endpoints ───────────────────────────────────────────────

#[tokio::test]
async fn current_weather_code_parses_current_block() {
    let server = MockServer::start().await;
    let base = Url::parse(&server.uri()).unwrap();
    let client = WeatherClient::with_urls(reqwest::Client::new(), base.clone(), base);

    Mock::given(method("GET"))
        .and(path("/v1/forecast"))
        .and(query_param("current", "weather_code"))
        .respond_with(
            ResponseTemplate::new(200).set_body_json(json!({ "current": { "weather_code": 61 } })),
        )
        .mount(&server)
        .await;

    let code = client.current_weather_code(52.5, 13.4).await.unwrap();
    assert_eq!(code, 61);
}

#[tokio::test]
async fn geocode_search_returns_matches() {
    let server = MockServer::start().await;
    let base = Url::parse(&server.uri()).unwrap();
    let client = WeatherClient::with_urls(reqwest::Client::new(), base.clone(), base);

    Mock::given(method("GET"))
        .and(path("/search"))
        .and(query_param("q", "Berlin"))
        .and(query_param("format", "json"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([
            { "display_name": "Berlin, Germany", "lat": "52.52", "lon": "13.40" }
        ])))
        .mount(&server)
        .await;

    let matches = client.search("Berlin").await.unwrap();
    assert_eq!(matches.len(), 1);
    assert_eq!(matches[0].display_name, "Berlin, Germany");
    assert_eq!(matches[0].lat, "52.52");
}
