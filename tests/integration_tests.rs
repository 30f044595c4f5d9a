//! Integration tests for the movie ticket booking application
//!
//! These tests start the real router on an ephemeral port backed by a fresh
//! in-memory database and exercise it over HTTP.

use chrono::{Duration, Utc};
use reqwest::{header, redirect::Policy, StatusCode};
use serde_json::{json, Value};

use movie_ticket_booking::{
    config::Config,
    db::Database,
    models::{NewMovie, NewShow, Show},
    server::{build_router, AppState},
    urls::{reverse, reverse_with},
};

const ADMIN_TOKEN: &str = "test-admin-token";

// ==================== Test Helpers ====================

struct TestApp {
    address: String,
    db: Database,
}

impl TestApp {
    fn url(&self, path: &str) -> String {
        format!("{}{}", self.address, path)
    }
}

fn create_test_config(admin_token: Option<&str>) -> Config {
    Config {
        database_url: "sqlite::memory:".to_string(),
        port: 0,
        admin_token: admin_token.map(String::from),
        site_name: "Test Cinema".to_string(),
    }
}

async fn spawn_app(admin_token: Option<&str>) -> TestApp {
    let config = create_test_config(admin_token);
    let db = Database::connect(&config.database_url)
        .await
        .expect("Failed to create database");

    let app = build_router(AppState::new(config, db.clone()));
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
        .await
        .expect("Failed to bind");
    let addr = listener.local_addr().expect("local addr");

    tokio::spawn(async move {
        axum::serve(listener, app).await.expect("server");
    });

    TestApp {
        address: format!("http://{}", addr),
        db,
    }
}

/// Client that does not follow redirects
fn no_redirect_client() -> reqwest::Client {
    reqwest::Client::builder()
        .redirect(Policy::none())
        .build()
        .expect("client")
}

async fn seed_show(db: &Database, total_seats: i64) -> Show {
    let language = db.create_language("English").await.expect("language");
    let movie = db
        .create_movie(&NewMovie {
            title: "The Third Man".to_string(),
            description: "Vienna, 1948".to_string(),
            duration_minutes: 104,
            language_id: language.id,
        })
        .await
        .expect("movie");
    db.create_show(&NewShow {
        movie_id: movie.id,
        starts_at: Utc::now() + Duration::hours(3),
        screen: "Screen 1".to_string(),
        total_seats,
        price_cents: 950,
    })
    .await
    .expect("show")
}

/// Log in and return the session cookie pair (`name=value`)
async fn admin_login(app: &TestApp) -> String {
    let response = no_redirect_client()
        .post(app.url("/admin/login/"))
        .form(&[("token", ADMIN_TOKEN), ("next", "/admin/")])
        .send()
        .await
        .expect("request");

    assert_eq!(response.status(), StatusCode::FOUND);
    let cookie = response
        .headers()
        .get(header::SET_COOKIE)
        .expect("Should set session cookie")
        .to_str()
        .expect("ascii cookie");
    cookie
        .split(';')
        .next()
        .expect("cookie pair")
        .to_string()
}

// ==================== Model Tests ====================

#[tokio::test]
async fn test_language_model_str() {
    let app = spawn_app(None).await;

    let lang = app.db.create_language("English").await.expect("create");
    assert_eq!(lang.to_string(), "English");
}

// ==================== Page Tests ====================

#[tokio::test]
async fn test_home_page() {
    let app = spawn_app(None).await;
    let url = app.url(reverse("home").expect("home route exists"));

    let response = reqwest::get(&url).await.expect("request");
    assert_eq!(response.status(), StatusCode::OK);
}

#[tokio::test]
async fn test_home_page_lists_movies() {
    let app = spawn_app(None).await;
    seed_show(&app.db, 10).await;

    let body = reqwest::get(app.url("/"))
        .await
        .expect("request")
        .text()
        .await
        .expect("body");

    assert!(body.contains("The Third Man"));
    assert!(body.contains("English"));
    assert!(body.contains("Test Cinema"));
}

#[tokio::test]
async fn test_admin_page_redirects() {
    let app = spawn_app(Some(ADMIN_TOKEN)).await;

    // reqwest follows redirects by default
    let response = reqwest::get(app.url("/admin/")).await.expect("request");
    assert!(
        [StatusCode::OK, StatusCode::FOUND].contains(&response.status()),
        "unexpected status {}",
        response.status()
    );
}

#[tokio::test]
async fn test_invalid_url_returns_404() {
    let app = spawn_app(None).await;

    let response = reqwest::get(app.url("/no-such-page/")).await.expect("request");
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_movie_detail_page() {
    let app = spawn_app(None).await;
    let show = seed_show(&app.db, 10).await;
    let path = reverse_with("movie_detail", &[&show.movie_id.to_string()]).expect("route");

    let response = reqwest::get(app.url(&path)).await.expect("request");
    assert_eq!(response.status(), StatusCode::OK);

    let body = response.text().await.expect("body");
    assert!(body.contains("Screen 1"));
    assert!(body.contains("$9.50"));
}

#[tokio::test]
async fn test_missing_movie_returns_404() {
    let app = spawn_app(None).await;

    let response = reqwest::get(app.url("/movies/999/")).await.expect("request");
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_non_integer_movie_id_returns_404() {
    let app = spawn_app(None).await;

    for path in ["/movies/abc/", "/movies/99999999999999999999/"] {
        let response = reqwest::get(app.url(path)).await.expect("request");
        assert_eq!(response.status(), StatusCode::NOT_FOUND, "path {}", path);
    }
}

#[tokio::test]
async fn test_health() {
    let app = spawn_app(None).await;

    let body: Value = reqwest::get(app.url("/health"))
        .await
        .expect("request")
        .json()
        .await
        .expect("json");
    assert_eq!(body, json!({ "status": "ok" }));
}

// ==================== Admin Tests ====================

#[tokio::test]
async fn test_admin_redirects_to_login_without_session() {
    let app = spawn_app(Some(ADMIN_TOKEN)).await;

    let response = no_redirect_client()
        .get(app.url("/admin/"))
        .send()
        .await
        .expect("request");

    assert_eq!(response.status(), StatusCode::FOUND);
    assert_eq!(
        response.headers().get(header::LOCATION).expect("location"),
        "/admin/login/?next=/admin/"
    );
}

#[tokio::test]
async fn test_admin_redirects_to_login_when_login_disabled() {
    let app = spawn_app(None).await;

    let response = no_redirect_client()
        .get(app.url("/admin/"))
        .send()
        .await
        .expect("request");

    assert_eq!(response.status(), StatusCode::FOUND);
    assert_eq!(
        response.headers().get(header::LOCATION).expect("location"),
        "/admin/login/?next=/admin/"
    );
}

#[tokio::test]
async fn test_admin_login_page_loads() {
    let app = spawn_app(Some(ADMIN_TOKEN)).await;

    let response = reqwest::get(app.url("/admin/login/?next=/admin/"))
        .await
        .expect("request");
    assert_eq!(response.status(), StatusCode::OK);
    assert!(response.text().await.expect("body").contains("name=\"token\""));
}

#[tokio::test]
async fn test_admin_login_and_dashboard() {
    let app = spawn_app(Some(ADMIN_TOKEN)).await;
    seed_show(&app.db, 10).await;
    let cookie = admin_login(&app).await;

    let response = no_redirect_client()
        .get(app.url("/admin/"))
        .header(header::COOKIE, &cookie)
        .send()
        .await
        .expect("request");

    assert_eq!(response.status(), StatusCode::OK);
    let body = response.text().await.expect("body");
    assert!(body.contains("Site administration"));
    assert!(body.contains("<li>English</li>"));
}

#[tokio::test]
async fn test_admin_wrong_token_rejected() {
    let app = spawn_app(Some(ADMIN_TOKEN)).await;

    let response = no_redirect_client()
        .post(app.url("/admin/login/"))
        .form(&[("token", "wrong"), ("next", "/admin/")])
        .send()
        .await
        .expect("request");

    assert_eq!(response.status(), StatusCode::OK);
    assert!(response.headers().get(header::SET_COOKIE).is_none());
    assert!(response.text().await.expect("body").contains("Invalid token."));
}

#[tokio::test]
async fn test_admin_login_disabled_without_token() {
    let app = spawn_app(None).await;

    let response = no_redirect_client()
        .post(app.url("/admin/login/"))
        .form(&[("token", "")])
        .send()
        .await
        .expect("request");

    assert_eq!(response.status(), StatusCode::OK);
    assert!(response.headers().get(header::SET_COOKIE).is_none());
}

#[tokio::test]
async fn test_admin_login_ignores_external_next() {
    let app = spawn_app(Some(ADMIN_TOKEN)).await;

    let response = no_redirect_client()
        .post(app.url("/admin/login/"))
        .form(&[("token", ADMIN_TOKEN), ("next", "https://evil.example.com/")])
        .send()
        .await
        .expect("request");

    assert_eq!(response.status(), StatusCode::FOUND);
    assert_eq!(
        response.headers().get(header::LOCATION).expect("location"),
        "/admin/"
    );
}

#[tokio::test]
async fn test_admin_add_language() {
    let app = spawn_app(Some(ADMIN_TOKEN)).await;
    let cookie = admin_login(&app).await;

    let response = no_redirect_client()
        .post(app.url("/admin/languages/"))
        .header(header::COOKIE, &cookie)
        .form(&[("name", "Japanese")])
        .send()
        .await
        .expect("request");
    assert_eq!(response.status(), StatusCode::FOUND);

    let languages = app.db.list_languages().await.expect("list");
    assert_eq!(languages.len(), 1);
    assert_eq!(languages[0].to_string(), "Japanese");
}

#[tokio::test]
async fn test_admin_add_language_malformed_form() {
    let app = spawn_app(Some(ADMIN_TOKEN)).await;
    let cookie = admin_login(&app).await;

    let response = no_redirect_client()
        .post(app.url("/admin/languages/"))
        .header(header::COOKIE, &cookie)
        .form(&[("title", "Japanese")])
        .send()
        .await
        .expect("request");

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let body: Value = response.json().await.expect("json");
    assert!(body["error"].is_string());
}

#[tokio::test]
async fn test_admin_login_missing_token_field() {
    let app = spawn_app(Some(ADMIN_TOKEN)).await;

    let response = no_redirect_client()
        .post(app.url("/admin/login/"))
        .form(&[("next", "/admin/")])
        .send()
        .await
        .expect("request");

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert!(response.headers().get(header::SET_COOKIE).is_none());
}

#[tokio::test]
async fn test_admin_add_language_requires_login() {
    let app = spawn_app(Some(ADMIN_TOKEN)).await;

    let response = no_redirect_client()
        .post(app.url("/admin/languages/"))
        .form(&[("name", "Japanese")])
        .send()
        .await
        .expect("request");

    assert_eq!(response.status(), StatusCode::FOUND);
    assert!(app.db.list_languages().await.expect("list").is_empty());
}

#[tokio::test]
async fn test_admin_logout_invalidates_session() {
    let app = spawn_app(Some(ADMIN_TOKEN)).await;
    let cookie = admin_login(&app).await;
    let client = no_redirect_client();

    let response = client
        .post(app.url("/admin/logout/"))
        .header(header::COOKIE, &cookie)
        .send()
        .await
        .expect("request");
    assert_eq!(response.status(), StatusCode::FOUND);

    // The old cookie no longer grants access
    let response = client
        .get(app.url("/admin/"))
        .header(header::COOKIE, &cookie)
        .send()
        .await
        .expect("request");
    assert_eq!(response.status(), StatusCode::FOUND);
}

// ==================== API Tests ====================

#[tokio::test]
async fn test_api_lists() {
    let app = spawn_app(None).await;
    seed_show(&app.db, 10).await;

    let languages: Value = reqwest::get(app.url("/api/languages/"))
        .await
        .expect("request")
        .json()
        .await
        .expect("json");
    assert_eq!(languages[0]["name"], "English");

    let movies: Value = reqwest::get(app.url("/api/movies/"))
        .await
        .expect("request")
        .json()
        .await
        .expect("json");
    assert_eq!(movies[0]["title"], "The Third Man");
    assert_eq!(movies[0]["duration_minutes"], 104);
}

#[tokio::test]
async fn test_booking_flow() {
    let app = spawn_app(None).await;
    let show = seed_show(&app.db, 5).await;
    let client = reqwest::Client::new();
    let book_url = app.url(&reverse_with("book_show", &[&show.id.to_string()]).expect("route"));

    let response = client
        .post(&book_url)
        .json(&json!({
            "customer_name": "Holly",
            "customer_email": "holly@example.com",
            "seats": 3
        }))
        .send()
        .await
        .expect("request");
    assert_eq!(response.status(), StatusCode::CREATED);
    let booking: Value = response.json().await.expect("json");
    assert_eq!(booking["seats"], 3);
    assert_eq!(booking["show_id"], show.id);

    let detail: Value = client
        .get(app.url(&format!("/api/shows/{}/", show.id)))
        .send()
        .await
        .expect("request")
        .json()
        .await
        .expect("json");
    assert_eq!(detail["seats_remaining"], 2);
    assert_eq!(detail["movie_title"], "The Third Man");
    assert!(detail["label"]
        .as_str()
        .expect("label")
        .starts_with("The Third Man @ "));
}

#[tokio::test]
async fn test_unknown_show_returns_404() {
    let app = spawn_app(None).await;

    let response = reqwest::get(app.url("/api/shows/999/")).await.expect("request");
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
    let body: Value = response.json().await.expect("json");
    assert_eq!(body["error"], "not found");

    let response = reqwest::get(app.url("/api/shows/abc/")).await.expect("request");
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_booking_missing_field_returns_400() {
    let app = spawn_app(None).await;
    let show = seed_show(&app.db, 2).await;
    let client = reqwest::Client::new();
    let url = app.url(&format!("/api/shows/{}/bookings/", show.id));

    for payload in [
        json!({ "customer_name": "A", "seats": 1 }),
        json!({ "customer_name": "A", "customer_email": "a@example.com", "seats": "two" }),
    ] {
        let response = client.post(&url).json(&payload).send().await.expect("request");
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        let body: Value = response.json().await.expect("json");
        assert!(body["error"].is_string(), "missing error key in {}", body);
    }

    assert_eq!(app.db.seats_remaining(show.id).await.expect("remaining"), 2);
}

#[tokio::test]
async fn test_overbooking_returns_conflict() {
    let app = spawn_app(None).await;
    let show = seed_show(&app.db, 2).await;

    let response = reqwest::Client::new()
        .post(app.url(&format!("/api/shows/{}/bookings/", show.id)))
        .json(&json!({
            "customer_name": "Harry",
            "customer_email": "harry@example.com",
            "seats": 3
        }))
        .send()
        .await
        .expect("request");

    assert_eq!(response.status(), StatusCode::CONFLICT);
    assert_eq!(app.db.seats_remaining(show.id).await.expect("remaining"), 2);
}

#[tokio::test]
async fn test_booking_validation_error() {
    let app = spawn_app(None).await;
    let show = seed_show(&app.db, 2).await;

    let response = reqwest::Client::new()
        .post(app.url(&format!("/api/shows/{}/bookings/", show.id)))
        .json(&json!({
            "customer_name": "",
            "customer_email": "anna@example.com",
            "seats": 1
        }))
        .send()
        .await
        .expect("request");

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let body: Value = response.json().await.expect("json");
    assert_eq!(body["error"], "customer name must not be empty");
}

#[tokio::test]
async fn test_booking_unknown_show() {
    let app = spawn_app(None).await;

    let response = reqwest::Client::new()
        .post(app.url("/api/shows/404/bookings/"))
        .json(&json!({
            "customer_name": "Anna",
            "customer_email": "anna@example.com",
            "seats": 1
        }))
        .send()
        .await
        .expect("request");

    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}
