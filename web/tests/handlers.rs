//! End-to-end handler tests over the full router.
//!
//! These run against the real templates with the in-memory doubles wired
//! in: the mock reservation repository, the in-memory session store, and a
//! mail queue with no worker attached.

#![allow(clippy::unwrap_used, clippy::expect_used)]

use axum_test::{TestServer, TestServerConfig};
use bookings_core::mail::mail_channel;
use bookings_core::mocks::MockReservationRepository;
use bookings_core::session::MemorySessionStore;
use bookings_render::{HelperSet, Renderer};
use bookings_web::{AppConfig, AppState, router};
use http::StatusCode;
use std::path::Path;
use std::sync::Arc;

fn template_dir() -> std::path::PathBuf {
    Path::new(env!("CARGO_MANIFEST_DIR")).join("../templates")
}

fn server_with(repo: MockReservationRepository) -> TestServer {
    let config = AppConfig::for_testing(template_dir());
    let renderer =
        Renderer::cached(&config.template_dir, &HelperSet::standard()).expect("templates compile");
    let (mail, _mail_rx) = mail_channel(16);
    let state = AppState::new(
        config,
        Arc::new(repo),
        Arc::new(MemorySessionStore::new()),
        renderer,
        mail,
    );
    TestServer::new_with_config(
        router(state),
        TestServerConfig {
            save_cookies: true,
            ..TestServerConfig::default()
        },
    )
    .expect("test server")
}

fn server() -> TestServer {
    server_with(MockReservationRepository::new())
}

/// Pull the CSRF token out of a rendered form.
fn csrf_token(html: &str) -> String {
    let marker = "name=\"csrf_token\" value=\"";
    let start = html.find(marker).expect("form carries a csrf token") + marker.len();
    let end = html[start..].find('"').expect("token is terminated") + start;
    html[start..end].to_string()
}

fn location(response: &axum_test::TestResponse) -> String {
    response
        .headers()
        .get("location")
        .expect("redirect carries a location")
        .to_str()
        .unwrap()
        .to_string()
}

async fn log_in(server: &TestServer) {
    let token = csrf_token(&server.get("/login").await.text());
    let response = server
        .post("/login")
        .form(&[
            ("csrf_token", token.as_str()),
            ("email", "admin@example.com"),
            ("password", "secret"),
        ])
        .await;
    assert_eq!(response.status_code(), StatusCode::SEE_OTHER);
    assert_eq!(location(&response), "/");
}

fn admin_repo() -> MockReservationRepository {
    MockReservationRepository::new().with_user(1, "admin@example.com", "secret")
}

#[tokio::test]
async fn public_route_status_table() {
    let server = server();
    let table = [
        ("/", StatusCode::OK),
        ("/about", StatusCode::OK),
        ("/signup", StatusCode::OK),
        ("/create-user", StatusCode::OK),
        ("/counseling-reservation", StatusCode::OK),
        ("/login", StatusCode::OK),
        ("/no-such-page", StatusCode::NOT_FOUND),
    ];
    for (path, expected) in table {
        let response = server.get(path).await;
        assert_eq!(response.status_code(), expected, "for {path}");
    }
}

#[tokio::test]
async fn create_user_flow_is_single_use() {
    let server = server();
    let token = csrf_token(&server.get("/create-user").await.text());

    let response = server
        .post("/create-user")
        .form(&[
            ("csrf_token", token.as_str()),
            ("first-name", "Ali"),
            ("last-name", "Khan"),
            ("email", "ali@example.com"),
        ])
        .await;
    assert_eq!(response.status_code(), StatusCode::SEE_OTHER);
    assert_eq!(location(&response), "/user-created-success");

    let confirmation = server.get("/user-created-success").await;
    assert_eq!(confirmation.status_code(), StatusCode::OK);
    let body = confirmation.text();
    assert!(body.contains("Ali"));
    assert!(body.contains("ali@example.com"));

    // The record was evicted on render; a second visit bounces home.
    let second = server.get("/user-created-success").await;
    assert_eq!(second.status_code(), StatusCode::SEE_OTHER);
    assert_eq!(location(&second), "/");
}

#[tokio::test]
async fn confirmation_without_submission_redirects_with_error_flash() {
    let server = server();

    let response = server.get("/signup-success").await;
    assert_eq!(response.status_code(), StatusCode::SEE_OTHER);
    assert_eq!(location(&response), "/");

    // The error flash survives the redirect and shows exactly once.
    let home = server.get("/").await;
    assert!(home.text().contains("Could not get record from session"));
    let again = server.get("/").await;
    assert!(!again.text().contains("Could not get record from session"));
}

#[tokio::test]
async fn invalid_signup_re_renders_with_field_errors() {
    let server = server();
    let token = csrf_token(&server.get("/signup").await.text());

    let response = server
        .post("/signup")
        .form(&[
            ("csrf_token", token.as_str()),
            ("first-name", "Al"),
            ("last-name", ""),
            ("email", "not-an-email"),
        ])
        .await;

    // Validation failures are a normal response, not an error.
    assert_eq!(response.status_code(), StatusCode::OK);
    let body = response.text();
    assert!(body.contains("This field must be at least 3 characters long."));
    assert!(body.contains("This field cannot be blank."));
    assert!(body.contains("Invalid email address."));
    // The submitted values come back for correction.
    assert!(body.contains("value=\"Al\""));
}

#[tokio::test]
async fn post_without_csrf_token_is_forbidden() {
    let server = server();
    let _ = server.get("/signup").await;

    let response = server
        .post("/signup")
        .form(&[
            ("first-name", "Ali"),
            ("last-name", "Khan"),
            ("email", "ali@example.com"),
        ])
        .await;
    assert_eq!(response.status_code(), StatusCode::FORBIDDEN);
}

#[tokio::test]
async fn admin_requires_login() {
    let server = server();

    let response = server.get("/admin/dashboard").await;
    assert_eq!(response.status_code(), StatusCode::SEE_OTHER);
    assert_eq!(location(&response), "/login");

    let login_page = server.get("/login").await;
    assert!(login_page.text().contains("Must be logged in!"));
}

#[tokio::test]
async fn login_rejects_bad_credentials_with_generic_flash() {
    let server = server_with(admin_repo());
    let token = csrf_token(&server.get("/login").await.text());

    let response = server
        .post("/login")
        .form(&[
            ("csrf_token", token.as_str()),
            ("email", "admin@example.com"),
            ("password", "wrong"),
        ])
        .await;
    assert_eq!(response.status_code(), StatusCode::SEE_OTHER);
    assert_eq!(location(&response), "/login");

    let login_page = server.get("/login").await;
    assert!(login_page.text().contains("Invalid login credentials"));
}

#[tokio::test]
async fn login_then_admin_then_logout() {
    let server = server_with(admin_repo());
    log_in(&server).await;

    let home = server.get("/").await;
    assert!(home.text().contains("Logged in successfully"));

    let dashboard = server.get("/admin/dashboard").await;
    assert_eq!(dashboard.status_code(), StatusCode::OK);

    let logout = server.get("/logout").await;
    assert_eq!(logout.status_code(), StatusCode::SEE_OTHER);
    assert_eq!(location(&logout), "/login");

    let after = server.get("/admin/dashboard").await;
    assert_eq!(after.status_code(), StatusCode::SEE_OTHER);
}

#[tokio::test]
async fn counseling_request_persists_and_flows_through_admin() {
    let repo = admin_repo().with_counseling_session(1, "Maryam");
    let server = server_with(repo.clone());

    // Visitor submits a counseling request.
    let token = csrf_token(&server.get("/counseling-reservation").await.text());
    let response = server
        .post("/make-session-reservation")
        .form(&[
            ("csrf_token", token.as_str()),
            ("first-name", "Ali"),
            ("last-name", "Khan"),
            ("email", "ali@example.com"),
            ("gender", "male"),
            ("date", "2026-09-01"),
            ("start-time", "10:00"),
            ("end-time", "11:00"),
            ("counseling-session-id", "1"),
            ("reason", "stress"),
        ])
        .await;
    assert_eq!(response.status_code(), StatusCode::SEE_OTHER);
    assert_eq!(location(&response), "/counseling-signup-success");

    let confirmation = server.get("/counseling-signup-success").await;
    assert_eq!(confirmation.status_code(), StatusCode::OK);
    assert!(confirmation.text().contains("Ali"));

    // Both rows were written: the reservation and its restriction.
    assert_eq!(repo.restriction_count(), 1);

    // The admin sees it as new, marks it complete, and it moves lists.
    log_in(&server).await;
    let new_list = server.get("/admin/new-reservations").await;
    assert!(new_list.text().contains("ali@example.com"));

    let process = server.get("/admin/process-reservation/new/1").await;
    assert_eq!(process.status_code(), StatusCode::SEE_OTHER);
    assert_eq!(location(&process), "/admin/new-reservations");

    let new_after = server.get("/admin/new-reservations").await;
    assert!(new_after.text().contains("Reservation marked as complete"));
    assert!(!new_after.text().contains("ali@example.com"));

    let all_after = server.get("/admin/all-reservations").await;
    assert!(all_after.text().contains("ali@example.com"));
}

#[tokio::test]
async fn admin_edit_saves_contact_fields() {
    let repo = admin_repo().with_counseling_session(1, "Maryam");
    let server = server_with(repo.clone());

    let token = csrf_token(&server.get("/counseling-reservation").await.text());
    server
        .post("/make-session-reservation")
        .form(&[
            ("csrf_token", token.as_str()),
            ("first-name", "Ali"),
            ("last-name", "Khan"),
            ("email", "ali@example.com"),
            ("gender", "male"),
            ("date", "2026-09-01"),
            ("start-time", "10:00"),
            ("end-time", "11:00"),
        ])
        .await;

    log_in(&server).await;
    let detail = server.get("/admin/reservations/all/1").await;
    assert_eq!(detail.status_code(), StatusCode::OK);
    let token = csrf_token(&detail.text());

    let save = server
        .post("/admin/reservations/all/1")
        .form(&[
            ("csrf_token", token.as_str()),
            ("first-name", "Aisha"),
            ("last-name", "Khan"),
            ("email", "aisha@example.com"),
        ])
        .await;
    assert_eq!(save.status_code(), StatusCode::SEE_OTHER);
    assert_eq!(location(&save), "/admin/all-reservations");

    let list = server.get("/admin/all-reservations").await;
    assert!(list.text().contains("changes saved"));
    assert!(list.text().contains("aisha@example.com"));
}

#[tokio::test]
async fn unknown_reservation_detail_renders_404() {
    let server = server_with(admin_repo());
    log_in(&server).await;

    let response = server.get("/admin/reservations/all/99").await;
    assert_eq!(response.status_code(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn availability_json_echoes_the_window() {
    let server = server();

    let response = server
        .post("/search-availability-json")
        .form(&[
            ("date", "2026-09-01"),
            ("start-time", "10:00"),
            ("end-time", "11:00"),
        ])
        .await;
    assert_eq!(response.status_code(), StatusCode::OK);

    let body: serde_json::Value = response.json();
    assert_eq!(body["ok"], true);
    assert_eq!(body["message"], "This time is available!");
    assert_eq!(body["Date"], "2026-09-01");
    assert_eq!(body["startTime"], "10:00");
    assert_eq!(body["endTime"], "11:00");
}

#[tokio::test]
async fn make_reservation_without_session_record_redirects_home() {
    let server = server();

    let response = server.get("/make-reservation").await;
    assert_eq!(response.status_code(), StatusCode::SEE_OTHER);
    assert_eq!(location(&response), "/");
}
