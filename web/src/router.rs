//! Route table.

use crate::handlers::{admin, auth, availability, counseling, newsletter, pages, registration};
use crate::middleware::{require_auth, session_layer};
use crate::state::AppState;
use axum::Router;
use axum::routing::{get, post};
use tower_http::services::ServeDir;
use tower_http::trace::TraceLayer;

/// Build the application router.
///
/// The session layer wraps every route, including the 404 fallback, so any
/// page can carry flash messages. The `/admin` subtree additionally sits
/// behind the authentication guard.
pub fn router(state: AppState) -> Router {
    let admin_routes = Router::new()
        .route("/dashboard", get(admin::dashboard))
        .route("/all-reservations", get(admin::all_reservations))
        .route("/new-reservations", get(admin::new_reservations))
        .route("/calender", get(admin::calendar))
        .route(
            "/process-reservation/:src/:id",
            get(admin::process_reservation),
        )
        .route(
            "/reservations/:src/:id",
            get(admin::show_reservation).post(admin::post_show_reservation),
        )
        .route_layer(axum::middleware::from_fn(require_auth));

    Router::new()
        .route("/", get(pages::home))
        .route("/about", get(pages::about))
        .route(
            "/signup",
            get(newsletter::signup_form).post(newsletter::post_signup),
        )
        .route("/signup-success", get(newsletter::signup_success))
        .route(
            "/create-user",
            get(registration::registration_form).post(registration::post_registration),
        )
        .route("/user-created-success", get(registration::registration_success))
        .route("/counseling-reservation", get(counseling::registration_form))
        .route("/make-session-reservation", post(counseling::post_reservation))
        .route("/counseling-signup-success", get(counseling::signup_success))
        .route("/login", get(auth::show_login).post(auth::post_login))
        .route("/logout", get(auth::logout))
        .route("/make-reservation", get(counseling::make_reservation))
        .route(
            "/search-availability-json",
            post(availability::search_availability_json),
        )
        .nest("/admin", admin_routes)
        .nest_service("/static", ServeDir::new(&state.config.static_dir))
        .fallback(pages::not_found)
        .layer(axum::middleware::from_fn_with_state(
            state.clone(),
            session_layer,
        ))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
