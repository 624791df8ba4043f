pub mod config;
pub mod database;
pub mod error;
pub mod handlers;
pub mod middleware;
pub mod models;
pub mod secrets;
pub mod services;
pub mod state;

use axum::{routing::get, Router};
use tower_http::{cors::CorsLayer, trace::TraceLayer};

use handlers::{contacts, system};
use state::AppState;

/// Builds the full router: public system routes plus the token-gated
/// contact resource.
pub fn app(state: AppState) -> Router {
    let protected = Router::new()
        .route(
            "/contacts",
            get(contacts::get_all_contacts).post(contacts::create_contact),
        )
        .route(
            "/contacts/:id",
            get(contacts::get_contact)
                .put(contacts::update_contact)
                .delete(contacts::delete_contact),
        )
        .route_layer(axum::middleware::from_fn_with_state(
            state.clone(),
            middleware::api_key_auth,
        ));

    Router::new()
        .route("/", get(system::root))
        .route("/health", get(system::health))
        .merge(protected)
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
