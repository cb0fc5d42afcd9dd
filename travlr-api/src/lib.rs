use axum::{
    http::{header, Method},
    Router,
};
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

pub mod admin;
pub mod auth;
pub mod error;
pub mod middleware;
pub mod state;
pub mod trips;

pub use state::{AppState, AuthConfig};

pub fn app(state: AppState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(tower_http::cors::Any)
        .allow_methods([Method::GET, Method::POST, Method::PUT, Method::OPTIONS])
        .allow_headers([header::AUTHORIZATION, header::CONTENT_TYPE]);

    Router::new()
        .merge(auth::routes())
        .merge(trips::routes(state.clone()))
        .merge(admin::routes())
        .layer(axum::middleware::from_fn_with_state(state.clone(), middleware::session_gate))
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
