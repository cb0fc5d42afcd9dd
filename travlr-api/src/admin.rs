use axum::{
    extract::{Path, State},
    routing::get,
    Extension, Json, Router,
};
use serde::Serialize;
use travlr_catalog::{Trip, REQUIRED_FIELDS};
use travlr_core::SessionClaims;

use crate::{error::AppError, state::AppState};

// ============================================================================
// Request/Response Types
// ============================================================================

#[derive(Debug, Serialize)]
pub struct AdminUser {
    pub name: String,
    pub email: String,
}

#[derive(Debug, Serialize)]
pub struct TripListPage {
    pub user: AdminUser,
    pub trips: Vec<Trip>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AddTripPage {
    pub required_fields: Vec<&'static str>,
}

/// Admin pages. Every route here sits behind the session gate, which puts
/// the verified [`SessionClaims`] into the request.
pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/admin/list-trips", get(list_trips_page))
        .route("/admin/add-trip", get(add_trip_page))
        .route("/admin/edit-trip/{code}", get(edit_trip_page))
}

// ============================================================================
// Handlers
// ============================================================================

/// GET /admin/list-trips
async fn list_trips_page(
    State(state): State<AppState>,
    Extension(claims): Extension<SessionClaims>,
) -> Result<Json<TripListPage>, AppError> {
    let trips = state.catalog.list().await?;

    Ok(Json(TripListPage {
        user: AdminUser { name: claims.name, email: claims.email },
        trips,
    }))
}

/// GET /admin/add-trip
async fn add_trip_page() -> Json<AddTripPage> {
    Json(AddTripPage { required_fields: REQUIRED_FIELDS.to_vec() })
}

/// GET /admin/edit-trip/{code}
async fn edit_trip_page(
    State(state): State<AppState>,
    Path(code): Path<String>,
) -> Result<Json<Trip>, AppError> {
    Ok(Json(state.catalog.get(&code).await?))
}
