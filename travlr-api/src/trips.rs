use std::collections::BTreeMap;
use std::str::FromStr;

use axum::{
    extract::{rejection::JsonRejection, Path, Query, State},
    http::StatusCode,
    middleware,
    routing::{get, post, put},
    Extension, Json, Router,
};
use serde::Deserialize;
use travlr_catalog::{SortConfig, SortDirection, SortKey, Trip, TripFilters, TripPatch, TripQuery};
use travlr_core::SessionClaims;

use crate::{error::AppError, middleware::require_session, state::AppState};

/// Query string of `GET /trips`. Values come straight from form inputs, so
/// they are taken as text and empty strings mean "not set".
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ListTripsQuery {
    pub search_term: Option<String>,
    pub min_price: Option<String>,
    pub max_price: Option<String>,
    pub min_duration_nights: Option<String>,
    pub min_rating: Option<String>,
    pub sort: Option<String>,
    pub direction: Option<String>,
}

impl ListTripsQuery {
    fn into_query(self) -> Result<TripQuery, AppError> {
        let mut errors = BTreeMap::new();

        let filters = TripFilters {
            search_term: self.search_term.filter(|s| !s.is_empty()),
            min_price: parse_param(&mut errors, "minPrice", self.min_price),
            max_price: parse_param(&mut errors, "maxPrice", self.max_price),
            min_duration_nights: parse_param(&mut errors, "minDurationNights", self.min_duration_nights),
            min_rating: parse_param(&mut errors, "minRating", self.min_rating),
        };

        let key: Option<SortKey> = parse_param(&mut errors, "sort", self.sort);
        let direction: Option<SortDirection> = parse_param(&mut errors, "direction", self.direction);

        if !errors.is_empty() {
            return Err(AppError::ValidationError { message: "Invalid query".to_string(), errors });
        }

        if key.is_none() && direction.is_none() && filters == TripFilters::default() {
            return Ok(TripQuery::default());
        }

        // Once any parameter is given the listing always has an active sort,
        // name ascending unless told otherwise.
        let sort = SortConfig::new(
            key.unwrap_or(SortConfig::default().key),
            direction.unwrap_or_default(),
        );
        Ok(TripQuery::new(filters, Some(sort)))
    }
}

fn parse_param<T: FromStr>(errors: &mut BTreeMap<String, String>, field: &str, raw: Option<String>) -> Option<T> {
    let raw = raw?;
    let raw = raw.trim();
    if raw.is_empty() {
        return None;
    }
    match raw.parse() {
        Ok(value) => Some(value),
        Err(_) => {
            errors.insert(field.to_string(), format!("Invalid value: {}", raw));
            None
        }
    }
}

pub fn routes(state: AppState) -> Router<AppState> {
    let guard = || middleware::from_fn_with_state(state.clone(), require_session);

    Router::new()
        .route("/trips", get(list_trips).merge(post(create_trip).route_layer(guard())))
        .route("/trips/{code}", get(get_trip).merge(put(update_trip).route_layer(guard())))
}

// ============================================================================
// Handlers
// ============================================================================

/// GET /trips
/// Without parameters the whole catalog in stored order; with parameters
/// the filtered and sorted listing.
async fn list_trips(
    State(state): State<AppState>,
    Query(query): Query<ListTripsQuery>,
) -> Result<Json<Vec<Trip>>, AppError> {
    let query = query.into_query()?;
    let trips = if query == TripQuery::default() {
        state.catalog.list().await?
    } else {
        state.catalog.search(&query).await?
    };

    Ok(Json(trips))
}

/// GET /trips/{code}
async fn get_trip(
    State(state): State<AppState>,
    Path(code): Path<String>,
) -> Result<Json<Trip>, AppError> {
    Ok(Json(state.catalog.get(&code).await?))
}

/// POST /trips
async fn create_trip(
    State(state): State<AppState>,
    Extension(claims): Extension<SessionClaims>,
    payload: Result<Json<TripPatch>, JsonRejection>,
) -> Result<(StatusCode, Json<Trip>), AppError> {
    let Json(patch) = payload?;
    let trip = state.catalog.create(patch).await?;
    tracing::info!(code = %trip.code, user_id = %claims.sub, "Trip added");

    Ok((StatusCode::CREATED, Json(trip)))
}

/// PUT /trips/{code}
async fn update_trip(
    State(state): State<AppState>,
    Extension(claims): Extension<SessionClaims>,
    Path(code): Path<String>,
    payload: Result<Json<TripPatch>, JsonRejection>,
) -> Result<Json<Trip>, AppError> {
    let Json(patch) = payload?;
    let trip = state.catalog.update(&code, patch).await?;
    tracing::info!(code = %trip.code, user_id = %claims.sub, "Trip edited");

    Ok(Json(trip))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_blank_form_values_are_ignored() {
        let query = ListTripsQuery {
            search_term: Some(String::new()),
            min_price: Some(String::new()),
            min_rating: Some("  ".to_string()),
            ..Default::default()
        };
        assert_eq!(query.into_query().unwrap(), TripQuery::default());
    }

    #[test]
    fn test_query_parsing() {
        let query = ListTripsQuery {
            min_price: Some("500".to_string()),
            min_rating: Some("4".to_string()),
            sort: Some("perPerson".to_string()),
            direction: Some("descending".to_string()),
            ..Default::default()
        };
        let parsed = query.into_query().unwrap();
        assert_eq!(parsed.filters.min_price, Some(500.0));
        assert_eq!(parsed.filters.min_rating, Some(4));
        assert_eq!(parsed.sort, Some(SortConfig::new(SortKey::PerPerson, SortDirection::Descending)));
    }

    #[test]
    fn test_filters_alone_sort_by_name() {
        let query = ListTripsQuery { min_rating: Some("3".to_string()), ..Default::default() };
        let parsed = query.into_query().unwrap();
        assert_eq!(parsed.filters.min_rating, Some(3));
        assert_eq!(parsed.sort, Some(SortConfig::default()));
    }

    #[test]
    fn test_direction_alone_applies_to_name() {
        let query = ListTripsQuery { direction: Some("descending".to_string()), ..Default::default() };
        assert_eq!(
            query.into_query().unwrap().sort,
            Some(SortConfig::new(SortKey::Name, SortDirection::Descending))
        );
    }

    #[test]
    fn test_bad_values_are_reported_per_field() {
        let query = ListTripsQuery {
            min_price: Some("lots".to_string()),
            sort: Some("price".to_string()),
            ..Default::default()
        };
        match query.into_query() {
            Err(AppError::ValidationError { errors, .. }) => {
                assert!(errors.contains_key("minPrice"));
                assert!(errors.contains_key("sort"));
            }
            other => panic!("expected validation error, got {:?}", other),
        }
    }
}
