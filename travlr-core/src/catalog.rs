use std::sync::Arc;

use travlr_catalog::{Trip, TripPatch, TripQuery};

use crate::repository::TripRepository;
use crate::{CoreError, CoreResult};

/// Trip CRUD with validation in front of the Trip Store.
pub struct CatalogService {
    trips: Arc<dyn TripRepository>,
}

impl CatalogService {
    pub fn new(trips: Arc<dyn TripRepository>) -> Self {
        Self { trips }
    }

    /// All trips. An empty store is an empty list, not an error.
    pub async fn list(&self) -> CoreResult<Vec<Trip>> {
        self.trips.list_trips().await
    }

    /// Listing narrowed and ordered by the query engine.
    pub async fn search(&self, query: &TripQuery) -> CoreResult<Vec<Trip>> {
        let trips = self.trips.list_trips().await?;
        Ok(query.apply(&trips))
    }

    pub async fn get(&self, code: &str) -> CoreResult<Trip> {
        self.trips
            .get_trip(code)
            .await?
            .ok_or_else(|| not_found(code))
    }

    pub async fn create(&self, patch: TripPatch) -> CoreResult<Trip> {
        let trip = patch.into_trip()?;
        self.trips.create_trip(&trip).await?;
        tracing::info!(code = %trip.code, "Trip created");
        Ok(trip)
    }

    pub async fn update(&self, code: &str, patch: TripPatch) -> CoreResult<Trip> {
        let current = self.get(code).await?;
        let merged = current.merge(patch)?;

        // The record can vanish between the read and the write.
        let updated = self
            .trips
            .update_trip(&merged)
            .await?
            .ok_or_else(|| not_found(code))?;
        tracing::info!(code = %updated.code, "Trip updated");
        Ok(updated)
    }
}

fn not_found(code: &str) -> CoreError {
    CoreError::NotFound(format!("Trip not found with code {}", code))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::memory::MemoryTripRepository;
    use serde_json::json;
    use travlr_catalog::{SortConfig, SortKey, TripFilters};

    fn patch(code: &str, price: &str, rating: i64) -> TripPatch {
        serde_json::from_value(json!({
            "code": code,
            "name": format!("Trip {}", code),
            "length": "4 nights / 5 days",
            "durationNights": 4,
            "start": "2024-06-15",
            "resort": "Blue Lagoon, 4 stars",
            "rating": rating,
            "perPerson": price,
            "image": "reef1.jpg",
            "description": "Reef diving."
        }))
        .unwrap()
    }

    fn service() -> CatalogService {
        CatalogService::new(Arc::new(MemoryTripRepository::new()))
    }

    #[tokio::test]
    async fn test_empty_store_lists_nothing() {
        assert!(service().list().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_create_then_get() {
        let catalog = service();
        let created = catalog.create(patch("GALE", "1299.99", 4)).await.unwrap();
        assert_eq!(catalog.get("GALE").await.unwrap(), created);
        assert_eq!(catalog.list().await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_duplicate_code_conflicts() {
        let catalog = service();
        catalog.create(patch("GALE", "1299.99", 4)).await.unwrap();
        let err = catalog.create(patch("GALE", "999", 2)).await.unwrap_err();
        assert!(matches!(err, CoreError::Conflict { field: Some(ref f), .. } if f == "code"));
    }

    #[tokio::test]
    async fn test_create_reports_missing_field() {
        let mut incomplete = patch("GALE", "1299.99", 4);
        incomplete.resort = None;
        match service().create(incomplete).await {
            Err(CoreError::ValidationError(fields)) => assert!(fields.contains_key("resort")),
            other => panic!("expected validation error, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_update_merges_and_persists() {
        let catalog = service();
        catalog.create(patch("GALE", "1299.99", 4)).await.unwrap();

        let edit = TripPatch { per_person: Some("1399.00".to_string()), ..Default::default() };
        let updated = catalog.update("GALE", edit).await.unwrap();
        assert_eq!(updated.per_person, "1399.00");
        assert_eq!(updated.rating, 4);
        assert_eq!(catalog.get("GALE").await.unwrap(), updated);
    }

    #[tokio::test]
    async fn test_update_missing_trip() {
        let err = service().update("XYZ", TripPatch::default()).await.unwrap_err();
        match err {
            CoreError::NotFound(message) => assert!(message.contains("XYZ")),
            other => panic!("expected not found, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_search_uses_query_engine() {
        let catalog = service();
        catalog.create(patch("A", "400", 3)).await.unwrap();
        catalog.create(patch("B", "800", 5)).await.unwrap();
        catalog.create(patch("C", "900", 3)).await.unwrap();

        let query = TripQuery::new(
            TripFilters { min_price: Some(500.0), ..Default::default() },
            Some(SortConfig::default().select(SortKey::Rating).select(SortKey::Rating)),
        );
        let codes: Vec<String> = catalog.search(&query).await.unwrap().into_iter().map(|t| t.code).collect();
        assert_eq!(codes, vec!["B", "C"]);
    }
}
