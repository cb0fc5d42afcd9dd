//! In-process stores used for local development and tests.

use async_trait::async_trait;
use tokio::sync::RwLock;
use travlr_catalog::Trip;

use crate::identity::User;
use crate::repository::{TripRepository, UserRepository};
use crate::{CoreError, CoreResult};

/// Trips kept in insertion order, like a document collection's natural order.
#[derive(Default)]
pub struct MemoryTripRepository {
    trips: RwLock<Vec<Trip>>,
}

impl MemoryTripRepository {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_trips(trips: Vec<Trip>) -> Self {
        Self { trips: RwLock::new(trips) }
    }
}

#[async_trait]
impl TripRepository for MemoryTripRepository {
    async fn list_trips(&self) -> CoreResult<Vec<Trip>> {
        Ok(self.trips.read().await.clone())
    }

    async fn get_trip(&self, code: &str) -> CoreResult<Option<Trip>> {
        Ok(self.trips.read().await.iter().find(|t| t.code == code).cloned())
    }

    async fn create_trip(&self, trip: &Trip) -> CoreResult<()> {
        let mut trips = self.trips.write().await;
        if trips.iter().any(|t| t.code == trip.code) {
            return Err(CoreError::conflict_on("code", "Duplicate trip code."));
        }
        trips.push(trip.clone());
        Ok(())
    }

    async fn update_trip(&self, trip: &Trip) -> CoreResult<Option<Trip>> {
        let mut trips = self.trips.write().await;
        match trips.iter_mut().find(|t| t.code == trip.code) {
            Some(slot) => {
                *slot = trip.clone();
                Ok(Some(slot.clone()))
            }
            None => Ok(None),
        }
    }
}

#[derive(Default)]
pub struct MemoryUserRepository {
    users: RwLock<Vec<User>>,
}

impl MemoryUserRepository {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl UserRepository for MemoryUserRepository {
    async fn find_user_by_email(&self, email: &str) -> CoreResult<Option<User>> {
        Ok(self.users.read().await.iter().find(|u| u.email == email).cloned())
    }

    async fn create_user(&self, user: &User) -> CoreResult<()> {
        let mut users = self.users.write().await;
        if users.iter().any(|u| u.email == user.email) {
            return Err(CoreError::conflict_on("email", "User already exists"));
        }
        users.push(user.clone());
        Ok(())
    }
}
