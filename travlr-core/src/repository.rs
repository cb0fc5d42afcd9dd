use async_trait::async_trait;
use travlr_catalog::Trip;

use crate::identity::User;
use crate::CoreResult;

/// Trip Store. Implementations report a duplicate `code` as
/// [`CoreError::Conflict`](crate::CoreError::Conflict).
#[async_trait]
pub trait TripRepository: Send + Sync {
    /// All trips in storage order.
    async fn list_trips(&self) -> CoreResult<Vec<Trip>>;

    async fn get_trip(&self, code: &str) -> CoreResult<Option<Trip>>;

    async fn create_trip(&self, trip: &Trip) -> CoreResult<()>;

    /// Replace the stored record with the same code. Returns `None` when no
    /// such trip exists.
    async fn update_trip(&self, trip: &Trip) -> CoreResult<Option<Trip>>;
}

/// Credential Store. Emails are stored normalized (see [`crate::identity::normalize_email`]).
#[async_trait]
pub trait UserRepository: Send + Sync {
    async fn find_user_by_email(&self, email: &str) -> CoreResult<Option<User>>;

    async fn create_user(&self, user: &User) -> CoreResult<()>;
}
