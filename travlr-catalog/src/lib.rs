pub mod trip;
pub mod query;

pub use trip::{Trip, TripPatch, TripValidationError, REQUIRED_FIELDS};
pub use query::{SortConfig, SortDirection, SortKey, TripFilters, TripQuery};
