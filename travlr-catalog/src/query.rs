//! Filter and sort over an already fetched trip collection.
//!
//! Everything here is pure: the caller owns the current [`TripQuery`] and
//! recomputes the listing from scratch whenever it changes.

use std::cmp::Ordering;
use std::str::FromStr;

use crate::trip::Trip;

/// Optional predicates, combined with AND. `None` (or an empty search term)
/// leaves that predicate inactive.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TripFilters {
    pub search_term: Option<String>,
    pub min_price: Option<f64>,
    pub max_price: Option<f64>,
    pub min_duration_nights: Option<i32>,
    pub min_rating: Option<i32>,
}

impl TripFilters {
    pub fn matches(&self, trip: &Trip) -> bool {
        if let Some(term) = self.search_term.as_deref().filter(|t| !t.is_empty()) {
            let term = term.to_lowercase();
            let hit = [&trip.name, &trip.resort, &trip.description]
                .iter()
                .any(|field| field.to_lowercase().contains(&term));
            if !hit {
                return false;
            }
        }

        // A trip whose price does not parse never satisfies a price bound.
        if let Some(min) = self.min_price {
            if !trip.price().is_some_and(|p| p >= min) {
                return false;
            }
        }
        if let Some(max) = self.max_price {
            if !trip.price().is_some_and(|p| p <= max) {
                return false;
            }
        }

        if let Some(min) = self.min_duration_nights {
            if trip.duration_nights < min {
                return false;
            }
        }
        if let Some(min) = self.min_rating {
            if trip.rating < min {
                return false;
            }
        }

        true
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SortKey {
    Name,
    PerPerson,
    DurationNights,
    Rating,
}

impl FromStr for SortKey {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "name" => Ok(SortKey::Name),
            "perPerson" => Ok(SortKey::PerPerson),
            "durationNights" => Ok(SortKey::DurationNights),
            "rating" => Ok(SortKey::Rating),
            other => Err(format!("unknown sort key: {}", other)),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SortDirection {
    #[default]
    Ascending,
    Descending,
}

impl FromStr for SortDirection {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "ascending" | "asc" => Ok(SortDirection::Ascending),
            "descending" | "desc" => Ok(SortDirection::Descending),
            other => Err(format!("unknown sort direction: {}", other)),
        }
    }
}

impl SortDirection {
    pub fn flipped(self) -> Self {
        match self {
            SortDirection::Ascending => SortDirection::Descending,
            SortDirection::Descending => SortDirection::Ascending,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SortConfig {
    pub key: SortKey,
    pub direction: SortDirection,
}

impl Default for SortConfig {
    fn default() -> Self {
        Self { key: SortKey::Name, direction: SortDirection::Ascending }
    }
}

impl SortConfig {
    pub fn new(key: SortKey, direction: SortDirection) -> Self {
        Self { key, direction }
    }

    /// The sort that results from the user picking `key`: the active key
    /// flips direction, any other key starts ascending.
    pub fn select(self, key: SortKey) -> Self {
        if self.key == key {
            Self { key, direction: self.direction.flipped() }
        } else {
            Self { key, direction: SortDirection::Ascending }
        }
    }

    pub fn compare(&self, a: &Trip, b: &Trip) -> Ordering {
        let ordering = match self.key {
            SortKey::Name => a.name.to_lowercase().cmp(&b.name.to_lowercase()),
            SortKey::PerPerson => compare_prices(a.price(), b.price()),
            SortKey::DurationNights => a.duration_nights.cmp(&b.duration_nights),
            SortKey::Rating => a.rating.cmp(&b.rating),
        };

        match self.direction {
            SortDirection::Ascending => ordering,
            SortDirection::Descending => ordering.reverse(),
        }
    }
}

// Unparseable prices sort before every real price.
fn compare_prices(a: Option<f64>, b: Option<f64>) -> Ordering {
    match (a, b) {
        (Some(a), Some(b)) => a.total_cmp(&b),
        (None, Some(_)) => Ordering::Less,
        (Some(_), None) => Ordering::Greater,
        (None, None) => Ordering::Equal,
    }
}

/// Immutable listing configuration: filters plus an optional active sort.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TripQuery {
    pub filters: TripFilters,
    pub sort: Option<SortConfig>,
}

impl TripQuery {
    pub fn new(filters: TripFilters, sort: Option<SortConfig>) -> Self {
        Self { filters, sort }
    }

    /// Run the query. Ties keep their relative order from `trips`.
    pub fn apply(&self, trips: &[Trip]) -> Vec<Trip> {
        let mut results: Vec<Trip> = trips
            .iter()
            .filter(|trip| self.filters.matches(trip))
            .cloned()
            .collect();

        if let Some(sort) = &self.sort {
            // `sort_by` is stable, which is what keeps ties in input order.
            results.sort_by(|a, b| sort.compare(a, b));
        }

        results
    }
}
