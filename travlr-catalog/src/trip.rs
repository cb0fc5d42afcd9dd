use std::collections::BTreeMap;

use chrono::{DateTime, NaiveDate};
use serde::{Deserialize, Deserializer, Serialize};

/// Fields every trip must carry, in the order the admin form lists them.
pub const REQUIRED_FIELDS: [&str; 10] = [
    "code",
    "name",
    "length",
    "durationNights",
    "start",
    "resort",
    "rating",
    "perPerson",
    "image",
    "description",
];

pub const MIN_RATING: i32 = 1;
pub const MAX_RATING: i32 = 5;
pub const MIN_DURATION_NIGHTS: i32 = 1;

/// A bookable travel package, identified by its human-readable `code`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Trip {
    pub code: String,
    pub name: String,
    /// Display string, e.g. "4 nights / 5 days".
    pub length: String,
    pub duration_nights: i32,
    pub start: NaiveDate,
    pub resort: String,
    pub rating: i32,
    /// Decimal price kept as text, e.g. "1299.99".
    pub per_person: String,
    /// Filename under the public images folder or an absolute URL.
    pub image: String,
    pub description: String,
}

impl Trip {
    /// Price per person as a number, `None` when the stored text is not a decimal.
    pub fn price(&self) -> Option<f64> {
        parse_price(&self.per_person)
    }

    /// Apply an edit to this trip. Absent fields keep their current value and
    /// the merged record goes through the same checks as a new trip.
    pub fn merge(&self, patch: TripPatch) -> Result<Trip, TripValidationError> {
        if let Some(code) = patch.code.as_deref() {
            if code != self.code {
                let mut errors = TripValidationError::default();
                errors.add("code", "code is immutable");
                return Err(errors);
            }
        }

        let merged = TripPatch {
            code: Some(self.code.clone()),
            name: patch.name.or_else(|| Some(self.name.clone())),
            length: patch.length.or_else(|| Some(self.length.clone())),
            duration_nights: patch.duration_nights.or(Some(i64::from(self.duration_nights))),
            start: patch.start.or_else(|| Some(self.start.format("%Y-%m-%d").to_string())),
            resort: patch.resort.or_else(|| Some(self.resort.clone())),
            rating: patch.rating.or(Some(i64::from(self.rating))),
            per_person: patch.per_person.or_else(|| Some(self.per_person.clone())),
            image: patch.image.or_else(|| Some(self.image.clone())),
            description: patch.description.or_else(|| Some(self.description.clone())),
        };

        merged.into_trip()
    }
}

/// Trip fields as submitted by the admin forms. Every field is optional so a
/// single type serves both "add" (all required) and "edit" (partial merge).
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TripPatch {
    #[serde(default)]
    pub code: Option<String>,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub length: Option<String>,
    #[serde(default)]
    pub duration_nights: Option<i64>,
    #[serde(default)]
    pub start: Option<String>,
    #[serde(default)]
    pub resort: Option<String>,
    #[serde(default)]
    pub rating: Option<i64>,
    #[serde(default, deserialize_with = "price_text")]
    pub per_person: Option<String>,
    #[serde(default)]
    pub image: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
}

impl TripPatch {
    /// Validate a complete trip. All offending fields are reported together.
    pub fn into_trip(self) -> Result<Trip, TripValidationError> {
        let mut errors = TripValidationError::default();

        let code = required_text(&mut errors, "code", self.code);
        let name = required_text(&mut errors, "name", self.name);
        let length = required_text(&mut errors, "length", self.length);
        let resort = required_text(&mut errors, "resort", self.resort);
        let image = required_text(&mut errors, "image", self.image);
        let description = required_text(&mut errors, "description", self.description);

        let duration_nights = match self.duration_nights {
            None => {
                errors.add("durationNights", required_message("durationNights"));
                None
            }
            Some(n) if n < i64::from(MIN_DURATION_NIGHTS) => {
                errors.add("durationNights", "Duration must be at least 1 night.");
                None
            }
            Some(n) => match i32::try_from(n) {
                Ok(n) => Some(n),
                Err(_) => {
                    errors.add("durationNights", "Duration is out of range.");
                    None
                }
            },
        };

        let rating = match self.rating {
            None => {
                errors.add("rating", required_message("rating"));
                None
            }
            Some(r) if r < i64::from(MIN_RATING) || r > i64::from(MAX_RATING) => {
                errors.add("rating", "Rating must be between 1 and 5.");
                None
            }
            // Range check above guarantees the value fits.
            Some(r) => i32::try_from(r).ok(),
        };

        let start = match required_text(&mut errors, "start", self.start) {
            Some(raw) => match parse_start_date(&raw) {
                Some(date) => Some(date),
                None => {
                    errors.add("start", "Start date must be a calendar date (YYYY-MM-DD).");
                    None
                }
            },
            None => None,
        };

        let per_person = match required_text(&mut errors, "perPerson", self.per_person) {
            Some(raw) => match parse_price(&raw) {
                Some(p) if p >= 0.0 => Some(raw.trim().to_string()),
                _ => {
                    errors.add("perPerson", "Price per person must be a non-negative decimal.");
                    None
                }
            },
            None => None,
        };

        match (code, name, length, duration_nights, start, resort, rating, per_person, image, description) {
            (
                Some(code),
                Some(name),
                Some(length),
                Some(duration_nights),
                Some(start),
                Some(resort),
                Some(rating),
                Some(per_person),
                Some(image),
                Some(description),
            ) if errors.is_empty() => Ok(Trip {
                code,
                name,
                length,
                duration_nights,
                start,
                resort,
                rating,
                per_person,
                image,
                description,
            }),
            _ => Err(errors),
        }
    }
}

/// Per-field validation failures, keyed by the JSON field name.
#[derive(Debug, Clone, Default, PartialEq, Eq, thiserror::Error)]
#[error("Validation failed: {}", describe(.fields))]
pub struct TripValidationError {
    pub fields: BTreeMap<String, String>,
}

impl TripValidationError {
    pub fn add(&mut self, field: &str, message: impl Into<String>) {
        self.fields.entry(field.to_string()).or_insert_with(|| message.into());
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    pub fn contains(&self, field: &str) -> bool {
        self.fields.contains_key(field)
    }
}

fn describe(fields: &BTreeMap<String, String>) -> String {
    fields
        .iter()
        .map(|(field, message)| format!("{}: {}", field, message))
        .collect::<Vec<_>>()
        .join("; ")
}

fn required_message(field: &str) -> &'static str {
    match field {
        "code" => "Trip code is required.",
        "name" => "Trip name is required.",
        "length" => "Trip length is required.",
        "durationNights" => "Duration in nights is required.",
        "start" => "Start date is required.",
        "resort" => "Resort name is required.",
        "rating" => "Resort rating is required.",
        "perPerson" => "Price per person is required.",
        "image" => "Image name/URL is required.",
        "description" => "Description is required.",
        _ => "Field is required.",
    }
}

fn required_text(errors: &mut TripValidationError, field: &str, value: Option<String>) -> Option<String> {
    match value {
        Some(v) if !v.trim().is_empty() => Some(v),
        _ => {
            errors.add(field, required_message(field));
            None
        }
    }
}

/// Accepts `YYYY-MM-DD` or a full RFC 3339 timestamp, keeping only the date.
pub fn parse_start_date(raw: &str) -> Option<NaiveDate> {
    let raw = raw.trim();
    NaiveDate::parse_from_str(raw, "%Y-%m-%d")
        .ok()
        .or_else(|| DateTime::parse_from_rfc3339(raw).ok().map(|dt| dt.date_naive()))
}

pub fn parse_price(raw: &str) -> Option<f64> {
    raw.trim().parse::<f64>().ok().filter(|p| p.is_finite())
}

#[derive(Deserialize)]
#[serde(untagged)]
enum PriceInput {
    Text(String),
    Number(f64),
}

// Prices arrive as text from the forms but some clients send bare numbers.
fn price_text<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(Option::<PriceInput>::deserialize(deserializer)?.map(|input| match input {
        PriceInput::Text(s) => s,
        PriceInput::Number(n) => n.to_string(),
    }))
}
