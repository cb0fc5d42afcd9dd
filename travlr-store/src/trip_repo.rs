use async_trait::async_trait;
use chrono::NaiveDate;
use sqlx::PgPool;
use travlr_catalog::Trip;
use travlr_core::repository::TripRepository;
use travlr_core::{CoreError, CoreResult};

use crate::database::{map_read_error, map_write_error};

pub struct StoreTripRepository {
    pool: PgPool,
}

impl StoreTripRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[derive(sqlx::FromRow)]
struct TripRow {
    code: String,
    name: String,
    length: String,
    duration_nights: i32,
    start_date: NaiveDate,
    resort: String,
    rating: i32,
    per_person: String,
    image: String,
    description: String,
}

impl From<TripRow> for Trip {
    fn from(row: TripRow) -> Self {
        Trip {
            code: row.code,
            name: row.name,
            length: row.length,
            duration_nights: row.duration_nights,
            start: row.start_date,
            resort: row.resort,
            rating: row.rating,
            per_person: row.per_person,
            image: row.image,
            description: row.description,
        }
    }
}

const TRIP_COLUMNS: &str =
    "code, name, length, duration_nights, start_date, resort, rating, per_person, image, description";

#[async_trait]
impl TripRepository for StoreTripRepository {
    async fn list_trips(&self) -> CoreResult<Vec<Trip>> {
        let rows: Vec<TripRow> = sqlx::query_as(&format!(
            "SELECT {} FROM trips ORDER BY created_at, code",
            TRIP_COLUMNS
        ))
        .fetch_all(&self.pool)
        .await
        .map_err(map_read_error)?;

        Ok(rows.into_iter().map(Trip::from).collect())
    }

    async fn get_trip(&self, code: &str) -> CoreResult<Option<Trip>> {
        let row: Option<TripRow> = sqlx::query_as(&format!(
            "SELECT {} FROM trips WHERE code = $1",
            TRIP_COLUMNS
        ))
        .bind(code)
        .fetch_optional(&self.pool)
        .await
        .map_err(map_read_error)?;

        Ok(row.map(Trip::from))
    }

    async fn create_trip(&self, trip: &Trip) -> CoreResult<()> {
        sqlx::query(
            r#"
            INSERT INTO trips (code, name, length, duration_nights, start_date, resort, rating, per_person, image, description)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10)
            "#,
        )
        .bind(&trip.code)
        .bind(&trip.name)
        .bind(&trip.length)
        .bind(trip.duration_nights)
        .bind(trip.start)
        .bind(&trip.resort)
        .bind(trip.rating)
        .bind(&trip.per_person)
        .bind(&trip.image)
        .bind(&trip.description)
        .execute(&self.pool)
        .await
        .map_err(|e| map_write_error(e, CoreError::conflict_on("code", "Duplicate trip code.")))?;

        Ok(())
    }

    async fn update_trip(&self, trip: &Trip) -> CoreResult<Option<Trip>> {
        let row: Option<TripRow> = sqlx::query_as(&format!(
            r#"
            UPDATE trips
            SET name = $2, length = $3, duration_nights = $4, start_date = $5, resort = $6,
                rating = $7, per_person = $8, image = $9, description = $10, updated_at = NOW()
            WHERE code = $1
            RETURNING {}
            "#,
            TRIP_COLUMNS
        ))
        .bind(&trip.code)
        .bind(&trip.name)
        .bind(&trip.length)
        .bind(trip.duration_nights)
        .bind(trip.start)
        .bind(&trip.resort)
        .bind(trip.rating)
        .bind(&trip.per_person)
        .bind(&trip.image)
        .bind(&trip.description)
        .fetch_optional(&self.pool)
        .await
        .map_err(map_read_error)?;

        Ok(row.map(Trip::from))
    }
}
