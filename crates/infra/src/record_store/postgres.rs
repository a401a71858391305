//! Postgres-backed record store.
//!
//! ## Error Mapping
//!
//! | PostgreSQL Error Code | StoreError | Scenario |
//! |----------------------|------------|----------|
//! | `23503` (foreign key violation) | `Integrity` | tour/salida references a missing row |
//! | `23514` (check violation) | `Integrity` | e.g. unknown genre code |
//! | anything else | `Database` | connection failures, pool closed, ... |
//!
//! Updates are read-modify-write inside a transaction: the row is locked
//! with `SELECT ... FOR UPDATE`, the patch is applied with the catalog's own
//! rules, and every column is written back.

use std::sync::Arc;

use async_trait::async_trait;
use sqlx::postgres::PgRow;
use sqlx::{PgPool, Postgres, Row, Transaction};
use tracing::instrument;

use tours_catalog::{
    Genre, NewSalida, NewTour, NewUser, NewZone, Salida, Tour, TourPatch, User, UserPatch, Zone,
    ZonePatch, ZoneRole,
};
use tours_core::{SalidaId, TourId, UserId, ZoneId};

use super::r#trait::{RecordStore, StoreError, StoreResult};

const SCHEMA: &str = include_str!("../../migrations/0001_catalog.sql");

const USER_COLUMNS: &str = r#"id, name, last_name, email, birthday, genre, "key", "type""#;
const ZONE_COLUMNS: &str = "id, name, description, latitud, longitud";
const TOUR_COLUMNS: &str = "id, name, img, zona_salida_id, zona_llegada_id";
const SALIDA_COLUMNS: &str = "id, tour_id, fecha, cupo, precio";

/// Postgres-backed record store.
///
/// Uses the SQLx connection pool, which is `Send + Sync`; the store can be
/// shared across handlers behind an `Arc`.
#[derive(Debug, Clone)]
pub struct PostgresRecordStore {
    pool: Arc<PgPool>,
}

impl PostgresRecordStore {
    pub fn new(pool: PgPool) -> Self {
        Self {
            pool: Arc::new(pool),
        }
    }

    /// Connect and make sure the catalog tables exist.
    pub async fn connect(database_url: &str) -> StoreResult<Self> {
        let pool = PgPool::connect(database_url)
            .await
            .map_err(|e| map_sqlx_error("connect", e))?;
        let store = Self::new(pool);
        store.ensure_schema().await?;
        Ok(store)
    }

    pub fn pool(&self) -> &PgPool {
        &self.pool
    }

    #[instrument(skip(self), err)]
    pub async fn ensure_schema(&self) -> StoreResult<()> {
        sqlx::raw_sql(SCHEMA)
            .execute(&*self.pool)
            .await
            .map_err(|e| map_sqlx_error("ensure_schema", e))?;
        Ok(())
    }

    async fn begin(&self, operation: &'static str) -> StoreResult<Transaction<'static, Postgres>> {
        self.pool
            .begin()
            .await
            .map_err(|e| map_sqlx_error(operation, e))
    }
}

pub(crate) fn map_sqlx_error(operation: &'static str, err: sqlx::Error) -> StoreError {
    if let sqlx::Error::Database(db_err) = &err {
        if let Some(code) = db_err.code() {
            if matches!(code.as_ref(), "23503" | "23514") {
                return StoreError::Integrity(format!(
                    "{operation}: {}",
                    db_err.message()
                ));
            }
        }
    }
    StoreError::Database {
        operation,
        source: err,
    }
}

fn user_from_row(row: &PgRow) -> Result<User, sqlx::Error> {
    let genre: Option<String> = row.try_get("genre")?;
    Ok(User {
        id: UserId::new(row.try_get("id")?),
        name: row.try_get("name")?,
        last_name: row.try_get("last_name")?,
        email: row.try_get("email")?,
        birthday: row.try_get("birthday")?,
        genre: genre.as_deref().and_then(Genre::from_code),
        key: row.try_get("key")?,
        user_type: row.try_get("type")?,
    })
}

fn zone_from_row(row: &PgRow) -> Result<Zone, sqlx::Error> {
    Ok(Zone {
        id: ZoneId::new(row.try_get("id")?),
        name: row.try_get("name")?,
        description: row.try_get("description")?,
        latitude: row.try_get("latitud")?,
        longitude: row.try_get("longitud")?,
    })
}

fn tour_from_row(row: &PgRow) -> Result<Tour, sqlx::Error> {
    Ok(Tour {
        id: TourId::new(row.try_get("id")?),
        name: row.try_get("name")?,
        img: row.try_get("img")?,
        departure_zone: ZoneId::new(row.try_get("zona_salida_id")?),
        arrival_zone: ZoneId::new(row.try_get("zona_llegada_id")?),
    })
}

fn salida_from_row(row: &PgRow) -> Result<Salida, sqlx::Error> {
    Ok(Salida {
        id: SalidaId::new(row.try_get("id")?),
        tour: TourId::new(row.try_get("tour_id")?),
        departs_on: row.try_get("fecha")?,
        capacity: row.try_get("cupo")?,
        price: row.try_get("precio")?,
    })
}

fn decode_all<T>(
    operation: &'static str,
    rows: Vec<PgRow>,
    decode: fn(&PgRow) -> Result<T, sqlx::Error>,
) -> StoreResult<Vec<T>> {
    rows.iter()
        .map(|row| decode(row).map_err(|e| map_sqlx_error(operation, e)))
        .collect()
}

fn decode_one<T>(
    operation: &'static str,
    row: Option<PgRow>,
    decode: fn(&PgRow) -> Result<T, sqlx::Error>,
) -> StoreResult<Option<T>> {
    row.map(|r| decode(&r).map_err(|e| map_sqlx_error(operation, e)))
        .transpose()
}

#[async_trait]
impl RecordStore for PostgresRecordStore {
    #[instrument(skip(self), err)]
    async fn list_users(&self) -> StoreResult<Vec<User>> {
        let rows = sqlx::query(&format!("SELECT {USER_COLUMNS} FROM users ORDER BY id ASC"))
            .fetch_all(&*self.pool)
            .await
            .map_err(|e| map_sqlx_error("list_users", e))?;
        decode_all("list_users", rows, user_from_row)
    }

    #[instrument(skip(self), fields(user_id = %id), err)]
    async fn get_user(&self, id: UserId) -> StoreResult<Option<User>> {
        let row = sqlx::query(&format!("SELECT {USER_COLUMNS} FROM users WHERE id = $1"))
            .bind(id.get())
            .fetch_optional(&*self.pool)
            .await
            .map_err(|e| map_sqlx_error("get_user", e))?;
        decode_one("get_user", row, user_from_row)
    }

    #[instrument(skip(self, new), err)]
    async fn create_user(&self, new: NewUser) -> StoreResult<User> {
        let row = sqlx::query(&format!(
            r#"INSERT INTO users (name, last_name, email, birthday, genre, "key", "type")
               VALUES ($1, $2, $3, $4, $5, $6, $7)
               RETURNING {USER_COLUMNS}"#
        ))
        .bind(&new.name)
        .bind(&new.last_name)
        .bind(&new.email)
        .bind(new.birthday)
        .bind(new.genre.map(Genre::code))
        .bind(&new.key)
        .bind(&new.user_type)
        .fetch_one(&*self.pool)
        .await
        .map_err(|e| map_sqlx_error("create_user", e))?;
        user_from_row(&row).map_err(|e| map_sqlx_error("create_user", e))
    }

    #[instrument(skip(self, patch), fields(user_id = %id), err)]
    async fn update_user(&self, id: UserId, patch: &UserPatch) -> StoreResult<Option<User>> {
        let mut tx = self.begin("update_user").await?;
        let row = sqlx::query(&format!(
            "SELECT {USER_COLUMNS} FROM users WHERE id = $1 FOR UPDATE"
        ))
        .bind(id.get())
        .fetch_optional(&mut *tx)
        .await
        .map_err(|e| map_sqlx_error("update_user", e))?;
        let Some(mut user) = decode_one("update_user", row, user_from_row)? else {
            return Ok(None);
        };

        user.apply(patch);
        sqlx::query(
            r#"UPDATE users
               SET name = $2, last_name = $3, email = $4, birthday = $5,
                   genre = $6, "key" = $7, "type" = $8
               WHERE id = $1"#,
        )
        .bind(id.get())
        .bind(&user.name)
        .bind(&user.last_name)
        .bind(&user.email)
        .bind(user.birthday)
        .bind(user.genre.map(Genre::code))
        .bind(&user.key)
        .bind(&user.user_type)
        .execute(&mut *tx)
        .await
        .map_err(|e| map_sqlx_error("update_user", e))?;

        tx.commit().await.map_err(|e| map_sqlx_error("update_user", e))?;
        Ok(Some(user))
    }

    #[instrument(skip(self), fields(user_id = %id), err)]
    async fn delete_user(&self, id: UserId) -> StoreResult<bool> {
        let result = sqlx::query("DELETE FROM users WHERE id = $1")
            .bind(id.get())
            .execute(&*self.pool)
            .await
            .map_err(|e| map_sqlx_error("delete_user", e))?;
        Ok(result.rows_affected() > 0)
    }

    #[instrument(skip(self), err)]
    async fn list_zones(&self) -> StoreResult<Vec<Zone>> {
        let rows = sqlx::query(&format!("SELECT {ZONE_COLUMNS} FROM zones ORDER BY id ASC"))
            .fetch_all(&*self.pool)
            .await
            .map_err(|e| map_sqlx_error("list_zones", e))?;
        decode_all("list_zones", rows, zone_from_row)
    }

    #[instrument(skip(self), fields(zone_id = %id), err)]
    async fn get_zone(&self, id: ZoneId) -> StoreResult<Option<Zone>> {
        let row = sqlx::query(&format!("SELECT {ZONE_COLUMNS} FROM zones WHERE id = $1"))
            .bind(id.get())
            .fetch_optional(&*self.pool)
            .await
            .map_err(|e| map_sqlx_error("get_zone", e))?;
        decode_one("get_zone", row, zone_from_row)
    }

    #[instrument(skip(self, new), err)]
    async fn create_zone(&self, new: NewZone) -> StoreResult<Zone> {
        let row = sqlx::query(&format!(
            "INSERT INTO zones (name, description, latitud, longitud)
             VALUES ($1, $2, $3, $4)
             RETURNING {ZONE_COLUMNS}"
        ))
        .bind(&new.name)
        .bind(&new.description)
        .bind(new.latitude)
        .bind(new.longitude)
        .fetch_one(&*self.pool)
        .await
        .map_err(|e| map_sqlx_error("create_zone", e))?;
        zone_from_row(&row).map_err(|e| map_sqlx_error("create_zone", e))
    }

    #[instrument(skip(self, patch), fields(zone_id = %id), err)]
    async fn update_zone(&self, id: ZoneId, patch: &ZonePatch) -> StoreResult<Option<Zone>> {
        let mut tx = self.begin("update_zone").await?;
        let row = sqlx::query(&format!(
            "SELECT {ZONE_COLUMNS} FROM zones WHERE id = $1 FOR UPDATE"
        ))
        .bind(id.get())
        .fetch_optional(&mut *tx)
        .await
        .map_err(|e| map_sqlx_error("update_zone", e))?;
        let Some(mut zone) = decode_one("update_zone", row, zone_from_row)? else {
            return Ok(None);
        };

        zone.apply(patch);
        sqlx::query(
            "UPDATE zones SET name = $2, description = $3, latitud = $4, longitud = $5
             WHERE id = $1",
        )
        .bind(id.get())
        .bind(&zone.name)
        .bind(&zone.description)
        .bind(zone.latitude)
        .bind(zone.longitude)
        .execute(&mut *tx)
        .await
        .map_err(|e| map_sqlx_error("update_zone", e))?;

        tx.commit().await.map_err(|e| map_sqlx_error("update_zone", e))?;
        Ok(Some(zone))
    }

    #[instrument(skip(self), fields(zone_id = %id), err)]
    async fn delete_zone(&self, id: ZoneId) -> StoreResult<bool> {
        let result = sqlx::query("DELETE FROM zones WHERE id = $1")
            .bind(id.get())
            .execute(&*self.pool)
            .await
            .map_err(|e| map_sqlx_error("delete_zone", e))?;
        Ok(result.rows_affected() > 0)
    }

    #[instrument(skip(self), err)]
    async fn list_tours(&self) -> StoreResult<Vec<Tour>> {
        let rows = sqlx::query(&format!("SELECT {TOUR_COLUMNS} FROM tours ORDER BY id ASC"))
            .fetch_all(&*self.pool)
            .await
            .map_err(|e| map_sqlx_error("list_tours", e))?;
        decode_all("list_tours", rows, tour_from_row)
    }

    #[instrument(skip(self), fields(tour_id = %id), err)]
    async fn get_tour(&self, id: TourId) -> StoreResult<Option<Tour>> {
        let row = sqlx::query(&format!("SELECT {TOUR_COLUMNS} FROM tours WHERE id = $1"))
            .bind(id.get())
            .fetch_optional(&*self.pool)
            .await
            .map_err(|e| map_sqlx_error("get_tour", e))?;
        decode_one("get_tour", row, tour_from_row)
    }

    #[instrument(skip(self, new), err)]
    async fn create_tour(&self, new: NewTour) -> StoreResult<Tour> {
        let row = sqlx::query(&format!(
            "INSERT INTO tours (name, img, zona_salida_id, zona_llegada_id)
             VALUES ($1, $2, $3, $4)
             RETURNING {TOUR_COLUMNS}"
        ))
        .bind(&new.name)
        .bind(&new.img)
        .bind(new.departure_zone.get())
        .bind(new.arrival_zone.get())
        .fetch_one(&*self.pool)
        .await
        .map_err(|e| map_sqlx_error("create_tour", e))?;
        tour_from_row(&row).map_err(|e| map_sqlx_error("create_tour", e))
    }

    #[instrument(skip(self, patch), fields(tour_id = %id), err)]
    async fn update_tour(&self, id: TourId, patch: &TourPatch) -> StoreResult<Option<Tour>> {
        let mut tx = self.begin("update_tour").await?;
        let row = sqlx::query(&format!(
            "SELECT {TOUR_COLUMNS} FROM tours WHERE id = $1 FOR UPDATE"
        ))
        .bind(id.get())
        .fetch_optional(&mut *tx)
        .await
        .map_err(|e| map_sqlx_error("update_tour", e))?;
        let Some(mut tour) = decode_one("update_tour", row, tour_from_row)? else {
            return Ok(None);
        };

        tour.apply(patch);
        sqlx::query(
            "UPDATE tours SET name = $2, img = $3, zona_salida_id = $4, zona_llegada_id = $5
             WHERE id = $1",
        )
        .bind(id.get())
        .bind(&tour.name)
        .bind(&tour.img)
        .bind(tour.departure_zone.get())
        .bind(tour.arrival_zone.get())
        .execute(&mut *tx)
        .await
        .map_err(|e| map_sqlx_error("update_tour", e))?;

        tx.commit().await.map_err(|e| map_sqlx_error("update_tour", e))?;
        Ok(Some(tour))
    }

    #[instrument(skip(self), fields(tour_id = %id), err)]
    async fn delete_tour(&self, id: TourId) -> StoreResult<bool> {
        let result = sqlx::query("DELETE FROM tours WHERE id = $1")
            .bind(id.get())
            .execute(&*self.pool)
            .await
            .map_err(|e| map_sqlx_error("delete_tour", e))?;
        Ok(result.rows_affected() > 0)
    }

    #[instrument(skip(self), fields(zone_id = %zone), err)]
    async fn tours_for_zone(&self, zone: ZoneId, role: ZoneRole) -> StoreResult<Vec<Tour>> {
        let column = match role {
            ZoneRole::Departure => "zona_salida_id",
            ZoneRole::Arrival => "zona_llegada_id",
        };
        let rows = sqlx::query(&format!(
            "SELECT {TOUR_COLUMNS} FROM tours WHERE {column} = $1 ORDER BY id ASC"
        ))
        .bind(zone.get())
        .fetch_all(&*self.pool)
        .await
        .map_err(|e| map_sqlx_error("tours_for_zone", e))?;
        decode_all("tours_for_zone", rows, tour_from_row)
    }

    #[instrument(skip(self), err)]
    async fn list_salidas(&self) -> StoreResult<Vec<Salida>> {
        let rows = sqlx::query(&format!("SELECT {SALIDA_COLUMNS} FROM salidas ORDER BY id ASC"))
            .fetch_all(&*self.pool)
            .await
            .map_err(|e| map_sqlx_error("list_salidas", e))?;
        decode_all("list_salidas", rows, salida_from_row)
    }

    #[instrument(skip(self), fields(tour_id = %tour), err)]
    async fn salidas_for_tour(&self, tour: TourId) -> StoreResult<Vec<Salida>> {
        let rows = sqlx::query(&format!(
            "SELECT {SALIDA_COLUMNS} FROM salidas WHERE tour_id = $1 ORDER BY id ASC"
        ))
        .bind(tour.get())
        .fetch_all(&*self.pool)
        .await
        .map_err(|e| map_sqlx_error("salidas_for_tour", e))?;
        decode_all("salidas_for_tour", rows, salida_from_row)
    }

    #[instrument(skip(self, new), err)]
    async fn create_salida(&self, new: NewSalida) -> StoreResult<Salida> {
        let row = sqlx::query(&format!(
            "INSERT INTO salidas (tour_id, fecha, cupo, precio)
             VALUES ($1, $2, $3, $4)
             RETURNING {SALIDA_COLUMNS}"
        ))
        .bind(new.tour.get())
        .bind(new.departs_on)
        .bind(new.capacity)
        .bind(new.price)
        .fetch_one(&*self.pool)
        .await
        .map_err(|e| map_sqlx_error("create_salida", e))?;
        salida_from_row(&row).map_err(|e| map_sqlx_error("create_salida", e))
    }
}
