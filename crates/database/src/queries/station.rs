use model::{
    station::{NewStation, Station, StationPatch, StationStatus},
    WithId,
};
use sqlx::{Executor, Postgres};
use stations::database::{DatabaseError, Result};
use utility::{id::Id, let_also::LetAlso};

use crate::data_model::{station::StationRow, with_id, with_ids};

use super::convert_error;

pub async fn get<'c, E>(executor: E, id: &Id<Station>) -> Result<WithId<Station>>
where
    E: Executor<'c, Database = Postgres>,
{
    sqlx::query_as(
        "
        SELECT id, name, location, station_type, status, created_at, updated_at
        FROM stations
        WHERE id = $1 AND deleted_at IS NULL;
        ",
    )
    .bind(id.raw())
    .fetch_one(executor)
    .await
    .map_err(convert_error)
    .and_then(|row: StationRow| with_id(row))
}

pub async fn get_all<'c, E>(executor: E) -> Result<Vec<WithId<Station>>>
where
    E: Executor<'c, Database = Postgres>,
{
    sqlx::query_as(
        "
        SELECT id, name, location, station_type, status, created_at, updated_at
        FROM stations
        WHERE deleted_at IS NULL
        ORDER BY created_at ASC, id ASC;
        ",
    )
    .fetch_all(executor)
    .await
    .map_err(convert_error)?
    .let_owned(|stations: Vec<StationRow>| with_ids(stations))
}

pub async fn insert<'c, E>(
    executor: E,
    id: Id<Station>,
    station: NewStation,
) -> Result<WithId<Station>>
where
    E: Executor<'c, Database = Postgres>,
{
    sqlx::query_as(
        "
        INSERT INTO stations(
            id,
            name,
            location,
            station_type,
            status
        )
        VALUES ($1, $2, $3, $4, $5)
        RETURNING id, name, location, station_type, status, created_at, updated_at;
        ",
    )
    .bind(id.raw())
    .bind(&station.name)
    .bind(&station.location)
    .bind(station.station_type.as_str())
    .bind(station.status.as_str())
    .fetch_one(executor)
    .await
    .map_err(convert_error)
    .and_then(|row: StationRow| with_id(row))
}

/// Returns `false` if a live station with the same name and location
/// already exists.
pub async fn insert_if_absent<'c, E>(
    executor: E,
    id: Id<Station>,
    station: NewStation,
) -> Result<bool>
where
    E: Executor<'c, Database = Postgres>,
{
    sqlx::query(
        "
        INSERT INTO stations(
            id,
            name,
            location,
            station_type,
            status
        )
        VALUES ($1, $2, $3, $4, $5)
        ON CONFLICT DO NOTHING;
        ",
    )
    .bind(id.raw())
    .bind(&station.name)
    .bind(&station.location)
    .bind(station.station_type.as_str())
    .bind(station.status.as_str())
    .execute(executor)
    .await
    .map_err(convert_error)
    .map(|result| result.rows_affected() == 1)
}

pub async fn update<'c, E>(
    executor: E,
    id: &Id<Station>,
    patch: StationPatch,
) -> Result<WithId<Station>>
where
    E: Executor<'c, Database = Postgres>,
{
    sqlx::query_as(
        "
        UPDATE stations
        SET name = COALESCE($2, name),
            location = COALESCE($3, location),
            station_type = COALESCE($4, station_type),
            status = COALESCE($5, status),
            updated_at = now()
        WHERE id = $1 AND deleted_at IS NULL
        RETURNING id, name, location, station_type, status, created_at, updated_at;
        ",
    )
    .bind(id.raw())
    .bind(patch.name)
    .bind(patch.location)
    .bind(patch.station_type.map(|station_type| station_type.as_str()))
    .bind(patch.status.map(|status| status.as_str()))
    .fetch_one(executor)
    .await
    .map_err(convert_error)
    .and_then(|row: StationRow| with_id(row))
}

pub async fn soft_delete<'c, E>(executor: E, id: &Id<Station>) -> Result<()>
where
    E: Executor<'c, Database = Postgres>,
{
    let result = sqlx::query(
        "
        UPDATE stations
        SET status = $2,
            deleted_at = now(),
            updated_at = now()
        WHERE id = $1 AND deleted_at IS NULL;
        ",
    )
    .bind(id.raw())
    .bind(StationStatus::Inactive.as_str())
    .execute(executor)
    .await
    .map_err(convert_error)?;

    if result.rows_affected() == 0 {
        return Err(DatabaseError::NotFound);
    }
    Ok(())
}
