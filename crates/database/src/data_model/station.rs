use chrono::{DateTime, Utc};
use model::station::Station;
use sqlx::prelude::FromRow;
use stations::database::{DatabaseError, Result};
use utility::id::Id;

use super::DatabaseRow;

#[derive(Debug, Clone, FromRow)]
pub struct StationRow {
    pub id: String,
    pub name: String,
    pub location: String,
    pub station_type: String,
    pub status: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl DatabaseRow for StationRow {
    type Model = Station;

    fn get_id(&self) -> Id<Self::Model> {
        Id::new(self.id.clone())
    }

    fn to_model(self) -> Result<Self::Model> {
        Ok(Station {
            name: self.name,
            location: self.location,
            station_type: self.station_type.parse().map_err(DatabaseError::other)?,
            status: self.status.parse().map_err(DatabaseError::other)?,
            created_at: self.created_at,
            updated_at: self.updated_at,
        })
    }
}
