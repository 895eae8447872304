use model::{
    station::{CreateStation, Station, StationDetails, UpdateStation},
    WithId,
};
use utility::id::Id;

use crate::{
    database::{Database, DatabaseTransaction, StationRepo},
    validation, StationResult,
};

/// Lifecycle operations on stations.
///
/// Holds the process wide store handle; every operation acquires its own
/// connection (or transaction) which is released when the operation returns.
#[derive(Debug, Clone)]
pub struct StationService<D>
where
    D: Database + 'static,
{
    database: D,
}

impl<D> StationService<D>
where
    D: Database,
{
    pub fn new(database: D) -> Self {
        Self { database }
    }

    /// Validates and stores a new, active station. Returns the generated id.
    pub async fn create(&self, input: CreateStation) -> StationResult<Id<Station>> {
        let station = validation::validate_create(input)?;
        let created = self
            .database
            .auto()
            .insert(Id::generate(), station)
            .await?;
        log::info!(
            "created station {} ({}, {})",
            created.id,
            created.content.name,
            created.content.location
        );
        Ok(created.id)
    }

    /// All live stations, including inactive ones.
    pub async fn list(&self) -> StationResult<Vec<WithId<Station>>> {
        Ok(self.database.auto().get_all().await?)
    }

    /// A single live station. Inactive stations are returned without their
    /// status.
    pub async fn get(&self, id: &Id<Station>) -> StationResult<StationDetails> {
        let station = self.database.auto().get(id).await?;
        Ok(StationDetails::from(station))
    }

    /// Applies a partial update. An unknown id is reported before the payload
    /// is looked at.
    pub async fn update(
        &self,
        id: &Id<Station>,
        input: UpdateStation,
    ) -> StationResult<WithId<Station>> {
        let mut tx = self.database.transaction().await?;
        tx.get(id).await?;

        let patch = validation::validate_update(input)?;
        let updated = tx.update(id, patch).await?;
        tx.commit().await?;

        log::info!("updated station {}", id);
        Ok(updated)
    }

    /// Marks a station as inactive and deleted. It stays stored but is no
    /// longer visible.
    pub async fn soft_delete(&self, id: &Id<Station>) -> StationResult<()> {
        let mut tx = self.database.transaction().await?;
        tx.get(id).await?;
        tx.soft_delete(id).await?;
        tx.commit().await?;

        log::info!("soft deleted station {}", id);
        Ok(())
    }
}
