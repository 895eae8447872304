//! Sample stations loaded when provisioning a fresh store.

use model::station::{NewStation, StationStatus, StationType};
use utility::id::Id;

use crate::database::{Database, DatabaseTransaction, Result, StationRepo};

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SeedReport {
    pub inserted: usize,
    pub skipped: usize,
}

pub fn sample_stations() -> Vec<NewStation> {
    vec![
        NewStation {
            name: "Estación Central".to_owned(),
            location: "Av. Siempre Viva 742".to_owned(),
            station_type: StationType::Origin,
            status: StationStatus::Active,
        },
        NewStation {
            name: "Estación Norte".to_owned(),
            location: "Calle Los Olivos 1200".to_owned(),
            station_type: StationType::Intermediate,
            status: StationStatus::Active,
        },
        NewStation {
            name: "Estación Sur".to_owned(),
            location: "Av. Las Industrias 450".to_owned(),
            station_type: StationType::Destination,
            status: StationStatus::Inactive,
        },
    ]
}

/// Inserts the sample stations in one transaction. Stations which already
/// exist (same name and location) are skipped, so seeding twice is harmless.
pub async fn seed<D: Database>(database: &D) -> Result<SeedReport> {
    let mut tx = database.transaction().await?;
    let mut report = SeedReport::default();

    for station in sample_stations() {
        let name = station.name.clone();
        if tx.insert_if_absent(Id::generate(), station).await? {
            log::info!("seeded station {}", name);
            report.inserted += 1;
        } else {
            log::debug!("station {} already exists, skipping", name);
            report.skipped += 1;
        }
    }

    tx.commit().await?;
    Ok(report)
}
