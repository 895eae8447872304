//! In-process record store.
//!
//! Behaves like the postgres store as far as the service can observe: soft
//! deleted rows stay stored but are invisible, and (name, location) is unique
//! among live rows. A transaction reads and writes a private copy and keeps a
//! journal of its writes. On commit the journal is replayed onto the current
//! shared rows, so writes committed in the meantime are kept, and a replay that
//! breaks uniqueness or hits a vanished row fails the commit as a whole.

use std::sync::Arc;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use model::{
    station::{NewStation, Station, StationPatch, StationStatus},
    WithId,
};
use tokio::sync::Mutex;
use utility::id::Id;

use crate::database::{
    Database, DatabaseAutocommit, DatabaseError, DatabaseTransaction, Result, StationRepo,
};

#[derive(Debug, Clone)]
struct StoredStation {
    id: Id<Station>,
    station: Station,
    deleted_at: Option<DateTime<Utc>>,
}

impl StoredStation {
    fn is_live(&self) -> bool {
        self.deleted_at.is_none()
    }

    fn to_model(&self) -> WithId<Station> {
        WithId::new(self.id.clone(), self.station.clone())
    }
}

/// A single write, timestamped when it was first issued so that replaying it
/// yields the same row.
#[derive(Debug, Clone)]
enum Write {
    Insert {
        id: Id<Station>,
        station: NewStation,
        if_absent: bool,
        at: DateTime<Utc>,
    },
    Update {
        id: Id<Station>,
        patch: StationPatch,
        at: DateTime<Utc>,
    },
    SoftDelete {
        id: Id<Station>,
        at: DateTime<Utc>,
    },
}

impl Write {
    fn insert(id: Id<Station>, station: NewStation, if_absent: bool) -> Self {
        Write::Insert {
            id,
            station,
            if_absent,
            at: Utc::now(),
        }
    }

    fn update(id: &Id<Station>, patch: StationPatch) -> Self {
        Write::Update {
            id: id.clone(),
            patch,
            at: Utc::now(),
        }
    }

    fn soft_delete(id: &Id<Station>) -> Self {
        Write::SoftDelete {
            id: id.clone(),
            at: Utc::now(),
        }
    }

    fn skips_duplicates(&self) -> bool {
        matches!(self, Write::Insert { if_absent: true, .. })
    }
}

#[derive(Debug, Clone, Default)]
struct Rows(Vec<StoredStation>);

impl Rows {
    fn live_mut(&mut self, id: &Id<Station>) -> Result<&mut StoredStation> {
        self.0
            .iter_mut()
            .find(|row| row.is_live() && &row.id == id)
            .ok_or(DatabaseError::NotFound)
    }

    fn clashes(&self, except: Option<&Id<Station>>, name: &str, location: &str) -> bool {
        self.0.iter().any(|row| {
            row.is_live()
                && Some(&row.id) != except
                && row.station.name == name
                && row.station.location == location
        })
    }

    fn get(&self, id: &Id<Station>) -> Result<WithId<Station>> {
        self.0
            .iter()
            .find(|row| row.is_live() && &row.id == id)
            .map(StoredStation::to_model)
            .ok_or(DatabaseError::NotFound)
    }

    fn get_all(&self) -> Vec<WithId<Station>> {
        let mut live = self
            .0
            .iter()
            .filter(|row| row.is_live())
            .map(StoredStation::to_model)
            .collect::<Vec<_>>();
        live.sort_by_key(|station| station.content.created_at);
        live
    }

    fn apply(&mut self, write: Write) -> Result<WithId<Station>> {
        match write {
            Write::Insert {
                id, station, at, ..
            } => self.insert(id, station, at),
            Write::Update { id, patch, at } => self.update(&id, patch, at),
            Write::SoftDelete { id, at } => self.soft_delete(&id, at),
        }
    }

    fn insert(
        &mut self,
        id: Id<Station>,
        new: NewStation,
        now: DateTime<Utc>,
    ) -> Result<WithId<Station>> {
        if self.clashes(None, &new.name, &new.location) || self.0.iter().any(|row| row.id == id)
        {
            return Err(DatabaseError::Duplicate);
        }
        let row = StoredStation {
            id,
            station: Station {
                name: new.name,
                location: new.location,
                station_type: new.station_type,
                status: new.status,
                created_at: now,
                updated_at: now,
            },
            deleted_at: None,
        };
        let model = row.to_model();
        self.0.push(row);
        Ok(model)
    }

    fn update(
        &mut self,
        id: &Id<Station>,
        patch: StationPatch,
        now: DateTime<Utc>,
    ) -> Result<WithId<Station>> {
        let mut station = self.get(id)?.content;
        patch.apply(&mut station);
        if self.clashes(Some(id), &station.name, &station.location) {
            return Err(DatabaseError::Duplicate);
        }
        station.updated_at = now;

        let row = self.live_mut(id)?;
        row.station = station;
        Ok(row.to_model())
    }

    fn soft_delete(&mut self, id: &Id<Station>, now: DateTime<Utc>) -> Result<WithId<Station>> {
        let row = self.live_mut(id)?;
        row.station.status = StationStatus::Inactive;
        row.station.updated_at = now;
        row.deleted_at = Some(now);
        Ok(row.to_model())
    }
}

#[derive(Debug, Clone, Default)]
pub struct MemoryDatabase {
    rows: Arc<Mutex<Rows>>,
}

impl MemoryDatabase {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of stored rows, soft deleted ones included.
    pub async fn stored_rows(&self) -> usize {
        self.rows.lock().await.0.len()
    }
}

pub struct MemoryAutocommit {
    rows: Arc<Mutex<Rows>>,
}

impl MemoryAutocommit {
    async fn write(&self, write: Write) -> Result<WithId<Station>> {
        self.rows.lock().await.apply(write)
    }
}

impl DatabaseAutocommit for MemoryAutocommit {}

pub struct MemoryTransaction {
    shared: Arc<Mutex<Rows>>,
    working: Rows,
    journal: Vec<Write>,
}

impl MemoryTransaction {
    fn write(&mut self, write: Write) -> Result<WithId<Station>> {
        let written = self.working.apply(write.clone())?;
        self.journal.push(write);
        Ok(written)
    }
}

#[async_trait]
impl DatabaseTransaction for MemoryTransaction {
    async fn commit(self) -> Result<()> {
        let mut shared = self.shared.lock().await;
        let mut next = shared.clone();
        for write in self.journal {
            let skips_duplicates = write.skips_duplicates();
            match next.apply(write) {
                Ok(_) => {}
                Err(DatabaseError::Duplicate) if skips_duplicates => {}
                Err(why) => return Err(why),
            }
        }
        *shared = next;
        Ok(())
    }
}

#[async_trait]
impl Database for MemoryDatabase {
    type Transaction = MemoryTransaction;
    type Autocommit = MemoryAutocommit;

    async fn transaction(&self) -> Result<Self::Transaction> {
        let working = self.rows.lock().await.clone();
        Ok(MemoryTransaction {
            shared: self.rows.clone(),
            working,
            journal: Vec::new(),
        })
    }

    fn auto(&self) -> Self::Autocommit {
        MemoryAutocommit {
            rows: self.rows.clone(),
        }
    }
}

fn written(result: Result<WithId<Station>>) -> Result<bool> {
    match result {
        Ok(_) => Ok(true),
        Err(DatabaseError::Duplicate) => Ok(false),
        Err(why) => Err(why),
    }
}

#[async_trait]
impl StationRepo for MemoryAutocommit {
    async fn get(&mut self, id: &Id<Station>) -> Result<WithId<Station>> {
        self.rows.lock().await.get(id)
    }

    async fn get_all(&mut self) -> Result<Vec<WithId<Station>>> {
        Ok(self.rows.lock().await.get_all())
    }

    async fn insert(&mut self, id: Id<Station>, station: NewStation) -> Result<WithId<Station>> {
        self.write(Write::insert(id, station, false)).await
    }

    async fn insert_if_absent(&mut self, id: Id<Station>, station: NewStation) -> Result<bool> {
        written(self.write(Write::insert(id, station, true)).await)
    }

    async fn update(
        &mut self,
        id: &Id<Station>,
        patch: StationPatch,
    ) -> Result<WithId<Station>> {
        self.write(Write::update(id, patch)).await
    }

    async fn soft_delete(&mut self, id: &Id<Station>) -> Result<()> {
        self.write(Write::soft_delete(id)).await.map(|_| ())
    }
}

#[async_trait]
impl StationRepo for MemoryTransaction {
    async fn get(&mut self, id: &Id<Station>) -> Result<WithId<Station>> {
        self.working.get(id)
    }

    async fn get_all(&mut self) -> Result<Vec<WithId<Station>>> {
        Ok(self.working.get_all())
    }

    async fn insert(&mut self, id: Id<Station>, station: NewStation) -> Result<WithId<Station>> {
        self.write(Write::insert(id, station, false))
    }

    async fn insert_if_absent(&mut self, id: Id<Station>, station: NewStation) -> Result<bool> {
        written(self.write(Write::insert(id, station, true)))
    }

    async fn update(
        &mut self,
        id: &Id<Station>,
        patch: StationPatch,
    ) -> Result<WithId<Station>> {
        self.write(Write::update(id, patch))
    }

    async fn soft_delete(&mut self, id: &Id<Station>) -> Result<()> {
        self.write(Write::soft_delete(id)).map(|_| ())
    }
}
