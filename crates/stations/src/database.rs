use std::{error, result};

use async_trait::async_trait;
use model::{
    station::{NewStation, Station, StationPatch},
    WithId,
};
use thiserror::Error;
use utility::id::Id;

#[derive(Debug, Error)]
pub enum DatabaseError {
    /// No live record matched.
    #[error("record not found")]
    NotFound,
    /// The write would break the (name, location) uniqueness of live records.
    #[error("duplicate key")]
    Duplicate,
    #[error("{0}")]
    Other(#[source] Box<dyn error::Error + Send + Sync>),
}

impl DatabaseError {
    pub fn other<T: error::Error + Send + Sync + 'static>(why: T) -> Self {
        Self::Other(Box::new(why))
    }
}

pub type Result<T> = result::Result<T, DatabaseError>;

/// Access to station records. Soft-deleted records are invisible to every
/// operation of this trait.
#[async_trait]
pub trait StationRepo {
    async fn get(&mut self, id: &Id<Station>) -> Result<WithId<Station>>;

    /// Returns all live stations, oldest first.
    async fn get_all(&mut self) -> Result<Vec<WithId<Station>>>;

    /// Fails with `DatabaseError::Duplicate` if a live station with the same
    /// name and location exists.
    async fn insert(
        &mut self,
        id: Id<Station>,
        station: NewStation,
    ) -> Result<WithId<Station>>;

    /// Like `insert`, but a duplicate is skipped instead of reported.
    /// Returns whether a row was written.
    async fn insert_if_absent(
        &mut self,
        id: Id<Station>,
        station: NewStation,
    ) -> Result<bool>;

    /// Writes the fields present in `patch` and refreshes `updated_at`.
    async fn update(
        &mut self,
        id: &Id<Station>,
        patch: StationPatch,
    ) -> Result<WithId<Station>>;

    /// Marks the station inactive and deleted as of now.
    async fn soft_delete(&mut self, id: &Id<Station>) -> Result<()>;
}

#[async_trait]
pub trait DatabaseTransaction: StationRepo {
    async fn commit(self) -> Result<()>;
}

pub trait DatabaseAutocommit: StationRepo {}

/// trait to implement a station record store.
/// multiple concurrent accesses should be possible by e.g. cloning the database object.
#[async_trait]
pub trait Database: Clone + Send + Sync + Sized {
    type Transaction: DatabaseTransaction + Send;
    type Autocommit: DatabaseAutocommit + Send;

    async fn transaction(&self) -> Result<Self::Transaction>;

    fn auto(&self) -> Self::Autocommit;
}
