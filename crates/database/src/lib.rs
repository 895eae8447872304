use std::{env, error::Error};

use async_trait::async_trait;
use model::{
    station::{NewStation, Station, StationPatch},
    WithId,
};
use queries::convert_error;
use sqlx::{postgres::PgPoolOptions, Transaction};
use stations::database::{
    Database, DatabaseAutocommit, DatabaseTransaction, Result, StationRepo,
};
use utility::id::Id;

pub mod data_model;
pub mod queries;

pub const DEFAULT_MAX_CONNECTIONS: u32 = 5;

#[derive(Debug, Clone)]
pub struct DatabaseConnectionInfo {
    url: String,
    pub max_connections: u32,
}

impl DatabaseConnectionInfo {
    pub fn new(url: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            max_connections: DEFAULT_MAX_CONNECTIONS,
        }
    }

    /// Reads `DATABASE_URL`, falling back to `DATABASE_USER`,
    /// `DATABASE_PASSWORD`, `DATABASE_HOST`, `DATABASE_PORT` and `DATABASE_NAME`.
    pub fn from_env() -> Option<Self> {
        let url = env::var("DATABASE_URL")
            .ok()
            .or_else(Self::url_from_env_parts)?;
        let max_connections = env::var("DATABASE_MAX_CONNECTIONS")
            .ok()
            .and_then(|value| value.parse().ok())
            .unwrap_or(DEFAULT_MAX_CONNECTIONS);
        Some(Self {
            url,
            max_connections,
        })
    }

    fn url_from_env_parts() -> Option<String> {
        let username = env::var("DATABASE_USER").ok()?;
        let password = env::var("DATABASE_PASSWORD").ok()?;
        let hostname = env::var("DATABASE_HOST").ok()?;
        let port: u16 = env::var("DATABASE_PORT").ok()?.parse().ok()?;
        let database = env::var("DATABASE_NAME").ok()?;
        Some(postgres_url(&username, &password, &hostname, port, &database))
    }
}

pub(crate) fn postgres_url(
    username: &str,
    password: &str,
    hostname: &str,
    port: u16,
    database: &str,
) -> String {
    format!(
        "postgres://{}:{}@{}:{}/{}",
        username, password, hostname, port, database
    )
}

#[derive(Debug, Clone)]
pub struct PgDatabase {
    connection: sqlx::PgPool,
}

pub struct PgDatabaseTransaction<'a> {
    tx: Transaction<'a, sqlx::Postgres>,
}

#[async_trait]
impl<'a> DatabaseTransaction for PgDatabaseTransaction<'a> {
    async fn commit(self) -> Result<()> {
        self.tx.commit().await.map_err(convert_error)
    }
}

pub struct PgDatabaseAutocommit {
    pool: sqlx::PgPool,
}

impl DatabaseAutocommit for PgDatabaseAutocommit {}

impl PgDatabase {
    /// Wraps a pool whose schema is already migrated.
    pub fn from_pool(pool: sqlx::PgPool) -> Self {
        Self { connection: pool }
    }

    /// Connects the pool and brings the schema up to date.
    pub async fn connect(
        database_connection_info: DatabaseConnectionInfo,
    ) -> std::result::Result<Self, Box<dyn Error>> {
        let pool = PgPoolOptions::new()
            .max_connections(database_connection_info.max_connections)
            .connect(&database_connection_info.url)
            .await?;

        sqlx::migrate!("./migrations").run(&pool).await?;
        log::info!(
            "connected to database (max {} connections)",
            database_connection_info.max_connections
        );

        Ok(Self::from_pool(pool))
    }
}

#[async_trait]
impl Database for PgDatabase {
    type Transaction = PgDatabaseTransaction<'static>;
    type Autocommit = PgDatabaseAutocommit;

    fn auto(&self) -> Self::Autocommit {
        PgDatabaseAutocommit {
            pool: self.connection.clone(),
        }
    }

    async fn transaction(&self) -> Result<Self::Transaction> {
        let tx: Transaction<'_, sqlx::Postgres> =
            self.connection.begin().await.map_err(convert_error)?;

        Ok(PgDatabaseTransaction { tx })
    }
}

#[async_trait]
impl StationRepo for PgDatabaseAutocommit {
    async fn get(&mut self, id: &Id<Station>) -> Result<WithId<Station>> {
        queries::station::get(&self.pool, id).await
    }

    async fn get_all(&mut self) -> Result<Vec<WithId<Station>>> {
        queries::station::get_all(&self.pool).await
    }

    async fn insert(&mut self, id: Id<Station>, station: NewStation) -> Result<WithId<Station>> {
        queries::station::insert(&self.pool, id, station).await
    }

    async fn insert_if_absent(&mut self, id: Id<Station>, station: NewStation) -> Result<bool> {
        queries::station::insert_if_absent(&self.pool, id, station).await
    }

    async fn update(
        &mut self,
        id: &Id<Station>,
        patch: StationPatch,
    ) -> Result<WithId<Station>> {
        queries::station::update(&self.pool, id, patch).await
    }

    async fn soft_delete(&mut self, id: &Id<Station>) -> Result<()> {
        queries::station::soft_delete(&self.pool, id).await
    }
}

#[async_trait]
impl<'a> StationRepo for PgDatabaseTransaction<'a> {
    async fn get(&mut self, id: &Id<Station>) -> Result<WithId<Station>> {
        queries::station::get(&mut *self.tx, id).await
    }

    async fn get_all(&mut self) -> Result<Vec<WithId<Station>>> {
        queries::station::get_all(&mut *self.tx).await
    }

    async fn insert(&mut self, id: Id<Station>, station: NewStation) -> Result<WithId<Station>> {
        queries::station::insert(&mut *self.tx, id, station).await
    }

    async fn insert_if_absent(&mut self, id: Id<Station>, station: NewStation) -> Result<bool> {
        queries::station::insert_if_absent(&mut *self.tx, id, station).await
    }

    async fn update(
        &mut self,
        id: &Id<Station>,
        patch: StationPatch,
    ) -> Result<WithId<Station>> {
        queries::station::update(&mut *self.tx, id, patch).await
    }

    async fn soft_delete(&mut self, id: &Id<Station>) -> Result<()> {
        queries::station::soft_delete(&mut *self.tx, id).await
    }
}
