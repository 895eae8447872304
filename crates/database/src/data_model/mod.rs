use std::fmt::Debug;

use model::WithId;
use serde::Serialize;
use stations::database::Result;
use utility::id::{HasId, Id};

pub mod station;

pub trait DatabaseRow {
    type Model: HasId;

    fn get_id(&self) -> Id<Self::Model>;

    /// Converts the raw row into its model. Fails if a column holds a value
    /// the model can not represent.
    fn to_model(self) -> Result<Self::Model>;
}

pub fn with_ids<R: DatabaseRow>(rows: Vec<R>) -> Result<Vec<WithId<R::Model>>>
where
    <R::Model as HasId>::IdType: Debug + Clone + Serialize,
{
    rows.into_iter().map(|row| with_id(row)).collect()
}

pub fn with_id<R: DatabaseRow>(row: R) -> Result<WithId<R::Model>>
where
    <R::Model as HasId>::IdType: Debug + Clone + Serialize,
{
    let id = row.get_id();
    row.to_model().map(|model| WithId::new(id, model))
}
