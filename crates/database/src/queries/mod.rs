use stations::database::DatabaseError;

pub mod station;

pub(crate) fn convert_error(why: sqlx::Error) -> DatabaseError {
    match why {
        sqlx::Error::RowNotFound => DatabaseError::NotFound,
        sqlx::Error::Database(ref error) if error.is_unique_violation() => {
            DatabaseError::Duplicate
        }
        _ => DatabaseError::Other(Box::new(why)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_row_is_not_found() {
        assert!(matches!(
            convert_error(sqlx::Error::RowNotFound),
            DatabaseError::NotFound
        ));
    }

    #[test]
    fn other_errors_are_wrapped() {
        assert!(matches!(
            convert_error(sqlx::Error::PoolTimedOut),
            DatabaseError::Other(_)
        ));
    }
}
