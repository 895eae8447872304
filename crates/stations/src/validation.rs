//! Field rules for station payloads.
//!
//! Raw payloads are turned into validated values here, so the rest of the
//! service only ever sees closed enumerations and well-formed strings.

use model::station::{
    CreateStation, NewStation, StationPatch, StationStatus, StationType, UpdateStation,
};
use serde_json::Value;

use crate::{StationError, StationResult};

pub const MIN_NAME_LENGTH: usize = 3;
pub const MIN_LOCATION_LENGTH: usize = 5;

const MISSING_FIELDS: &str = "missing required fields: name, location and type are required";
const INVALID_TYPE: &str = "invalid type: must be 'origen', 'destino' or 'intermedia'";
const INVALID_STATUS: &str = "invalid status: must be 'activa' or 'inactiva'";
const INVALID_LOCATION: &str = "invalid location: must have at least 5 characters and only contain letters, digits, spaces, commas, periods and hyphens";
const INVALID_NAME: &str =
    "invalid name: must have at least 3 characters and only contain letters and spaces";
const NOTHING_TO_UPDATE: &str =
    "nothing to update: provide at least one of name, location, type or status";

pub fn validate_create(input: CreateStation) -> StationResult<NewStation> {
    let (Some(name), Some(location), Some(station_type)) = (
        non_empty(input.name),
        non_empty(input.location),
        non_empty(input.station_type),
    ) else {
        return Err(StationError::validation(MISSING_FIELDS));
    };

    let station_type = parse_type(&station_type)?;
    check_location(&location)?;
    check_name(&name)?;

    Ok(NewStation {
        name,
        location,
        station_type,
        status: StationStatus::Active,
    })
}

/// Validates the present fields of a partial update. At least one field has to
/// be present, and present fields have to be strings.
pub fn validate_update(input: UpdateStation) -> StationResult<StationPatch> {
    let patch = StationPatch {
        station_type: text(input.station_type, INVALID_TYPE)?
            .as_deref()
            .map(parse_type)
            .transpose()?,
        location: text(input.location, INVALID_LOCATION)?
            .map(|location| check_location(&location).map(|_| location))
            .transpose()?,
        name: text(input.name, INVALID_NAME)?
            .map(|name| check_name(&name).map(|_| name))
            .transpose()?,
        status: text(input.status, INVALID_STATUS)?
            .as_deref()
            .map(parse_status)
            .transpose()?,
    };

    if patch.is_empty() {
        return Err(StationError::validation(NOTHING_TO_UPDATE));
    }
    Ok(patch)
}

pub fn parse_type(value: &str) -> StationResult<StationType> {
    value
        .parse()
        .map_err(|_| StationError::validation(INVALID_TYPE))
}

pub fn parse_status(value: &str) -> StationResult<StationStatus> {
    value
        .parse()
        .map_err(|_| StationError::validation(INVALID_STATUS))
}

pub fn check_location(location: &str) -> StationResult<()> {
    if location.trim().chars().count() < MIN_LOCATION_LENGTH
        || !location.chars().all(is_location_char)
    {
        return Err(StationError::validation(INVALID_LOCATION));
    }
    Ok(())
}

pub fn check_name(name: &str) -> StationResult<()> {
    if name.trim().chars().count() < MIN_NAME_LENGTH || !name.chars().all(is_name_char) {
        return Err(StationError::validation(INVALID_NAME));
    }
    Ok(())
}

/// A present field must be a json string; anything else fails with `message`.
fn text(value: Option<Value>, message: &str) -> StationResult<Option<String>> {
    match value {
        None | Some(Value::Null) => Ok(None),
        Some(Value::String(value)) => Ok(Some(value)),
        Some(_) => Err(StationError::validation(message)),
    }
}

fn non_empty(value: Option<String>) -> Option<String> {
    value.filter(|value| !value.is_empty())
}

fn is_location_char(c: char) -> bool {
    c.is_ascii_alphanumeric() || c.is_whitespace() || matches!(c, '.' | ',' | '-')
}

// ascii letters plus the latin-1 letters (À..ÿ without × and ÷)
fn is_name_char(c: char) -> bool {
    c.is_ascii_alphabetic()
        || c.is_whitespace()
        || (('\u{C0}'..='\u{FF}').contains(&c) && c != '×' && c != '÷')
}
