use std::{fmt, str::FromStr};

use chrono::{DateTime, TimeZone, Utc};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use utility::id::HasId;

use crate::{ExampleData, WithId};

/// Role of a station along a route.
///
/// Serialized using the canonical (spanish) vocabulary of the stored data.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, JsonSchema)]
pub enum StationType {
    #[serde(rename = "origen")]
    Origin,
    #[serde(rename = "destino")]
    Destination,
    #[serde(rename = "intermedia")]
    Intermediate,
}

impl StationType {
    pub const ALL: [StationType; 3] = [
        StationType::Origin,
        StationType::Destination,
        StationType::Intermediate,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            StationType::Origin => "origen",
            StationType::Destination => "destino",
            StationType::Intermediate => "intermedia",
        }
    }

    fn english(&self) -> &'static str {
        match self {
            StationType::Origin => "origin",
            StationType::Destination => "destination",
            StationType::Intermediate => "intermediate",
        }
    }
}

impl FromStr for StationType {
    type Err = UnknownVariant;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let lower = s.to_lowercase();
        Self::ALL
            .into_iter()
            .find(|variant| variant.as_str() == lower || variant.english() == lower)
            .ok_or_else(|| UnknownVariant(s.to_owned()))
    }
}

impl fmt::Display for StationType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Lifecycle status of a station.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, JsonSchema)]
pub enum StationStatus {
    #[serde(rename = "activa")]
    Active,
    #[serde(rename = "inactiva")]
    Inactive,
}

impl StationStatus {
    pub const ALL: [StationStatus; 2] = [StationStatus::Active, StationStatus::Inactive];

    pub fn as_str(&self) -> &'static str {
        match self {
            StationStatus::Active => "activa",
            StationStatus::Inactive => "inactiva",
        }
    }

    fn english(&self) -> &'static str {
        match self {
            StationStatus::Active => "active",
            StationStatus::Inactive => "inactive",
        }
    }
}

impl Default for StationStatus {
    fn default() -> Self {
        StationStatus::Active
    }
}

impl FromStr for StationStatus {
    type Err = UnknownVariant;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let lower = s.to_lowercase();
        Self::ALL
            .into_iter()
            .find(|variant| variant.as_str() == lower || variant.english() == lower)
            .ok_or_else(|| UnknownVariant(s.to_owned()))
    }
}

impl fmt::Display for StationStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Returned when a string names none of the variants of an enumeration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UnknownVariant(pub String);

impl fmt::Display for UnknownVariant {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "unknown value '{}'", self.0)
    }
}

impl std::error::Error for UnknownVariant {}

/// A live station record.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct Station {
    pub name: String,
    pub location: String,
    #[serde(rename = "type")]
    pub station_type: StationType,
    pub status: StationStatus,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl HasId for Station {
    type IdType = String;
}

impl ExampleData for Station {
    fn example_data() -> Self {
        let timestamp = Utc
            .with_ymd_and_hms(2024, 10, 1, 8, 30, 0)
            .single()
            .unwrap_or_default();
        Self {
            name: "Estación Central".to_owned(),
            location: "Av. Siempre Viva 742".to_owned(),
            station_type: StationType::Origin,
            status: StationStatus::Active,
            created_at: timestamp,
            updated_at: timestamp,
        }
    }
}

/// Single station as returned by a lookup by id.
///
/// `status` is only present for active stations; inactive ones leave it out.
#[serde_with::skip_serializing_none]
#[derive(Debug, Clone, PartialEq, Serialize, JsonSchema)]
pub struct StationDetails {
    pub id: String,
    pub name: String,
    pub location: String,
    #[serde(rename = "type")]
    pub station_type: StationType,
    pub status: Option<StationStatus>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<WithId<Station>> for StationDetails {
    fn from(station: WithId<Station>) -> Self {
        let status = match station.content.status {
            StationStatus::Active => Some(StationStatus::Active),
            StationStatus::Inactive => None,
        };
        Self {
            id: station.id.raw(),
            name: station.content.name,
            location: station.content.location,
            station_type: station.content.station_type,
            status,
            created_at: station.content.created_at,
            updated_at: station.content.updated_at,
        }
    }
}

/// Raw creation payload. Every field may be missing, which is reported by
/// validation rather than by deserialization.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize, JsonSchema)]
pub struct CreateStation {
    #[serde(alias = "nombre")]
    pub name: Option<String>,
    #[serde(alias = "ubicacion")]
    pub location: Option<String>,
    #[serde(rename = "type", alias = "tipo")]
    pub station_type: Option<String>,
}

/// Raw partial update payload. Absent (or `null`) fields are left untouched,
/// present ones are validated like on creation.
///
/// Values are kept as raw json so that a wrongly typed field is reported by
/// validation, which only runs once the station is known to exist.
#[derive(Debug, Clone, Default, PartialEq, Deserialize, JsonSchema)]
pub struct UpdateStation {
    #[serde(alias = "nombre")]
    pub name: Option<Value>,
    #[serde(alias = "ubicacion")]
    pub location: Option<Value>,
    #[serde(rename = "type", alias = "tipo")]
    pub station_type: Option<Value>,
    #[serde(alias = "estado")]
    pub status: Option<Value>,
}

/// A validated station about to be inserted.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewStation {
    pub name: String,
    pub location: String,
    pub station_type: StationType,
    pub status: StationStatus,
}

/// A validated set of changes. `None` means "keep the stored value".
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct StationPatch {
    pub name: Option<String>,
    pub location: Option<String>,
    pub station_type: Option<StationType>,
    pub status: Option<StationStatus>,
}

impl StationPatch {
    pub fn is_empty(&self) -> bool {
        self.name.is_none()
            && self.location.is_none()
            && self.station_type.is_none()
            && self.status.is_none()
    }

    /// Applies the patch onto an existing station.
    pub fn apply(self, station: &mut Station) {
        if let Some(name) = self.name {
            station.name = name;
        }
        if let Some(location) = self.location {
            station.location = location;
        }
        if let Some(station_type) = self.station_type {
            station.station_type = station_type;
        }
        if let Some(status) = self.status {
            station.status = status;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use utility::id::Id;

    #[test]
    fn parses_types_case_insensitively() {
        assert_eq!("Origen".parse(), Ok(StationType::Origin));
        assert_eq!("DESTINO".parse(), Ok(StationType::Destination));
        assert_eq!("intermediate".parse(), Ok(StationType::Intermediate));
        assert!("unknown".parse::<StationType>().is_err());
    }

    #[test]
    fn parses_status_case_insensitively() {
        assert_eq!("Activa".parse(), Ok(StationStatus::Active));
        assert_eq!("INACTIVE".parse(), Ok(StationStatus::Inactive));
        assert!("deleted".parse::<StationStatus>().is_err());
    }

    #[test]
    fn station_serializes_with_canonical_values() {
        let station = WithId::new(Id::new("s-1".to_owned()), Station::example_data());
        let json = serde_json::to_value(&station).unwrap();
        assert_eq!(json["id"], "s-1");
        assert_eq!(json["type"], "origen");
        assert_eq!(json["status"], "activa");
        assert!(json.get("created_at").is_some());
        assert!(json.get("updated_at").is_some());
    }

    #[test]
    fn details_omit_status_of_inactive_station() {
        let mut station = Station::example_data();
        station.status = StationStatus::Inactive;
        let details = StationDetails::from(WithId::new(Id::new("s-1".to_owned()), station));
        let json = serde_json::to_value(&details).unwrap();
        assert!(json.get("status").is_none());
        assert_eq!(json["name"], "Estación Central");
        assert!(json["created_at"].is_string());
    }

    #[test]
    fn details_keep_status_of_active_station() {
        let station = WithId::new(Id::new("s-1".to_owned()), Station::example_data());
        let json = serde_json::to_value(StationDetails::from(station)).unwrap();
        assert_eq!(json["status"], "activa");
    }

    #[test]
    fn create_payload_accepts_spanish_keys() {
        let payload: CreateStation = serde_json::from_str(
            r#"{"nombre": "Estación Norte", "ubicacion": "Calle Los Olivos 1200", "tipo": "intermedia"}"#,
        )
        .unwrap();
        assert_eq!(payload.name.as_deref(), Some("Estación Norte"));
        assert_eq!(payload.station_type.as_deref(), Some("intermedia"));
    }

    #[test]
    fn update_payload_distinguishes_missing_from_empty() {
        let payload: UpdateStation = serde_json::from_str(r#"{"name": ""}"#).unwrap();
        assert_eq!(payload.name, Some(Value::from("")));
        assert_eq!(payload.location, None);
    }

    #[test]
    fn update_payload_keeps_wrongly_typed_values() {
        let payload: UpdateStation =
            serde_json::from_str(r#"{"nombre": 42, "estado": null}"#).unwrap();
        assert_eq!(payload.name, Some(Value::from(42)));
        assert_eq!(payload.status, None);
    }

    #[test]
    fn patch_only_touches_present_fields() {
        let mut station = Station::example_data();
        StationPatch {
            status: Some(StationStatus::Inactive),
            ..Default::default()
        }
        .apply(&mut station);
        assert_eq!(station.status, StationStatus::Inactive);
        assert_eq!(station.name, "Estación Central");
    }
}
