use super::record::define_records;
use super::{Record, TableId};
use core::fmt::{Display, Formatter};
use serde::Deserialize;

/// Identifies a race by season and round.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Deserialize)]
pub struct RaceRef {
    #[serde(deserialize_with = "super::integer")]
    pub season: i32,
    #[serde(deserialize_with = "super::integer")]
    pub round: u32,
}

impl RaceRef {
    #[must_use]
    pub const fn new(season: i32, round: u32) -> Self {
        Self { season, round }
    }
}

impl Display for RaceRef {
    fn fmt(&self, f: &mut Formatter<'_>) -> core::fmt::Result {
        write!(f, "{} round {}", self.season, self.round)
    }
}

define_records! {
    /// A circuit, with its location flattened into columns.
    Circuit in Circuits keyed by (circuit_id: String) {
        circuit_id: String => "circuitId",
        #[serde(default)]
        url: String => "url",
        circuit_name: String => "circuitName",
        #[serde(deserialize_with = "super::float")]
        location_lat: f64 => "locationLat",
        #[serde(deserialize_with = "super::float")]
        location_long: f64 => "locationLong",
        #[serde(default)]
        location_locality: String => "locationLocality",
        #[serde(default)]
        location_country: String => "locationCountry",
    }

    Constructor in Constructors keyed by (constructor_id: String) {
        constructor_id: String => "constructorId",
        #[serde(default)]
        url: String => "url",
        name: String => "name",
        #[serde(default)]
        nationality: String => "nationality",
    }

    /// A driver. The three-letter code and the date of birth are unknown for many early drivers.
    Driver in Drivers keyed by (driver_id: String) {
        driver_id: String => "driverId",
        #[serde(default)]
        url: String => "url",
        given_name: String => "givenName",
        family_name: String => "familyName",
        #[serde(default)]
        date_of_birth: Option<String> => "dateOfBirth",
        #[serde(default)]
        nationality: String => "nationality",
        #[serde(default)]
        code: Option<String> => "code",
    }

    Race in Races keyed by (season: i32, round: u32) {
        #[serde(deserialize_with = "super::integer")]
        season: i32 => "season",
        #[serde(deserialize_with = "super::integer")]
        round: u32 => "round",
        #[serde(default)]
        url: String => "url",
        race_name: String => "raceName",
        circuit_id: String => "circuitId",
        date: String => "date",
    }

    /// A driver's championship standing after a race.
    ///
    /// The constructor is the first one listed for the driver in that standings list, if any.
    DriverStanding in DriversStandings keyed by (season: i32, round: u32, driver_id: String) {
        #[serde(deserialize_with = "super::integer")]
        season: i32 => "season",
        #[serde(deserialize_with = "super::integer")]
        round: u32 => "round",
        #[serde(default, deserialize_with = "super::optional_integer")]
        position: Option<u32> => "position",
        #[serde(deserialize_with = "super::float")]
        points: f64 => "points",
        #[serde(deserialize_with = "super::integer")]
        wins: u32 => "wins",
        driver_id: String => "driverId",
        #[serde(default)]
        constructor_id: Option<String> => "constructorId",
    }

    /// A constructor's championship standing after a race.
    ConstructorStanding in ConstructorsStandings keyed by (season: i32, round: u32, constructor_id: String) {
        #[serde(deserialize_with = "super::integer")]
        season: i32 => "season",
        #[serde(deserialize_with = "super::integer")]
        round: u32 => "round",
        #[serde(default, deserialize_with = "super::optional_integer")]
        position: Option<u32> => "position",
        #[serde(deserialize_with = "super::float")]
        points: f64 => "points",
        #[serde(deserialize_with = "super::integer")]
        wins: u32 => "wins",
        constructor_id: String => "constructorId",
    }
}

impl Race {
    #[must_use]
    pub const fn race(&self) -> RaceRef {
        RaceRef::new(self.season, self.round)
    }
}

/// A row of one of the standings tables.
pub trait Standing: Record {
    /// The race after which the standing was recorded.
    fn race(&self) -> RaceRef;

    /// The driver or constructor the standing belongs to.
    fn entity_id(&self) -> &str;

    /// The entity table referenced by [`Standing::entity_id`].
    const ENTITY_TABLE: TableId;
}

impl Standing for DriverStanding {
    const ENTITY_TABLE: TableId = TableId::Drivers;

    fn race(&self) -> RaceRef {
        RaceRef::new(self.season, self.round)
    }

    fn entity_id(&self) -> &str {
        &self.driver_id
    }
}

impl Standing for ConstructorStanding {
    const ENTITY_TABLE: TableId = TableId::Constructors;

    fn race(&self) -> RaceRef {
        RaceRef::new(self.season, self.round)
    }

    fn entity_id(&self) -> &str {
        &self.constructor_id
    }
}
