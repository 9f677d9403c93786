use crate::normalize::PageShape;
use crate::tables::RaceRef;
use core::fmt::{Display, Formatter};
use strum::{Display as StrumDisplay, EnumIter};

/// The API resources the sync engine reads.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, StrumDisplay, EnumIter)]
#[strum(serialize_all = "lowercase")]
pub enum Endpoint {
    Races,
    Drivers,
    Constructors,
    Circuits,
    DriverStandings,
    ConstructorStandings,
}

impl Endpoint {
    /// The last path segment of the resource, such as `driverstandings.json`.
    #[must_use]
    pub fn file(self) -> String {
        format!("{self}.json")
    }

    /// The structure of the resource's response pages.
    #[must_use]
    pub const fn shape(self) -> &'static PageShape {
        match self {
            Self::Races => &PageShape::RACES,
            Self::Drivers => &PageShape::DRIVERS,
            Self::Constructors => &PageShape::CONSTRUCTORS,
            Self::Circuits => &PageShape::CIRCUITS,
            Self::DriverStandings => &PageShape::DRIVER_STANDINGS,
            Self::ConstructorStandings => &PageShape::CONSTRUCTOR_STANDINGS,
        }
    }
}

/// Restricts a request to a season, or to one race of a season.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Scope {
    season: i32,
    round: Option<u32>,
}

impl Scope {
    #[must_use]
    pub const fn season(season: i32) -> Self {
        Self { season, round: None }
    }

    #[must_use]
    pub const fn race(race: RaceRef) -> Self {
        Self {
            season: race.season,
            round: Some(race.round),
        }
    }

    #[must_use]
    pub const fn season_number(&self) -> i32 {
        self.season
    }

    #[must_use]
    pub const fn round_number(&self) -> Option<u32> {
        self.round
    }
}

impl Display for Scope {
    fn fmt(&self, f: &mut Formatter<'_>) -> core::fmt::Result {
        match self.round {
            Some(round) => write!(f, "season {}, round {round}", self.season),
            None => write!(f, "season {}", self.season),
        }
    }
}

/// A request for one page of an endpoint.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PageRequest {
    pub endpoint: Endpoint,
    pub scope: Scope,
    pub limit: usize,
    pub offset: usize,
}

impl PageRequest {
    #[must_use]
    pub const fn new(endpoint: Endpoint, scope: Scope, limit: usize) -> Self {
        Self {
            endpoint,
            scope,
            limit,
            offset: 0,
        }
    }

    /// The same request starting at `offset`.
    #[must_use]
    pub fn at(&self, offset: usize) -> Self {
        Self { offset, ..self.clone() }
    }

    /// The request path relative to the API root, without query parameters.
    #[must_use]
    pub fn path(&self) -> String {
        let mut path = format!("/{}/", self.scope.season);
        if let Some(round) = self.scope.round {
            path.push_str(&format!("{round}/"));
        }

        path.push_str(&self.endpoint.file());
        path
    }
}
