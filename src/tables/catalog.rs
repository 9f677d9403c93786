use crate::config::Config;
use strum::{Display, IntoStaticStr};

/// Identifies one of the persisted tables.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Display, IntoStaticStr)]
#[strum(serialize_all = "snake_case")]
pub enum TableId {
    Circuits,
    Constructors,
    Drivers,
    Races,
    DriversStandings,
    ConstructorsStandings,
}

impl TableId {
    pub const ALL: [Self; 6] = [
        Self::Circuits,
        Self::Constructors,
        Self::Drivers,
        Self::Races,
        Self::DriversStandings,
        Self::ConstructorsStandings,
    ];

    const fn index(self) -> usize {
        self as usize
    }
}

/// Per-table metadata.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TableDef {
    file_name: String,
    refetch_margin: usize,
}

impl TableDef {
    #[must_use]
    pub fn new(file_name: impl Into<String>, refetch_margin: usize) -> Self {
        Self {
            file_name: file_name.into(),
            refetch_margin,
        }
    }

    /// Name of the CSV file backing the table, relative to the data directory.
    #[must_use]
    pub fn file_name(&self) -> &str {
        &self.file_name
    }

    /// How far behind the newest stored row the table is re-fetched on every update.
    ///
    /// Counted in seasons for races and in races for the standings tables. Entity tables are only ever
    /// refreshed through the tables that embed them, so their margin is unused.
    #[must_use]
    pub const fn refetch_margin(&self) -> usize {
        self.refetch_margin
    }
}

/// The declared metadata of every table, keyed by [`TableId`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Catalog {
    defs: [TableDef; 6],
}

impl Catalog {
    #[must_use]
    pub fn new(races_margin: usize, standings_margin: usize) -> Self {
        let def = |id: TableId| {
            let margin = match id {
                TableId::Races => races_margin,
                TableId::DriversStandings | TableId::ConstructorsStandings => standings_margin,
                TableId::Circuits | TableId::Constructors | TableId::Drivers => 0,
            };
            TableDef::new(format!("{id}.csv"), margin)
        };

        Self {
            defs: TableId::ALL.map(def),
        }
    }

    #[must_use]
    pub fn from_config(config: &Config) -> Self {
        Self::new(config.races_margin, config.standings_margin)
    }

    #[must_use]
    pub const fn def(&self, id: TableId) -> &TableDef {
        &self.defs[id.index()]
    }
}

impl Default for Catalog {
    fn default() -> Self {
        Self::new(2, 2)
    }
}
