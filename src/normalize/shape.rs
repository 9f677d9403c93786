use crate::tables::TableId;

/// How a nested column of a record is normalized.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NestedKind {
    /// An object without identity whose fields become columns of the parent row.
    Inline,

    /// An object, or a list whose first element is taken, that belongs to an entity table.
    ///
    /// Only `id_column` stays in the parent row, as a foreign key.
    Entity { id_column: &'static str, table: TableId },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct NestedColumn {
    pub column: &'static str,
    pub kind: NestedKind,
}

/// The declared structure of an endpoint's response page.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageShape {
    /// Key of the table object inside `MRData`.
    pub table_key: &'static str,

    /// Key of the list between the table object and the records, if the endpoint has one.
    pub list_key: Option<&'static str>,

    /// Key of the record list.
    pub records_key: &'static str,

    pub nested: &'static [NestedColumn],
}

const CIRCUIT_ENTITY: NestedColumn = NestedColumn {
    column: "Circuit",
    kind: NestedKind::Entity {
        id_column: "circuitId",
        table: TableId::Circuits,
    },
};

const DRIVER_ENTITY: NestedColumn = NestedColumn {
    column: "Driver",
    kind: NestedKind::Entity {
        id_column: "driverId",
        table: TableId::Drivers,
    },
};

const CONSTRUCTORS_ENTITY: NestedColumn = NestedColumn {
    column: "Constructors",
    kind: NestedKind::Entity {
        id_column: "constructorId",
        table: TableId::Constructors,
    },
};

const CONSTRUCTOR_ENTITY: NestedColumn = NestedColumn {
    column: "Constructor",
    kind: NestedKind::Entity {
        id_column: "constructorId",
        table: TableId::Constructors,
    },
};

impl PageShape {
    pub const RACES: Self = Self {
        table_key: "RaceTable",
        list_key: None,
        records_key: "Races",
        nested: &[CIRCUIT_ENTITY],
    };

    pub const DRIVER_STANDINGS: Self = Self {
        table_key: "StandingsTable",
        list_key: Some("StandingsLists"),
        records_key: "DriverStandings",
        nested: &[DRIVER_ENTITY, CONSTRUCTORS_ENTITY],
    };

    pub const CONSTRUCTOR_STANDINGS: Self = Self {
        table_key: "StandingsTable",
        list_key: Some("StandingsLists"),
        records_key: "ConstructorStandings",
        nested: &[CONSTRUCTOR_ENTITY],
    };

    pub const DRIVERS: Self = Self {
        table_key: "DriverTable",
        list_key: None,
        records_key: "Drivers",
        nested: &[],
    };

    pub const CONSTRUCTORS: Self = Self {
        table_key: "ConstructorTable",
        list_key: None,
        records_key: "Constructors",
        nested: &[],
    };

    pub const CIRCUITS: Self = Self {
        table_key: "CircuitTable",
        list_key: None,
        records_key: "Circuits",
        nested: &[NestedColumn {
            column: "Location",
            kind: NestedKind::Inline,
        }],
    };
}
