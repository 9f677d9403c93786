use super::{Catalog, Circuit, Constructor, ConstructorStanding, Driver, DriverStanding, Race, Record, Table, TableId};
use crate::Result;
use core::fmt::{Display, Formatter};
use ohno::{IntoAppError, bail};
use std::fs;
use std::path::PathBuf;

/// Log target for the table store
const LOG_TARGET: &str = "    tables";

/// Gives the store generic access to the slot holding a record type's table.
pub trait Stored: Record {
    fn slot(store: &TableStore) -> Option<&Table<Self>>;

    fn slot_mut(store: &mut TableStore) -> &mut Option<Table<Self>>;
}

/// Generates the `TableStore` struct and its per-table plumbing from a list of table field definitions.
///
/// Creates:
/// - `TableStore` struct with one optional snapshot per table
/// - Accessor methods for each table (e.g., `races()`, `drivers_standings()`)
/// - `load()` - Reads every table from its CSV file
/// - `save()` - Writes every non-empty table to its CSV file
/// - A [`Stored`] implementation for each record type
macro_rules! define_tables {
    ($(
        $(#[$meta:meta])*
        $field:ident: $type:ty
    ),* $(,)?) => {
        /// Owns the current snapshot of every table and moves them to and from disk.
        #[derive(Debug)]
        pub struct TableStore {
            directory: PathBuf,
            catalog: Catalog,
            loaded: bool,
            $(
                $(#[$meta])*
                $field: Option<Table<$type>>,
            )*
        }

        impl TableStore {
            /// Creates a store over `directory` with nothing loaded yet.
            #[must_use]
            pub fn new(directory: impl Into<PathBuf>, catalog: Catalog) -> Self {
                Self {
                    directory: directory.into(),
                    catalog,
                    loaded: false,
                    $(
                        $field: None,
                    )*
                }
            }

            $(
                $(#[$meta])*
                #[must_use]
                pub const fn $field(&self) -> Option<&Table<$type>> {
                    self.$field.as_ref()
                }
            )*

            /// Replaces every in-memory snapshot with the content of its CSV file.
            ///
            /// Tables without a file are left empty.
            ///
            /// # Errors
            ///
            /// Returns an error if a file cannot be read or does not match the table's columns.
            pub fn load(&mut self) -> Result<()> {
                $(
                    self.$field = self.load_table::<$type>()?;
                )*

                self.loaded = true;
                Ok(())
            }

            /// Writes every non-empty table to its CSV file.
            ///
            /// # Errors
            ///
            /// Returns an error if a file cannot be written.
            pub fn save(&self) -> Result<()> {
                $(
                    self.save_table(self.$field.as_ref())?;
                )*

                Ok(())
            }
        }

        $(
            impl Stored for $type {
                fn slot(store: &TableStore) -> Option<&Table<Self>> {
                    store.$field.as_ref()
                }

                fn slot_mut(store: &mut TableStore) -> &mut Option<Table<Self>> {
                    &mut store.$field
                }
            }
        )*
    };
}

define_tables! {
    circuits: Circuit,
    constructors: Constructor,
    drivers: Driver,
    races: Race,
    drivers_standings: DriverStanding,
    constructors_standings: ConstructorStanding,
}

impl TableStore {
    #[must_use]
    pub const fn catalog(&self) -> &Catalog {
        &self.catalog
    }

    #[must_use]
    pub const fn is_loaded(&self) -> bool {
        self.loaded
    }

    /// Loads the tables unless that already happened.
    ///
    /// # Errors
    ///
    /// Returns an error if loading fails.
    pub fn ensure_loaded(&mut self) -> Result<()> {
        if !self.loaded {
            self.load()?;
        }

        Ok(())
    }

    /// The current snapshot of the table holding `R`.
    #[must_use]
    pub fn table<R: Stored>(&self) -> Option<&Table<R>> {
        R::slot(self)
    }

    /// Merges a batch of rows into the table holding `R`, replacing rows with the same key.
    pub fn merge<R: Stored>(&mut self, batch: Vec<R>) {
        if batch.is_empty() {
            return;
        }

        let count = batch.len();
        let slot = R::slot_mut(self);
        let merged = slot.take().unwrap_or_default().merge(batch);
        log::debug!(target: LOG_TARGET, "Merged {count} rows into {}, now {} rows", R::TABLE, merged.len());
        *slot = Some(merged);
    }

    fn path_of(&self, id: TableId) -> PathBuf {
        self.directory.join(self.catalog.def(id).file_name())
    }

    fn load_table<R: Record>(&self) -> Result<Option<Table<R>>> {
        let path = self.path_of(R::TABLE);
        if !path.exists() {
            log::info!(target: LOG_TARGET, "No stored {} table at '{}', starting empty", R::TABLE, path.display());
            return Ok(None);
        }

        let mut reader = csv::Reader::from_path(&path).into_app_err_with(|| format!("unable to open '{}'", path.display()))?;
        let headers = reader
            .headers()
            .into_app_err_with(|| format!("unable to read the header of '{}'", path.display()))?;
        if !headers.iter().eq(R::COLUMNS.iter().copied()) {
            bail!(
                "'{}' has columns [{}], expected [{}]",
                path.display(),
                headers.iter().collect::<Vec<_>>().join(", "),
                R::COLUMNS.join(", ")
            );
        }

        let rows = reader
            .deserialize()
            .collect::<core::result::Result<Vec<R>, _>>()
            .into_app_err_with(|| format!("unable to parse '{}'", path.display()))?;

        log::debug!(target: LOG_TARGET, "Loaded {} rows from '{}'", rows.len(), path.display());

        if rows.is_empty() {
            return Ok(None);
        }

        Ok(Some(Table::from_rows(rows)))
    }

    fn save_table<R: Record>(&self, table: Option<&Table<R>>) -> Result<()> {
        let Some(table) = table.filter(|table| !table.is_empty()) else {
            log::debug!(target: LOG_TARGET, "Nothing to save for {}", R::TABLE);
            return Ok(());
        };

        fs::create_dir_all(&self.directory)
            .into_app_err_with(|| format!("unable to create directory '{}'", self.directory.display()))?;

        let path = self.path_of(R::TABLE);
        let tmp_path = path.with_extension("csv.tmp");

        {
            let mut writer =
                csv::Writer::from_path(&tmp_path).into_app_err_with(|| format!("unable to create '{}'", tmp_path.display()))?;
            for row in table.iter() {
                writer
                    .serialize(row)
                    .into_app_err_with(|| format!("unable to write a row to '{}'", tmp_path.display()))?;
            }
            writer
                .flush()
                .into_app_err_with(|| format!("unable to flush '{}'", tmp_path.display()))?;
        }

        fs::rename(&tmp_path, &path)
            .into_app_err_with(|| format!("unable to move '{}' to '{}'", tmp_path.display(), path.display()))?;

        log::debug!(target: LOG_TARGET, "Saved {} rows to '{}'", table.len(), path.display());
        Ok(())
    }

    /// Foreign keys held by the races and standings tables that have no row in the referenced entity table.
    #[must_use]
    pub fn dangling_references(&self) -> Vec<DanglingReference> {
        let mut dangling = Vec::new();

        let mut check = |from: TableId, to: TableId, id: &str, known: bool| {
            if !known {
                dangling.push(DanglingReference {
                    from,
                    to,
                    id: id.to_string(),
                });
            }
        };

        for race in self.races.iter().flat_map(Table::iter) {
            let circuit_known = self
                .circuits
                .as_ref()
                .is_some_and(|t| t.position(&(race.circuit_id.clone(),)).is_some());
            check(TableId::Races, TableId::Circuits, &race.circuit_id, circuit_known);
        }

        for standing in self.drivers_standings.iter().flat_map(Table::iter) {
            let driver_known = self
                .drivers
                .as_ref()
                .is_some_and(|t| t.position(&(standing.driver_id.clone(),)).is_some());
            check(TableId::DriversStandings, TableId::Drivers, &standing.driver_id, driver_known);

            if let Some(constructor_id) = &standing.constructor_id {
                let constructor_known = self
                    .constructors
                    .as_ref()
                    .is_some_and(|t| t.position(&(constructor_id.clone(),)).is_some());
                check(TableId::DriversStandings, TableId::Constructors, constructor_id, constructor_known);
            }
        }

        for standing in self.constructors_standings.iter().flat_map(Table::iter) {
            let constructor_known = self
                .constructors
                .as_ref()
                .is_some_and(|t| t.position(&(standing.constructor_id.clone(),)).is_some());
            check(
                TableId::ConstructorsStandings,
                TableId::Constructors,
                &standing.constructor_id,
                constructor_known,
            );
        }

        dangling.sort_by(|a, b| (a.from, a.to, &a.id).cmp(&(b.from, b.to, &b.id)));
        dangling.dedup();
        dangling
    }
}

/// A foreign key without a matching row in the referenced table.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DanglingReference {
    pub from: TableId,
    pub to: TableId,
    pub id: String,
}

impl Display for DanglingReference {
    fn fmt(&self, f: &mut Formatter<'_>) -> core::fmt::Result {
        write!(f, "{} references unknown {} '{}'", self.from, self.to, self.id)
    }
}
