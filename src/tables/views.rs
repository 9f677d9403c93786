//! Entity views derived from the standings tables.

use super::{Constructor, ConstructorStanding, Driver, DriverStanding, Standing, Stored, Table, TableStore};
use crate::Result;
use std::collections::BTreeSet;

/// Log target for entity views
const LOG_TARGET: &str = "     views";

impl TableStore {
    /// Drivers that hold a standing in `start_season` or any later season, in driver table order.
    ///
    /// Loads the tables first if that has not happened yet.
    ///
    /// # Errors
    ///
    /// Returns an error if the tables cannot be loaded.
    pub fn get_drivers(&mut self, start_season: i32) -> Result<Vec<Driver>> {
        self.ensure_loaded()?;
        Ok(self.active_since::<Driver, DriverStanding>(start_season, |driver| &driver.driver_id))
    }

    /// Constructors that hold a standing in `start_season` or any later season, in constructor table order.
    ///
    /// Loads the tables first if that has not happened yet.
    ///
    /// # Errors
    ///
    /// Returns an error if the tables cannot be loaded.
    pub fn get_constructors(&mut self, start_season: i32) -> Result<Vec<Constructor>> {
        self.ensure_loaded()?;
        Ok(self.active_since::<Constructor, ConstructorStanding>(start_season, |constructor| &constructor.constructor_id))
    }

    fn active_since<E, S>(&self, start_season: i32, id_of: impl Fn(&E) -> &String) -> Vec<E>
    where
        E: Stored,
        S: Standing + Stored,
    {
        let active: BTreeSet<&str> = self
            .table::<S>()
            .iter()
            .flat_map(|table| table.iter())
            .filter(|standing| standing.race().season >= start_season)
            .map(Standing::entity_id)
            .collect();

        log::debug!(target: LOG_TARGET, "{} {} entities active since {start_season}", active.len(), E::TABLE);

        self.table::<E>()
            .map(Table::rows)
            .unwrap_or_default()
            .iter()
            .filter(|entity| active.contains(id_of(*entity).as_str()))
            .cloned()
            .collect()
    }
}
