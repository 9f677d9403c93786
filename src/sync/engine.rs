use super::window::race_window;
use crate::Result;
use crate::api::{Endpoint, F1Api, PageRequest, Scope};
use crate::config::Config;
use crate::normalize::{FlatRow, PageShape, decompose, parse_page};
use crate::tables::{
    Circuit, Constructor, ConstructorStanding, Driver, DriverStanding, Race, RaceRef, Standing, Stored, Table, TableId, TableStore,
};
use chrono::{DateTime, Datelike, Utc};
use ohno::bail;

/// Log target for the sync engine
const LOG_TARGET: &str = "      sync";

/// Settings of the sync engine that are not per-table.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SyncOptions {
    /// Records requested per page.
    pub page_limit: usize,

    /// First season fetched when no races are stored yet.
    pub first_season: i32,
}

impl SyncOptions {
    #[must_use]
    pub const fn from_config(config: &Config) -> Self {
        Self {
            page_limit: config.page_limit,
            first_season: config.first_season,
        }
    }
}

impl Default for SyncOptions {
    fn default() -> Self {
        Self {
            page_limit: 100,
            first_season: 1950,
        }
    }
}

/// A standings table and the endpoint it is fetched from.
pub trait StandingsTable: Standing + Stored {
    const ENDPOINT: Endpoint;
}

impl StandingsTable for DriverStanding {
    const ENDPOINT: Endpoint = Endpoint::DriverStandings;
}

impl StandingsTable for ConstructorStanding {
    const ENDPOINT: Endpoint = Endpoint::ConstructorStandings;
}

/// Brings the stored tables up to date with the API.
#[derive(Debug)]
pub struct SyncEngine<A> {
    api: A,
    store: TableStore,
    options: SyncOptions,
    now: DateTime<Utc>,
}

impl<A: F1Api> SyncEngine<A> {
    /// Creates an engine over `store`; `now` decides the newest season the races update asks for.
    ///
    /// # Errors
    ///
    /// Returns an error if `options.page_limit` is zero, since no page could ever make progress.
    pub fn new(api: A, store: TableStore, options: SyncOptions, now: DateTime<Utc>) -> Result<Self> {
        if options.page_limit == 0 {
            bail!("page_limit must be greater than 0");
        }

        Ok(Self { api, store, options, now })
    }

    #[must_use]
    pub const fn store(&self) -> &TableStore {
        &self.store
    }

    #[must_use]
    pub fn into_store(self) -> TableStore {
        self.store
    }

    /// Runs one sync cycle: load, update races, update both standings tables, save.
    ///
    /// Nothing is written unless every step succeeds.
    ///
    /// # Errors
    ///
    /// Returns an error if loading or saving fails, if a request fails after retries, if a response cannot be
    /// normalized, or if a standings window boundary is missing from the races table.
    pub async fn update(&mut self) -> Result<()> {
        self.store.load()?;

        self.update_races().await?;
        self.update_standings::<DriverStanding>().await?;
        self.update_standings::<ConstructorStanding>().await?;

        for reference in self.store.dangling_references() {
            log::warn!(target: LOG_TARGET, "{reference}");
        }

        self.store.save()
    }

    /// Re-fetches every season from the newest stored one minus the races margin through the current year.
    async fn update_races(&mut self) -> Result<()> {
        let current_season = self.now.year();
        let margin = i32::try_from(self.store.catalog().def(TableId::Races).refetch_margin()).unwrap_or(i32::MAX);

        let start_season = self
            .store
            .races()
            .and_then(Table::last)
            .map_or(self.options.first_season, |last| last.season.saturating_sub(margin).max(self.options.first_season));

        let mut rows = Vec::new();
        for season in start_season..=current_season {
            log::info!(target: LOG_TARGET, "Updating races for season {season}");
            rows.extend(self.fetch_all(Endpoint::Races, Scope::season(season)).await?);
        }

        self.merge_decomposed::<Race>(rows, Endpoint::Races.shape())
    }

    /// Re-fetches the standings of every race between the last known one, less the margin, and the newest
    /// one the API has standings for.
    async fn update_standings<S: StandingsTable>(&mut self) -> Result<()> {
        let bounds = self
            .store
            .races()
            .and_then(|races| Some((races.rows().first()?.race(), races.last()?.race())));
        let Some((first_race, newest_race)) = bounds else {
            log::warn!(target: LOG_TARGET, "No races stored, skipping {}", S::TABLE);
            return Ok(());
        };

        let last_known = self.store.table::<S>().and_then(Table::last).map(Standing::race);
        let floor_season = last_known.map_or(first_race.season, |race| race.season);

        let Some(latest) = self.probe_latest::<S>(newest_race.season, floor_season).await? else {
            log::info!(target: LOG_TARGET, "No {} available from season {floor_season} on", S::TABLE);
            return Ok(());
        };

        let margin = self.store.catalog().def(S::TABLE).refetch_margin();
        let window = match self.store.races() {
            Some(races) => race_window(races, last_known, latest, margin)?,
            None => Vec::new(),
        };

        let mut rows = Vec::new();
        for race in window {
            log::info!(target: LOG_TARGET, "Updating {} for season {}, round {}", S::TABLE, race.season, race.round);
            rows.extend(self.fetch_all(S::ENDPOINT, Scope::race(race)).await?);
        }

        self.merge_decomposed::<S>(rows, S::ENDPOINT.shape())
    }

    /// The newest race with standings, looking at `newest_season` first and stepping back one season at a
    /// time down to `floor_season`.
    async fn probe_latest<S: StandingsTable>(&self, newest_season: i32, floor_season: i32) -> Result<Option<RaceRef>> {
        let mut season = newest_season;

        while season >= floor_season {
            let request = PageRequest::new(S::ENDPOINT, Scope::season(season), self.options.page_limit);
            let json = self.api.get_page(&request).await?;
            let page = parse_page(&json, S::ENDPOINT.shape())?;

            if !page.rows.is_empty()
                && let Some(race) = page.race()?
            {
                log::debug!(target: LOG_TARGET, "Latest {} available: {race}", S::TABLE);
                return Ok(Some(race));
            }

            log::debug!(target: LOG_TARGET, "No {} for season {season} yet", S::TABLE);
            season -= 1;
        }

        Ok(None)
    }

    /// Fetches every page of `endpoint` within `scope` and returns the rows in order.
    async fn fetch_all(&self, endpoint: Endpoint, scope: Scope) -> Result<Vec<FlatRow>> {
        let request = PageRequest::new(endpoint, scope, self.options.page_limit);
        let mut rows = Vec::new();
        let mut offset = 0;
        let mut total = request.limit;

        while offset < total {
            let json = self.api.get_page(&request.at(offset)).await?;
            let page = parse_page(&json, endpoint.shape())?;

            log::debug!(
                target: LOG_TARGET,
                "Fetched {} rows of {endpoint} for {scope} (offset {offset}, total {})",
                page.rows.len(),
                page.total
            );

            total = page.total;
            rows.extend(page.rows);

            // The server may cap the page size below what was asked for.
            offset += if page.limit > 0 { page.limit } else { request.limit };
        }

        Ok(rows)
    }

    /// Splits the rows into `R` records plus the entity rows they embed, and merges both.
    fn merge_decomposed<R: Stored>(&mut self, rows: Vec<FlatRow>, shape: &PageShape) -> Result<()> {
        let decomposed = decompose(rows, shape.nested)?;

        for (table, entity_rows) in decomposed.entities {
            match table {
                TableId::Circuits => self.merge_rows::<Circuit>(entity_rows)?,
                TableId::Constructors => self.merge_rows::<Constructor>(entity_rows)?,
                TableId::Drivers => self.merge_rows::<Driver>(entity_rows)?,
                TableId::Races | TableId::DriversStandings | TableId::ConstructorsStandings => {
                    bail!("{table} is not an entity table");
                }
            }
        }

        self.merge_rows::<R>(decomposed.rows)
    }

    fn merge_rows<R: Stored>(&mut self, rows: Vec<FlatRow>) -> Result<()> {
        let records = rows.into_iter().map(R::from_flat).collect::<Result<Vec<_>>>()?;
        self.store.merge(records);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tables::Catalog;
    use chrono::TimeZone;
    use serde_json::{Value, json};
    use std::sync::Mutex;

    /// Serves one season of races and nothing else.
    #[derive(Debug)]
    struct OneSeason {
        requests: Mutex<Vec<String>>,
    }

    impl F1Api for OneSeason {
        async fn get_page(&self, request: &PageRequest) -> Result<Value> {
            self.requests.lock().unwrap().push(format!("{}?offset={}", request.path(), request.offset));

            let empty_standings = json!({
                "MRData": {"limit": "2", "offset": "0", "total": "0", "StandingsTable": {"season": "2024", "StandingsLists": []}}
            });

            Ok(match (request.endpoint, request.offset) {
                (Endpoint::Races, 0) => json!({
                    "MRData": {"limit": "2", "offset": "0", "total": "3", "RaceTable": {"season": "2024", "Races": [
                        {"season": "2024", "round": "1", "raceName": "Bahrain Grand Prix", "date": "2024-03-02",
                         "Circuit": {"circuitId": "bahrain", "circuitName": "Bahrain International Circuit",
                                     "Location": {"lat": "26.0325", "long": "50.5106", "locality": "Sakhir", "country": "Bahrain"}}},
                        {"season": "2024", "round": "2", "raceName": "Saudi Arabian Grand Prix", "date": "2024-03-09",
                         "Circuit": {"circuitId": "jeddah", "circuitName": "Jeddah Corniche Circuit",
                                     "Location": {"lat": "21.6319", "long": "39.1044", "locality": "Jeddah", "country": "Saudi Arabia"}}}
                    ]}}
                }),
                (Endpoint::Races, _) => json!({
                    "MRData": {"limit": "2", "offset": "2", "total": "3", "RaceTable": {"season": "2024", "Races": [
                        {"season": "2024", "round": "3", "raceName": "Australian Grand Prix", "date": "2024-03-24",
                         "Circuit": {"circuitId": "albert_park", "circuitName": "Albert Park Grand Prix Circuit",
                                     "Location": {"lat": "-37.8497", "long": "144.968", "locality": "Melbourne", "country": "Australia"}}}
                    ]}}
                }),
                _ => empty_standings,
            })
        }
    }

    #[tokio::test]
    #[cfg_attr(miri, ignore = "Miri cannot call GetTempPathW")]
    async fn test_races_paginate_and_decompose() {
        let tmp = tempfile::tempdir().unwrap();
        let api = OneSeason {
            requests: Mutex::new(Vec::new()),
        };
        let store = TableStore::new(tmp.path(), Catalog::default());
        let options = SyncOptions {
            page_limit: 2,
            first_season: 2024,
        };
        let now = Utc.with_ymd_and_hms(2024, 4, 1, 0, 0, 0).unwrap();

        let mut engine = SyncEngine::new(api, store, options, now).unwrap();
        engine.update().await.unwrap();

        let races = engine.store().races().unwrap();
        assert_eq!(races.len(), 3);
        assert_eq!(races.last().unwrap().circuit_id, "albert_park");

        let circuits = engine.store().circuits().unwrap();
        assert_eq!(circuits.len(), 3);
        assert!((circuits.rows()[0].location_lat - -37.8497).abs() < 1e-9);

        assert!(engine.store().drivers_standings().is_none());

        let requests = engine.api.requests.lock().unwrap().clone();
        assert_eq!(
            requests,
            [
                "/2024/races.json?offset=0",
                "/2024/races.json?offset=2",
                "/2024/driverstandings.json?offset=0",
                "/2024/constructorstandings.json?offset=0",
            ]
        );

        assert!(tmp.path().join("races.csv").exists());
        assert!(tmp.path().join("circuits.csv").exists());
        assert!(!tmp.path().join("drivers_standings.csv").exists());
    }

    #[test]
    #[cfg_attr(miri, ignore = "Miri cannot call GetTempPathW")]
    fn test_zero_page_limit_is_rejected() {
        let tmp = tempfile::tempdir().unwrap();
        let api = OneSeason {
            requests: Mutex::new(Vec::new()),
        };
        let store = TableStore::new(tmp.path(), Catalog::default());
        let options = SyncOptions {
            page_limit: 0,
            first_season: 2024,
        };
        let now = Utc.with_ymd_and_hms(2024, 4, 1, 0, 0, 0).unwrap();

        let err = SyncEngine::new(api, store, options, now).unwrap_err();
        assert_eq!(err.to_string(), "page_limit must be greater than 0");
    }

    #[test]
    fn test_options_from_config() {
        let config = Config {
            page_limit: 50,
            first_season: 1960,
            ..Config::default()
        };
        assert_eq!(
            SyncOptions::from_config(&config),
            SyncOptions {
                page_limit: 50,
                first_season: 1960
            }
        );
        assert_eq!(SyncOptions::from_config(&Config::default()), SyncOptions::default());
    }
}
