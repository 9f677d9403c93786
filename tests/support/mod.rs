//! An in-memory stand-in for the Jolpica API serving a small, deterministic history.

use f1db::Result;
use f1db::api::{Endpoint, F1Api, PageRequest};
use f1db::tables::RaceRef;
use serde_json::{Value, json};
use std::collections::BTreeMap;
use std::sync::{Arc, Mutex};

/// Line-ups per season: (driver, constructor).
fn line_up(season: i32) -> &'static [(&'static str, &'static str)] {
    if season < 2024 {
        &[
            ("alonso", "aston_martin"),
            ("hamilton", "mercedes"),
            ("max_verstappen", "red_bull"),
            ("perez", "red_bull"),
        ]
    } else {
        &[("hamilton", "mercedes"), ("max_verstappen", "red_bull"), ("norris", "mclaren")]
    }
}

/// Serves races for a fixed calendar and standings up to a given race.
#[derive(Debug, Clone)]
pub struct FakeApi {
    calendar: BTreeMap<i32, u32>,
    standings_until: Option<RaceRef>,
    requests: Arc<Mutex<Vec<String>>>,
}

impl FakeApi {
    /// `calendar` lists the number of rounds per season.
    pub fn new(calendar: &[(i32, u32)], standings_until: Option<RaceRef>) -> Self {
        Self {
            calendar: calendar.iter().copied().collect(),
            standings_until,
            requests: Arc::new(Mutex::new(Vec::new())),
        }
    }

    /// Every request served so far, as `path?limit=..&offset=..`.
    pub fn requests(&self) -> Vec<String> {
        self.requests.lock().unwrap().clone()
    }

    fn races(&self, season: i32) -> Vec<Value> {
        let rounds = self.calendar.get(&season).copied().unwrap_or(0);
        (1..=rounds)
            .map(|round| {
                let circuit = format!("circuit_{round}");
                json!({
                    "season": season.to_string(),
                    "round": round.to_string(),
                    "url": format!("https://en.wikipedia.org/wiki/{season}_Round_{round}"),
                    "raceName": format!("Grand Prix {round}"),
                    "Circuit": {
                        "circuitId": circuit,
                        "url": format!("https://en.wikipedia.org/wiki/{circuit}"),
                        "circuitName": format!("Circuit {round}"),
                        "Location": {
                            "lat": format!("{}.5", 10 + round),
                            "long": format!("-{}.25", round),
                            "locality": format!("Town {round}"),
                            "country": "Somewhere"
                        }
                    },
                    "date": format!("{season}-03-{:02}", round.min(28)),
                    "time": "15:00:00Z",
                    "FirstPractice": {"date": format!("{season}-03-01")},
                    "Qualifying": {"date": format!("{season}-03-01")}
                })
            })
            .collect()
    }

    /// The race whose standings a season-scoped request reports, if any.
    fn latest_in_season(&self, season: i32) -> Option<RaceRef> {
        let until = self.standings_until?;
        if season > until.season {
            return None;
        }

        if season == until.season {
            return Some(until);
        }

        self.calendar.get(&season).map(|&rounds| RaceRef::new(season, rounds))
    }

    fn has_standings(&self, race: RaceRef) -> bool {
        self.standings_until.is_some_and(|until| (race.season, race.round) <= (until.season, until.round))
    }

    fn driver_standings(race: RaceRef) -> Vec<Value> {
        line_up(race.season)
            .iter()
            .enumerate()
            .map(|(i, (driver, constructor))| {
                json!({
                    "position": (i + 1).to_string(),
                    "positionText": (i + 1).to_string(),
                    "points": format!("{}.5", race.round * 10 - u32::try_from(i).unwrap()),
                    "wins": (if i == 0 { race.round } else { 0 }).to_string(),
                    "Driver": {
                        "driverId": driver,
                        "url": format!("https://en.wikipedia.org/wiki/{driver}"),
                        "givenName": "Given",
                        "familyName": driver,
                        "dateOfBirth": "1990-01-01",
                        "nationality": "Nowhere"
                    },
                    "Constructors": [{
                        "constructorId": constructor,
                        "url": format!("https://en.wikipedia.org/wiki/{constructor}"),
                        "name": constructor,
                        "nationality": "Nowhere"
                    }]
                })
            })
            .collect()
    }

    fn constructor_standings(race: RaceRef) -> Vec<Value> {
        let mut constructors: Vec<&str> = line_up(race.season).iter().map(|(_, constructor)| *constructor).collect();
        constructors.dedup();
        constructors.sort_unstable();

        constructors
            .iter()
            .enumerate()
            .map(|(i, constructor)| {
                json!({
                    "position": (i + 1).to_string(),
                    "positionText": (i + 1).to_string(),
                    "points": (race.round * 20).to_string(),
                    "wins": "0",
                    "Constructor": {
                        "constructorId": constructor,
                        "url": format!("https://en.wikipedia.org/wiki/{constructor}"),
                        "name": constructor,
                        "nationality": "Nowhere"
                    }
                })
            })
            .collect()
    }

    fn standings_page(&self, request: &PageRequest) -> Value {
        let season = request.scope.season_number();
        let race = match request.scope.round_number() {
            Some(round) => Some(RaceRef::new(season, round)).filter(|&race| self.has_standings(race)),
            None => self.latest_in_season(season),
        };

        let (records_key, records) = match request.endpoint {
            Endpoint::DriverStandings => ("DriverStandings", race.map(Self::driver_standings).unwrap_or_default()),
            _ => ("ConstructorStandings", race.map(Self::constructor_standings).unwrap_or_default()),
        };

        let (total, records) = paginate(records, request);
        let mut table = json!({"season": season.to_string(), "StandingsLists": []});

        if let Some(race) = race
            && !records.is_empty()
        {
            table["StandingsLists"] = json!([{
                "season": race.season.to_string(),
                "round": race.round.to_string(),
                records_key: records
            }]);
        }

        envelope(request, total, "StandingsTable", table)
    }
}

fn paginate(records: Vec<Value>, request: &PageRequest) -> (usize, Vec<Value>) {
    let total = records.len();
    let page = records.into_iter().skip(request.offset).take(request.limit).collect();
    (total, page)
}

fn envelope(request: &PageRequest, total: usize, table_key: &str, table: Value) -> Value {
    json!({
        "MRData": {
            "xmlns": "",
            "series": "f1",
            "limit": request.limit.to_string(),
            "offset": request.offset.to_string(),
            "total": total.to_string(),
            table_key: table
        }
    })
}

impl F1Api for FakeApi {
    async fn get_page(&self, request: &PageRequest) -> Result<Value> {
        self.requests
            .lock()
            .unwrap()
            .push(format!("{}?limit={}&offset={}", request.path(), request.limit, request.offset));

        match request.endpoint {
            Endpoint::Races => {
                let season = request.scope.season_number();
                let (total, races) = paginate(self.races(season), request);
                Ok(envelope(request, total, "RaceTable", json!({"season": season.to_string(), "Races": races})))
            }
            Endpoint::DriverStandings | Endpoint::ConstructorStandings => Ok(self.standings_page(request)),
            other => ohno::bail!("the fake API does not serve {other}"),
        }
    }
}
