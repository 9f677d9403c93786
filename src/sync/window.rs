use crate::Result;
use crate::tables::{Race, RaceRef, Table};
use ohno::app_err;

/// The races whose standings need fetching, in chronological order.
///
/// The window ends at `latest` and starts `margin` races before `last_known` in the races table, or at the
/// first race when nothing is known yet. Both boundaries have to be present in `races`.
///
/// # Errors
///
/// Returns an error if `last_known` or `latest` is not in the races table.
pub fn race_window(races: &Table<Race>, last_known: Option<RaceRef>, latest: RaceRef, margin: usize) -> Result<Vec<RaceRef>> {
    let index_of = |race: RaceRef| {
        races
            .position(&(race.season, race.round))
            .ok_or_else(|| app_err!("race {race} is not in the races table"))
    };

    let start = match last_known {
        Some(race) => index_of(race)?.saturating_sub(margin),
        None => 0,
    };
    let end = index_of(latest)?;

    if start > end {
        return Ok(Vec::new());
    }

    Ok(races.rows()[start..=end].iter().map(Race::race).collect())
}
