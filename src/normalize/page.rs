use super::{FlatRow, PageShape};
use crate::Result;
use crate::tables::{RaceRef, integer};
use ohno::{IntoAppError, bail};
use serde_json::Value;

/// Sub-session columns of race records that are not kept.
const DROPPED_COLUMN_MARKERS: [&str; 3] = ["Practice", "Qualifying", "Sprint"];

/// One normalized page of an endpoint.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Page {
    /// One row per record, carrying the scope's scalars as extra columns.
    pub rows: Vec<FlatRow>,

    /// Scalar fields describing what the page covers, such as `season` and `round`.
    pub scope: FlatRow,

    pub limit: usize,
    pub offset: usize,
    pub total: usize,
}

impl Page {
    /// The race the page is scoped to, if its scope names both a season and a round.
    ///
    /// # Errors
    ///
    /// Returns an error if the scope holds a season or round that is not an integer.
    pub fn race(&self) -> Result<Option<RaceRef>> {
        if !self.scope.contains_key("season") || !self.scope.contains_key("round") {
            return Ok(None);
        }

        let race = serde_json::from_value(Value::Object(self.scope.clone())).into_app_err("malformed season or round in page scope")?;
        Ok(Some(race))
    }
}

/// Flattens a response page according to `shape`.
///
/// # Errors
///
/// Returns an error if the envelope, table object, wrapper list or record list is missing or of the wrong
/// type, or if a pagination counter is not an integer.
pub fn parse_page(json: &Value, shape: &PageShape) -> Result<Page> {
    let Some(data) = json.get("MRData").and_then(Value::as_object) else {
        bail!("response has no MRData envelope");
    };

    let counter = |name: &str| -> Result<usize> {
        let value = data.get(name).into_app_err_with(|| format!("response has no '{name}' counter"))?;
        integer(value).into_app_err_with(|| format!("malformed '{name}' counter"))
    };

    let limit = counter("limit")?;
    let offset = counter("offset")?;
    let total = counter("total")?;

    let Some(table) = data.get(shape.table_key).and_then(Value::as_object) else {
        bail!("response has no '{}' object", shape.table_key);
    };

    let mut scope = scalars(table);

    let holder = match shape.list_key {
        None => table,
        Some(list_key) => {
            let Some(list) = table.get(list_key).and_then(Value::as_array) else {
                bail!("'{}' has no '{list_key}' list", shape.table_key);
            };

            let Some(first) = list.first() else {
                return Ok(Page {
                    rows: Vec::new(),
                    scope,
                    limit,
                    offset,
                    total,
                });
            };

            let Some(first) = first.as_object() else {
                bail!("'{list_key}' holds a value that is not an object");
            };

            scope.extend(scalars(first));
            first
        }
    };

    let Some(records) = holder.get(shape.records_key).and_then(Value::as_array) else {
        bail!("response has no '{}' list", shape.records_key);
    };

    let mut rows = Vec::with_capacity(records.len());
    for record in records {
        let Some(record) = record.as_object() else {
            bail!("'{}' holds a value that is not an object", shape.records_key);
        };

        let mut row: FlatRow = record
            .iter()
            .filter(|(column, _)| !DROPPED_COLUMN_MARKERS.iter().any(|marker| column.contains(marker)))
            .map(|(column, value)| (column.clone(), value.clone()))
            .collect();

        for (column, value) in &scope {
            if !row.contains_key(column) {
                let _ = row.insert(column.clone(), value.clone());
            }
        }

        rows.push(row);
    }

    Ok(Page {
        rows,
        scope,
        limit,
        offset,
        total,
    })
}

fn scalars(object: &FlatRow) -> FlatRow {
    object
        .iter()
        .filter(|(_, value)| matches!(value, Value::String(_) | Value::Number(_) | Value::Bool(_)))
        .map(|(key, value)| (key.clone(), value.clone()))
        .collect()
}
