use super::{FlatRow, NestedColumn, NestedKind};
use crate::Result;
use crate::tables::TableId;
use ohno::bail;
use serde_json::Value;
use std::collections::{BTreeMap, HashMap};

/// Rows split into the parent table and the entity tables they reference.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Decomposed {
    /// Parent rows, with entity columns replaced by foreign keys and inline objects flattened.
    pub rows: Vec<FlatRow>,

    /// Entity rows per target table, one row per identifier in order of first appearance.
    pub entities: BTreeMap<TableId, Vec<FlatRow>>,
}

impl Decomposed {
    /// Entity rows for `table`, empty if the rows referenced none.
    #[must_use]
    pub fn entities(&self, table: TableId) -> &[FlatRow] {
        self.entities.get(&table).map(Vec::as_slice).unwrap_or_default()
    }
}

#[derive(Default)]
struct EntityRows {
    rows: Vec<FlatRow>,
    index: HashMap<String, usize>,
}

impl EntityRows {
    /// Keeps one row per identifier; a later row for a known identifier replaces the earlier one.
    fn upsert(&mut self, id: String, row: FlatRow) {
        if let Some(&at) = self.index.get(&id) {
            self.rows[at] = row;
        } else {
            let _ = self.index.insert(id, self.rows.len());
            self.rows.push(row);
        }
    }
}

/// Splits the nested columns declared in `nested` out of `rows`.
///
/// # Errors
///
/// Returns an error if a nested column holds something other than an object (or a list of objects for
/// entities), or if an entity object has no identifier.
pub fn decompose(rows: Vec<FlatRow>, nested: &[NestedColumn]) -> Result<Decomposed> {
    let mut entities: BTreeMap<TableId, EntityRows> = BTreeMap::new();
    let mut parents = Vec::with_capacity(rows.len());

    for mut row in rows {
        for column in nested {
            let value = row.remove(column.column).unwrap_or(Value::Null);

            match column.kind {
                NestedKind::Inline => match value {
                    Value::Null => {}
                    Value::Object(object) => row.extend(flatten(Some(column.column), &object)),
                    _ => bail!("column '{}' does not hold an object", column.column),
                },

                NestedKind::Entity { id_column, table } => {
                    let entity = match value {
                        Value::Null => None,
                        Value::Object(object) => Some(object),
                        Value::Array(items) => match items.into_iter().next() {
                            None | Some(Value::Null) => None,
                            Some(Value::Object(object)) => Some(object),
                            Some(_) => bail!("column '{}' holds a list of non-objects", column.column),
                        },
                        _ => bail!("column '{}' does not hold an object or a list", column.column),
                    };

                    let Some(entity) = entity else {
                        let _ = row.insert(id_column.to_string(), Value::Null);
                        continue;
                    };

                    let entity = flatten(None, &entity);
                    let Some(Value::String(id)) = entity.get(id_column) else {
                        bail!("an entity in column '{}' has no '{id_column}'", column.column);
                    };

                    let id = id.clone();
                    let _ = row.insert(id_column.to_string(), Value::String(id.clone()));
                    entities.entry(table).or_default().upsert(id, entity);
                }
            }
        }

        parents.push(row);
    }

    Ok(Decomposed {
        rows: parents,
        entities: entities.into_iter().map(|(table, entity_rows)| (table, entity_rows.rows)).collect(),
    })
}

/// Flattens nested objects into columns named `{parentLower}{ChildCapitalized}`.
fn flatten(prefix: Option<&str>, object: &FlatRow) -> FlatRow {
    let mut flat = FlatRow::new();

    for (key, value) in object {
        let name = prefix.map_or_else(|| key.clone(), |prefix| camel_join(prefix, key));
        match value {
            Value::Object(inner) => flat.extend(flatten(Some(&name), inner)),
            _ => {
                let _ = flat.insert(name, value.clone());
            }
        }
    }

    flat
}

fn camel_join(parent: &str, child: &str) -> String {
    let mut name = String::with_capacity(parent.len() + child.len());

    let mut parent_chars = parent.chars();
    if let Some(first) = parent_chars.next() {
        name.extend(first.to_lowercase());
        name.push_str(parent_chars.as_str());
    }

    let mut child_chars = child.chars();
    if let Some(first) = child_chars.next() {
        name.extend(first.to_uppercase());
        name.push_str(child_chars.as_str());
    }

    name
}
