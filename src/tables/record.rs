use super::TableId;
use crate::Result;
use crate::normalize::FlatRow;
use core::fmt::Debug;
use ohno::IntoAppError;
use serde::Serialize;
use serde::de::DeserializeOwned;
use serde_json::Value;

/// A row of one of the persisted tables.
pub trait Record: Clone + Debug + Serialize + DeserializeOwned {
    /// The columns that uniquely identify a row.
    type Key: Ord + Clone + Debug;

    /// The table the record belongs to.
    const TABLE: TableId;

    /// Column names in file order.
    const COLUMNS: &'static [&'static str];

    fn key(&self) -> Self::Key;

    /// Builds a record from a normalized API row, ignoring columns the table does not keep.
    ///
    /// # Errors
    ///
    /// Returns an error if a required column is missing or cannot be converted.
    fn from_flat(row: FlatRow) -> Result<Self> {
        serde_json::from_value(Value::Object(row)).into_app_err_with(|| format!("malformed row for the {} table", Self::TABLE))
    }
}

/// Generates record structs along with their [`Record`] implementation.
///
/// Each field maps to one column; the declaration order of the fields is the column order of the backing file.
macro_rules! define_records {
    ($(
        $(#[$meta:meta])*
        $name:ident in $table:ident keyed by ($($key:ident: $key_type:ty),+ $(,)?) {
            $(
                $(#[$field_meta:meta])*
                $field:ident: $type:ty => $column:literal
            ),* $(,)?
        }
    )*) => {
        $(
            $(#[$meta])*
            #[derive(Debug, Clone, PartialEq, ::serde::Serialize, ::serde::Deserialize)]
            pub struct $name {
                $(
                    $(#[$field_meta])*
                    #[serde(rename = $column)]
                    pub $field: $type,
                )*
            }

            impl $crate::tables::Record for $name {
                type Key = ($($key_type,)+);

                const TABLE: $crate::tables::TableId = $crate::tables::TableId::$table;

                const COLUMNS: &'static [&'static str] = &[$($column),*];

                fn key(&self) -> Self::Key {
                    ($(self.$key.clone(),)+)
                }
            }
        )*
    };
}

pub(super) use define_records;
