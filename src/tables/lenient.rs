//! Field deserializers that accept numbers written as numbers or as strings.
//!
//! The API reports every scalar as a JSON string (`"season": "2024"`) while the CSV reader infers numeric
//! types from the cell text, so the same record type has to accept both forms.

use core::fmt::Display;
use serde::de::Error;
use serde::{Deserialize, Deserializer};

#[derive(Deserialize)]
#[serde(untagged)]
enum Numeric {
    Null,
    Int(i64),
    Float(f64),
    Text(String),
}

impl Numeric {
    #[expect(clippy::cast_precision_loss, reason = "championship figures are far below 2^52")]
    fn as_float<E: Error>(&self) -> Result<Option<f64>, E> {
        match self {
            Self::Null => Ok(None),
            Self::Int(value) => Ok(Some(*value as f64)),
            Self::Float(value) => Ok(Some(*value)),
            Self::Text(text) => {
                let text = text.trim();
                if text.is_empty() {
                    return Ok(None);
                }
                text.parse().map(Some).map_err(|_| E::custom(format!("'{text}' is not a number")))
            }
        }
    }

    #[expect(clippy::cast_possible_truncation, reason = "only whole numbers are narrowed")]
    fn as_integer<E: Error>(&self) -> Result<Option<i64>, E> {
        match self {
            Self::Int(value) => Ok(Some(*value)),
            Self::Text(text) if text.trim().parse::<i64>().is_ok() => Ok(text.trim().parse().ok()),
            _ => match self.as_float::<E>()? {
                None => Ok(None),
                Some(value) if value.fract() == 0.0 => Ok(Some(value as i64)),
                Some(value) => Err(E::custom(format!("{value} is not a whole number"))),
            },
        }
    }
}

fn narrow<T, E>(value: i64) -> Result<T, E>
where
    T: TryFrom<i64>,
    T::Error: Display,
    E: Error,
{
    T::try_from(value).map_err(|e| E::custom(format!("{value} is out of range: {e}")))
}

/// Deserialize a required integer.
pub fn integer<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: TryFrom<i64>,
    T::Error: Display,
{
    match Numeric::deserialize(deserializer)?.as_integer()? {
        Some(value) => narrow(value),
        None => Err(D::Error::custom("expected an integer, found an empty value")),
    }
}

/// Deserialize an integer that may be null, empty or absent.
pub fn optional_integer<'de, D, T>(deserializer: D) -> Result<Option<T>, D::Error>
where
    D: Deserializer<'de>,
    T: TryFrom<i64>,
    T::Error: Display,
{
    Numeric::deserialize(deserializer)?.as_integer()?.map(narrow).transpose()
}

/// Deserialize a required floating point number.
pub fn float<'de, D>(deserializer: D) -> Result<f64, D::Error>
where
    D: Deserializer<'de>,
{
    Numeric::deserialize(deserializer)?
        .as_float()?
        .ok_or_else(|| D::Error::custom("expected a number, found an empty value"))
}
