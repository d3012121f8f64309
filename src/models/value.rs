use serde::{Deserialize, Serialize};

use crate::error::{ProfileError, Result};

/// A single cell of a profile.
///
/// Cells start life as `Raw` text straight from the tokenizer and become
/// `Number` during coercion. `Missing` stands in for asterisk placeholders and
/// rejected rows and is never converted to a number.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Value {
    Missing,
    Number(f64),
    Raw(String),
}

impl Value {
    pub fn raw(text: impl Into<String>) -> Self {
        Value::Raw(text.into())
    }

    pub fn is_missing(&self) -> bool {
        matches!(self, Value::Missing)
    }

    /// Numeric view of the cell, parsing raw text on the fly.
    pub fn to_f64(&self) -> Result<Option<f64>> {
        match self {
            Value::Missing => Ok(None),
            Value::Number(n) => Ok(Some(*n)),
            Value::Raw(text) => parse_number(text).map(Some),
        }
    }

    /// Convert raw text into a number, keeping `Missing` as is.
    pub fn coerce(self) -> Result<Value> {
        match self {
            Value::Raw(text) => parse_number(&text).map(Value::Number),
            other => Ok(other),
        }
    }

    pub fn as_number(&self) -> Option<f64> {
        match self {
            Value::Number(n) => Some(*n),
            _ => None,
        }
    }
}

impl From<f64> for Value {
    fn from(value: f64) -> Self {
        Value::Number(value)
    }
}

impl From<Option<f64>> for Value {
    fn from(value: Option<f64>) -> Self {
        value.map_or(Value::Missing, Value::Number)
    }
}

fn parse_number(text: &str) -> Result<f64> {
    text.trim()
        .parse::<f64>()
        .map_err(|_| ProfileError::InvalidNumber {
            value: text.to_string(),
        })
}

/// A variable's value for one hour: either one reading, or one reading per
/// pressure level.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Field {
    Scalar(Value),
    Levels(Vec<Value>),
}

impl Field {
    pub fn missing() -> Self {
        Field::Scalar(Value::Missing)
    }

    pub fn levels(&self) -> Option<&[Value]> {
        match self {
            Field::Levels(values) => Some(values),
            Field::Scalar(_) => None,
        }
    }

    /// First reading of a sequence, or the scalar itself.
    pub fn first(&self) -> Option<&Value> {
        match self {
            Field::Scalar(value) => Some(value),
            Field::Levels(values) => values.first(),
        }
    }

    /// Whether the field carries anything worth keeping: a non-missing scalar
    /// or a non-empty sequence.
    pub fn is_present(&self) -> bool {
        match self {
            Field::Scalar(value) => !value.is_missing(),
            Field::Levels(values) => !values.is_empty(),
        }
    }

    pub fn coerce(self) -> Result<Field> {
        match self {
            Field::Scalar(value) => value.coerce().map(Field::Scalar),
            Field::Levels(values) => values
                .into_iter()
                .map(Value::coerce)
                .collect::<Result<Vec<_>>>()
                .map(Field::Levels),
        }
    }

    /// Collapse a sequence to its first reading.
    pub fn into_scalar(self) -> Result<Field> {
        match self {
            Field::Levels(values) => {
                let first = values.into_iter().next().unwrap_or(Value::Missing);
                first.coerce().map(Field::Scalar)
            }
            Field::Scalar(value) => value.coerce().map(Field::Scalar),
        }
    }
}
