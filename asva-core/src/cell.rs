//! Table cells
//!
//! A cell is one entry of a dataset column. Cells deserialize untagged, so a
//! JSON record maps straight onto them.

use crate::AsvaError;
use serde::{Deserialize, Serialize};
use std::fmt;

/// A single dataset cell
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Cell {
    Number(f64),
    Text(String),
    Bool(bool),
    Null,
}

impl Cell {
    // ========== Safe Accessors (never panic) ==========

    pub fn as_number(&self) -> Option<f64> {
        match self {
            Cell::Number(n) => Some(*n),
            _ => None,
        }
    }

    pub fn as_text(&self) -> Option<&str> {
        match self {
            Cell::Text(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Cell::Bool(b) => Some(*b),
            _ => None,
        }
    }

    pub fn is_null(&self) -> bool {
        matches!(self, Cell::Null)
    }

    pub fn is_text(&self) -> bool {
        matches!(self, Cell::Text(_))
    }

    /// Type name for error messages
    pub fn type_name(&self) -> &'static str {
        match self {
            Cell::Number(_) => "Number",
            Cell::Text(_) => "Text",
            Cell::Bool(_) => "Bool",
            Cell::Null => "Null",
        }
    }

    /// Group label of this cell, `None` for null cells
    pub fn label(&self) -> Option<String> {
        match self {
            Cell::Null => None,
            other => Some(other.to_string()),
        }
    }

    /// Measurement value of this cell.
    ///
    /// Null reads as NaN; text and booleans are a type error.
    pub fn measurement(&self) -> Result<f64, AsvaError> {
        match self {
            Cell::Number(n) => Ok(*n),
            Cell::Null => Ok(f64::NAN),
            other => Err(AsvaError::type_error("Number", other.type_name())),
        }
    }
}

impl fmt::Display for Cell {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Cell::Number(n) => write!(f, "{}", n),
            Cell::Text(s) => write!(f, "{}", s),
            Cell::Bool(b) => write!(f, "{}", b),
            Cell::Null => write!(f, "null"),
        }
    }
}

impl From<f64> for Cell {
    fn from(n: f64) -> Self {
        Cell::Number(n)
    }
}

impl From<i64> for Cell {
    fn from(n: i64) -> Self {
        Cell::Number(n as f64)
    }
}

impl From<&str> for Cell {
    fn from(s: &str) -> Self {
        Cell::Text(s.to_string())
    }
}

impl From<String> for Cell {
    fn from(s: String) -> Self {
        Cell::Text(s)
    }
}

impl From<bool> for Cell {
    fn from(b: bool) -> Self {
        Cell::Bool(b)
    }
}

impl<T: Into<Cell>> From<Option<T>> for Cell {
    fn from(v: Option<T>) -> Self {
        v.map(Into::into).unwrap_or(Cell::Null)
    }
}
