use std::{fmt, str::FromStr};

use super::{QueryError, Result};

/// The shape of a query value, used for validation and error reporting.
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ValueShape {
    Scalar,
    List,
    Bounds,
}

impl fmt::Display for ValueShape {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Scalar => "string",
            Self::List => "list of strings",
            Self::Bounds => "bounding box (4 numbers)",
        })
    }
}

/// A caller-supplied value for one query field.
///
/// ```rust
/// use pleiades_search::{BoundingBox, ParamValue};
///
/// let scalar = ParamValue::from("Zucchabar");
/// let list = ParamValue::from(["contested", "trace"]);
/// let bounds = ParamValue::from(BoundingBox::new(2.0, 36.0, 2.5, 36.5)?);
/// # Ok::<(), pleiades_search::QueryError>(())
/// ```
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
#[derive(Debug, Clone, PartialEq)]
pub enum ParamValue {
    Scalar(String),
    List(Vec<String>),
    Bounds(BoundingBox),
}

impl ParamValue {
    #[must_use]
    pub const fn shape(&self) -> ValueShape {
        match self {
            Self::Scalar(_) => ValueShape::Scalar,
            Self::List(_) => ValueShape::List,
            Self::Bounds(_) => ValueShape::Bounds,
        }
    }
}

impl From<&str> for ParamValue {
    fn from(value: &str) -> Self {
        Self::Scalar(value.to_string())
    }
}

impl From<String> for ParamValue {
    fn from(value: String) -> Self {
        Self::Scalar(value)
    }
}

impl<S: Into<String>> From<Vec<S>> for ParamValue {
    fn from(values: Vec<S>) -> Self {
        Self::List(values.into_iter().map(Into::into).collect())
    }
}

impl<S: Into<String>, const N: usize> From<[S; N]> for ParamValue {
    fn from(values: [S; N]) -> Self {
        Self::List(values.into_iter().map(Into::into).collect())
    }
}

impl From<BoundingBox> for ParamValue {
    fn from(bounds: BoundingBox) -> Self {
        Self::Bounds(bounds)
    }
}

/// A geographic bounding box in decimal degrees.
///
/// Coordinates follow the usual `(west, south, east, north)` tuple order.
/// Only [`BoundingBox::new`] and the `TryFrom` impls construct one, so every
/// box holds finite coordinates with its lower-left corner not beyond its
/// upper-right corner.
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BoundingBox {
    min_lon: f64,
    min_lat: f64,
    max_lon: f64,
    max_lat: f64,
}

impl BoundingBox {
    /// Create a bounding box, rejecting non-finite coordinates and inverted corners.
    pub fn new(min_lon: f64, min_lat: f64, max_lon: f64, max_lat: f64) -> Result<Self> {
        let coords = [min_lon, min_lat, max_lon, max_lat];
        if let Some(bad) = coords.iter().find(|c| !c.is_finite()) {
            return Err(QueryError::InvalidBounds(format!(
                "coordinates must be finite, got {bad}"
            )));
        }
        if min_lon > max_lon || min_lat > max_lat {
            return Err(QueryError::InvalidBounds(format!(
                "lower-left corner ({min_lon}, {min_lat}) lies beyond \
                 upper-right corner ({max_lon}, {max_lat})"
            )));
        }
        Ok(Self {
            min_lon,
            min_lat,
            max_lon,
            max_lat,
        })
    }

    #[must_use]
    pub const fn min_lon(&self) -> f64 {
        self.min_lon
    }

    #[must_use]
    pub const fn min_lat(&self) -> f64 {
        self.min_lat
    }

    #[must_use]
    pub const fn max_lon(&self) -> f64 {
        self.max_lon
    }

    #[must_use]
    pub const fn max_lat(&self) -> f64 {
        self.max_lat
    }

    /// The coordinates as `(west, south, east, north)`.
    #[must_use]
    pub const fn as_tuple(&self) -> (f64, f64, f64, f64) {
        (self.min_lon, self.min_lat, self.max_lon, self.max_lat)
    }

    /// Move every edge `epsilon` towards the centre of the box.
    #[must_use]
    pub fn shaved(&self, epsilon: f64) -> Self {
        Self {
            min_lon: self.min_lon + epsilon,
            min_lat: self.min_lat + epsilon,
            max_lon: self.max_lon - epsilon,
            max_lat: self.max_lat - epsilon,
        }
    }
}

impl TryFrom<&[f64]> for BoundingBox {
    type Error = QueryError;

    fn try_from(coords: &[f64]) -> Result<Self> {
        match *coords {
            [min_lon, min_lat, max_lon, max_lat] => {
                Self::new(min_lon, min_lat, max_lon, max_lat)
            }
            _ => Err(QueryError::InvalidBounds(format!(
                "expected 4 coordinates, got {}",
                coords.len()
            ))),
        }
    }
}

impl TryFrom<(f64, f64, f64, f64)> for BoundingBox {
    type Error = QueryError;

    fn try_from((min_lon, min_lat, max_lon, max_lat): (f64, f64, f64, f64)) -> Result<Self> {
        Self::new(min_lon, min_lat, max_lon, max_lat)
    }
}

/// Boolean operator combining the items of a list value.
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Operator {
    And,
    Or,
    Not,
}

impl Operator {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::And => "AND",
            Self::Or => "OR",
            Self::Not => "NOT",
        }
    }
}

impl fmt::Display for Operator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Operator {
    type Err = QueryError;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "AND" => Ok(Self::And),
            "OR" => Ok(Self::Or),
            "NOT" => Ok(Self::Not),
            other => Err(QueryError::InvalidOperator(other.to_string())),
        }
    }
}
