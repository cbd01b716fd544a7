use serde::{Deserialize, Serialize};
use std::fmt;

/// Name of the group every fresh store starts with.
pub const DEFAULT_GROUP: &str = "default";

/// A recorded click. Each coordinate is either a pixel position or absent.
///
/// Points built through [`Point::new`] are either fully present or fully
/// absent. Points read back from a file may be one-sided; see
/// [`Point::from_parts`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Point {
    pub x: Option<i64>,
    pub y: Option<i64>,
}

impl Point {
    /// Validating constructor used by the live mutation path.
    pub fn new(x: Option<i64>, y: Option<i64>) -> StoreResult<Self> {
        if x.is_some() != y.is_some() {
            return Err(StoreError::InvalidArgument(format!(
                "one-sided coordinate ({}, {})",
                Coord(x),
                Coord(y)
            )));
        }
        Ok(Self { x, y })
    }

    pub fn at(x: i64, y: i64) -> Self {
        Self {
            x: Some(x),
            y: Some(y),
        }
    }

    /// Marker recorded for a secondary action that carries no position.
    pub fn placeholder() -> Self {
        Self { x: None, y: None }
    }

    /// Lenient constructor for file input; accepts one-sided points.
    pub fn from_parts(x: Option<i64>, y: Option<i64>) -> Self {
        Self { x, y }
    }

    /// Rounds floating viewer coordinates to the nearest pixel.
    pub fn from_f64(x: f64, y: f64) -> StoreResult<Self> {
        Ok(Self::at(round_coordinate(x)?, round_coordinate(y)?))
    }

    pub fn is_placeholder(&self) -> bool {
        self.x.is_none() && self.y.is_none()
    }

    /// Both coordinates, when the point carries a full position.
    pub fn coords(&self) -> Option<(i64, i64)> {
        self.x.zip(self.y)
    }
}

impl fmt::Display for Point {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({}, {})", Coord(self.x), Coord(self.y))
    }
}

struct Coord(Option<i64>);

impl fmt::Display for Coord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.0 {
            Some(value) => write!(f, "{}", value),
            None => f.write_str("-"),
        }
    }
}

fn round_coordinate(value: f64) -> StoreResult<i64> {
    let rounded = value.round();
    // i64::MAX is not representable as f64, so the upper bound is exclusive.
    if !rounded.is_finite() || rounded < i64::MIN as f64 || rounded >= i64::MAX as f64 {
        return Err(StoreError::InvalidArgument(format!(
            "coordinate {} is not a pixel position",
            value
        )));
    }
    Ok(rounded as i64)
}

/// Error type shared by every store and codec operation.
#[derive(thiserror::Error, Debug)]
pub enum StoreError {
    #[error("invalid argument: {0}")]
    InvalidArgument(String),
    #[error("group '{0}' does not exist")]
    NotFound(String),
    #[error("index {index} out of range for group '{group}' with {len} clicks")]
    OutOfRange {
        group: String,
        index: usize,
        len: usize,
    },
    #[error("group '{0}' already exists")]
    Conflict(String),
    #[error("i/o failure: {0}")]
    Io(#[from] std::io::Error),
    #[error("malformed csv: {0}")]
    Format(String),
    #[error("line {line}: cannot parse {field} value '{value}' as an integer")]
    Parse {
        line: u64,
        field: &'static str,
        value: String,
    },
}

pub type StoreResult<T> = Result<T, StoreError>;
