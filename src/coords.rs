use std::fmt;

use serde::{Deserialize, Serialize};
use strum::{Display, EnumIter, EnumString};

#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, EnumString, Display, EnumIter,
)]
#[strum(serialize_all = "SCREAMING_SNAKE_CASE")]
pub enum Direction {
    East,
    SouthEast,
    SouthWest,
    West,
    NorthWest,
    NorthEast,
}

impl Direction {
    pub const ALL: [Direction; 6] = [
        Direction::East,
        Direction::SouthEast,
        Direction::SouthWest,
        Direction::West,
        Direction::NorthWest,
        Direction::NorthEast,
    ];

    pub const fn unit_vector(self) -> CubeCoord {
        match self {
            Direction::East => CubeCoord { q: 1, r: -1, s: 0 },
            Direction::SouthEast => CubeCoord { q: 0, r: -1, s: 1 },
            Direction::SouthWest => CubeCoord { q: -1, r: 0, s: 1 },
            Direction::West => CubeCoord { q: -1, r: 1, s: 0 },
            Direction::NorthWest => CubeCoord { q: 0, r: 1, s: -1 },
            Direction::NorthEast => CubeCoord { q: 1, r: 0, s: -1 },
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct CubeCoord {
    pub q: i32,
    pub r: i32,
    pub s: i32,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
#[error("cube coordinate ({q}, {r}, {s}) does not sum to zero")]
pub struct InvalidCoordinate {
    pub q: i32,
    pub r: i32,
    pub s: i32,
}

impl CubeCoord {
    pub const ORIGIN: CubeCoord = CubeCoord { q: 0, r: 0, s: 0 };

    /// Panics when `q + r + s != 0`; templates are static data, so a bad
    /// coordinate is a programming error.
    pub fn new(q: i32, r: i32, s: i32) -> Self {
        match Self::try_new(q, r, s) {
            Ok(coord) => coord,
            Err(err) => panic!("{err}"),
        }
    }

    pub fn try_new(q: i32, r: i32, s: i32) -> Result<Self, InvalidCoordinate> {
        if q + r + s != 0 {
            return Err(InvalidCoordinate { q, r, s });
        }
        Ok(Self { q, r, s })
    }

    pub fn is_valid(self) -> bool {
        self.q + self.r + self.s == 0
    }

    pub fn add(self, other: CubeCoord) -> Self {
        Self {
            q: self.q + other.q,
            r: self.r + other.r,
            s: self.s + other.s,
        }
    }

    pub fn neighbor(self, direction: Direction) -> Self {
        self.add(direction.unit_vector())
    }

    pub fn neighbors(self) -> impl Iterator<Item = (Direction, CubeCoord)> {
        Direction::ALL
            .into_iter()
            .map(move |direction| (direction, self.neighbor(direction)))
    }

    pub fn distance(self, other: CubeCoord) -> i32 {
        ((self.q - other.q).abs() + (self.r - other.r).abs() + (self.s - other.s).abs()) / 2
    }
}

impl Default for CubeCoord {
    fn default() -> Self {
        CubeCoord::ORIGIN
    }
}

impl fmt::Display for CubeCoord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({}, {}, {})", self.q, self.r, self.s)
    }
}
