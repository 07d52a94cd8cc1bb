//! Hex coordinate system (axial coordinates)
//!
//! Uses axial coordinates (q, r) for easy neighbor calculation.

use serde::{Deserialize, Serialize};

/// Axial hex coordinate
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
pub struct HexCoord {
    pub q: i32,
    pub r: i32,
}

impl HexCoord {
    pub fn new(q: i32, r: i32) -> Self {
        Self { q, r }
    }

    /// Cube coordinate S (derived from q and r)
    pub fn s(&self) -> i32 {
        -self.q - self.r
    }

    /// Manhattan distance in hex space
    pub fn distance(&self, other: &Self) -> u32 {
        let dq = (self.q - other.q).abs();
        let dr = (self.r - other.r).abs();
        let ds = (self.s() - other.s()).abs();
        ((dq + dr + ds) / 2) as u32
    }

    /// Get all 6 neighboring hex coordinates
    pub fn neighbors(&self) -> [HexCoord; 6] {
        Facing::all().map(|f| self.offset(f))
    }

    /// The adjacent hex in the given facing
    pub fn offset(&self, facing: Facing) -> HexCoord {
        let d = facing.delta();
        HexCoord::new(self.q + d.q, self.r + d.r)
    }
}

/// One of the six hex facings
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
pub enum Facing {
    #[default]
    North,
    NorthEast,
    SouthEast,
    South,
    SouthWest,
    NorthWest,
}

impl Facing {
    /// Hex offset for this facing
    pub fn delta(&self) -> HexCoord {
        match self {
            Facing::North => HexCoord::new(0, -1),
            Facing::NorthEast => HexCoord::new(1, -1),
            Facing::SouthEast => HexCoord::new(1, 0),
            Facing::South => HexCoord::new(0, 1),
            Facing::SouthWest => HexCoord::new(-1, 1),
            Facing::NorthWest => HexCoord::new(-1, 0),
        }
    }

    /// Facing after turning 180 degrees
    pub fn opposite(&self) -> Self {
        match self {
            Facing::North => Facing::South,
            Facing::NorthEast => Facing::SouthWest,
            Facing::SouthEast => Facing::NorthWest,
            Facing::South => Facing::North,
            Facing::SouthWest => Facing::NorthEast,
            Facing::NorthWest => Facing::SouthEast,
        }
    }

    /// All facings, clockwise from north
    pub fn all() -> [Facing; 6] {
        [
            Facing::North,
            Facing::NorthEast,
            Facing::SouthEast,
            Facing::South,
            Facing::SouthWest,
            Facing::NorthWest,
        ]
    }

    /// Facing from a d6-style roll (1-6)
    pub fn from_roll(roll: u32) -> Self {
        Self::all()[(roll as usize).saturating_sub(1) % 6]
    }
}
