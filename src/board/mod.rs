//! Board model - hexes, terrain, buildings
//!
//! Boards are addressed by `BoardId`; hexes by axial coordinates. The board
//! answers legality and terrain queries; it does not know about units
//! beyond the debris they leave behind.

pub mod building;
pub mod hex;
pub mod map;

pub use building::{Basement, Building};
pub use hex::{Facing, HexCoord};
pub use map::{Board, DeploymentZone, Hex, Terrain};
