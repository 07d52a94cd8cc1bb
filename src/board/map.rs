//! Board: a bounded field of hexes with terrain and buildings

use ahash::AHashMap;
use serde::{Deserialize, Serialize};

use crate::board::building::Building;
use crate::board::hex::HexCoord;
use crate::core::types::{BoardId, PlayerId};

/// Terrain class of a hex
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
pub enum Terrain {
    #[default]
    Clear,
    Woods,
    Rough,
    Water,
    Pavement,
    Rubble,
}

impl Terrain {
    /// Open terrain leaves infantry exposed to blast doubling
    pub fn is_open(&self) -> bool {
        matches!(self, Terrain::Clear | Terrain::Pavement)
    }
}

/// Board-edge deployment zone assignment
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum DeploymentZone {
    North,
    South,
    East,
    West,
    Center,
    Any,
}

/// One hex of the board
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct Hex {
    pub terrain: Terrain,
    /// Ground level relative to board datum
    pub elevation: i32,
    /// Depth for water hexes, 0 otherwise
    pub water_depth: u32,
    pub building: Option<Building>,
    /// Wreckage deposited by destroyed limbs and units
    pub debris: u32,
}

/// A bounded hex field
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Board {
    pub id: BoardId,
    pub width: i32,
    pub height: i32,
    hexes: AHashMap<HexCoord, Hex>,
    /// Which zone each player deploys in
    zones: AHashMap<PlayerId, DeploymentZone>,
}

impl Board {
    /// Create a board of clear terrain
    pub fn new(id: BoardId, width: i32, height: i32) -> Self {
        let mut hexes = AHashMap::default();
        for q in 0..width {
            for r in 0..height {
                hexes.insert(HexCoord::new(q, r), Hex::default());
            }
        }
        Self {
            id,
            width,
            height,
            hexes,
            zones: AHashMap::default(),
        }
    }

    pub fn contains(&self, coord: &HexCoord) -> bool {
        self.hexes.contains_key(coord)
    }

    pub fn hex(&self, coord: &HexCoord) -> Option<&Hex> {
        self.hexes.get(coord)
    }

    pub fn hex_mut(&mut self, coord: &HexCoord) -> Option<&mut Hex> {
        self.hexes.get_mut(coord)
    }

    pub fn assign_zone(&mut self, player: PlayerId, zone: DeploymentZone) {
        self.zones.insert(player, zone);
    }

    pub fn zone_of(&self, player: PlayerId) -> DeploymentZone {
        self.zones.get(&player).copied().unwrap_or(DeploymentZone::Any)
    }

    /// Is `coord` inside `player`'s deployment zone?
    ///
    /// Edge zones are three hexes deep, matching the board setup rules.
    pub fn in_deployment_zone(&self, player: PlayerId, coord: &HexCoord) -> bool {
        if !self.contains(coord) {
            return false;
        }
        const DEPTH: i32 = 3;
        match self.zone_of(player) {
            DeploymentZone::Any => true,
            DeploymentZone::North => coord.r < DEPTH,
            DeploymentZone::South => coord.r >= self.height - DEPTH,
            DeploymentZone::West => coord.q < DEPTH,
            DeploymentZone::East => coord.q >= self.width - DEPTH,
            DeploymentZone::Center => {
                coord.q >= self.width / 3
                    && coord.q < self.width * 2 / 3
                    && coord.r >= self.height / 3
                    && coord.r < self.height * 2 / 3
            }
        }
    }

    /// Drop wreckage into a hex (severed limbs, destroyed units)
    pub fn deposit_debris(&mut self, coord: &HexCoord, amount: u32) {
        if let Some(hex) = self.hexes.get_mut(coord) {
            hex.debris += amount;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_board_bounds() {
        let board = Board::new(BoardId(0), 10, 10);
        assert!(board.contains(&HexCoord::new(0, 0)));
        assert!(board.contains(&HexCoord::new(9, 9)));
        assert!(!board.contains(&HexCoord::new(10, 0)));
        assert!(!board.contains(&HexCoord::new(-1, 0)));
    }

    #[test]
    fn test_north_zone() {
        let mut board = Board::new(BoardId(0), 10, 10);
        board.assign_zone(PlayerId(1), DeploymentZone::North);
        assert!(board.in_deployment_zone(PlayerId(1), &HexCoord::new(5, 0)));
        assert!(board.in_deployment_zone(PlayerId(1), &HexCoord::new(5, 2)));
        assert!(!board.in_deployment_zone(PlayerId(1), &HexCoord::new(5, 3)));
    }

    #[test]
    fn test_unassigned_player_deploys_anywhere() {
        let board = Board::new(BoardId(0), 10, 10);
        assert!(board.in_deployment_zone(PlayerId(9), &HexCoord::new(5, 5)));
    }

    #[test]
    fn test_debris_accumulates() {
        let mut board = Board::new(BoardId(0), 4, 4);
        let c = HexCoord::new(1, 1);
        board.deposit_debris(&c, 2);
        board.deposit_debris(&c, 3);
        assert_eq!(board.hex(&c).unwrap().debris, 5);
    }

    #[test]
    fn test_open_terrain() {
        assert!(Terrain::Clear.is_open());
        assert!(!Terrain::Woods.is_open());
    }
}
