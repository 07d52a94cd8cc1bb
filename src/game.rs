//! The shared match aggregate and its command entry points
//!
//! One `Game` per match, one logical writer. Remote submissions arrive
//! through the four command entry points; each is validated against the
//! current turn owner before anything mutates. A rejected action changes
//! nothing and leaves a resynchronization record for the submitter.

use ahash::AHashMap;
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;
use serde::{Deserialize, Serialize};

use crate::board::{Board, HexCoord};
use crate::core::config::{GameOptions, PlanetaryConditions};
use crate::core::error::{Result, RulesError};
use crate::core::types::{BoardId, PlayerId, Round, UnitId};
use crate::damage::{self, DamageEvent};
use crate::deployment::{self, DeploymentRequest};
use crate::phase::{handlers, Phase, TurnQueue};
use crate::report::{Report, ReportKind, ReportLog};
use crate::unit::Unit;

/// One player in the match. Connections map one-to-one onto players.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Player {
    pub id: PlayerId,
    pub connected: bool,
    /// Minefields left to place during the minefield phase
    pub minefields: u32,
}

impl Player {
    pub fn new(id: PlayerId) -> Self {
        Self {
            id,
            connected: true,
            minefields: 0,
        }
    }
}

/// A burning flare lighting the field for a few rounds
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Flare {
    pub coord: HexCoord,
    pub rounds_left: u32,
}

/// Authoritative match state. Persistence of the aggregate itself is an
/// external concern; only reports leave this core.
#[derive(Debug, Clone)]
pub struct Game {
    pub board: Board,
    pub units: AHashMap<UnitId, Unit>,
    pub players: Vec<Player>,
    pub options: GameOptions,
    pub conditions: PlanetaryConditions,
    pub phase: Phase,
    pub round: Round,
    pub turns: TurnQueue,
    pub initiative_order: Vec<PlayerId>,
    pub flares: Vec<Flare>,
    pub reports: ReportLog,
    pub rng: ChaCha8Rng,
}

impl Game {
    pub fn new(board: Board, options: GameOptions, conditions: PlanetaryConditions, seed: u64) -> Self {
        Self {
            board,
            units: AHashMap::default(),
            players: Vec::new(),
            options,
            conditions,
            phase: Phase::Lounge,
            round: 0,
            turns: TurnQueue::new(),
            initiative_order: Vec::new(),
            flares: Vec::new(),
            reports: ReportLog::new(),
            rng: ChaCha8Rng::seed_from_u64(seed),
        }
    }

    /// Small two-player fixture shared by the test modules
    pub fn for_test() -> Self {
        let board = Board::new(BoardId(0), 16, 16);
        let mut game = Self::new(board, GameOptions::default(), PlanetaryConditions::default(), 42);
        game.add_player(Player::new(PlayerId(1)));
        game.add_player(Player::new(PlayerId(2)));
        game
    }

    pub fn add_player(&mut self, player: Player) {
        self.players.push(player);
    }

    pub fn add_unit(&mut self, unit: Unit) -> UnitId {
        let id = unit.id;
        self.units.insert(id, unit);
        id
    }

    pub fn unit(&self, id: UnitId) -> Result<&Unit> {
        self.units.get(&id).ok_or(RulesError::UnknownUnit(id))
    }

    pub fn unit_mut(&mut self, id: UnitId) -> Result<&mut Unit> {
        self.units.get_mut(&id).ok_or(RulesError::UnknownUnit(id))
    }

    /// Append a resynchronization record for a rejected submitter.
    pub fn resync(&mut self, player: PlayerId) {
        let (round, phase) = (self.round, self.phase);
        let turn_index = self.turns.current_index();
        self.reports.push(round, phase, ReportKind::Resync { player, phase, turn_index });
    }

    // === COMMAND ENTRY POINTS ===

    /// Validate and commit a deployment. Rejection mutates nothing beyond
    /// the resync record.
    pub fn submit_deployment(&mut self, request: DeploymentRequest) -> Result<&[Report]> {
        let mark = self.reports.len();
        match deployment::commit_placement(self, &request) {
            Ok(()) => Ok(self.reports.since(mark)),
            Err(e) => {
                tracing::warn!(error = %e, "deployment rejected");
                self.resync(request.connection);
                Err(e)
            }
        }
    }

    /// Detach a carried unit during deployment and schedule its follow-up
    /// turn directly after the current one.
    pub fn submit_unload_during_deployment(
        &mut self,
        loader: UnitId,
        loaded: UnitId,
        connection: PlayerId,
    ) -> Result<&[Report]> {
        let mark = self.reports.len();
        match deployment::unload_during_deployment(self, loader, loaded, connection) {
            Ok(()) => Ok(self.reports.since(mark)),
            Err(e) => {
                tracing::warn!(error = %e, "unload rejected");
                self.resync(connection);
                Err(e)
            }
        }
    }

    /// Apply a damage event. Always succeeds for known units; anomalies
    /// degrade to logged no-ops inside the engine.
    pub fn apply_damage(&mut self, event: DamageEvent) -> &[Report] {
        let mark = self.reports.len();
        damage::resolve(self, event);
        self.reports.since(mark)
    }

    /// Run the current phase's successor logic and return the new phase.
    pub fn advance_phase(&mut self) -> Phase {
        handlers::advance(self)
    }

    // === QUERIES FOR THE END-OF-ROUND STEPS ===

    /// Buildings that collapsed but whose consequences are unresolved
    pub fn board_collapses(&self) -> Vec<(HexCoord, u32)> {
        self.board_coords()
            .into_iter()
            .filter_map(|coord| {
                let hex = self.board.hex(&coord)?;
                let b = hex.building.as_ref()?;
                if b.collapsed && !b.collapse_resolved {
                    Some((coord, b.height))
                } else {
                    None
                }
            })
            .collect()
    }

    pub fn board_coords(&self) -> Vec<HexCoord> {
        let mut coords = Vec::new();
        for q in 0..self.board.width {
            for r in 0..self.board.height {
                coords.push(HexCoord::new(q, r));
            }
        }
        coords
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::damage::{DamageKind, HitData};
    use crate::unit::location::CENTER_TORSO;

    #[test]
    fn test_apply_damage_returns_new_reports() {
        let mut game = Game::for_test();
        let unit = Unit::walker("Target", PlayerId(1));
        let id = game.add_unit(unit);

        let reports =
            game.apply_damage(DamageEvent::new(id, HitData::front(CENTER_TORSO), 5, DamageKind::Standard));
        assert!(!reports.is_empty());
        assert!(reports
            .iter()
            .any(|r| matches!(r.kind, ReportKind::ArmorAbsorbed { .. })));
    }

    #[test]
    fn test_unknown_unit_lookup_errors() {
        let game = Game::for_test();
        assert!(matches!(
            game.unit(UnitId::new()),
            Err(RulesError::UnknownUnit(_))
        ));
    }

    #[test]
    fn test_resync_records_phase_and_turn() {
        let mut game = Game::for_test();
        game.resync(PlayerId(1));
        assert!(game.reports.iter().any(|r| matches!(
            r.kind,
            ReportKind::Resync { player: PlayerId(1), .. }
        )));
    }

    #[test]
    fn test_same_seed_same_rolls() {
        let mut a = Game::for_test();
        let mut b = Game::for_test();
        a.advance_phase();
        b.advance_phase();
        assert_eq!(a.initiative_order, b.initiative_order);
    }
}
