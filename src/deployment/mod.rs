//! Deployment validation and commit
//!
//! Placement shares the phase machine's turn-legality and the board's
//! consistency invariants: wrong phase, wrong connection or an illegal
//! hex rejects the request without touching state. The commit applies
//! the category-specific placement rules and burns the turn.

use serde::{Deserialize, Serialize};

use crate::board::hex::{Facing, HexCoord};
use crate::core::error::{Result, RulesError};
use crate::core::types::{BoardId, PlayerId, UnitId};
use crate::game::Game;
use crate::phase::{Phase, Turn};
use crate::report::ReportKind;
use crate::unit::{Position, UnitKind};

/// Altitude a tactical drop comes in at, descent still in progress
pub const DROP_ALTITUDE: i32 = 3;

/// Velocity an aerospace craft enters the board with
pub const INITIAL_VELOCITY: i32 = 4;

/// A submitted placement
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DeploymentRequest {
    pub unit: UnitId,
    pub coords: HexCoord,
    pub board: BoardId,
    pub facing: Facing,
    pub elevation: i32,
    /// Already-owned units to carry in, loaded before placement
    pub loaded_units: Vec<UnitId>,
    pub tactical_drop: bool,
    pub connection: PlayerId,
}

/// Check a placement without mutating anything.
pub fn validate_placement(game: &Game, request: &DeploymentRequest) -> Result<()> {
    if game.phase != Phase::Deployment {
        return Err(RulesError::WrongPhase {
            required: Phase::Deployment,
            actual: game.phase,
        });
    }

    if game.turns.is_exhausted() {
        return Err(RulesError::NoActiveTurn);
    }
    if !game.turns.owns_current(request.connection) {
        return Err(RulesError::NotYourTurn(request.connection));
    }

    let unit = game.unit(request.unit)?;
    if unit.owner != request.connection {
        return Err(RulesError::NotYourTurn(request.connection));
    }
    if unit.deployed {
        return Err(RulesError::IllegalPosition("unit is already deployed".into()));
    }

    if request.board != game.board.id || !game.board.contains(&request.coords) {
        return Err(RulesError::IllegalPosition(format!(
            "hex {:?} is not on board {:?}",
            request.coords, request.board
        )));
    }

    let in_zone = game.board.in_deployment_zone(request.connection, &request.coords);
    let drop_allowed = request.tactical_drop && game.options.tactical_drops && unit.can_tactical_drop;
    if !in_zone && !drop_allowed {
        return Err(RulesError::IllegalPosition(format!(
            "hex {:?} is outside the deployment zone",
            request.coords
        )));
    }

    // Loaded units must be the same player's, still off the board, and
    // not already riding something.
    for loaded in &request.loaded_units {
        let l = game.unit(*loaded)?;
        if l.owner != request.connection || l.deployed || l.carried_by.is_some() {
            return Err(RulesError::IllegalLoad {
                loader: request.unit,
                loaded: *loaded,
            });
        }
    }

    Ok(())
}

/// Validate, then place the unit with its category rules and burn the
/// current turn.
pub fn commit_placement(game: &mut Game, request: &DeploymentRequest) -> Result<()> {
    validate_placement(game, request)?;

    let (round, phase) = (game.round, game.phase);

    // Attach the carried units first; they deploy with the transport.
    for loaded in &request.loaded_units {
        if let Some(l) = game.units.get_mut(loaded) {
            l.carried_by = Some(request.unit);
        }
        if let Some(u) = game.units.get_mut(&request.unit) {
            u.cargo.push(*loaded);
        }
        game.reports.push(
            round,
            phase,
            ReportKind::UnitLoaded {
                loader: request.unit,
                loaded: *loaded,
            },
        );
    }

    let elevation = placement_elevation(game, request);

    {
        let unit = game
            .units
            .get_mut(&request.unit)
            .ok_or(RulesError::UnknownUnit(request.unit))?;
        match unit.kind {
            UnitKind::Aerospace => {
                if unit.velocity == 0 {
                    unit.velocity = INITIAL_VELOCITY;
                } else {
                    // Off-board re-entry comes back inverted at half speed.
                    unit.velocity = -(unit.velocity / 2);
                }
            }
            _ => {
                if request.tactical_drop {
                    unit.drop_in_progress = true;
                }
            }
        }

        unit.position = Some(Position {
            board: request.board,
            coord: request.coords,
            facing: request.facing,
            elevation,
        });
        unit.deployed = true;
        unit.done = true;
    }

    enter_building(game, request.unit, request.coords);

    game.reports.push(
        round,
        phase,
        ReportKind::UnitDeployed {
            unit: request.unit,
            player: request.connection,
        },
    );
    game.turns.advance();
    Ok(())
}

/// Category-specific elevation for a commit.
fn placement_elevation(game: &Game, request: &DeploymentRequest) -> i32 {
    let Some(unit) = game.units.get(&request.unit) else {
        return request.elevation;
    };

    if request.tactical_drop && unit.kind != UnitKind::Aerospace {
        return DROP_ALTITUDE;
    }

    match unit.kind {
        UnitKind::Aerospace => request.elevation.max(1),
        UnitKind::Vehicle if unit.flight_capable => {
            // Climb one step at a time until the stack clears, capped at
            // the option ceiling.
            let mut elevation = request.elevation.max(0);
            let ceiling = game.options.stacking_climb_ceiling;
            while elevation < ceiling
                && stacking_violation(game, request.coords, elevation, request.unit)
            {
                elevation += 1;
            }
            elevation
        }
        _ => request.elevation,
    }
}

/// Another deployed unit already standing at this hex and level?
fn stacking_violation(game: &Game, coord: HexCoord, elevation: i32, exclude: UnitId) -> bool {
    game.units.values().any(|u| {
        u.id != exclude
            && u.deployed
            && !u.destroyed
            && u.position
                .map(|p| p.coord == coord && p.elevation == elevation)
                .unwrap_or(false)
    })
}

/// First entry into a building hex: roll the basement, drop into it,
/// and see whether the structure holds the weight.
fn enter_building(game: &mut Game, unit_id: UnitId, coord: HexCoord) {
    let (round, phase) = (game.round, game.phase);
    let basement_rolls = game.options.basement_rolls;
    let mass = game.units.get(&unit_id).map(|u| u.mass).unwrap_or(0);
    let airborne = game
        .units
        .get(&unit_id)
        .and_then(|u| u.position)
        .map(|p| p.elevation > 0)
        .unwrap_or(false);
    if airborne {
        return;
    }

    let Some(hex) = game.board.hex_mut(&coord) else {
        return;
    };
    let Some(building) = hex.building.as_mut() else {
        return;
    };

    let depth = if basement_rolls {
        building.roll_basement(&mut game.rng).depth()
    } else {
        0
    };
    let collapsed = building.check_collapse(mass);
    if collapsed {
        building.collapsed = true;
    }

    if depth > 0 {
        if let Some(unit) = game.units.get_mut(&unit_id) {
            if let Some(pos) = unit.position.as_mut() {
                pos.elevation = -(depth as i32);
            }
        }
        game.reports.push(round, phase, ReportKind::BasementRevealed { unit: unit_id, depth });
    }
    if collapsed {
        game.reports.push(round, phase, ReportKind::BuildingCollapsed { unit: unit_id });
    }
}

/// Detach a carried unit during deployment. The unloaded unit acts next:
/// its turn goes directly after the current index so ordering stays
/// unambiguous.
pub fn unload_during_deployment(
    game: &mut Game,
    loader: UnitId,
    loaded: UnitId,
    connection: PlayerId,
) -> Result<()> {
    if game.phase != Phase::Deployment {
        return Err(RulesError::WrongPhase {
            required: Phase::Deployment,
            actual: game.phase,
        });
    }

    let loader_unit = game.unit(loader)?;
    if loader_unit.owner != connection {
        return Err(RulesError::NotYourTurn(connection));
    }
    if !loader_unit.cargo.contains(&loaded) {
        return Err(RulesError::IllegalLoad { loader, loaded });
    }
    let loader_position = loader_unit.position;
    game.unit(loaded)?;

    {
        let l = game
            .units
            .get_mut(&loader)
            .ok_or(RulesError::UnknownUnit(loader))?;
        l.cargo.retain(|c| *c != loaded);
    }
    {
        let u = game
            .units
            .get_mut(&loaded)
            .ok_or(RulesError::UnknownUnit(loaded))?;
        u.carried_by = None;
        u.position = loader_position.map(|p| Position { elevation: 0, ..p });
        u.deployed = loader_position.is_some();
        u.done = false;
    }

    game.turns.insert_after_current(Turn::for_unit(connection, loaded));

    let (round, phase) = (game.round, game.phase);
    game.reports.push(round, phase, ReportKind::UnitUnloaded { loader, unloaded: loaded });
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::board::building::Building;
    use crate::board::DeploymentZone;
    use crate::unit::Unit;

    /// Drive the machine into the deployment phase with one unit queued
    fn deployment_game(unit: Unit) -> (Game, UnitId, PlayerId) {
        let mut game = Game::for_test();
        let player = unit.owner;
        let id = game.add_unit(unit);
        for _ in 0..4 {
            game.advance_phase();
        }
        assert_eq!(game.phase, Phase::Deployment);
        (game, id, player)
    }

    fn request(id: UnitId, player: PlayerId, coords: HexCoord) -> DeploymentRequest {
        DeploymentRequest {
            unit: id,
            coords,
            board: BoardId(0),
            facing: Facing::South,
            elevation: 0,
            loaded_units: vec![],
            tactical_drop: false,
            connection: player,
        }
    }

    #[test]
    fn test_commit_places_and_burns_turn() {
        let unit = Unit::walker("Lancer", PlayerId(1));
        let (mut game, id, player) = deployment_game(unit);

        game.submit_deployment(request(id, player, HexCoord::new(3, 3)))
            .expect("legal placement");
        let unit = game.units.get(&id).unwrap();
        assert!(unit.deployed);
        assert!(unit.done);
        assert_eq!(unit.position.unwrap().coord, HexCoord::new(3, 3));
        assert!(game.turns.is_exhausted());
    }

    #[test]
    fn test_wrong_phase_rejected_without_mutation() {
        let mut game = Game::for_test();
        let unit = Unit::walker("Lancer", PlayerId(1));
        let id = game.add_unit(unit);

        let err = game
            .submit_deployment(request(id, PlayerId(1), HexCoord::new(3, 3)))
            .unwrap_err();
        assert!(matches!(err, RulesError::WrongPhase { .. }));
        let unit = game.units.get(&id).unwrap();
        assert!(!unit.deployed);
        assert!(unit.position.is_none());
    }

    #[test]
    fn test_wrong_connection_rejected() {
        let unit = Unit::walker("Lancer", PlayerId(1));
        let (mut game, id, _) = deployment_game(unit);

        let err = game
            .submit_deployment(request(id, PlayerId(2), HexCoord::new(3, 3)))
            .unwrap_err();
        assert!(matches!(err, RulesError::NotYourTurn(_)));
        assert!(!game.units.get(&id).unwrap().deployed);
    }

    #[test]
    fn test_off_board_hex_rejected() {
        let unit = Unit::walker("Lancer", PlayerId(1));
        let (mut game, id, player) = deployment_game(unit);

        let err = game
            .submit_deployment(request(id, player, HexCoord::new(99, 99)))
            .unwrap_err();
        assert!(matches!(err, RulesError::IllegalPosition(_)));
    }

    #[test]
    fn test_zone_enforced_unless_tactical_drop() {
        let mut game = Game::for_test();
        game.options.tactical_drops = true;
        game.board.assign_zone(PlayerId(1), DeploymentZone::North);
        let squad = Unit::powered_armor_squad("Drop Squad", PlayerId(1));
        let id = game.add_unit(squad);
        for _ in 0..4 {
            game.advance_phase();
        }

        // Deep hex, no drop flag: rejected.
        let mut req = request(id, PlayerId(1), HexCoord::new(8, 12));
        assert!(game.submit_deployment(req.clone()).is_err());

        // Same hex as a tactical drop: allowed, fixed altitude, flagged.
        req.tactical_drop = true;
        game.submit_deployment(req).expect("drop is permitted");
        let unit = game.units.get(&id).unwrap();
        assert_eq!(unit.position.unwrap().elevation, DROP_ALTITUDE);
        assert!(unit.drop_in_progress);
    }

    #[test]
    fn test_aerospace_velocity_on_first_deploy_and_reentry() {
        let craft = Unit::aerospace("Fighter", PlayerId(1));
        let (mut game, id, player) = deployment_game(craft);

        let mut req = request(id, player, HexCoord::new(4, 1));
        req.elevation = 6;
        game.submit_deployment(req).expect("legal placement");
        {
            let unit = game.units.get(&id).unwrap();
            assert_eq!(unit.velocity, INITIAL_VELOCITY);
            assert_eq!(unit.position.unwrap().elevation, 6);
        }

        // Simulate leaving the board, then re-enter: inverted, halved.
        {
            let unit = game.units.get_mut(&id).unwrap();
            unit.deployed = false;
            unit.position = None;
        }
        game.turns.rebuild(vec![Turn::for_unit(player, id)]);
        let mut req = request(id, player, HexCoord::new(4, 2));
        req.elevation = 6;
        commit_placement(&mut game, &req).expect("re-entry");
        assert_eq!(game.units.get(&id).unwrap().velocity, -(INITIAL_VELOCITY / 2));
    }

    #[test]
    fn test_rotor_craft_climbs_over_stack() {
        let mut game = Game::for_test();
        let blocker = {
            let mut b = Unit::walker("Blocker", PlayerId(2));
            b.deployed = true;
            b.position = Some(Position {
                board: BoardId(0),
                coord: HexCoord::new(2, 2),
                facing: Facing::North,
                elevation: 0,
            });
            b
        };
        game.add_unit(blocker);
        let craft = Unit::rotor_craft("Gunship", PlayerId(1));
        let id = game.add_unit(craft);
        for _ in 0..4 {
            game.advance_phase();
        }

        let req = request(id, PlayerId(1), HexCoord::new(2, 2));
        game.submit_deployment(req).expect("climbs clear");
        assert_eq!(game.units.get(&id).unwrap().position.unwrap().elevation, 1);
    }

    #[test]
    fn test_building_entry_rolls_basement_once() {
        let mut game = Game::for_test();
        let coord = HexCoord::new(1, 1);
        game.board.hex_mut(&coord).unwrap().building = Some(Building::new(100, 2));
        let unit = Unit::walker("Lancer", PlayerId(1));
        let id = game.add_unit(unit);
        for _ in 0..4 {
            game.advance_phase();
        }

        game.submit_deployment(request(id, PlayerId(1), coord))
            .expect("legal placement");
        let basement = game
            .board
            .hex(&coord)
            .unwrap()
            .building
            .as_ref()
            .unwrap()
            .basement;
        assert!(basement.is_some(), "basement fixed on first entry");
    }

    #[test]
    fn test_overloaded_building_collapses_on_entry() {
        let mut game = Game::for_test();
        let coord = HexCoord::new(1, 1);
        game.board.hex_mut(&coord).unwrap().building = Some(Building::new(20, 1));
        let unit = Unit::walker("Lancer", PlayerId(1));
        let id = game.add_unit(unit);
        for _ in 0..4 {
            game.advance_phase();
        }

        game.submit_deployment(request(id, PlayerId(1), coord))
            .expect("legal placement");
        assert!(game.board.hex(&coord).unwrap().building.as_ref().unwrap().collapsed);
        assert!(game
            .reports
            .iter()
            .any(|r| matches!(r.kind, ReportKind::BuildingCollapsed { .. })));
    }

    #[test]
    fn test_loading_attaches_cargo() {
        let mut game = Game::for_test();
        let carrier = Unit::vehicle("Carrier", PlayerId(1));
        let cid = game.add_unit(carrier);
        let squad = Unit::infantry_squad("Riders", PlayerId(1));
        let sid = game.add_unit(squad);
        for _ in 0..4 {
            game.advance_phase();
        }

        let mut req = request(cid, PlayerId(1), HexCoord::new(2, 1));
        req.loaded_units = vec![sid];
        game.submit_deployment(req).expect("legal placement");
        assert_eq!(game.units.get(&sid).unwrap().carried_by, Some(cid));
        assert!(game.units.get(&cid).unwrap().cargo.contains(&sid));
    }

    #[test]
    fn test_unload_inserts_follow_up_turn() {
        let mut game = Game::for_test();
        let carrier = Unit::vehicle("Carrier", PlayerId(1));
        let cid = game.add_unit(carrier);
        let squad = Unit::infantry_squad("Riders", PlayerId(1));
        let sid = game.add_unit(squad);
        for _ in 0..4 {
            game.advance_phase();
        }

        let mut req = request(cid, PlayerId(1), HexCoord::new(2, 1));
        req.loaded_units = vec![sid];
        game.submit_deployment(req).expect("legal placement");
        let turns_before = game.turns.len();

        game.submit_unload_during_deployment(cid, sid, PlayerId(1))
            .expect("legal unload");
        assert_eq!(game.turns.len(), turns_before + 1);

        // The inserted turn sits directly after the current index and is
        // bound to the unloaded unit.
        game.turns.advance();
        let t = game.turns.current().expect("follow-up turn");
        assert_eq!(t.unit, Some(sid));
        // The unloaded squad stands in the carrier's hex.
        assert_eq!(
            game.units.get(&sid).unwrap().position.unwrap().coord,
            HexCoord::new(2, 1)
        );
    }

    #[test]
    fn test_unload_outside_deployment_rejected() {
        let mut game = Game::for_test();
        let carrier = Unit::vehicle("Carrier", PlayerId(1));
        let cid = game.add_unit(carrier);
        let squad = Unit::infantry_squad("Riders", PlayerId(1));
        let sid = game.add_unit(squad);

        let err = game
            .submit_unload_during_deployment(cid, sid, PlayerId(1))
            .unwrap_err();
        assert!(matches!(err, RulesError::WrongPhase { .. }));
    }

    #[test]
    fn test_unload_by_non_owner_rejected() {
        let mut game = Game::for_test();
        let mut carrier = Unit::vehicle("Carrier", PlayerId(1));
        let squad = Unit::infantry_squad("Riders", PlayerId(1));
        let sid = squad.id;
        carrier.cargo.push(sid);
        let cid = game.add_unit(carrier);
        game.add_unit(squad);
        for _ in 0..4 {
            game.advance_phase();
        }

        let err = game
            .submit_unload_during_deployment(cid, sid, PlayerId(2))
            .unwrap_err();
        assert!(matches!(err, RulesError::NotYourTurn(_)));
    }
}
