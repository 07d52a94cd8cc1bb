//! Integration tests for deployment through the command entry points

use hexmarch::board::{DeploymentZone, Facing, HexCoord};
use hexmarch::core::error::RulesError;
use hexmarch::core::types::{BoardId, PlayerId};
use hexmarch::deployment::DeploymentRequest;
use hexmarch::game::Game;
use hexmarch::phase::Phase;
use hexmarch::report::ReportKind;
use hexmarch::unit::Unit;

fn request(unit: hexmarch::core::types::UnitId, player: PlayerId, coords: HexCoord) -> DeploymentRequest {
    DeploymentRequest {
        unit,
        coords,
        board: BoardId(0),
        facing: Facing::South,
        elevation: 0,
        loaded_units: vec![],
        tactical_drop: false,
        connection: player,
    }
}

fn advance_to_deployment(game: &mut Game) {
    while game.phase != Phase::Deployment {
        game.advance_phase();
    }
}

#[test]
fn rejection_outside_deployment_phase_changes_nothing() {
    let mut game = Game::for_test();
    let unit = Unit::walker("Lancer", PlayerId(1));
    let id = game.add_unit(unit);

    // Still in the lounge: rejected, no position, resync recorded.
    let err = game
        .submit_deployment(request(id, PlayerId(1), HexCoord::new(3, 3)))
        .unwrap_err();
    assert!(matches!(err, RulesError::WrongPhase { .. }));

    let unit = game.units.get(&id).unwrap();
    assert!(unit.position.is_none());
    assert!(!unit.deployed);
    assert!(game
        .reports
        .iter()
        .any(|r| matches!(r.kind, ReportKind::Resync { player: PlayerId(1), .. })));
}

#[test]
fn non_owner_rejected_and_resynced() {
    let mut game = Game::for_test();
    let unit = Unit::walker("Lancer", PlayerId(1));
    let id = game.add_unit(unit);
    advance_to_deployment(&mut game);

    let err = game
        .submit_deployment(request(id, PlayerId(2), HexCoord::new(3, 3)))
        .unwrap_err();
    assert!(matches!(err, RulesError::NotYourTurn(_)));
    assert!(!game.units.get(&id).unwrap().deployed);
}

#[test]
fn legal_deployment_emits_report_and_position() {
    let mut game = Game::for_test();
    game.board.assign_zone(PlayerId(1), DeploymentZone::North);
    let unit = Unit::walker("Lancer", PlayerId(1));
    let id = game.add_unit(unit);
    advance_to_deployment(&mut game);

    let reports: Vec<_> = game
        .submit_deployment(request(id, PlayerId(1), HexCoord::new(5, 1)))
        .expect("legal placement")
        .to_vec();

    assert!(reports
        .iter()
        .any(|r| matches!(r.kind, ReportKind::UnitDeployed { unit, .. } if unit == id)));
    let unit = game.units.get(&id).unwrap();
    assert_eq!(unit.position.unwrap().coord, HexCoord::new(5, 1));
    assert_eq!(unit.position.unwrap().facing, Facing::South);
}

#[test]
fn unload_schedules_follow_up_and_loader_state_is_independent() {
    let mut game = Game::for_test();
    let carrier = Unit::vehicle("Carrier", PlayerId(1));
    let cid = game.add_unit(carrier);
    let squad = Unit::infantry_squad("Riders", PlayerId(1));
    let sid = game.add_unit(squad);
    advance_to_deployment(&mut game);

    let mut req = request(cid, PlayerId(1), HexCoord::new(4, 2));
    req.loaded_units = vec![sid];
    game.submit_deployment(req).expect("carrier deploys with cargo");

    let index_before = game.turns.current_index();
    let len_before = game.turns.len();
    let carrier_pos = game.units.get(&cid).unwrap().position;

    let reports: Vec<_> = game
        .submit_unload_during_deployment(cid, sid, PlayerId(1))
        .expect("legal unload")
        .to_vec();

    // Exactly one new turn, directly after the current index, bound to
    // the unloaded unit.
    assert_eq!(game.turns.len(), len_before + 1);
    assert_eq!(game.turns.current_index(), index_before);
    assert!(reports
        .iter()
        .any(|r| matches!(r.kind, ReportKind::UnitUnloaded { unloaded, .. } if unloaded == sid)));

    // Loader keeps its own position and cargo list updates independently.
    let carrier = game.units.get(&cid).unwrap();
    assert_eq!(carrier.position, carrier_pos);
    assert!(carrier.cargo.is_empty());
    let squad = game.units.get(&sid).unwrap();
    assert!(squad.carried_by.is_none());
    assert_eq!(squad.position.unwrap().coord, carrier_pos.unwrap().coord);
}

#[test]
fn tactical_drop_needs_option_unit_rating_and_flag() {
    let mut game = Game::for_test();
    game.board.assign_zone(PlayerId(1), DeploymentZone::North);
    let squad = Unit::powered_armor_squad("Drop Squad", PlayerId(1));
    let id = game.add_unit(squad);
    advance_to_deployment(&mut game);

    // Option off: drop outside the zone is rejected.
    let mut req = request(id, PlayerId(1), HexCoord::new(8, 10));
    req.tactical_drop = true;
    assert!(game.submit_deployment(req.clone()).is_err());

    // Option on: the same request lands.
    game.options.tactical_drops = true;
    game.submit_deployment(req).expect("drop permitted by option");
    let unit = game.units.get(&id).unwrap();
    assert!(unit.drop_in_progress);
    assert_eq!(unit.position.unwrap().elevation, hexmarch::deployment::DROP_ALTITUDE);
}
