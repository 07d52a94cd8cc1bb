//! End-of-round bulk resolution
//!
//! Runs the fixed step sequence that closes a round. Several steps feed
//! the damage engine; all of them only log and mutate, none can fail.

use rand::Rng;

use crate::core::dice::two_d6;
use crate::core::types::UnitId;
use crate::damage::criticals::{self, DestructionCause};
use crate::damage::{self, DamageEvent, DamageKind, HitData};
use crate::game::Game;
use crate::report::ReportKind;
use crate::unit::location::{LocationId, HEAD};
use crate::unit::{MotiveStatus, UnitKind};

/// Damage a collapsing building deals per level of height
const COLLAPSE_DAMAGE_PER_LEVEL: u32 = 2;

/// Debris beyond this turns a hex to rubble
const RUBBLE_THRESHOLD: u32 = 10;

/// Run every end-of-round step in fixed order.
pub fn run(game: &mut Game) {
    resolve_heat(game);
    resolve_environment(game);
    resolve_control(game);
    resolve_traitors(game);
    resolve_cookoff(game);
    resolve_equipment_cooldowns(game);
    resolve_suffocation(game);
    determine_wind(game);
    resolve_building_damage(game);
    age_flares(game);
    resolve_ammo_dumps(game);
    resolve_crews(game);
    resolve_industrial(game);
    resolve_pickups(game);
    process_terrain(game);
}

/// Heat dissipates through sinks; what remains can force a shutdown.
fn resolve_heat(game: &mut Game) {
    let (round, phase) = (game.round, game.phase);
    let threshold = game.options.shutdown_threshold;
    let hot: Vec<UnitId> = game
        .units
        .values()
        .filter(|u| {
            matches!(u.kind, UnitKind::Walker | UnitKind::LightBiped) && !u.destroyed && u.deployed
        })
        .map(|u| u.id)
        .collect();

    for id in hot {
        let Some(unit) = game.units.get_mut(&id) else {
            continue;
        };
        unit.heat = (unit.heat - unit.heat_sinks as i32).max(0);
        let heat = unit.heat;
        game.reports.push(round, phase, ReportKind::HeatResolved { unit: id, heat });

        if heat >= threshold {
            let roll = two_d6(&mut game.rng);
            let target = 4 + (heat - threshold) / 4;
            let shut_down = (roll as i32) < target;
            if let Some(unit) = game.units.get_mut(&id) {
                if shut_down {
                    unit.shut_down = true;
                }
            }
            game.reports.push(round, phase, ReportKind::ShutdownCheck { unit: id, shut_down });
        }
    }
}

/// Exposure damage from temperature extremes.
fn resolve_environment(game: &mut Game) {
    if (-30..=50).contains(&game.conditions.temperature) {
        return;
    }
    let exposed: Vec<UnitId> = game
        .units
        .values()
        .filter(|u| u.kind == UnitKind::Infantry && !u.destroyed && u.deployed)
        .map(|u| u.id)
        .collect();
    for id in exposed {
        damage::resolve(
            game,
            DamageEvent::new(id, HitData::front(LocationId(0)), 1, DamageKind::Standard),
        );
    }
}

/// Units that lost control this round come down.
fn resolve_control(game: &mut Game) {
    let falling: Vec<UnitId> = game
        .units
        .values()
        .filter(|u| {
            !u.destroyed
                && u.position.map(|p| p.elevation > 0).unwrap_or(false)
                && ((u.flight_capable && u.motive >= MotiveStatus::Heavy)
                    || u.shut_down
                    || !u.crew.active())
        })
        .map(|u| u.id)
        .collect();

    for id in falling {
        let elevation = game
            .units
            .get(&id)
            .and_then(|u| u.position)
            .map(|p| p.elevation.max(0) as u32)
            .unwrap_or(0);
        criticals::force_grounding(game, id);
        if elevation > 0 {
            damage::resolve(
                game,
                DamageEvent::new(
                    id,
                    HitData::front(LocationId(0)),
                    elevation * 2,
                    DamageKind::Physical,
                ),
            );
        }
    }
}

/// Scheduled defections flip ownership.
fn resolve_traitors(game: &mut Game) {
    for unit in game.units.values_mut() {
        if let Some(new_owner) = unit.traitor_to.take() {
            tracing::info!(unit = %unit.name, ?new_owner, "unit defected");
            unit.owner = new_owner;
        }
    }
}

/// Ammunition cooks off inside overheated hulls.
fn resolve_cookoff(game: &mut Game) {
    let threshold = game.options.ammo_cookoff_threshold;
    let at_risk: Vec<(UnitId, LocationId)> = game
        .units
        .values()
        .filter(|u| !u.destroyed && u.heat >= threshold)
        .filter_map(|u| {
            u.ammo
                .iter()
                .find(|b| b.rounds > 0)
                .map(|b| (u.id, b.location))
        })
        .collect();

    for (id, loc) in at_risk {
        let roll = two_d6(&mut game.rng);
        if roll < 8 {
            let mut queue = std::collections::VecDeque::new();
            criticals::detonate_ammo(game, id, loc, &mut queue);
            while let Some(ev) = queue.pop_front() {
                damage::resolve(game, ev);
            }
        }
    }
}

fn resolve_equipment_cooldowns(game: &mut Game) {
    for unit in game.units.values_mut() {
        if unit.equipment_cooldown > 0 {
            unit.equipment_cooldown -= 1;
        }
    }
}

/// Crews in opened cockpits drown when submerged.
fn resolve_suffocation(game: &mut Game) {
    let drowning: Vec<UnitId> = game
        .units
        .values()
        .filter(|u| {
            if u.destroyed || !u.deployed || u.crew.dead {
                return false;
            }
            let submerged = u
                .position
                .and_then(|p| game.board.hex(&p.coord))
                .map(|h| h.water_depth >= 2)
                .unwrap_or(false);
            let opened = matches!(u.kind, UnitKind::Walker | UnitKind::LightBiped)
                && u.location(HEAD).armor.is_destroyed();
            submerged && opened
        })
        .map(|u| u.id)
        .collect();

    for id in drowning {
        if let Some(unit) = game.units.get_mut(&id) {
            unit.crew.apply_hit(&mut game.rng);
        }
    }
}

fn determine_wind(game: &mut Game) {
    let (round, phase) = (game.round, game.phase);
    let strength = game.rng.gen_range(0..=5);
    game.conditions.wind_strength = strength;
    game.reports.push(round, phase, ReportKind::WindShift { strength });
}

/// Collapsed buildings land on whoever is inside.
fn resolve_building_damage(game: &mut Game) {
    let (round, phase) = (game.round, game.phase);
    let mut pending: Vec<(crate::board::HexCoord, u32)> = Vec::new();
    for (coord, height) in game.board_collapses() {
        pending.push((coord, height));
    }

    for (coord, height) in pending {
        let occupants: Vec<UnitId> = game
            .units
            .values()
            .filter(|u| {
                !u.destroyed && u.position.map(|p| p.coord == coord).unwrap_or(false)
            })
            .map(|u| u.id)
            .collect();
        for id in occupants {
            game.reports.push(round, phase, ReportKind::BuildingCollapsed { unit: id });
            damage::resolve(
                game,
                DamageEvent::new(
                    id,
                    HitData::front(LocationId(0)),
                    height * COLLAPSE_DAMAGE_PER_LEVEL,
                    DamageKind::Physical,
                ),
            );
        }
        if let Some(hex) = game.board.hex_mut(&coord) {
            if let Some(b) = hex.building.as_mut() {
                b.collapse_resolved = true;
            }
            hex.terrain = crate::board::Terrain::Rubble;
        }
    }
}

fn age_flares(game: &mut Game) {
    for flare in &mut game.flares {
        flare.rounds_left = flare.rounds_left.saturating_sub(1);
    }
    game.flares.retain(|f| f.rounds_left > 0);
}

/// Bins flagged for dumping go overboard before they can be set off.
fn resolve_ammo_dumps(game: &mut Game) {
    let (round, phase) = (game.round, game.phase);
    let mut dumped: Vec<(UnitId, LocationId)> = Vec::new();
    for unit in game.units.values_mut() {
        for bin in &mut unit.ammo {
            if bin.dumping && bin.rounds > 0 {
                bin.rounds = 0;
                bin.dumping = false;
                dumped.push((unit.id, bin.location));
            }
        }
    }
    for (id, loc) in dumped {
        game.reports.push(
            round,
            phase,
            ReportKind::CriticalEffect {
                target: id,
                location: loc,
                effect: "ammunition dumped".to_string(),
            },
        );
    }
}

/// Wakeups, restarts and armed self-destructs.
fn resolve_crews(game: &mut Game) {
    let (round, phase) = (game.round, game.phase);
    let ids: Vec<UnitId> = game.units.keys().copied().collect();

    for id in ids {
        let Some(unit) = game.units.get_mut(&id) else {
            continue;
        };
        if unit.destroyed {
            continue;
        }

        if unit.crew.recover(&mut game.rng) {
            game.reports.push(round, phase, ReportKind::CrewWoke { unit: id });
        }

        let restart = unit.shut_down && unit.heat < game.options.shutdown_threshold;
        if restart && unit.crew.active() {
            unit.shut_down = false;
        }

        if unit.self_destruct_armed && unit.crew.active() {
            unit.self_destruct_armed = false;
            let bin_loc = unit.ammo.iter().find(|b| b.rounds > 0).map(|b| b.location);
            if let Some(loc) = bin_loc {
                let mut queue = std::collections::VecDeque::new();
                criticals::detonate_ammo(game, id, loc, &mut queue);
                while let Some(ev) = queue.pop_front() {
                    damage::resolve(game, ev);
                }
            } else {
                criticals::destroy_unit(game, id, DestructionCause::AmmoDetonation);
            }
        }
    }
}

/// Industrial chassis test the floor under their mass.
fn resolve_industrial(game: &mut Game) {
    let heavy: Vec<(UnitId, crate::board::HexCoord, u32)> = game
        .units
        .values()
        .filter(|u| u.industrial && !u.destroyed && u.deployed)
        .filter_map(|u| u.position.map(|p| (u.id, p.coord, u.mass)))
        .collect();

    for (_id, coord, mass) in heavy {
        if let Some(hex) = game.board.hex_mut(&coord) {
            if let Some(b) = hex.building.as_mut() {
                if b.check_collapse(mass) {
                    b.collapsed = true;
                }
            }
        }
    }
}

/// Drop links to carriers that no longer exist.
fn resolve_pickups(game: &mut Game) {
    let orphaned: Vec<UnitId> = game
        .units
        .values()
        .filter(|u| {
            u.carried_by
                .map(|c| game.units.get(&c).map(|cu| cu.destroyed).unwrap_or(true))
                .unwrap_or(false)
        })
        .map(|u| u.id)
        .collect();
    for id in orphaned {
        if let Some(unit) = game.units.get_mut(&id) {
            unit.carried_by = None;
        }
    }
}

/// Battlefield debris settles into rubble.
fn process_terrain(game: &mut Game) {
    for coord in game.board_coords() {
        if let Some(hex) = game.board.hex_mut(&coord) {
            if hex.debris >= RUBBLE_THRESHOLD && hex.terrain != crate::board::Terrain::Rubble {
                hex.terrain = crate::board::Terrain::Rubble;
            }
        }
    }
}
