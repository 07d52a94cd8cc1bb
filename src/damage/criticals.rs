//! Critical-effect rolls, breach checks and destruction finalization
//!
//! A structural breach earns one critical-effect roll; special criticals
//! earn theirs separately. Effects are a closed set per category; ammo
//! effects feed back into the damage work list.

use std::collections::VecDeque;

use crate::core::dice::{d6, two_d6};
use crate::core::types::UnitId;
use crate::damage::{DamageEvent, DamageKind, HitData};
use crate::game::Game;
use crate::report::ReportKind;
use crate::unit::location::{
    self, is_limb, LocationId, Points, CENTER_TORSO, HEAD, LEFT_ARM, LEFT_TORSO, RIGHT_ARM,
    RIGHT_TORSO, VEH_ROTOR,
};
use crate::unit::UnitKind;

/// Why a unit died; decides the crew consequence
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DestructionCause {
    HeadLoss,
    CoreLoss,
    EngineLoss,
    AmmoDetonation,
    StructureGone,
    Crash,
}

/// Severity ladder for one critical-effect roll
fn severity(total: i32) -> u32 {
    match total {
        i32::MIN..=7 => 0,
        8..=9 => 1,
        10..=11 => 2,
        _ => 3,
    }
}

/// Run `rolls` critical-effect rolls against a location.
pub fn roll_critical_effects(
    game: &mut Game,
    target: UnitId,
    loc: LocationId,
    rolls: u32,
    bonus: i32,
    queue: &mut VecDeque<DamageEvent>,
) {
    for _ in 0..rolls {
        let roll = two_d6(&mut game.rng);
        let hits = severity(roll as i32 + bonus);
        let (round, phase) = (game.round, game.phase);
        game.reports.push(
            round,
            phase,
            ReportKind::CriticalRoll {
                target,
                location: loc,
                roll,
                hits,
            },
        );
        for _ in 0..hits {
            apply_one_effect(game, target, loc, queue);
        }
    }
}

fn apply_one_effect(
    game: &mut Game,
    target: UnitId,
    loc: LocationId,
    queue: &mut VecDeque<DamageEvent>,
) {
    let pick = d6(&mut game.rng);
    let (round, phase) = (game.round, game.phase);
    let Some(unit) = game.units.get_mut(&target) else {
        return;
    };
    if unit.destroyed {
        return;
    }

    let effect: &'static str = match unit.kind {
        UnitKind::Walker | UnitKind::LightBiped => match pick {
            1 => {
                unit.engine_hits += 1;
                "engine hit"
            }
            2 => "gyro hit",
            3 => "weapon destroyed",
            4 => "ammunition hit",
            5 => {
                unit.heat_sinks = unit.heat_sinks.saturating_sub(1);
                "heat sink destroyed"
            }
            _ => {
                unit.crew.apply_hit(&mut game.rng);
                "cockpit hit"
            }
        },
        UnitKind::Vehicle => match pick {
            1 | 5 => {
                unit.motive = unit.motive.degrade();
                "motive system damaged"
            }
            2 | 6 => "weapon destroyed",
            3 => {
                unit.crew.stun(1);
                "crew stunned"
            }
            _ => "ammunition hit",
        },
        UnitKind::Aerospace => match pick {
            1 => "avionics hit",
            2 => "fuel tank hit",
            3 | 6 => "weapon destroyed",
            4 => "ammunition hit",
            _ => {
                unit.crew.apply_hit(&mut game.rng);
                "canopy hit"
            }
        },
        UnitKind::PoweredArmor => {
            unit.primed_by_crit = true;
            "trooper suit breached"
        }
        UnitKind::Infantry | UnitKind::Squadron => "suppressed",
    };

    game.reports.push(
        round,
        phase,
        ReportKind::CriticalEffect {
            target,
            location: loc,
            effect: effect.to_string(),
        },
    );

    if effect == "ammunition hit" {
        detonate_ammo(game, target, loc, queue);
    }
    if effect == "engine hit" {
        let lethal = game
            .units
            .get(&target)
            .map(|u| u.engine_hits >= 3)
            .unwrap_or(false);
        if lethal {
            destroy_unit(game, target, DestructionCause::EngineLoss);
        }
    }
}

/// Blow the first live ammunition bin at a location, feeding its damage
/// back through the work list as an internal explosion.
pub fn detonate_ammo(
    game: &mut Game,
    target: UnitId,
    loc: LocationId,
    queue: &mut VecDeque<DamageEvent>,
) {
    let (round, phase) = (game.round, game.phase);
    let Some(unit) = game.units.get_mut(&target) else {
        return;
    };
    let Some(bin) = unit
        .ammo
        .iter_mut()
        .find(|b| b.location == loc && b.rounds > 0)
    else {
        return;
    };
    let damage = bin.explosion_damage();
    bin.rounds = 0;

    let eject = game.options.auto_eject && game.options.eject_on_ammo_explosion && unit.crew.active();
    if eject {
        unit.crew.eject();
    }

    game.reports.push(
        round,
        phase,
        ReportKind::AmmoExplosion {
            target,
            location: loc,
            damage,
        },
    );
    if eject {
        game.reports.push(round, phase, ReportKind::CrewEjected { unit: target });
    }

    let mut hit = HitData::front(loc);
    hit.special_crit = false;
    let mut ev = DamageEvent::new(target, hit, damage, DamageKind::Standard);
    ev.ammo_explosion = true;
    ev.damage_is = true;
    queue.push_back(ev);
}

/// Underwater breach check for a location whose armor has been opened.
///
/// Returns true if the location floods; a flooded location is finished
/// even if structure remained.
pub fn breach_check(game: &mut Game, target: UnitId, loc: LocationId, underwater: bool) -> bool {
    if !underwater {
        return false;
    }
    let opened = game
        .units
        .get(&target)
        .map(|u| {
            let l = u.location(loc);
            l.armor.is_destroyed() || l.armor.value() == 0
        })
        .unwrap_or(false);
    if !opened {
        return false;
    }
    let roll = d6(&mut game.rng);
    if roll >= 5 {
        return false;
    }
    let (round, phase) = (game.round, game.phase);
    if let Some(unit) = game.units.get_mut(&target) {
        let l = unit.location_mut(loc);
        l.destroyed = true;
        l.structure = Points::Destroyed;
    }
    game.reports.push(
        round,
        phase,
        ReportKind::CriticalEffect {
            target,
            location: loc,
            effect: "hull breach".to_string(),
        },
    );
    true
}

/// Finalize a location destroyed by structure cascade: severed limbs,
/// attached-limb blow-off, category consequences. Runs at most once per
/// location; callers only invoke it for the hop that destroyed it.
pub fn finalize_location(
    game: &mut Game,
    target: UnitId,
    loc: LocationId,
    queue: &mut VecDeque<DamageEvent>,
) {
    let (round, phase) = (game.round, game.phase);
    let Some(unit) = game.units.get(&target) else {
        return;
    };
    let kind = unit.kind;
    let position = unit.position;
    let mass = unit.mass;

    game.reports.push(round, phase, ReportKind::LocationDestroyed { target, location: loc });

    match kind {
        UnitKind::Walker => {
            if is_limb(kind, loc) {
                if let Some(pos) = position {
                    game.board.deposit_debris(&pos.coord, (mass / 10).max(1));
                }
            }
            // A dead side torso takes its arm with it.
            let attached = match loc {
                LEFT_TORSO => Some(LEFT_ARM),
                RIGHT_TORSO => Some(RIGHT_ARM),
                _ => None,
            };
            if let Some(arm) = attached {
                let severed = game
                    .units
                    .get_mut(&target)
                    .map(|u| {
                        let l = u.location_mut(arm);
                        if l.destroyed {
                            false
                        } else {
                            l.destroyed = true;
                            l.blown_off = true;
                            l.armor = Points::Destroyed;
                            l.structure = Points::Destroyed;
                            true
                        }
                    })
                    .unwrap_or(false);
                if severed {
                    game.reports.push(round, phase, ReportKind::LimbBlownOff { target, location: arm });
                    if let Some(pos) = position {
                        game.board.deposit_debris(&pos.coord, (mass / 10).max(1));
                    }
                }
            }
            match loc {
                HEAD => destroy_unit(game, target, DestructionCause::HeadLoss),
                CENTER_TORSO => destroy_unit(game, target, DestructionCause::CoreLoss),
                _ => {}
            }
        }
        UnitKind::LightBiped => {
            // Light frames only pass the shock to the operator.
            if let Some(unit) = game.units.get_mut(&target) {
                unit.crew.apply_hit(&mut game.rng);
            }
            match loc {
                HEAD | CENTER_TORSO => destroy_unit(game, target, DestructionCause::CoreLoss),
                _ => {}
            }
        }
        UnitKind::Vehicle => {
            if loc == VEH_ROTOR {
                force_grounding(game, target);
                destroy_unit(game, target, DestructionCause::Crash);
            } else {
                destroy_unit(game, target, DestructionCause::StructureGone);
            }
        }
        UnitKind::Aerospace => {
            destroy_unit(game, target, DestructionCause::StructureGone);
        }
        UnitKind::PoweredArmor | UnitKind::Infantry | UnitKind::Squadron => {}
    }

    // Cargo rides in the structure that just failed.
    let cargo: Vec<UnitId> = game
        .units
        .get(&target)
        .map(|u| u.cargo.clone())
        .unwrap_or_default();
    for passenger in cargo {
        let live = game
            .units
            .get(&passenger)
            .map(|u| !u.destroyed)
            .unwrap_or(false);
        if !live {
            continue;
        }
        game.reports.push(
            round,
            phase,
            ReportKind::PassengerHit {
                carrier: target,
                passenger,
                amount: 2,
            },
        );
        queue.push_back(DamageEvent::new(
            passenger,
            HitData::front(LocationId(0)),
            2,
            DamageKind::Standard,
        ));
    }
}

/// Bring an airborne unit to the ground.
pub fn force_grounding(game: &mut Game, target: UnitId) {
    let (round, phase) = (game.round, game.phase);
    let mut grounded = false;
    if let Some(unit) = game.units.get_mut(&target) {
        if let Some(pos) = unit.position.as_mut() {
            if pos.elevation > 0 {
                pos.elevation = 0;
                grounded = true;
            }
        }
        unit.velocity = 0;
    }
    if grounded {
        game.reports.push(round, phase, ReportKind::ForcedGrounding { unit: target });
    }
}

/// Destroy a unit with crew consequences. Idempotent; destruction is
/// terminal.
pub fn destroy_unit(game: &mut Game, target: UnitId, cause: DestructionCause) {
    let (round, phase) = (game.round, game.phase);
    let auto_eject = game.options.auto_eject;
    let Some(unit) = game.units.get_mut(&target) else {
        return;
    };
    if unit.destroyed {
        return;
    }

    let airborne = unit.position.map(|p| p.elevation > 0).unwrap_or(false);
    let crew_fate = match (unit.kind, cause) {
        (_, DestructionCause::HeadLoss) => CrewFate::Killed,
        (UnitKind::Walker | UnitKind::LightBiped, DestructionCause::CoreLoss)
        | (UnitKind::Walker | UnitKind::LightBiped, DestructionCause::EngineLoss)
        | (UnitKind::Walker | UnitKind::LightBiped, DestructionCause::AmmoDetonation) => {
            if auto_eject && unit.crew.active() {
                CrewFate::Ejected
            } else {
                CrewFate::Killed
            }
        }
        (UnitKind::Vehicle, DestructionCause::AmmoDetonation)
        | (UnitKind::Vehicle, DestructionCause::Crash) => CrewFate::Killed,
        (UnitKind::Aerospace, _) if airborne => {
            if auto_eject && unit.crew.active() {
                CrewFate::Ejected
            } else {
                CrewFate::Killed
            }
        }
        _ => CrewFate::Survives,
    };

    match crew_fate {
        CrewFate::Killed => unit.crew.kill(),
        CrewFate::Ejected => unit.crew.eject(),
        CrewFate::Survives => {}
    }

    let position = unit.position;
    let mass = unit.mass;
    unit.mark_destroyed();

    if airborne {
        force_grounding(game, target);
    }
    if let Some(pos) = position {
        game.board.deposit_debris(&pos.coord, (mass / 5).max(1));
    }

    game.reports.push(round, phase, ReportKind::UnitDestroyed { target });
    match crew_fate {
        CrewFate::Killed => game.reports.push(round, phase, ReportKind::CrewKilled { unit: target }),
        CrewFate::Ejected => {
            game.reports.push(round, phase, ReportKind::CrewEjected { unit: target })
        }
        CrewFate::Survives => {}
    }

    // Anything this unit was carrying goes down with it.
    let cargo: Vec<UnitId> = game
        .units
        .get(&target)
        .map(|u| u.cargo.clone())
        .unwrap_or_default();
    for passenger in cargo {
        destroy_unit(game, passenger, DestructionCause::StructureGone);
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum CrewFate {
    Survives,
    Ejected,
    Killed,
}

/// Resolve `location::transfer_target`, skipping locations already gone.
///
/// Blown-off or destroyed intermediate locations pass damage straight
/// through, so the chain stays bounded by the location count.
pub fn next_open_location(
    kind: UnitKind,
    locations: &[crate::unit::location::LocationState],
    from: LocationId,
) -> location::Transfer {
    let mut current = from;
    for _ in 0..locations.len() + 1 {
        match location::transfer_target(kind, current) {
            location::Transfer::To(next) => {
                if locations[next.0].destroyed {
                    current = next;
                } else {
                    return location::Transfer::To(next);
                }
            }
            terminal => return terminal,
        }
    }
    location::Transfer::None
}
