//! Damage procedure for powered-armor squads
//!
//! Each trooper is a location with its own suit of plate. There is no
//! transfer between troopers; a suit that fails kills its wearer and the
//! squad fights on. Area-effect strikes hit every trooper at full value.

use std::collections::VecDeque;

use crate::damage::criticals::{self, DestructionCause};
use crate::damage::modifiers;
use crate::damage::{DamageEvent, DamageKind};
use crate::game::Game;
use crate::report::ReportKind;
use crate::unit::armor::ArmorFamily;
use crate::unit::location::LocationId;
use crate::unit::Unit;

/// Powered suits are exempt from the physical-doubling weakness of
/// reflective and reactive plate.
fn effective_kind(kind: DamageKind, family: ArmorFamily) -> DamageKind {
    if kind == DamageKind::Physical
        && matches!(family, ArmorFamily::Reflective | ArmorFamily::Reactive)
    {
        DamageKind::Standard
    } else {
        kind
    }
}

/// Apply `amount` to one trooper location. Returns true if the trooper
/// was lost.
fn hit_trooper(
    game: &mut Game,
    target: crate::core::types::UnitId,
    loc: LocationId,
    amount: u32,
    kind: DamageKind,
    area_effect: bool,
) -> bool {
    let (round, phase) = (game.round, game.phase);
    let Some(unit) = game.units.get_mut(&target) else {
        return false;
    };
    if unit.location(loc).destroyed {
        return false;
    }

    let family = unit.location(loc).family;
    let display = {
        let v = unit.location(loc).armor.value();
        if family == ArmorFamily::Hardened {
            (v + 1) / 2
        } else {
            v
        }
    };
    let modified = family.modify_damage(amount, effective_kind(kind, family), area_effect, display);
    let l = unit.location_mut(loc);
    let drain = l.armor.drain(modified);
    l.damage_this_phase += drain.absorbed;
    if drain.absorbed > 0 {
        let remaining = l.armor.value();
        game.reports.push(
            round,
            phase,
            ReportKind::ArmorAbsorbed {
                target,
                location: loc,
                absorbed: drain.absorbed,
                remaining_armor: remaining,
            },
        );
    }
    if drain.overflow == 0 {
        return false;
    }

    let sdrain = {
        let l = unit.location_mut(loc);
        let d = l.structure.drain(drain.overflow);
        l.damage_this_phase += d.absorbed;
        d
    };
    if sdrain.overflow == 0 {
        return false;
    }

    kill_trooper(game, target, loc)
}

fn kill_trooper(game: &mut Game, target: crate::core::types::UnitId, loc: LocationId) -> bool {
    let (round, phase) = (game.round, game.phase);
    let Some(unit) = game.units.get_mut(&target) else {
        return false;
    };
    let l = unit.location_mut(loc);
    if l.destroyed {
        return false;
    }
    l.destroyed = true;
    l.armor = crate::unit::location::Points::Destroyed;
    l.structure = crate::unit::location::Points::Destroyed;
    unit.troopers = unit.troopers.saturating_sub(1);
    let remaining = unit.troopers;
    game.reports.push(
        round,
        phase,
        ReportKind::TroopersLost {
            target,
            lost: 1,
            remaining,
        },
    );
    true
}

/// First location still holding a live trooper, preferring the rolled one
fn live_location(unit: &Unit, preferred: LocationId) -> Option<LocationId> {
    let idx = preferred.0.min(unit.locations.len().saturating_sub(1));
    if !unit.locations[idx].destroyed {
        return Some(LocationId(idx));
    }
    unit.locations
        .iter()
        .position(|l| !l.destroyed)
        .map(LocationId)
}

pub fn apply(game: &mut Game, ev: DamageEvent, _queue: &mut VecDeque<DamageEvent>) {
    let (round, phase) = (game.round, game.phase);
    let Some(unit) = game.units.get(&ev.target) else {
        return;
    };

    let mut amount = modifiers::pre_modify(&ev, unit);
    if amount == 0 {
        game.reports.push(round, phase, ReportKind::DamageWasted { target: ev.target, amount: ev.amount });
        return;
    }
    // Hard vacuum doubles everything that gets through a suit
    if game.conditions.atmosphere.is_vacuum() {
        amount *= 2;
    }

    if ev.area_effect {
        // Full, undivided damage against every trooper independently.
        let count = unit.locations.len();
        for i in 0..count {
            hit_trooper(game, ev.target, LocationId(i), amount, ev.kind, true);
        }
    } else {
        let Some(loc) = live_location(unit, ev.hit.location) else {
            game.reports.push(round, phase, ReportKind::DamageWasted { target: ev.target, amount });
            return;
        };
        let primed = unit.primed_by_crit;
        if primed {
            // The earlier critical already compromised a suit; this hit
            // finishes it no matter what the plate would have held.
            if let Some(u) = game.units.get_mut(&ev.target) {
                u.primed_by_crit = false;
            }
            kill_trooper(game, ev.target, loc);
        } else {
            hit_trooper(game, ev.target, loc, amount, ev.kind, false);
        }
    }

    let wiped = game
        .units
        .get(&ev.target)
        .map(|u| u.troopers == 0)
        .unwrap_or(false);
    if wiped {
        criticals::destroy_unit(game, ev.target, DestructionCause::StructureGone);
    }
}
