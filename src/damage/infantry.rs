//! Damage procedure for conventional infantry squads
//!
//! A squad is one location of shared armor in front of a trooper count.
//! Damage splits between the two with a parity-carrying halving rule;
//! terrain and atmosphere decide how exposed the troops are.

use std::collections::VecDeque;

use crate::damage::criticals::{self, DestructionCause};
use crate::damage::modifiers;
use crate::damage::DamageEvent;
use crate::game::Game;
use crate::report::ReportKind;
use crate::unit::location::LocationId;

const SQUAD: LocationId = LocationId(0);

pub fn apply(game: &mut Game, ev: DamageEvent, _queue: &mut VecDeque<DamageEvent>) {
    let (round, phase) = (game.round, game.phase);
    let divisor = game.options.infantry_armor_divisor.max(1);
    let vacuum = game.conditions.atmosphere.is_vacuum();
    let Some(unit) = game.units.get_mut(&ev.target) else {
        return;
    };

    let mut amount = modifiers::pre_modify(&ev, unit);
    if amount == 0 {
        game.reports.push(round, phase, ReportKind::DamageWasted { target: ev.target, amount: ev.amount });
        return;
    }

    // Exposure doubling: nowhere to dig in, or nothing to breathe.
    let open = unit
        .position
        .and_then(|p| game.board.hex(&p.coord))
        .map(|h| h.terrain.is_open())
        .unwrap_or(false);
    if open {
        amount *= 2;
    }
    if vacuum {
        amount *= 2;
    }

    // Halve between squad armor and the troops, carrying the odd point
    // so alternating hits stay fair.
    let mut armor_share = amount / 2;
    let mut trooper_share = amount / 2;
    if amount % 2 == 1 {
        if unit.split_carry {
            trooper_share += 1;
        } else {
            armor_share += 1;
        }
        unit.split_carry = !unit.split_carry;
    }

    let drain = {
        let l = unit.location_mut(SQUAD);
        let d = l.armor.drain(armor_share);
        l.damage_this_phase += d.absorbed;
        d
    };
    if drain.absorbed > 0 {
        let remaining = unit.location(SQUAD).armor.value();
        game.reports.push(
            round,
            phase,
            ReportKind::ArmorAbsorbed {
                target: ev.target,
                location: SQUAD,
                absorbed: drain.absorbed,
                remaining_armor: remaining,
            },
        );
    }
    trooper_share += drain.overflow;

    // Issued armor kits soak a further share per trooper hit.
    let lost = (trooper_share / divisor).min(unit.troopers);
    if lost > 0 {
        unit.troopers -= lost;
        unit.location_mut(SQUAD).damage_this_phase += lost;
        let remaining = unit.troopers;
        game.reports.push(
            round,
            phase,
            ReportKind::TroopersLost {
                target: ev.target,
                lost,
                remaining,
            },
        );
    }

    if unit.troopers == 0 {
        unit.location_mut(SQUAD).destroyed = true;
        criticals::destroy_unit(game, ev.target, DestructionCause::StructureGone);
    }
}
