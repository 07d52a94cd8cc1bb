//! Damage procedure for armored walkers and light bipeds
//!
//! Walker order of operations: damage-kind pre-modifier, shield/cowl
//! pre-absorption, then per-location armor-family math, structure, and
//! transfer. Light bipeds share the algorithm but only pass operator hits
//! on location destruction; the finalization step handles that split.

use std::collections::VecDeque;

use crate::damage::context::DamageContext;
use crate::damage::criticals::{self, next_open_location};
use crate::damage::modifiers;
use crate::damage::DamageEvent;
use crate::game::Game;
use crate::report::ReportKind;
use crate::unit::location::{LocationId, Transfer};
use crate::unit::{StructureKind, UnitKind};

/// Location-derived modifier for critical-effect rolls
pub fn crit_location_bonus(kind: UnitKind, loc: LocationId) -> i32 {
    use crate::unit::location::{CENTER_TORSO, HEAD, LEFT_TORSO, RIGHT_TORSO};
    match kind {
        UnitKind::Walker | UnitKind::LightBiped => match loc {
            HEAD => 2,
            CENTER_TORSO | LEFT_TORSO | RIGHT_TORSO => 1,
            _ => 0,
        },
        _ => 0,
    }
}

pub fn apply(game: &mut Game, ev: DamageEvent, queue: &mut VecDeque<DamageEvent>) {
    let (round, phase) = (game.round, game.phase);
    let Some(unit) = game.units.get_mut(&ev.target) else {
        return;
    };

    let mut amount = modifiers::pre_modify(&ev, unit);
    if amount == 0 {
        game.reports.push(round, phase, ReportKind::DamageWasted { target: ev.target, amount: ev.amount });
        return;
    }

    // Shield/cowl soak comes before any armor-family math.
    if unit.shield_points > 0 && !ev.damage_is {
        let soaked = amount.min(unit.shield_points);
        unit.shield_points -= soaked;
        amount -= soaked;
        game.reports.push(round, phase, ReportKind::ShieldAbsorbed { target: ev.target, absorbed: soaked });
        if amount == 0 {
            return;
        }
    }

    let kind = unit.kind;
    let mut loc = ev.hit.location;
    let mut ctx = DamageContext::new(ev.amount, ev.damage_is, unit.location(loc).family);
    // (location, family bonus at breach time) for the post-loop rolls
    let mut breaches: Vec<(LocationId, i32)> = Vec::new();
    let mut destroyed_here: Vec<LocationId> = Vec::new();
    let mut last_open_armor: Option<LocationId> = None;

    // The chain is bounded: every transfer hop moves strictly inward and a
    // location can only be destroyed once.
    for _hop in 0..unit.locations.len() + 1 {
        ctx.recompute_family(unit.location(loc).family);
        let family = ctx.family;
        let rear = ev.hit.rear && unit.location(loc).rear_armor.is_some();

        if !ev.damage_is {
            let current_display = {
                let l = unit.location_mut(loc);
                let pts = l.armor_facing(rear).value();
                if family == crate::unit::armor::ArmorFamily::Hardened {
                    (pts + 1) / 2
                } else {
                    pts
                }
            };
            let modified = family.modify_damage(amount, ev.kind, ev.area_effect, current_display);
            let l = unit.location_mut(loc);
            let drain = l.armor_facing(rear).drain(modified);
            l.damage_this_phase += drain.absorbed;
            if drain.absorbed > 0 {
                let remaining = l.armor_facing(rear).value();
                game.reports.push(
                    round,
                    phase,
                    ReportKind::ArmorAbsorbed {
                        target: ev.target,
                        location: loc,
                        absorbed: drain.absorbed,
                        remaining_armor: remaining,
                    },
                );
            }
            if l.armor_facing(rear).is_destroyed() {
                game.reports.push(round, phase, ReportKind::ArmorDestroyed { target: ev.target, location: loc });
                last_open_armor = Some(loc);
            }
            amount = drain.overflow;
            if amount == 0 {
                break;
            }
        }

        // Structure, scaled by the frame variant. Overflow is scaled back
        // on the way out so the transfer side sees real points.
        let structural = match unit.structure_kind {
            StructureKind::Standard => amount,
            StructureKind::Composite => amount * 2,
            StructureKind::Reinforced => {
                let carried = amount + u32::from(unit.reinforced_carry);
                unit.reinforced_carry = carried % 2 == 1;
                carried / 2
            }
        };
        let drain = {
            let l = unit.location_mut(loc);
            let d = l.structure.drain(structural);
            l.damage_this_phase += d.absorbed;
            d
        };
        if drain.absorbed > 0 {
            let remaining = unit.location(loc).structure.value();
            game.reports.push(
                round,
                phase,
                ReportKind::StructureDamaged {
                    target: ev.target,
                    location: loc,
                    absorbed: drain.absorbed,
                    remaining_structure: remaining,
                },
            );
            game.reports.push(round, phase, ReportKind::StructureBreached { target: ev.target, location: loc });
            ctx.record_breach();
            breaches.push((loc, crit_location_bonus(kind, loc) + family.crit_bonus_penalty()));
        }

        if drain.overflow == 0 {
            break;
        }

        // Structure exhausted: the location dies exactly once, here.
        unit.location_mut(loc).destroyed = true;
        destroyed_here.push(loc);

        let carry_out = match unit.structure_kind {
            StructureKind::Standard => drain.overflow,
            StructureKind::Composite => (drain.overflow + 1) / 2,
            StructureKind::Reinforced => drain.overflow * 2,
        };

        if unit.location(loc).case.vents() {
            game.reports.push(round, phase, ReportKind::DamageVented { target: ev.target, location: loc, amount: carry_out });
            break;
        }

        match next_open_location(kind, &unit.locations, loc) {
            Transfer::Destroyed => {
                // Finalization of this location destroys the unit; the
                // remainder has nowhere to go.
                break;
            }
            Transfer::None => {
                game.reports.push(round, phase, ReportKind::DamageWasted { target: ev.target, amount: carry_out });
                break;
            }
            Transfer::To(next) => {
                game.reports.push(
                    round,
                    phase,
                    ReportKind::DamageTransferred {
                        target: ev.target,
                        from: loc,
                        to: next,
                        amount: carry_out,
                    },
                );
                amount = carry_out;
                loc = next;
            }
        }
    }

    // Special criticals only land when nothing was breached; no breach
    // also means no transfer, so the family is still the hit location's.
    if ev.hit.special_crit && breaches.is_empty() {
        ctx.record_special_crit();
    }

    // Post-loop resolution: criticals, breach check, finalization.
    for (breach_loc, bonus) in &breaches {
        criticals::roll_critical_effects(game, ev.target, *breach_loc, 1, *bonus, queue);
    }
    if ctx.special_crits > 0 {
        let bonus = crit_location_bonus(kind, ev.hit.location) + ctx.crit_bonus;
        criticals::roll_critical_effects(game, ev.target, ev.hit.location, ctx.special_crits, bonus, queue);
    }
    if let Some(opened) = last_open_armor {
        criticals::breach_check(game, ev.target, opened, ev.underwater);
    }
    for dloc in destroyed_here {
        criticals::finalize_location(game, ev.target, dloc, queue);
    }
}
