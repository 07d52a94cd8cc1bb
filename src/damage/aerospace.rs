//! Damage procedure for aerospace craft
//!
//! Aerospace hulls drain armor per facing but carry their structure as a
//! single structural-integrity pool. Capital-scale quotes rescale before
//! anything else; penetrating hits can over-penetrate straight through to
//! the far side.

use std::collections::VecDeque;

use crate::core::dice::two_d6;
use crate::damage::context::DamageContext;
use crate::damage::criticals::{self, DestructionCause};
use crate::damage::modifiers;
use crate::damage::DamageEvent;
use crate::game::Game;
use crate::report::ReportKind;
use crate::unit::armor::ArmorFamily;
use crate::unit::location::{LocationId, AERO_AFT, AERO_LEFT_WING, AERO_NOSE, AERO_RIGHT_WING};

/// Over-penetration happens on 2d6 at or above this
const OVER_PENETRATION_TARGET: u32 = 10;

/// The facing opposite a hit, for over-penetration exits
fn opposite(loc: LocationId) -> LocationId {
    match loc {
        AERO_NOSE => AERO_AFT,
        AERO_AFT => AERO_NOSE,
        AERO_LEFT_WING => AERO_RIGHT_WING,
        _ => AERO_LEFT_WING,
    }
}

/// Rescale a damage quote between capital and standard scale.
///
/// Capital-scale quotes land tenfold on standard defenders; standard
/// quotes shrink tenfold (rounding up) against capital hulls.
fn rescale(amount: u32, quote_capital: bool, target_capital: bool) -> Option<u32> {
    match (quote_capital, target_capital) {
        (true, false) => Some(amount * 10),
        (false, true) => Some(amount.div_ceil(10)),
        _ => None,
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

    // Scale conversion happens before any threshold comparison.
    if let Some(rescaled) = rescale(amount, ev.hit.capital_scale, unit.capital_scale) {
        game.reports.push(
            round,
            phase,
            ReportKind::CapitalRescale {
                target: ev.target,
                before: amount,
                after: rescaled,
            },
        );
        amount = rescaled;
    }

    let loc = ev.hit.location;
    let mut ctx = DamageContext::new(ev.amount, ev.damage_is, unit.location(loc).family);

    // Squadron-member fighters burn their capital-armor pool first.
    if let Some(pool) = unit.capital_armor {
        if pool > 0 && !ev.damage_is {
            let soaked = amount.min(pool);
            unit.capital_armor = Some(pool - soaked);
            amount -= soaked;
            game.reports.push(
                round,
                phase,
                ReportKind::ArmorAbsorbed {
                    target: ev.target,
                    location: loc,
                    absorbed: soaked,
                    remaining_armor: pool - soaked,
                },
            );
            if amount == 0 {
                return;
            }
        }
    }

    // Heavy single hits rattle the airframe even when armor holds.
    let threshold = (unit.location(loc).armor.value() / 10).max(1);
    if amount > threshold {
        ctx.record_breach();
    }

    let mut remaining = amount;
    if !ev.damage_is {
        let family = unit.location(loc).family;
        let display = {
            let v = unit.location(loc).armor.value();
            if family == ArmorFamily::Hardened {
                (v + 1) / 2
            } else {
                v
            }
        };
        let modified = family.modify_damage(amount, ev.kind, ev.area_effect, display);
        let l = unit.location_mut(loc);
        let drain = l.armor.drain(modified);
        l.damage_this_phase += drain.absorbed;
        if drain.absorbed > 0 {
            let left = l.armor.value();
            game.reports.push(
                round,
                phase,
                ReportKind::ArmorAbsorbed {
                    target: ev.target,
                    location: loc,
                    absorbed: drain.absorbed,
                    remaining_armor: left,
                },
            );
        }
        if l.armor.is_destroyed() {
            game.reports.push(round, phase, ReportKind::ArmorDestroyed { target: ev.target, location: loc });
        }
        remaining = drain.overflow;

        // A clean punch-through can exit the far side instead of chewing
        // into the frame.
        if remaining > 0 && ev.through_front {
            let roll = two_d6(&mut game.rng);
            if roll >= OVER_PENETRATION_TARGET {
                let out = opposite(loc);
                game.reports.push(
                    round,
                    phase,
                    ReportKind::OverPenetration {
                        target: ev.target,
                        from: loc,
                        to: out,
                    },
                );
                let l = unit.location_mut(out);
                let drain = l.armor.drain(remaining);
                l.damage_this_phase += drain.absorbed;
                if l.armor.is_destroyed() {
                    game.reports.push(round, phase, ReportKind::ArmorDestroyed { target: ev.target, location: out });
                }
                remaining = drain.overflow;
            }
        }
    }

    if remaining > 0 {
        // Structural integrity takes half, except for internal blasts and
        // nuclear strikes which land whole.
        let si_damage = if ev.ammo_explosion || ev.nuke {
            remaining
        } else {
            remaining.div_ceil(2)
        };
        let drain = unit.structural_integrity.drain(si_damage);
        game.reports.push(
            round,
            phase,
            ReportKind::StructureDamaged {
                target: ev.target,
                location: loc,
                absorbed: drain.absorbed,
                remaining_structure: unit.structural_integrity.value(),
            },
        );
        game.reports.push(round, phase, ReportKind::StructureBreached { target: ev.target, location: loc });
        ctx.record_breach();

        if unit.structural_integrity.is_destroyed() {
            unit.location_mut(loc).destroyed = true;
            criticals::destroy_unit(game, ev.target, DestructionCause::StructureGone);
            return;
        }
    }

    if ev.hit.special_crit && ctx.crit_rolls == 0 {
        ctx.record_special_crit();
    }

    let rolls = ctx.crit_rolls + ctx.special_crits;
    if rolls > 0 {
        criticals::roll_critical_effects(game, ev.target, loc, rolls, ctx.crit_bonus, queue);
    }
}
