//! Damage procedure for ground vehicles
//!
//! Vehicles have no transfer web: once a side's structure fails the hull
//! is finished. What they do have is CASE venting through a
//! facing-dependent armor location, motive-system wear, and one-tenth
//! rotor scaling on flight-capable chassis.

use std::collections::VecDeque;

use crate::core::dice::d6;
use crate::damage::context::DamageContext;
use crate::damage::criticals::{self, next_open_location};
use crate::damage::modifiers;
use crate::damage::DamageEvent;
use crate::game::Game;
use crate::report::ReportKind;
use crate::unit::armor::ArmorFamily;
use crate::unit::location::{LocationId, Transfer, VEH_LEFT, VEH_REAR, VEH_RIGHT, VEH_ROTOR};

/// Rotor hits on flight-capable chassis land at one tenth strength
fn rotor_scale(amount: u32) -> u32 {
    (amount / 10).max(1)
}

/// Where a CASE fitting at `origin` vents. Broadside bins roll for the
/// venting facing; everything else blows out the rear.
fn venting_location(origin: LocationId, rng: &mut rand_chacha::ChaCha8Rng) -> LocationId {
    match origin {
        VEH_LEFT | VEH_RIGHT => {
            if d6(rng) <= 3 {
                origin
            } else {
                VEH_REAR
            }
        }
        _ => VEH_REAR,
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

    let mut loc = ev.hit.location;
    if loc == VEH_ROTOR && !unit.flight_capable {
        // Ground chassis carry no rotor; the hit lands on the hull top.
        loc = crate::unit::location::VEH_TURRET;
    }
    if loc == VEH_ROTOR {
        amount = rotor_scale(amount);
    }

    // An exploding bin behind CASE vents through armor instead of
    // gutting the hull. The venting location takes the blast on its
    // plate and the crew takes the concussion.
    if ev.ammo_explosion && unit.location(loc).case.vents() {
        let vent = venting_location(loc, &mut game.rng);
        let drain = unit.location_mut(vent).armor.drain(amount);
        unit.location_mut(vent).damage_this_phase += drain.absorbed;
        unit.crew.stun(2);
        game.reports.push(round, phase, ReportKind::DamageVented { target: ev.target, location: vent, amount });
        game.reports.push(round, phase, ReportKind::CrewStunned { unit: ev.target, turns: 2 });
        if drain.overflow > 0 {
            game.reports.push(round, phase, ReportKind::DamageWasted { target: ev.target, amount: drain.overflow });
        }
        return;
    }

    let mut ctx = DamageContext::new(ev.amount, ev.damage_is, unit.location(loc).family);
    let kind = unit.kind;
    let mut breaches: Vec<(LocationId, i32)> = Vec::new();
    let mut destroyed_here: Vec<LocationId> = Vec::new();
    let mut opened: Option<LocationId> = None;

    for _hop in 0..unit.locations.len() + 1 {
        ctx.recompute_family(unit.location(loc).family);
        let family = ctx.family;

        if !ev.damage_is {
            let current = unit.location(loc).armor.value();
            let display = if family == ArmorFamily::Hardened {
                (current + 1) / 2
            } else {
                current
            };
            let modified = family.modify_damage(amount, ev.kind, ev.area_effect, display);
            let l = unit.location_mut(loc);
            let drain = l.armor.drain(modified);
            l.damage_this_phase += drain.absorbed;
            if drain.absorbed > 0 {
                let remaining = l.armor.value();
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
            if l.armor.is_destroyed() {
                game.reports.push(round, phase, ReportKind::ArmorDestroyed { target: ev.target, location: loc });
                opened = Some(loc);
            }
            amount = drain.overflow;
            if amount == 0 {
                break;
            }
        }

        let drain = {
            let l = unit.location_mut(loc);
            let d = l.structure.drain(amount);
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
            breaches.push((loc, family.crit_bonus_penalty()));

            // Hull damage rattles the drive train.
            if d6(&mut game.rng) >= 4 {
                unit.motive = unit.motive.degrade();
                game.reports.push(
                    round,
                    phase,
                    ReportKind::CriticalEffect {
                        target: ev.target,
                        location: loc,
                        effect: "motive system damaged".to_string(),
                    },
                );
            }
        }

        if drain.overflow == 0 {
            break;
        }

        unit.location_mut(loc).destroyed = true;
        destroyed_here.push(loc);

        match next_open_location(kind, &unit.locations, loc) {
            Transfer::Destroyed => break,
            Transfer::None => {
                game.reports.push(round, phase, ReportKind::DamageWasted { target: ev.target, amount: drain.overflow });
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
                        amount: drain.overflow,
                    },
                );
                amount = drain.overflow;
                loc = next;
            }
        }
    }

    if ev.hit.special_crit && breaches.is_empty() {
        ctx.record_special_crit();
    }

    for (breach_loc, bonus) in &breaches {
        criticals::roll_critical_effects(game, ev.target, *breach_loc, 1, *bonus, queue);
    }
    if ctx.special_crits > 0 {
        criticals::roll_critical_effects(game, ev.target, ev.hit.location, ctx.special_crits, ctx.crit_bonus, queue);
    }
    if let Some(o) = opened {
        criticals::breach_check(game, ev.target, o, ev.underwater);
    }
    for dloc in destroyed_here {
        criticals::finalize_location(game, ev.target, dloc, queue);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::types::PlayerId;
    use crate::damage::{resolve, DamageKind, HitData};
    use crate::unit::location::{CaseKind, VEH_FRONT, VEH_TURRET};
    use crate::unit::{MotiveStatus, Unit};

    #[test]
    fn test_front_armor_absorbs() {
        let mut game = Game::for_test();
        let unit = Unit::vehicle("Tank", PlayerId(1));
        let id = unit.id;
        game.add_unit(unit);

        resolve(
            &mut game,
            DamageEvent::new(id, HitData::front(VEH_FRONT), 6, DamageKind::Ballistic),
        );
        let unit = game.units.get(&id).unwrap();
        assert_eq!(unit.location(VEH_FRONT).armor.value(), 12);
        assert!(!unit.destroyed);
    }

    #[test]
    fn test_structure_exhaustion_kills_the_hull() {
        let mut game = Game::for_test();
        let unit = Unit::vehicle("Tank", PlayerId(1));
        let id = unit.id;
        game.add_unit(unit);

        // 18 armor + 4 structure on the front; anything past 22 is fatal.
        resolve(
            &mut game,
            DamageEvent::new(id, HitData::front(VEH_FRONT), 30, DamageKind::Standard),
        );
        let unit = game.units.get(&id).unwrap();
        assert!(unit.destroyed);
        // Vehicle crews are not killed by hull loss alone
        assert!(!unit.crew.dead);
    }

    #[test]
    fn test_rotor_hits_scaled_to_tenth() {
        let mut game = Game::for_test();
        let unit = Unit::rotor_craft("Gunship", PlayerId(1));
        let id = unit.id;
        game.add_unit(unit);

        resolve(
            &mut game,
            DamageEvent::new(id, HitData::front(VEH_ROTOR), 15, DamageKind::Standard),
        );
        let unit = game.units.get(&id).unwrap();
        // 15 scales to 1 against 2 rotor armor
        assert_eq!(unit.location(VEH_ROTOR).armor.value(), 1);
    }

    #[test]
    fn test_rotor_hit_on_ground_chassis_lands_on_turret() {
        let mut game = Game::for_test();
        let unit = Unit::vehicle("Tank", PlayerId(1));
        let id = unit.id;
        game.add_unit(unit);

        resolve(
            &mut game,
            DamageEvent::new(id, HitData::front(VEH_ROTOR), 4, DamageKind::Standard),
        );
        let unit = game.units.get(&id).unwrap();
        assert_eq!(unit.location(VEH_TURRET).armor.value(), 12);
    }

    #[test]
    fn test_case_vents_ammo_explosion() {
        let mut game = Game::for_test();
        let unit = Unit::vehicle("Tank", PlayerId(1)).with_case(VEH_REAR, CaseKind::Case);
        let id = unit.id;
        game.add_unit(unit);

        let mut ev = DamageEvent::new(id, HitData::front(VEH_REAR), 25, DamageKind::Standard);
        ev.ammo_explosion = true;
        resolve(&mut game, ev);

        let unit = game.units.get(&id).unwrap();
        assert!(!unit.destroyed);
        assert_eq!(unit.crew.stunned_turns, 2);
        // Blast went through the rear plate, hull untouched
        assert!(unit.location(VEH_REAR).armor.is_destroyed());
        assert_eq!(unit.location(VEH_REAR).structure.value(), 4);
    }

    #[test]
    fn test_motive_ladder_degrades() {
        assert_eq!(MotiveStatus::Intact.degrade(), MotiveStatus::Minor);
        assert_eq!(MotiveStatus::Immobile.degrade(), MotiveStatus::Immobile);
    }
}
