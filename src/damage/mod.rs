//! Damage resolution engine
//!
//! `resolve` applies one damage event to a unit and everything that follows
//! from it: armor and structure loss, criticals, location destruction,
//! transfer, and knock-on damage against passengers, swarm attackers and
//! squadron members. Knock-on damage goes through an explicit work list
//! rather than call-stack recursion; the cascade is bounded because
//! destruction terminates further work against a target.
//!
//! All numeric drains clamp at zero. Nothing here raises on valid input;
//! a unit whose location table does not match its category is a data
//! error, logged and skipped without mutation.

pub mod aerospace;
pub mod context;
pub mod criticals;
pub mod infantry;
pub mod modifiers;
pub mod powered_armor;
pub mod squadron;
pub mod vehicle;
pub mod walker;

use std::collections::VecDeque;

use serde::{Deserialize, Serialize};

use crate::core::types::UnitId;
use crate::game::Game;
use crate::report::ReportKind;
use crate::unit::location::{location_count, LocationId};
use crate::unit::UnitKind;

pub use context::DamageContext;

/// Classification of the incoming damage
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
pub enum DamageKind {
    #[default]
    Standard,
    /// Autocannon-style kinetic fire
    Ballistic,
    Missile,
    Energy,
    /// Melee and collision damage
    Physical,
    /// Anti-personnel bursts; useless against hard targets
    Fragmentation,
    /// Canister shot; weakened against hard targets
    Flechette,
    Acid,
    Incendiary,
    /// Nail/rivet guns; bounce off rated plating
    Nail,
    /// Ignores fractional armor reductions
    ArmorPiercing,
}

/// Where and how a hit lands
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct HitData {
    pub location: LocationId,
    pub rear: bool,
    /// Carries the special-critical flag
    pub special_crit: bool,
    /// Damage quoted at capital scale
    pub capital_scale: bool,
}

impl HitData {
    pub fn front(location: LocationId) -> Self {
        Self {
            location,
            rear: false,
            special_crit: false,
            capital_scale: false,
        }
    }

    pub fn rear(location: LocationId) -> Self {
        Self {
            rear: true,
            ..Self::front(location)
        }
    }
}

/// One pending damage application
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct DamageEvent {
    pub target: UnitId,
    pub hit: HitData,
    pub amount: u32,
    pub kind: DamageKind,
    pub ammo_explosion: bool,
    /// Hit applies directly to internal structure
    pub damage_is: bool,
    pub area_effect: bool,
    pub through_front: bool,
    pub underwater: bool,
    pub nuke: bool,
}

impl DamageEvent {
    pub fn new(target: UnitId, hit: HitData, amount: u32, kind: DamageKind) -> Self {
        Self {
            target,
            hit,
            amount,
            kind,
            ammo_explosion: false,
            damage_is: false,
            area_effect: false,
            through_front: true,
            underwater: false,
            nuke: false,
        }
    }
}

/// Apply a damage event and drain everything it spawns.
pub fn resolve(game: &mut Game, event: DamageEvent) {
    let mut queue: VecDeque<DamageEvent> = VecDeque::new();
    queue.push_back(event);

    // Each unit can be destroyed once and each destruction stops further
    // cascades into it, so the natural bound is the unit count; the
    // multiplier leaves room for venting and trooper fan-out events.
    let bound = (game.units.len().max(1)) * 64;
    let mut processed = 0;

    while let Some(ev) = queue.pop_front() {
        processed += 1;
        if processed > bound {
            tracing::error!(bound, "damage work list exceeded its bound, dropping remainder");
            break;
        }
        apply_one(game, ev, &mut queue);
    }
}

fn apply_one(game: &mut Game, ev: DamageEvent, queue: &mut VecDeque<DamageEvent>) {
    let Some(unit) = game.units.get(&ev.target) else {
        tracing::warn!(target = ?ev.target, "damage against unknown unit ignored");
        return;
    };
    if unit.destroyed {
        return;
    }
    if ev.amount == 0 {
        return;
    }
    let kind = unit.kind;
    if unit.locations.len() != location_count(kind) {
        // Data error: malformed unit reaching the dispatcher. Log, no-op.
        tracing::error!(target = ?ev.target, ?kind, "location table does not match category");
        return;
    }

    let (round, phase) = (game.round, game.phase);
    game.reports.push(
        round,
        phase,
        ReportKind::DamageApplied {
            target: ev.target,
            location: ev.hit.location,
            amount: ev.amount,
        },
    );

    match kind {
        UnitKind::Walker | UnitKind::LightBiped => walker::apply(game, ev, queue),
        UnitKind::Vehicle => vehicle::apply(game, ev, queue),
        UnitKind::Aerospace => aerospace::apply(game, ev, queue),
        UnitKind::PoweredArmor => powered_armor::apply(game, ev, queue),
        UnitKind::Infantry => infantry::apply(game, ev, queue),
        UnitKind::Squadron => squadron::apply(game, ev, queue),
    }

    // Area-effect strikes engulf anything clinging to the hull as well.
    if ev.area_effect {
        if let Some(target) = game.units.get(&ev.target) {
            if let Some(swarmer) = target.swarmed_by {
                if game.units.get(&swarmer).map(|u| !u.destroyed).unwrap_or(false) {
                    game.reports.push(
                        round,
                        phase,
                        ReportKind::SwarmAttackerHit {
                            target: ev.target,
                            attacker: swarmer,
                            amount: ev.amount,
                        },
                    );
                    let mut follow = ev;
                    follow.target = swarmer;
                    follow.area_effect = false;
                    follow.hit = HitData::front(LocationId(0));
                    queue.push_back(follow);
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::types::PlayerId;
    use crate::game::Game;
    use crate::unit::location::CENTER_TORSO;
    use crate::unit::Unit;

    #[test]
    fn test_unknown_target_is_noop() {
        let mut game = Game::for_test();
        let before = game.reports.len();
        resolve(
            &mut game,
            DamageEvent::new(UnitId::new(), HitData::front(CENTER_TORSO), 5, DamageKind::Standard),
        );
        assert_eq!(game.reports.len(), before);
    }

    #[test]
    fn test_zero_damage_is_noop() {
        let mut game = Game::for_test();
        let unit = Unit::walker("Target", PlayerId(1));
        let id = unit.id;
        game.add_unit(unit);
        let before = game.reports.len();
        resolve(
            &mut game,
            DamageEvent::new(id, HitData::front(CENTER_TORSO), 0, DamageKind::Standard),
        );
        assert_eq!(game.reports.len(), before);
    }

    #[test]
    fn test_destroyed_target_takes_nothing_further() {
        let mut game = Game::for_test();
        let mut unit = Unit::walker("Target", PlayerId(1));
        unit.mark_destroyed();
        let id = unit.id;
        game.add_unit(unit);
        let before = game.reports.len();
        resolve(
            &mut game,
            DamageEvent::new(id, HitData::front(CENTER_TORSO), 10, DamageKind::Standard),
        );
        assert_eq!(game.reports.len(), before);
    }
}
