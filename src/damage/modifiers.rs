//! Damage-kind pre-modifiers
//!
//! Applied once, before the armor drain at the first location. These are
//! about what the ordnance is, not what the armor is; armor-family math
//! happens inside the drain.

use crate::damage::{DamageEvent, DamageKind};
use crate::unit::Unit;

/// Acid never burns more than this through sealed plating
pub const ACID_CAP_SEALED: u32 = 3;

/// Flat bonus incendiary weapons deal to infantry-class targets
pub const INCENDIARY_INFANTRY_BONUS: u32 = 2;

/// Plating rated at or above this shrugs off nail/rivet fire
pub const NAIL_RATING_FLOOR: u32 = 8;

/// Resolve the damage-kind pre-modifier for `event` against `target`.
///
/// Returns the adjusted amount; zero means the hit is spent with no
/// further resolution.
pub fn pre_modify(event: &DamageEvent, target: &Unit) -> u32 {
    let amount = event.amount;
    let infantry = target.kind.is_infantry_class();
    match event.kind {
        DamageKind::Fragmentation => {
            if infantry {
                amount
            } else {
                0
            }
        }
        DamageKind::Flechette => {
            if infantry {
                amount
            } else {
                (amount / 2).max(1)
            }
        }
        DamageKind::Acid => {
            let Some(loc) = target
                .locations
                .get(event.hit.location.0)
                .or_else(|| target.locations.first())
            else {
                return amount;
            };
            if loc.family.chemically_resistant() {
                amount.min(ACID_CAP_SEALED)
            } else if infantry && loc.armor.value() == 0 {
                amount * 2
            } else {
                amount
            }
        }
        DamageKind::Incendiary => {
            if infantry {
                amount + INCENDIARY_INFANTRY_BONUS
            } else {
                amount
            }
        }
        DamageKind::Nail => {
            if target.armor_rating >= NAIL_RATING_FLOOR {
                0
            } else {
                amount
            }
        }
        _ => amount,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::types::PlayerId;
    use crate::damage::HitData;
    use crate::unit::armor::ArmorFamily;
    use crate::unit::location::{LocationId, CENTER_TORSO};
    use crate::unit::Unit;

    fn event_for(target: &Unit, amount: u32, kind: DamageKind) -> DamageEvent {
        DamageEvent::new(target.id, HitData::front(CENTER_TORSO), amount, kind)
    }

    #[test]
    fn test_fragmentation_only_hurts_infantry() {
        let walker = Unit::walker("W", PlayerId(1));
        let squad = Unit::infantry_squad("S", PlayerId(1));
        assert_eq!(pre_modify(&event_for(&walker, 6, DamageKind::Fragmentation), &walker), 0);
        let mut ev = event_for(&squad, 6, DamageKind::Fragmentation);
        ev.hit.location = LocationId(0);
        assert_eq!(pre_modify(&ev, &squad), 6);
    }

    #[test]
    fn test_flechette_halved_against_hard_targets() {
        let walker = Unit::walker("W", PlayerId(1));
        assert_eq!(pre_modify(&event_for(&walker, 7, DamageKind::Flechette), &walker), 3);
        assert_eq!(pre_modify(&event_for(&walker, 1, DamageKind::Flechette), &walker), 1);
    }

    #[test]
    fn test_acid_capped_by_sealed_plating() {
        let walker = Unit::walker("W", PlayerId(1)).with_armor_family(ArmorFamily::Reactive);
        assert_eq!(pre_modify(&event_for(&walker, 9, DamageKind::Acid), &walker), 3);
    }

    #[test]
    fn test_acid_amplified_against_bare_infantry() {
        let mut squad = Unit::infantry_squad("S", PlayerId(1));
        squad.locations[0].armor.drain(4);
        let mut ev = event_for(&squad, 4, DamageKind::Acid);
        ev.hit.location = LocationId(0);
        assert_eq!(pre_modify(&ev, &squad), 8);
    }

    #[test]
    fn test_incendiary_bonus_against_infantry() {
        let squad = Unit::infantry_squad("S", PlayerId(1));
        let mut ev = event_for(&squad, 3, DamageKind::Incendiary);
        ev.hit.location = LocationId(0);
        assert_eq!(pre_modify(&ev, &squad), 5);
    }

    #[test]
    fn test_nail_bounces_off_rated_plating() {
        let walker = Unit::walker("W", PlayerId(1));
        assert_eq!(pre_modify(&event_for(&walker, 5, DamageKind::Nail), &walker), 0);

        let mut soft = Unit::walker("W2", PlayerId(1));
        soft.armor_rating = 5;
        assert_eq!(pre_modify(&event_for(&soft, 5, DamageKind::Nail), &soft), 5);
    }
}
