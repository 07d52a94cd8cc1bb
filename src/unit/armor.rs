//! Armor material families and their damage-modifier math
//!
//! A family changes how incoming damage is absorbed before and during the
//! armor drain. The per-family rules live here; the per-category ordering
//! of their application lives in the damage procedures.

use serde::{Deserialize, Serialize};

use crate::damage::DamageKind;

/// Armor material family
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
pub enum ArmorFamily {
    #[default]
    Standard,
    /// Sheds a fifth of any hit that is not armor-piercing
    FerroLamellor,
    /// Halves ballistic and missile hits
    BallisticReinforced,
    /// Sheds a third of non-ballistic physical hits
    ImpactResistant,
    /// Brittle against physical blows; doubles them up to half its
    /// remaining plate
    Reflective,
    /// Halves missile and area-effect hits; shares the reflective
    /// weakness to physical blows
    Reactive,
    /// Stored at double scale, absorbs at half rate, dampens criticals
    Hardened,
}

impl ArmorFamily {
    /// Families whose plating seals against chemical attack
    pub fn chemically_resistant(&self) -> bool {
        matches!(
            self,
            ArmorFamily::Hardened | ArmorFamily::FerroLamellor | ArmorFamily::Reactive
        )
    }

    /// Families that suppress special-critical accumulation
    pub fn suppresses_special_crits(&self) -> bool {
        matches!(
            self,
            ArmorFamily::Hardened | ArmorFamily::FerroLamellor | ArmorFamily::Reactive
        )
    }

    /// Penalty applied to critical-roll bonuses earned through this armor
    pub fn crit_bonus_penalty(&self) -> i32 {
        if *self == ArmorFamily::Hardened {
            -2
        } else {
            0
        }
    }

    /// Apply this family's absorption modifier to `damage` about to drain
    /// armor. `current_armor` is the facing layer's remaining value at
    /// display scale. Physical-doubling families return more than they
    /// were given.
    pub fn modify_damage(
        &self,
        damage: u32,
        kind: DamageKind,
        area_effect: bool,
        current_armor: u32,
    ) -> u32 {
        if damage == 0 {
            return 0;
        }
        match self {
            ArmorFamily::Standard => damage,
            ArmorFamily::FerroLamellor => {
                if kind == DamageKind::ArmorPiercing {
                    damage
                } else {
                    damage - damage / 5
                }
            }
            ArmorFamily::BallisticReinforced => {
                if matches!(kind, DamageKind::Ballistic | DamageKind::Missile) {
                    (damage / 2).max(1)
                } else {
                    damage
                }
            }
            ArmorFamily::ImpactResistant => {
                if kind == DamageKind::Physical {
                    (damage - damage / 3).max(1)
                } else {
                    damage
                }
            }
            ArmorFamily::Reflective => {
                if kind == DamageKind::Physical {
                    damage + damage.min(current_armor / 2)
                } else {
                    damage
                }
            }
            ArmorFamily::Reactive => {
                if kind == DamageKind::Missile || area_effect {
                    (damage / 2).max(1)
                } else if kind == DamageKind::Physical {
                    damage + damage.min(current_armor / 2)
                } else {
                    damage
                }
            }
            // Half-rate absorption comes from double-scale storage; the
            // incoming amount is not modified here.
            ArmorFamily::Hardened => damage,
        }
    }
}
