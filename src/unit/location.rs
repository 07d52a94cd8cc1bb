//! Hit locations, depletable points and transfer tables
//!
//! Every unit kind addresses its damage zones through `LocationId` indices
//! into the unit's location vector. When a location's structure is
//! exhausted, its transfer table says where overflow goes next.

use serde::{Deserialize, Serialize};

use crate::unit::armor::ArmorFamily;
use crate::unit::UnitKind;

/// Index of a location on a unit
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
pub struct LocationId(pub usize);

// Walker locations (shared by light bipeds)
pub const HEAD: LocationId = LocationId(0);
pub const CENTER_TORSO: LocationId = LocationId(1);
pub const LEFT_TORSO: LocationId = LocationId(2);
pub const RIGHT_TORSO: LocationId = LocationId(3);
pub const LEFT_ARM: LocationId = LocationId(4);
pub const RIGHT_ARM: LocationId = LocationId(5);
pub const LEFT_LEG: LocationId = LocationId(6);
pub const RIGHT_LEG: LocationId = LocationId(7);

// Vehicle locations
pub const VEH_FRONT: LocationId = LocationId(0);
pub const VEH_LEFT: LocationId = LocationId(1);
pub const VEH_RIGHT: LocationId = LocationId(2);
pub const VEH_REAR: LocationId = LocationId(3);
pub const VEH_TURRET: LocationId = LocationId(4);
pub const VEH_ROTOR: LocationId = LocationId(5);

// Aerospace locations
pub const AERO_NOSE: LocationId = LocationId(0);
pub const AERO_LEFT_WING: LocationId = LocationId(1);
pub const AERO_RIGHT_WING: LocationId = LocationId(2);
pub const AERO_AFT: LocationId = LocationId(3);

/// Armor or structure points. `Destroyed` is the terminal sentinel:
/// once a layer reaches it, it never recovers. Values never go negative.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Points {
    Intact(u32),
    Destroyed,
}

/// Outcome of draining points by some damage amount
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Drain {
    pub absorbed: u32,
    pub overflow: u32,
}

impl Points {
    /// Remaining value; destroyed counts as zero
    pub fn value(&self) -> u32 {
        match self {
            Points::Intact(v) => *v,
            Points::Destroyed => 0,
        }
    }

    pub fn is_destroyed(&self) -> bool {
        matches!(self, Points::Destroyed)
    }

    /// Absorb up to `amount`. Damage exceeding the remaining value marks
    /// the layer destroyed; a layer that fully absorbs stays intact, even
    /// at zero points.
    pub fn drain(&mut self, amount: u32) -> Drain {
        match *self {
            Points::Destroyed => Drain {
                absorbed: 0,
                overflow: amount,
            },
            Points::Intact(v) => {
                if amount > v {
                    *self = Points::Destroyed;
                    Drain {
                        absorbed: v,
                        overflow: amount - v,
                    }
                } else {
                    *self = Points::Intact(v - amount);
                    Drain {
                        absorbed: amount,
                        overflow: 0,
                    }
                }
            }
        }
    }
}

impl Default for Points {
    fn default() -> Self {
        Points::Intact(0)
    }
}

/// Explosion containment fitted at a location
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
pub enum CaseKind {
    #[default]
    None,
    Case,
    CaseII,
}

impl CaseKind {
    pub fn vents(&self) -> bool {
        !matches!(self, CaseKind::None)
    }
}

/// Per-location mutable state
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LocationState {
    pub armor: Points,
    /// Torso locations carry separate rear plating
    pub rear_armor: Option<Points>,
    pub structure: Points,
    pub family: ArmorFamily,
    pub destroyed: bool,
    /// Severed by a side-torso kill rather than by structure cascade
    pub blown_off: bool,
    pub damage_this_phase: u32,
    pub case: CaseKind,
}

impl LocationState {
    pub fn new(armor: u32, structure: u32, family: ArmorFamily) -> Self {
        // Hardened plating is tracked at double scale; each point of real
        // armor stores as two, so half-rate absorption and the odd-damage
        // carry fall out of ordinary integer draining.
        let stored = if family == ArmorFamily::Hardened {
            armor * 2
        } else {
            armor
        };
        Self {
            armor: Points::Intact(stored),
            rear_armor: None,
            structure: Points::Intact(structure),
            family,
            destroyed: false,
            blown_off: false,
            damage_this_phase: 0,
            case: CaseKind::None,
        }
    }

    pub fn with_rear(mut self, rear: u32) -> Self {
        let stored = if self.family == ArmorFamily::Hardened {
            rear * 2
        } else {
            rear
        };
        self.rear_armor = Some(Points::Intact(stored));
        self
    }

    pub fn with_case(mut self, case: CaseKind) -> Self {
        self.case = case;
        self
    }

    /// Armor points at client display scale (hardened stores double)
    pub fn display_armor(&self) -> u32 {
        let raw = self.armor.value();
        if self.family == ArmorFamily::Hardened {
            (raw + 1) / 2
        } else {
            raw
        }
    }

    /// The armor layer facing the hit
    pub fn armor_facing(&mut self, rear: bool) -> &mut Points {
        if rear {
            if let Some(r) = self.rear_armor.as_mut() {
                return r;
            }
        }
        &mut self.armor
    }
}

/// Where overflow damage goes when a location's structure is exhausted
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Transfer {
    /// Carry remaining damage to this location
    To(LocationId),
    /// The whole unit is destroyed
    Destroyed,
    /// Remaining damage is dropped
    None,
}

/// Transfer target for a location on a unit of the given kind.
///
/// Chains are finite by construction: every `To` entry points strictly
/// inward (limb to torso, side torso to center), and the center ends in
/// `Destroyed`.
pub fn transfer_target(kind: UnitKind, loc: LocationId) -> Transfer {
    match kind {
        UnitKind::Walker | UnitKind::LightBiped => match loc {
            HEAD => Transfer::Destroyed,
            CENTER_TORSO => Transfer::Destroyed,
            LEFT_TORSO | RIGHT_TORSO => Transfer::To(CENTER_TORSO),
            LEFT_ARM | LEFT_LEG => Transfer::To(LEFT_TORSO),
            RIGHT_ARM | RIGHT_LEG => Transfer::To(RIGHT_TORSO),
            _ => Transfer::None,
        },
        UnitKind::Vehicle => match loc {
            VEH_TURRET => Transfer::To(VEH_FRONT),
            VEH_ROTOR => Transfer::Destroyed,
            _ => Transfer::Destroyed,
        },
        UnitKind::Aerospace => match loc {
            AERO_LEFT_WING | AERO_RIGHT_WING => Transfer::To(AERO_NOSE),
            _ => Transfer::Destroyed,
        },
        // Trooper locations do not cascade into each other
        UnitKind::PoweredArmor | UnitKind::Infantry => Transfer::None,
        // Squadrons redirect before any location work happens
        UnitKind::Squadron => Transfer::None,
    }
}

/// Number of locations a unit of this kind carries
pub fn location_count(kind: UnitKind) -> usize {
    match kind {
        UnitKind::Walker | UnitKind::LightBiped => 8,
        UnitKind::Vehicle => 6,
        UnitKind::Aerospace => 4,
        UnitKind::PoweredArmor => 4,
        UnitKind::Infantry => 1,
        UnitKind::Squadron => 0,
    }
}

/// Human-readable location name for reports and logs
pub fn location_name(kind: UnitKind, loc: LocationId) -> &'static str {
    match kind {
        UnitKind::Walker | UnitKind::LightBiped => match loc {
            HEAD => "head",
            CENTER_TORSO => "center torso",
            LEFT_TORSO => "left torso",
            RIGHT_TORSO => "right torso",
            LEFT_ARM => "left arm",
            RIGHT_ARM => "right arm",
            LEFT_LEG => "left leg",
            RIGHT_LEG => "right leg",
            _ => "unknown",
        },
        UnitKind::Vehicle => match loc {
            VEH_FRONT => "front",
            VEH_LEFT => "left side",
            VEH_RIGHT => "right side",
            VEH_REAR => "rear",
            VEH_TURRET => "turret",
            VEH_ROTOR => "rotor",
            _ => "unknown",
        },
        UnitKind::Aerospace => match loc {
            AERO_NOSE => "nose",
            AERO_LEFT_WING => "left wing",
            AERO_RIGHT_WING => "right wing",
            AERO_AFT => "aft",
            _ => "unknown",
        },
        UnitKind::PoweredArmor | UnitKind::Infantry => "trooper",
        UnitKind::Squadron => "squadron",
    }
}

/// Is this a limb that can be severed and dropped as debris?
pub fn is_limb(kind: UnitKind, loc: LocationId) -> bool {
    matches!(kind, UnitKind::Walker | UnitKind::LightBiped)
        && matches!(loc, LEFT_ARM | RIGHT_ARM | LEFT_LEG | RIGHT_LEG)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_drain_partial() {
        let mut p = Points::Intact(10);
        let d = p.drain(4);
        assert_eq!(d, Drain { absorbed: 4, overflow: 0 });
        assert_eq!(p, Points::Intact(6));
    }

    #[test]
    fn test_drain_exact_stays_intact() {
        let mut p = Points::Intact(5);
        let d = p.drain(5);
        assert_eq!(d.overflow, 0);
        assert_eq!(p, Points::Intact(0));
        assert!(!p.is_destroyed());
    }

    #[test]
    fn test_drain_overflow_destroys() {
        let mut p = Points::Intact(5);
        let d = p.drain(8);
        assert_eq!(d, Drain { absorbed: 5, overflow: 3 });
        assert!(p.is_destroyed());
    }

    #[test]
    fn test_destroyed_absorbs_nothing() {
        let mut p = Points::Destroyed;
        let d = p.drain(7);
        assert_eq!(d, Drain { absorbed: 0, overflow: 7 });
    }

    #[test]
    fn test_walker_transfer_chain_terminates() {
        // From any walker location, following transfers must reach a
        // terminal within the location count.
        for i in 0..location_count(UnitKind::Walker) {
            let mut loc = LocationId(i);
            let mut hops = 0;
            loop {
                match transfer_target(UnitKind::Walker, loc) {
                    Transfer::To(next) => {
                        loc = next;
                        hops += 1;
                        assert!(hops <= location_count(UnitKind::Walker));
                    }
                    Transfer::Destroyed | Transfer::None => break,
                }
            }
        }
    }

    #[test]
    fn test_hardened_stores_double() {
        let loc = LocationState::new(6, 3, ArmorFamily::Hardened);
        assert_eq!(loc.armor.value(), 12);
        assert_eq!(loc.display_armor(), 6);
    }

    #[test]
    fn test_hardened_display_rounds_up() {
        let mut loc = LocationState::new(6, 3, ArmorFamily::Hardened);
        loc.armor.drain(3);
        // 9 stored points display as 5 with the carry bit
        assert_eq!(loc.display_armor(), 5);
    }

    #[test]
    fn test_rear_armor_facing() {
        let mut loc = LocationState::new(10, 5, ArmorFamily::Standard).with_rear(4);
        assert_eq!(loc.armor_facing(true).value(), 4);
        assert_eq!(loc.armor_facing(false).value(), 10);
    }
}
