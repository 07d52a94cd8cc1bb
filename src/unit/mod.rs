//! Combat units
//!
//! A `Unit` is one controllable participant. Its kind is one of a closed
//! set of seven categories; damage resolution dispatches on the kind, so
//! the set is exhaustive by construction.

pub mod armor;
pub mod crew;
pub mod location;

use serde::{Deserialize, Serialize};

use crate::board::hex::{Facing, HexCoord};
use crate::core::types::{BoardId, PlayerId, Round, UnitId};
use location::location_count;

pub use armor::ArmorFamily;
pub use crew::CrewState;
pub use location::{CaseKind, LocationId, LocationState, Points};

/// The closed set of unit categories
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum UnitKind {
    /// Armored walker
    Walker,
    /// Small bipedal light unit; shares the walker frame with less structure
    LightBiped,
    /// Ground vehicle, including flight-capable rotor craft
    Vehicle,
    /// Aerospace craft, optionally capital scale
    Aerospace,
    /// Powered-armor trooper squad
    PoweredArmor,
    /// Conventional infantry squad
    Infantry,
    /// Fighter-squadron aggregate
    Squadron,
}

impl UnitKind {
    /// Infantry-class targets for fragmentation/incendiary purposes
    pub fn is_infantry_class(&self) -> bool {
        matches!(self, UnitKind::Infantry | UnitKind::PoweredArmor)
    }
}

/// Board placement of a deployed unit
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Position {
    pub board: BoardId,
    pub coord: HexCoord,
    pub facing: Facing,
    /// Elevation above ground for ground units, altitude for aerospace
    pub elevation: i32,
}

/// Motive system condition ladder for ground vehicles
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize, Default)]
pub enum MotiveStatus {
    #[default]
    Intact,
    Minor,
    Moderate,
    Heavy,
    Immobile,
}

impl MotiveStatus {
    /// One more step down the ladder
    pub fn degrade(&self) -> Self {
        match self {
            MotiveStatus::Intact => MotiveStatus::Minor,
            MotiveStatus::Minor => MotiveStatus::Moderate,
            MotiveStatus::Moderate => MotiveStatus::Heavy,
            _ => MotiveStatus::Immobile,
        }
    }
}

/// Internal frame variant for walkers
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
pub enum StructureKind {
    #[default]
    Standard,
    /// Light frame that takes structural damage doubled
    Composite,
    /// Braced frame that halves structural damage, carrying remainders
    Reinforced,
}

/// One ammunition bin
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AmmoBin {
    pub location: location::LocationId,
    pub rounds: u32,
    pub damage_per_round: u32,
    /// Being thrown overboard at end of round
    pub dumping: bool,
}

impl AmmoBin {
    pub fn explosion_damage(&self) -> u32 {
        self.rounds * self.damage_per_round
    }
}

/// One controllable combat unit
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Unit {
    pub id: UnitId,
    pub owner: PlayerId,
    pub name: String,
    pub kind: UnitKind,
    pub locations: Vec<LocationState>,
    pub crew: CrewState,
    pub ammo: Vec<AmmoBin>,
    pub position: Option<Position>,

    // Status
    pub destroyed: bool,
    pub deployed: bool,
    /// Acted in the current phase
    pub done: bool,
    pub hidden: bool,
    /// Round on which an off-board or hidden unit enters play
    pub scheduled_round: Option<Round>,
    pub shut_down: bool,
    /// Tactical drop still descending
    pub drop_in_progress: bool,

    // Walker specifics
    /// Shield/cowl pre-absorption pool
    pub shield_points: u32,
    pub structure_kind: StructureKind,
    /// Odd structural point held back by a reinforced frame
    pub reinforced_carry: bool,
    pub engine_hits: u32,
    pub heat: i32,
    pub heat_sinks: u32,

    // Vehicle specifics
    pub motive: MotiveStatus,
    pub flight_capable: bool,

    // Aerospace specifics
    pub capital_scale: bool,
    pub structural_integrity: Points,
    /// Separate capital-armor pool for squadron-member fighters
    pub capital_armor: Option<u32>,
    pub velocity: i32,

    // Infantry specifics
    pub troopers: u32,
    pub max_troopers: u32,
    /// Parity bit for the armor/trooper damage split
    pub split_carry: bool,
    /// Powered armor: a prior critical hit primes the next location kill
    pub primed_by_crit: bool,

    // Relations
    pub carried_by: Option<UnitId>,
    pub cargo: Vec<UnitId>,
    /// Unit currently swarming this one
    pub swarmed_by: Option<UnitId>,
    /// Unit this one is swarming
    pub swarming: Option<UnitId>,
    pub squadron_members: Vec<UnitId>,

    // Chassis data
    pub mass: u32,
    /// Barrier rating of the plating; nail/rivet hits bounce off high ratings
    pub armor_rating: u32,
    pub can_tactical_drop: bool,
    pub artillery: bool,
    /// Heavy industrial chassis; must check building floors under its mass
    pub industrial: bool,

    // End-of-round bookkeeping
    pub equipment_cooldown: u32,
    pub self_destruct_armed: bool,
    /// Scheduled defection; ownership flips at end of round
    pub traitor_to: Option<PlayerId>,
}

impl Unit {
    fn base(name: &str, owner: PlayerId, kind: UnitKind) -> Self {
        Self {
            id: UnitId::new(),
            owner,
            name: name.to_string(),
            kind,
            locations: Vec::new(),
            crew: CrewState::new(),
            ammo: Vec::new(),
            position: None,
            destroyed: false,
            deployed: false,
            done: false,
            hidden: false,
            scheduled_round: None,
            shut_down: false,
            drop_in_progress: false,
            shield_points: 0,
            structure_kind: StructureKind::Standard,
            reinforced_carry: false,
            engine_hits: 0,
            heat: 0,
            heat_sinks: 10,
            motive: MotiveStatus::Intact,
            flight_capable: false,
            capital_scale: false,
            structural_integrity: Points::Intact(0),
            capital_armor: None,
            velocity: 0,
            troopers: 0,
            max_troopers: 0,
            split_carry: false,
            primed_by_crit: false,
            carried_by: None,
            cargo: Vec::new(),
            swarmed_by: None,
            swarming: None,
            squadron_members: Vec::new(),
            mass: 0,
            armor_rating: 10,
            can_tactical_drop: false,
            artillery: false,
            industrial: false,
            equipment_cooldown: 0,
            self_destruct_armed: false,
            traitor_to: None,
        }
    }

    /// Medium armored walker with standard plating
    pub fn walker(name: &str, owner: PlayerId) -> Self {
        let mut unit = Self::base(name, owner, UnitKind::Walker);
        unit.mass = 50;
        let specs: [(u32, u32, Option<u32>); 8] = [
            (9, 3, None),       // head
            (16, 16, Some(5)),  // center torso
            (12, 12, Some(4)),  // left torso
            (12, 12, Some(4)),  // right torso
            (8, 8, None),       // left arm
            (8, 8, None),       // right arm
            (12, 12, None),     // left leg
            (12, 12, None),     // right leg
        ];
        for (armor, structure, rear) in specs {
            let mut loc = LocationState::new(armor, structure, ArmorFamily::Standard);
            if let Some(r) = rear {
                loc = loc.with_rear(r);
            }
            unit.locations.push(loc);
        }
        unit
    }

    /// Light bipedal unit: the walker frame at a fraction of the scale
    pub fn light_biped(name: &str, owner: PlayerId) -> Self {
        let mut unit = Self::base(name, owner, UnitKind::LightBiped);
        unit.mass = 15;
        for i in 0..location_count(UnitKind::LightBiped) {
            let (armor, structure) = if i == 0 { (2, 1) } else { (4, 2) };
            unit.locations
                .push(LocationState::new(armor, structure, ArmorFamily::Standard));
        }
        unit
    }

    /// Tracked ground vehicle
    pub fn vehicle(name: &str, owner: PlayerId) -> Self {
        let mut unit = Self::base(name, owner, UnitKind::Vehicle);
        unit.mass = 40;
        let specs: [(u32, u32); 6] = [
            (18, 4), // front
            (14, 4), // left
            (14, 4), // right
            (10, 4), // rear
            (16, 4), // turret
            (0, 0),  // rotor, absent on ground vehicles
        ];
        for (armor, structure) in specs {
            unit.locations
                .push(LocationState::new(armor, structure, ArmorFamily::Standard));
        }
        unit.locations[location::VEH_ROTOR.0].destroyed = true;
        unit
    }

    /// Flight-capable rotor craft
    pub fn rotor_craft(name: &str, owner: PlayerId) -> Self {
        let mut unit = Self::vehicle(name, owner);
        unit.name = name.to_string();
        unit.mass = 25;
        unit.flight_capable = true;
        unit.locations[location::VEH_ROTOR.0] =
            LocationState::new(2, 2, ArmorFamily::Standard);
        unit
    }

    /// Aerospace fighter
    pub fn aerospace(name: &str, owner: PlayerId) -> Self {
        let mut unit = Self::base(name, owner, UnitKind::Aerospace);
        unit.mass = 45;
        let specs: [(u32, u32); 4] = [
            (24, 1), // nose
            (18, 1), // left wing
            (18, 1), // right wing
            (16, 1), // aft
        ];
        for (armor, structure) in specs {
            unit.locations
                .push(LocationState::new(armor, structure, ArmorFamily::Standard));
        }
        unit.structural_integrity = Points::Intact(8);
        unit.can_tactical_drop = false;
        unit
    }

    /// Powered-armor squad of four troopers
    pub fn powered_armor_squad(name: &str, owner: PlayerId) -> Self {
        let mut unit = Self::base(name, owner, UnitKind::PoweredArmor);
        unit.mass = 4;
        for _ in 0..location_count(UnitKind::PoweredArmor) {
            unit.locations
                .push(LocationState::new(9, 1, ArmorFamily::Standard));
        }
        unit.troopers = 4;
        unit.max_troopers = 4;
        unit.can_tactical_drop = true;
        unit
    }

    /// Conventional infantry squad
    pub fn infantry_squad(name: &str, owner: PlayerId) -> Self {
        let mut unit = Self::base(name, owner, UnitKind::Infantry);
        unit.mass = 2;
        unit.locations
            .push(LocationState::new(4, 0, ArmorFamily::Standard));
        unit.troopers = 7;
        unit.max_troopers = 7;
        unit
    }

    /// Fighter-squadron aggregate over already-created member fighters
    pub fn squadron(name: &str, owner: PlayerId, members: Vec<UnitId>) -> Self {
        let mut unit = Self::base(name, owner, UnitKind::Squadron);
        unit.squadron_members = members;
        unit
    }

    pub fn with_armor_family(mut self, family: ArmorFamily) -> Self {
        for i in 0..self.locations.len() {
            let old = &self.locations[i];
            if old.destroyed {
                continue;
            }
            let armor = old.display_armor();
            let rear = old.rear_armor.as_ref().map(|r| {
                if old.family == ArmorFamily::Hardened {
                    (r.value() + 1) / 2
                } else {
                    r.value()
                }
            });
            let mut loc = LocationState::new(armor, old.structure.value(), family);
            if let Some(r) = rear {
                loc = loc.with_rear(r);
            }
            loc.case = old.case;
            self.locations[i] = loc;
        }
        self
    }

    pub fn with_case(mut self, loc: location::LocationId, case: CaseKind) -> Self {
        self.locations[loc.0].case = case;
        self
    }

    // === ACCESSORS ===

    pub fn location(&self, loc: location::LocationId) -> &LocationState {
        &self.locations[loc.0]
    }

    pub fn location_mut(&mut self, loc: location::LocationId) -> &mut LocationState {
        &mut self.locations[loc.0]
    }

    /// Still on the table and fighting
    pub fn is_active(&self) -> bool {
        !self.destroyed && self.deployed && !self.crew.dead && !self.crew.ejected
    }

    /// Destruction is terminal; nothing reactivates a dead unit
    pub fn mark_destroyed(&mut self) {
        self.destroyed = true;
        for loc in &mut self.locations {
            loc.destroyed = true;
            loc.structure = Points::Destroyed;
        }
    }

    /// Clear per-phase bookkeeping
    pub fn reset_phase_state(&mut self) {
        self.done = false;
        for loc in &mut self.locations {
            loc.damage_this_phase = 0;
        }
    }

    /// Total structure remaining across locations
    pub fn total_structure(&self) -> u32 {
        self.locations.iter().map(|l| l.structure.value()).sum()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::unit::location::{CENTER_TORSO, HEAD, VEH_ROTOR};

    #[test]
    fn test_walker_locations() {
        let w = Unit::walker("Test", PlayerId(1));
        assert_eq!(w.locations.len(), 8);
        assert_eq!(w.location(HEAD).armor.value(), 9);
        assert!(w.location(CENTER_TORSO).rear_armor.is_some());
    }

    #[test]
    fn test_ground_vehicle_has_no_rotor() {
        let v = Unit::vehicle("Test", PlayerId(1));
        assert!(v.location(VEH_ROTOR).destroyed);
        let r = Unit::rotor_craft("Test", PlayerId(1));
        assert!(!r.location(VEH_ROTOR).destroyed);
        assert!(r.flight_capable);
    }

    #[test]
    fn test_destruction_is_terminal() {
        let mut w = Unit::walker("Test", PlayerId(1));
        w.deployed = true;
        w.mark_destroyed();
        assert!(!w.is_active());
        assert!(w.location(HEAD).structure.is_destroyed());
    }

    #[test]
    fn test_armor_family_rebuild_keeps_values() {
        let w = Unit::walker("Test", PlayerId(1)).with_armor_family(ArmorFamily::Hardened);
        // Hardened stores double, displays the original
        assert_eq!(w.location(HEAD).display_armor(), 9);
        assert_eq!(w.location(HEAD).armor.value(), 18);
    }

    #[test]
    fn test_infantry_squad_troopers() {
        let i = Unit::infantry_squad("Rifle Squad", PlayerId(2));
        assert_eq!(i.troopers, 7);
        assert_eq!(i.locations.len(), 1);
    }

    #[test]
    fn test_phase_reset_clears_damage_tally() {
        let mut w = Unit::walker("Test", PlayerId(1));
        w.location_mut(HEAD).damage_this_phase = 5;
        w.done = true;
        w.reset_phase_state();
        assert_eq!(w.location(HEAD).damage_this_phase, 0);
        assert!(!w.done);
    }
}
