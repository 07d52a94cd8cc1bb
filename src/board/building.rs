//! Buildings: construction strength, basements, collapse
//!
//! A building's basement is unknown until something first enters the hex;
//! it is rolled lazily and then fixed for the rest of the match.

use rand::Rng;
use rand_chacha::ChaCha8Rng;
use serde::{Deserialize, Serialize};

/// Basement state under a building hex
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Basement {
    None,
    OneDeep,
    TwoDeep,
}

impl Basement {
    /// Depth in levels below ground
    pub fn depth(&self) -> u32 {
        match self {
            Basement::None => 0,
            Basement::OneDeep => 1,
            Basement::TwoDeep => 2,
        }
    }
}

/// A building occupying one hex
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Building {
    /// Construction factor - how much load/damage the structure takes
    pub construction_factor: u32,
    /// Height in levels above ground
    pub height: u32,
    /// Rolled lazily on first entry; `None` means not yet rolled
    pub basement: Option<Basement>,
    pub collapsed: bool,
    /// Collapse consequences already applied to occupants
    pub collapse_resolved: bool,
}

impl Building {
    pub fn new(construction_factor: u32, height: u32) -> Self {
        Self {
            construction_factor,
            height,
            basement: None,
            collapsed: false,
            collapse_resolved: false,
        }
    }

    /// Roll the basement if it has not been determined yet.
    ///
    /// Returns the basement state, newly rolled or previously fixed.
    pub fn roll_basement(&mut self, rng: &mut ChaCha8Rng) -> Basement {
        if let Some(b) = self.basement {
            return b;
        }
        let roll = rng.gen_range(2..=12);
        let rolled = match roll {
            2..=3 => Basement::TwoDeep,
            4..=5 => Basement::OneDeep,
            _ => Basement::None,
        };
        self.basement = Some(rolled);
        rolled
    }

    /// Does carrying `load` tons over this building bring it down?
    pub fn check_collapse(&self, load: u32) -> bool {
        !self.collapsed && load > self.construction_factor
    }

    /// Apply damage to the structure itself. Returns true if it collapsed.
    pub fn apply_damage(&mut self, damage: u32) -> bool {
        if self.collapsed {
            return false;
        }
        self.construction_factor = self.construction_factor.saturating_sub(damage);
        if self.construction_factor == 0 {
            self.collapsed = true;
        }
        self.collapsed
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;

    #[test]
    fn test_basement_rolled_once() {
        let mut rng = ChaCha8Rng::seed_from_u64(7);
        let mut b = Building::new(40, 2);
        let first = b.roll_basement(&mut rng);
        for _ in 0..10 {
            assert_eq!(b.roll_basement(&mut rng), first);
        }
    }

    #[test]
    fn test_collapse_under_load() {
        let b = Building::new(40, 2);
        assert!(!b.check_collapse(40));
        assert!(b.check_collapse(41));
    }

    #[test]
    fn test_damage_to_collapse() {
        let mut b = Building::new(10, 1);
        assert!(!b.apply_damage(4));
        assert!(b.apply_damage(6));
        assert!(b.collapsed);
        // Further damage is a no-op once down
        assert!(!b.apply_damage(100));
    }
}
