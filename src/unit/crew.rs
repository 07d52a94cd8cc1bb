//! Crew and pilot state
//!
//! Tracks wounds, consciousness and ejection. Destruction consequences and
//! end-of-round wakeup both act through this.

use rand::Rng;
use rand_chacha::ChaCha8Rng;
use serde::{Deserialize, Serialize};

/// Wounds at which a crew member dies
pub const LETHAL_HITS: u32 = 6;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CrewState {
    pub hits: u32,
    pub conscious: bool,
    /// Turns of stun remaining (vehicle crews knocked about by venting)
    pub stunned_turns: u32,
    pub ejected: bool,
    pub dead: bool,
}

impl Default for CrewState {
    fn default() -> Self {
        Self {
            hits: 0,
            conscious: true,
            stunned_turns: 0,
            ejected: false,
            dead: false,
        }
    }
}

impl CrewState {
    pub fn new() -> Self {
        Self::default()
    }

    /// Can this crew still operate the unit?
    pub fn active(&self) -> bool {
        !self.dead && !self.ejected && self.conscious && self.stunned_turns == 0
    }

    /// Apply one wound. Rolls consciousness: the target climbs with each
    /// accumulated hit, so wounded crews fade fast.
    pub fn apply_hit(&mut self, rng: &mut ChaCha8Rng) {
        if self.dead || self.ejected {
            return;
        }
        self.hits += 1;
        if self.hits >= LETHAL_HITS {
            self.kill();
            return;
        }
        let roll = rng.gen_range(2..=12);
        if roll < 3 + self.hits {
            self.conscious = false;
        }
    }

    pub fn kill(&mut self) {
        self.dead = true;
        self.conscious = false;
    }

    pub fn eject(&mut self) {
        if !self.dead {
            self.ejected = true;
        }
    }

    pub fn stun(&mut self, turns: u32) {
        if !self.dead && !self.ejected {
            self.stunned_turns = self.stunned_turns.max(turns);
        }
    }

    /// End-of-round recovery: tick down stun, roll to wake an unconscious
    /// crew. Returns true if the crew woke this round.
    pub fn recover(&mut self, rng: &mut ChaCha8Rng) -> bool {
        if self.dead || self.ejected {
            return false;
        }
        if self.stunned_turns > 0 {
            self.stunned_turns -= 1;
        }
        if !self.conscious {
            let roll = rng.gen_range(2..=12);
            if roll >= 3 + self.hits {
                self.conscious = true;
                return true;
            }
        }
        false
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;

    #[test]
    fn test_fresh_crew_active() {
        assert!(CrewState::new().active());
    }

    #[test]
    fn test_lethal_hits_kill() {
        let mut rng = ChaCha8Rng::seed_from_u64(1);
        let mut crew = CrewState::new();
        for _ in 0..LETHAL_HITS {
            crew.apply_hit(&mut rng);
        }
        assert!(crew.dead);
        assert!(!crew.active());
    }

    #[test]
    fn test_dead_crew_cannot_eject() {
        let mut crew = CrewState::new();
        crew.kill();
        crew.eject();
        assert!(!crew.ejected);
    }

    #[test]
    fn test_stun_blocks_activity_and_recovers() {
        let mut rng = ChaCha8Rng::seed_from_u64(2);
        let mut crew = CrewState::new();
        crew.stun(2);
        assert!(!crew.active());
        crew.recover(&mut rng);
        crew.recover(&mut rng);
        assert!(crew.active());
    }

    #[test]
    fn test_stun_takes_longest_duration() {
        let mut crew = CrewState::new();
        crew.stun(3);
        crew.stun(1);
        assert_eq!(crew.stunned_turns, 3);
    }
}
