//! Turn queue
//!
//! An ordered list of pending turns for the current phase. The index only
//! moves forward within a round; rebuilding the queue is how a new phase
//! starts over.

use serde::{Deserialize, Serialize};

use crate::core::types::{PlayerId, UnitId};

/// One scheduled opportunity to act
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Turn {
    pub player: PlayerId,
    /// Bound to a specific unit, or any of the player's units
    pub unit: Option<UnitId>,
    /// Part of a simultaneous block; ownership is checked by player, not
    /// by queue position
    pub simultaneous: bool,
}

impl Turn {
    pub fn for_player(player: PlayerId) -> Self {
        Self {
            player,
            unit: None,
            simultaneous: false,
        }
    }

    pub fn for_unit(player: PlayerId, unit: UnitId) -> Self {
        Self {
            player,
            unit: Some(unit),
            simultaneous: false,
        }
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct TurnQueue {
    turns: Vec<Turn>,
    index: usize,
}

impl TurnQueue {
    pub fn new() -> Self {
        Self::default()
    }

    /// Replace the queue for a new phase
    pub fn rebuild(&mut self, turns: Vec<Turn>) {
        self.turns = turns;
        self.index = 0;
    }

    pub fn current(&self) -> Option<&Turn> {
        self.turns.get(self.index)
    }

    pub fn current_index(&self) -> usize {
        self.index
    }

    pub fn is_exhausted(&self) -> bool {
        self.index >= self.turns.len()
    }

    pub fn len(&self) -> usize {
        self.turns.len()
    }

    pub fn is_empty(&self) -> bool {
        self.turns.is_empty()
    }

    /// Advance past the current turn. The index never moves backward.
    pub fn advance(&mut self) {
        if self.index < self.turns.len() {
            self.index += 1;
        }
    }

    /// Insert a turn directly after the current one, so a forced
    /// follow-up acts next without reordering anything else.
    pub fn insert_after_current(&mut self, turn: Turn) {
        let at = (self.index + 1).min(self.turns.len());
        self.turns.insert(at, turn);
    }

    /// Does `player` own the pending turn? In a simultaneous block any
    /// turn of theirs at or past the index qualifies.
    pub fn owns_current(&self, player: PlayerId) -> bool {
        match self.current() {
            None => false,
            Some(t) if t.simultaneous => self.turns[self.index..]
                .iter()
                .take_while(|t| t.simultaneous)
                .any(|t| t.player == player),
            Some(t) => t.player == player,
        }
    }

    /// The pending turn for `player` inside a simultaneous block
    pub fn turn_for(&self, player: PlayerId) -> Option<&Turn> {
        match self.current() {
            Some(t) if t.simultaneous => self.turns[self.index..]
                .iter()
                .take_while(|t| t.simultaneous)
                .find(|t| t.player == player),
            other => other.filter(|t| t.player == player),
        }
    }
}
