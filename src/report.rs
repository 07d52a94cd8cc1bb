//! Ordered report log
//!
//! Every semantic state change leaves the core as a `Report`: a typed,
//! immutable record appended to an ordered log. The variant is the message
//! identifier, its fields are the typed arguments. Clients render them;
//! replay consumes them. Nothing here is ever mutated after creation.

use serde::{Deserialize, Serialize};

use crate::core::types::{PlayerId, Round, UnitId};
use crate::phase::Phase;
use crate::unit::location::LocationId;

/// One structured event record
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Report {
    pub round: Round,
    pub phase: Phase,
    pub kind: ReportKind,
}

/// Message identifier plus typed arguments
#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum ReportKind {
    // === DAMAGE RESOLUTION ===
    DamageApplied {
        target: UnitId,
        location: LocationId,
        amount: u32,
    },
    ShieldAbsorbed {
        target: UnitId,
        absorbed: u32,
    },
    ArmorAbsorbed {
        target: UnitId,
        location: LocationId,
        absorbed: u32,
        remaining_armor: u32,
    },
    ArmorDestroyed {
        target: UnitId,
        location: LocationId,
    },
    StructureDamaged {
        target: UnitId,
        location: LocationId,
        absorbed: u32,
        remaining_structure: u32,
    },
    StructureBreached {
        target: UnitId,
        location: LocationId,
    },
    LocationDestroyed {
        target: UnitId,
        location: LocationId,
    },
    LimbBlownOff {
        target: UnitId,
        location: LocationId,
    },
    DamageTransferred {
        target: UnitId,
        from: LocationId,
        to: LocationId,
        amount: u32,
    },
    DamageVented {
        target: UnitId,
        location: LocationId,
        amount: u32,
    },
    DamageWasted {
        target: UnitId,
        amount: u32,
    },
    OverPenetration {
        target: UnitId,
        from: LocationId,
        to: LocationId,
    },
    CapitalRescale {
        target: UnitId,
        before: u32,
        after: u32,
    },
    CriticalRoll {
        target: UnitId,
        location: LocationId,
        roll: u32,
        hits: u32,
    },
    CriticalEffect {
        target: UnitId,
        location: LocationId,
        effect: String,
    },
    AmmoExplosion {
        target: UnitId,
        location: LocationId,
        damage: u32,
    },
    UnitDestroyed {
        target: UnitId,
    },
    TroopersLost {
        target: UnitId,
        lost: u32,
        remaining: u32,
    },
    SquadronRedirect {
        squadron: UnitId,
        member: UnitId,
    },
    PassengerHit {
        carrier: UnitId,
        passenger: UnitId,
        amount: u32,
    },
    SwarmAttackerHit {
        target: UnitId,
        attacker: UnitId,
        amount: u32,
    },

    ForcedGrounding {
        unit: UnitId,
    },

    // === CREW ===
    CrewStunned {
        unit: UnitId,
        turns: u32,
    },
    CrewKilled {
        unit: UnitId,
    },
    CrewEjected {
        unit: UnitId,
    },
    CrewWoke {
        unit: UnitId,
    },

    // === DEPLOYMENT ===
    UnitDeployed {
        unit: UnitId,
        player: PlayerId,
    },
    UnitLoaded {
        loader: UnitId,
        loaded: UnitId,
    },
    UnitUnloaded {
        loader: UnitId,
        unloaded: UnitId,
    },
    BasementRevealed {
        unit: UnitId,
        depth: u32,
    },
    BuildingCollapsed {
        unit: UnitId,
    },

    // === PHASE MACHINE ===
    PhaseBegan {
        phase: Phase,
    },
    InitiativeRolled {
        player: PlayerId,
        roll: u32,
    },
    SurvivalCheckFailed {
        unit: UnitId,
    },
    Autosave,
    HeatResolved {
        unit: UnitId,
        heat: i32,
    },
    ShutdownCheck {
        unit: UnitId,
        shut_down: bool,
    },
    WindShift {
        strength: u32,
    },
    GameOver {
        victor: Option<PlayerId>,
    },

    // === PROTOCOL ===
    /// Sent back to a rejected submitter so it can resynchronize
    Resync {
        player: PlayerId,
        phase: Phase,
        turn_index: usize,
    },
}

/// Append-only ordered sequence of reports
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ReportLog {
    reports: Vec<Report>,
}

impl ReportLog {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, round: Round, phase: Phase, kind: ReportKind) {
        self.reports.push(Report { round, phase, kind });
    }

    pub fn len(&self) -> usize {
        self.reports.len()
    }

    pub fn is_empty(&self) -> bool {
        self.reports.is_empty()
    }

    pub fn iter(&self) -> impl DoubleEndedIterator<Item = &Report> {
        self.reports.iter()
    }

    /// Reports appended after `mark` (for returning just the records a
    /// single command produced)
    pub fn since(&self, mark: usize) -> &[Report] {
        &self.reports[mark.min(self.reports.len())..]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_log_is_ordered() {
        let mut log = ReportLog::new();
        log.push(1, Phase::Firing, ReportKind::Autosave);
        log.push(1, Phase::Firing, ReportKind::WindShift { strength: 2 });

        let kinds: Vec<_> = log.iter().map(|r| &r.kind).collect();
        assert!(matches!(kinds[0], ReportKind::Autosave));
        assert!(matches!(kinds[1], ReportKind::WindShift { .. }));
    }

    #[test]
    fn test_since_returns_new_reports() {
        let mut log = ReportLog::new();
        log.push(1, Phase::Firing, ReportKind::Autosave);
        let mark = log.len();
        log.push(1, Phase::Firing, ReportKind::WindShift { strength: 1 });

        let new = log.since(mark);
        assert_eq!(new.len(), 1);
        assert!(matches!(new[0].kind, ReportKind::WindShift { .. }));
    }

    #[test]
    fn test_since_past_end_is_empty() {
        let log = ReportLog::new();
        assert!(log.since(10).is_empty());
    }
}
