//! Per-phase handlers and the orchestrator driver
//!
//! Each phase's entry action and successor choice live behind the
//! `PhaseHandler` trait; `advance` is a small driver over the table.

use crate::core::dice::two_d6;
use crate::core::types::PlayerId;
use crate::damage::criticals::{self, DestructionCause};
use crate::game::Game;
use crate::phase::turn::Turn;
use crate::phase::Phase;
use crate::report::ReportKind;
use crate::unit::UnitKind;

/// Entry action and successor choice for one phase
pub trait PhaseHandler {
    fn on_enter(&self, game: &mut Game);
    fn next(&self, game: &Game) -> Phase;
}

struct Lounge;
struct Initiative;
struct MinefieldDeployment;
struct ArtilleryDesignation;
struct Combat(Phase);
struct EndOfRound;
struct RoundReport;
struct Victory;

/// The phase table. Handlers are stateless; the table is total over the
/// phase enum.
pub fn handler_for(phase: Phase) -> &'static dyn PhaseHandler {
    match phase {
        Phase::Lounge => &Lounge,
        Phase::Initiative => &Initiative,
        Phase::MinefieldDeployment => &MinefieldDeployment,
        Phase::ArtilleryDesignation => &ArtilleryDesignation,
        Phase::Deployment => &Combat(Phase::Deployment),
        Phase::PreMovement => &Combat(Phase::PreMovement),
        Phase::Movement => &Combat(Phase::Movement),
        Phase::PreFiring => &Combat(Phase::PreFiring),
        Phase::Firing => &Combat(Phase::Firing),
        Phase::Physical => &Combat(Phase::Physical),
        Phase::Targeting => &Combat(Phase::Targeting),
        Phase::Offboard => &Combat(Phase::Offboard),
        Phase::EndOfRound => &EndOfRound,
        Phase::RoundReport => &RoundReport,
        Phase::Victory => &Victory,
    }
}

/// Run the current phase's successor choice, enter the next phase, and
/// return it. Terminal phases stay put.
pub fn advance(game: &mut Game) -> Phase {
    let current = game.phase;
    if current.is_terminal() {
        return current;
    }
    let next = handler_for(current).next(game);
    game.phase = next;
    game.reports.push(game.round, next, ReportKind::PhaseBegan { phase: next });
    handler_for(next).on_enter(game);
    game.phase
}

fn fixed_next(phase: Phase) -> Phase {
    phase.fixed_successor().unwrap_or(Phase::Victory)
}

impl PhaseHandler for Lounge {
    fn on_enter(&self, _game: &mut Game) {}

    fn next(&self, _game: &Game) -> Phase {
        Phase::Initiative
    }
}

impl PhaseHandler for Initiative {
    fn on_enter(&self, game: &mut Game) {
        game.round += 1;
        let (round, phase) = (game.round, game.phase);

        // Per-round transient state resets before anything rolls.
        for unit in game.units.values_mut() {
            unit.reset_phase_state();
        }

        // Initiative order for the round, best roll acts last.
        let players: Vec<PlayerId> = game.players.iter().map(|p| p.id).collect();
        let mut rolls: Vec<(PlayerId, u32)> = Vec::with_capacity(players.len());
        for player in players {
            let roll = two_d6(&mut game.rng);
            game.reports.push(round, phase, ReportKind::InitiativeRolled { player, roll });
            rolls.push((player, roll));
        }
        rolls.sort_by(|a, b| b.1.cmp(&a.1).then(a.0 .0.cmp(&b.0 .0)));
        game.initiative_order = rolls.into_iter().map(|(p, _)| p).collect();

        // Environmental survival: unprotected troops die to the planet
        // before anyone fires a shot.
        if !game.conditions.habitable_for_infantry() {
            let doomed: Vec<_> = game
                .units
                .values()
                .filter(|u| u.kind == UnitKind::Infantry && !u.destroyed && u.deployed)
                .map(|u| u.id)
                .collect();
            for id in doomed {
                game.reports.push(round, phase, ReportKind::SurvivalCheckFailed { unit: id });
                criticals::destroy_unit(game, id, DestructionCause::StructureGone);
            }
        }

        game.reports.push(round, phase, ReportKind::Autosave);
    }

    fn next(&self, game: &Game) -> Phase {
        fixed_next(game.phase)
    }
}

impl PhaseHandler for MinefieldDeployment {
    fn on_enter(&self, game: &mut Game) {
        let turns: Vec<Turn> = game
            .players
            .iter()
            .filter(|p| p.minefields > 0)
            .map(|p| Turn::for_player(p.id))
            .collect();
        game.turns.rebuild(turns);
    }

    fn next(&self, game: &Game) -> Phase {
        fixed_next(game.phase)
    }
}

impl PhaseHandler for ArtilleryDesignation {
    fn on_enter(&self, game: &mut Game) {
        let turns: Vec<Turn> = game
            .players
            .iter()
            .filter(|p| {
                game.units
                    .values()
                    .any(|u| u.owner == p.id && u.artillery && !u.destroyed)
            })
            .map(|p| Turn::for_player(p.id))
            .collect();
        game.turns.rebuild(turns);
    }

    fn next(&self, game: &Game) -> Phase {
        fixed_next(game.phase)
    }
}

impl PhaseHandler for Combat {
    fn on_enter(&self, game: &mut Game) {
        let round = game.round;

        // Scheduled appearances: hidden units reveal, off-board units
        // arrive and queue for deployment.
        for unit in game.units.values_mut() {
            if let Some(r) = unit.scheduled_round {
                if r <= round {
                    unit.hidden = false;
                    unit.scheduled_round = None;
                    tracing::debug!(unit = %unit.name, round, "scheduled unit activated");
                }
            }
            unit.done = false;
        }

        let turns = build_combat_turns(game, self.0);
        game.turns.rebuild(turns);
    }

    fn next(&self, game: &Game) -> Phase {
        fixed_next(game.phase)
    }
}

impl PhaseHandler for EndOfRound {
    fn on_enter(&self, game: &mut Game) {
        super::end_of_round::run(game);
    }

    fn next(&self, game: &Game) -> Phase {
        fixed_next(game.phase)
    }
}

impl PhaseHandler for RoundReport {
    fn on_enter(&self, _game: &mut Game) {}

    fn next(&self, game: &Game) -> Phase {
        if victory_decided(game) {
            Phase::Victory
        } else {
            Phase::Initiative
        }
    }
}

impl PhaseHandler for Victory {
    fn on_enter(&self, game: &mut Game) {
        let (round, phase) = (game.round, game.phase);

        // Squadron reconciliation: drop destroyed members so the record
        // shows the fighters that actually came home.
        let mut prune: Vec<(crate::core::types::UnitId, Vec<crate::core::types::UnitId>)> =
            Vec::new();
        for unit in game.units.values() {
            if unit.kind == UnitKind::Squadron {
                let alive = unit
                    .squadron_members
                    .iter()
                    .copied()
                    .filter(|m| game.units.get(m).map(|u| !u.destroyed).unwrap_or(false))
                    .collect();
                prune.push((unit.id, alive));
            }
        }
        for (id, members) in prune {
            if let Some(u) = game.units.get_mut(&id) {
                u.squadron_members = members;
            }
        }

        // Capital-scale armor rescales to display scale for the record.
        let rescales: Vec<_> = game
            .units
            .values()
            .filter(|u| u.capital_scale && !u.destroyed)
            .flat_map(|u| {
                let id = u.id;
                u.locations
                    .iter()
                    .enumerate()
                    .map(move |(i, l)| (id, crate::unit::location::LocationId(i), l.armor.value()))
            })
            .collect();
        for (id, _loc, value) in rescales {
            game.reports.push(
                round,
                phase,
                ReportKind::CapitalRescale {
                    target: id,
                    before: value,
                    after: value * 10,
                },
            );
        }

        game.reports.push(
            round,
            phase,
            ReportKind::GameOver {
                victor: sole_survivor(game),
            },
        );
    }

    fn next(&self, _game: &Game) -> Phase {
        Phase::Victory
    }
}

/// Turn order for a combat phase: round-robin over players, initiative
/// loser first, winner acting last.
fn build_combat_turns(game: &Game, phase: Phase) -> Vec<Turn> {
    let eligible = |u: &crate::unit::Unit| -> bool {
        if u.destroyed || u.hidden || u.scheduled_round.is_some() {
            return false;
        }
        match phase {
            Phase::Deployment => !u.deployed && u.carried_by.is_none(),
            Phase::Offboard => u.deployed && u.artillery,
            _ => u.deployed && u.crew.active() && !u.shut_down,
        }
    };

    let order: Vec<PlayerId> = if game.initiative_order.is_empty() {
        game.players.iter().map(|p| p.id).collect()
    } else {
        game.initiative_order.iter().rev().copied().collect()
    };

    let mut per_player: Vec<Vec<Turn>> = order
        .iter()
        .map(|p| {
            game.units
                .values()
                .filter(|u| u.owner == *p && eligible(u))
                .map(|u| Turn::for_unit(*p, u.id))
                .collect()
        })
        .collect();

    let mut turns = Vec::new();
    loop {
        let mut emitted = false;
        for bucket in per_player.iter_mut() {
            if let Some(t) = bucket.pop() {
                turns.push(t);
                emitted = true;
            }
        }
        if !emitted {
            break;
        }
    }
    turns
}

/// A match is decided when at most one player still has fighting units.
fn victory_decided(game: &Game) -> bool {
    if game.round == 0 {
        return false;
    }
    players_with_forces(game).len() <= 1
}

fn players_with_forces(game: &Game) -> Vec<PlayerId> {
    game.players
        .iter()
        .map(|p| p.id)
        .filter(|p| {
            game.units
                .values()
                .any(|u| u.owner == *p && !u.destroyed && !u.crew.dead)
        })
        .collect()
}

fn sole_survivor(game: &Game) -> Option<PlayerId> {
    let alive = players_with_forces(game);
    if alive.len() == 1 {
        Some(alive[0])
    } else {
        None
    }
}
