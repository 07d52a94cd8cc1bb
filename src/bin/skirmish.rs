//! Headless Skirmish Runner
//!
//! Drives a scripted two-player match through the full phase machine and
//! prints the final report log. Useful for replay debugging and for
//! exercising the rules core without a transport in front of it.

use clap::Parser;
use rand::{Rng, SeedableRng};
use serde::Serialize;
use tracing_subscriber::EnvFilter;

use hexmarch::board::{Board, DeploymentZone, Facing, HexCoord};
use hexmarch::core::config::{GameOptions, PlanetaryConditions};
use hexmarch::core::types::{BoardId, PlayerId};
use hexmarch::damage::{DamageEvent, DamageKind, HitData};
use hexmarch::deployment::DeploymentRequest;
use hexmarch::game::{Game, Player};
use hexmarch::phase::Phase;
use hexmarch::report::ReportKind;
use hexmarch::unit::location::LocationId;
use hexmarch::unit::Unit;

/// Headless Skirmish Runner - scripted matches against the rules core
#[derive(Parser, Debug)]
#[command(name = "skirmish")]
#[command(about = "Run a scripted match and dump the report log")]
struct Args {
    /// Random seed for deterministic runs
    #[arg(long)]
    seed: Option<u64>,

    /// Maximum rounds before calling the match a draw
    #[arg(long, default_value_t = 20)]
    max_rounds: u32,

    /// Board width in hexes
    #[arg(long, default_value_t = 16)]
    width: i32,

    /// Board height in hexes
    #[arg(long, default_value_t = 16)]
    height: i32,

    /// Output format: json or text
    #[arg(long, default_value = "json")]
    format: String,

    /// Include the full report log in the output
    #[arg(long, short = 'v')]
    verbose: bool,
}

/// JSON output structure
#[derive(Serialize)]
struct SkirmishResult {
    rounds: u32,
    final_phase: String,
    victor: Option<u32>,
    reports: usize,
    units_destroyed: usize,
    seed: u64,
}

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .init();

    let args = Args::parse();
    let seed = args.seed.unwrap_or_else(|| rand::random());
    let mut script_rng = rand::rngs::StdRng::seed_from_u64(seed ^ 0x5eed);

    let mut board = Board::new(BoardId(0), args.width, args.height);
    board.assign_zone(PlayerId(1), DeploymentZone::North);
    board.assign_zone(PlayerId(2), DeploymentZone::South);

    let mut game = Game::new(board, GameOptions::default(), PlanetaryConditions::default(), seed);
    game.add_player(Player::new(PlayerId(1)));
    game.add_player(Player::new(PlayerId(2)));

    let north = [
        game.add_unit(Unit::walker("Lancer", PlayerId(1))),
        game.add_unit(Unit::vehicle("Drayman", PlayerId(1))),
    ];
    let south = [
        game.add_unit(Unit::walker("Vanguard", PlayerId(2))),
        game.add_unit(Unit::infantry_squad("Pike Squad", PlayerId(2))),
    ];

    // Walk the machine until victory or the round cap.
    loop {
        let phase = game.advance_phase();
        match phase {
            Phase::Deployment => {
                deploy_pending(&mut game, args.height);
            }
            Phase::Firing => {
                // Scripted exchange: each side lands one hit on a random
                // enemy location.
                exchange(&mut game, &north, &south, &mut script_rng);
                exchange(&mut game, &south, &north, &mut script_rng);
            }
            Phase::Victory => break,
            _ => {}
        }
        if game.round > args.max_rounds {
            break;
        }
    }

    let destroyed = game.units.values().filter(|u| u.destroyed).count();
    let victor = game.reports.iter().rev().find_map(|r| match r.kind {
        ReportKind::GameOver { victor } => Some(victor.map(|p| p.0)),
        _ => None,
    });

    let result = SkirmishResult {
        rounds: game.round,
        final_phase: format!("{:?}", game.phase),
        victor: victor.flatten(),
        reports: game.reports.len(),
        units_destroyed: destroyed,
        seed,
    };

    match args.format.as_str() {
        "json" => {
            println!("{}", serde_json::to_string_pretty(&result).expect("serializable result"));
            if args.verbose {
                let log: Vec<_> = game.reports.iter().collect();
                println!("{}", serde_json::to_string_pretty(&log).expect("serializable log"));
            }
        }
        _ => {
            println!(
                "match over after {} rounds in {:?}: victor={:?}, {} reports, {} destroyed",
                result.rounds, game.phase, result.victor, result.reports, destroyed
            );
            if args.verbose {
                for report in game.reports.iter() {
                    println!("  [r{} {:?}] {:?}", report.round, report.phase, report.kind);
                }
            }
        }
    }
}

/// Drain the deployment queue in turn order.
fn deploy_pending(game: &mut Game, height: i32) {
    while let Some(turn) = game.turns.current().copied() {
        let Some(unit_id) = turn.unit else {
            game.turns.advance();
            continue;
        };
        let player = turn.player;
        let row = if player == PlayerId(1) { 1 } else { height - 2 };
        let column = 2 + 2 * game
            .units
            .values()
            .filter(|u| u.owner == player && u.deployed)
            .count() as i32;
        let request = DeploymentRequest {
            unit: unit_id,
            coords: HexCoord::new(column, row),
            board: BoardId(0),
            facing: if row <= 2 { Facing::South } else { Facing::North },
            elevation: 0,
            loaded_units: vec![],
            tactical_drop: false,
            connection: player,
        };
        if let Err(e) = game.submit_deployment(request) {
            eprintln!("Warning: deployment of {:?} rejected: {}", unit_id, e);
            game.turns.advance();
        }
    }
}

fn exchange(
    game: &mut Game,
    attackers: &[hexmarch::core::types::UnitId],
    defenders: &[hexmarch::core::types::UnitId],
    rng: &mut rand::rngs::StdRng,
) {
    let alive_attacker = attackers
        .iter()
        .any(|id| game.units.get(id).map(|u| !u.destroyed).unwrap_or(false));
    if !alive_attacker {
        return;
    }
    let targets: Vec<_> = defenders
        .iter()
        .copied()
        .filter(|id| game.units.get(id).map(|u| !u.destroyed).unwrap_or(false))
        .collect();
    let Some(target) = targets.first().copied() else {
        return;
    };

    let locations = game.units.get(&target).map(|u| u.locations.len()).unwrap_or(1);
    let hit = HitData::front(LocationId(rng.gen_range(0..locations.max(1))));
    let amount = rng.gen_range(5..=15);
    game.apply_damage(DamageEvent::new(target, hit, amount, DamageKind::Ballistic));
}
