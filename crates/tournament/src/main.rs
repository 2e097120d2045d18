//! Tournament CLI
//!
//! Simulate tournaments from a TOML description and estimate round counts.

use rand::rngs::StdRng;
use rand::SeedableRng;
use std::env;
use std::path::PathBuf;
use std::process::ExitCode;
use tournament_formats::{
    run_simulation, FormatConfig, FormatType, MatchSimulator, SimulationConfig, Tournament,
    TournamentReport,
};
use tracing_subscriber::EnvFilter;

fn print_usage() {
    println!("Agent Tournament Runner");
    println!();
    println!("Usage:");
    println!("  tournament run <config.toml> [--out FILE] [--seed N]");
    println!("  tournament estimate <format> <players> [--series N] [--start N]");
    println!();
    println!("Formats:");
    for format in FormatType::ALL {
        println!("  {}", format);
    }
    println!();
    println!("Examples:");
    println!("  tournament run demos/double_elimination.toml --out results.json");
    println!("  tournament estimate best_of_n 16 --series 5");
}

fn run(args: &[String]) -> ExitCode {
    let Some(config_path) = args.first() else {
        eprintln!("Error: run requires a config file");
        print_usage();
        return ExitCode::FAILURE;
    };

    let mut out: Option<PathBuf> = None;
    let mut seed_override: Option<u64> = None;

    let mut i = 1;
    while i < args.len() {
        match args[i].as_str() {
            "--out" | "-o" => {
                if i + 1 < args.len() {
                    out = Some(PathBuf::from(&args[i + 1]));
                    i += 1;
                }
            }
            "--seed" | "-s" => {
                if i + 1 < args.len() {
                    seed_override = args[i + 1].parse().ok();
                    i += 1;
                }
            }
            _ => {}
        }
        i += 1;
    }

    let mut sim = match SimulationConfig::load(config_path) {
        Ok(sim) => sim,
        Err(e) => {
            eprintln!("Error: {}", e);
            return ExitCode::FAILURE;
        }
    };
    if let Some(seed) = seed_override {
        sim.seed = seed;
    }

    println!("=== {}: {} with {} agents ===", sim.name, sim.format, sim.agents.len());
    println!("Seed: {}, round limit: {}", sim.seed, sim.max_rounds);
    println!();

    let mut rng = StdRng::seed_from_u64(sim.seed);
    let mut tournament = match Tournament::new(sim.format, sim.standings(), sim.config.clone(), &mut rng) {
        Ok(tournament) => tournament,
        Err(e) => {
            eprintln!("Error: {}", e);
            return ExitCode::FAILURE;
        }
    };

    let mut simulator = MatchSimulator::new(sim.seed.wrapping_add(1), sim.draw_rate);
    let outcome = run_simulation(&mut tournament, &mut simulator, sim.max_rounds);
    println!(
        "Played {} matches over {} rounds ({} results skipped)",
        outcome.matches_played, outcome.rounds_played, outcome.results_skipped
    );

    let report = TournamentReport::from_tournament(&sim.name, &tournament);
    report.print_report();

    if let Some(path) = out {
        if let Err(e) = report.save(&path) {
            eprintln!("Warning: Failed to save report: {}", e);
        } else {
            println!("Report written to {}", path.display());
        }
    }

    if outcome.completed {
        ExitCode::SUCCESS
    } else {
        ExitCode::FAILURE
    }
}

fn estimate(args: &[String]) -> ExitCode {
    if args.len() < 2 {
        eprintln!("Error: estimate requires a format and a player count");
        print_usage();
        return ExitCode::FAILURE;
    }

    let format: FormatType = match args[0].parse() {
        Ok(format) => format,
        Err(e) => {
            eprintln!("Error: {}", e);
            return ExitCode::FAILURE;
        }
    };
    let Ok(players) = args[1].parse::<usize>() else {
        eprintln!("Error: invalid player count: {}", args[1]);
        return ExitCode::FAILURE;
    };

    let mut config = FormatConfig::default();
    let mut i = 2;
    while i < args.len() {
        match args[i].as_str() {
            "--series" => {
                if i + 1 < args.len() {
                    config.series_length = args[i + 1].parse().unwrap_or(config.series_length);
                    i += 1;
                }
            }
            "--start" => {
                if i + 1 < args.len() {
                    config.starting_participants =
                        args[i + 1].parse().unwrap_or(config.starting_participants);
                    i += 1;
                }
            }
            _ => {}
        }
        i += 1;
    }

    if let Err(e) = config.validate(format) {
        eprintln!("Error: {}", e);
        return ExitCode::FAILURE;
    }

    println!(
        "{} with {} players: about {} rounds",
        format,
        players,
        format.total_rounds(players, &config)
    );
    ExitCode::SUCCESS
}

fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let args: Vec<String> = env::args().collect();

    if args.len() < 2 {
        print_usage();
        return ExitCode::SUCCESS;
    }

    match args[1].as_str() {
        "run" => run(&args[2..]),
        "estimate" | "rounds" => estimate(&args[2..]),
        "help" | "--help" | "-h" => {
            print_usage();
            ExitCode::SUCCESS
        }
        _ => {
            eprintln!("Unknown command: {}", args[1]);
            print_usage();
            ExitCode::FAILURE
        }
    }
}
