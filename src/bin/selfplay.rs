//! Scripted self-play CLI.
//!
//! Plays capture-the-flag games between scripted opponents and writes each
//! game's round history as JSONL.
//!
//! Usage:
//!   cargo run --release --bin selfplay -- [OPTIONS]
//!
//! Options:
//!   --games N       Number of games to play (default: 9)
//!   --max-rounds N  Rounds before a game is drawn (default: 200)
//!   --threads N     Number of parallel threads (default: 4)
//!   --config FILE   Game layout JSON (default: standard layout)
//!   --output FILE   Output file path (default: stdout)
//!   --quiet         Suppress per-game and summary logging

use std::env;
use std::fs::File;
use std::io::{self, BufWriter};
use std::process;
use std::str::FromStr;
use std::time::Instant;

use flagrun::config::GameConfig;
use flagrun::logging;
use flagrun::selfplay::{self, SelfPlayConfig};
use tracing::error;

fn value<T: FromStr>(args: &[String], i: usize, flag: &str) -> T {
    match args.get(i).and_then(|v| v.parse().ok()) {
        Some(v) => v,
        None => {
            error!(flag, "missing or invalid value");
            print_usage();
            process::exit(1);
        }
    }
}

fn main() {
    logging::init("info");

    let args: Vec<String> = env::args().collect();
    let mut config = SelfPlayConfig::default();
    let mut game = GameConfig::default();
    let mut output_path: Option<String> = None;

    let mut i = 1;
    while i < args.len() {
        match args[i].as_str() {
            "--games" => {
                i += 1;
                config.num_games = value(&args, i, "--games");
            }
            "--max-rounds" => {
                i += 1;
                config.max_rounds = value(&args, i, "--max-rounds");
            }
            "--threads" => {
                i += 1;
                config.threads = value(&args, i, "--threads");
            }
            "--config" => {
                i += 1;
                let path: String = value(&args, i, "--config");
                game = match GameConfig::from_file(&path) {
                    Ok(cfg) => cfg,
                    Err(e) => {
                        error!(path = %path, error = %e, "failed to load config");
                        process::exit(1);
                    }
                };
            }
            "--output" => {
                i += 1;
                output_path = Some(value(&args, i, "--output"));
            }
            "--quiet" => {
                config.quiet = true;
            }
            "--help" | "-h" => {
                print_usage();
                return;
            }
            other => {
                error!(argument = other, "unknown argument");
                print_usage();
                process::exit(1);
            }
        }
        i += 1;
    }

    let layout = match game.layout() {
        Ok(layout) => layout,
        Err(e) => {
            error!(error = %e, "invalid layout");
            process::exit(1);
        }
    };

    let start = Instant::now();
    let games = selfplay::run_self_play(&layout, &config);

    let written = match output_path {
        Some(ref path) => File::create(path)
            .and_then(|f| selfplay::write_jsonl(&games, &mut BufWriter::new(f))),
        None => {
            let stdout = io::stdout();
            selfplay::write_jsonl(&games, &mut BufWriter::new(stdout.lock()))
        }
    };
    if let Err(e) = written {
        error!(error = %e, "failed to write games");
        process::exit(1);
    }

    if !config.quiet {
        selfplay::log_summary(&games, start);
    }
}

fn print_usage() {
    eprintln!("Usage: selfplay [OPTIONS]");
    eprintln!();
    eprintln!("Options:");
    eprintln!("  --games N       Number of games to play (default: 9)");
    eprintln!("  --max-rounds N  Rounds before a game is drawn (default: 200)");
    eprintln!("  --threads N     Number of parallel threads (default: 4)");
    eprintln!("  --config FILE   Game layout JSON (default: standard layout)");
    eprintln!("  --output FILE   Output file path (default: stdout)");
    eprintln!("  --quiet         Suppress per-game and summary logging");
}
