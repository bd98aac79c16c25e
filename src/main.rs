//! flagrun -- a capture-the-flag round referee.
//!
//! Reads commands from stdin and writes responses to stdout. Logging goes
//! to stderr and is controlled by `RUST_LOG`.
//!
//! Usage:
//!   flagrun [--config FILE] [--max-rounds N]

use std::env;
use std::io::{self, BufRead};
use std::process;

use flagrun::config::{GameConfig, RoomConfig};
use flagrun::logging;
use flagrun::referee::Referee;
use tracing::error;

fn main() {
    logging::init("info");

    let args: Vec<String> = env::args().collect();
    let mut game = GameConfig::default();
    let mut room = RoomConfig::default();

    let mut i = 1;
    while i < args.len() {
        match args[i].as_str() {
            "--config" => {
                i += 1;
                let Some(path) = args.get(i) else {
                    error!("--config needs a file path");
                    process::exit(2);
                };
                game = match GameConfig::from_file(path) {
                    Ok(cfg) => cfg,
                    Err(e) => {
                        error!(path = %path, error = %e, "failed to load config");
                        process::exit(2);
                    }
                };
            }
            "--max-rounds" => {
                i += 1;
                match args.get(i).and_then(|v| v.parse().ok()) {
                    Some(n) => room.max_rounds = Some(n),
                    None => {
                        error!("--max-rounds needs a positive integer");
                        process::exit(2);
                    }
                }
            }
            other => {
                error!(argument = other, "unknown argument");
                process::exit(2);
            }
        }
        i += 1;
    }

    let layout = match game.layout() {
        Ok(layout) => layout,
        Err(e) => {
            error!(error = %e, "invalid layout");
            process::exit(2);
        }
    };

    let stdin = io::stdin();
    let stdout = io::stdout();
    let mut out = io::BufWriter::new(stdout.lock());
    let mut referee = Referee::new(layout, room);

    for line in stdin.lock().lines() {
        let Ok(line) = line else {
            break;
        };
        match referee.handle_line(&line, &mut out) {
            Ok(true) => {}
            Ok(false) => break,
            Err(e) => {
                error!(error = %e, "failed to write response");
                break;
            }
        }
    }
}
