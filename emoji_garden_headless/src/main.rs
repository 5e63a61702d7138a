// CLI entry point for the headless emoji garden.
//
// Runs a garden from a seed, an optional config file and an optional command
// script. A single run streams narrative events to stdout as JSON lines and
// finishes with a JSON population summary (and, with `--map`, the final
// emoji map). `--runs N` instead runs N consecutive seeds in parallel and
// prints one summary line per seed. Logs go to stderr; see `cli.rs` for the
// flags.
//
// Usage:
//   garden [--seed N] [--ticks N] [--config PATH] [--script PATH] [--runs N] [--map]

use emoji_garden_headless::batch::run_batch;
use emoji_garden_headless::cli::{Invocation, RunOptions, parse_args, usage};
use emoji_garden_headless::run::{RunError, load_commands, load_config, run_single};
use std::io::Write;
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

/// Map cell size (canvas units) for `--map`.
const MAP_CELL: f32 = 40.0;

fn main() {
    init_tracing();

    let options = match parse_args(std::env::args().skip(1)) {
        Ok(Invocation::Run(options)) => options,
        Ok(Invocation::Help) => {
            println!("{}", usage());
            return;
        }
        Err(err) => {
            eprintln!("{err}");
            eprintln!("{}", usage());
            std::process::exit(2);
        }
    };

    if let Err(err) = run(&options) {
        error!(error = %err, "garden run failed");
        std::process::exit(1);
    }
}

fn run(options: &RunOptions) -> Result<(), RunError> {
    let config = load_config(options)?;
    let commands = load_commands(options, &config)?;
    let stdout = std::io::stdout();
    let mut out = stdout.lock();

    match options.runs {
        Some(runs) => {
            info!(first_seed = options.seed, runs, ticks = options.ticks, "batch started");
            for summary in run_batch(&config, &commands, options.seed, runs, options.ticks) {
                serde_json::to_writer(&mut out, &summary)?;
                writeln!(out)?;
            }
        }
        None => {
            info!(seed = options.seed, ticks = options.ticks, "run started");
            let (summary, view) =
                run_single(options.seed, options.ticks, config.clone(), &commands, &mut out)?;
            serde_json::to_writer(&mut out, &summary)?;
            writeln!(out)?;
            if options.map {
                writeln!(out, "{}", view.render_map(&config, MAP_CELL))?;
            }
        }
    }
    Ok(())
}

fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .compact()
        .init();
}
