// Command-line parsing for the `garden` binary.
//
// Plain `std::env::args()` matching, one flag at a time. Parsing is split
// from `main.rs` and returns typed errors so it can be tested without
// spawning a process.

use std::path::PathBuf;
use thiserror::Error;

/// Ticks run when `--ticks` is not given: one simulated minute at 16 ms.
pub const DEFAULT_TICKS: u64 = 3_750;

#[derive(Clone, Debug, PartialEq)]
pub struct RunOptions {
    pub seed: u64,
    pub ticks: u64,
    pub config: Option<PathBuf>,
    pub script: Option<PathBuf>,
    /// Run this many consecutive seeds in parallel instead of one run.
    pub runs: Option<u32>,
    /// Print the final emoji map after a single run.
    pub map: bool,
}

impl Default for RunOptions {
    fn default() -> Self {
        Self {
            seed: 42,
            ticks: DEFAULT_TICKS,
            config: None,
            script: None,
            runs: None,
            map: false,
        }
    }
}

#[derive(Clone, Debug, PartialEq)]
pub enum Invocation {
    Run(RunOptions),
    Help,
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum CliError {
    #[error("{flag} requires a value")]
    MissingValue { flag: &'static str },
    #[error("{flag} expects a number, got `{value}`")]
    NotANumber { flag: &'static str, value: String },
    #[error("--runs must be at least 1")]
    NoRuns,
    #[error("unknown argument: {0}")]
    Unknown(String),
}

/// Parse arguments (without the program name).
pub fn parse_args<I>(args: I) -> Result<Invocation, CliError>
where
    I: IntoIterator<Item = String>,
{
    let mut options = RunOptions::default();
    let mut args = args.into_iter();

    while let Some(arg) = args.next() {
        match arg.as_str() {
            "--seed" => options.seed = number(&mut args, "--seed")?,
            "--ticks" => options.ticks = number(&mut args, "--ticks")?,
            "--config" => options.config = Some(value(&mut args, "--config")?.into()),
            "--script" => options.script = Some(value(&mut args, "--script")?.into()),
            "--runs" => {
                let runs: u32 = number(&mut args, "--runs")?;
                if runs == 0 {
                    return Err(CliError::NoRuns);
                }
                options.runs = Some(runs);
            }
            "--map" => options.map = true,
            "--help" | "-h" => return Ok(Invocation::Help),
            other => return Err(CliError::Unknown(other.to_string())),
        }
    }
    Ok(Invocation::Run(options))
}

fn value(args: &mut impl Iterator<Item = String>, flag: &'static str) -> Result<String, CliError> {
    args.next().ok_or(CliError::MissingValue { flag })
}

fn number<T: std::str::FromStr>(
    args: &mut impl Iterator<Item = String>,
    flag: &'static str,
) -> Result<T, CliError> {
    let raw = value(args, flag)?;
    raw.parse()
        .map_err(|_| CliError::NotANumber { flag, value: raw })
}

pub fn usage() -> String {
    [
        "Usage: garden [OPTIONS]",
        "",
        "Options:",
        "  --seed <N>        PRNG seed (default: 42)",
        "  --ticks <N>       Ticks to simulate (default: 3750)",
        "  --config <PATH>   GardenConfig JSON (default: built-in values)",
        "  --script <PATH>   JSON array of SimCommand (default: demo garden)",
        "  --runs <N>        Run N consecutive seeds in parallel, print summaries",
        "  --map             Print the final emoji map after a single run",
        "  --help, -h        Show this help",
        "",
        "Logging is controlled by RUST_LOG (default: info) and goes to stderr.",
    ]
    .join("\n")
}
