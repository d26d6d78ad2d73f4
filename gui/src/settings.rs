//! Command-line settings for the viewer.

use std::path::PathBuf;
use std::time::Duration;

use clap::{command, value_parser, Arg, ArgAction, ArgMatches, Command};
use life_engine::pattern::{self, Pattern};
use life_engine::{LifeLike, DEFAULT_WORLD_SIZE, MAX_WORLD_SIZE};

/// Worlds at least this wide always step on all cores, so the stepping
/// thread does not hold the lock across a long sequential step.
pub const PARALLEL_WORLD_SIZE: usize = 256;

/// Everything the viewer needs to know before it opens a window.
#[derive(Clone, Debug)]
pub struct Settings {
    pub world_size: usize,
    /// Time between two steps.
    pub interval: Duration,
    pub rule: LifeLike,
    /// Packed bit-per-cell file to start from.
    pub snapshot: Option<PathBuf>,
    /// Pattern stamped in the middle of the world at start.
    pub pattern: Option<&'static Pattern>,
    /// Chance of a cell being alive after "Randomize".
    pub density: f64,
    pub parallel: bool,
    pub paused: bool,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            world_size: DEFAULT_WORLD_SIZE,
            interval: Duration::from_millis(200),
            rule: LifeLike::CONWAY,
            snapshot: None,
            pattern: None,
            density: 0.5,
            parallel: false,
            paused: false,
        }
    }
}

impl Settings {
    /// Parses the process arguments, exiting with a usage message on error.
    pub fn parse() -> Self {
        Self::from_matches(&cli().get_matches())
    }

    /// Whether steps are spread over the rayon pool.
    pub fn parallel_step(&self) -> bool {
        self.parallel || self.world_size >= PARALLEL_WORLD_SIZE
    }

    fn from_matches(matches: &ArgMatches) -> Self {
        let defaults = Self::default();
        Self {
            world_size: matches
                .get_one::<u64>("SIZE")
                .map_or(defaults.world_size, |&size| size as usize),
            interval: matches
                .get_one::<u64>("INTERVAL")
                .map_or(defaults.interval, |&ms| Duration::from_millis(ms)),
            rule: matches
                .get_one::<LifeLike>("RULE")
                .copied()
                .unwrap_or(defaults.rule),
            snapshot: matches.get_one::<PathBuf>("SNAPSHOT").cloned(),
            pattern: matches.get_one::<&'static Pattern>("PATTERN").copied(),
            density: matches
                .get_one::<f64>("DENSITY")
                .copied()
                .unwrap_or(defaults.density),
            parallel: matches.get_flag("PARALLEL"),
            paused: matches.get_flag("PAUSED"),
        }
    }
}

fn parse_density(s: &str) -> Result<f64, String> {
    match s.parse::<f64>() {
        Ok(p) if (0.0..=1.0).contains(&p) => Ok(p),
        _ => Err(String::from("density must be a number between 0 and 1")),
    }
}

fn parse_pattern(s: &str) -> Result<&'static Pattern, String> {
    pattern::find(s).ok_or_else(|| {
        let known: Vec<&str> = pattern::PATTERNS.iter().map(|p| p.name).collect();
        format!("unknown pattern, expected one of: {}", known.join(", "))
    })
}

fn cli() -> Command {
    command!()
        .arg(
            Arg::new("SIZE")
                .short('n')
                .long("size")
                .help("Side of the square world [default: 40]")
                .value_parser(value_parser!(u64).range(1..=MAX_WORLD_SIZE as u64)),
        )
        .arg(
            Arg::new("INTERVAL")
                .short('i')
                .long("interval")
                .value_name("MS")
                .help("Milliseconds between two generations [default: 200]")
                .value_parser(value_parser!(u64)),
        )
        .arg(
            Arg::new("RULE")
                .short('r')
                .long("rule")
                .help("Rule in B/S notation [default: B3/S23]")
                .value_parser(|s: &str| s.parse::<LifeLike>()),
        )
        .arg(
            Arg::new("SNAPSHOT")
                .short('s')
                .long("snapshot")
                .value_name("PATH")
                .help("File of packed cells, one bit each, to start from")
                .value_parser(value_parser!(PathBuf)),
        )
        .arg(
            Arg::new("PATTERN")
                .short('p')
                .long("pattern")
                .help("Pattern to place in the middle of the world")
                .value_parser(parse_pattern),
        )
        .arg(
            Arg::new("DENSITY")
                .short('d')
                .long("density")
                .help("Share of live cells after \"Randomize\" [default: 0.5]")
                .value_parser(parse_density),
        )
        .arg(
            Arg::new("PARALLEL")
                .long("parallel")
                .help(
                    "Spread each step over all cores; always on from 256 cells wide, \
                     where a sequential step keeps the window waiting",
                )
                .action(ArgAction::SetTrue),
        )
        .arg(
            Arg::new("PAUSED")
                .long("paused")
                .help("Start without stepping")
                .action(ArgAction::SetTrue),
        )
}
