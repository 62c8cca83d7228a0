//! erasim runner
//!
//! Steps the engine through the era timeline headlessly and logs what each
//! era produces.
//!
//! Usage: `erasim [--era N] [--frames N] [--table path.json] [--verbose]`

use erasim::prelude::*;
use std::env;
use std::path::PathBuf;
use std::process;

const HELP_TEXT: &str = "\
erasim - step the era timeline headlessly

USAGE:
    erasim [OPTIONS]

OPTIONS:
    --era N           Run only era N (default: every era in order)
    --frames N        Frames to run per era (default: 120)
    --table PATH      Load the era table from a JSON file
    --verbose, -v     Log at debug level
    --help, -h        Show this help message";

const FRAME_DT: f32 = 1.0 / 60.0;

/// Parsed command-line options.
struct Opts {
    era: Option<u32>,
    frames: u32,
    table: Option<PathBuf>,
    verbose: bool,
}

impl Default for Opts {
    fn default() -> Self {
        Self {
            era: None,
            frames: 120,
            table: None,
            verbose: false,
        }
    }
}

impl Opts {
    fn parse() -> Result<Self, String> {
        let mut opts = Self::default();
        let mut args = env::args().skip(1);
        while let Some(arg) = args.next() {
            match arg.as_str() {
                "--era" => opts.era = Some(parse_number(&arg, args.next())?),
                "--frames" => opts.frames = parse_number(&arg, args.next())?,
                "--table" => {
                    let path = args.next().ok_or("--table needs a path")?;
                    opts.table = Some(PathBuf::from(path));
                }
                "--verbose" | "-v" => opts.verbose = true,
                "--help" | "-h" => {
                    println!("{HELP_TEXT}");
                    process::exit(0);
                }
                other => return Err(format!("unknown argument: {other}")),
            }
        }
        Ok(opts)
    }
}

fn parse_number<T: std::str::FromStr>(flag: &str, value: Option<String>) -> Result<T, String> {
    let value = value.ok_or_else(|| format!("{flag} needs a value"))?;
    value
        .parse()
        .map_err(|_| format!("{flag}: '{value}' is not a valid number"))
}

fn load_table(opts: &Opts) -> Result<EraTable, erasim::ConfigError> {
    match &opts.table {
        Some(path) => EraTable::from_path(path),
        None => Ok(EraTable::builtin()),
    }
}

fn run_era(engine: &mut Engine, era: &EraRecord, registry: &Registry, time: &mut Time, frames: u32) {
    let done = engine.apply_era(era, registry);
    for _ in 0..frames {
        let (t, dt) = time.update();
        engine.advance(dt, t);
    }
    // Finish the cross-fade so the next era starts from a settled host.
    while !done.is_complete() {
        let (t, dt) = time.update();
        engine.advance(dt, t);
    }
    pollster::block_on(done);

    let census = engine.simulation().map(|s| s.census()).unwrap_or_default();
    tracing::info!(
        era = era.id,
        name = %era.name,
        simulation = engine.simulation_name().unwrap_or("none"),
        sprites = engine.sprite_count(),
        collections = census.total(),
        blend = engine.blend_factor(),
        "era complete"
    );
    for (label, count) in census.iter() {
        tracing::debug!(era = era.id, label, count, "collection");
    }
}

fn main() {
    let opts = match Opts::parse() {
        Ok(opts) => opts,
        Err(e) => {
            eprintln!("error: {e}\n\n{HELP_TEXT}");
            process::exit(2);
        }
    };

    let level = if opts.verbose {
        tracing::Level::DEBUG
    } else {
        tracing::Level::INFO
    };
    tracing_subscriber::fmt().with_max_level(level).init();

    let table = match load_table(&opts) {
        Ok(table) => table,
        Err(e) => {
            tracing::error!(error = %e, "could not load era table");
            process::exit(1);
        }
    };
    let eras: Vec<&EraRecord> = match opts.era {
        Some(id) => match table.get(id) {
            Ok(era) => vec![era],
            Err(e) => {
                tracing::error!(error = %e, "unknown era");
                process::exit(1);
            }
        },
        None => table.iter().collect(),
    };

    let registry = Registry::builtin();
    let mut engine = Engine::new();
    engine.initialize();
    let mut time = Time::new().with_fixed_delta(FRAME_DT);

    tracing::info!(eras = eras.len(), frames = opts.frames, "starting run");
    for era in eras {
        run_era(&mut engine, era, &registry, &mut time, opts.frames);
    }
    tracing::info!(
        elapsed = time.elapsed(),
        blend = engine.blend_factor(),
        "run finished"
    );
    engine.dispose();
}
