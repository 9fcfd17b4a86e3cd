use std::{path::PathBuf, str::FromStr};

use clap::{Parser, Subcommand};
use itertools::Itertools;
use lapdelta::{
    AppConfig, ComparisonRenderer, ComparisonSession, ComparisonView, LapDeltaError, LapProvider,
    Notice, SessionContext,
    colors::SeasonColorLookup,
    comparison::{SLOT_COUNT, select_lap},
    format::{format_duration, format_optional_duration},
    session::personal_best,
    telemetry::load_session_jsonl,
};
use log::{error, info};

#[derive(Parser, Debug)]
#[command(version, about, long_about = None)]
#[command(propagate_version = true)]
struct Args {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// List drivers and the laps that can be compared
    Laps {
        #[arg(short, long)]
        input: PathBuf,
    },
    /// Compare up to three laps
    Compare {
        #[arg(short, long)]
        input: PathBuf,

        /// DRIVER or DRIVER:LAP, the personal best is used when LAP is omitted
        #[arg(short, long = "lap", required = true, num_args = 1..)]
        laps: Vec<LapChoice>,

        #[arg(short, long)]
        segments: Option<usize>,
    },
}

#[derive(Clone, Debug, PartialEq)]
struct LapChoice {
    driver: String,
    lap_number: Option<u32>,
}

impl FromStr for LapChoice {
    type Err = String;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        let (driver, lap_number) = match value.split_once(':') {
            Some((driver, lap)) => (
                driver,
                Some(
                    lap.parse::<u32>()
                        .map_err(|e| format!("invalid lap number {:?}: {}", lap, e))?,
                ),
            ),
            None => (value, None),
        };
        if driver.is_empty() {
            return Err("driver cannot be empty".to_string());
        }
        Ok(Self {
            driver: driver.to_uppercase(),
            lap_number,
        })
    }
}

/// Keeps the latest view, notices are printed as they come
#[derive(Default)]
struct TerminalRenderer {
    latest: Option<ComparisonView>,
}

impl TerminalRenderer {
    fn print(&self) {
        if let Some(view) = &self.latest {
            print_view(view);
        }
    }
}

impl ComparisonRenderer for TerminalRenderer {
    fn render(&mut self, view: &ComparisonView) {
        self.latest = Some(view.clone());
    }

    fn notify(&mut self, notice: &Notice) {
        match notice.slot {
            Some(slot) => println!("! slot {}: {}", slot, notice.message),
            None => println!("! {}", notice.message),
        }
    }
}

fn print_view(view: &ComparisonView) {
    for (slot, summary) in &view.summaries {
        println!(
            "[{}] {} lap {}{}  {}  S1 {}  S2 {}  S3 {}  {}",
            slot,
            summary.driver,
            summary.lap_number,
            if summary.is_personal_best { " (PB)" } else { "" },
            summary.lap_time,
            summary.sector_times[0],
            summary.sector_times[1],
            summary.sector_times[2],
            summary.compound
        );
    }

    for trace in &view.delta.traces {
        let (min, max) = trace.delta.range().unwrap_or_default();
        let last = trace.delta.delta_seconds.last().copied().unwrap_or_default();
        println!(
            "Delta {} vs {} lap {} over {}m: final {:+.3}s, best {:+.3}s, worst {:+.3}s",
            trace.driver,
            trace.reference_driver,
            trace.reference_lap_number,
            trace.delta.len(),
            last,
            max,
            min
        );
    }

    let winners = view
        .dominance
        .segments
        .iter()
        .map(|segment| {
            format!(
                "{:>2} {:>7.1}-{:<7.1} {}",
                segment.index,
                segment.bounds.lower,
                segment.bounds.upper,
                segment.winner.as_deref().unwrap_or("-")
            )
        })
        .join("\n");
    println!("{}", winners);
}

fn load_config() -> AppConfig {
    match AppConfig::from_local_file() {
        Ok(Some(config)) => config,
        Ok(None) => AppConfig::default(),
        Err(e) => {
            error!("Could not read config file, using defaults: {}", e);
            AppConfig::default()
        }
    }
}

fn list_laps(input: &PathBuf) -> Result<(), LapDeltaError> {
    let session = load_session_jsonl(input)?;
    let kind = session.kind();
    let info = session.session();
    println!("{} {} {} ({:?})", info.year, info.event, info.name, kind);

    for driver in session.drivers() {
        let driver_laps = session.laps_for(&driver).into_iter().cloned().collect_vec();
        let best = personal_best(kind, &driver_laps).map(|lap| lap.lap_number);
        let listed = driver_laps
            .iter()
            .filter(|lap| kind.is_selectable(lap))
            .map(|lap| {
                format!(
                    "{}{}: {}",
                    lap.lap_number,
                    if Some(lap.lap_number) == best { "*" } else { "" },
                    format_optional_duration(lap.lap_time)
                )
            })
            .join(", ");
        println!("{}: {}", driver, listed);
    }
    if let Some(fastest) = session.fastest_lap() {
        println!(
            "Fastest: {} lap {} {}",
            fastest.info.driver,
            fastest.info.lap_number,
            fastest
                .info
                .lap_time
                .map(format_duration)
                .unwrap_or_default()
        );
    }
    Ok(())
}

fn compare(
    input: &PathBuf,
    choices: &[LapChoice],
    segments: Option<usize>,
) -> Result<(), LapDeltaError> {
    if choices.len() > SLOT_COUNT {
        return Err(LapDeltaError::SlotOutOfRange {
            slot: choices.len() - 1,
        });
    }

    let mut config = load_config();
    if let Some(segments) = segments {
        config.segment_count = segments;
    }

    let session = load_session_jsonl(input)?;
    let context = SessionContext::resolve(&session, &config)?;
    info!(
        "Comparing {} laps over {} segments",
        choices.len(),
        context.segmentation.segment_count()
    );

    let mut comparison = ComparisonSession::new(
        context,
        SeasonColorLookup::from_config(&config),
        TerminalRenderer::default(),
    );
    for (slot, choice) in choices.iter().enumerate() {
        let lap = select_lap(&session, &choice.driver, choice.lap_number)?;
        comparison.assign(slot, lap)?;
    }
    comparison.renderer().print();
    Ok(())
}

fn main() {
    #[cfg(debug_assertions)]
    colog::init();

    let cli = Args::parse();
    let result = match &cli.command {
        Commands::Laps { input } => list_laps(input),
        Commands::Compare {
            input,
            laps,
            segments,
        } => compare(input, laps, *segments),
    };
    if let Err(e) = result {
        error!("{}", e);
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
}
