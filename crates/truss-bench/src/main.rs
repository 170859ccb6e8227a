//! Benchmark runner for the incremental solver paths.
//!
//! Two scenarios: `chain-build` measures batch constraint loading plus
//! one solve over a chain of required equalities; `edit-drag` measures
//! the suggest/resolve loop that interactive clients sit in. Results can
//! be printed as a table or JSON and saved as JSONL artifacts for later
//! reporting.

use clap::{Parser, Subcommand, ValueEnum};
use serde::{Deserialize, Serialize};
use std::env;
use std::fs::{create_dir_all, File};
use std::io::{self, BufRead, BufReader, BufWriter, Write as _};
use std::path::{Path, PathBuf};
use std::time::Instant;
use tracing_subscriber::filter::LevelFilter;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use truss_core::Solver;
use truss_expr::Variable;

const SCHEMA_VERSION: u32 = 1;
const DEFAULT_CASES: [usize; 4] = [10, 100, 1_000, 5_000];
const DRAG_STEPS: usize = 100;

#[derive(Parser, Debug)]
#[command(author, version, about = "truss benchmark runner and reporting interface")]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Execute benchmark scenarios and save JSONL artifacts
    Run(RunArgs),
    /// Render benchmark artifact summaries
    Report(ReportArgs),
}

#[derive(Parser, Debug)]
struct RunArgs {
    /// Benchmark scenarios to execute
    #[arg(
        long = "scenario",
        value_enum,
        value_delimiter = ',',
        default_value = "chain-build"
    )]
    scenarios: Vec<Scenario>,

    /// Comma-separated list of chain lengths
    #[arg(long, value_delimiter = ',')]
    cases: Option<Vec<usize>>,

    /// Number of repetitions per case
    #[arg(long, default_value_t = 1)]
    repetitions: u32,

    /// JSONL output artifact path
    #[arg(long)]
    output: Option<PathBuf>,

    /// Output format for stdout
    #[arg(long, value_enum, default_value = "table")]
    format: OutputFormat,
}

#[derive(Parser, Debug)]
struct ReportArgs {
    /// Input JSONL benchmark artifact
    #[arg(long)]
    input: PathBuf,

    /// Output format for stdout
    #[arg(long, value_enum, default_value = "table")]
    format: OutputFormat,
}

#[derive(Debug, Clone, Copy, Eq, PartialEq, ValueEnum)]
enum Scenario {
    /// Batch-add a chain of required equalities with stays, then solve
    ChainBuild,
    /// Drag the head of a chain through suggest/resolve iterations
    EditDrag,
}

impl Scenario {
    fn as_str(self) -> &'static str {
        match self {
            Scenario::ChainBuild => "chain-build",
            Scenario::EditDrag => "edit-drag",
        }
    }
}

#[derive(Debug, Clone, Copy, Eq, PartialEq, ValueEnum)]
enum OutputFormat {
    Table,
    Json,
}

#[derive(Debug, Serialize, Deserialize)]
struct Measurement {
    schema_version: u32,
    scenario: String,
    variables: usize,
    repetition: u32,
    duration_ms: f64,
    /// Per-step latency for iterative scenarios.
    step_ms: Option<f64>,
}

fn main() {
    init_logging();
    let cli = Cli::parse();
    let result = match cli.command {
        Command::Run(args) => run(args),
        Command::Report(args) => report(args),
    };
    if let Err(err) = result {
        eprintln!("error: {err}");
        std::process::exit(1);
    }
}

/// Initialize structured logging from `TRUSS_TRACE` (an `EnvFilter`
/// directive, default off) and `TRUSS_LOG_FORMAT` (`pretty` or `json`).
fn init_logging() {
    let level = env::var("TRUSS_TRACE").unwrap_or_else(|_| "off".to_string());
    let filter = if level.eq_ignore_ascii_case("off") {
        EnvFilter::default().add_directive(LevelFilter::OFF.into())
    } else {
        match EnvFilter::try_new(&level) {
            Ok(filter) => filter,
            Err(err) => {
                eprintln!("invalid TRUSS_TRACE filter: {err}");
                return;
            }
        }
    };

    let format = env::var("TRUSS_LOG_FORMAT").unwrap_or_else(|_| "pretty".to_string());
    let registry = tracing_subscriber::registry().with(filter);
    let init_result = if format.eq_ignore_ascii_case("json") {
        registry
            .with(tracing_subscriber::fmt::layer().with_writer(io::stderr).json())
            .try_init()
    } else {
        registry
            .with(tracing_subscriber::fmt::layer().with_writer(io::stderr).pretty())
            .try_init()
    };
    if let Err(err) = init_result {
        eprintln!("failed to initialize logging: {err}");
    }
}

fn run(args: RunArgs) -> Result<(), Box<dyn std::error::Error>> {
    let cases = args.cases.unwrap_or_else(|| DEFAULT_CASES.to_vec());
    let mut measurements = Vec::new();

    for scenario in &args.scenarios {
        for &case in &cases {
            for repetition in 0..args.repetitions {
                let measurement = match scenario {
                    Scenario::ChainBuild => run_chain_build(case, repetition),
                    Scenario::EditDrag => run_edit_drag(case, repetition),
                };
                measurements.push(measurement);
            }
        }
    }

    if let Some(path) = &args.output {
        write_artifact(path, &measurements)?;
    }
    render(&measurements, args.format)?;
    Ok(())
}

fn report(args: ReportArgs) -> Result<(), Box<dyn std::error::Error>> {
    let file = File::open(&args.input)?;
    let mut measurements = Vec::new();
    for line in BufReader::new(file).lines() {
        let line = line?;
        if line.trim().is_empty() {
            continue;
        }
        measurements.push(serde_json::from_str::<Measurement>(&line)?);
    }
    render(&measurements, args.format)?;
    Ok(())
}

/// Build a chain `v0 = k`, `v[i] = v[i-1] + 1` with weak stays, batch
/// loaded, then solved once.
fn run_chain_build(n: usize, repetition: u32) -> Measurement {
    let n = n.max(1);
    let started = Instant::now();
    let mut solver = Solver::new();
    solver.set_auto_solve(false);

    let vars: Vec<Variable> = (0..n).map(|i| Variable::new(format!("v{i}"))).collect();
    solver
        .add_constraint(&vars[0].eq_scalar(1.0))
        .expect("anchor constraint");
    for window in vars.windows(2) {
        let prev = &window[0];
        let next = &window[1];
        solver
            .add_constraint(&next.eq_expr(&(prev.clone() + 1.0)))
            .expect("chain constraint");
    }
    solver.solve().expect("solve");

    let duration_ms = started.elapsed().as_secs_f64() * 1000.0;
    tracing::debug!(
        component = "bench",
        operation = "chain_build",
        variables = n,
        repetition,
        duration_ms,
        tail = vars[n - 1].value(),
        "Completed chain-build case"
    );
    Measurement {
        schema_version: SCHEMA_VERSION,
        scenario: Scenario::ChainBuild.as_str().to_string(),
        variables: n,
        repetition,
        duration_ms,
        step_ms: None,
    }
}

/// Drag the head of a chain through repeated suggest/resolve rounds.
fn run_edit_drag(n: usize, repetition: u32) -> Measurement {
    let n = n.max(1);
    let mut solver = Solver::new();
    let vars: Vec<Variable> = (0..n).map(|i| Variable::new(format!("v{i}"))).collect();
    solver.add_stay(&vars[0]).expect("stay on head");
    for window in vars.windows(2) {
        let prev = &window[0];
        let next = &window[1];
        solver
            .add_constraint(&next.eq_expr(&(prev.clone() + 1.0)))
            .expect("chain constraint");
    }

    solver.add_edit_var(&vars[0]).expect("edit head");
    solver.begin_edit().expect("begin edit");
    let started = Instant::now();
    for step in 0..DRAG_STEPS {
        solver
            .suggest_value(&vars[0], step as f64)
            .expect("suggest");
        solver.resolve().expect("resolve");
    }
    let duration_ms = started.elapsed().as_secs_f64() * 1000.0;
    solver.end_edit().expect("end edit");

    tracing::debug!(
        component = "bench",
        operation = "edit_drag",
        variables = n,
        repetition,
        duration_ms,
        steps = DRAG_STEPS,
        "Completed edit-drag case"
    );
    Measurement {
        schema_version: SCHEMA_VERSION,
        scenario: Scenario::EditDrag.as_str().to_string(),
        variables: n,
        repetition,
        duration_ms,
        step_ms: Some(duration_ms / DRAG_STEPS as f64),
    }
}

fn write_artifact(path: &Path, measurements: &[Measurement]) -> io::Result<()> {
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            create_dir_all(parent)?;
        }
    }
    let mut writer = BufWriter::new(File::create(path)?);
    for measurement in measurements {
        serde_json::to_writer(&mut writer, measurement)?;
        writer.write_all(b"\n")?;
    }
    writer.flush()
}

fn render(measurements: &[Measurement], format: OutputFormat) -> io::Result<()> {
    match format {
        OutputFormat::Json => {
            for measurement in measurements {
                println!(
                    "{}",
                    serde_json::to_string(measurement).expect("serialize measurement")
                );
            }
        }
        OutputFormat::Table => {
            println!(
                "{:<12} {:>10} {:>6} {:>12} {:>10}",
                "scenario", "variables", "rep", "duration_ms", "step_ms"
            );
            for m in measurements {
                let step = m
                    .step_ms
                    .map_or_else(|| "-".to_string(), |v| format!("{v:.3}"));
                println!(
                    "{:<12} {:>10} {:>6} {:>12.3} {:>10}",
                    m.scenario, m.variables, m.repetition, m.duration_ms, step
                );
            }
        }
    }
    Ok(())
}
