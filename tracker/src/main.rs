//! pinchpoint - replay or stream hand-landmark frames through the gesture
//! tracker and print one event line per frame.

use std::fs::File;
use std::io::{self, BufRead, BufReader, Write};
use std::path::PathBuf;
use std::thread;

use anyhow::{Context, Result};
use clap::Parser;
use tracing::{info, warn};

use pinchpoint::ipc::{decode_frame, format_action, format_output};
use pinchpoint::pipeline::{self, FrameSender};
use pinchpoint::{ActionPlanner, FrameOutput, GestureTracker, TimedFrame, TrackerConfig};

#[derive(Parser, Debug)]
#[command(name = "pinchpoint", about = "Pinch gesture recognition from hand landmarks")]
struct Cli {
    /// TOML configuration file (defaults apply when omitted)
    #[arg(long)]
    config: Option<PathBuf>,

    /// Frame input file, one s-expression per line (default: stdin)
    #[arg(long)]
    input: Option<PathBuf>,

    /// Route frames through the keep-latest pipeline instead of replaying
    /// every frame
    #[arg(long)]
    live: bool,

    /// Also print planned device actions
    #[arg(long)]
    actions: bool,

    /// Print the effective configuration as TOML and exit
    #[arg(long)]
    print_config: bool,
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "pinchpoint=info".into()),
        )
        .with_writer(io::stderr)
        .init();

    let config = match &cli.config {
        Some(path) => TrackerConfig::from_file(path)
            .with_context(|| format!("loading config {}", path.display()))?,
        None => TrackerConfig::default(),
    };

    if cli.print_config {
        print!("{}", config.to_toml_string().context("serializing config")?);
        return Ok(());
    }

    info!("pinchpoint v{} starting", env!("CARGO_PKG_VERSION"));
    info!(live = cli.live, actions = cli.actions, "mode");

    let input: Box<dyn BufRead + Send> = match &cli.input {
        Some(path) => Box::new(BufReader::new(
            File::open(path).with_context(|| format!("opening input {}", path.display()))?,
        )),
        None => Box::new(BufReader::new(io::stdin())),
    };

    let mut planner = cli
        .actions
        .then(|| ActionPlanner::new(&config.actions, &config.cursor));
    let tracker = GestureTracker::new(config);
    let mut out = io::stdout().lock();

    let tracker = if cli.live {
        run_live(tracker, input, &mut out, planner.as_mut())?
    } else {
        run_replay(tracker, input, &mut out, planner.as_mut())?
    };

    out.flush().context("flushing output")?;
    info!(status = %tracker.status_sexp(), "final status");
    info!(config = %tracker.config_sexp(), "final config");
    Ok(())
}

/// Process every frame in order on the current thread.
fn run_replay(
    mut tracker: GestureTracker,
    input: Box<dyn BufRead + Send>,
    out: &mut impl Write,
    mut planner: Option<&mut ActionPlanner>,
) -> Result<GestureTracker> {
    for frame in frames(input) {
        let output = tracker.process(&frame?);
        emit(out, &output, planner.as_deref_mut())?;
    }
    Ok(tracker)
}

/// Read on a producer thread and let the worker skip frames it cannot keep
/// up with.
fn run_live(
    tracker: GestureTracker,
    input: Box<dyn BufRead + Send>,
    out: &mut impl Write,
    mut planner: Option<&mut ActionPlanner>,
) -> Result<GestureTracker> {
    let (sender, worker) = pipeline::spawn(tracker).context("starting tracker worker")?;
    let metrics = sender.metrics();

    let producer = thread::Builder::new()
        .name("pinchpoint-reader".into())
        .spawn(move || produce(input, sender))
        .context("starting reader thread")?;

    for output in worker.outputs().iter() {
        emit(out, &output, planner.as_deref_mut())?;
    }

    producer
        .join()
        .map_err(|_| anyhow::anyhow!("reader thread panicked"))??;
    let tracker = worker.join()?;

    let stats = metrics.snapshot();
    info!(
        sent = stats.frames_sent,
        evicted = stats.frames_evicted,
        processed = stats.frames_processed,
        "live pipeline finished"
    );
    Ok(tracker)
}

fn produce(input: Box<dyn BufRead + Send>, sender: FrameSender) -> Result<()> {
    for frame in frames(input) {
        sender.send(frame?)?;
    }
    Ok(())
}

/// Decoded frames from the input, skipping blank lines, `;` comments and
/// lines that do not decode.
fn frames(input: Box<dyn BufRead + Send>) -> impl Iterator<Item = Result<TimedFrame>> {
    input
        .lines()
        .enumerate()
        .filter_map(|(index, line)| {
            let line = match line {
                Ok(line) => line,
                Err(e) => return Some(Err(anyhow::Error::new(e).context("reading input"))),
            };
            let trimmed = line.trim();
            if trimmed.is_empty() || trimmed.starts_with(';') {
                return None;
            }
            match decode_frame(trimmed) {
                Ok(frame) => Some(Ok(frame)),
                Err(e) => {
                    warn!(line = index + 1, "skipping frame: {}", e);
                    None
                }
            }
        })
}

fn emit(
    out: &mut impl Write,
    output: &FrameOutput,
    planner: Option<&mut ActionPlanner>,
) -> Result<()> {
    writeln!(out, "{}", format_output(output)).context("writing event")?;
    if let Some(action) = planner.and_then(|p| p.plan(output)) {
        writeln!(out, "{}", format_action(&action)).context("writing action")?;
    }
    Ok(())
}
