use std::io::Write;
use std::path::PathBuf;
use std::time::Instant;

use anyhow::Context;
use clap::Parser;
use env_logger::{Builder, Target};
use log::LevelFilter;

use fdflow::cases::Case;
use fdflow::config;

/// Explicit finite-difference solvers, from linear convection to Navier-Stokes
#[derive(Debug, Parser)]
#[command(name = "fdflow", version, about, long_about = None)]
struct Cli {
    /// YAML configuration file
    #[arg(short, long, default_value = config::DEFAULT_PATH)]
    config: PathBuf,

    /// Case to run, overriding the configuration
    #[arg(long, value_enum)]
    case: Option<Case>,

    /// Number of time steps, overriding the configuration
    #[arg(long)]
    steps: Option<usize>,

    /// Log level (off, error, warn, info, debug, trace)
    #[arg(short, long, default_value = "info")]
    log_level: LevelFilter,
}

fn init_logging(level: LevelFilter) {
    Builder::new()
        .filter_level(level)
        .target(Target::Stdout)
        .format(|buf, record| {
            writeln!(buf, "[{} {:5}] {}", buf.timestamp_millis(), record.level(), record.args())
        })
        .init();
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    init_logging(cli.log_level);

    let mut cfg = config::load(&cli.config);
    if let Some(case) = cli.case {
        cfg.case = case;
    }
    if let Some(steps) = cli.steps {
        cfg.params.nt = Some(steps);
    }
    let setup = cfg.setup();

    let started = Instant::now();
    let outcome = cfg
        .case
        .run(&setup, cfg.boundaries.as_ref())
        .with_context(|| format!("invalid set-up for {}", cfg.case))?;
    log::info!("{} finished in {:.2?}: {}", cfg.case, started.elapsed(), outcome);

    if let Some(report) = cfg.case.check(&setup, &outcome)? {
        log::info!(
            "against the exact solution: max error {:.3e} (point {}), rms {:.3e}",
            report.max_abs_error,
            report.worst_index,
            report.l2_error
        );
    }
    if !outcome.is_finite() {
        log::warn!("{} produced non-finite values; try a smaller dt", cfg.case);
    }
    Ok(())
}
