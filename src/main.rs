use crate::algos::Shuffle;
use crate::config::Config;
use crate::feasibility::FeasibilityChecker;
use crate::loaders::Loader;
use crate::model::AssignmentPool;
use crate::stats::FairnessReport;
use clap::Parser;
use eyre::WrapErr;
use std::path::PathBuf;
use tracing::{Level, info, warn};

mod algos;
mod checks;
mod config;
mod display;
mod error;
mod feasibility;
mod loaders;
mod model;
mod remap;
mod stats;

#[derive(Parser, Debug)]
#[command(version, author, about)]
struct Args {
    /// Use FILE instead of teamsolver.toml
    #[arg(short, long, value_name = "FILE")]
    config: Option<PathBuf>,
    /// Seed used to shuffle students, overriding the configuration
    #[arg(short, long)]
    seed: Option<u64>,
    /// Do not write back results
    #[arg(short = 'n', long)]
    dry_run: bool,
    /// Set verbosity level
    #[arg(short, action = clap::ArgAction::Count)]
    verbose: u8,
}

#[tokio::main]
async fn main() -> eyre::Result<()> {
    color_eyre::install()?;
    let args = Args::parse();
    let level = match args.verbose {
        0 => Level::ERROR,
        1 => Level::WARN,
        2 => Level::INFO,
        3 => Level::DEBUG,
        _ => Level::TRACE,
    };
    tracing_subscriber::fmt()
        .with_max_level(level)
        .with_writer(std::io::stderr)
        .init();
    let mut config = Config::load_or_default(args.config.as_deref())?;
    if let Some(seed) = args.seed {
        config.solver.seed = seed;
    }
    let mut loader = Loader::from_config(&config).await?;
    let (students, projects) = loader.load().await?;
    let (students, projects) =
        remap::remap(students, projects).wrap_err("cannot resolve loaded records")?;
    let mut assignments = AssignmentPool::new(students, projects);
    info!(
        students = assignments.students.len(),
        seats = assignments.total_capacity(),
        seed = config.solver.seed,
        "Starting assignment"
    );
    let summary = algos::solve(
        &mut assignments,
        &config.constraints,
        config.solver.initial_order,
        Shuffle::seeded(config.solver.seed),
    )?;
    checks::ensure_consistent(
        &assignments,
        &FeasibilityChecker::new(config.constraints.clone()),
    )?;
    let report = FairnessReport::new(&assignments);
    if !args.dry_run {
        loader.save(&assignments, &report).await?;
    }
    display::display_details(&assignments);
    display::display_stats(&report);
    display::display_dropped(&assignments, &summary);
    display::display_unassigned(&assignments);
    for s in checks::missed_first_choices(&assignments) {
        warn!(
            student = %assignments.student(s),
            "Student did not get its first choice although the project is running"
        );
    }
    Ok(())
}
