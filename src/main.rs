//! Kohonen CLI - Self-Organizing Map trainer
//!
//! Command-line interface for training, inspecting and querying SOM grids.

use clap::{Parser, Subcommand, ValueEnum};
use indicatif::{HumanDuration, ProgressBar, ProgressStyle};
use kohonen::{pipeline, storage, Config, FileSource, InitMethod, Result, TrainingParams};
use log::{error, warn};
use std::path::PathBuf;
use std::time::Instant;

#[derive(Parser)]
#[command(name = "kohonen")]
#[command(author = "Kohonen Contributors")]
#[command(version)]
#[command(about = "Self-Organizing Map trainer", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Verbose output
    #[arg(short, long, global = true)]
    verbose: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Train a SOM from a CSV-like data file
    Train(TrainArgs),

    /// Show grid shape and weight ranges of a saved SOM
    Info {
        /// Saved SOM file
        som: PathBuf,
    },

    /// Print the best matching unit of every row in a data file
    Map {
        /// Saved SOM file
        #[arg(short, long)]
        som: PathBuf,

        /// Input data file (one vector per line)
        #[arg(short, long)]
        input: PathBuf,

        /// Column to ignore when parsing rows
        #[arg(short, long)]
        class_index: Option<usize>,
    },
}

#[derive(Clone, Copy, ValueEnum)]
enum InitArg {
    /// Every weight set to --equalize-val
    Equalize,
    /// Weights drawn from [--randomize-min, --randomize-max]
    Randomize,
    /// Weights drawn from the range of each data dimension
    Intelligent,
}

#[derive(clap::Args)]
struct TrainArgs {
    /// TOML configuration file; flags below override its values
    #[arg(long)]
    config: Option<PathBuf>,

    /// Grid rows
    #[arg(long)]
    rows: Option<usize>,

    /// Grid columns
    #[arg(long)]
    cols: Option<usize>,

    /// Input vector dimensionality
    #[arg(long)]
    input_dims: Option<usize>,

    /// Training data file
    #[arg(long)]
    train: Option<PathBuf>,

    /// Column to ignore when parsing rows (e.g. a class label)
    #[arg(long)]
    class_index: Option<usize>,

    /// File the trained SOM is saved to
    #[arg(long)]
    save: Option<PathBuf>,

    /// Continue training a previously saved SOM
    #[arg(long)]
    load: Option<PathBuf>,

    /// Weight initialization method
    #[arg(long, value_enum)]
    init: Option<InitArg>,

    /// Value for equalize initialization (default: 0.0)
    #[arg(long)]
    equalize_val: Option<f64>,

    /// Lower bound for randomize initialization (default: -1.0)
    #[arg(long)]
    randomize_min: Option<f64>,

    /// Upper bound for randomize initialization (default: 1.0)
    #[arg(long)]
    randomize_max: Option<f64>,

    /// Rescale inputs into [0, 1] during training
    #[arg(long, conflicts_with = "no_normalize")]
    normalize: bool,

    /// Train on raw input values
    #[arg(long)]
    no_normalize: bool,

    /// Random seed for reproducibility
    #[arg(short, long)]
    seed: Option<u64>,

    #[command(flatten)]
    phase1: Phase1Args,

    #[command(flatten)]
    phase2: Phase2Args,
}

#[derive(clap::Args)]
struct Phase1Args {
    /// Phase 1 iterations
    #[arg(long = "p1-iterations")]
    p1_iterations: Option<usize>,

    /// Phase 1 initial learning rate
    #[arg(long = "p1-learn-rate-initial")]
    p1_learn_rate_initial: Option<f64>,

    /// Phase 1 final learning rate
    #[arg(long = "p1-learn-rate-final")]
    p1_learn_rate_final: Option<f64>,

    /// Phase 1 initial neighborhood radius
    #[arg(long = "p1-n-radius-initial")]
    p1_radius_initial: Option<f64>,

    /// Phase 1 final neighborhood radius
    #[arg(long = "p1-n-radius-final")]
    p1_radius_final: Option<f64>,
}

#[derive(clap::Args)]
struct Phase2Args {
    /// Phase 2 iterations
    #[arg(long = "p2-iterations")]
    p2_iterations: Option<usize>,

    /// Phase 2 initial learning rate
    #[arg(long = "p2-learn-rate-initial")]
    p2_learn_rate_initial: Option<f64>,

    /// Phase 2 final learning rate
    #[arg(long = "p2-learn-rate-final")]
    p2_learn_rate_final: Option<f64>,

    /// Phase 2 initial neighborhood radius
    #[arg(long = "p2-n-radius-initial")]
    p2_radius_initial: Option<f64>,

    /// Phase 2 final neighborhood radius
    #[arg(long = "p2-n-radius-final")]
    p2_radius_final: Option<f64>,
}

/// Per-phase overrides shared by both phase flag groups.
struct PhaseOverrides {
    iterations: Option<usize>,
    learn_rate_initial: Option<f64>,
    learn_rate_final: Option<f64>,
    radius_initial: Option<f64>,
    radius_final: Option<f64>,
}

impl From<Phase1Args> for PhaseOverrides {
    fn from(a: Phase1Args) -> Self {
        Self {
            iterations: a.p1_iterations,
            learn_rate_initial: a.p1_learn_rate_initial,
            learn_rate_final: a.p1_learn_rate_final,
            radius_initial: a.p1_radius_initial,
            radius_final: a.p1_radius_final,
        }
    }
}

impl From<Phase2Args> for PhaseOverrides {
    fn from(a: Phase2Args) -> Self {
        Self {
            iterations: a.p2_iterations,
            learn_rate_initial: a.p2_learn_rate_initial,
            learn_rate_final: a.p2_learn_rate_final,
            radius_initial: a.p2_radius_initial,
            radius_final: a.p2_radius_final,
        }
    }
}

impl PhaseOverrides {
    fn is_empty(&self) -> bool {
        self.iterations.is_none()
            && self.learn_rate_initial.is_none()
            && self.learn_rate_final.is_none()
            && self.radius_initial.is_none()
            && self.radius_final.is_none()
    }

    fn apply(&self, params: &mut TrainingParams) {
        if let Some(v) = self.iterations {
            params.iterations = v;
        }
        if let Some(v) = self.learn_rate_initial {
            params.learn_rate_initial = v;
        }
        if let Some(v) = self.learn_rate_final {
            params.learn_rate_final = v;
        }
        if let Some(v) = self.radius_initial {
            params.radius_initial = v;
        }
        if let Some(v) = self.radius_final {
            params.radius_final = v;
        }
    }
}

fn main() {
    let cli = Cli::parse();

    // Initialize logging
    if cli.verbose {
        env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();
    } else {
        env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn")).init();
    }

    let result = match cli.command {
        Commands::Train(args) => train_som(args),
        Commands::Info { som } => show_info(som),
        Commands::Map {
            som,
            input,
            class_index,
        } => map_rows(som, input, class_index),
    };

    if let Err(e) = result {
        error!("Error: {}", e);
        std::process::exit(1);
    }
}

/// Builds the run configuration: defaults, then the config file, then flags.
fn build_config(args: TrainArgs) -> Result<Config> {
    let mut config = match &args.config {
        Some(path) => Config::load(path)?,
        None => Config::default(),
    };

    if let Some(rows) = args.rows {
        config.grid.rows = rows;
    }
    if let Some(cols) = args.cols {
        config.grid.cols = cols;
    }
    if let Some(dims) = args.input_dims {
        config.grid.dims = dims;
    }
    if let Some(train) = args.train {
        config.data.train_file = train;
    }
    if args.class_index.is_some() {
        config.data.excluded_column = args.class_index;
    }
    if let Some(save) = args.save {
        config.output.save_file = save;
    }
    if args.load.is_some() {
        config.output.load_file = args.load;
    }
    if args.normalize {
        config.data.normalize = true;
    }
    if args.no_normalize {
        config.data.normalize = false;
    }
    if args.seed.is_some() {
        config.seed = args.seed;
    }

    match args.init {
        Some(InitArg::Equalize) => {
            config.init = InitMethod::Equalize {
                value: args.equalize_val.unwrap_or(0.0),
            };
        }
        Some(InitArg::Randomize) => {
            config.init = InitMethod::Uniform {
                min: args.randomize_min.unwrap_or(-1.0),
                max: args.randomize_max.unwrap_or(1.0),
            };
        }
        Some(InitArg::Intelligent) => config.init = InitMethod::DataDriven,
        None => match &mut config.init {
            InitMethod::Equalize { value } => {
                if let Some(v) = args.equalize_val {
                    *value = v;
                }
            }
            InitMethod::Uniform { min, max } => {
                if let Some(v) = args.randomize_min {
                    *min = v;
                }
                if let Some(v) = args.randomize_max {
                    *max = v;
                }
            }
            InitMethod::DataDriven => {}
        },
    }

    let ignored = ignored_init_flags(
        &config.init,
        args.equalize_val,
        args.randomize_min,
        args.randomize_max,
    );
    if !ignored.is_empty() {
        warn!(
            "Ignoring {} with {:?} initialization",
            ignored.join(", "),
            config.init
        );
    }

    let overrides: [PhaseOverrides; 2] = [args.phase1.into(), args.phase2.into()];
    for (i, phase) in overrides.iter().enumerate() {
        if phase.is_empty() {
            continue;
        }
        while config.phases.len() <= i {
            config.phases.push(TrainingParams::default());
        }
        phase.apply(&mut config.phases[i]);
    }

    config.validate()?;
    Ok(config)
}

/// Init flags given on the command line that the chosen method does not use.
fn ignored_init_flags(
    init: &InitMethod,
    equalize_val: Option<f64>,
    randomize_min: Option<f64>,
    randomize_max: Option<f64>,
) -> Vec<&'static str> {
    let (uses_equalize, uses_randomize) = match init {
        InitMethod::Equalize { .. } => (true, false),
        InitMethod::Uniform { .. } => (false, true),
        InitMethod::DataDriven => (false, false),
    };

    let mut ignored = Vec::new();
    if equalize_val.is_some() && !uses_equalize {
        ignored.push("--equalize-val");
    }
    if randomize_min.is_some() && !uses_randomize {
        ignored.push("--randomize-min");
    }
    if randomize_max.is_some() && !uses_randomize {
        ignored.push("--randomize-max");
    }
    ignored
}

fn train_som(args: TrainArgs) -> Result<()> {
    let start_time = Instant::now();
    let config = build_config(args)?;

    println!("Kohonen Self-Organizing Map");
    println!("   Training from: {}", config.data.train_file.display());
    println!(
        "   Grid: {}x{} ({} neurons, {}-dim weights)",
        config.grid.rows,
        config.grid.cols,
        format_number(config.grid.total_neurons()),
        config.grid.dims
    );
    println!();

    let bar_style = ProgressStyle::default_bar()
        .template("{msg}\n{spinner:.green} [{elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len} ({percent}%) ETA: {eta}")
        .unwrap_or_else(|_| ProgressStyle::default_bar())
        .progress_chars("█▓▒░  ");

    let phase_count = config.phases.len();
    let mut current: Option<(usize, ProgressBar)> = None;

    let outcome = pipeline::run_with_progress(&config, |phase, iteration, iterations, lr, radius| {
        if current.as_ref().map(|(p, _)| *p) != Some(phase) {
            if let Some((_, pb)) = current.take() {
                pb.finish_and_clear();
            }
            let pb = ProgressBar::new(iterations as u64);
            pb.set_style(bar_style.clone());
            current = Some((phase, pb));
        }

        if let Some((_, pb)) = &current {
            pb.set_position(iteration as u64 + 1);
            if iteration % 100 == 0 || iteration + 1 == iterations {
                pb.set_message(format!(
                    "Phase {}/{}: lr {:.4}, radius {:.2}",
                    phase, phase_count, lr, radius
                ));
            }
            if iteration + 1 == iterations {
                pb.finish_and_clear();
                println!(
                    "✓ Phase {}/{}: {} iterations",
                    phase,
                    phase_count,
                    format_number(iterations)
                );
            }
        }
    });

    // Clear a bar left behind by a failing phase
    if let Some((_, pb)) = current.take() {
        pb.finish_and_clear();
    }
    let outcome = outcome?;

    for report in &outcome.reports {
        if report.rewinds > 0 || report.malformed_rows > 0 {
            println!(
                "   Phase {}: {} rewinds, {} malformed rows skipped",
                report.phase,
                format_number(report.rewinds),
                format_number(report.malformed_rows)
            );
        }
    }

    storage::save(&outcome.grid, &config.output.save_file)?;
    println!("✓ Saved SOM to {}", config.output.save_file.display());

    // Summary
    let elapsed = start_time.elapsed();
    let total_iterations: usize = outcome.reports.iter().map(|r| r.iterations).sum();
    println!();
    println!("Training complete in {}", HumanDuration(elapsed));
    println!("   Phases: {}", outcome.reports.len());
    println!("   Iterations: {}", format_number(total_iterations));
    println!("   Output: {}", config.output.save_file.display());

    Ok(())
}

/// Format large numbers with commas for readability
fn format_number(n: usize) -> String {
    let s = n.to_string();
    let mut result = String::new();
    for (i, c) in s.chars().rev().enumerate() {
        if i > 0 && i % 3 == 0 {
            result.push(',');
        }
        result.push(c);
    }
    result.chars().rev().collect()
}

fn show_info(som_path: PathBuf) -> Result<()> {
    let grid = storage::load(&som_path)?;

    println!("SOM: {:?}", som_path);
    println!("  Grid: {}x{}", grid.rows(), grid.cols());
    println!("  Neurons: {}", format_number(grid.neuron_count()));
    println!("  Weight dimensions: {}", grid.dims());

    let mut min = vec![f64::INFINITY; grid.dims()];
    let mut max = vec![f64::NEG_INFINITY; grid.dims()];
    for neuron in grid.neurons() {
        for (d, &w) in neuron.iter().enumerate() {
            min[d] = min[d].min(w);
            max[d] = max[d].max(w);
        }
    }

    println!("  Weight ranges:");
    for (d, (lo, hi)) in min.iter().zip(&max).enumerate() {
        println!("    [{}] {:.6} .. {:.6}", d, lo, hi);
    }

    Ok(())
}

fn map_rows(som_path: PathBuf, input: PathBuf, class_index: Option<usize>) -> Result<()> {
    let grid = storage::load(&som_path)?;
    let mut source = FileSource::open(&input)?;
    let mappings = pipeline::map_rows(&grid, &mut source, class_index)?;

    println!("line,row,col,distance");
    for m in &mappings {
        println!("{},{},{},{:.6}", m.line, m.row, m.col, m.distance);
    }

    Ok(())
}
