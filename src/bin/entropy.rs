//! Measures how well the predictor would compress a file.
//!
//! ```bash
//! entropy book.txt --cells 90 --layers 3 --horizon 10 --progress 100000
//! entropy book.txt --config model.json --log-level debug
//! ```

use std::error::Error;
use std::fs;
use std::path::PathBuf;

use clap::Parser;
use tracing::{info, Level};
use tracing_subscriber::FmtSubscriber;

use lstm_predictor::{Config, Logging, Trainer};

#[derive(Parser, Debug)]
#[command(name = "entropy")]
#[command(version)]
#[command(about = "Reports the ideal code length of a file under the LSTM predictor", long_about = None)]
struct Args {
    /// File to measure
    input: PathBuf,

    /// JSON configuration file; flags below override its fields
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Cells per layer
    #[arg(long)]
    cells: Option<usize>,

    /// Number of stacked layers
    #[arg(long)]
    layers: Option<usize>,

    /// Timesteps per training window
    #[arg(long)]
    horizon: Option<usize>,

    /// Learning rate
    #[arg(long)]
    learning_rate: Option<f32>,

    /// Weight initialization seed
    #[arg(long)]
    seed: Option<u64>,

    /// Log progress every this many bytes
    #[arg(long)]
    progress: Option<u64>,

    /// Log level (trace, debug, info, warn, error)
    #[arg(long, default_value = "info")]
    log_level: String,
}

impl Args {
    fn config(&self) -> Result<Config, Box<dyn Error>> {
        let mut config = match &self.config {
            Some(path) => Config::load(path)?,
            None => Config::default(),
        };
        if let Some(cells) = self.cells {
            config = config.cells(cells);
        }
        if let Some(layers) = self.layers {
            config = config.layers(layers);
        }
        if let Some(horizon) = self.horizon {
            config = config.horizon(horizon);
        }
        if let Some(rate) = self.learning_rate {
            config = config.learning_rate(rate);
        }
        if let Some(seed) = self.seed {
            config = config.seed(seed);
        }
        Ok(config)
    }
}

fn main() -> Result<(), Box<dyn Error>> {
    let args = Args::parse();

    let level = match args.log_level.to_lowercase().as_str() {
        "trace" => Level::TRACE,
        "debug" => Level::DEBUG,
        "info" => Level::INFO,
        "warn" => Level::WARN,
        "error" => Level::ERROR,
        _ => Level::INFO,
    };
    let subscriber = FmtSubscriber::builder().with_max_level(level).finish();
    tracing::subscriber::set_global_default(subscriber)?;

    let config = args.config()?;
    let predictor = config.build()?;
    info!(
        cells = config.cells,
        layers = config.layers,
        horizon = config.horizon,
        learning_rate = config.learning_rate,
        seed = config.seed,
        "built predictor"
    );

    let data = fs::read(&args.input)?;
    let logging = match args.progress {
        Some(n) => Logging::Interval(n),
        None => Logging::Completion,
    };
    let mut trainer = Trainer::new(predictor).logging(logging);
    let report = trainer.train(&data);
    println!("{}: {}", args.input.display(), report);
    Ok(())
}
