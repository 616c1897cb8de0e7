//! Cancellation CLI: analyse cancellation task datasets.
//!
//! Usage:
//!   cancellation analyze <DATASET_DIR>   Analyse one dataset directory
//!   cancellation batch <RAW_DIR>         Analyse every dataset in a folder
//!   cancellation info <DATASET_DIR>      Show dataset information

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};

use cancellation_common::config::{AnalysisConfig, AppConfig, DisplaySize};

mod commands;

#[derive(Parser)]
#[command(
    name = "cancellation",
    about = "Analysis of visual cancellation task recordings",
    version,
    author
)]
struct Cli {
    /// Enable verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Configuration file (defaults to the user config directory)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

/// Options shared by `analyze` and `batch`; each overrides the config file.
#[derive(Args, Debug, Clone, Default)]
struct AnalysisArgs {
    /// Click-to-target distance threshold (pixels)
    #[arg(long)]
    threshold: Option<f64>,

    /// Directory with one sub-directory per task (targets.txt, task.png)
    #[arg(long)]
    tasks_dir: Option<PathBuf>,

    /// Output directory
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Display width in pixels (instead of reading task.png)
    #[arg(long, requires = "height")]
    width: Option<u32>,

    /// Display height in pixels (instead of reading task.png)
    #[arg(long, requires = "width")]
    height: Option<u32>,

    /// Skip writing heatmap images
    #[arg(long)]
    no_images: bool,
}

impl AnalysisArgs {
    fn apply(self, mut config: AnalysisConfig) -> AnalysisConfig {
        if let Some(threshold) = self.threshold {
            config.distance_threshold = threshold;
        }
        if let Some(tasks_dir) = self.tasks_dir {
            config.tasks_dir = Some(tasks_dir);
        }
        if let Some(output) = self.output {
            config.output_dir = output;
        }
        if let (Some(width), Some(height)) = (self.width, self.height) {
            config.display = Some(DisplaySize::new(width, height));
        }
        if self.no_images {
            config.render_images = false;
        }
        config
    }
}

#[derive(Subcommand)]
enum Commands {
    /// Analyse a single dataset directory
    Analyze {
        /// Path to the dataset directory
        path: PathBuf,

        #[command(flatten)]
        options: AnalysisArgs,
    },

    /// Analyse every dataset directory in a raw-data folder
    Batch {
        /// Folder holding one directory per dataset
        path: PathBuf,

        #[command(flatten)]
        options: AnalysisArgs,
    },

    /// Show dataset information
    Info {
        /// Path to the dataset directory
        path: PathBuf,

        #[command(flatten)]
        options: AnalysisArgs,
    },
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let app_config = match &cli.config {
        Some(path) => AppConfig::load_from(path),
        None => AppConfig::load(),
    };

    // Initialize logging
    let mut logging = app_config.logging.clone();
    if cli.verbose {
        logging.level = "debug".to_string();
    }
    cancellation_common::logging::init_logging(&logging);

    match cli.command {
        Commands::Analyze { path, options } => {
            commands::analyze::run(path, options.apply(app_config.analysis))
        }
        Commands::Batch { path, options } => {
            commands::batch::run(path, options.apply(app_config.analysis))
        }
        Commands::Info { path, options } => {
            commands::info::run(path, options.apply(app_config.analysis))
        }
    }
}
