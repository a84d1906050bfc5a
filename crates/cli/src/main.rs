//! Insurance Cost Predictor CLI
//!
//! Runs the same encode-and-predict path as the form server, from the
//! terminal and against a local model artifact.

mod commands;
mod config;
mod output;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand, ValueEnum};
use commands::{model, predict};
use predictor_lib::{Encoding, ModelFormat};
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

/// Insurance Cost Predictor CLI
#[derive(Parser)]
#[command(name = "icp")]
#[command(author, version, long_about = None)]
#[command(about = "CLI for the Medical Insurance Cost Predictor")]
pub struct Cli {
    /// Path to the trained estimator artifact (.onnx or .json)
    #[arg(long, global = true, env = "ICP_MODEL_PATH")]
    pub model: Option<PathBuf>,

    /// Artifact format
    #[arg(long, global = true, default_value = "auto")]
    pub model_format: ModelFormatArg,

    /// Output format
    #[arg(long, short, global = true, default_value = "table")]
    pub format: output::OutputFormat,

    /// Enable verbose output
    #[arg(long, short, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Predict the insurance cost for one person
    Predict(predict::InputArgs),

    /// Show the feature vector the model would receive
    Encode(predict::InputArgs),

    /// Inspect the model artifact
    #[command(subcommand)]
    Model(ModelCommands),
}

#[derive(Subcommand)]
pub enum ModelCommands {
    /// Show format, version and checksum of the artifact
    Info,
}

#[derive(Debug, Clone, Copy, ValueEnum)]
pub enum ModelFormatArg {
    /// Choose from the file extension
    Auto,
    Onnx,
    Linear,
}

impl From<ModelFormatArg> for ModelFormat {
    fn from(arg: ModelFormatArg) -> Self {
        match arg {
            ModelFormatArg::Auto => ModelFormat::Auto,
            ModelFormatArg::Onnx => ModelFormat::Onnx,
            ModelFormatArg::Linear => ModelFormat::Linear,
        }
    }
}

fn init_logging(verbose: bool) {
    let default_level = if verbose { "debug" } else { "warn" };
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level)),
        )
        .with_writer(std::io::stderr)
        .init();
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    let config = config::Config::load()?;
    let encoding = match config.region_codes {
        Some(codes) => Encoding::new(codes).context("Invalid region_codes in CLI config")?,
        None => Encoding::default(),
    };
    let model_path = config.resolve_model_path(cli.model.clone());
    let model_format = ModelFormat::from(cli.model_format);

    match cli.command {
        Commands::Predict(input) => {
            predict::predict(&input, &model_path, model_format, encoding, cli.format)?;
        }
        Commands::Encode(input) => {
            predict::encode(&input, &encoding, cli.format)?;
        }
        Commands::Model(ModelCommands::Info) => {
            model::info(&model_path, model_format, cli.format)?;
        }
    }

    Ok(())
}
