//! One-shot prediction and encoding inspection

use anyhow::{Context, Result};
use clap::{Args, ValueEnum};
use colored::Colorize;
use predictor_lib::{
    load_model, Encoding, Gender, ModelFormat, PredictionAdapter, PredictionRequest, Region,
    Smoker, FEATURE_NAMES,
};
use serde::Serialize;
use std::path::Path;

use crate::output::{print_json, print_rows, print_success, print_warning, FieldRow, OutputFormat};

#[derive(Debug, Clone, Copy, ValueEnum)]
pub enum GenderArg {
    Male,
    Female,
}

impl From<GenderArg> for Gender {
    fn from(arg: GenderArg) -> Self {
        match arg {
            GenderArg::Male => Gender::Male,
            GenderArg::Female => Gender::Female,
        }
    }
}

#[derive(Debug, Clone, Copy, ValueEnum)]
pub enum SmokerArg {
    Yes,
    No,
}

impl From<SmokerArg> for Smoker {
    fn from(arg: SmokerArg) -> Self {
        match arg {
            SmokerArg::Yes => Smoker::Yes,
            SmokerArg::No => Smoker::No,
        }
    }
}

#[derive(Debug, Clone, Copy, ValueEnum)]
pub enum RegionArg {
    Southeast,
    Southwest,
    Northeast,
    Northwest,
}

impl From<RegionArg> for Region {
    fn from(arg: RegionArg) -> Self {
        match arg {
            RegionArg::Southeast => Region::Southeast,
            RegionArg::Southwest => Region::Southwest,
            RegionArg::Northeast => Region::Northeast,
            RegionArg::Northwest => Region::Northwest,
        }
    }
}

/// The six form fields
#[derive(Debug, Clone, Args)]
pub struct InputArgs {
    /// Age in years (1-120)
    #[arg(long, value_parser = clap::value_parser!(u32).range(1..=120))]
    pub age: u32,

    /// Gender
    #[arg(long, value_enum, ignore_case = true)]
    pub gender: GenderArg,

    /// Body mass index (10.0-50.0)
    #[arg(long, value_parser = parse_bmi)]
    pub bmi: f64,

    /// Number of children (0-10)
    #[arg(long, default_value_t = 0, value_parser = clap::value_parser!(u32).range(0..=10))]
    pub children: u32,

    /// Smoker status
    #[arg(long, value_enum, ignore_case = true)]
    pub smoker: SmokerArg,

    /// Region of residence
    #[arg(long, value_enum, ignore_case = true)]
    pub region: RegionArg,
}

impl InputArgs {
    pub fn to_request(&self) -> PredictionRequest {
        PredictionRequest {
            age: self.age,
            gender: Gender::from(self.gender).label().to_string(),
            bmi: self.bmi,
            children: self.children,
            smoker: Smoker::from(self.smoker).label().to_string(),
            region: Region::from(self.region).label().to_string(),
        }
    }
}

fn parse_bmi(raw: &str) -> Result<f64, String> {
    let value: f64 = raw
        .parse()
        .map_err(|_| format!("'{}' is not a number", raw))?;
    if (10.0..=50.0).contains(&value) {
        Ok(value)
    } else {
        Err(format!("{} is outside the allowed range 10.0..=50.0", value))
    }
}

#[derive(Serialize)]
struct EncodedRow {
    features: Vec<f64>,
    names: [&'static str; 6],
}

/// Print the encoded feature vector without loading a model
pub fn encode(input: &InputArgs, encoding: &Encoding, format: OutputFormat) -> Result<()> {
    let features = encoding
        .encode(&input.to_request())
        .context("Failed to encode input")?;

    match format {
        OutputFormat::Json => print_json(&EncodedRow {
            features: features.to_array().to_vec(),
            names: FEATURE_NAMES,
        }),
        OutputFormat::Table => {
            let rows = FEATURE_NAMES
                .iter()
                .zip(features.to_array())
                .map(|(name, value)| FieldRow::new(*name, value))
                .collect();
            print_rows(rows);
            Ok(())
        }
    }
}

/// Load the artifact, predict once and print the cost
pub fn predict(
    input: &InputArgs,
    model_path: &Path,
    model_format: ModelFormat,
    encoding: Encoding,
    format: OutputFormat,
) -> Result<()> {
    let model = load_model(model_path, model_format)
        .with_context(|| format!("Cannot predict without a model ({})", model_path.display()))?;
    let adapter = PredictionAdapter::with_encoding(model.estimator, encoding);

    let outcome = adapter
        .predict_detailed(&input.to_request())
        .context("Prediction failed")?;

    match format {
        OutputFormat::Json => print_json(&outcome),
        OutputFormat::Table => {
            print_success(&format!(
                "Predicted Insurance Cost: {}",
                outcome.formatted.bold()
            ));
            if outcome.cost < 0.0 {
                print_warning("Negative estimate, the inputs may be far from the training data");
            }
            Ok(())
        }
    }
}
