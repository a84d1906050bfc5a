//! Artifact inspection

use anyhow::{Context, Result};
use predictor_lib::{load_model, ModelFormat};
use std::path::Path;

use crate::output::{format_bytes, print_info, print_json, print_rows, FieldRow, OutputFormat};

/// Load the artifact and print its metadata
pub fn info(model_path: &Path, model_format: ModelFormat, format: OutputFormat) -> Result<()> {
    let model = load_model(model_path, model_format)
        .with_context(|| format!("Failed to load model {}", model_path.display()))?;
    let info = model.info;

    match format {
        OutputFormat::Json => print_json(&info),
        OutputFormat::Table => {
            print_info(&format!("Model artifact {}", info.path.display()));
            print_rows(vec![
                FieldRow::new("Format", info.format),
                FieldRow::new("Version", &info.model_version),
                FieldRow::new("SHA-256", &info.checksum),
                FieldRow::new("Size", format_bytes(info.size_bytes)),
            ]);
            Ok(())
        }
    }
}
