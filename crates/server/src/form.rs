//! Form handling for the prediction page
//!
//! The browser submits every field as text. Numeric fields are parsed and
//! range checked here; categorical fields are passed through untouched so the
//! prediction adapter can reject unknown values itself.

use predictor_lib::{Gender, PredictionRequest, Region, Smoker};
use serde::Deserialize;
use std::fmt;
use std::ops::RangeInclusive;

pub const AGE_RANGE: RangeInclusive<u32> = 1..=120;
pub const BMI_RANGE: RangeInclusive<f64> = 10.0..=50.0;
pub const CHILDREN_RANGE: RangeInclusive<u32> = 0..=10;

/// Raw form body as posted by the page
///
/// Missing fields deserialize as empty text and fail validation.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct PredictionForm {
    #[serde(default)]
    pub age: String,
    #[serde(default)]
    pub gender: String,
    #[serde(default)]
    pub bmi: String,
    #[serde(default)]
    pub children: String,
    #[serde(default)]
    pub smoker: String,
    #[serde(default)]
    pub region: String,
}

impl Default for PredictionForm {
    /// Initial widget values shown before the first prediction
    fn default() -> Self {
        Self {
            age: "25".to_string(),
            gender: Gender::Male.label().to_string(),
            bmi: "25.0".to_string(),
            children: "0".to_string(),
            smoker: Smoker::Yes.label().to_string(),
            region: Region::Southeast.label().to_string(),
        }
    }
}

/// A single field that failed validation
#[derive(Debug, Clone, PartialEq)]
pub struct FieldError {
    pub field: &'static str,
    pub message: String,
}

impl fmt::Display for FieldError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.field, self.message)
    }
}

impl PredictionForm {
    /// Parse and range check the numeric fields
    pub fn validate(&self) -> Result<PredictionRequest, Vec<FieldError>> {
        let mut errors = Vec::new();

        let age = parse_integer("age", &self.age, AGE_RANGE, &mut errors);
        let bmi = parse_bmi(&self.bmi, &mut errors);
        let children = parse_integer("children", &self.children, CHILDREN_RANGE, &mut errors);

        match (age, bmi, children) {
            (Some(age), Some(bmi), Some(children)) if errors.is_empty() => Ok(PredictionRequest {
                age,
                gender: self.gender.clone(),
                bmi,
                children,
                smoker: self.smoker.clone(),
                region: self.region.clone(),
            }),
            _ => Err(errors),
        }
    }
}

fn parse_integer(
    field: &'static str,
    raw: &str,
    range: RangeInclusive<u32>,
    errors: &mut Vec<FieldError>,
) -> Option<u32> {
    let message = match raw.trim().parse::<u32>() {
        Ok(value) if range.contains(&value) => return Some(value),
        Ok(value) => format!(
            "{} is outside the allowed range {}..={}",
            value,
            range.start(),
            range.end()
        ),
        Err(_) => format!("'{}' is not a whole number", raw),
    };
    errors.push(FieldError { field, message });
    None
}

fn parse_bmi(raw: &str, errors: &mut Vec<FieldError>) -> Option<f64> {
    let message = match raw.trim().parse::<f64>() {
        Ok(value) if BMI_RANGE.contains(&value) => return Some(value),
        Ok(value) => format!(
            "{} is outside the allowed range {:.1}..={:.1}",
            value,
            BMI_RANGE.start(),
            BMI_RANGE.end()
        ),
        Err(_) => format!("'{}' is not a number", raw),
    };
    errors.push(FieldError {
        field: "bmi",
        message,
    });
    None
}
