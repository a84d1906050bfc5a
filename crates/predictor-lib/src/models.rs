//! Core data models for the insurance cost predictor

use crate::error::PredictError;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Number of features the estimator expects per row
pub const FEATURE_COUNT: usize = 6;

/// Feature names in the order the estimator consumes them
pub const FEATURE_NAMES: [&str; FEATURE_COUNT] =
    ["age", "sex", "bmi", "children", "smoker", "region"];

/// Raw form input for one prediction, as submitted by a UI
///
/// Numeric ranges are enforced by the UI; categorical fields are checked
/// during encoding.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PredictionRequest {
    pub age: u32,
    pub gender: String,
    pub bmi: f64,
    pub children: u32,
    pub smoker: String,
    pub region: String,
}

/// Fixed-order numeric encoding of one prediction request
///
/// Built by [`crate::encoding::Encoding::encode`] and never mutated afterwards.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct FeatureVector {
    age: u32,
    gender_code: u8,
    bmi: f64,
    children: u32,
    smoker_code: u8,
    region_code: u8,
}

impl FeatureVector {
    pub(crate) fn new(
        age: u32,
        gender_code: u8,
        bmi: f64,
        children: u32,
        smoker_code: u8,
        region_code: u8,
    ) -> Self {
        Self {
            age,
            gender_code,
            bmi,
            children,
            smoker_code,
            region_code,
        }
    }

    pub fn age(&self) -> u32 {
        self.age
    }

    pub fn gender_code(&self) -> u8 {
        self.gender_code
    }

    pub fn bmi(&self) -> f64 {
        self.bmi
    }

    pub fn children(&self) -> u32 {
        self.children
    }

    pub fn smoker_code(&self) -> u8 {
        self.smoker_code
    }

    pub fn region_code(&self) -> u8 {
        self.region_code
    }

    /// Values in estimator order: age, gender, bmi, children, smoker, region
    pub fn to_array(&self) -> [f64; FEATURE_COUNT] {
        [
            f64::from(self.age),
            f64::from(self.gender_code),
            self.bmi,
            f64::from(self.children),
            f64::from(self.smoker_code),
            f64::from(self.region_code),
        ]
    }

    /// Single precision row for ONNX float inputs
    pub fn to_f32_array(&self) -> [f32; FEATURE_COUNT] {
        self.to_array().map(|v| v as f32)
    }
}

impl fmt::Display for FeatureVector {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "[{}, {}, {:?}, {}, {}, {}]",
            self.age, self.gender_code, self.bmi, self.children, self.smoker_code, self.region_code
        )
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Gender {
    Male,
    Female,
}

impl Gender {
    pub const ALL: [Gender; 2] = [Gender::Male, Gender::Female];
    pub const LABELS: &'static [&'static str] = &["Male", "Female"];

    pub fn label(&self) -> &'static str {
        match self {
            Gender::Male => "Male",
            Gender::Female => "Female",
        }
    }

    pub fn code(&self) -> u8 {
        match self {
            Gender::Male => 1,
            Gender::Female => 0,
        }
    }
}

impl FromStr for Gender {
    type Err = PredictError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Gender::ALL
            .into_iter()
            .find(|g| g.label() == s)
            .ok_or_else(|| PredictError::UnknownCategory {
                field: "gender",
                value: s.to_string(),
                expected: Gender::LABELS,
            })
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Smoker {
    Yes,
    No,
}

impl Smoker {
    pub const ALL: [Smoker; 2] = [Smoker::Yes, Smoker::No];
    pub const LABELS: &'static [&'static str] = &["Yes", "No"];

    pub fn label(&self) -> &'static str {
        match self {
            Smoker::Yes => "Yes",
            Smoker::No => "No",
        }
    }

    pub fn code(&self) -> u8 {
        match self {
            Smoker::Yes => 1,
            Smoker::No => 0,
        }
    }
}

impl FromStr for Smoker {
    type Err = PredictError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Smoker::ALL
            .into_iter()
            .find(|v| v.label() == s)
            .ok_or_else(|| PredictError::UnknownCategory {
                field: "smoker",
                value: s.to_string(),
                expected: Smoker::LABELS,
            })
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Region {
    Southeast,
    Southwest,
    Northeast,
    Northwest,
}

impl Region {
    pub const ALL: [Region; 4] = [
        Region::Southeast,
        Region::Southwest,
        Region::Northeast,
        Region::Northwest,
    ];
    pub const LABELS: &'static [&'static str] =
        &["Southeast", "Southwest", "Northeast", "Northwest"];

    pub fn label(&self) -> &'static str {
        match self {
            Region::Southeast => "Southeast",
            Region::Southwest => "Southwest",
            Region::Northeast => "Northeast",
            Region::Northwest => "Northwest",
        }
    }

    /// Position in [`Region::ALL`], used to index encoding tables
    pub(crate) fn index(&self) -> usize {
        match self {
            Region::Southeast => 0,
            Region::Southwest => 1,
            Region::Northeast => 2,
            Region::Northwest => 3,
        }
    }
}

impl FromStr for Region {
    type Err = PredictError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Region::ALL
            .into_iter()
            .find(|r| r.label() == s)
            .ok_or_else(|| PredictError::UnknownCategory {
                field: "region",
                value: s.to_string(),
                expected: Region::LABELS,
            })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_labels_parse_back() {
        for gender in Gender::ALL {
            assert_eq!(gender.label().parse::<Gender>().unwrap(), gender);
        }
        for smoker in Smoker::ALL {
            assert_eq!(smoker.label().parse::<Smoker>().unwrap(), smoker);
        }
        for region in Region::ALL {
            assert_eq!(region.label().parse::<Region>().unwrap(), region);
        }
    }

    #[test]
    fn test_parsing_is_exact_match() {
        assert!("male".parse::<Gender>().is_err());
        assert!(" Yes".parse::<Smoker>().is_err());
        assert!("SOUTHEAST".parse::<Region>().is_err());
        assert!("".parse::<Region>().is_err());
    }

    #[test]
    fn test_unknown_region_names_field() {
        match "Midwest".parse::<Region>() {
            Err(PredictError::UnknownCategory { field, value, .. }) => {
                assert_eq!(field, "region");
                assert_eq!(value, "Midwest");
            }
            other => panic!("expected UnknownCategory, got {:?}", other),
        }
    }

    #[test]
    fn test_region_index_matches_all_order() {
        for (i, region) in Region::ALL.iter().enumerate() {
            assert_eq!(region.index(), i);
        }
    }

    #[test]
    fn test_feature_vector_order() {
        let fv = FeatureVector::new(40, 0, 30.5, 2, 1, 3);
        assert_eq!(fv.to_array(), [40.0, 0.0, 30.5, 2.0, 1.0, 3.0]);
        assert_eq!(fv.to_f32_array().len(), FEATURE_COUNT);
        assert_eq!(fv.to_string(), "[40, 0, 30.5, 2, 1, 3]");
    }
}
