//! Categorical feature encoding
//!
//! Maps the six raw form fields onto the numeric row the trained estimator
//! was fitted on. Gender and smoker codes are fixed; the region codes are
//! tied to the artifact and may be overridden through configuration.

use crate::error::{EncodingError, PredictError};
use crate::models::{FeatureVector, Gender, PredictionRequest, Region, Smoker};
use serde::{Deserialize, Serialize};

/// Region code assignment, one code per region
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct RegionCodes {
    pub southeast: u8,
    pub southwest: u8,
    pub northeast: u8,
    pub northwest: u8,
}

impl Default for RegionCodes {
    fn default() -> Self {
        Self {
            southeast: 0,
            southwest: 1,
            northeast: 2,
            northwest: 3,
        }
    }
}

impl RegionCodes {
    fn as_table(&self) -> [u8; 4] {
        // Indexed by Region::index()
        [self.southeast, self.southwest, self.northeast, self.northwest]
    }
}

/// Validated encoding table
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Encoding {
    region_codes: [u8; 4],
}

impl Default for Encoding {
    fn default() -> Self {
        Self {
            region_codes: RegionCodes::default().as_table(),
        }
    }
}

impl Encoding {
    /// Build an encoding from custom region codes
    ///
    /// The codes must be a bijection from the four regions onto 0..=3.
    pub fn new(codes: RegionCodes) -> Result<Self, EncodingError> {
        let table = codes.as_table();
        let mut owner: [Option<Region>; 4] = [None; 4];

        for region in Region::ALL {
            let code = table[region.index()];
            let slot = owner
                .get_mut(code as usize)
                .ok_or(EncodingError::RegionCodeOutOfRange {
                    region: region.label(),
                    code,
                })?;
            if let Some(first) = *slot {
                return Err(EncodingError::DuplicateRegionCode {
                    code,
                    first: first.label(),
                    second: region.label(),
                });
            }
            *slot = Some(region);
        }

        Ok(Self {
            region_codes: table,
        })
    }

    pub fn region_code(&self, region: Region) -> u8 {
        self.region_codes[region.index()]
    }

    pub fn region_codes(&self) -> RegionCodes {
        let [southeast, southwest, northeast, northwest] = self.region_codes;
        RegionCodes {
            southeast,
            southwest,
            northeast,
            northwest,
        }
    }

    /// Encode a raw request into the estimator's feature order
    pub fn encode(&self, request: &PredictionRequest) -> Result<FeatureVector, PredictError> {
        let gender: Gender = request.gender.parse()?;
        let smoker: Smoker = request.smoker.parse()?;
        let region: Region = request.region.parse()?;

        if !request.bmi.is_finite() {
            return Err(PredictError::NonFiniteFeature {
                feature: "bmi",
                value: request.bmi,
            });
        }

        Ok(FeatureVector::new(
            request.age,
            gender.code(),
            request.bmi,
            request.children,
            smoker.code(),
            self.region_code(region),
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    fn request(
        age: u32,
        gender: &str,
        bmi: f64,
        children: u32,
        smoker: &str,
        region: &str,
    ) -> PredictionRequest {
        PredictionRequest {
            age,
            gender: gender.to_string(),
            bmi,
            children,
            smoker: smoker.to_string(),
            region: region.to_string(),
        }
    }

    #[test]
    fn test_young_male_non_smoker_southeast() {
        let fv = Encoding::default()
            .encode(&request(25, "Male", 25.0, 0, "No", "Southeast"))
            .unwrap();
        assert_eq!(fv.to_array(), [25.0, 1.0, 25.0, 0.0, 0.0, 0.0]);
    }

    #[test]
    fn test_female_smoker_northwest() {
        let fv = Encoding::default()
            .encode(&request(40, "Female", 30.5, 2, "Yes", "Northwest"))
            .unwrap();
        assert_eq!(fv.to_array(), [40.0, 0.0, 30.5, 2.0, 1.0, 3.0]);
    }

    #[test]
    fn test_gender_code_is_one_only_for_male() {
        let encoding = Encoding::default();
        for gender in Gender::LABELS {
            let fv = encoding
                .encode(&request(30, gender, 22.0, 1, "No", "Northeast"))
                .unwrap();
            assert_eq!(fv.gender_code() == 1, *gender == "Male");
        }
    }

    #[test]
    fn test_smoker_code_is_one_only_for_yes() {
        let encoding = Encoding::default();
        for smoker in Smoker::LABELS {
            let fv = encoding
                .encode(&request(30, "Female", 22.0, 1, smoker, "Northeast"))
                .unwrap();
            assert_eq!(fv.smoker_code() == 1, *smoker == "Yes");
        }
    }

    #[test]
    fn test_default_region_mapping_is_bijection() {
        let encoding = Encoding::default();
        let expected = [
            ("Southeast", 0),
            ("Southwest", 1),
            ("Northeast", 2),
            ("Northwest", 3),
        ];
        let mut seen = HashSet::new();
        for (label, code) in expected {
            let fv = encoding
                .encode(&request(50, "Male", 28.0, 3, "No", label))
                .unwrap();
            assert_eq!(fv.region_code(), code, "region {}", label);
            assert!(seen.insert(fv.region_code()));
        }
        assert_eq!(seen.len(), 4);
    }

    #[test]
    fn test_unknown_region_is_rejected() {
        let err = Encoding::default()
            .encode(&request(25, "Male", 25.0, 0, "No", "Midwest"))
            .unwrap_err();
        assert!(matches!(
            err,
            PredictError::UnknownCategory { field: "region", .. }
        ));
    }

    #[test]
    fn test_unknown_gender_and_smoker_are_rejected() {
        let encoding = Encoding::default();
        assert!(matches!(
            encoding.encode(&request(25, "Other", 25.0, 0, "No", "Southeast")),
            Err(PredictError::UnknownCategory { field: "gender", .. })
        ));
        assert!(matches!(
            encoding.encode(&request(25, "Male", 25.0, 0, "Sometimes", "Southeast")),
            Err(PredictError::UnknownCategory { field: "smoker", .. })
        ));
    }

    #[test]
    fn test_non_finite_bmi_is_rejected() {
        let err = Encoding::default()
            .encode(&request(25, "Male", f64::NAN, 0, "No", "Southeast"))
            .unwrap_err();
        assert!(matches!(
            err,
            PredictError::NonFiniteFeature { feature: "bmi", .. }
        ));
    }

    #[test]
    fn test_custom_region_codes() {
        let encoding = Encoding::new(RegionCodes {
            southeast: 2,
            southwest: 3,
            northeast: 0,
            northwest: 1,
        })
        .unwrap();
        assert_eq!(encoding.region_code(Region::Southeast), 2);
        assert_eq!(encoding.region_code(Region::Northeast), 0);
        assert_eq!(encoding.region_codes().northwest, 1);
    }

    #[test]
    fn test_duplicate_region_code_rejected() {
        let err = Encoding::new(RegionCodes {
            southeast: 0,
            southwest: 0,
            northeast: 2,
            northwest: 3,
        })
        .unwrap_err();
        assert_eq!(
            err,
            EncodingError::DuplicateRegionCode {
                code: 0,
                first: "Southeast",
                second: "Southwest",
            }
        );
    }

    #[test]
    fn test_out_of_range_region_code_rejected() {
        let err = Encoding::new(RegionCodes {
            northwest: 7,
            ..RegionCodes::default()
        })
        .unwrap_err();
        assert_eq!(
            err,
            EncodingError::RegionCodeOutOfRange {
                region: "Northwest",
                code: 7,
            }
        );
    }

    #[test]
    fn test_default_codes_round_trip_through_new() {
        let encoding = Encoding::new(RegionCodes::default()).unwrap();
        assert_eq!(encoding, Encoding::default());
    }
}
