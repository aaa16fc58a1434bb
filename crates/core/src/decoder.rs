use crate::{error::DecodeError, types::AnalysisResult};

/// Structural validator for model output.
///
/// The default decoder checks shape and literals only. `strict()` also rejects
/// scores outside [0, 100]. Neither re-derives the risk level from the score.
#[derive(Debug, Clone, Copy, Default)]
pub struct Decoder {
    strict_ranges: bool,
}

impl Decoder {
    pub fn strict() -> Self {
        Self {
            strict_ranges: true,
        }
    }

    pub fn is_strict(&self) -> bool {
        self.strict_ranges
    }

    pub fn decode(&self, raw: &str) -> Result<AnalysisResult, DecodeError> {
        let result: AnalysisResult = serde_json::from_str(raw)?;

        if self.strict_ranges {
            check_range("harmfulness_score", result.harmfulness_score)?;
            for (field, value) in result.breakdown.categories() {
                check_range(field, value)?;
            }
        }

        Ok(result)
    }
}

fn check_range(field: &'static str, value: f64) -> Result<(), DecodeError> {
    if (0.0..=100.0).contains(&value) {
        Ok(())
    } else {
        Err(DecodeError::OutOfRange { field, value })
    }
}

pub fn decode(raw: &str) -> Result<AnalysisResult, DecodeError> {
    Decoder::default().decode(raw)
}
