use std::fmt;

use serde::{Deserialize, Serialize};

use crate::encoder::MediaBlob;

/// One submission: free text and an optional video.
#[derive(Debug, Clone, Default)]
pub struct AnalysisRequest {
    pub raw_text: String,
    pub media: Option<MediaBlob>,
}

impl AnalysisRequest {
    pub fn new(raw_text: impl Into<String>, media: Option<MediaBlob>) -> Self {
        Self {
            raw_text: raw_text.into(),
            media,
        }
    }

    pub fn text(raw_text: impl Into<String>) -> Self {
        Self::new(raw_text, None)
    }

    pub fn with_media(mut self, media: MediaBlob) -> Self {
        self.media = Some(media);
        self
    }

    /// True when neither text nor media carries anything to analyze.
    pub fn is_empty(&self) -> bool {
        self.raw_text.is_empty() && self.media.as_ref().is_none_or(MediaBlob::is_empty)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum MisinformationLabel {
    Real,
    Misinformation,
}

impl fmt::Display for MisinformationLabel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MisinformationLabel::Real => f.write_str("REAL"),
            MisinformationLabel::Misinformation => f.write_str("MISINFORMATION"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum RiskLevel {
    Low,
    Medium,
    High,
}

impl RiskLevel {
    /// Bucket a harmfulness score: 0-30 LOW, 31-70 MEDIUM, 71-100 HIGH.
    pub fn from_score(score: f64) -> Self {
        if score > 70.0 {
            RiskLevel::High
        } else if score > 30.0 {
            RiskLevel::Medium
        } else {
            RiskLevel::Low
        }
    }
}

impl fmt::Display for RiskLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RiskLevel::Low => f.write_str("LOW"),
            RiskLevel::Medium => f.write_str("MEDIUM"),
            RiskLevel::High => f.write_str("HIGH"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Breakdown {
    pub hate_speech: f64,
    pub violence: f64,
    pub medical: f64,
    pub political: f64,
}

impl Breakdown {
    pub fn categories(&self) -> [(&'static str, f64); 4] {
        [
            ("hate_speech", self.hate_speech),
            ("violence", self.violence),
            ("medical", self.medical),
            ("political", self.political),
        ]
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnalysisResult {
    pub combined_text: String,
    pub misinformation_label: MisinformationLabel,
    pub harmfulness_score: f64,
    pub risk_level: RiskLevel,
    pub input_sources: Vec<String>,
    pub breakdown: Breakdown,
    pub explanation: String,
}

impl AnalysisResult {
    /// Whether the reported risk level matches the bucket of the reported score.
    pub fn risk_is_consistent(&self) -> bool {
        RiskLevel::from_score(self.harmfulness_score) == self.risk_level
    }
}
