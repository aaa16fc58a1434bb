//! Infovar Core Library
//!
//! Misinformation and harmfulness analysis of text and video: encode media,
//! build a schema-constrained model request, invoke the hosted model and
//! decode the typed report, one run at a time.

pub mod config;
pub mod decoder;
pub mod encoder;
pub mod error;
pub mod format;
pub mod gateway;
pub mod orchestrator;
pub mod request;
pub mod run;
pub mod schema;
pub mod types;

// Re-export commonly used items at crate root
pub use config::GatewayConfig;
pub use decoder::{Decoder, decode};
pub use encoder::{EncodedMedia, MediaBlob, VIDEO_MIME_TYPE, encode_media};
pub use error::{
    ConfigError, DecodeError, EncodeError, ErrorKind, GatewayError, PipelineError, Result,
    SubmitError,
};
pub use format::{format_log_entry, format_report_readable, format_score_bar};
pub use gateway::{GeminiGateway, ModelGateway};
pub use orchestrator::{Orchestrator, RunOutcome};
pub use request::{ModelPayload, build_request};
pub use run::{LogEntry, Phase, PipelineRun, Severity, Stage, StageFailure};
pub use schema::SchemaContract;
pub use types::{AnalysisRequest, AnalysisResult, Breakdown, MisinformationLabel, RiskLevel};
