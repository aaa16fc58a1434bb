use std::sync::atomic::{AtomicBool, Ordering};

use tokio::sync::watch;
use uuid::Uuid;

use crate::{
    decoder::Decoder,
    encoder::encode_media,
    error::{PipelineError, SubmitError},
    gateway::ModelGateway,
    request::build_request,
    run::{LogEntry, PipelineRun, Severity, Stage, StageFailure},
    types::{AnalysisRequest, AnalysisResult},
};

pub const MSG_INITIALIZING: &str = "Initializing pipeline.";
pub const MSG_ENCODING: &str = "Encoding video input.";
pub const MSG_BUILDING: &str = "Building analysis request.";
pub const MSG_INVOKING: &str = "Invoking analysis model.";
pub const MSG_DECODING: &str = "Decoding analysis response.";
pub const MSG_SUCCEEDED: &str = "Analysis completed successfully.";
pub const MSG_FAILED: &str = "Critical error during analysis.";

#[derive(Debug, Clone, PartialEq)]
pub enum RunOutcome {
    Succeeded(AnalysisResult),
    Failed(StageFailure),
}

impl RunOutcome {
    pub fn result(&self) -> Option<&AnalysisResult> {
        match self {
            RunOutcome::Succeeded(result) => Some(result),
            RunOutcome::Failed(_) => None,
        }
    }
}

struct StageError {
    stage: Stage,
    error: PipelineError,
}

impl StageError {
    fn at(stage: Stage) -> impl FnOnce(PipelineError) -> Self {
        move |error| Self { stage, error }
    }
}

/// Releases the single-flight flag however the run ends.
struct BusyGuard<'a>(&'a AtomicBool);

impl<'a> BusyGuard<'a> {
    fn acquire(flag: &'a AtomicBool) -> Option<Self> {
        flag.compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .ok()
            .map(|_| Self(flag))
    }

    fn release(self) {
        self.0.store(false, Ordering::Release);
        std::mem::forget(self);
    }
}

impl Drop for BusyGuard<'_> {
    fn drop(&mut self) {
        self.0.store(false, Ordering::Release);
    }
}

/// Drives encode → build → invoke → decode, one run at a time.
pub struct Orchestrator<G> {
    gateway: G,
    decoder: Decoder,
    busy: AtomicBool,
    state: watch::Sender<PipelineRun>,
}

impl<G: ModelGateway> Orchestrator<G> {
    pub fn new(gateway: G) -> Self {
        let (state, _) = watch::channel(PipelineRun::idle());
        Self {
            gateway,
            decoder: Decoder::default(),
            busy: AtomicBool::new(false),
            state,
        }
    }

    pub fn with_decoder(mut self, decoder: Decoder) -> Self {
        self.decoder = decoder;
        self
    }

    pub fn gateway(&self) -> &G {
        &self.gateway
    }

    /// Receiver that always holds the latest published run state.
    pub fn subscribe(&self) -> watch::Receiver<PipelineRun> {
        self.state.subscribe()
    }

    pub fn snapshot(&self) -> PipelineRun {
        self.state.borrow().clone()
    }

    pub fn is_busy(&self) -> bool {
        self.busy.load(Ordering::Acquire)
    }

    /// Run the pipeline for one submission.
    ///
    /// Empty submissions and submissions made while another run is in flight
    /// are rejected without touching the published state. Stage failures are
    /// not errors here: they end the run as [`RunOutcome::Failed`].
    pub async fn submit(&self, request: AnalysisRequest) -> Result<RunOutcome, SubmitError> {
        if request.is_empty() {
            return Err(SubmitError::EmptySubmission);
        }
        let guard = BusyGuard::acquire(&self.busy).ok_or(SubmitError::Busy)?;

        let run_id = Uuid::new_v4();
        let mut run = PipelineRun::start(run_id);
        run.record(LogEntry::new(MSG_INITIALIZING, Severity::Info));
        self.state.send_replace(run);
        tracing::info!(target: "infovar::pipeline", %run_id, media = request.media.is_some(), "run started");

        let outcome = match self.execute(request).await {
            Ok(result) => {
                let mut entries = Vec::with_capacity(2);
                if !result.risk_is_consistent() {
                    tracing::warn!(
                        target: "infovar::pipeline",
                        %run_id,
                        score = result.harmfulness_score,
                        risk = %result.risk_level,
                        "risk level disagrees with score"
                    );
                    entries.push(LogEntry::new(
                        format!(
                            "Reported risk level {} does not match harmfulness score {}.",
                            result.risk_level, result.harmfulness_score
                        ),
                        Severity::Warning,
                    ));
                }
                entries.push(LogEntry::new(MSG_SUCCEEDED, Severity::Success));

                let published = result.clone();
                self.finish(guard, entries, |run| run.succeed(published));
                tracing::info!(target: "infovar::pipeline", %run_id, "run succeeded");
                RunOutcome::Succeeded(result)
            }
            Err(StageError { stage, error }) => {
                tracing::error!(target: "infovar::pipeline", %run_id, %stage, kind = %error.kind(), error = %error, "run failed");
                let failure = StageFailure::new(stage, &error);
                let published = failure.clone();
                self.finish(
                    guard,
                    vec![LogEntry::new(MSG_FAILED, Severity::Error)],
                    |run| run.fail(published),
                );
                RunOutcome::Failed(failure)
            }
        };

        Ok(outcome)
    }

    async fn execute(&self, request: AnalysisRequest) -> Result<AnalysisResult, StageError> {
        let AnalysisRequest { raw_text, media } = request;

        let encoded = match media {
            Some(blob) => {
                self.record(MSG_ENCODING, Severity::Info);
                let encoded = encode_media(&blob)
                    .await
                    .map_err(PipelineError::from)
                    .map_err(StageError::at(Stage::Encode))?;
                tracing::debug!(target: "infovar::pipeline", media = %blob.name(), encoded_len = encoded.payload.len(), "media encoded");
                Some(encoded)
            }
            None => None,
        };

        self.record(MSG_BUILDING, Severity::Info);
        let payload = build_request(&raw_text, encoded);

        self.record(MSG_INVOKING, Severity::Info);
        let raw = self
            .gateway
            .invoke(&payload)
            .await
            .map_err(PipelineError::from)
            .map_err(StageError::at(Stage::InvokeModel))?;
        drop(payload);

        self.record(MSG_DECODING, Severity::Info);
        self.decoder
            .decode(&raw)
            .map_err(PipelineError::from)
            .map_err(StageError::at(Stage::DecodeResult))
    }

    /// Publish the closing entries, the terminal phase and the freed busy flag
    /// as one update, so an observer that sees the end can resubmit at once.
    fn finish(
        &self,
        guard: BusyGuard<'_>,
        entries: Vec<LogEntry>,
        settle: impl FnOnce(&mut PipelineRun),
    ) {
        self.state.send_modify(move |run| {
            for entry in entries {
                run.record(entry);
            }
            settle(run);
            guard.release();
        });
    }

    fn record(&self, message: impl Into<String>, severity: Severity) {
        let entry = LogEntry::new(message, severity);
        self.state.send_modify(|run| {
            run.record(entry);
        });
    }
}
