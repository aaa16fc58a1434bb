#![allow(dead_code)]

use std::{
    collections::VecDeque,
    sync::{Arc, Mutex},
};

use async_trait::async_trait;
use infovar_core::{GatewayError, ModelGateway, ModelPayload};
use serde_json::{Value, json};
use tokio::sync::Notify;

/// In-process gateway that replays canned replies and records every payload.
pub struct ScriptedGateway {
    replies: Mutex<VecDeque<Result<String, GatewayError>>>,
    calls: Mutex<Vec<ModelPayload>>,
    gate: Option<Arc<Notify>>,
}

impl ScriptedGateway {
    pub fn new(replies: Vec<Result<String, GatewayError>>) -> Self {
        Self {
            replies: Mutex::new(replies.into()),
            calls: Mutex::new(Vec::new()),
            gate: None,
        }
    }

    pub fn replying(body: &Value) -> Self {
        Self::new(vec![Ok(body.to_string())])
    }

    /// Hold every invocation until the returned handle is notified.
    pub fn gated(mut self) -> (Self, Arc<Notify>) {
        let gate = Arc::new(Notify::new());
        self.gate = Some(Arc::clone(&gate));
        (self, gate)
    }

    pub fn calls(&self) -> Vec<ModelPayload> {
        self.calls.lock().expect("calls poisoned").clone()
    }

    pub fn call_count(&self) -> usize {
        self.calls.lock().expect("calls poisoned").len()
    }
}

#[async_trait]
impl ModelGateway for ScriptedGateway {
    async fn invoke(&self, payload: &ModelPayload) -> Result<String, GatewayError> {
        self.calls
            .lock()
            .expect("calls poisoned")
            .push(payload.clone());

        if let Some(gate) = &self.gate {
            gate.notified().await;
        }

        self.replies
            .lock()
            .expect("replies poisoned")
            .pop_front()
            .unwrap_or_else(|| {
                Err(GatewayError::Model {
                    status: None,
                    message: "script exhausted".into(),
                })
            })
    }
}

pub fn misinformation_report() -> Value {
    json!({
        "combined_text": "Vaccines cause infertility",
        "misinformation_label": "MISINFORMATION",
        "harmfulness_score": 85,
        "risk_level": "HIGH",
        "input_sources": ["text"],
        "breakdown": { "hate_speech": 0, "violence": 0, "medical": 92, "political": 15 },
        "explanation": "The claim contradicts large-scale clinical studies."
    })
}

pub fn benign_report() -> Value {
    json!({
        "combined_text": "A cooking tutorial",
        "misinformation_label": "REAL",
        "harmfulness_score": 3,
        "risk_level": "LOW",
        "input_sources": ["video"],
        "breakdown": { "hate_speech": 0, "violence": 0, "medical": 0, "political": 0 },
        "explanation": "Harmless instructional content."
    })
}
