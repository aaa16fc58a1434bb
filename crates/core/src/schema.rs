use std::sync::LazyLock;

use serde_json::{Value, json};

pub const REQUIRED_FIELDS: [&str; 7] = [
    "combined_text",
    "misinformation_label",
    "harmfulness_score",
    "risk_level",
    "input_sources",
    "breakdown",
    "explanation",
];

pub const BREAKDOWN_FIELDS: [&str; 4] = ["hate_speech", "violence", "medical", "political"];

static CONTRACT: LazyLock<SchemaContract> = LazyLock::new(|| SchemaContract {
    document: json!({
        "type": "OBJECT",
        "properties": {
            "combined_text": { "type": "STRING", "description": "Aggregated transcript and input text" },
            "misinformation_label": { "type": "STRING", "description": "REAL or MISINFORMATION" },
            "harmfulness_score": { "type": "NUMBER", "description": "0-100 score" },
            "risk_level": { "type": "STRING", "description": "LOW, MEDIUM, or HIGH" },
            "input_sources": { "type": "ARRAY", "items": { "type": "STRING" } },
            "breakdown": {
                "type": "OBJECT",
                "properties": {
                    "hate_speech": { "type": "NUMBER" },
                    "violence": { "type": "NUMBER" },
                    "medical": { "type": "NUMBER" },
                    "political": { "type": "NUMBER" }
                },
                "required": BREAKDOWN_FIELDS
            },
            "explanation": { "type": "STRING" }
        },
        "required": REQUIRED_FIELDS
    }),
});

/// The response shape every analysis request asks the model for.
#[derive(Debug)]
pub struct SchemaContract {
    document: Value,
}

impl SchemaContract {
    pub fn get() -> &'static SchemaContract {
        &CONTRACT
    }

    pub fn as_value(&self) -> &Value {
        &self.document
    }

    pub fn required_fields(&self) -> &'static [&'static str] {
        &REQUIRED_FIELDS
    }

    pub fn breakdown_fields(&self) -> &'static [&'static str] {
        &BREAKDOWN_FIELDS
    }
}
