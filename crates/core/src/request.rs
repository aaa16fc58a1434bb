use crate::{encoder::EncodedMedia, schema::SchemaContract};

pub static SYSTEM_INSTRUCTION: &str = r#"
  You are a Misinformation and Harmfulness Analysis engine.
  Your task is to analyze user-provided text and video context to detect misinformation and calculate a harmfulness score (0-100).

  Hate speech, Violence, Medical Misinformation, and Political Manipulation are the key metrics for harmfulness.

  Risk Level Mapping:
  0-30: LOW
  31-70: MEDIUM
  71-100: HIGH

  Respond ONLY in the specified JSON format.
"#;

/// Everything one model invocation carries.
#[derive(Debug, Clone)]
pub struct ModelPayload {
    pub system_instruction: &'static str,
    pub prompt: String,
    pub media: Option<EncodedMedia>,
    pub schema: &'static SchemaContract,
}

impl ModelPayload {
    pub fn has_media(&self) -> bool {
        self.media.is_some()
    }
}

fn user_prompt(raw_text: &str, has_media: bool) -> String {
    let text = if raw_text.is_empty() {
        "None provided"
    } else {
        raw_text
    };
    let media_note = if has_media {
        "A video file was also provided."
    } else {
        "No video provided."
    };

    format!(
        "Analyze the following input:\nText: {text}\n{media_note}\n\nIf video is provided, simulate a speech-to-text transcript if needed or analyze its themes."
    )
}

/// Assemble the payload. Text is embedded verbatim and never validated.
pub fn build_request(raw_text: &str, media: Option<EncodedMedia>) -> ModelPayload {
    ModelPayload {
        system_instruction: SYSTEM_INSTRUCTION,
        prompt: user_prompt(raw_text, media.is_some()),
        media,
        schema: SchemaContract::get(),
    }
}
