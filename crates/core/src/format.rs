use crate::{run::LogEntry, types::AnalysisResult};

const BAR_CELLS: usize = 20;

/// Render a 0-100 score as a fixed-width bar, clamping out-of-range values.
pub fn format_score_bar(score: f64) -> String {
    let clamped = if score.is_finite() {
        score.clamp(0.0, 100.0)
    } else {
        0.0
    };
    let filled = ((clamped / 100.0) * BAR_CELLS as f64).round() as usize;
    format!("{}{}", "█".repeat(filled), "░".repeat(BAR_CELLS - filled))
}

fn category_title(field: &str) -> &'static str {
    match field {
        "hate_speech" => "Hate Speech",
        "violence" => "Violence",
        "medical" => "Medical",
        "political" => "Political",
        _ => "Other",
    }
}

/// Format a log entry as `[HH:MM:SS] message`
pub fn format_log_entry(entry: &LogEntry) -> String {
    format!("[{}] {}", entry.clock(), entry.message)
}

/// Format an analysis result as human-readable markdown
pub fn format_report_readable(result: &AnalysisResult) -> String {
    let mut output = String::new();

    output.push_str("# Analysis Report\n\n");
    output.push_str(&format!(
        "**Verdict:** {} | **Harmfulness:** {:.0}/100 | **Risk:** {} RISK\n\n",
        result.misinformation_label, result.harmfulness_score, result.risk_level
    ));

    output.push_str("## Harm breakdown\n\n");
    for (field, value) in result.breakdown.categories() {
        output.push_str(&format!(
            "{:<12} {} {:>3.0}\n",
            category_title(field),
            format_score_bar(value),
            value
        ));
    }
    output.push('\n');

    if !result.input_sources.is_empty() {
        output.push_str("## Input sources\n\n");
        for source in &result.input_sources {
            output.push_str(&format!("• {}\n", source));
        }
        output.push('\n');
    }

    output.push_str("## Combined text\n\n");
    output.push_str(&format!("\"{}\"\n\n", result.combined_text));

    output.push_str("## Explanation\n\n");
    output.push_str(&result.explanation);
    output.push('\n');

    output
}
