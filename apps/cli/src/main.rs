use std::{
    path::PathBuf,
    time::{Duration, Instant},
};

use anyhow::{Context, Result};
use clap::Parser;
use console::style;
use indicatif::{ProgressBar, ProgressStyle};
use infovar_core::{
    AnalysisRequest, AnalysisResult, Decoder, GatewayConfig, GeminiGateway, LogEntry, MediaBlob,
    Orchestrator, PipelineRun, RiskLevel, RunOutcome, Severity, SubmitError, format_log_entry,
    format_report_readable,
};
use tokio::{fs, io::AsyncReadExt, sync::watch};
use tracing_subscriber::EnvFilter;

fn format_duration(d: Duration) -> String {
    let secs = d.as_secs_f64();
    if secs < 60.0 {
        format!("{:.1}s", secs)
    } else {
        format!("{:.0}m {:.0}s", (secs / 60.0).floor(), secs % 60.0)
    }
}

#[derive(Parser)]
#[command(name = "infovar")]
#[command(about = "Analyze text and video for misinformation and harmfulness with a hosted AI model")]
struct Cli {
    /// Text to analyze ("-" reads standard input)
    #[arg(value_name = "TEXT")]
    text: Option<String>,

    /// Text to analyze, given as an option instead of positionally
    #[arg(long = "text", value_name = "TEXT", conflicts_with = "text")]
    text_option: Option<String>,

    /// Read the text to analyze from a file
    #[arg(long, conflicts_with_all = ["text", "text_option"])]
    text_file: Option<PathBuf>,

    /// Video file to include in the analysis
    #[arg(long)]
    video: Option<PathBuf>,

    /// Model name (overrides INFOVAR_MODEL)
    #[arg(short, long)]
    model: Option<String>,

    /// API base URL (overrides INFOVAR_BASE_URL)
    #[arg(long)]
    base_url: Option<String>,

    /// Reject scores outside 0-100 instead of trusting the model
    #[arg(long)]
    strict: bool,

    /// Print the result as JSON instead of a readable report
    #[arg(long)]
    json: bool,

    /// Show pipeline diagnostics on stderr
    #[arg(short, long)]
    verbose: bool,
}

fn init_tracing(verbose: bool) {
    let default = if verbose { "infovar=debug" } else { "warn" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

fn create_spinner(msg: &str) -> Result<ProgressBar> {
    let pb = ProgressBar::new_spinner();
    pb.set_style(
        ProgressStyle::default_spinner()
            .tick_chars("⠁⠂⠄⡀⢀⠠⠐⠈ ")
            .template("{spinner:.cyan} {msg}")?,
    );
    pb.set_message(msg.to_string());
    pb.enable_steady_tick(Duration::from_millis(80));
    Ok(pb)
}

async fn read_text(cli: &Cli) -> Result<String> {
    let raw = if let Some(path) = &cli.text_file {
        fs::read_to_string(path)
            .await
            .with_context(|| format!("failed to read {}", path.display()))?
    } else {
        match cli.text_option.as_deref().or(cli.text.as_deref()) {
            Some("-") => {
                let mut buf = String::new();
                tokio::io::stdin().read_to_string(&mut buf).await?;
                buf
            }
            Some(text) => return Ok(text.to_string()),
            None => return Ok(String::new()),
        }
    };

    Ok(raw.trim_end_matches(['\n', '\r']).to_string())
}

fn styled_entry(entry: &LogEntry) -> String {
    let line = format_log_entry(entry);
    match entry.severity {
        Severity::Info => style(line).cyan().to_string(),
        Severity::Success => style(line).green().to_string(),
        Severity::Warning => style(line).yellow().to_string(),
        Severity::Error => style(line).red().to_string(),
    }
}

fn print_new_entries(run: &PipelineRun, printed: usize, spinner: &ProgressBar) -> usize {
    for entry in run.log.iter().skip(printed) {
        spinner.println(styled_entry(entry));
        spinner.set_message(entry.message.clone());
    }
    run.log.len()
}

async fn follow_log(mut updates: watch::Receiver<PipelineRun>, spinner: ProgressBar) {
    let mut printed = 0;
    loop {
        printed = print_new_entries(&updates.borrow_and_update(), printed, &spinner);
        if updates.changed().await.is_err() {
            print_new_entries(&updates.borrow(), printed, &spinner);
            break;
        }
    }
}

fn styled_risk(level: RiskLevel) -> String {
    let label = format!("{} RISK", level);
    match level {
        RiskLevel::Low => style(label).green().bold().to_string(),
        RiskLevel::Medium => style(label).yellow().bold().to_string(),
        RiskLevel::High => style(label).red().bold().to_string(),
    }
}

fn styled_score(score: f64) -> String {
    let text = style(format!("{:.0}/100", score)).bold();
    match RiskLevel::from_score(score) {
        RiskLevel::Low => text.green().to_string(),
        RiskLevel::Medium => text.yellow().to_string(),
        RiskLevel::High => text.red().to_string(),
    }
}

fn print_report(result: &AnalysisResult, elapsed: Duration) {
    println!(
        "\n{} {}   {} {}\n",
        style("Verdict:").dim(),
        style(result.misinformation_label).bold(),
        styled_score(result.harmfulness_score),
        styled_risk(result.risk_level)
    );
    println!(
        "{} {}",
        style("Total time:").dim(),
        style(format_duration(elapsed)).cyan().bold()
    );
    println!("{}", style("─".repeat(60)).dim());

    // Human-readable output
    println!("{}", format_report_readable(result));
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    let raw_text = read_text(&cli).await?;
    let request = AnalysisRequest::new(raw_text, cli.video.clone().map(MediaBlob::file));
    if request.is_empty() {
        eprintln!(
            "{} {}",
            style("Error:").red().bold(),
            SubmitError::EmptySubmission
        );
        std::process::exit(1);
    }

    let mut config = GatewayConfig::from_env()?;
    if let Some(model) = cli.model.clone() {
        config = config.with_model(model);
    }
    if let Some(base_url) = cli.base_url.clone() {
        config = config.with_base_url(base_url);
    }

    // Validate API key early
    if let Err(e) = config.api_key() {
        eprintln!("{} {}", style("Error:").red().bold(), e);
        std::process::exit(1);
    }

    let decoder = if cli.strict {
        Decoder::strict()
    } else {
        Decoder::default()
    };
    let orchestrator = Orchestrator::new(GeminiGateway::new(config)?).with_decoder(decoder);
    tracing::debug!(
        config = ?orchestrator.gateway().config(),
        endpoint = %orchestrator.gateway().endpoint(),
        strict = decoder.is_strict(),
        "gateway configured"
    );

    if !cli.json {
        println!(
            "\n{}  {}\n",
            style("infovar").cyan().bold(),
            style("Information Verification & Risk Analysis").dim()
        );
    }

    let spinner = create_spinner("Analyzing...")?;
    let log_task = tokio::spawn(follow_log(orchestrator.subscribe(), spinner.clone()));

    let total_start = Instant::now();
    let outcome = orchestrator.submit(request).await?;
    drop(orchestrator);
    log_task.await?;
    spinner.finish_and_clear();

    match outcome {
        RunOutcome::Succeeded(result) => {
            if cli.json {
                println!("{}", serde_json::to_string_pretty(&result)?);
            } else {
                print_report(&result, total_start.elapsed());
            }
        }
        RunOutcome::Failed(failure) => {
            eprintln!(
                "{} {} failed ({} error): {}",
                style("Error:").red().bold(),
                failure.stage,
                failure.kind,
                failure.message
            );
            std::process::exit(1);
        }
    }

    Ok(())
}
