#![deny(warnings)]

use anyhow::Context;
use clap::Parser;
use neurobridge_core::analytics;
use neurobridge_core::config::{
    resolve_endpoint, resolve_optional_string, resolve_u64, AppConfig, Env, FusionWindow,
    HistoryCapacity, SessionId, StdEnv, DEFAULT_WINDOW_MS, ENV_HISTORY_CAPACITY, ENV_SESSION_ID,
    ENV_SUMMARY_URL, ENV_WINDOW_MS,
};
use neurobridge_core::enhancer::JitterEnhancer;
use neurobridge_core::fusion::DEFAULT_HISTORY_CAPACITY;
use neurobridge_core::replay::{parse_events, Replayer};
use neurobridge_core::summary::{HttpSummaryStore, SummaryStore};
use serde::Serialize;
use std::io::Read;
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

#[derive(Parser, Debug)]
#[command(name = "neurobridge")]
#[command(about = "Replay recorded emotion signals and chat turns through the fusion engine")]
struct Args {
    /// JSON-lines event file, or `-` for stdin.
    #[arg(long, default_value = "-")]
    input: PathBuf,

    #[arg(long)]
    session_id: Option<String>,

    #[arg(long)]
    window_ms: Option<u64>,

    #[arg(long)]
    history_capacity: Option<u64>,

    #[arg(long)]
    summary_url: Option<String>,

    /// Post the session's emotion summary to the summary endpoint when done.
    #[arg(long, default_value_t = false)]
    submit: bool,

    #[arg(long, default_value_t = false)]
    jitter: bool,

    #[arg(long, default_value = "info")]
    log_level: String,
}

#[derive(Serialize)]
struct Report<'a> {
    #[serde(rename = "type")]
    kind: &'static str,
    session_id: &'a SessionId,
    analysis: analytics::ConversationAnalysis,
    insights: Vec<String>,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args = Args::parse();
    init_tracing(&args.log_level)?;

    let env = StdEnv;
    let input = read_input(&args.input)?;
    let submit = args.submit;
    let jitter = args.jitter;
    let cfg = build_config(args, &env)?;

    tracing::info!(
        session_id = %cfg.session_id,
        window_ms = cfg.window.window_ms,
        history_capacity = cfg.history_capacity.get(),
        "config loaded"
    );

    run_replay(cfg, &input, submit, jitter).await
}

async fn run_replay(cfg: AppConfig, input: &str, submit: bool, jitter: bool) -> anyhow::Result<()> {
    let events = parse_events(input).context("failed to parse replay input")?;
    tracing::info!(events = events.len(), "replaying");

    let mut replayer = Replayer::new(cfg.session_id.clone(), cfg.fusion(), chrono::Utc::now());
    if jitter {
        replayer = replayer.with_enhancer(JitterEnhancer::new());
    }

    for event in events {
        for output in replayer.apply(event).await {
            println!("{}", serde_json::to_string(&output)?);
        }
    }

    let session = replayer.into_session();
    let analysis = session.analyze();
    let report = Report {
        kind: "analysis",
        session_id: session.id(),
        insights: analytics::insights(&analysis),
        analysis,
    };
    println!("{}", serde_json::to_string(&report)?);

    if submit {
        let endpoint = cfg
            .summary_endpoint
            .clone()
            .context("--submit needs --summary-url or NEUROBRIDGE_SUMMARY_URL")?;
        let store = HttpSummaryStore::new(endpoint);
        store
            .upsert(session.summary())
            .await
            .context("failed to submit emotion summary")?;
    }

    Ok(())
}

fn read_input(path: &PathBuf) -> anyhow::Result<String> {
    if path.as_os_str() == "-" {
        let mut buf = String::new();
        std::io::stdin()
            .read_to_string(&mut buf)
            .context("failed to read stdin")?;
        return Ok(buf);
    }
    std::fs::read_to_string(path).with_context(|| format!("failed to read {}", path.display()))
}

fn init_tracing(level: &str) -> anyhow::Result<()> {
    let filter = EnvFilter::builder()
        .with_default_directive(
            level
                .parse()
                .with_context(|| format!("invalid --log-level: {level}"))?,
        )
        .from_env_lossy();

    // stdout carries the replay output
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
    Ok(())
}

fn build_config(args: Args, env: &impl Env) -> anyhow::Result<AppConfig> {
    let session_id = match resolve_optional_string(args.session_id, ENV_SESSION_ID, env) {
        Some(id) => SessionId::new(id)?,
        None => SessionId::new(uuid::Uuid::new_v4().to_string())?,
    };

    let window = FusionWindow::new(resolve_u64(args.window_ms, ENV_WINDOW_MS, env, DEFAULT_WINDOW_MS)?)?;

    let capacity = resolve_u64(
        args.history_capacity,
        ENV_HISTORY_CAPACITY,
        env,
        DEFAULT_HISTORY_CAPACITY as u64,
    )?;
    let history_capacity = HistoryCapacity::new(
        usize::try_from(capacity).context("history capacity does not fit in memory")?,
    )?;

    let summary_endpoint = resolve_endpoint(args.summary_url, ENV_SUMMARY_URL, env)?;

    Ok(AppConfig {
        session_id,
        window,
        history_capacity,
        summary_endpoint,
    })
}
