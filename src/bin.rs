//! Binary entry point for `lunch-bot`.
//!
//! Parses the command line, sets up tracing, loads the configuration and hands
//! over to [`lunch_bot::start`], which connects to Slack and serves mentions
//! until shutdown.

use clap::Parser;
use lunch_bot::base::{config::Config, types::Void};
use opentelemetry::trace::TracerProvider;
use opentelemetry_otlp::{Protocol, WithExportConfig};
use tracing_subscriber::{filter::LevelFilter, fmt::format::FmtSpan, layer::SubscriberExt, util::SubscriberInitExt};

/// Lunch-bot: acknowledges Slack app mentions and replies with the lunch menu.
///
/// Tokens and the menu reply come from `LUNCH_BOT_*` environment variables or a
/// TOML config file.
#[derive(Parser, Debug)]
#[command(version, author, about, long_about = None)]
struct Args {
    /// Config file to load instead of `.hidden/config.toml`.
    #[arg(short, long)]
    config: Option<std::path::PathBuf>,
    /// Increase log verbosity (-v for DEBUG, -vv for TRACE).
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,
    /// Export spans to an OTLP collector over HTTP.
    ///
    /// The endpoint is taken from the standard `OTEL_EXPORTER_OTLP_*` variables.
    #[arg(long)]
    otlp: bool,
}

/// Install the stdout layer and, when requested, the OTLP layer.
fn init_tracing(args: &Args) -> Void {
    let level = match args.verbose {
        0 => LevelFilter::INFO,
        1 => LevelFilter::DEBUG,
        _ => LevelFilter::TRACE,
    };

    // Mention handling is short-lived, so only span closes (with timings) are worth printing.
    let stdout = tracing_subscriber::fmt::layer()
        .without_time()
        .with_target(false)
        .with_span_events(FmtSpan::CLOSE);

    let otel = if args.otlp {
        let exporter = opentelemetry_otlp::SpanExporter::builder().with_http().with_protocol(Protocol::HttpBinary).build()?;
        let tracer = opentelemetry_sdk::trace::SdkTracerProvider::builder().with_batch_exporter(exporter).build().tracer("lunch-bot");

        Some(tracing_opentelemetry::layer().with_tracer(tracer))
    } else {
        None
    };

    tracing_subscriber::registry().with(otel).with(level).with(stdout).init();

    Ok(())
}

#[tokio::main]
async fn main() -> Void {
    let args = Args::parse();

    init_tracing(&args)?;

    let config = Config::load(args.config.as_deref())?;

    lunch_bot::start(config).await
}
