//! CLI entry point: live bus times for one or more stops on stdout.

use anyhow::{Result, bail};
use clap::{Parser, ValueEnum};
use std::path::Path;
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, info};
use tracing_subscriber::{
    EnvFilter, Layer,
    filter::LevelFilter,
    fmt::{self, format::FmtSpan},
    layer::SubscriberExt,
    util::SubscriberInitExt,
};
use whensthebus::{
    aggregate::query_stops,
    config::ApiConfig,
    infra::transportapi::TransportApiClient,
    models::StopCode,
    output::{render_json, render_text},
};

#[derive(Parser)]
#[command(name = "wtb")]
#[command(about = "Get live UK bus times in your terminal", long_about = None)]
struct Cli {
    /// The ATCO codes to look up (eg. 490004733D)
    #[arg(short, long = "atco", value_name = "CODE", required = true)]
    atcos: Vec<StopCode>,

    /// Maximum number of seconds to wait for each result
    #[arg(short, long, default_value = "5.0", value_parser = parse_timeout)]
    timeout: Duration,

    /// Output format
    #[arg(short, long, value_enum, default_value_t = Format::Text)]
    format: Format,
}

#[derive(Clone, Copy, ValueEnum)]
enum Format {
    Text,
    Json,
}

fn parse_timeout(s: &str) -> Result<Duration, String> {
    let secs: f64 = s.parse().map_err(|e| format!("{e}"))?;
    Duration::try_from_secs_f64(secs).map_err(|_| format!("{s} is not a usable number of seconds"))
}

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok(); // Load .env file

    let _file_guard = init_logging()?;

    let cli = Cli::parse();

    let config = ApiConfig::from_env()?;
    info!(base_url = %config.base_url, "Configuration loaded");

    let client = Arc::new(TransportApiClient::new(&config)?);
    let result = query_stops(client, &cli.atcos, cli.timeout).await?;

    if result.is_empty() {
        bail!("No departures retrieved for any requested stop");
    }
    debug!(
        answered = result.schedules.len(),
        missing = result.missing.len(),
        "Printing results"
    );

    match cli.format {
        Format::Text => print!("{}", render_text(&result, &cli.atcos)),
        Format::Json => println!("{}", render_json(&result, &cli.atcos)?),
    }

    Ok(())
}

/// Colored stderr logging, plus a JSON rolling log file when `WTB_LOG_FILE`
/// is set. The returned guard must be held until exit to flush the file.
fn init_logging() -> Result<Option<tracing_appender::non_blocking::WorkerGuard>> {
    let stderr_layer = fmt::layer()
        .with_target(true)
        .with_span_events(FmtSpan::CLOSE)
        .with_ansi(true)
        .with_writer(std::io::stderr)
        .with_filter(
            EnvFilter::builder()
                .with_default_directive(LevelFilter::WARN.into())
                .with_env_var("RUST_LOG")
                .from_env_lossy(),
        );

    let (json_layer, guard) = match std::env::var("WTB_LOG_FILE") {
        Ok(log_file_path) if !log_file_path.is_empty() => {
            let path = Path::new(&log_file_path);
            let log_dir = path.parent().unwrap_or(Path::new("."));
            let Some(log_file_name) = path.file_name() else {
                bail!("WTB_LOG_FILE must name a file, got {log_file_path}");
            };

            let file_appender = tracing_appender::rolling::daily(log_dir, log_file_name);
            let (non_blocking_file, guard) = tracing_appender::non_blocking(file_appender);

            let layer = fmt::layer()
                .json()
                .with_current_span(true)
                .with_span_list(true)
                .with_writer(non_blocking_file)
                .with_filter(
                    EnvFilter::builder()
                        .with_default_directive(LevelFilter::DEBUG.into())
                        .with_env_var("RUST_LOG_JSON")
                        .from_env_lossy(),
                );
            (Some(layer), Some(guard))
        }
        _ => (None, None),
    };

    tracing_subscriber::registry()
        .with(stderr_layer)
        .with(json_layer)
        .init();

    Ok(guard)
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_definition_is_valid() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_repeated_atco_and_default_timeout() {
        let cli = Cli::try_parse_from(["wtb", "-a", "490004733D", "--atco", "490000077E"]).unwrap();
        assert_eq!(
            cli.atcos,
            vec![StopCode::from("490004733D"), StopCode::from("490000077E")]
        );
        assert_eq!(cli.timeout, Duration::from_secs(5));
        assert!(matches!(cli.format, Format::Text));
    }

    #[test]
    fn test_atco_is_required() {
        assert!(Cli::try_parse_from(["wtb"]).is_err());
    }

    #[test]
    fn test_fractional_timeout() {
        let cli = Cli::try_parse_from(["wtb", "-a", "X", "-t", "0.25", "-f", "json"]).unwrap();
        assert_eq!(cli.timeout, Duration::from_millis(250));
        assert!(matches!(cli.format, Format::Json));
    }

    #[test]
    fn test_negative_timeout_rejected() {
        assert!(parse_timeout("-1").is_err());
        assert!(parse_timeout("NaN").is_err());
        assert!(parse_timeout("soon").is_err());
        assert_eq!(parse_timeout("0").unwrap(), Duration::ZERO);
    }
}
