use anyhow::{bail, Context, Result};
use clap::Parser;
use rblscan::cli::Args;
use rblscan::config::{Paths, RawConfig};
use rblscan::output;
use rblscan::scanner::{ScanEngine, ScanOutcome, SystemResolver};
use rblscan::storage::{JsonTicketStore, TicketStore};
use std::process::ExitCode;
use std::sync::Arc;
use std::time::Duration;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> ExitCode {
    let args = Args::parse();
    init_tracing(&args);

    match run(args).await {
        Ok(ScanOutcome::Success(_)) => ExitCode::SUCCESS,
        Ok(ScanOutcome::Failed { reason }) => {
            output::print_error(&reason);
            ExitCode::FAILURE
        }
        Err(e) => {
            output::print_error(&format!("{:#}", e));
            ExitCode::FAILURE
        }
    }
}

fn init_tracing(args: &Args) {
    let default = if args.verbose {
        "rblscan=debug"
    } else if args.quiet {
        "rblscan=warn"
    } else {
        "rblscan=info"
    };

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default)),
        )
        .with_writer(std::io::stderr)
        .init();
}

async fn run(args: Args) -> Result<ScanOutcome> {
    let paths = Paths::discover();
    let config_path = match (&args.config, &paths) {
        (Some(path), _) => path.clone(),
        (None, Ok(paths)) => paths.config_file(),
        (None, Err(e)) => bail!("no --config given and {}", e),
    };

    let mut raw = RawConfig::load_from(&config_path)
        .with_context(|| format!("loading {}", config_path.display()))?;
    if let Some(concurrency) = args.concurrency {
        raw.concurrency = concurrency;
    }
    if let Some(timeout) = args.timeout {
        raw.timeout_ms = timeout;
    }
    if let Some(rate) = args.rate_limit {
        raw.rate_limit = rate;
    }

    let settings = match raw.validate() {
        Ok(settings) => settings,
        Err(e) => {
            return Ok(ScanOutcome::Failed {
                reason: e.to_string(),
            })
        }
    };

    if !args.quiet && args.output == rblscan::cli::OutputFormat::Plain {
        let modes: Vec<String> = settings.targets.iter().map(|t| t.mode().to_string()).collect();
        output::print_scan_header(&modes, settings.active_feeds().count());
    }

    let resolver = Arc::new(SystemResolver::new(settings.timeout));
    let mut engine = ScanEngine::new(settings, resolver);

    if engine.settings().uses_tickets() {
        let tickets_path = match (args.tickets, &paths) {
            (Some(path), _) => path,
            (None, Ok(paths)) => paths.tickets_file(),
            (None, Err(_)) => bail!("mode 'tickets' needs --tickets"),
        };
        let store: Arc<dyn TicketStore> = Arc::new(JsonTicketStore::new(tickets_path));
        engine = engine.with_ticket_store(store);
    }
    if args.verbose {
        engine = engine.with_progress();
    }

    let outcome = engine.run().await;
    if let ScanOutcome::Success(report) = &outcome {
        if report.warning_count > 0 && !args.quiet {
            output::print_warning(&format!(
                "{} targets were not valid IPv4 addresses and were skipped",
                report.warning_count
            ));
        }
        output::print_report(report, args.output).context("writing results")?;
    }

    Ok(outcome)
}
