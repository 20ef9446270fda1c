// docweave: harvest a documentation site into one composite document.
//
// Exit codes:
//   0 = every page harvested and the artifact rendered
//   1 = finished, but some pages or the render step failed (see report.json)
//   2 = fatal error, nothing usable was produced

use clap::Parser;
use docweave::cli::Cli;
use docweave::{NoOpProgress, OutlineProgress, RunReport, harvest_with_progress};
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_target(false)
        .init();

    let exit_code = match run().await {
        Ok(report) if report.is_clean() => 0,
        Ok(report) => {
            eprintln!(
                "Finished with {} failure(s), see {}",
                report.failures.len(),
                report
                    .composite_path
                    .as_deref()
                    .and_then(|p| p.parent())
                    .map(|dir| dir.join(docweave::utils::REPORT_FILE_NAME).display().to_string())
                    .unwrap_or_else(|| docweave::utils::REPORT_FILE_NAME.to_string())
            );
            1
        }
        Err(e) => {
            eprintln!("Error: {e:#}");
            2
        }
    };

    std::process::exit(exit_code);
}

async fn run() -> anyhow::Result<RunReport> {
    let cli = Cli::parse();
    let quiet = cli.quiet;
    let config = cli.into_config()?;

    let report = if quiet {
        harvest_with_progress(&config, &NoOpProgress).await?
    } else {
        harvest_with_progress(&config, &OutlineProgress).await?
    };
    Ok(report)
}
