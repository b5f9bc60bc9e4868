use std::process::ExitCode;
use std::sync::Arc;

use anyhow::Context;
use clap::Parser;
use folddl_core::{DownloadConfig, DownloadJob, DownloadService, JobOutcome, TracingSink};
use folddl_fetch::ReqwestClient;
use tokio_util::sync::CancellationToken;
use tracing::{error, info, warn};

use crate::cli::{Cli, dataset_table};

mod cli;
mod logging;

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();

    if cli.list {
        println!("{}", dataset_table());
        return ExitCode::SUCCESS;
    }

    if let Err(err) = logging::init(cli.log_format) {
        eprintln!("failed to initialise logging: {err}");
        return ExitCode::FAILURE;
    }

    match run(cli).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            let message = format!("{err:#}");
            error!(error = %message, "Download failed");
            ExitCode::FAILURE
        }
    }
}

async fn run(cli: Cli) -> anyhow::Result<()> {
    let dataset = cli.dataset.context("no dataset given")?;
    let destination = cli.destination.context("no destination given")?;

    let config = DownloadConfig::new(cli.base_url);
    let client = ReqwestClient::new(config.timeout())?;
    let service = DownloadService::new(client, config, Arc::new(TracingSink));
    let job = DownloadJob::new(dataset, destination).with_rate_kib(cli.rate);

    let cancel = CancellationToken::new();
    let trigger = cancel.clone();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            warn!("interrupt received, cancelling download");
            trigger.cancel();
        }
    });

    let outcome = service
        .download(&job, &cancel)
        .await
        .with_context(|| format!("dataset {}", job.dataset.name()))?;

    if let JobOutcome::Skipped { size } = outcome {
        info!(dataset = job.dataset.name(), size, "Dataset already present");
    }
    Ok(())
}
