use std::process::ExitCode;
use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, Result};
use clap::Parser;
use jobpoll::cli::{Cli, ClientArgs, Command};
use jobpoll::client::JobClient;
use jobpoll::config::Settings;
use jobpoll::registry::JobRegistry;
use jobpoll::state_machine::{JobId, JobStatus};
use jobpoll::ui::PollProgress;
use jobpoll::{server, telemetry, ui};

#[tokio::main]
async fn main() -> ExitCode {
    dotenvy::dotenv().ok();
    let cli = Cli::parse();

    match run(cli).await {
        Ok(code) => code,
        Err(err) => {
            eprintln!("Error: {err:#}");
            ExitCode::FAILURE
        }
    }
}

async fn run(cli: Cli) -> Result<ExitCode> {
    let mut settings =
        Settings::load(cli.config.as_deref()).context("failed to load configuration")?;
    telemetry::init(&settings.log_level, cli.verbose);

    match cli.command {
        Command::Serve { host, port } => {
            if let Some(host) = host {
                settings.server.host = host;
            }
            if let Some(port) = port {
                settings.server.port = port;
            }
            let registry = Arc::new(JobRegistry::from_settings(&settings.server));
            server::serve(
                &settings.server.host,
                settings.server.port,
                registry,
                shutdown_signal(),
            )
            .await?;
            Ok(ExitCode::SUCCESS)
        }
        Command::Create { client } => {
            let client = build_client(&mut settings, &client)?;
            let job_id = client.create_job().await?;
            println!("{job_id}");
            Ok(ExitCode::SUCCESS)
        }
        Command::Status { job_id, client } => {
            let client = build_client(&mut settings, &client)?;
            let status = client.get_status(&job_id).await?;
            println!("{}", ui::styled_status(status));
            Ok(ExitCode::SUCCESS)
        }
        Command::Wait {
            job_id,
            timeout,
            client,
        } => {
            let client = build_client(&mut settings, &client)?;
            wait(&client, &job_id, parse_timeout(timeout)?).await
        }
        Command::Submit { timeout, client } => {
            let client = build_client(&mut settings, &client)?;
            let timeout = parse_timeout(timeout)?;
            let job_id = client.create_job().await?;
            println!("Created job {job_id}");
            wait(&client, &job_id, timeout).await
        }
    }
}

fn build_client(settings: &mut Settings, args: &ClientArgs) -> Result<JobClient> {
    if let Some(url) = &args.url {
        settings.client.base_url = url.clone();
    }
    Ok(JobClient::from_settings(&settings.client)?)
}

fn parse_timeout(timeout: Option<f64>) -> Result<Option<Duration>> {
    timeout
        .map(|secs| {
            Duration::try_from_secs_f64(secs)
                .context("--timeout must be a non-negative number of seconds")
        })
        .transpose()
}

/// Poll with a spinner. Exit code 0 for `completed`, 2 for `error`.
async fn wait(client: &JobClient, job_id: &JobId, timeout: Option<Duration>) -> Result<ExitCode> {
    let mut progress = PollProgress::start(job_id);
    let mut observer = |status: JobStatus| progress.observe(status);

    let outcome = client
        .wait_for_completion(job_id, Some(&mut observer), timeout)
        .await;

    match outcome {
        Ok(status) => {
            progress.finish(status);
            Ok(match status {
                JobStatus::Completed => ExitCode::SUCCESS,
                JobStatus::Error | JobStatus::Pending => ExitCode::from(2),
            })
        }
        Err(err) => {
            progress.fail(&err);
            Ok(ExitCode::FAILURE)
        }
    }
}

async fn shutdown_signal() {
    match tokio::signal::ctrl_c().await {
        Ok(()) => tracing::info!("Shutdown signal received"),
        Err(err) => {
            tracing::error!(error = %err, "Failed to listen for Ctrl-C, running until killed");
            std::future::pending::<()>().await;
        }
    }
}
