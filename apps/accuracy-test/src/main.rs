use brain_tumor::{AppConfig, label_from_class};
use brain_tumor_harness::{EvaluationReport, HarnessError, HttpPredictor, S3Lister, evaluate};
use clap::Parser;
use cli::{Cli, Command, RunArgs};
use std::process::ExitCode;
use tracing_subscriber::EnvFilter;

mod cli;

#[tokio::main(flavor = "current_thread")]
async fn main() -> ExitCode {
    dotenv::dotenv().ok();

    // Logs go to stderr so stdout only carries the result
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .compact()
        .init();

    let cli = Cli::parse();
    match cli.command {
        Command::Run(args) => run(args).await,
        Command::Label { code } => {
            match label_from_class(code) {
                Some(label) => println!("{label}"),
                None => println!("null"),
            }
            ExitCode::SUCCESS
        }
        Command::Config => match AppConfig::from_env() {
            Ok(config) => {
                println!("backend_url = {}", config.backend_url);
                ExitCode::SUCCESS
            }
            Err(e) => {
                tracing::error!(error = %e, "Invalid configuration");
                ExitCode::FAILURE
            }
        },
    }
}

async fn run(args: RunArgs) -> ExitCode {
    match evaluate_accuracy(&args).await {
        Ok(report) => match print_report(&report, args.json) {
            Ok(()) => ExitCode::SUCCESS,
            Err(e) => {
                tracing::error!(error = %e, "Failed to write report");
                ExitCode::FAILURE
            }
        },
        Err(e) => {
            if let Some(HarnessError::Listing { .. }) = e.downcast_ref::<HarnessError>() {
                println!("Failed to get object keys");
            }
            tracing::error!(error = %e, "Accuracy test failed");
            ExitCode::FAILURE
        }
    }
}

async fn evaluate_accuracy(args: &RunArgs) -> anyhow::Result<EvaluationReport> {
    let settings = args.settings()?;
    let lister = S3Lister::from_settings(&args.storage()).await;
    let predictor = HttpPredictor::new(&args.api_url, args.request_timeout());

    tracing::info!(
        bucket = %settings.bucket,
        endpoint = %predictor.predict_endpoint(),
        batch_size = settings.batch_size.get(),
        "Starting accuracy test"
    );

    let report = evaluate(&lister, &predictor, &settings).await?;
    Ok(report)
}

fn print_report(report: &EvaluationReport, json: bool) -> anyhow::Result<()> {
    if json {
        println!("{}", serde_json::to_string_pretty(report)?);
        return Ok(());
    }

    for class in &report.classes {
        tracing::info!(
            class = %class.class,
            correct = class.correct,
            predicted = class.predicted,
            failed = class.failed(),
            "{:.2}%",
            class.accuracy
        );
    }
    println!("Accuracy: {}", report.combined_accuracy);
    Ok(())
}
