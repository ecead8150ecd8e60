use std::process;

use tracing::{error, info, warn};

use serverless_search::{telemetry, AppError, Config, Dependencies, LogFormat};
use serverless_search_pipeline::WorkflowReport;

#[tokio::main]
async fn main() {
    dotenv::dotenv().ok();

    let log_format = match LogFormat::from_env() {
        Ok(format) => format,
        Err(e) => {
            telemetry::init_tracing(LogFormat::default());
            error!(error = %e, "Bootstrap failed");
            process::exit(1);
        }
    };
    telemetry::init_tracing(log_format);

    match run().await {
        Ok(report) => {
            info!(
                project_id = %report.project_id,
                final_state = %report.final_state,
                indexed = report.load.succeeded,
                failed = report.load.failed,
                hits = report.hits.len(),
                duration_secs = (report.finished_at - report.started_at).num_seconds(),
                "Bootstrap complete"
            );
        }
        Err(e) => {
            error!(error = %e, "Bootstrap failed");
            process::exit(1);
        }
    }
}

async fn run() -> Result<WorkflowReport, AppError> {
    let config = Config::from_env()?;
    let mut deps = Dependencies::new(&config)?;

    let token = deps.orchestrator.cancellation_token();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            warn!("Received shutdown signal");
            token.cancel();
        }
    });

    let report = deps.orchestrator.run().await?;

    for hit in &report.hits {
        info!(
            id = %hit.id,
            score = ?hit.score,
            source = %serde_json::to_string(&hit.source).unwrap_or_default(),
            "Search hit"
        );
    }

    Ok(report)
}
