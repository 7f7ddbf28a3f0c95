use anyhow::Result;
use env_logger::Env;
use log::{error, info};

use rate_snapshot::{
    Config, HttpRateSource, PipelineError, PipelineReport, SystemClock, run_pipeline,
};

#[tokio::main]
async fn main() -> Result<()> {
    env_logger::Builder::from_env(Env::default().default_filter_or("info")).init();
    dotenvy::dotenv().ok();

    match run().await {
        Ok(report) => {
            info!(
                "Exported {} of {} fetched rates to {} ({} dropped)",
                report.exported,
                report.fetched,
                report.output.display(),
                report.validation.dropped()
            );
            Ok(())
        }
        Err(e) => {
            let stage = e.stage();
            error!("Pipeline failed at {} stage: {}", stage, e);
            Err(anyhow::Error::new(e).context(format!("rate snapshot failed at {stage} stage")))
        }
    }
}

async fn run() -> Result<PipelineReport, PipelineError> {
    let config = Config::from_env()?;
    let source = HttpRateSource::new(config.provider.clone())?;

    run_pipeline(
        &source,
        &SystemClock,
        &config.base_currency,
        &config.output_path,
    )
    .await
}
