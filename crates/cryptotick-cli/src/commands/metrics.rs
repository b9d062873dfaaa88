use std::time::Instant;

use serde::Serialize;

use cryptotick_core::pipeline::{merge_metrics, metrics_preview, MetricsPreview, PREVIEW_ROWS};
use cryptotick_core::table::write_metrics_csv;
use cryptotick_core::{EnvelopeError, HarvestConfig, MetricsError, ProviderId};

use crate::cli::MetricsArgs;
use crate::error::CliError;

use super::{elapsed_ms, CommandResult};

#[derive(Debug, Serialize)]
struct MetricsResponseData {
    output: String,
    seed: u64,
    days: usize,
    loaded: Vec<String>,
    preview: MetricsPreview,
}

pub fn run(args: &MetricsArgs, config: HarvestConfig) -> Result<CommandResult, CliError> {
    let mut config = config.with_seed(args.seed);
    if let Some(dir) = &args.dir {
        config = config.with_metrics_dir(dir);
    }
    if let Some(output) = &args.output {
        config = config.with_advance_output(output.clone());
    }
    let started = Instant::now();

    let report = merge_metrics(&config);
    let days = write_metrics_csv(&config.advance_output, &report.table)?;

    let data = MetricsResponseData {
        output: config.advance_output.display().to_string(),
        seed: config.seed,
        days,
        loaded: report
            .loaded
            .iter()
            .map(|path| path.display().to_string())
            .collect(),
        preview: metrics_preview(&report.table, PREVIEW_ROWS)?,
    };
    let summary = format!(
        "wrote {} days x {} metrics to {} (seed {})\n",
        data.days,
        data.preview.columns.len(),
        data.output,
        data.seed
    );

    Ok(CommandResult::ok(serde_json::to_value(&data)?, vec![ProviderId::Blockchain])
        .with_errors(metric_errors(&report.failures))
        .with_latency(elapsed_ms(started))
        .with_summary(summary))
}

pub(super) fn metric_errors(failures: &[MetricsError]) -> Vec<EnvelopeError> {
    failures
        .iter()
        .map(|failure| EnvelopeError {
            code: failure.code().to_owned(),
            message: failure.to_string(),
            retryable: Some(false),
            source: Some(ProviderId::Blockchain),
        })
        .collect()
}
