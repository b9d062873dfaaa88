use serde::Serialize;

use cryptotick_core::pipeline::{
    self, coingecko_source, cryptocompare_source, metrics_preview, MetricsPreview, PREVIEW_ROWS,
};
use cryptotick_core::{BackfillSummary, HarvestConfig, MarketSnapshot, PriceRow, ProviderId};

use crate::cli::RunArgs;
use crate::error::CliError;

use super::metrics::metric_errors;
use super::prices::{harvest_errors, short_window_warnings};
use super::snapshot::snapshot_errors;
use super::{apply_price_args, missing_key_warning, CommandResult};

#[derive(Debug, Serialize)]
struct RunResponseData {
    snapshot: MarketSnapshot,
    base_output: String,
    base_rows: usize,
    symbols: Vec<BackfillSummary>,
    base_preview: Vec<PriceRow>,
    advance_output: String,
    advance_rows: usize,
    advance_preview: MetricsPreview,
}

pub async fn run(args: &RunArgs, config: HarvestConfig) -> Result<CommandResult, CliError> {
    if args.limit == 0 {
        return Err(CliError::Command(String::from("--limit must be at least 1")));
    }

    let mut config = apply_price_args(&args.prices, config)?
        .with_snapshot_limit(args.limit)
        .with_seed(args.metrics.seed);
    if let Some(dir) = &args.metrics.dir {
        config = config.with_metrics_dir(dir);
    }
    if let Some(output) = &args.metrics.advance_output {
        config = config.with_advance_output(output.clone());
    }

    let candles = cryptocompare_source(&config);
    let markets = coingecko_source(&config);
    let report = pipeline::run(&config, &candles, &markets).await?;

    let mut errors = snapshot_errors(&report.snapshot);
    errors.extend(harvest_errors(&report.prices));
    errors.extend(metric_errors(report.metric_failures()));

    let symbols = report.prices.summaries();
    let warnings = short_window_warnings(&symbols);
    let data = RunResponseData {
        base_output: config.base_output.display().to_string(),
        base_rows: report.base_rows,
        base_preview: report.prices.preview(PREVIEW_ROWS),
        symbols,
        advance_output: config.advance_output.display().to_string(),
        advance_rows: report.advance_rows,
        advance_preview: metrics_preview(&report.metrics.table, PREVIEW_ROWS)?,
        snapshot: report.snapshot.clone(),
    };

    let summary = format!(
        "{}\nwrote {} price rows to {}\nwrote {} metric days to {}\n",
        report.snapshot.summary_text(),
        data.base_rows,
        data.base_output,
        data.advance_rows,
        data.advance_output
    );

    let mut result = CommandResult::ok(
        serde_json::to_value(&data)?,
        vec![
            ProviderId::Coingecko,
            ProviderId::Cryptocompare,
            ProviderId::Blockchain,
        ],
    )
    .with_errors(errors)
    .with_warnings(warnings)
    .with_latency(report.elapsed_ms)
    .with_summary(summary);
    if let Some(warning) = missing_key_warning(&config) {
        result = result.with_warning(warning);
    }
    Ok(result)
}
