use std::time::Instant;

use serde::Serialize;

use cryptotick_core::pipeline::{cryptocompare_source, PREVIEW_ROWS};
use cryptotick_core::table::write_price_csv;
use cryptotick_core::{
    fetch_prices, BackfillSummary, EnvelopeError, HarvestConfig, PriceHarvest, PriceRow,
    ProviderId,
};

use crate::cli::PricesArgs;
use crate::error::CliError;

use super::{apply_price_args, elapsed_ms, missing_key_warning, CommandResult};

#[derive(Debug, Serialize)]
struct PricesResponseData {
    output: String,
    rows: usize,
    symbols: Vec<BackfillSummary>,
    preview: Vec<PriceRow>,
}

pub async fn run(args: &PricesArgs, config: HarvestConfig) -> Result<CommandResult, CliError> {
    let config = apply_price_args(args, config)?;
    let started = Instant::now();

    let source = cryptocompare_source(&config);
    let harvest = fetch_prices(&source, &config.symbols, config.total_hours).await;
    let rows = write_price_csv(&config.base_output, &harvest.series())?;

    let data = PricesResponseData {
        output: config.base_output.display().to_string(),
        rows,
        symbols: harvest.summaries(),
        preview: harvest.preview(PREVIEW_ROWS),
    };

    let mut result = CommandResult::ok(serde_json::to_value(&data)?, vec![ProviderId::Cryptocompare])
        .with_errors(harvest_errors(&harvest))
        .with_warnings(short_window_warnings(&data.symbols))
        .with_latency(elapsed_ms(started))
        .with_summary(summary_text(&data));
    if let Some(warning) = missing_key_warning(&config) {
        result = result.with_warning(warning);
    }
    Ok(result)
}

pub(super) fn harvest_errors(harvest: &PriceHarvest) -> Vec<EnvelopeError> {
    harvest
        .failures()
        .map(|(symbol, error)| {
            let mut envelope_error = EnvelopeError::from_source_error(error, ProviderId::Cryptocompare);
            envelope_error.message = format!("{symbol}: {}", envelope_error.message);
            envelope_error
        })
        .collect()
}

pub(super) fn short_window_warnings(summaries: &[BackfillSummary]) -> Vec<String> {
    summaries
        .iter()
        .filter(|summary| summary.short_windows > 0)
        .map(|summary| {
            format!(
                "{}: {} window(s) returned fewer rows than requested",
                summary.symbol, summary.short_windows
            )
        })
        .collect()
}

fn summary_text(data: &PricesResponseData) -> String {
    let mut out = format!("wrote {} rows to {}\n", data.rows, data.output);
    for summary in &data.symbols {
        out.push_str(&format!(
            "{}: {}/{} hours in {} call(s), stop: {}",
            summary.symbol,
            summary.retrieved_hours,
            summary.requested_hours,
            summary.calls,
            summary.stop
        ));
        if let (Some(first), Some(last)) = (&summary.first_ts, &summary.last_ts) {
            out.push_str(&format!(" [{first} .. {last}]"));
        }
        out.push('\n');
    }
    out
}
