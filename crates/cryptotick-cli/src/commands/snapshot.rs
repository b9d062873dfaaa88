use std::time::Instant;

use cryptotick_core::pipeline::coingecko_source;
use cryptotick_core::{collect_snapshot, EnvelopeError, HarvestConfig, MarketSnapshot, ProviderId};

use crate::cli::SnapshotArgs;
use crate::error::CliError;

use super::{elapsed_ms, CommandResult};

pub async fn run(args: &SnapshotArgs, config: HarvestConfig) -> Result<CommandResult, CliError> {
    if args.limit == 0 {
        return Err(CliError::Command(String::from("--limit must be at least 1")));
    }

    let config = config.with_snapshot_limit(args.limit);
    let started = Instant::now();

    let source = coingecko_source(&config);
    let snapshot = collect_snapshot(&source, config.snapshot_limit).await;

    Ok(CommandResult::ok(serde_json::to_value(&snapshot)?, vec![ProviderId::Coingecko])
        .with_errors(snapshot_errors(&snapshot))
        .with_latency(elapsed_ms(started))
        .with_summary(snapshot.summary_text()))
}

pub(super) fn snapshot_errors(snapshot: &MarketSnapshot) -> Vec<EnvelopeError> {
    snapshot
        .failures
        .iter()
        .map(|(section, error)| {
            let mut envelope_error = EnvelopeError::from_source_error(error, ProviderId::Coingecko);
            envelope_error.message = format!("{}: {}", section.as_str(), envelope_error.message);
            envelope_error
        })
        .collect()
}
