mod charts;
mod metrics;
mod prices;
mod run;
mod snapshot;

use cryptotick_core::{Envelope, EnvelopeError, HarvestConfig, ProviderId};
use serde_json::Value;

use crate::cli::{Cli, Command, PricesArgs};
use crate::error::CliError;
use crate::metadata::{Metadata, SCHEMA_VERSION};

pub struct CommandResult {
    pub data: Value,
    pub warnings: Vec<String>,
    pub errors: Vec<EnvelopeError>,
    pub latency_ms: u64,
    pub source_chain: Vec<ProviderId>,
    /// Plain-text rendering used by `--format table` instead of the data dump.
    pub summary: Option<String>,
}

impl CommandResult {
    pub fn ok(data: Value, source_chain: Vec<ProviderId>) -> Self {
        Self {
            data,
            warnings: Vec::new(),
            errors: Vec::new(),
            latency_ms: 0,
            source_chain,
            summary: None,
        }
    }

    pub fn with_warning(mut self, warning: impl Into<String>) -> Self {
        self.warnings.push(warning.into());
        self
    }

    pub fn with_warnings(mut self, warnings: Vec<String>) -> Self {
        self.warnings.extend(warnings);
        self
    }

    pub fn with_errors(mut self, errors: Vec<EnvelopeError>) -> Self {
        self.errors.extend(errors);
        self
    }

    pub fn with_latency(mut self, latency_ms: u64) -> Self {
        self.latency_ms = latency_ms;
        self
    }

    pub fn with_summary(mut self, summary: String) -> Self {
        self.summary = Some(summary);
        self
    }
}

/// Envelope plus the optional human summary.
pub struct CommandOutput {
    pub envelope: Envelope<Value>,
    pub summary: Option<String>,
}

pub async fn run(cli: &Cli) -> Result<CommandOutput, CliError> {
    let config = HarvestConfig::from_env().with_timeout_ms(cli.timeout_ms);

    let command_result = match &cli.command {
        Command::Prices(args) => prices::run(args, config).await?,
        Command::Snapshot(args) => snapshot::run(args, config).await?,
        Command::Metrics(args) => metrics::run(args, config)?,
        Command::Run(args) => run::run(args, config).await?,
        Command::Charts(args) => charts::run(args, &config)?,
    };

    let CommandResult {
        data,
        warnings,
        errors,
        latency_ms,
        source_chain,
        summary,
    } = command_result;

    let mut metadata = Metadata::new(source_chain, latency_ms)?;
    for warning in warnings {
        metadata.push_warning(warning);
    }

    let meta = metadata.into_envelope_meta(SCHEMA_VERSION)?;
    let envelope = Envelope::with_errors(meta, data, errors)?;

    Ok(CommandOutput { envelope, summary })
}

/// Applies the price flags shared by `prices` and `run`.
fn apply_price_args(args: &PricesArgs, config: HarvestConfig) -> Result<HarvestConfig, CliError> {
    let mut config = config;
    if !args.symbols.is_empty() {
        config = config.with_symbol_names(args.symbols.as_slice())?;
    }
    if let Some(hours) = args.hours {
        config = config.with_total_hours(hours);
    }
    if let Some(output) = &args.output {
        config = config.with_base_output(output.clone());
    }
    if let Some(api_key) = &args.api_key {
        config = config.with_api_key(api_key.clone());
    }
    Ok(config)
}

fn missing_key_warning(config: &HarvestConfig) -> Option<String> {
    (!config.has_api_key()).then(|| {
        String::from(
            "no CryptoCompare API key (set CRYPTOTICK_CRYPTOCOMPARE_API_KEY or --api-key); upstream may reject requests",
        )
    })
}

fn elapsed_ms(started: std::time::Instant) -> u64 {
    started.elapsed().as_millis() as u64
}
