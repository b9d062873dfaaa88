use serde::Serialize;

use cryptotick_core::{HarvestConfig, ProviderId, DEFAULT_CHARTS};

use crate::cli::ChartsArgs;
use crate::error::CliError;

use super::CommandResult;

#[derive(Debug, Serialize)]
struct ChartEntry {
    slug: &'static str,
    title: &'static str,
    url: String,
    export_path: String,
    present: bool,
}

pub fn run(args: &ChartsArgs, config: &HarvestConfig) -> Result<CommandResult, CliError> {
    let dir = args.dir.as_deref().unwrap_or(config.metrics_dir.as_path());

    let entries: Vec<ChartEntry> = DEFAULT_CHARTS
        .iter()
        .map(|chart| {
            let path = chart.export_path(dir);
            ChartEntry {
                slug: chart.slug,
                title: chart.title,
                url: chart.url(),
                present: path.is_file(),
                export_path: path.display().to_string(),
            }
        })
        .collect();

    let missing = entries.iter().filter(|entry| !entry.present).count();
    let mut summary = String::new();
    for entry in &entries {
        summary.push_str(&format!(
            "{:<26} {} -> {}{}\n",
            entry.slug,
            entry.url,
            entry.export_path,
            if entry.present { "" } else { " (missing)" }
        ));
    }

    let mut result = CommandResult::ok(serde_json::to_value(&entries)?, vec![ProviderId::Blockchain])
        .with_summary(summary);
    if missing > 0 {
        result = result.with_warning(format!(
            "{missing} of {} chart exports are missing under {}",
            entries.len(),
            dir.display()
        ));
    }
    Ok(result)
}
