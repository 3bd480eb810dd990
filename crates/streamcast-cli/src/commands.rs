//! Command implementations

use anyhow::{anyhow, bail, Context, Result};
use serde::Serialize;
use std::fmt;
use std::path::Path;
use streamcast_core::{
    resolve_stream_param, PlayerConfig, StreamLocator, StreamSource, SwitchPlan, VariantResolver,
};
use tracing::{debug, info};

use crate::output::{format_output, or_dash};

/// Core errors carry their user-facing text and a stable code
fn core_error(e: streamcast_core::Error) -> anyhow::Error {
    anyhow!("{} [{}]", e.user_message(), e.error_code())
}

/// Read a configuration file, or fall back to the live preset
pub fn load_config(path: Option<&Path>) -> Result<PlayerConfig> {
    let Some(path) = path else {
        return Ok(PlayerConfig::default());
    };

    let json = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read config file {}", path.display()))?;
    let config = PlayerConfig::from_json(&json)
        .map_err(core_error)
        .with_context(|| format!("Invalid config file {}", path.display()))?;

    debug!(path = %path.display(), "Loaded player config");
    Ok(config)
}

#[derive(Debug, Serialize)]
pub struct VariantRow {
    pub label: String,
    pub locator: Option<String>,
    pub active: bool,
}

#[derive(Debug, Serialize)]
pub struct InspectReport {
    pub source: StreamSource,
    pub embed_url: Option<String>,
    pub active: Option<String>,
    pub switchable: bool,
    pub variants: Vec<VariantRow>,
}

impl fmt::Display for InspectReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.source {
            StreamSource::Embed { video_id } => {
                writeln!(f, "Source:     embed ({})", video_id)?;
                write!(f, "Embed URL:  {}", or_dash(self.embed_url.as_deref()))
            }
            StreamSource::Adaptive { locator } => {
                writeln!(f, "Source:     adaptive")?;
                writeln!(f, "Locator:    {}", locator)?;
                writeln!(f, "Active:     {}", or_dash(self.active.as_deref()))?;
                writeln!(
                    f,
                    "Switchable: {}",
                    if self.switchable { "yes" } else { "no" }
                )?;
                writeln!(f)?;
                writeln!(f, "Variants:")?;
                for row in &self.variants {
                    let marker = if row.active { "*" } else { " " };
                    writeln!(
                        f,
                        "  {} {:<6} {}",
                        marker,
                        row.label,
                        or_dash(row.locator.as_deref())
                    )?;
                }
                Ok(())
            }
        }
    }
}

/// Resolve a raw parameter and derive every ladder entry from it
pub fn inspect_report(param: &str, config: &PlayerConfig) -> Result<InspectReport> {
    let source = resolve_stream_param(Some(param)).map_err(core_error)?;
    let embed_url = source.embed_url();

    let Some(locator) = source.locator().cloned() else {
        return Ok(InspectReport {
            source,
            embed_url,
            active: None,
            switchable: false,
            variants: Vec::new(),
        });
    };

    let resolver = VariantResolver::new(locator, config.quality_ladder.clone());
    let variants = resolver
        .options()
        .into_iter()
        .map(|option| VariantRow {
            locator: resolver
                .locator_for(&option.label)
                .map(|l| l.as_str().to_string()),
            label: option.label,
            active: option.active,
        })
        .collect();

    Ok(InspectReport {
        active: Some(resolver.active_label().to_string()),
        switchable: resolver.can_switch(),
        source,
        embed_url,
        variants,
    })
}

#[derive(Debug, Serialize)]
pub struct SwitchReport {
    pub from: String,
    pub label: String,
    pub locator: String,
    pub changed: bool,
}

impl fmt::Display for SwitchReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.changed {
            write!(f, "{} -> {}", self.label, self.locator)
        } else {
            write!(f, "{} already active: {}", self.label, self.locator)
        }
    }
}

/// Plan a quality switch from `locator` to `label`
pub fn switch_report(locator: &str, label: &str, config: &PlayerConfig) -> Result<SwitchReport> {
    let original = StreamLocator::parse(locator).map_err(core_error)?;
    let resolver = VariantResolver::new(original.clone(), config.quality_ladder.clone());

    match resolver.plan(label) {
        SwitchPlan::AlreadyActive => Ok(SwitchReport {
            from: resolver.active_label().to_string(),
            label: label.to_string(),
            locator: original.as_str().to_string(),
            changed: false,
        }),
        SwitchPlan::Switch { label, locator } => Ok(SwitchReport {
            from: resolver.active_label().to_string(),
            label,
            locator: locator.as_str().to_string(),
            changed: true,
        }),
        SwitchPlan::Rejected => bail!("No {} variant can be derived from {}", label, locator),
    }
}

/// Inspect a `liveurl` value
pub fn inspect(param: &str, config: Option<&Path>, format: &str) -> Result<()> {
    let config = load_config(config)?;
    let report = inspect_report(param, &config)?;
    info!(variants = report.variants.len(), "Stream parameter resolved");
    println!("{}", format_output(&report, format)?);
    Ok(())
}

/// Preview a quality switch
pub fn switch(locator: &str, label: &str, config: Option<&Path>, format: &str) -> Result<()> {
    let config = load_config(config)?;
    let report = switch_report(locator, label, &config)?;
    println!("{}", format_output(&report, format)?);
    Ok(())
}

/// Print a preset, or validate a file and print it normalized
pub fn config(preset: &str, check: Option<&Path>) -> Result<()> {
    let config = match check {
        Some(path) => {
            let config = load_config(Some(path))?;
            info!(path = %path.display(), "Config is valid");
            config
        }
        None => preset_config(preset)?,
    };

    // Configuration is JSON in both output modes
    println!("{}", config.to_json().map_err(core_error)?);
    Ok(())
}

fn preset_config(name: &str) -> Result<PlayerConfig> {
    match name.to_lowercase().as_str() {
        "live" | "low-latency" => Ok(PlayerConfig::low_latency()),
        "vod" => Ok(PlayerConfig::vod()),
        other => bail!("Unknown preset '{}' (expected live or vod)", other),
    }
}
