//! Command-line inspection of saved LoRA stack nodes.
//!
//! Every command reads a JSON file and writes JSON or plain text to the
//! given writer. Accepted inputs are a saved node (`widgets` plus optional
//! `executionBundle`), a bare bundle array, an object carrying the bundle as
//! a `lora_bundle` string, or the flat `"LoRA N"` slot format.

#![cfg_attr(test, allow(clippy::expect_used, clippy::unwrap_used, clippy::panic))]

use std::io::Write;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result, bail};
use clap::{Parser, Subcommand};
use lora_stack::row::RowIds;
use lora_canvas::Size;
use lora_stack::serialization::deserialize_strict;
use lora_stack::testing::RecordingHost;
use lora_stack::{
    BundleEntry, LoadPlan, StackConfig, StackNode, Widget, execution_bundle, for_each_visible,
    parse_bundle, parse_legacy_slots,
};
use serde::Serialize;
use serde_json::Value;
use tracing::{debug, info};

#[derive(Parser, Debug)]
#[command(name = "lora-stack")]
#[command(about = "Inspect saved LoRA stack nodes")]
pub struct LoraStackCli {
    /// TOML config file; LORA_STACK_* environment variables override it
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Print the execution bundle a saved node sends to the backend
    Bundle {
        input: PathBuf,
    },
    /// Resolve the bundle against a LoRA catalog and print the load plan
    Plan {
        input: PathBuf,
        /// Text file listing one LoRA file name per line
        #[arg(long)]
        catalog: PathBuf,
    },
    /// Print where each visible widget of a saved node is laid out
    Layout {
        input: PathBuf,
        /// Node width; never below the configured minimum
        #[arg(long)]
        width: Option<f32>,
    },
}

pub fn run() -> Result<()> {
    let cli = LoraStackCli::parse();
    let stdout = std::io::stdout();
    let mut out = stdout.lock();
    execute(cli, &mut out)
}

pub fn execute(cli: LoraStackCli, out: &mut impl Write) -> Result<()> {
    let config = StackConfig::from_env(cli.config.as_deref()).context("load config")?;
    match cli.command {
        Commands::Bundle { input } => {
            let entries = load_entries(&read_json(&input)?)?;
            write_json(out, &entries)
        }
        Commands::Plan { input, catalog } => {
            let entries = load_entries(&read_json(&input)?)?;
            let catalog = read_catalog(&catalog)?;
            let plan = LoadPlan::build(&entries, &catalog);
            info!(
                loras = plan.loras.len(),
                skipped = plan.skipped.len(),
                "built load plan"
            );
            write_json(out, &plan)
        }
        Commands::Layout { input, width } => {
            let width = width.unwrap_or(config.layout.min_width);
            write_layout(out, &read_json(&input)?, width, config)
        }
    }
}

fn read_json(path: &Path) -> Result<Value> {
    let raw = std::fs::read_to_string(path)
        .with_context(|| format!("read {}", path.display()))?;
    serde_json::from_str(&raw).with_context(|| format!("parse {}", path.display()))
}

fn read_catalog(path: &Path) -> Result<Vec<String>> {
    let raw = std::fs::read_to_string(path)
        .with_context(|| format!("read catalog {}", path.display()))?;
    Ok(raw
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty() && !line.starts_with('#'))
        .map(ToString::to_string)
        .collect())
}

/// Bundle entries from any accepted input shape. A saved node's bundle is
/// always rebuilt from its rows rather than trusted.
pub fn load_entries(payload: &Value) -> Result<Vec<BundleEntry>> {
    match payload {
        Value::Array(_) => Ok(parse_bundle(&payload.to_string())?),
        Value::Object(map) if map.contains_key("widgets") => {
            let (_, widgets) = deserialize_strict(payload, &mut RowIds::default())?;
            debug!(rows = widgets.row_count(), "rebuilding bundle from saved node");
            Ok(execution_bundle(widgets.row_states()))
        }
        Value::Object(map) => {
            if let Some(raw) = map.get("lora_bundle").and_then(Value::as_str) {
                return Ok(parse_bundle(raw)?);
            }
            let entries = parse_legacy_slots(map);
            if entries.is_empty() {
                bail!("no LoRA entries found");
            }
            Ok(entries)
        }
        _ => bail!("expected a JSON object or array"),
    }
}

fn write_json(out: &mut impl Write, value: &impl Serialize) -> Result<()> {
    serde_json::to_writer_pretty(&mut *out, value)?;
    writeln!(out)?;
    Ok(())
}

fn describe(widget: &Widget) -> String {
    match widget {
        Widget::Header(_) => "header".to_string(),
        Widget::TagGroup(group) => {
            let state = if group.is_collapsed() { " collapsed" } else { "" };
            format!("group {} ({}){state}", group.tag(), group.member_count)
        }
        Widget::Row(row) => {
            let state = if row.state.enabled { "" } else { " off" };
            format!(
                "row {} {:.2}/{:.2}{state}",
                row.state.display_name(),
                row.state.strength_primary,
                row.state.strength_secondary
            )
        }
    }
}

/// Lays the saved node out through the same lifecycle a host editor runs:
/// configure, then resize to the requested width.
fn write_layout(
    out: &mut impl Write,
    payload: &Value,
    width: f32,
    config: StackConfig,
) -> Result<()> {
    deserialize_strict(payload, &mut RowIds::default())?;
    let mut host = RecordingHost::default();
    let mut node = StackNode::new(config);
    node.on_configure(&mut host, Some(payload));
    node.on_resize(&mut host, Size::new(width, 0.0));
    debug!(resizes = host.sizes.len(), "configured headless node");

    let mut lines = Vec::new();
    for_each_visible(
        node.widgets().widgets(),
        node.tagging(),
        node.size().width,
        |visible, widget| {
            lines.push(format!(
                "{:>7.1} {:>5.1}  {}",
                visible.top,
                visible.height,
                describe(widget)
            ));
        },
    );
    for line in lines {
        writeln!(out, "{line}")?;
    }
    let size = node.size();
    writeln!(out, "size {:.0}x{:.0}", size.width, size.height)?;
    Ok(())
}
