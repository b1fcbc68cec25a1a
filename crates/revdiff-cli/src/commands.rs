use std::path::Path;

use anyhow::Context;
use colored::Colorize;
use revdiff_config::{ConfigProvider, ConfigSnapshot};
use revdiff_diff::{DiffLine, DiffState, DiffStateBuilder, MyersLineDiff, RAW_STATE};
use revdiff_types::{FieldTypeDefinition, Record};

use crate::cli::*;

pub fn run_command(cli: Cli) -> anyhow::Result<()> {
    let output = match cli.command {
        Command::Compare(args) => cmd_compare(&args, cli.format)?,
        Command::Settings(args) => cmd_settings(&args)?,
    };
    print!("{output}");
    Ok(())
}

fn cmd_compare(args: &CompareArgs, format: OutputFormat) -> anyhow::Result<String> {
    let left = load_record(&args.left)?;
    let right = load_record(&args.right)?;
    let snapshot = match &args.config {
        Some(path) => ConfigSnapshot::load(path)
            .with_context(|| format!("loading config {}", path.display()))?,
        None => register_record_types(&[&left, &right]),
    };

    let states = DiffStateBuilder::from_snapshot(&snapshot)
        .compare_revisions(&left, &right)
        .context("comparing revisions")?;

    match format {
        OutputFormat::Json => Ok(serde_json::to_string_pretty(&states)? + "\n"),
        OutputFormat::Text => Ok(render_text(&states, &args.state)),
    }
}

fn cmd_settings(args: &SettingsArgs) -> anyhow::Result<String> {
    let snapshot = ConfigSnapshot::load(&args.config)
        .with_context(|| format!("loading config {}", args.config.display()))?;
    match snapshot.get(&args.key) {
        Some(settings) => Ok(serde_json::to_string_pretty(&settings)? + "\n"),
        None => Ok(format!("No settings under {}.\n", args.key.yellow())),
    }
}

fn load_record(path: &Path) -> anyhow::Result<Record> {
    let json = std::fs::read_to_string(path)
        .with_context(|| format!("reading record {}", path.display()))?;
    Record::from_json(&json).with_context(|| format!("parsing record {}", path.display()))
}

/// Without a config file, every field type found in the records is
/// registered with default settings.
fn register_record_types(records: &[&Record]) -> ConfigSnapshot {
    let mut snapshot = ConfigSnapshot::new();
    for record in records {
        for field in record.fields() {
            snapshot = snapshot.with_field_type(
                field.field_type.clone(),
                FieldTypeDefinition::new(field.field_type.clone()),
            );
        }
    }
    snapshot
}

fn render_text(states: &[DiffState], state_name: &str) -> String {
    if states.is_empty() {
        return "No comparable fields.\n".to_string();
    }

    let mut out = String::new();
    for state in states {
        let header = match &state.label {
            Some(label) => format!("{label} ({})", state.name),
            None => state.name.clone(),
        };
        out.push_str(&format!("{} {}\n", "──".dimmed(), header.bold()));

        let shown = if state.state(state_name).is_some() {
            state_name
        } else {
            RAW_STATE
        };
        let Some(script) = state.edit_script(&MyersLineDiff, shown) else {
            continue;
        };
        if script.is_identical() {
            out.push_str(&format!("  {}\n", "unchanged".dimmed()));
            continue;
        }
        for line in script.lines() {
            let rendered = match line {
                DiffLine::Context(text) => format!("  {text}"),
                DiffLine::Removed(text) => format!("- {text}").red().to_string(),
                DiffLine::Added(text) => format!("+ {text}").green().to_string(),
            };
            out.push_str(&rendered);
            out.push('\n');
        }
    }
    out
}
