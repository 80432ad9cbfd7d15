//! `folio replace <kind> <file> [--dry-run]`: swap a whole collection.

use std::path::PathBuf;

use anyhow::{bail, Context, Result};
use clap::Args;
use colored::Colorize;
use serde_json::Value;

use folio_core::config;
use folio_core::types::ContentKind;
use folio_sync::form::form_name;
use folio_sync::{ReplaceOutcome, ReplacePreview};

use super::read_input;
use crate::backend::Backend;

#[derive(Args, Debug)]
pub struct ReplaceArgs {
    /// Collection: portfolio | pricing | services.
    pub kind: ContentKind,

    /// YAML or JSON list of records (`-` for stdin). A map holding the list
    /// under `items`, `plans` or `services` is accepted too.
    pub file: PathBuf,

    /// Show what would change without writing anything.
    #[arg(long)]
    pub dry_run: bool,
}

impl ReplaceArgs {
    pub fn run(self) -> Result<()> {
        let home = config::home().context("could not determine home directory")?;
        let items = unwrap_form(self.kind, read_input(&self.file)?)?;
        let result = Backend::connect(&home)?
            .replace(self.kind, items, self.dry_run)
            .with_context(|| format!("replace failed for {}", self.kind))?;

        if self.dry_run {
            let preview: ReplacePreview =
                serde_json::from_value(result).context("unexpected preview payload")?;
            print_preview(&preview);
        } else {
            let outcome: ReplaceOutcome =
                serde_json::from_value(result).context("unexpected replace payload")?;
            println!(
                "✓ Replaced {} ({} removed, {} inserted)",
                outcome.kind, outcome.removed, outcome.inserted
            );
        }
        Ok(())
    }
}

/// The record list, whether given bare or under the form's field name.
fn unwrap_form(kind: ContentKind, input: Value) -> Result<Value> {
    match input {
        Value::Array(_) => Ok(input),
        Value::Object(mut map) => match map.remove(form_name(kind)) {
            Some(list @ Value::Array(_)) => Ok(list),
            _ => bail!("expected a list of {kind} records or a map with '{}'", form_name(kind)),
        },
        _ => bail!("expected a list of {kind} records"),
    }
}

fn print_preview(preview: &ReplacePreview) {
    let prefix = "[dry-run]";
    if preview.is_unchanged() {
        println!("{prefix} ✓ {} unchanged ({} records)", preview.kind, preview.current);
        return;
    }
    println!(
        "{prefix} {}: {} → {} records",
        preview.kind, preview.current, preview.proposed
    );
    for line in preview.unified_diff.lines() {
        if line.starts_with("+++") || line.starts_with("---") {
            println!("{}", line.bold());
        } else if line.starts_with('+') {
            println!("{}", line.green());
        } else if line.starts_with('-') {
            println!("{}", line.red());
        } else if line.starts_with("@@") {
            println!("{}", line.cyan());
        } else {
            println!("{line}");
        }
    }
}
