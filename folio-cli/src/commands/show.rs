//! `folio show <kind>`: list a collection as a table or JSON.

use anyhow::{Context, Result};
use clap::Args;
use colored::Colorize;
use serde_json::Value;
use tabled::{settings::Style, Table, Tabled};

use folio_core::config;
use folio_core::types::ContentKind;

use super::print_json;
use crate::backend::Backend;

#[derive(Args, Debug)]
pub struct ShowArgs {
    /// Collection: portfolio | pricing | services.
    pub kind: ContentKind,

    /// Emit machine-readable JSON, suitable as `folio replace` input.
    #[arg(long)]
    pub json: bool,
}

impl ShowArgs {
    pub fn run(self) -> Result<()> {
        let home = config::home().context("could not determine home directory")?;
        let records = Backend::connect(&home)?
            .load(self.kind)
            .with_context(|| format!("failed to load {}", self.kind))?;

        if self.json {
            return print_json(&records);
        }
        let records = records.as_array().cloned().unwrap_or_default();
        print_table(self.kind, &records);
        Ok(())
    }
}

#[derive(Tabled)]
struct RecordRow {
    #[tabled(rename = "#")]
    position: usize,
    #[tabled(rename = "title")]
    title: String,
    #[tabled(rename = "detail")]
    detail: String,
    #[tabled(rename = "id")]
    id: String,
    #[tabled(rename = "created")]
    created: String,
}

fn print_table(kind: ContentKind, records: &[Value]) {
    println!(
        "{} | {} records | {}",
        kind.to_string().to_uppercase().bold(),
        records.len(),
        kind.detail_route().bright_black(),
    );
    if records.is_empty() {
        println!("No {kind} records stored.");
        return;
    }

    let rows: Vec<RecordRow> = records
        .iter()
        .enumerate()
        .map(|(i, record)| RecordRow {
            position: i + 1,
            title: text(record, "title"),
            detail: detail(kind, record),
            id: text(record, "id"),
            created: created(record),
        })
        .collect();
    let mut table = Table::new(rows);
    table.with(Style::rounded());
    println!("{table}");
}

fn text(record: &Value, field: &str) -> String {
    record[field].as_str().unwrap_or_default().to_string()
}

/// `createdAt` shortened to the minute, or as stored when it does not parse.
fn created(record: &Value) -> String {
    let raw = text(record, "createdAt");
    chrono::DateTime::parse_from_rfc3339(&raw)
        .map(|at| at.format("%Y-%m-%d %H:%M").to_string())
        .unwrap_or(raw)
}

fn detail(kind: ContentKind, record: &Value) -> String {
    match kind {
        ContentKind::Portfolio => {
            format!("{} ({})", text(record, "category"), text(record, "mediaType"))
        }
        ContentKind::Pricing => {
            let price = text(record, "price");
            if record["is_featured"].as_bool().unwrap_or(false) {
                format!("{price} ★")
            } else {
                price
            }
        }
        ContentKind::Services => format!("{} · {}", text(record, "price"), text(record, "icon")),
    }
}
