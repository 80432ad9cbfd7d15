//! `folio seed [<kind>]`

use anyhow::{Context, Result};
use clap::Args;
use serde_json::Value;

use folio_core::config;
use folio_core::types::ContentKind;

use crate::backend::Backend;

#[derive(Args, Debug)]
pub struct SeedArgs {
    /// Collection to seed; every collection and singleton when omitted.
    pub kind: Option<ContentKind>,
}

impl SeedArgs {
    pub fn run(self) -> Result<()> {
        let home = config::home().context("could not determine home directory")?;
        let result = Backend::connect(&home)?
            .seed(self.kind)
            .context("seed failed")?;
        println!("✓ Seeded: {}", describe_seeded(&result));
        Ok(())
    }
}

/// `{kind, seeded: bool}` or `{seeded: [kind…]}` as a short phrase.
pub fn describe_seeded(result: &Value) -> String {
    match &result["seeded"] {
        Value::Bool(true) => result["kind"].as_str().unwrap_or("collection").to_string(),
        Value::Array(kinds) if !kinds.is_empty() => kinds
            .iter()
            .filter_map(Value::as_str)
            .collect::<Vec<_>>()
            .join(", "),
        _ => "nothing (already populated)".to_string(),
    }
}
