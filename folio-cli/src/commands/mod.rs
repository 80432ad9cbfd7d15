pub mod daemon;
pub mod init;
pub mod render;
pub mod replace;
pub mod seed;
pub mod show;
pub mod singleton;

use std::io::Read;
use std::path::Path;

use anyhow::{Context, Result};
use serde_json::Value;

/// Read a YAML or JSON document from `path`, or from stdin when it is `-`.
pub fn read_input(path: &Path) -> Result<Value> {
    let contents = if path == Path::new("-") {
        let mut buf = String::new();
        std::io::stdin()
            .read_to_string(&mut buf)
            .context("failed to read stdin")?;
        buf
    } else {
        std::fs::read_to_string(path).with_context(|| format!("cannot read '{}'", path.display()))?
    };
    serde_yaml::from_str(&contents).with_context(|| format!("'{}' is not valid YAML or JSON", path.display()))
}

pub fn print_json(value: &Value) -> Result<()> {
    println!(
        "{}",
        serde_json::to_string_pretty(value).context("failed to render JSON")?
    );
    Ok(())
}
