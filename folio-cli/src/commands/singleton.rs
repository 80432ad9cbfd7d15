//! `folio home show|set` and `folio why show|set <file>`.

use std::path::PathBuf;

use anyhow::{bail, Context, Result};
use clap::Subcommand;
use serde_json::{json, Value};

use folio_core::config;

use super::{print_json, read_input};
use crate::backend::Backend;

#[derive(Subcommand, Debug)]
pub enum HomeCommand {
    /// Print the stored home page content.
    Show,
    /// Patch the home page; fields left out keep their stored value.
    Set {
        /// New hero image URL; an empty string falls back to the placeholder.
        #[arg(long)]
        hero_image: Option<String>,
        /// YAML or JSON patch file (`-` for stdin).
        #[arg(long, conflicts_with = "hero_image")]
        file: Option<PathBuf>,
    },
}

#[derive(Subcommand, Debug)]
pub enum WhyCommand {
    /// Print the stored "why choose us" section.
    Show,
    /// Patch the section from a YAML or JSON file (`-` for stdin). A
    /// `features` list replaces the stored one as a whole.
    Set { file: PathBuf },
}

pub fn run_home(command: HomeCommand) -> Result<()> {
    let home = config::home().context("could not determine home directory")?;
    let backend = Backend::connect(&home)?;
    match command {
        HomeCommand::Show => print_json(&backend.home().context("failed to load home page")?),
        HomeCommand::Set { hero_image, file } => {
            let patch = match (hero_image, file) {
                (Some(url), _) => json!({ "hero_image": url }),
                (None, Some(file)) => read_patch(&file)?,
                (None, None) => bail!("nothing to set; pass --hero-image or --file"),
            };
            backend.update_home(patch).context("failed to update home page")?;
            println!("✓ Home page updated");
            Ok(())
        }
    }
}

pub fn run_why(command: WhyCommand) -> Result<()> {
    let home = config::home().context("could not determine home directory")?;
    let backend = Backend::connect(&home)?;
    match command {
        WhyCommand::Show => print_json(&backend.why().context("failed to load why-choose-us")?),
        WhyCommand::Set { file } => {
            backend
                .update_why(read_patch(&file)?)
                .context("failed to update why-choose-us")?;
            println!("✓ Why-choose-us updated");
            Ok(())
        }
    }
}

fn read_patch(file: &std::path::Path) -> Result<Value> {
    let patch = read_input(file)?;
    if !patch.is_object() {
        bail!("'{}' must hold a map of fields", file.display());
    }
    Ok(patch)
}
