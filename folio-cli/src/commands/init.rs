//! `folio init [--site-name <name>] [--seed]`

use anyhow::{Context, Result};
use clap::Args;

use folio_core::config;

use crate::backend::Backend;

/// Write the config file, optionally seeding empty collections.
#[derive(Args, Debug)]
pub struct InitArgs {
    /// Site name shown in page titles and the footer.
    #[arg(long)]
    pub site_name: Option<String>,

    /// Store default content in every empty collection afterwards.
    #[arg(long)]
    pub seed: bool,
}

impl InitArgs {
    pub fn run(self) -> Result<()> {
        let home = config::home().context("could not determine home directory")?;
        let existed = config::config_path_at(&home).exists();
        let config = config::init_at(&home, self.site_name).context("failed to write config")?;

        if existed {
            println!("✓ Config already present for '{}'", config.site_name);
        } else {
            println!("✓ Initialized '{}'", config.site_name);
        }
        println!("  Config: {}", config::config_path_at(&home).display());
        println!("  Store:  {}", config.store_dir_at(&home).display());

        if self.seed {
            let seeded = Backend::connect(&home)?
                .seed(None)
                .context("failed to seed default content")?;
            println!("  Seeded: {}", super::seed::describe_seeded(&seeded));
        }
        Ok(())
    }
}
