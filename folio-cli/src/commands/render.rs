//! `folio render <route>`: print a public page.

use anyhow::{Context, Result};
use clap::Args;

use folio_core::config;

use crate::backend::Backend;

#[derive(Args, Debug)]
pub struct RenderArgs {
    /// Page route: `/`, `/portfolio`, `/pricing` or `/services`.
    pub route: String,

    /// Print only the page's ETag.
    #[arg(long)]
    pub etag: bool,
}

impl RenderArgs {
    pub fn run(self) -> Result<()> {
        let home = config::home().context("could not determine home directory")?;
        let page = Backend::connect(&home)?
            .page(&self.route)
            .with_context(|| format!("failed to render '{}'", self.route))?;

        let field = if self.etag { "etag" } else { "body" };
        let text = page[field]
            .as_str()
            .with_context(|| format!("page response has no '{field}'"))?;
        println!("{text}");
        Ok(())
    }
}
