//! Single transcript matching.

use std::io::Read;

use anyhow::Context;
use clap::Args;

use super::create_matcher;
use crate::Cli;
use crate::config::Config;
use crate::output::Output;

/// Match products in one transcript.
///
/// Prints the result as YAML (or JSON with --json), or the human readable
/// summary with --summary.
#[derive(Args)]
pub struct MatchCommand {
    /// Transcript text; read from stdin when omitted
    text: Option<String>,

    /// Print the summary instead of structured output
    #[arg(long)]
    summary: bool,

    /// Search an in-memory catalog built from this products file instead of Azure AI Search
    #[arg(long, value_name = "PATH")]
    catalog: Option<String>,
}

impl MatchCommand {
    pub async fn run(&self, cli: &Cli, cfg: &Config) -> anyhow::Result<()> {
        let text = match &self.text {
            Some(t) => t.clone(),
            None => {
                let mut buf = String::new();
                std::io::stdin()
                    .read_to_string(&mut buf)
                    .context("failed to read transcript from stdin")?;
                buf
            }
        };

        let matcher = create_matcher(cfg, self.catalog.as_deref()).await?;
        let result = matcher.process(&text).await?;

        if self.summary {
            println!("{}", result.to_summary());
            return Ok(());
        }
        Output::new(cli.json, cli.output.as_deref()).write(&result)
    }
}
