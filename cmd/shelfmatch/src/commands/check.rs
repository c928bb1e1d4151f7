//! Configuration and connectivity check.

use clap::Args;
use shelfmatch_embed::Embedder;

use super::{create_embedder, create_generator, create_search, print_error, print_info, print_success};
use crate::Cli;
use crate::config::{Config, mask_api_key};

/// Validate configuration and test the Azure OpenAI and Azure AI Search
/// connections.
#[derive(Args)]
pub struct CheckCommand {
    /// Only validate the configuration, do not contact the services
    #[arg(long)]
    offline: bool,
}

impl CheckCommand {
    pub async fn run(&self, _cli: &Cli, cfg: &Config) -> anyhow::Result<()> {
        cfg.validate()?;
        print_success("Configuration OK");
        print_info(&format!(
            "Azure OpenAI: {} (deployment {}, key {})",
            cfg.azure_openai.endpoint,
            cfg.azure_openai.deployment,
            mask_api_key(&cfg.azure_openai.api_key)
        ));
        print_info(&format!(
            "Azure AI Search: {} (index {}, key {})",
            cfg.azure_search.endpoint,
            cfg.azure_search.index_name,
            mask_api_key(&cfg.azure_search.api_key)
        ));
        if self.offline {
            return Ok(());
        }

        let mut failures = 0;

        match create_generator(cfg).ping().await {
            Ok(usage) => print_success(&format!("Chat deployment reachable ({usage})")),
            Err(e) => {
                failures += 1;
                print_error(&format!("Chat deployment: {e}"));
            }
        }

        match create_embedder(cfg).embed("test").await {
            Ok(v) => print_success(&format!("Embedding deployment reachable (dimension {})", v.len())),
            Err(e) => {
                failures += 1;
                print_error(&format!("Embedding deployment: {e}"));
            }
        }

        match create_search(cfg).ping().await {
            Ok(n) => print_success(&format!("Search service reachable ({n} indexes)")),
            Err(e) => {
                failures += 1;
                print_error(&format!("Search service: {e}"));
            }
        }

        if failures > 0 {
            anyhow::bail!("{failures} connection check(s) failed");
        }
        Ok(())
    }
}
