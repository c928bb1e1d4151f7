//! Catalog index setup.

use clap::Args;
use shelfmatch_catalog::{index_products, load_products};
use shelfmatch_embed::Embedder;

use super::{create_embedder, create_generator, create_search, print_info, print_success};
use crate::Cli;
use crate::config::Config;

/// Query used to verify the index after upload.
const VERIFY_QUERY: &str = "Castrol Magnatec 5 litrů";

/// Embed the product catalog and upload it to Azure AI Search.
///
/// Steps: validate configuration, test connections, load products,
/// generate embeddings, create the index, upload, verify with a test query.
#[derive(Args)]
pub struct SetupCommand {
    /// Product catalog (JSON array of {id, name})
    #[arg(long, default_value = "data/products.json")]
    products: String,

    /// Delete the index first so it is rebuilt from scratch
    #[arg(long)]
    recreate: bool,
}

impl SetupCommand {
    pub async fn run(&self, _cli: &Cli, cfg: &Config) -> anyhow::Result<()> {
        cfg.validate()?;
        print_success("Configuration is valid");

        let embedder = create_embedder(cfg);
        let search = create_search(cfg);

        create_generator(cfg).ping().await?;
        search.ping().await?;
        print_success("All connections successful");

        let products = load_products(&self.products)?;
        print_success(&format!("Loaded {} products", products.len()));

        let products = index_products(&embedder, products).await?;
        print_success("Embeddings generated");

        if self.recreate && search.delete_index().await? {
            print_info(&format!("Deleted index {}", search.index_name()));
        }
        if search.create_index(cfg.embedding_dimensions).await? {
            print_success("Index created");
        } else {
            print_success("Index already exists");
        }

        let uploaded = search.upload_documents(&products).await?;
        if uploaded < products.len() {
            anyhow::bail!("uploaded only {uploaded} of {} products", products.len());
        }
        print_success(&format!("Uploaded {uploaded} products"));

        print_info(&format!("Test query: '{VERIFY_QUERY}'"));
        let vector = embedder.embed(VERIFY_QUERY).await?;
        let hits = search.vector_search(&vector, cfg.matcher.top_k).await?;
        if hits.is_empty() {
            tracing::warn!("search returned no results");
        }
        for (i, hit) in hits.iter().enumerate() {
            println!("  {}. {} (score: {:.4})", i + 1, hit.product_name, hit.score);
        }
        print_success("Setup completed");
        Ok(())
    }
}
