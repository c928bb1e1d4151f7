//! Product catalog and vector search backends.
//!
//! [`ProductSearch`] is the seam the matcher searches through. Two
//! implementations ship here: [`AzureSearch`] talks to an Azure AI Search
//! index over REST, and [`MemoryCatalog`] keeps everything in process.

mod azure;
mod error;
mod loader;
mod memory;
mod search;
mod types;

pub use azure::{AzureSearch, DEFAULT_API_VERSION, VECTOR_PROFILE};
pub use error::CatalogError;
pub use loader::{index_products, load_products};
pub use memory::MemoryCatalog;
pub use search::ProductSearch;
pub use types::{Product, SearchHit};
