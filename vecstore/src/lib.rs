pub mod cosine;
pub mod error;
pub mod memory;
pub mod vecstore;

pub use cosine::{cosine_distance, cosine_similarity};
pub use error::VecError;
pub use memory::MemoryIndex;
pub use vecstore::{Match, VecIndex};
