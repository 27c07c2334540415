//! Short-term/long-term memory with embedding-similarity recall

pub mod store;
pub mod types;

pub use store::{MemoryConfig, MemoryStore};
pub use types::{cosine_similarity, MemoryRecord, MemoryTier};
