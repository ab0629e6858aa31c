//! Semantic cache store implementations

mod in_memory;
mod jsonl;

pub use in_memory::InMemorySemanticCache;
pub use jsonl::JsonlSemanticCache;
