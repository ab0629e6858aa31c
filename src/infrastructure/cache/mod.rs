//! Exact-match answer cache implementations

mod factory;
mod in_memory;
mod json_file;

pub use factory::AnswerCacheFactory;
pub use in_memory::InMemoryAnswerCache;
pub use json_file::JsonFileAnswerCache;
