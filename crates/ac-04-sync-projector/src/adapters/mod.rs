pub mod memory_index;

pub use memory_index::MemoryIndexStore;
