pub mod store;

pub use store::{load_threshold, FileBlockStore, MemoryBlockStore};
