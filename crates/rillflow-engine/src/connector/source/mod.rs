//! Built-in source connectors.

mod file;
mod memory;

pub use file::FileSource;
pub use memory::MemorySource;
