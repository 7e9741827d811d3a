//! Built-in destination connectors.

mod file;
mod memory;

pub use file::FileSink;
pub use memory::MemorySink;
