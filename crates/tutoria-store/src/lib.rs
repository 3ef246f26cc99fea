//! tutoria-store: listing persistence backends.
//!
//! Implements the `ListingStore` trait on the filesystem and in memory.

pub mod error;
pub mod file;
pub mod memory;

pub use error::StoreError;
pub use file::FileStore;
pub use memory::MemoryStore;
