//! Adapters implementing the domain ports.

pub mod console;
pub mod file;
pub mod http;
pub mod in_memory;
#[cfg(feature = "storage-rocksdb")]
pub mod rocksdb;
