//! CSV adapters used by the command-line front end.

pub mod cart_writer;
pub mod product_reader;
