//! Domain layer: the cart model, catalog types and the ports the engine
//! consumes.

pub mod cart;
pub mod ports;
pub mod product;
pub mod store;
