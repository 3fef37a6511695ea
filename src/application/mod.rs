//! Application layer orchestrating the cart and checkout.
//!
//! `CartEngine` is the entry point for presentation code. It owns the cart
//! model and drives the sequential checkout protocol in [`checkout`], keeping
//! the in-flight set and the cart view state observable through `tokio`
//! watch channels.

pub mod checkout;
pub mod engine;
pub mod in_flight;
pub mod view;
