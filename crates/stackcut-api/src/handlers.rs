//! Request handlers.

pub mod combine;
pub mod health;

pub use combine::*;
pub use health::*;
