//! HTTP adapters - REST API implementations.
//!
//! Only developer routes are exposed; the messaging channel itself lives
//! outside this crate.

pub mod dev;

pub use dev::{dev_routes, DevHandlers};
