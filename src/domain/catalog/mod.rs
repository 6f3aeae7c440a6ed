//! Team catalog: entries, normalization and alias lookup.

mod alias_index;
mod catalog;
mod entry;
mod errors;
mod fuzzy_index;
mod normalizer;

pub use alias_index::{AliasIndex, FuzzyHit};
pub use catalog::Catalog;
pub use entry::CatalogEntry;
pub use errors::CatalogError;
pub use fuzzy_index::{FuzzyIndex, FuzzyMatch};
pub use normalizer::normalize;
