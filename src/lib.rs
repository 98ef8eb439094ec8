//! Property listing search: free-text matchers, structured filters and the
//! listing stores they run over.

pub mod config;
pub mod error;
pub mod filter;
pub mod models;
pub mod repository;
pub mod search;

#[cfg(test)]
pub(crate) mod fixtures;

pub use config::AppConfig;
pub use error::RepositoryError;
pub use filter::{apply_filters, PropertyFilter};
pub use models::{ListingType, Property, PropertyType};
pub use search::{search_properties, select_strategy, MatcherKind, SearchContext};
