//! Free-text search over an already-fetched candidate list.
//!
//! A raw query is classified by [`select_strategy`] into one of the
//! [`MatcherKind`] variants, and a [`SearchContext`] runs that matcher.

pub mod context;
pub mod selector;
pub mod strategies;

pub use context::{search_properties, SearchContext};
pub use selector::select_strategy;
pub use strategies::MatcherKind;
