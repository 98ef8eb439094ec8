use crate::filter::PropertyFilter;
use crate::models::Property;
use crate::search::selector::select_strategy;
use crate::search::strategies::MatcherKind;
use tracing::debug;

/// Holds the active matcher and runs searches through it
#[derive(Debug, Clone, Default)]
pub struct SearchContext {
    strategy: MatcherKind,
}

impl SearchContext {
    pub fn new(strategy: MatcherKind) -> Self {
        Self { strategy }
    }

    /// Context whose matcher was chosen by classifying `query`
    pub fn for_query(query: &str) -> Self {
        Self::new(select_strategy(query))
    }

    pub fn strategy(&self) -> MatcherKind {
        self.strategy
    }

    pub fn set_strategy(&mut self, strategy: MatcherKind) {
        self.strategy = strategy;
    }

    /// Delegate to the held matcher. Does not short-circuit on an empty
    /// query; see [`search_properties`] for that.
    pub fn search(
        &self,
        properties: &[Property],
        query: &str,
        filter: Option<&PropertyFilter>,
    ) -> Vec<Property> {
        self.strategy.search(properties, query, filter)
    }
}

/// Classify `query` and run the matching search.
///
/// A blank query returns the whole list without consulting any matcher.
pub fn search_properties(
    properties: &[Property],
    query: &str,
    filter: Option<&PropertyFilter>,
) -> Vec<Property> {
    if query.trim().is_empty() {
        return properties.to_vec();
    }

    let context = SearchContext::for_query(query);
    let results = context.search(properties, query, filter);
    debug!(
        "Query '{}' matched {} of {} properties using {} matcher",
        query,
        results.len(),
        properties.len(),
        context.strategy()
    );
    results
}
