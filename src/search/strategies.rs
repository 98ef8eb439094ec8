use crate::filter::PropertyFilter;
use crate::models::Property;
use std::fmt;
use tracing::debug;

/// Allowed deviation from the target price, as a fraction of the target.
const PRICE_TOLERANCE: f64 = 0.1;

/// The closed set of free-text matchers.
///
/// Every matcher is case-insensitive, keeps input order and never touches
/// the input slice.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum MatcherKind {
    /// Every query term must appear somewhere in the listing text
    #[default]
    Text,
    /// Price within ±10% of the number in the query
    Price,
    /// Whole query must appear in the address block
    Location,
    /// Any query term inside any feature
    Feature,
}

impl MatcherKind {
    pub fn name(&self) -> &'static str {
        match self {
            MatcherKind::Text => "text",
            MatcherKind::Price => "price",
            MatcherKind::Location => "location",
            MatcherKind::Feature => "feature",
        }
    }

    /// Run this matcher over `properties`.
    ///
    /// `filter` is accepted for callers that carry one alongside the query;
    /// none of the current matchers consult it.
    pub fn search(
        &self,
        properties: &[Property],
        query: &str,
        _filter: Option<&PropertyFilter>,
    ) -> Vec<Property> {
        match self {
            MatcherKind::Text => text_search(properties, query),
            MatcherKind::Price => price_search(properties, query),
            MatcherKind::Location => location_search(properties, query),
            MatcherKind::Feature => feature_search(properties, query),
        }
    }
}

impl fmt::Display for MatcherKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

fn terms(query: &str) -> Vec<String> {
    query.split_whitespace().map(str::to_lowercase).collect()
}

fn text_blob(property: &Property) -> String {
    [
        property.title.as_str(),
        property.description.as_str(),
        property.location.address.as_str(),
        property.location.city.as_str(),
        property.location.state.as_str(),
        property.features.join(" ").as_str(),
    ]
    .join(" ")
    .to_lowercase()
}

fn location_blob(property: &Property) -> String {
    [
        property.location.address.as_str(),
        property.location.city.as_str(),
        property.location.state.as_str(),
        property.location.postal_code.as_str(),
    ]
    .join(" ")
    .to_lowercase()
}

/// AND across terms.
pub fn text_search(properties: &[Property], query: &str) -> Vec<Property> {
    let terms = terms(query);
    properties
        .iter()
        .filter(|p| {
            let blob = text_blob(p);
            terms.iter().all(|term| blob.contains(term.as_str()))
        })
        .cloned()
        .collect()
}

/// Reads the digits and dots out of the query as a target price. A query
/// with no readable number leaves the list untouched.
pub fn price_search(properties: &[Property], query: &str) -> Vec<Property> {
    let cleaned: String = query
        .chars()
        .filter(|c| c.is_ascii_digit() || *c == '.')
        .collect();

    let target = match cleaned.parse::<f64>() {
        Ok(target) if target.is_finite() => target,
        _ => {
            debug!("No price in query '{}', skipping price match", query);
            return properties.to_vec();
        }
    };

    let tolerance = target * PRICE_TOLERANCE;
    properties
        .iter()
        .filter(|p| (p.price - target).abs() <= tolerance)
        .cloned()
        .collect()
}

pub fn location_search(properties: &[Property], query: &str) -> Vec<Property> {
    let needle = query.to_lowercase();
    properties
        .iter()
        .filter(|p| location_blob(p).contains(&needle))
        .cloned()
        .collect()
}

/// OR across terms and features; looser than [`text_search`].
pub fn feature_search(properties: &[Property], query: &str) -> Vec<Property> {
    let terms = terms(query);
    properties
        .iter()
        .filter(|p| {
            p.features.iter().any(|feature| {
                let feature = feature.to_lowercase();
                terms.iter().any(|term| feature.contains(term.as_str()))
            })
        })
        .cloned()
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fixtures::{ids, property, with_features};
    use proptest::prelude::*;

    fn listings() -> Vec<Property> {
        let mut cottage = property("p1", "Cozy Cottage", 180_000.0);
        cottage.description = "Quiet lane, wood stove".to_string();
        cottage.location.address = "4 Elm Road".to_string();

        let mut loft = property("p2", "Downtown Loft", 320_000.0);
        loft.description = "Open plan living near the river".to_string();
        loft.location.address = "123 Main Street".to_string();
        loft.location.city = "Portland".to_string();
        loft.location.state = "OR".to_string();
        loft.location.postal_code = "97201".to_string();

        let mut villa = property("p3", "Hillside Villa", 950_000.0);
        villa.location.address = "77 Sunset Blvd".to_string();
        villa.location.city = "Los Angeles".to_string();
        villa.location.state = "CA".to_string();

        vec![
            with_features(cottage, &["Garden", "Fireplace"]),
            with_features(loft, &["Gym", "Rooftop Terrace"]),
            with_features(villa, &["Pool", "Garden", "Sea View"]),
        ]
    }

    #[test]
    fn test_text_requires_every_term() {
        let list = listings();
        assert_eq!(ids(&text_search(&list, "cozy garden")), vec!["p1"]);
        assert_eq!(ids(&text_search(&list, "garden")), vec!["p1", "p3"]);
        assert!(text_search(&list, "garden gym").is_empty());
    }

    #[test]
    fn test_text_covers_description_address_and_state() {
        let list = listings();
        assert_eq!(ids(&text_search(&list, "RIVER")), vec!["p2"]);
        assert_eq!(ids(&text_search(&list, "elm")), vec!["p1"]);
        assert_eq!(ids(&text_search(&list, "ca")), vec!["p3"]);
    }

    #[test]
    fn test_text_ignores_postal_code() {
        assert!(text_search(&listings(), "97201").is_empty());
    }

    #[test]
    fn test_price_within_ten_percent() {
        let list = vec![
            property("a", "A", 100_000.0),
            property("b", "B", 105_000.0),
            property("c", "C", 250_000.0),
        ];
        assert_eq!(ids(&price_search(&list, "100000")), vec!["a", "b"]);
    }

    #[test]
    fn test_price_bounds_inclusive() {
        let list = vec![
            property("low", "Low", 90_000.0),
            property("high", "High", 110_000.0),
            property("out", "Out", 110_001.0),
        ];
        assert_eq!(ids(&price_search(&list, "$100,000")), vec!["low", "high"]);
    }

    #[test]
    fn test_price_unparseable_returns_input() {
        let list = listings();
        assert_eq!(price_search(&list, "$"), list);
        assert_eq!(price_search(&list, "1.2.3"), list);
    }

    #[test]
    fn test_location_whole_query_substring() {
        let list = listings();
        assert_eq!(ids(&location_search(&list, "main street")), vec!["p2"]);
        assert_eq!(ids(&location_search(&list, "Portland OR 972")), vec!["p2"]);
        // Not token-wise: words out of order do not match.
        assert!(location_search(&list, "street main").is_empty());
    }

    #[test]
    fn test_location_ignores_title() {
        assert!(location_search(&listings(), "villa").is_empty());
    }

    #[test]
    fn test_feature_any_term_any_feature() {
        let list = vec![
            with_features(property("f1", "One", 1.0), &["Pool"]),
            with_features(property("f2", "Two", 1.0), &["Gym", "Security"]),
            with_features(property("f3", "Three", 1.0), &["Garden"]),
        ];
        assert_eq!(ids(&feature_search(&list, "pool gym")), vec!["f1", "f2"]);
    }

    #[test]
    fn test_feature_substring_of_feature() {
        let list = listings();
        assert_eq!(ids(&feature_search(&list, "terrace")), vec!["p2"]);
        assert_eq!(ids(&feature_search(&list, "view fire")), vec!["p1", "p3"]);
    }

    #[test]
    fn test_feature_matcher_is_looser_than_text() {
        let list = listings();
        let and_result = text_search(&list, "pool fireplace");
        let or_result = feature_search(&list, "pool fireplace");
        assert!(and_result.is_empty());
        assert_eq!(ids(&or_result), vec!["p1", "p3"]);
    }

    #[test]
    fn test_dispatch_by_kind() {
        let list = listings();
        assert_eq!(
            MatcherKind::Location.search(&list, "sunset blvd", None),
            location_search(&list, "sunset blvd")
        );
        assert_eq!(MatcherKind::Price.to_string(), "price");
    }

    fn arb_query() -> impl Strategy<Value = String> {
        proptest::collection::vec(
            prop_oneof![
                Just("garden"),
                Just("cozy"),
                Just("pool"),
                Just("main"),
                Just("LOFT"),
                Just("zzz"),
                Just("a"),
            ],
            0..4,
        )
        .prop_map(|words| words.join(" "))
    }

    proptest! {
        #[test]
        fn text_search_is_subset_and_idempotent(query in arb_query()) {
            let list = listings();
            let once = text_search(&list, &query);
            prop_assert!(once.iter().all(|p| list.contains(p)));
            prop_assert_eq!(text_search(&once, &query), once);
        }

        #[test]
        fn feature_search_covers_text_search_on_feature_terms(query in arb_query()) {
            // Restricted to listings whose text blob is just their features,
            // AND-matching implies OR-matching for non-empty queries.
            let list: Vec<Property> = listings()
                .into_iter()
                .map(|mut p| {
                    p.title.clear();
                    p.description.clear();
                    p.location = Default::default();
                    p
                })
                .collect();
            prop_assume!(!query.trim().is_empty());
            let and_result = text_search(&list, &query);
            let or_result = feature_search(&list, &query);
            prop_assert!(and_result.iter().all(|p| or_result.contains(p)));
        }

        #[test]
        fn price_search_without_digits_is_identity(query in "[a-zA-Z $,]{0,12}") {
            let list = listings();
            prop_assert_eq!(price_search(&list, &query), list);
        }
    }
}
