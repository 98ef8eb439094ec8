use crate::search::strategies::MatcherKind;
use once_cell::sync::Lazy;
use regex::Regex;

static PRICE_PATTERN: Lazy<Regex> = Lazy::new(|| Regex::new(r"^\$?[0-9]+").unwrap());
static FEATURE_PATTERN: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?i)\b(bed|bath|sqm|sq)\b").unwrap());
static LOCATION_PATTERN: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?i)\b(st|street|ave|avenue|rd|road|blvd|boulevard)\b").unwrap()
});

/// Pick the matcher for a raw query. First pattern to hit wins:
/// leading price, then room/size words, then street suffixes, else text.
pub fn select_strategy(query: &str) -> MatcherKind {
    if PRICE_PATTERN.is_match(query) {
        MatcherKind::Price
    } else if FEATURE_PATTERN.is_match(query) {
        MatcherKind::Feature
    } else if LOCATION_PATTERN.is_match(query) {
        MatcherKind::Location
    } else {
        MatcherKind::Text
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_leading_number_is_price() {
        assert_eq!(select_strategy("250000"), MatcherKind::Price);
        assert_eq!(select_strategy("$1200 monthly"), MatcherKind::Price);
    }

    #[test]
    fn test_number_must_lead() {
        assert_eq!(select_strategy("under 250000"), MatcherKind::Text);
        assert_eq!(select_strategy(" 250000"), MatcherKind::Text);
    }

    #[test]
    fn test_leading_digit_beats_street_suffix() {
        assert_eq!(select_strategy("5th Ave"), MatcherKind::Price);
    }

    #[test]
    fn test_price_wins_over_feature_words() {
        // "3 bed" starts with a number, so the price pattern claims it.
        assert_eq!(select_strategy("3 bed"), MatcherKind::Price);
    }

    #[test]
    fn test_feature_words() {
        assert_eq!(select_strategy("two bed apartment"), MatcherKind::Feature);
        assert_eq!(select_strategy("BATH upstairs"), MatcherKind::Feature);
        assert_eq!(select_strategy("large sqm"), MatcherKind::Feature);
        assert_eq!(select_strategy("over 90 sq"), MatcherKind::Feature);
    }

    #[test]
    fn test_feature_words_must_be_whole() {
        assert_eq!(select_strategy("bedroom"), MatcherKind::Text);
        assert_eq!(select_strategy("bathtub"), MatcherKind::Text);
    }

    #[test]
    fn test_feature_beats_location() {
        assert_eq!(select_strategy("bed near main street"), MatcherKind::Feature);
    }

    #[test]
    fn test_street_suffixes() {
        for query in [
            "main st",
            "Main Street",
            "fifth Ave",
            "park avenue",
            "mill rd",
            "old road",
            "sunset blvd",
            "Sunset Boulevard",
        ] {
            assert_eq!(select_strategy(query), MatcherKind::Location, "{query}");
        }
    }

    #[test]
    fn test_street_suffix_must_be_whole() {
        assert_eq!(select_strategy("stunning views"), MatcherKind::Text);
        assert_eq!(select_strategy("roadside cafe"), MatcherKind::Text);
    }

    #[test]
    fn test_non_ascii_digits_are_not_prices() {
        assert_eq!(select_strategy("٣٠٠٠٠٠"), MatcherKind::Text);
        assert_eq!(select_strategy("$٣٠٠"), MatcherKind::Text);
    }

    #[test]
    fn test_fallback_to_text() {
        assert_eq!(select_strategy("cozy cottage"), MatcherKind::Text);
        assert_eq!(select_strategy(""), MatcherKind::Text);
    }
}
