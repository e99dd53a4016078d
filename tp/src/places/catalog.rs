//! Curated destinations used when no autocomplete capability is available

/// Well-known destinations offered as type-ahead suggestions in fallback mode
pub const POPULAR_DESTINATIONS: &[&str] = &[
    "Paris, France",
    "Tokyo, Japan",
    "New York, USA",
    "Rome, Italy",
    "London, UK",
    "Barcelona, Spain",
    "Sydney, Australia",
    "Dubai, UAE",
    "Bangkok, Thailand",
    "Rio de Janeiro, Brazil",
    "Amsterdam, Netherlands",
    "Istanbul, Turkey",
    "Prague, Czech Republic",
    "Bali, Indonesia",
    "Cape Town, South Africa",
    "San Francisco, USA",
    "Venice, Italy",
    "Hong Kong",
    "Singapore",
    "Marrakech, Morocco",
    "Kyoto, Japan",
    "Berlin, Germany",
    "Vienna, Austria",
];

/// Minimum input length (in characters, exclusive) before suggestions appear
pub const MIN_INPUT_CHARS: usize = 1;

/// Case-insensitive substring match over the curated list
///
/// Returns nothing until the input is longer than one character.
pub fn filter_destinations(input: &str) -> Vec<&'static str> {
    if input.chars().count() <= MIN_INPUT_CHARS {
        return Vec::new();
    }
    let needle = input.to_lowercase();
    POPULAR_DESTINATIONS
        .iter()
        .copied()
        .filter(|d| d.to_lowercase().contains(&needle))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_par_matches_paris_only_with_substring() {
        let matches = filter_destinations("par");
        assert!(matches.contains(&"Paris, France"));
        assert!(matches.iter().all(|d| d.to_lowercase().contains("par")));
    }

    #[test]
    fn test_case_insensitive() {
        assert_eq!(filter_destinations("KYOTO"), vec!["Kyoto, Japan"]);
        assert_eq!(filter_destinations("japan"), vec!["Tokyo, Japan", "Kyoto, Japan"]);
    }

    #[test]
    fn test_short_input_yields_nothing() {
        assert!(filter_destinations("").is_empty());
        assert!(filter_destinations("p").is_empty());
        assert!(!filter_destinations("pa").is_empty());
    }

    #[test]
    fn test_no_match() {
        assert!(filter_destinations("atlantis").is_empty());
    }

    #[test]
    fn test_catalog_size() {
        assert!(POPULAR_DESTINATIONS.len() >= 20);
    }
}
