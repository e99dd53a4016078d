//! Itinerary prompt construction

use tracing::debug;

use super::TripParameters;
use crate::places::PlaceCandidate;

/// Render the generation prompt for a destination and trip parameters
pub fn build_prompt(place: &PlaceCandidate, params: &TripParameters) -> String {
    debug!(destination = %place.display_name, days = params.days.get(), "build_prompt: called");
    format!(
        "Create a detailed {days}-day travel itinerary for {destination}.\n\
         Travel style: {style}.\n\
         Travelling with: {companions}.\n\
         Cover the top attractions, local food, hidden gems and practical travel tips.\n\
         Respond in plain text only. Do not use markdown, asterisks, hash signs, underscores, \
         backticks or dashes.\n\
         Organise the plan day by day (Day 1, Day 2, ...) and separate sections with line breaks only.",
        days = params.days,
        destination = place.display_name,
        style = params.style,
        companions = params.companions,
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::num::NonZeroU32;

    #[test]
    fn test_prompt_embeds_all_parameters() {
        let place = PlaceCandidate::named("Tokyo, Japan");
        let params = TripParameters::new(NonZeroU32::new(5).unwrap(), "adventure", "solo");
        let prompt = build_prompt(&place, &params);

        assert!(prompt.contains("5-day"));
        assert!(prompt.contains("Tokyo, Japan"));
        assert!(prompt.contains("Travel style: adventure."));
        assert!(prompt.contains("Travelling with: solo."));
        assert!(prompt.contains("plain text only"));
        assert!(prompt.contains("day by day"));
    }

    #[test]
    fn test_prompt_defaults() {
        let prompt = build_prompt(&PlaceCandidate::named("Rome, Italy"), &TripParameters::default());
        assert!(prompt.contains("3-day"));
        assert!(prompt.contains("Travel style: any."));
        assert!(prompt.contains("Travelling with: any."));
    }
}
