//! Storyteller prompt for a set of photos and their context.

/// Fixed instructions sent ahead of the memory's context lines.
pub const STORY_INSTRUCTIONS: &str = "You are a compassionate storyteller. You receive a sequence of photos \
and the contextual details of one memory (date, weather, place). Craft a vivid, coherent narrative \
that connects all of the photos into a single memory, written in the first person. Avoid bullet \
points and refer to visual details from the images when possible.";

/// Instructions, a blank line, then `Date:`, `Weather:` and `Location:` lines.
pub fn build_story_prompt(date: &str, weather: &str, location: &str) -> String {
    format!(
        "{}\n\nDate: {}\nWeather: {}\nLocation: {}\n",
        STORY_INSTRUCTIONS,
        date.trim(),
        weather.trim(),
        location.trim()
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_prompt_contains_context_lines() {
        let prompt = build_story_prompt("2024-05-01", " sunny ", "Park");
        assert!(prompt.starts_with(STORY_INSTRUCTIONS));
        assert!(prompt.contains("\nDate: 2024-05-01\n"));
        assert!(prompt.contains("\nWeather: sunny\n"));
        assert!(prompt.ends_with("Location: Park\n"));
    }
}
