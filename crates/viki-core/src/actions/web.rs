use url::Url;

/// Opened by the "open google" intent.
pub const GOOGLE_HOME: &str = "https://www.google.com";
/// Opened by the "open youtube" intent.
pub const YOUTUBE_HOME: &str = "https://www.youtube.com/";
/// Opened by the workout intents.
pub const WORKOUT_URL: &str = "https://workout.lol/";

const GOOGLE_SEARCH: &str = "https://www.google.com/search";
const YOUTUBE_RESULTS: &str = "https://www.youtube.com/results";

/// Google results page for `query`, query string encoded.
pub fn web_search_url(query: &str) -> String {
    with_query(GOOGLE_SEARCH, "q", query)
}

/// YouTube results page for `query`.
pub fn youtube_search_url(query: &str) -> String {
    with_query(YOUTUBE_RESULTS, "search_query", query)
}

fn with_query(base: &str, key: &str, value: &str) -> String {
    match Url::parse_with_params(base, &[(key, value)]) {
        Ok(url) => url.into(),
        // Both bases are constant, valid URLs.
        Err(_) => base.to_string(),
    }
}
