use serde::{Deserialize, Serialize};

/// Encyclopedia lookup configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct KnowledgeConfig {
    /// MediaWiki `api.php` endpoint.
    #[serde(default = "default_api_endpoint")]
    pub api_endpoint: String,

    /// Prefix that article titles are appended to.
    #[serde(default = "default_article_base")]
    pub article_base: String,

    /// Per-request timeout.
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
}

impl Default for KnowledgeConfig {
    fn default() -> Self {
        Self {
            api_endpoint: default_api_endpoint(),
            article_base: default_article_base(),
            timeout_secs: default_timeout_secs(),
        }
    }
}

fn default_api_endpoint() -> String {
    "https://en.wikipedia.org/w/api.php".to_string()
}

fn default_article_base() -> String {
    "https://en.wikipedia.org/wiki/".to_string()
}

fn default_timeout_secs() -> u64 {
    10
}
