use crate::config::{DEFAULT_DETAIL_SENTENCES, DEFAULT_SUMMARY_SENTENCES};

use serde::{Deserialize, Serialize};
use viki_core::dialog::DialogSettings;

/// Lookup dialog configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DialogConfig {
    /// Sentences in the first summary.
    #[serde(default = "default_summary_sentences")]
    pub summary_sentences: usize,

    /// Sentences in each re-explanation.
    #[serde(default = "default_detail_sentences")]
    pub detail_sentences: usize,

    /// Cap on "no" answers. Absent means unbounded.
    #[serde(default)]
    pub max_detail_rounds: Option<u32>,
}

impl DialogConfig {
    /// Settings for the dialog session.
    pub fn dialog_settings(&self) -> DialogSettings {
        DialogSettings {
            summary_sentences: self.summary_sentences,
            detail_sentences: self.detail_sentences,
            max_detail_rounds: self.max_detail_rounds,
        }
    }
}

impl Default for DialogConfig {
    fn default() -> Self {
        Self {
            summary_sentences: DEFAULT_SUMMARY_SENTENCES,
            detail_sentences: DEFAULT_DETAIL_SENTENCES,
            max_detail_rounds: None,
        }
    }
}

fn default_summary_sentences() -> usize {
    DEFAULT_SUMMARY_SENTENCES
}

fn default_detail_sentences() -> usize {
    DEFAULT_DETAIL_SENTENCES
}
