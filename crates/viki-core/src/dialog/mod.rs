//! Multi-turn knowledge lookup layered on single-shot dispatch.
//!
//! Start captures a topic and presents a short summary. The session then
//! moves through explicit steps, each one a single blocking recognition
//! round-trip, until it reaches [`DialogStep::Done`]:
//!
//! ```text
//! AwaitingClarityAnswer --"yes"--> AwaitingMoreInfoAnswer --any--> Done
//!        |   ^                                   (yes: open article link)
//!        |   |
//!       "no" + longer summary
//!        |
//!     other --> Done
//! ```

mod knowledge;

pub use knowledge::KnowledgeLookup;

use crate::{CoreError, actions::ActionExecutor, actions::web_search_url};

use tracing::{debug, info, instrument, warn};

/// Sentence counts and the optional cap on "no" rounds.
#[derive(Debug, Clone)]
pub struct DialogSettings {
    /// Sentences in the first summary.
    pub summary_sentences: usize,
    /// Sentences in each re-explanation after a "no".
    pub detail_sentences: usize,
    /// Stop after this many re-explanations. `None` keeps asking.
    pub max_detail_rounds: Option<u32>,
}

impl Default for DialogSettings {
    fn default() -> Self {
        Self {
            summary_sentences: 3,
            detail_sentences: 5,
            max_detail_rounds: None,
        }
    }
}

/// Where the exchange currently stands.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DialogStep {
    /// Waiting for "is this clear?".
    AwaitingClarityAnswer,
    /// Waiting for "do you want to know more?".
    AwaitingMoreInfoAnswer,
    /// Terminal.
    Done,
}

/// State of one lookup exchange.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DialogState {
    /// The looked-up topic, empty when none was captured.
    pub topic: String,
    /// Current step.
    pub step: DialogStep,
    /// Longer summaries presented so far.
    pub detail_rounds: u32,
}

impl DialogState {
    fn done(topic: impl Into<String>) -> Self {
        Self {
            topic: topic.into(),
            step: DialogStep::Done,
            detail_rounds: 0,
        }
    }
}

/// Drives one lookup exchange on the calling thread.
pub struct DialogSession<'a> {
    executor: &'a ActionExecutor,
}

impl<'a> DialogSession<'a> {
    /// Bind to the executor whose collaborators the exchange uses.
    pub fn new(executor: &'a ActionExecutor) -> Self {
        Self { executor }
    }

    /// Run to completion. Always returns a `Done` state.
    #[instrument(skip(self))]
    pub fn run(&self) -> DialogState {
        let mut state = self.start();
        while state.step != DialogStep::Done {
            state = self.advance(state);
        }
        info!(topic = %state.topic, rounds = state.detail_rounds, "Lookup dialog done");
        state
    }

    /// Capture the topic and present the first summary.
    pub fn start(&self) -> DialogState {
        self.executor.say("What would you like to know about?");

        let Some(question) = self.executor.listen() else {
            self.executor
                .say("i didn't catch your question. please try again");
            return DialogState::done("");
        };

        let topic = question.to_lowercase().replace("wikipedia", "").trim().to_string();
        let sentences = self.executor.dialog_settings().summary_sentences;

        match self.executor.knowledge().summarize(&topic, sentences) {
            Ok(summary) => {
                self.executor.say(&summary);
                DialogState {
                    topic,
                    step: DialogStep::AwaitingClarityAnswer,
                    detail_rounds: 0,
                }
            }
            Err(CoreError::Ambiguous { .. }) => {
                self.executor.say(
                    "there are multiple matches for your query. please be more specific",
                );
                DialogState::done(topic)
            }
            Err(CoreError::NotFound { .. }) => {
                self.executor.say(
                    "i couldn't find any information about that. let me search google for you",
                );
                self.executor.open_url(&web_search_url(&question));
                DialogState::done(topic)
            }
            Err(e) => {
                warn!(error = %e, "Knowledge lookup failed");
                self.executor
                    .say("Sorry, I couldn't reach the knowledge service right now.");
                DialogState::done(topic)
            }
        }
    }

    /// Perform one step: ask, take one answer, transition.
    pub fn advance(&self, state: DialogState) -> DialogState {
        match state.step {
            DialogStep::AwaitingClarityAnswer => self.on_clarity(state),
            DialogStep::AwaitingMoreInfoAnswer => self.on_more_info(state),
            DialogStep::Done => state,
        }
    }

    fn on_clarity(&self, mut state: DialogState) -> DialogState {
        self.executor.say("Is your doubt clear? yes or no");
        let answer = self.answer();

        if answer.contains("yes") {
            state.step = DialogStep::AwaitingMoreInfoAnswer;
            return state;
        }

        if !answer.contains("no") {
            debug!("Clarity answer was neither yes nor no");
            state.step = DialogStep::Done;
            return state;
        }

        let settings = self.executor.dialog_settings();
        if settings
            .max_detail_rounds
            .is_some_and(|cap| state.detail_rounds >= cap)
        {
            self.executor
                .say("I've explained all I can here. Try asking about it differently.");
            state.step = DialogStep::Done;
            return state;
        }

        self.executor.say("let me try to explain it differently");
        match self
            .executor
            .knowledge()
            .summarize(&state.topic, settings.detail_sentences)
        {
            Ok(detail) => {
                self.executor.say(&detail);
                state.detail_rounds += 1;
            }
            Err(e) => {
                warn!(error = %e, "Detailed lookup failed");
                self.executor
                    .say("Sorry, I couldn't find a longer explanation.");
                state.step = DialogStep::Done;
            }
        }
        state
    }

    fn on_more_info(&self, mut state: DialogState) -> DialogState {
        self.executor
            .say("Do you want to know more about this topic? yes or no");

        if self.answer().contains("yes") {
            match self.executor.knowledge().resolve_link(&state.topic) {
                Ok(url) => {
                    if self.executor.open_url(&url) {
                        self.executor.say(
                            "I have opened the wikipedia page for more detailed information",
                        );
                    }
                }
                Err(e) => {
                    warn!(error = %e, "Article link lookup failed");
                    self.executor.say("Sorry, I couldn't find the article page.");
                }
            }
        }

        state.step = DialogStep::Done;
        state
    }

    /// Lower-cased answer, empty when nothing was captured.
    fn answer(&self) -> String {
        self.executor
            .listen()
            .map(|a| a.to_lowercase())
            .unwrap_or_default()
    }
}
