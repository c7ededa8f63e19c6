//! Performs a resolved command through the external collaborators.
//!
//! Runs on whichever worker thread called dispatch, including any dialog the
//! command starts. Collaborator failures are turned into spoken/chat notices
//! here and never propagate further.

use crate::{
    CoreError,
    actions::{
        GOOGLE_HOME, Launcher, WORKOUT_URL, YOUTUBE_HOME, web_search_url, youtube_search_url,
    },
    commands::{ActionTarget, CommandRegistry, IntentKind, Resolution, TriggerPhrase},
    dialog::{DialogSession, DialogSettings, DialogState, KnowledgeLookup},
    mailbox::Mailbox,
    speech::{SpeechInput, SpeechOutput},
};

use std::{panic::Location, path::PathBuf, sync::Arc};

use error_location::ErrorLocation;
use tracing::{debug, info, instrument, warn};

const CHROME_PATH: &str = r"C:\Program Files\Google\Chrome\Application\chrome.exe";

/// Executes resolutions and owns the collaborator handles a dispatch needs.
///
/// Cheap to clone; every worker thread gets its own copy.
#[derive(Clone)]
pub struct ActionExecutor {
    speech_in: Arc<dyn SpeechInput>,
    speech_out: Arc<dyn SpeechOutput>,
    launcher: Arc<dyn Launcher>,
    knowledge: Arc<dyn KnowledgeLookup>,
    mailbox: Mailbox,
    dialog: DialogSettings,
}

impl ActionExecutor {
    /// Bundle the collaborators.
    pub fn new(
        speech_in: Arc<dyn SpeechInput>,
        speech_out: Arc<dyn SpeechOutput>,
        launcher: Arc<dyn Launcher>,
        knowledge: Arc<dyn KnowledgeLookup>,
        mailbox: Mailbox,
        dialog: DialogSettings,
    ) -> Self {
        Self {
            speech_in,
            speech_out,
            launcher,
            knowledge,
            mailbox,
            dialog,
        }
    }

    /// Resolve `query` against `registry` and execute the result.
    ///
    /// Returns what was resolved; `NoMatch` did nothing.
    #[instrument(skip(self, registry))]
    pub fn dispatch(&self, registry: &CommandRegistry, query: &str) -> Resolution {
        let resolution = registry.resolve(query);
        self.execute(&resolution);
        resolution
    }

    /// Execute an already resolved command.
    pub fn execute(&self, resolution: &Resolution) {
        match resolution {
            Resolution::Custom { trigger, target } => self.run_custom(trigger, target),
            Resolution::Builtin { kind, query } => self.run_builtin(*kind, query),
            Resolution::NoMatch => debug!("No command matched"),
        }
    }

    /// Speak `text` and mirror it to the chat.
    pub fn say(&self, text: &str) {
        self.mailbox.notice(text);
        self.speech_out.speak(text);
    }

    /// One recognition round-trip for a follow-up answer.
    ///
    /// Failures are reported to the user and read as "no answer".
    pub fn listen(&self) -> Option<String> {
        match self.speech_in.capture() {
            Ok(transcript) => {
                self.mailbox.user(transcript.text.clone());
                Some(transcript.text)
            }
            Err(CoreError::NoSpeechDetected { .. }) => {
                self.say("Sorry, I didn't catch that.");
                None
            }
            Err(CoreError::ServiceUnavailable { reason, .. }) => {
                warn!(reason = %reason, "Speech service unavailable during follow-up");
                self.mailbox
                    .notice(format!("Could not request results; {}", reason));
                None
            }
            Err(e) => {
                warn!(error = %e, "Follow-up capture failed");
                None
            }
        }
    }

    /// The mailbox this executor posts to.
    pub fn mailbox(&self) -> &Mailbox {
        &self.mailbox
    }

    /// The speech recognizer shared with the listening loop.
    pub fn speech_input(&self) -> &Arc<dyn SpeechInput> {
        &self.speech_in
    }

    pub(crate) fn knowledge(&self) -> &dyn KnowledgeLookup {
        self.knowledge.as_ref()
    }

    pub(crate) fn dialog_settings(&self) -> &DialogSettings {
        &self.dialog
    }

    /// Open a URL, reporting failure in the chat.
    pub(crate) fn open_url(&self, url: &str) -> bool {
        match self.launcher.launch(&ActionTarget::WebApp(url.to_string())) {
            Ok(()) => true,
            Err(e) => {
                warn!(url = %url, error = %e, "Failed to open URL");
                self.say("Sorry, I had trouble opening the page.");
                false
            }
        }
    }

    #[instrument(skip(self))]
    fn run_custom(&self, trigger: &TriggerPhrase, target: &ActionTarget) {
        info!(trigger = %trigger, target = %target, "Custom command matched");

        match target {
            ActionTarget::WebApp(name) => {
                self.say(&format!("Opening web application {}", name));
                if let Err(e) = self.launcher.launch(target) {
                    warn!(error = %e, "Failed to open web application");
                    self.say(&format!("Failed to open {}.", name));
                }
            }
            ActionTarget::Executable(path) | ActionTarget::File(path) => {
                let shown = path.display().to_string();
                if !path.is_file() {
                    let missing = CoreError::PathNotFound {
                        path: path.clone(),
                        location: ErrorLocation::from(Location::caller()),
                    };
                    warn!(error = %missing, "Custom command target missing");
                    self.say(&format!("The path {} does not exist.", shown));
                    return;
                }

                match self.launcher.launch(target) {
                    Ok(()) if matches!(target, ActionTarget::Executable(_)) => {
                        self.say(&format!("Opening {}", shown));
                    }
                    Ok(()) => self.say(&format!("Opening file {}", shown)),
                    Err(e) => {
                        warn!(error = %e, "Failed to open custom command target");
                        self.say(&format!("Failed to open {}.", shown));
                    }
                }
            }
        }
    }

    #[instrument(skip(self))]
    fn run_builtin(&self, kind: IntentKind, query: &str) {
        info!(intent = ?kind, "Built-in intent matched");

        match kind {
            IntentKind::Greeting => self.say("Hey there! What can I do for you today?"),
            IntentKind::Name => self.say("I'm Viki, your friendly assistant. How can I help?"),
            IntentKind::Clock => {
                let now = chrono::Local::now().format("%I:%M %p");
                self.say(&format!("It's {} right now.", now));
            }
            IntentKind::OpenGoogle => {
                self.open_url(GOOGLE_HOME);
            }
            IntentKind::OpenNotepad => self.start_program("notepad.exe", "Notepad"),
            IntentKind::OpenCalculator => self.start_program("calc.exe", "Calculator"),
            IntentKind::OpenWord => self.start_program("winword.exe", "Microsoft Word"),
            IntentKind::OpenExcel => self.start_program("excel.exe", "Microsoft Excel"),
            IntentKind::OpenChrome => {
                self.say("Opening Google Chrome");
                let chrome = ActionTarget::Executable(PathBuf::from(CHROME_PATH));
                if let Err(e) = self.launcher.launch(&chrome) {
                    warn!(error = %e, "Chrome launch failed");
                    self.say("Chrome browser not found on your system.");
                }
            }
            IntentKind::OpenYoutube => {
                if self.open_url(YOUTUBE_HOME) {
                    self.say("Opening YouTube");
                }
            }
            IntentKind::Workout => {
                if self.open_url(WORKOUT_URL) {
                    self.say("Time for a workout!");
                }
            }
            IntentKind::PlayMusic => self.play_music(),
            IntentKind::Search => {
                let terms = query.replace("search", "");
                let terms = terms.trim();
                if !terms.is_empty() && self.open_url(&web_search_url(terms)) {
                    self.say("The search results are on your screen.");
                }
            }
            IntentKind::Wikipedia => {
                let finished: DialogState = DialogSession::new(self).run();
                debug!(topic = %finished.topic, "Lookup dialog finished");
            }
            IntentKind::Farewell => self.say("goodbye!"),
        }
    }

    fn start_program(&self, program: &str, label: &str) {
        let target = ActionTarget::Executable(PathBuf::from(program));
        match self.launcher.launch(&target) {
            Ok(()) => self.say(&format!("Opening {}", label)),
            Err(CoreError::NotFound { .. }) => {
                self.say(&format!("{} is not installed on this computer", label));
            }
            Err(e) => {
                warn!(program, error = %e, "Program launch failed");
                self.say(&format!("Failed to open {}.", label));
            }
        }
    }

    fn play_music(&self) {
        self.say("What song would you like me to play?");
        let Some(song) = self.listen() else {
            return;
        };
        if self.open_url(&youtube_search_url(&song)) {
            self.say(&format!("Playing {} from YouTube", song));
        }
    }
}
