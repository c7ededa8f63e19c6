/// Hard-coded behaviours tried after the custom commands.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IntentKind {
    /// Greets the user.
    Greeting,
    /// Says the assistant's name.
    Name,
    /// Says the current time on a 12-hour clock.
    Clock,
    /// Opens the Google home page.
    OpenGoogle,
    /// Starts Notepad.
    OpenNotepad,
    /// Starts the calculator.
    OpenCalculator,
    /// Starts Microsoft Word.
    OpenWord,
    /// Starts Microsoft Excel.
    OpenExcel,
    /// Starts Google Chrome.
    OpenChrome,
    /// Opens YouTube.
    OpenYoutube,
    /// Opens the workout site.
    Workout,
    /// Asks for a song and opens a YouTube search for it.
    PlayMusic,
    /// Web search for the rest of the query.
    Search,
    /// Multi-turn knowledge lookup.
    Wikipedia,
    /// Says goodbye. Never exits the process.
    Farewell,
}

/// One keyword predicate bound to a behaviour.
#[derive(Debug, Clone, Copy)]
pub struct BuiltinIntent {
    /// Phrases searched for anywhere in the normalized query.
    pub keywords: &'static [&'static str],
    /// Behaviour fired when any keyword is present.
    pub kind: IntentKind,
}

impl BuiltinIntent {
    /// Plain substring test, no word boundary.
    pub fn matches(&self, normalized_query: &str) -> bool {
        self.keywords.iter().any(|k| normalized_query.contains(k))
    }
}

/// Fixed evaluation order. Earlier entries win when several match.
pub const BUILTIN_INTENTS: &[BuiltinIntent] = &[
    BuiltinIntent { keywords: &["hello"], kind: IntentKind::Greeting },
    BuiltinIntent { keywords: &["what's your name"], kind: IntentKind::Name },
    BuiltinIntent { keywords: &["what is the time"], kind: IntentKind::Clock },
    BuiltinIntent { keywords: &["open google"], kind: IntentKind::OpenGoogle },
    BuiltinIntent { keywords: &["open notepad"], kind: IntentKind::OpenNotepad },
    BuiltinIntent { keywords: &["open calculator"], kind: IntentKind::OpenCalculator },
    BuiltinIntent { keywords: &["open word"], kind: IntentKind::OpenWord },
    BuiltinIntent { keywords: &["open excel"], kind: IntentKind::OpenExcel },
    BuiltinIntent { keywords: &["open chrome"], kind: IntentKind::OpenChrome },
    BuiltinIntent { keywords: &["open youtube"], kind: IntentKind::OpenYoutube },
    BuiltinIntent { keywords: &["time for workout", "start workout"], kind: IntentKind::Workout },
    BuiltinIntent { keywords: &["play music"], kind: IntentKind::PlayMusic },
    BuiltinIntent { keywords: &["search"], kind: IntentKind::Search },
    BuiltinIntent { keywords: &["wikipedia"], kind: IntentKind::Wikipedia },
    BuiltinIntent { keywords: &["exit", "stop", "quit"], kind: IntentKind::Farewell },
];
