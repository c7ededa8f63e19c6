use crate::{
    actions::web_search_url,
    commands::{ActionTarget, CommandRegistry, CommandStore, IntentKind, Resolution},
    dialog::DialogSettings,
    mailbox::Author,
    tests::support::{Harness, RecordingLauncher, ScriptedKnowledge, ScriptedSpeech, messages},
};

use std::sync::Arc;

use tempfile::TempDir;

#[allow(clippy::unwrap_used)]
fn registry(dir: &TempDir, entries: &[(&str, &str)]) -> CommandRegistry {
    let registry = CommandRegistry::with_store(
        CommandStore::new(),
        &dir.path().join("commands.json"),
        &dir.path().join("commands.txt"),
    );
    for (trigger, target) in entries {
        registry.add(trigger, target).unwrap();
    }
    registry
}

/// WHAT: The clock intent answers with a 12-hour time
/// WHY: Built-in scenario with an empty store
#[test]
#[allow(clippy::unwrap_used)]
fn given_empty_store_when_asking_the_time_then_twelve_hour_clock_message() {
    // Given: Empty store
    let dir = TempDir::new().unwrap();
    let registry = registry(&dir, &[]);
    let harness = Harness::new(Arc::new(ScriptedSpeech::default()));
    let executor = harness.executor(DialogSettings::default());

    // When: Dispatching the clock phrase
    let resolution = executor.dispatch(&registry, "what is the time");

    // Then: One assistant message "It's HH:MM AM/PM right now."
    assert!(matches!(
        resolution,
        Resolution::Builtin {
            kind: IntentKind::Clock,
            ..
        }
    ));
    let said = messages(&harness.events.drain());
    assert_eq!(said.len(), 1);
    let (author, text) = &said[0];
    assert_eq!(*author, Author::Assistant);
    let clock = text
        .strip_prefix("It's ")
        .and_then(|t| t.strip_suffix(" right now."))
        .unwrap();
    let (time, meridiem) = clock.split_once(' ').unwrap();
    assert!(meridiem == "AM" || meridiem == "PM");
    let (hour, minute) = time.split_once(':').unwrap();
    let hour: u32 = hour.parse().unwrap();
    let minute: u32 = minute.parse().unwrap();
    assert!((1..=12).contains(&hour));
    assert!(minute < 60);
    assert_eq!(harness.spoken(), vec![text.clone()]);
}

/// WHAT: A web app command opens the web app and announces it
/// WHY: Custom-target feedback
#[test]
#[allow(clippy::unwrap_used)]
fn given_web_app_command_when_dispatching_then_launcher_receives_web_app() {
    // Given: {"open notes": "web://notepad.example"}
    let dir = TempDir::new().unwrap();
    let registry = registry(&dir, &[("open notes", "web://notepad.example")]);
    let harness = Harness::new(Arc::new(ScriptedSpeech::default()));
    let executor = harness.executor(DialogSettings::default());

    // When: Dispatching a sentence around the trigger
    executor.dispatch(&registry, "please open notes for me");

    // Then: Web app launched and announced
    assert_eq!(
        harness.launcher.launched(),
        vec![ActionTarget::WebApp("notepad.example".to_string())]
    );
    assert_eq!(
        harness.spoken(),
        vec!["Opening web application notepad.example".to_string()]
    );
}

/// WHAT: A command pointing at a missing path reports it and launches nothing
/// WHY: Non-existent paths become a user-facing notification
#[test]
#[allow(clippy::unwrap_used)]
fn given_missing_path_command_when_dispatching_then_path_not_found_notice() {
    // Given: A command to a file that does not exist
    let dir = TempDir::new().unwrap();
    let missing = dir.path().join("nowhere").join("report.pdf");
    let registry = registry(&dir, &[("report", missing.to_str().unwrap())]);
    let harness = Harness::new(Arc::new(ScriptedSpeech::default()));
    let executor = harness.executor(DialogSettings::default());

    // When: Dispatching
    executor.dispatch(&registry, "report");

    // Then: Notice, no launch
    assert!(harness.launcher.launched().is_empty());
    assert_eq!(
        harness.spoken(),
        vec![format!("The path {} does not exist.", missing.display())]
    );
}

/// WHAT: An existing file opens with "Opening file"
/// WHY: Files and executables get different feedback
#[test]
#[allow(clippy::unwrap_used)]
fn given_existing_file_command_when_dispatching_then_file_opened() {
    // Given: A real file
    let dir = TempDir::new().unwrap();
    let file = dir.path().join("notes.txt");
    std::fs::write(&file, "hi").unwrap();
    let registry = registry(&dir, &[("my notes", file.to_str().unwrap())]);
    let harness = Harness::new(Arc::new(ScriptedSpeech::default()));
    let executor = harness.executor(DialogSettings::default());

    // When: Dispatching
    executor.dispatch(&registry, "show my notes");

    // Then: Launched as a file
    assert_eq!(harness.launcher.launched(), vec![ActionTarget::File(file.clone())]);
    assert_eq!(
        harness.spoken(),
        vec![format!("Opening file {}", file.display())]
    );
}

/// WHAT: A program that is not installed is reported by name
/// WHY: Launcher NotFound is transient, not fatal
#[test]
#[allow(clippy::unwrap_used)]
fn given_uninstalled_program_when_opening_then_not_installed_notice() {
    // Given: Launcher without notepad
    let dir = TempDir::new().unwrap();
    let registry = registry(&dir, &[]);
    let launcher = RecordingLauncher {
        missing: vec!["notepad.exe".to_string()],
        ..RecordingLauncher::default()
    };
    let harness = Harness::with(
        Arc::new(ScriptedSpeech::default()),
        launcher,
        ScriptedKnowledge::default(),
    );
    let executor = harness.executor(DialogSettings::default());

    // When: Asking for notepad
    executor.dispatch(&registry, "open notepad");

    // Then: Not-installed notice
    assert_eq!(
        harness.spoken(),
        vec!["Notepad is not installed on this computer".to_string()]
    );
}

/// WHAT: Search opens a results page for the words after "search"
/// WHY: The keyword itself is not part of the query
#[test]
#[allow(clippy::unwrap_used)]
fn given_search_phrase_when_dispatching_then_results_page_opened() {
    // Given: Empty store
    let dir = TempDir::new().unwrap();
    let registry = registry(&dir, &[]);
    let harness = Harness::new(Arc::new(ScriptedSpeech::default()));
    let executor = harness.executor(DialogSettings::default());

    // When: Searching
    executor.dispatch(&registry, "search rust borrow checker");

    // Then: Launcher got the search URL
    assert_eq!(
        harness.launcher.launched(),
        vec![ActionTarget::WebApp(web_search_url("rust borrow checker"))]
    );
    assert!(web_search_url("rust borrow checker").contains("q=rust+borrow+checker"));
}

/// WHAT: Play music asks for a song, then opens a YouTube search
/// WHY: One follow-up recognition round-trip on the calling thread
#[test]
#[allow(clippy::unwrap_used)]
fn given_play_music_when_song_named_then_youtube_search_opened() {
    // Given: The user will answer with a song
    let dir = TempDir::new().unwrap();
    let registry = registry(&dir, &[]);
    let harness = Harness::new(Arc::new(ScriptedSpeech::saying(&["bohemian rhapsody"])));
    let executor = harness.executor(DialogSettings::default());

    // When: Asking for music
    executor.dispatch(&registry, "play music");

    // Then: Question, user echo, YouTube search, confirmation
    let launched = harness.launcher.launched();
    assert_eq!(launched.len(), 1);
    assert!(launched[0].encode().contains("youtube.com/results"));
    let said = messages(&harness.events.drain());
    assert_eq!(
        said,
        vec![
            (
                Author::Assistant,
                "What song would you like me to play?".to_string()
            ),
            (Author::User, "bohemian rhapsody".to_string()),
            (
                Author::Assistant,
                "Playing bohemian rhapsody from YouTube".to_string()
            ),
        ]
    );
}

/// WHAT: Farewell says goodbye and nothing else
/// WHY: The embedded core never exits the process
#[test]
#[allow(clippy::unwrap_used)]
fn given_farewell_when_dispatching_then_goodbye_only() {
    // Given: Empty store
    let dir = TempDir::new().unwrap();
    let registry = registry(&dir, &[]);
    let harness = Harness::new(Arc::new(ScriptedSpeech::default()));
    let executor = harness.executor(DialogSettings::default());

    // When: Saying exit
    executor.dispatch(&registry, "exit");

    // Then: Goodbye
    assert_eq!(harness.spoken(), vec!["goodbye!".to_string()]);
    assert!(harness.launcher.launched().is_empty());
}

/// WHAT: Unmatched queries do nothing
/// WHY: No match is a silent no-op, not an error
#[test]
#[allow(clippy::unwrap_used)]
fn given_unmatched_query_when_dispatching_then_silent() {
    // Given: Empty store
    let dir = TempDir::new().unwrap();
    let registry = registry(&dir, &[]);
    let harness = Harness::new(Arc::new(ScriptedSpeech::default()));
    let executor = harness.executor(DialogSettings::default());

    // When: Dispatching gibberish
    let resolution = executor.dispatch(&registry, "blorp flim");

    // Then: Nothing at all
    assert_eq!(resolution, Resolution::NoMatch);
    assert!(harness.events.drain().is_empty());
    assert!(harness.launcher.launched().is_empty());
}
