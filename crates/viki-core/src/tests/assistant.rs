use crate::{
    Assistant, AssistantSettings, Collaborators, CoreError,
    commands::{CommandRegistry, CommandStore},
    mailbox::{Author, ControlSignal, IndicatorColor, Mailbox, MailboxEvent, MailboxReceiver, Status},
    session::{Camera, ListeningSettings, VideoFormat, VideoSettings, VideoState},
    tests::support::{
        CountingSinks, GatedCamera, GatedSpeech, RecordingLauncher, RecordingSpeaker,
        ScriptedKnowledge, ScriptedSpeech, UnpluggedCamera, WAIT, messages, test_frame,
        wait_until,
    },
    speech::SpeechInput,
};

use std::{sync::Arc, time::Duration};

use tempfile::TempDir;

fn assistant(
    dir: &TempDir,
    speech: Arc<dyn SpeechInput>,
    camera: Arc<dyn Camera>,
) -> (Assistant, MailboxReceiver) {
    let (mailbox, events) = Mailbox::channel();
    let registry = Arc::new(CommandRegistry::with_store(
        CommandStore::new(),
        &dir.path().join("commands.json"),
        &dir.path().join("commands.txt"),
    ));
    let collaborators = Collaborators {
        speech_in: speech,
        speech_out: Arc::new(RecordingSpeaker::default()),
        launcher: Arc::new(RecordingLauncher::default()),
        knowledge: Arc::new(ScriptedKnowledge::default()),
        camera,
        sinks: Arc::new(CountingSinks::default()),
    };
    let settings = AssistantSettings {
        listening: ListeningSettings {
            yield_interval: Duration::from_millis(5),
            unavailable_backoff: Duration::from_millis(20),
        },
        video: VideoSettings {
            fps: 500,
            frame_size: (16, 12),
            recordings_dir: dir.path().join("recordings"),
            photos_dir: dir.path().join("photos"),
        },
        ..AssistantSettings::default()
    };
    (
        Assistant::new(registry, collaborators, mailbox, settings),
        events,
    )
}

/// WHAT: Photo capture before any frame fails with NoFrame
/// WHY: A photo needs a current frame
#[test]
#[allow(clippy::unwrap_used)]
fn given_no_frame_when_capturing_photo_then_no_frame_error() {
    // Given: Video mode never started
    let dir = TempDir::new().unwrap();
    let (assistant, _events) = assistant(
        &dir,
        Arc::new(ScriptedSpeech::default()),
        Arc::new(UnpluggedCamera),
    );

    // When: Capturing a photo
    let result = assistant.capture_photo();

    // Then: NoFrame
    assert!(matches!(result, Err(CoreError::NoFrame { .. })));
}

/// WHAT: Photo capture writes the latest frame as a timestamped PNG
/// WHY: viki_photo_<unix>.png in the photos directory
#[test]
#[allow(clippy::unwrap_used)]
fn given_video_frame_when_capturing_photo_then_png_written() {
    // Given: Video mode with one frame delivered
    let dir = TempDir::new().unwrap();
    let (camera, gate) = GatedCamera::new();
    let (assistant, events) = assistant(
        &dir,
        Arc::new(ScriptedSpeech::default()),
        Arc::new(camera),
    );
    assert!(assistant.toggle_video_mode().unwrap());
    gate.ready.recv_timeout(WAIT).unwrap();
    gate.frames.send(test_frame()).unwrap();
    gate.ready.recv_timeout(WAIT).unwrap();

    // When: Capturing a photo
    let path = assistant.capture_photo().unwrap();

    // Then: PNG on disk, announced
    let name = path.file_name().unwrap().to_string_lossy().into_owned();
    assert!(name.starts_with("viki_photo_") && name.ends_with(".png"));
    assert!(path.starts_with(dir.path().join("photos")));
    assert!(path.is_file());
    let said = messages(&events.drain());
    assert!(said.iter().any(|(_, text)| text
        == &format!("Photo captured and saved as {}", path.display())));

    // When: Toggling video off
    assert!(!assistant.toggle_video_mode().unwrap());
    drop(gate);

    // Then: Off
    assert!(wait_until(|| assistant.video_state() == VideoState::Off));
}

/// WHAT: Recording requires video mode
/// WHY: StartRecording is only valid from Previewing
#[test]
#[allow(clippy::unwrap_used)]
fn given_video_off_when_starting_recording_then_invalid_state() {
    // Given: No video session
    let dir = TempDir::new().unwrap();
    let (assistant, _events) = assistant(
        &dir,
        Arc::new(ScriptedSpeech::default()),
        Arc::new(UnpluggedCamera),
    );

    // When/Then
    assert!(matches!(
        assistant.start_recording(VideoFormat::Mp4),
        Err(CoreError::InvalidState { .. })
    ));
    assert!(matches!(
        assistant.stop_recording(),
        Err(CoreError::InvalidState { .. })
    ));
}

/// WHAT: Typed dispatch echoes the text, shows Processing, then returns to Idle
/// WHY: Typed commands get the same feedback as spoken ones
#[test]
#[allow(clippy::unwrap_used)]
fn given_typed_text_when_dispatching_then_feedback_wraps_the_command() {
    // Given: An assistant
    let dir = TempDir::new().unwrap();
    let (assistant, events) = assistant(
        &dir,
        Arc::new(ScriptedSpeech::default()),
        Arc::new(UnpluggedCamera),
    );

    // When: Typing a greeting and waiting for the dispatch thread
    let handle = assistant.dispatch_typed("  hello  ").unwrap();
    handle.join().unwrap();

    // Then: user line, Processing/orange, reply, Idle/gray, DispatchFinished
    let drained = events.drain();
    assert!(matches!(
        drained.as_slice(),
        [
            MailboxEvent::Message {
                sender: Author::User,
                ..
            },
            MailboxEvent::StatusChanged {
                state: Status::Processing
            },
            MailboxEvent::IndicatorChanged {
                color: IndicatorColor::Orange
            },
            MailboxEvent::Message {
                sender: Author::Assistant,
                ..
            },
            MailboxEvent::StatusChanged {
                state: Status::Idle
            },
            MailboxEvent::IndicatorChanged {
                color: IndicatorColor::Gray
            },
            MailboxEvent::ControlSignal {
                kind: ControlSignal::DispatchFinished
            },
        ]
    ));
    assert_eq!(messages(&drained)[0].1, "hello");
    assert!(assistant.dispatch_typed("   ").is_none());
}

/// WHAT: Registry operations announce success and report failure
/// WHY: The UI shows a notice or a user-facing error
#[test]
#[allow(clippy::unwrap_used)]
fn given_command_edits_when_applied_then_notices_and_errors() {
    // Given: An assistant with an empty registry
    let dir = TempDir::new().unwrap();
    let (assistant, events) = assistant(
        &dir,
        Arc::new(ScriptedSpeech::default()),
        Arc::new(UnpluggedCamera),
    );

    // When: Adding, updating, deleting, then deleting again
    assistant.add_command("open notes", "web://notes.example").unwrap();
    assistant.update_command("open notes", "web://notes2.example").unwrap();
    assistant.delete_command("open notes").unwrap();
    let missing = assistant.delete_command("open notes").unwrap_err();

    // Then: Three notices and a readable error
    let said: Vec<String> = messages(&events.drain()).into_iter().map(|m| m.1).collect();
    assert_eq!(
        said,
        vec![
            "Command 'open notes' added.",
            "Command 'open notes' updated.",
            "Command 'open notes' deleted.",
        ]
    );
    assert_eq!(missing.user_message(), "No command named 'open notes'.");
    assert!(assistant.commands().is_empty());
}

/// WHAT: Program and file targets must exist when a command is saved
/// WHY: A typo in a path is caught while the user is still editing
#[test]
#[allow(clippy::unwrap_used)]
fn given_missing_path_target_when_adding_then_rejected_and_store_unchanged() {
    // Given: An assistant and one real file
    let dir = TempDir::new().unwrap();
    let (assistant, events) = assistant(
        &dir,
        Arc::new(ScriptedSpeech::default()),
        Arc::new(UnpluggedCamera),
    );
    let real = dir.path().join("notes.txt");
    std::fs::write(&real, "notes").unwrap();
    let missing = dir.path().join("absent.exe");

    // When: Adding a missing program, then the real file, then updating to a missing file
    let rejected = assistant
        .add_command("start game", missing.to_str().unwrap())
        .unwrap_err();
    assistant
        .add_command("open notes", real.to_str().unwrap())
        .unwrap();
    let update = assistant.update_command("open notes", dir.path().join("gone.txt").to_str().unwrap());

    // Then: Both missing paths are refused with the same message, the real file is kept
    assert!(matches!(rejected, CoreError::InvalidTarget { .. }));
    assert_eq!(
        rejected.user_message(),
        "Please select a valid file for the application path."
    );
    assert!(matches!(update, Err(CoreError::InvalidTarget { .. })));
    let store = assistant.commands();
    assert_eq!(store.len(), 1);
    assert_eq!(
        store.get("open notes"),
        Some(&crate::ActionTarget::File(real.clone()))
    );
    let said: Vec<String> = messages(&events.drain()).into_iter().map(|m| m.1).collect();
    assert_eq!(said, vec!["Command 'open notes' added."]);
}

/// WHAT: Toggling listening starts and stops a single loop
/// WHY: Start/Stop are driven from the hotkey and the tray
#[test]
#[allow(clippy::unwrap_used)]
fn given_assistant_when_toggling_listening_then_loop_starts_and_stops() {
    // Given: A gated recognizer
    let dir = TempDir::new().unwrap();
    let (speech, gate) = GatedSpeech::new();
    let (assistant, events) = assistant(&dir, Arc::new(speech), Arc::new(UnpluggedCamera));

    // When: Toggling on
    assert!(assistant.toggle_listening().unwrap());
    gate.entered.recv_timeout(WAIT).unwrap();
    assert!(assistant.is_listening());

    // When: Toggling off while capturing, then releasing the capture
    assert!(!assistant.toggle_listening().unwrap());
    assert!(!assistant.is_listening());
    gate.replies.send(None).unwrap();

    // Then: The in-flight capture finishes, no second capture starts
    assert!(wait_until(|| {
        messages(&events.drain())
            .iter()
            .any(|(_, t)| t == "Sorry, I didn't catch that.")
    }));
    std::thread::sleep(Duration::from_millis(30));
    assert!(gate.entered.try_recv().is_err());
    assistant.shutdown();
}
