use viki_core::session::VideoFormat;

/// Requests from the hotkey, the tray menu and the console to the shell.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ShellCommand {
    /// Run typed text as a command.
    Dispatch(String),
    /// Register a new trigger.
    AddCommand {
        /// Trigger phrase.
        trigger: String,
        /// Stored target string.
        target: String,
    },
    /// Replace the target of an existing trigger.
    UpdateCommand {
        /// Trigger phrase.
        trigger: String,
        /// Stored target string.
        target: String,
    },
    /// Remove a trigger.
    DeleteCommand {
        /// Trigger phrase.
        trigger: String,
    },
    /// Print the registered triggers.
    ListCommands,
    /// Start the listening loop.
    StartListening,
    /// Stop the listening loop.
    StopListening,
    /// Start or stop the listening loop.
    ToggleListening,
    /// Enter or leave video mode.
    ToggleVideo,
    /// Start recording; `None` uses the configured format.
    StartRecording(Option<VideoFormat>),
    /// Stop the recording.
    StopRecording,
    /// Save the current frame as a photo.
    CapturePhoto,
    /// Print the console help.
    Help,
    /// Request application shutdown.
    Shutdown,
}
