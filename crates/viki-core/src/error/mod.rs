use std::{panic::Location, path::PathBuf};

use error_location::ErrorLocation;
use thiserror::Error;

/// Assistant core errors with source location tracking.
///
/// Transient variants (speech, lookup, device, sink, path) are converted into
/// a Mailbox notice at the call site that produced them. None of them is fatal.
#[derive(Error, Debug)]
pub enum CoreError {
    /// The durable command file exists but could not be decoded.
    #[error("Command store is corrupt: {reason} {location}")]
    CorruptStore {
        /// Decoder message.
        reason: String,
        /// Source location where error occurred.
        location: ErrorLocation,
    },

    /// IO error from filesystem operations.
    #[error("IO error: {source} {location}")]
    Io {
        /// The underlying IO error.
        #[source]
        source: std::io::Error,
        /// Source location where error occurred.
        location: ErrorLocation,
    },

    /// JSON encoding of the command store failed.
    #[error("Serialization error: {reason} {location}")]
    Serialization {
        /// Encoder message.
        reason: String,
        /// Source location where error occurred.
        location: ErrorLocation,
    },

    /// A trigger phrase was empty after trimming.
    #[error("Trigger phrase cannot be empty {location}")]
    EmptyTrigger {
        /// Source location where error occurred.
        location: ErrorLocation,
    },

    /// Update or delete of a trigger that is not in the store.
    #[error("No command registered for '{trigger}' {location}")]
    CommandNotFound {
        /// The trigger that was looked up.
        trigger: String,
        /// Source location where error occurred.
        location: ErrorLocation,
    },

    /// The recognizer heard nothing it could transcribe.
    #[error("No speech detected {location}")]
    NoSpeechDetected {
        /// Source location where error occurred.
        location: ErrorLocation,
    },

    /// The recognizer or lookup service could not run (no device, no model,
    /// no network, backend error).
    #[error("Service unavailable: {reason} {location}")]
    ServiceUnavailable {
        /// Description of the failure.
        reason: String,
        /// Source location where error occurred.
        location: ErrorLocation,
    },

    /// Knowledge lookup matched several candidate topics.
    #[error("Topic '{topic}' is ambiguous {location}")]
    Ambiguous {
        /// The topic that was looked up.
        topic: String,
        /// Source location where error occurred.
        location: ErrorLocation,
    },

    /// Knowledge lookup or launcher could not find the requested item.
    #[error("'{item}' not found {location}")]
    NotFound {
        /// The topic or target that was missing.
        item: String,
        /// Source location where error occurred.
        location: ErrorLocation,
    },

    /// A custom command points at a filesystem path that does not exist.
    #[error("Path does not exist: {path:?} {location}")]
    PathNotFound {
        /// The missing path.
        path: PathBuf,
        /// Source location where error occurred.
        location: ErrorLocation,
    },

    /// A new command's program or file target is not an existing file.
    #[error("Invalid command target: {path:?} {location}")]
    InvalidTarget {
        /// The rejected path.
        path: PathBuf,
        /// Source location where error occurred.
        location: ErrorLocation,
    },

    /// The launcher found the target but could not start it.
    #[error("Launch failed: {reason} {location}")]
    LaunchFailed {
        /// Description of the failure.
        reason: String,
        /// Source location where error occurred.
        location: ErrorLocation,
    },

    /// The capture device could not be opened.
    #[error("Video device unavailable: {reason} {location}")]
    DeviceUnavailable {
        /// Description of the failure.
        reason: String,
        /// Source location where error occurred.
        location: ErrorLocation,
    },

    /// The video sink could not be opened or written.
    #[error("Video sink unavailable: {reason} {location}")]
    SinkUnavailable {
        /// Description of the failure.
        reason: String,
        /// Source location where error occurred.
        location: ErrorLocation,
    },

    /// Photo capture requested before any frame was produced.
    #[error("No video frame available {location}")]
    NoFrame {
        /// Source location where error occurred.
        location: ErrorLocation,
    },

    /// Pixel buffer does not match the frame dimensions.
    #[error("Invalid frame: {reason} {location}")]
    InvalidFrame {
        /// What was wrong with the buffer.
        reason: String,
        /// Source location where error occurred.
        location: ErrorLocation,
    },

    /// Operation is not valid in the current session state.
    #[error("Invalid state: {reason} {location}")]
    InvalidState {
        /// Why the operation was rejected.
        reason: String,
        /// Source location where error occurred.
        location: ErrorLocation,
    },

    /// Microphone capture or resampling failed.
    #[error("Audio error: {reason} {location}")]
    Audio {
        /// Description of the audio failure.
        reason: String,
        /// Source location where error occurred.
        location: ErrorLocation,
    },

    /// Still image encoding failed.
    #[error("Image encoding failed: {source} {location}")]
    ImageEncode {
        /// Underlying error from the image crate.
        #[source]
        source: image::ImageError,
        /// Source location where error occurred.
        location: ErrorLocation,
    },
}

impl CoreError {
    /// Whether this error belongs to the transient taxonomy that a session
    /// loop reports and then continues past.
    pub fn is_transient(&self) -> bool {
        matches!(
            self,
            CoreError::NoSpeechDetected { .. }
                | CoreError::ServiceUnavailable { .. }
                | CoreError::Ambiguous { .. }
                | CoreError::NotFound { .. }
                | CoreError::SinkUnavailable { .. }
                | CoreError::DeviceUnavailable { .. }
                | CoreError::PathNotFound { .. }
        )
    }
}

impl CoreError {
    /// One-line text for the chat, without the source location.
    pub fn user_message(&self) -> String {
        match self {
            CoreError::CorruptStore { .. } => "The command file could not be read.".to_string(),
            CoreError::Io { source, .. } => format!("File error: {}", source),
            CoreError::Serialization { reason, .. } => format!("Could not save commands: {}", reason),
            CoreError::EmptyTrigger { .. } => "Please enter a trigger phrase.".to_string(),
            CoreError::CommandNotFound { trigger, .. } => {
                format!("No command named '{}'.", trigger)
            }
            CoreError::NoSpeechDetected { .. } => "Sorry, I didn't catch that.".to_string(),
            CoreError::ServiceUnavailable { reason, .. } => {
                format!("Could not request results; {}", reason)
            }
            CoreError::Ambiguous { topic, .. } => format!("'{}' matches several topics.", topic),
            CoreError::NotFound { item, .. } => format!("'{}' was not found.", item),
            CoreError::PathNotFound { path, .. } => {
                format!("The path {} does not exist.", path.display())
            }
            CoreError::InvalidTarget { .. } => {
                "Please select a valid file for the application path.".to_string()
            }
            CoreError::LaunchFailed { reason, .. } => format!("Failed to open: {}", reason),
            CoreError::DeviceUnavailable { reason, .. } => {
                format!("Error: Cannot open webcam. {}", reason)
            }
            CoreError::SinkUnavailable { .. } => {
                "Failed to open video writer. Check codec support and permissions.".to_string()
            }
            CoreError::NoFrame { .. } => "No frame available to capture.".to_string(),
            CoreError::InvalidFrame { reason, .. } => format!("Bad video frame: {}", reason),
            CoreError::InvalidState { reason, .. } => {
                let mut text = reason.clone();
                if let Some(first) = text.get_mut(0..1) {
                    first.make_ascii_uppercase();
                }
                format!("{}.", text)
            }
            CoreError::Audio { reason, .. } => format!("Audio error: {}", reason),
            CoreError::ImageEncode { source, .. } => format!("Could not save image: {}", source),
        }
    }
}

impl From<std::io::Error> for CoreError {
    #[track_caller]
    fn from(source: std::io::Error) -> Self {
        CoreError::Io {
            source,
            location: ErrorLocation::from(Location::caller()),
        }
    }
}

impl From<image::ImageError> for CoreError {
    #[track_caller]
    fn from(source: image::ImageError) -> Self {
        CoreError::ImageEncode {
            source,
            location: ErrorLocation::from(Location::caller()),
        }
    }
}

/// Result type alias using [`CoreError`].
pub type Result<T> = std::result::Result<T, CoreError>;
