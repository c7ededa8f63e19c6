//! Viki Core Library
//!
//! Command resolution and session coordination for a voice/text assistant:
//! the persisted command registry and matcher, the built-in intents, the
//! nested lookup dialog, the listening and video worker sessions, and the
//! mailbox that carries their events to a single UI consumer.
//!
//! External services (speech, launcher, knowledge lookup, camera, encoder)
//! are consumed through traits; [`speech::WhisperListener`] is the bundled
//! speech-input implementation.
//!
//! # Example
//!
//! ```no_run
//! use viki_core::{CommandRegistry, CoreResult, Resolution};
//!
//! use std::path::Path;
//!
//! fn main() -> CoreResult<()> {
//!     let registry = CommandRegistry::open(
//!         Path::new("custom_commands.json"),
//!         Path::new("custom_commands.txt"),
//!     );
//!     registry.add("open notes", "web://notepad.example")?;
//!
//!     let resolved = registry.resolve("please open notes for me");
//!     assert!(matches!(resolved, Resolution::Custom { .. }));
//!     Ok(())
//! }
//! ```

pub mod actions;
pub mod commands;
pub mod dialog;
pub mod mailbox;
pub mod session;
pub mod speech;

mod assistant;
mod error;

pub use {
    assistant::{Assistant, AssistantSettings, Collaborators},
    commands::{ActionTarget, CommandRegistry, CommandStore, Resolution},
    error::CoreError,
    error::Result as CoreResult,
    mailbox::{Mailbox, MailboxEvent, MailboxReceiver},
};

#[cfg(test)]
mod tests;
