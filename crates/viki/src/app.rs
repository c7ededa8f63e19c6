use crate::{AppResult, ShellCommand, TrayCommand, TrayMenuIds, console::HELP};

use std::{sync::Arc, time::Duration};

use tao::event_loop::EventLoopProxy;
use tokio::sync::{mpsc, watch};
use tracing::{debug, error, info, instrument, warn};
use tray_icon::menu::MenuEvent;
use viki_core::{Assistant, CoreError, CoreResult, session::VideoFormat};

/// Whether the command loop keeps running after a command.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Flow {
    Continue,
    Exit,
}

/// Apply one shell command to the assistant.
///
/// Blocking: runs on the runtime's blocking pool.
#[instrument(skip(assistant))]
pub(crate) fn execute(
    assistant: &Assistant,
    command: ShellCommand,
    default_format: VideoFormat,
) -> CoreResult<Flow> {
    match command {
        ShellCommand::Dispatch(text) => {
            // Detached: the thread reports back through the mailbox.
            let _ = assistant.dispatch_typed(&text);
        }
        ShellCommand::AddCommand { trigger, target } => assistant.add_command(&trigger, &target)?,
        ShellCommand::UpdateCommand { trigger, target } => {
            assistant.update_command(&trigger, &target)?
        }
        ShellCommand::DeleteCommand { trigger } => assistant.delete_command(&trigger)?,
        ShellCommand::ListCommands => {
            let commands = assistant.commands();
            if commands.is_empty() {
                assistant.mailbox().notice("No custom commands yet.");
            } else {
                assistant
                    .mailbox()
                    .notice(format!("Custom commands:\n{}", commands.export().trim_end()));
            }
        }
        ShellCommand::StartListening => assistant.start_listening()?,
        ShellCommand::StopListening => assistant.stop_listening(),
        ShellCommand::ToggleListening => {
            let listening = assistant.toggle_listening()?;
            debug!(listening, "Listening toggled");
        }
        ShellCommand::ToggleVideo => {
            let active = assistant.toggle_video_mode()?;
            debug!(active, "Video mode toggled");
        }
        ShellCommand::StartRecording(format) => {
            assistant.start_recording(format.unwrap_or(default_format))?;
        }
        ShellCommand::StopRecording => {
            let summary = assistant.stop_recording()?;
            info!(path = ?summary.path, frames = summary.frames_written, "Recording saved");
        }
        ShellCommand::CapturePhoto => {
            assistant.capture_photo()?;
        }
        ShellCommand::Help => assistant.mailbox().notice(HELP),
        ShellCommand::Shutdown => {
            assistant.shutdown();
            return Ok(Flow::Exit);
        }
    }
    Ok(Flow::Continue)
}

/// Report a failed command in the chat.
pub(crate) fn report(assistant: &Assistant, error: &CoreError) {
    if error.is_transient() {
        warn!(error = %error, "Command failed");
    } else {
        error!(error = %error, "Command failed");
    }
    // Sink failures are announced by the video session itself.
    if !matches!(error, CoreError::SinkUnavailable { .. }) {
        assistant.mailbox().notice(error.user_message());
    }
}

/// Main application state.
///
/// Runs on the async runtime thread. Asks the main thread to drain the
/// mailbox and to exit via `tray_proxy`, because `TrayIcon` is `!Send` and
/// must remain on the UI thread.
pub struct App {
    pub(crate) assistant: Arc<Assistant>,
    pub(crate) default_format: VideoFormat,
    pub(crate) tray_proxy: EventLoopProxy<TrayCommand>,
    pub(crate) menu_ids: TrayMenuIds,
    pub(crate) command_rx: mpsc::Receiver<ShellCommand>,
    pub(crate) shutdown_tx: watch::Sender<bool>,
}

impl App {
    /// Run the main application event loop.
    #[instrument(skip(self))]
    pub(crate) async fn run(mut self) -> AppResult<()> {
        info!("Viki starting");

        // Tray events arrive on a blocking crossbeam receiver; one blocking
        // task forwards them and exits once tray_event_rx is dropped.
        let (tray_event_tx, mut tray_event_rx) = mpsc::channel(32);
        let tray_handle = tokio::task::spawn_blocking(move || {
            let receiver = MenuEvent::receiver();
            while let Ok(event) = receiver.recv() {
                if tray_event_tx.blocking_send(event).is_err() {
                    break;
                }
            }
        });

        loop {
            let command = tokio::select! {
                Some(event) = tray_event_rx.recv() => {
                    match self.menu_ids.command_for(&event.id) {
                        Some(command) => command,
                        None => continue,
                    }
                }

                Some(command) = self.command_rx.recv() => command,

                else => {
                    info!("All channels closed, shutting down");
                    break;
                }
            };

            if self.handle(command).await == Flow::Exit {
                info!("Shutdown requested");
                break;
            }
        }

        drop(tray_event_rx);

        match tokio::time::timeout(Duration::from_secs(1), tray_handle).await {
            Ok(Ok(())) => info!("Tray event forwarder stopped cleanly"),
            Ok(Err(e)) => error!(error = ?e, "Tray event forwarder task panicked"),
            Err(_) => info!(
                "Tray event forwarder did not stop within timeout, \
                     will be cleaned up on exit"
            ),
        }

        let _ = self.shutdown_tx.send(true);
        if self.tray_proxy.send_event(TrayCommand::Shutdown).is_err() {
            debug!("Event loop already closed");
        }
        info!("Viki shut down successfully");

        Ok(())
    }

    #[instrument(skip(self))]
    async fn handle(&self, command: ShellCommand) -> Flow {
        let assistant = Arc::clone(&self.assistant);
        let default_format = self.default_format;

        let outcome = tokio::task::spawn_blocking(move || {
            let outcome = execute(&assistant, command, default_format);
            if let Err(e) = &outcome {
                report(&assistant, e);
            }
            outcome.unwrap_or(Flow::Continue)
        })
        .await;

        // Show the command's feedback without waiting for the next tick.
        let _ = self.tray_proxy.send_event(TrayCommand::Drain);

        outcome.unwrap_or_else(|e| {
            error!(error = ?e, "Command task panicked");
            Flow::Continue
        })
    }
}
