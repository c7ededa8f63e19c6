//! Typed command line on standard input.
//!
//! Plain text is dispatched like a spoken command. Lines starting with `:`
//! manage the command registry and the sessions.

use crate::{AppError, AppResult, ShellCommand};

use std::{panic::Location, str::FromStr};

use error_location::ErrorLocation;
use tokio::{
    io::{AsyncBufReadExt, BufReader},
    sync::{mpsc, watch},
};
use tracing::{debug, info, instrument, warn};
use viki_core::{Mailbox, session::VideoFormat};

/// Shown by `:help` and after an unknown `:` command.
pub(crate) const HELP: &str = "\
Commands:
  <text>                      run text as if it were spoken
  :add <trigger> = <target>   register a custom command
  :update <trigger> = <target>
  :delete <trigger>
  :list                       show custom commands
  :listen / :stop             start or stop listening
  :video                      toggle video mode
  :record [mp4|avi]           start recording
  :stoprecord                 stop recording
  :photo                      capture a photo
  :quit                       exit";

/// Parse one console line.
///
/// Blank lines yield `None`.
#[track_caller]
pub(crate) fn parse_line(line: &str) -> AppResult<Option<ShellCommand>> {
    let line = line.trim();
    if line.is_empty() {
        return Ok(None);
    }

    let Some(rest) = line.strip_prefix(':') else {
        return Ok(Some(ShellCommand::Dispatch(line.to_string())));
    };

    let (verb, args) = match rest.split_once(char::is_whitespace) {
        Some((verb, args)) => (verb, args.trim()),
        None => (rest, ""),
    };

    let command = match verb.to_lowercase().as_str() {
        "add" => {
            let (trigger, target) = binding(args, "add")?;
            ShellCommand::AddCommand { trigger, target }
        }
        "update" => {
            let (trigger, target) = binding(args, "update")?;
            ShellCommand::UpdateCommand { trigger, target }
        }
        "delete" if !args.is_empty() => ShellCommand::DeleteCommand {
            trigger: args.to_string(),
        },
        "delete" => return Err(usage("usage: :delete <trigger>")),
        "list" => ShellCommand::ListCommands,
        "listen" => ShellCommand::StartListening,
        "stop" => ShellCommand::StopListening,
        "video" => ShellCommand::ToggleVideo,
        "record" if args.is_empty() => ShellCommand::StartRecording(None),
        "record" => {
            let format = VideoFormat::from_str(args).map_err(|_| {
                usage(&format!(
                    "unsupported video format '{}'; use mp4 or avi",
                    args
                ))
            })?;
            ShellCommand::StartRecording(Some(format))
        }
        "stoprecord" => ShellCommand::StopRecording,
        "photo" => ShellCommand::CapturePhoto,
        "help" => ShellCommand::Help,
        "quit" | "exit" => ShellCommand::Shutdown,
        other => {
            return Err(usage(&format!(
                "unknown command ':{}', type :help for a list",
                other
            )));
        }
    };

    Ok(Some(command))
}

#[track_caller]
fn binding(args: &str, verb: &str) -> AppResult<(String, String)> {
    let bound = args
        .split_once('=')
        .map(|(trigger, target)| (trigger.trim(), target.trim()))
        .filter(|(trigger, target)| !trigger.is_empty() && !target.is_empty());

    match bound {
        Some((trigger, target)) => Ok((trigger.to_string(), target.to_string())),
        None => Err(usage(&format!("usage: :{} <trigger> = <target>", verb))),
    }
}

#[track_caller]
fn usage(reason: &str) -> AppError {
    AppError::InvalidCommand {
        reason: reason.to_string(),
        location: ErrorLocation::from(Location::caller()),
    }
}

/// Reads standard input and forwards parsed lines as [`ShellCommand`]s.
pub struct Console {
    command_tx: mpsc::Sender<ShellCommand>,
    mailbox: Mailbox,
}

impl Console {
    /// Console feeding `command_tx`; parse errors are posted to `mailbox`.
    pub fn new(command_tx: mpsc::Sender<ShellCommand>, mailbox: Mailbox) -> Self {
        Self {
            command_tx,
            mailbox,
        }
    }

    /// Run until shutdown or end of input.
    #[instrument(skip(self, shutdown_rx))]
    pub async fn run(&self, mut shutdown_rx: watch::Receiver<bool>) -> AppResult<()> {
        let mut lines = BufReader::new(tokio::io::stdin()).lines();
        info!("Console ready, type :help for commands");

        loop {
            tokio::select! {
                _ = shutdown_rx.changed() => {
                    debug!("Console shutting down");
                    break;
                }
                line = lines.next_line() => {
                    let Some(line) = line? else {
                        info!("Console input closed");
                        break;
                    };
                    self.handle_line(&line).await?;
                }
            }
        }

        Ok(())
    }

    #[instrument(skip(self, line))]
    async fn handle_line(&self, line: &str) -> AppResult<()> {
        match parse_line(line) {
            Ok(Some(command)) => {
                self.command_tx
                    .send(command)
                    .await
                    .map_err(|e| AppError::ChannelSendFailed {
                        message: format!("Failed to send console command: {}", e),
                        location: ErrorLocation::from(Location::caller()),
                    })?;
            }
            Ok(None) => {}
            Err(AppError::InvalidCommand { reason, .. }) => {
                self.mailbox.notice(reason);
            }
            Err(e) => {
                warn!(error = %e, "Console line rejected");
            }
        }
        Ok(())
    }
}
