use std::{
    process::{Command, Stdio},
    sync::{
        Mutex,
        atomic::{AtomicBool, Ordering},
    },
};

use tracing::{debug, warn};
use viki_core::speech::SpeechOutput;

/// Speaks through the platform's speech command: `say` on macOS, the
/// System.Speech synthesizer on Windows, `espeak` elsewhere.
///
/// Each call blocks until the utterance finishes, so replies are heard in the
/// order they were posted.
pub struct SystemSpeaker {
    enabled: bool,
    failed: AtomicBool,
    voice: Mutex<()>,
}

impl SystemSpeaker {
    /// Create a speaker. A disabled speaker only logs.
    pub fn new(enabled: bool) -> Self {
        Self {
            enabled,
            failed: AtomicBool::new(false),
            voice: Mutex::new(()),
        }
    }

    fn command(text: &str) -> Command {
        #[cfg(target_os = "macos")]
        {
            let mut command = Command::new("say");
            command.arg(text);
            command
        }
        #[cfg(target_os = "windows")]
        {
            let script = format!(
                "Add-Type -AssemblyName System.Speech; \
                 (New-Object System.Speech.Synthesis.SpeechSynthesizer).Speak('{}')",
                text.replace('\'', "''")
            );
            let mut command = Command::new("powershell");
            command.args(["-NoProfile", "-Command", &script]);
            command
        }
        #[cfg(not(any(target_os = "macos", target_os = "windows")))]
        {
            let mut command = Command::new("espeak");
            command.arg(text);
            command
        }
    }
}

impl SpeechOutput for SystemSpeaker {
    fn speak(&self, text: &str) {
        if !self.enabled || text.trim().is_empty() || self.failed.load(Ordering::Relaxed) {
            return;
        }

        // One voice at a time across sessions.
        let _voice = self.voice.lock().unwrap_or_else(|e| e.into_inner());

        let status = Self::command(text)
            .stdin(Stdio::null())
            .stdout(Stdio::null())
            .stderr(Stdio::null())
            .status();

        match status {
            Ok(status) if status.success() => debug!(text_len = text.len(), "Spoke reply"),
            Ok(status) => warn!(code = ?status.code(), "Speech command failed"),
            Err(e) => {
                // Missing binary: stay quiet from now on.
                self.failed.store(true, Ordering::Relaxed);
                warn!(error = %e, "Speech command unavailable, replies will be text only");
            }
        }
    }
}
