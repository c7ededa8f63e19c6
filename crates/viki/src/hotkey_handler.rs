//! Global hotkey handler.
//!
//! Registers CTRL+SHIFT+Space as a global hotkey that toggles the listening
//! loop. Uses async channels to communicate with the main application.

use crate::{AppError, AppResult, ShellCommand};

use std::{
    panic::Location,
    time::{Duration, Instant},
};

use error_location::ErrorLocation;
use global_hotkey::{
    GlobalHotKeyEvent, GlobalHotKeyManager, HotKeyState,
    hotkey::{Code, HotKey, Modifiers},
};
use tokio::sync::{Mutex, mpsc, watch};
use tracing::{debug, info, instrument, warn};

/// Presses closer together than this count once (key repeat, bounce).
pub(crate) const DEBOUNCE: Duration = Duration::from_millis(300);

/// Global hotkey handler that toggles listening.
pub struct HotkeyHandler {
    hotkey_id: u32,
    last_press: Mutex<Option<Instant>>,
    command_tx: mpsc::Sender<ShellCommand>,
}

impl HotkeyHandler {
    /// Register CTRL+SHIFT+Space as the global hotkey.
    ///
    /// Must be called on a thread with a message pump (e.g. the main thread
    /// running a `tao`/`winit` event loop) so that `WM_HOTKEY` messages are
    /// dispatched on Windows. The returned [`GlobalHotKeyManager`] must be
    /// kept alive on that thread for the hotkey to remain registered.
    #[track_caller]
    #[instrument]
    pub fn register_hotkey() -> AppResult<(GlobalHotKeyManager, u32)> {
        let manager =
            GlobalHotKeyManager::new().map_err(|e| AppError::HotkeyRegistrationFailed {
                reason: format!("Failed to create manager: {}", e),
                location: ErrorLocation::from(Location::caller()),
            })?;

        let hotkey = HotKey::new(Some(Modifiers::CONTROL | Modifiers::SHIFT), Code::Space);

        manager
            .register(hotkey)
            .map_err(|e| AppError::HotkeyRegistrationFailed {
                reason: format!("Failed to register CTRL+SHIFT+Space: {}", e),
                location: ErrorLocation::from(Location::caller()),
            })?;

        info!(hotkey = "CTRL+SHIFT+Space", "Global hotkey registered");

        Ok((manager, hotkey.id()))
    }

    /// Create a handler for a previously registered hotkey.
    ///
    /// The `hotkey_id` should come from [`register_hotkey`]. This struct is
    /// `Send` and can live on any thread; it only listens on the global
    /// [`GlobalHotKeyEvent`] channel.
    pub fn new(hotkey_id: u32, command_tx: mpsc::Sender<ShellCommand>) -> Self {
        Self {
            hotkey_id,
            last_press: Mutex::new(None),
            command_tx,
        }
    }

    /// Run the hotkey handler event loop.
    ///
    /// This method blocks until a shutdown signal is received.
    #[instrument(skip(self))]
    pub async fn run(&self, mut shutdown_rx: watch::Receiver<bool>) -> AppResult<()> {
        let receiver = GlobalHotKeyEvent::receiver().clone();
        let (event_tx, mut event_rx) = mpsc::channel(32);

        // One blocking task forwards hotkey events from the crossbeam receiver.
        // It exits on the first blocking_send() after event_rx is dropped.
        let handle = tokio::task::spawn_blocking(move || {
            while let Ok(event) = receiver.recv() {
                if event_tx.blocking_send(event).is_err() {
                    break;
                }
            }
        });

        loop {
            tokio::select! {
                _ = shutdown_rx.changed() => {
                    info!("Hotkey handler shutting down");
                    break;
                }
                Some(event) = event_rx.recv() => {
                    if event.id == self.hotkey_id && event.state == HotKeyState::Pressed {
                        self.handle_hotkey_press().await?;
                    }
                }
            }
        }

        drop(event_rx);

        // The forwarder may still sit in recv() until the next hotkey event.
        match tokio::time::timeout(Duration::from_secs(1), handle).await {
            Ok(Ok(())) => debug!("Hotkey event forwarder stopped cleanly"),
            Ok(Err(e)) => warn!(error = ?e, "Hotkey event forwarder task panicked"),
            Err(_) => debug!(
                "Hotkey event forwarder did not stop within timeout, \
                   will be cleaned up on exit"
            ),
        }

        Ok(())
    }

    #[instrument(skip(self))]
    pub(crate) async fn handle_hotkey_press(&self) -> AppResult<()> {
        let now = Instant::now();
        {
            let mut last = self.last_press.lock().await;
            if let Some(previous) = *last
                && now.duration_since(previous) < DEBOUNCE
            {
                debug!("Hotkey press debounced");
                return Ok(());
            }
            *last = Some(now);
        }

        self.command_tx
            .send(ShellCommand::ToggleListening)
            .await
            .map_err(|e| AppError::ChannelSendFailed {
                message: format!("Failed to send ToggleListening: {}", e),
                location: ErrorLocation::from(Location::caller()),
            })?;

        info!("Listening toggled from hotkey");

        Ok(())
    }
}
