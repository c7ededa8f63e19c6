/// Commands sent from the async runtime to the main UI thread.
///
/// The main thread owns `TrayManager` (because `TrayIcon` is `!Send`) and
/// the mailbox receiver, so tray refreshes and process lifecycle events flow
/// through this enum.
#[derive(Debug, Clone, Copy)]
pub enum TrayCommand {
    /// Drain the mailbox now instead of waiting for the next tick.
    Drain,
    /// Shut down the application. The main thread will exit the event loop.
    Shutdown,
}
