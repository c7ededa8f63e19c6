//! Viki: desktop voice and text command assistant.
//!
//! The main thread runs the tao event loop, owns the tray icon and drains the
//! assistant's mailbox on a timer. A tokio runtime thread forwards the global
//! hotkey, the tray menu and the console into the assistant.

mod app;
mod collaborators;
mod config;
mod console;
mod error;
mod hotkey_handler;
mod logging;
mod shell;
mod shell_command;
#[cfg(test)]
mod tests;
mod tray_command;
mod tray_manager;

pub(crate) use {
    app::App,
    console::Console,
    error::{AppError, Result as AppResult},
    hotkey_handler::HotkeyHandler,
    shell::ShellView,
    shell_command::ShellCommand,
    tray_command::TrayCommand,
    tray_manager::{TrayManager, TrayMenuIds},
};

use crate::{
    collaborators::{
        FrameSequenceSinks, SystemLauncher, SystemSpeaker, TestPatternCamera, WikipediaLookup,
    },
    config::Config,
};

use std::{
    sync::Arc,
    time::{Duration, Instant},
};

use global_hotkey::GlobalHotKeyManager;
use tao::{
    event::{Event, StartCause},
    event_loop::{ControlFlow, EventLoopBuilder},
};
use tokio::sync::{mpsc, watch};
use tracing::{debug, error, info, warn};
use viki_core::{
    Assistant, Collaborators, CommandRegistry, Mailbox, MailboxReceiver, speech::WhisperListener,
};

const RUNTIME_SHUTDOWN_GRACE: Duration = Duration::from_millis(500);

/// Build the assistant with the desktop collaborators.
fn build_assistant(config: &Config, mailbox: Mailbox) -> Assistant {
    let storage = &config.storage;
    let registry = Arc::new(CommandRegistry::open(
        &storage.commands_file,
        &storage.export_file,
    ));

    let video = &config.video;
    let collaborators = Collaborators {
        speech_in: Arc::new(WhisperListener::new(config.speech.listener_settings())),
        speech_out: Arc::new(SystemSpeaker::new(config.speech.speak_aloud)),
        launcher: Arc::new(SystemLauncher),
        knowledge: Arc::new(WikipediaLookup::new(&config.knowledge)),
        camera: Arc::new(TestPatternCamera::new((video.frame_width, video.frame_height))),
        sinks: Arc::new(FrameSequenceSinks),
    };

    Assistant::new(registry, collaborators, mailbox, config.assistant_settings())
}

/// Drain pending mailbox events into the view, print chat lines and mirror
/// the view on the tray.
fn drain_mailbox(receiver: &MailboxReceiver, view: &mut ShellView, tray: &mut TrayManager) {
    for event in receiver.drain() {
        if let Some(line) = view.apply(event) {
            println!("{}", line);
        }
    }

    if view.take_dirty()
        && let Err(e) = tray.refresh(view)
    {
        error!(error = ?e, "Failed to update tray icon");
    }
}

/// Application entry point.
fn main() {
    let _log_guard = logging::init(&config::data_dir().join("logs"));

    let config = match Config::load() {
        Ok(c) => c,
        Err(e) => {
            error!("Failed to load config: {:?}", e);
            std::process::exit(1);
        }
    };
    config.report_problems();

    let event_loop = EventLoopBuilder::<TrayCommand>::with_user_event().build();
    let tray_proxy = event_loop.create_proxy();

    // TrayManager lives on the main thread - TrayIcon is !Send on all platforms.
    let mut tray_manager = match TrayManager::new() {
        Ok(tm) => tm,
        Err(e) => {
            error!("Failed to create TrayManager: {:?}", e);
            std::process::exit(1);
        }
    };

    let (mailbox, receiver) = Mailbox::channel();
    let assistant = Arc::new(build_assistant(&config, mailbox.clone()));
    let mut view = ShellView::default();
    let tick = config.shell.drain_tick();

    // Persists across event loop iterations; dropping it unregisters the hotkey.
    let mut hotkey_manager: Option<GlobalHotKeyManager> = None;

    event_loop.run(move |event, _, control_flow| {
        match event {
            Event::NewEvents(StartCause::Init) => {
                #[cfg(target_os = "macos")]
                unsafe {
                    use core_foundation::runloop::{CFRunLoopGetMain, CFRunLoopWakeUp};
                    CFRunLoopWakeUp(CFRunLoopGetMain());
                }

                let (command_tx, command_rx) = mpsc::channel(32);
                let (shutdown_tx, shutdown_rx) = watch::channel(false);

                // Register hotkey on the main thread: tao's event loop pumps
                // the Windows messages needed for WM_HOTKEY delivery.
                let hotkey_id = if config.shell.hotkey_enabled {
                    match HotkeyHandler::register_hotkey() {
                        Ok((manager, id)) => {
                            hotkey_manager = Some(manager);
                            Some(id)
                        }
                        Err(e) => {
                            warn!(error = ?e, "Continuing without the global hotkey");
                            None
                        }
                    }
                } else {
                    None
                };

                let app = App {
                    assistant: Arc::clone(&assistant),
                    default_format: config.video.format(),
                    tray_proxy: tray_proxy.clone(),
                    menu_ids: tray_manager.menu_ids(),
                    command_rx,
                    shutdown_tx,
                };
                let hotkey_handler = hotkey_id.map(|id| HotkeyHandler::new(id, command_tx.clone()));
                let console = config
                    .shell
                    .console_enabled
                    .then(|| Console::new(command_tx.clone(), mailbox.clone()));
                drop(command_tx);

                // Spawn tokio runtime on separate thread.
                // TrayManager and hotkey_manager stay on the main thread.
                let spawned = std::thread::Builder::new()
                    .name("viki-runtime".to_string())
                    .spawn(move || {
                        let rt = match tokio::runtime::Runtime::new() {
                            Ok(rt) => rt,
                            Err(e) => {
                                error!("Failed to create tokio runtime: {:?}", e);
                                std::process::exit(1);
                            }
                        };

                        rt.block_on(async {
                            tokio::join!(
                                async {
                                    if let Some(handler) = hotkey_handler
                                        && let Err(e) = handler.run(shutdown_rx.clone()).await
                                    {
                                        error!(error = ?e, "Hotkey handler error");
                                    }
                                },
                                async {
                                    if let Some(console) = console
                                        && let Err(e) = console.run(shutdown_rx.clone()).await
                                    {
                                        error!(error = ?e, "Console error");
                                    }
                                },
                                async {
                                    if let Err(e) = app.run().await {
                                        error!(error = ?e, "App error");
                                    }
                                }
                            );
                        });

                        // Stdin reads cannot be cancelled; do not wait on them.
                        rt.shutdown_timeout(RUNTIME_SHUTDOWN_GRACE);
                    });

                if let Err(e) = spawned {
                    error!("Failed to start runtime thread: {:?}", e);
                    std::process::exit(1);
                }

                info!(tick_ms = tick.as_millis(), "Shell ready");
                drain_mailbox(&receiver, &mut view, &mut tray_manager);
                *control_flow = ControlFlow::WaitUntil(Instant::now() + tick);
            }
            Event::NewEvents(StartCause::ResumeTimeReached { .. }) => {
                drain_mailbox(&receiver, &mut view, &mut tray_manager);
                *control_flow = ControlFlow::WaitUntil(Instant::now() + tick);
            }
            Event::UserEvent(TrayCommand::Drain) => {
                drain_mailbox(&receiver, &mut view, &mut tray_manager);
            }
            Event::UserEvent(TrayCommand::Shutdown) => {
                drain_mailbox(&receiver, &mut view, &mut tray_manager);
                debug!("Event loop exiting");
                *control_flow = ControlFlow::ExitWithCode(0);
            }
            _ => {}
        }

        // Keep hotkey_manager alive in the closure for the app's lifetime.
        let _ = &hotkey_manager;
    });
}
