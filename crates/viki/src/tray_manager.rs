//! System tray icon with state-based updates.
//!
//! The icon is a dot painted in the current indicator colour, the tooltip
//! follows the status line, and the context menu drives listening, video and
//! recording.

use crate::{AppError, AppResult, ShellCommand, ShellView};

use std::panic::Location;

use error_location::ErrorLocation;
use image::{Rgba, RgbaImage};
use tracing::{debug, info, instrument};
use tray_icon::{
    Icon, TrayIcon, TrayIconBuilder,
    menu::{Menu, MenuId, MenuItem, PredefinedMenuItem},
};
use viki_core::mailbox::IndicatorColor;

const ICON_SIZE: u32 = 32;

/// Paint the indicator dot: a filled circle on a transparent square.
pub(crate) fn indicator_image(color: IndicatorColor) -> RgbaImage {
    let [r, g, b] = color.rgb();
    let center = (ICON_SIZE as f32 - 1.0) / 2.0;
    let radius = ICON_SIZE as f32 / 2.0 - 2.0;

    RgbaImage::from_fn(ICON_SIZE, ICON_SIZE, |x, y| {
        let dx = x as f32 - center;
        let dy = y as f32 - center;
        if (dx * dx + dy * dy).sqrt() <= radius {
            Rgba([r, g, b, 255])
        } else {
            Rgba([0, 0, 0, 0])
        }
    })
}

/// Menu item IDs, cloned to the async runtime to translate menu events.
#[derive(Debug, Clone)]
pub struct TrayMenuIds {
    pub(crate) start_listening: MenuId,
    pub(crate) stop_listening: MenuId,
    pub(crate) toggle_video: MenuId,
    pub(crate) start_recording: MenuId,
    pub(crate) stop_recording: MenuId,
    pub(crate) capture_photo: MenuId,
    pub(crate) exit: MenuId,
}

impl TrayMenuIds {
    /// The command behind a clicked menu item.
    pub fn command_for(&self, id: &MenuId) -> Option<ShellCommand> {
        let command = if *id == self.start_listening {
            ShellCommand::StartListening
        } else if *id == self.stop_listening {
            ShellCommand::StopListening
        } else if *id == self.toggle_video {
            ShellCommand::ToggleVideo
        } else if *id == self.start_recording {
            ShellCommand::StartRecording(None)
        } else if *id == self.stop_recording {
            ShellCommand::StopRecording
        } else if *id == self.capture_photo {
            ShellCommand::CapturePhoto
        } else if *id == self.exit {
            ShellCommand::Shutdown
        } else {
            return None;
        };
        Some(command)
    }
}

/// System tray icon manager.
pub struct TrayManager {
    tray_icon: TrayIcon,
    start_listening: MenuItem,
    stop_listening: MenuItem,
    toggle_video: MenuItem,
    start_recording: MenuItem,
    stop_recording: MenuItem,
    capture_photo: MenuItem,
    exit: MenuItem,
    shown_color: IndicatorColor,
}

impl TrayManager {
    /// Create a new tray manager in the idle state.
    #[track_caller]
    #[instrument]
    pub fn new() -> AppResult<Self> {
        let menu = Menu::new();

        let start_listening = MenuItem::new("Start Listening", true, None);
        let stop_listening = MenuItem::new("Stop Listening", true, None);
        let toggle_video = MenuItem::new("Toggle Video Mode", true, None);
        let start_recording = MenuItem::new("Start Recording", false, None);
        let stop_recording = MenuItem::new("Stop Recording", false, None);
        let capture_photo = MenuItem::new("Capture Photo", false, None);
        let exit = MenuItem::new("Exit", true, None);
        let separator = PredefinedMenuItem::separator();

        menu.append_items(&[
            &start_listening,
            &stop_listening,
            &separator,
            &toggle_video,
            &start_recording,
            &stop_recording,
            &capture_photo,
            &separator,
            &exit,
        ])
        .map_err(|e| AppError::TrayError {
            reason: format!("Failed to build tray menu: {}", e),
            location: ErrorLocation::from(Location::caller()),
        })?;

        let tray_icon = TrayIconBuilder::new()
            .with_tooltip("Viki - Idle")
            .with_menu(Box::new(menu))
            .with_icon(Self::icon(IndicatorColor::Gray)?)
            .build()
            .map_err(|e| AppError::TrayError {
                reason: format!("Failed to create tray icon: {}", e),
                location: ErrorLocation::from(Location::caller()),
            })?;

        info!("System tray icon initialized");

        Ok(Self {
            tray_icon,
            start_listening,
            stop_listening,
            toggle_video,
            start_recording,
            stop_recording,
            capture_photo,
            exit,
            shown_color: IndicatorColor::Gray,
        })
    }

    /// IDs of the menu items.
    pub fn menu_ids(&self) -> TrayMenuIds {
        TrayMenuIds {
            start_listening: self.start_listening.id().clone(),
            stop_listening: self.stop_listening.id().clone(),
            toggle_video: self.toggle_video.id().clone(),
            start_recording: self.start_recording.id().clone(),
            stop_recording: self.stop_recording.id().clone(),
            capture_photo: self.capture_photo.id().clone(),
            exit: self.exit.id().clone(),
        }
    }

    /// Mirror the shell view: icon colour, tooltip and enabled menu items.
    #[track_caller]
    #[instrument(skip(self, view))]
    pub fn refresh(&mut self, view: &ShellView) -> AppResult<()> {
        if view.indicator() != self.shown_color {
            self.tray_icon
                .set_icon(Some(Self::icon(view.indicator())?))
                .map_err(|e| AppError::TrayError {
                    reason: format!("Failed to update icon: {}", e),
                    location: ErrorLocation::from(Location::caller()),
                })?;
            self.shown_color = view.indicator();
        }

        self.tray_icon
            .set_tooltip(Some(view.tooltip()))
            .map_err(|e| AppError::TrayError {
                reason: format!("Failed to update tooltip: {}", e),
                location: ErrorLocation::from(Location::caller()),
            })?;

        self.start_recording.set_enabled(view.can_start_recording());
        self.stop_recording.set_enabled(view.can_stop_recording());
        self.capture_photo.set_enabled(view.can_capture());

        debug!(status = %view.status(), indicator = ?view.indicator(), "Tray refreshed");

        Ok(())
    }

    #[track_caller]
    fn icon(color: IndicatorColor) -> AppResult<Icon> {
        let image = indicator_image(color);
        let (width, height) = image.dimensions();

        Icon::from_rgba(image.into_raw(), width, height).map_err(|e| AppError::TrayError {
            reason: format!("Failed to create icon from RGBA: {}", e),
            location: ErrorLocation::from(Location::caller()),
        })
    }
}
