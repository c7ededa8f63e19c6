use crate::{ShellCommand, TrayMenuIds, tray_manager::indicator_image};

use tray_icon::menu::MenuId;
use viki_core::mailbox::IndicatorColor;

fn ids() -> TrayMenuIds {
    TrayMenuIds {
        start_listening: MenuId::new("start-listening"),
        stop_listening: MenuId::new("stop-listening"),
        toggle_video: MenuId::new("toggle-video"),
        start_recording: MenuId::new("start-recording"),
        stop_recording: MenuId::new("stop-recording"),
        capture_photo: MenuId::new("capture-photo"),
        exit: MenuId::new("exit"),
    }
}

/// WHAT: Every menu item maps to its shell command
/// WHY: Menu clicks are translated on the runtime thread by ID
#[test]
fn given_menu_ids_when_translating_then_commands_match() {
    // Given
    let ids = ids();

    // When/Then
    assert_eq!(
        ids.command_for(&ids.start_listening),
        Some(ShellCommand::StartListening)
    );
    assert_eq!(
        ids.command_for(&ids.stop_listening),
        Some(ShellCommand::StopListening)
    );
    assert_eq!(
        ids.command_for(&ids.toggle_video),
        Some(ShellCommand::ToggleVideo)
    );
    assert_eq!(
        ids.command_for(&ids.start_recording),
        Some(ShellCommand::StartRecording(None))
    );
    assert_eq!(
        ids.command_for(&ids.stop_recording),
        Some(ShellCommand::StopRecording)
    );
    assert_eq!(
        ids.command_for(&ids.capture_photo),
        Some(ShellCommand::CapturePhoto)
    );
    assert_eq!(ids.command_for(&ids.exit), Some(ShellCommand::Shutdown));
    assert_eq!(ids.command_for(&MenuId::new("other")), None);
}

/// WHAT: The indicator icon is a dot in the indicator colour
/// WHY: The tray shows idle, listening and processing at a glance
#[test]
fn given_indicator_color_when_painting_then_center_colored_corner_clear() {
    // Given/When
    let image = indicator_image(IndicatorColor::Orange);

    // Then
    let [r, g, b] = IndicatorColor::Orange.rgb();
    assert_eq!(image.get_pixel(16, 16).0, [r, g, b, 255]);
    assert_eq!(image.get_pixel(0, 0).0[3], 0);
}
