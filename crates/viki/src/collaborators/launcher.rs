use std::{io, panic::Location, process::Command};

use error_location::ErrorLocation;
use tracing::{debug, info, instrument};
use viki_core::{ActionTarget, CoreError, CoreResult, actions::Launcher};

/// Opens URLs and files with the desktop's default handler and starts
/// executables directly.
#[derive(Debug, Default)]
pub struct SystemLauncher;

impl Launcher for SystemLauncher {
    #[track_caller]
    #[instrument(skip(self))]
    fn launch(&self, target: &ActionTarget) -> CoreResult<()> {
        match target {
            ActionTarget::WebApp(name) => {
                let url = web_url(name);
                open::that_detached(&url).map_err(|e| CoreError::LaunchFailed {
                    reason: format!("{}: {}", url, e),
                    location: ErrorLocation::from(Location::caller()),
                })?;
                info!(url = %url, "Opened URL");
            }
            ActionTarget::File(path) => {
                open::that_detached(path).map_err(|e| CoreError::LaunchFailed {
                    reason: format!("{}: {}", path.display(), e),
                    location: ErrorLocation::from(Location::caller()),
                })?;
                info!(path = ?path, "Opened file");
            }
            ActionTarget::Executable(path) => {
                let child = Command::new(path).spawn().map_err(|e| match e.kind() {
                    io::ErrorKind::NotFound => CoreError::NotFound {
                        item: path.display().to_string(),
                        location: ErrorLocation::from(Location::caller()),
                    },
                    _ => CoreError::LaunchFailed {
                        reason: format!("{}: {}", path.display(), e),
                        location: ErrorLocation::from(Location::caller()),
                    },
                })?;
                debug!(pid = child.id(), "Program started");
                info!(path = ?path, "Started program");
            }
        }
        Ok(())
    }
}

/// Full URL for a web target: kept when it carries a scheme, otherwise served
/// over https.
pub(crate) fn web_url(name: &str) -> String {
    let lower = name.to_ascii_lowercase();
    if lower.starts_with("http://") || lower.starts_with("https://") {
        name.to_string()
    } else {
        format!("https://{}", name.trim_start_matches('/'))
    }
}
