mod executor;
mod web;

pub use {
    executor::ActionExecutor,
    web::{GOOGLE_HOME, WORKOUT_URL, YOUTUBE_HOME, web_search_url, youtube_search_url},
};

use crate::{CoreResult, commands::ActionTarget};

/// Starts programs, opens files with their default handler, opens URLs.
///
/// Fails with `NotFound` when the program cannot be located and
/// `LaunchFailed` for any other start-up failure.
pub trait Launcher: Send + Sync {
    /// Launch `target`.
    fn launch(&self, target: &ActionTarget) -> CoreResult<()>;
}
