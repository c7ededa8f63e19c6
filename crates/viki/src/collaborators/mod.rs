//! Platform implementations of the assistant's collaborator traits.

mod camera;
mod frame_sink;
mod launcher;
mod speaker;
mod wikipedia;

pub(crate) use {
    camera::TestPatternCamera, frame_sink::FrameSequenceSinks, launcher::SystemLauncher,
    speaker::SystemSpeaker, wikipedia::WikipediaLookup,
};

#[cfg(test)]
pub(crate) use {frame_sink::MANIFEST_FILE, launcher::web_url, wikipedia::{first_sentences, parse_summary}};
