// Video playback collaborator

pub use playhead::{SharedPlayhead, VideoSource};

mod playhead;
