use super::media::{MediaClock, MediaPlayer};
use super::page::Transcription;

pub const DEFAULT_REWIND_STEP_SECS: f64 = 1.0;

/// Page-level state shared by every segment handler: the transcription
/// being edited, the autoplay toggle and the media element.
#[derive(Debug)]
pub struct EditorContext<M = MediaClock> {
    pub transcription: Transcription,
    pub autoplay: bool,
    pub media: M,
    pub rewind_step: f64,
}

impl<M: MediaPlayer> EditorContext<M> {
    pub fn new(transcription: Transcription, media: M) -> Self {
        Self {
            transcription,
            autoplay: false,
            media,
            rewind_step: DEFAULT_REWIND_STEP_SECS,
        }
    }

    pub fn with_autoplay(mut self, enabled: bool) -> Self {
        self.autoplay = enabled;
        self
    }

    pub fn with_rewind_step(mut self, seconds: f64) -> Self {
        self.rewind_step = seconds;
        self
    }
}
