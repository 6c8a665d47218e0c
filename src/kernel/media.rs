/// The media element segments are previewed on.
pub trait MediaPlayer {
    fn current_time(&self) -> f64;
    fn seek(&mut self, seconds: f64);
    fn play(&mut self);
    fn pause(&mut self);
    fn is_playing(&self) -> bool;
}

/// In-process stand-in for a media element: tracks position and play state.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct MediaClock {
    position: f64,
    playing: bool,
}

impl MediaClock {
    pub fn new() -> Self {
        Self::default()
    }
}

impl MediaPlayer for MediaClock {
    fn current_time(&self) -> f64 {
        self.position
    }

    fn seek(&mut self, seconds: f64) {
        self.position = seconds.max(0.0);
    }

    fn play(&mut self) {
        self.playing = true;
    }

    fn pause(&mut self) {
        self.playing = false;
    }

    fn is_playing(&self) -> bool {
        self.playing
    }
}
