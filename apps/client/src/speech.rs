//! Text-to-speech seam.

/// Called once an utterance has finished.
pub type SpeechDone = Box<dyn FnOnce() + Send + 'static>;

/// Pronounces words. Starting an utterance cancels the one in progress.
pub trait Speaker: Send + Sync {
    /// `on_end` is invoked when the utterance finishes, or right away if
    /// audio is unavailable.
    fn speak(&self, text: &str, on_end: Option<SpeechDone>);
}

/// Speaker for environments without audio.
#[derive(Debug, Default, Clone, Copy)]
pub struct SilentSpeaker;

impl Speaker for SilentSpeaker {
    fn speak(&self, text: &str, on_end: Option<SpeechDone>) {
        tracing::debug!(text, "speech unavailable");
        if let Some(done) = on_end {
            done();
        }
    }
}
