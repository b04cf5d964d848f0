use std::fmt;

use log::info;

/// Pipeline stages, in the order they run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stage {
    Encrypting,
    Marking,
    Embedding,
    NoiseInjecting,
    Extracting,
    MarkerSearch,
    Decrypting,
    Done,
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Stage::Encrypting => "encrypting",
            Stage::Marking => "marking",
            Stage::Embedding => "embedding",
            Stage::NoiseInjecting => "noise",
            Stage::Extracting => "extracting",
            Stage::MarkerSearch => "marker search",
            Stage::Decrypting => "decrypting",
            Stage::Done => "done",
        };
        f.write_str(name)
    }
}

/// Receives stage transitions of a single encode or decode call.
///
/// Passed into each call rather than installed globally, so two concurrent
/// calls on different images can report to different sinks.
///
/// # Example
///
/// ```rust
/// use std::cell::RefCell;
/// use pvdsteg::{PipelineObserver, Stage};
///
/// #[derive(Default)]
/// struct Recorder(RefCell<Vec<Stage>>);
///
/// impl PipelineObserver for Recorder {
///     fn on_stage(&self, stage: Stage, _detail: &str) {
///         self.0.borrow_mut().push(stage);
///     }
/// }
/// ```
pub trait PipelineObserver {
    /// Called when `stage` begins. `detail` is a short human-readable note.
    fn on_stage(&self, stage: Stage, detail: &str);
}

/// Discards every event.
pub struct NoopObserver;

impl PipelineObserver for NoopObserver {
    fn on_stage(&self, _stage: Stage, _detail: &str) {}
}

/// Forwards events to the `log` facade at info level.
pub struct LogObserver;

impl PipelineObserver for LogObserver {
    fn on_stage(&self, stage: Stage, detail: &str) {
        info!("{}: {}", stage, detail);
    }
}
