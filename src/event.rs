use std::sync::mpsc::{self, Receiver, Sender};

use crate::generate::GenerationOutcome;
use crate::github::FetchSnapshot;
use crate::openai::GenerationError;

/// Everything asynchronous that can land in the run loop's mailbox. Producers
/// (fetch workers, the generation thread, the tick timer) only ever enqueue;
/// the run loop is the single consumer and the only mutator of `App`.
#[derive(Debug)]
pub enum AppEvent {
    FetchProgress(ProgressUpdate),
    FetchComplete(FetchSnapshot),
    /// Whole-run failure before any worker ran (repo listing, cache dir).
    FetchFailed(String),
    Generation(Result<GenerationOutcome, GenerationError>),
    Tick,
}

/// Counter snapshot taken under the fetch arena lock when one worker finishes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ProgressUpdate {
    pub fetched: usize,
    pub failed: usize,
    pub total: usize,
}

pub type EventTx = Sender<AppEvent>;

pub fn channel() -> (EventTx, Receiver<AppEvent>) {
    mpsc::channel()
}
