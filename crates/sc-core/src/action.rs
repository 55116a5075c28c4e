use std::fmt::Debug;
use std::time::Duration;

use crate::context::{ContextKey, ContextStore};
use crate::journal::Journal;
use crate::services::{CommandRegistry, Services};
use crate::stage::{ObjectId, Stage};

/// Everything an action may touch during one call. Built fresh by the
/// scheduler for each action visit; actions keep no references to it.
pub struct Cue<'a> {
    /// Identity of this occurrence, used to address private state in `store`.
    pub key: ContextKey,
    /// Debug name of the occurrence, e.g. "Step #0 Sequence #1 Action #2".
    pub label: &'a str,
    /// Actor the owning sequence resolved, if it declared one.
    pub actor: Option<ObjectId>,
    /// Root object this playback was started on.
    pub root: ObjectId,
    /// Playback clock, accumulated from tick deltas since play.
    pub now: Duration,
    /// Delta of the current tick.
    pub dt: Duration,
    pub stage: &'a mut dyn Stage,
    pub store: &'a mut ContextStore,
    pub journal: &'a mut Journal,
    pub services: &'a Services,
}

impl<'a> Cue<'a> {
    /// Journals a warning prefixed with this occurrence's debug name.
    pub fn warn(&mut self, message: impl Into<String>) {
        let message = message.into();
        self.journal.warn(format!("{}: {}", self.label, message));
    }

    pub fn note(&mut self, message: impl Into<String>) {
        let message = message.into();
        self.journal.note(format!("{}: {}", self.label, message));
    }
}

/// Static context for pre-playback validation.
pub struct Preflight<'a> {
    pub commands: &'a dyn CommandRegistry,
}

/// A single scripted action. Implementations are immutable and shared: the
/// `&self` receivers leave nowhere to hide per-playback state, so anything
/// that changes over time goes through `cue.store` under `cue.key`.
///
/// Lifecycle per occurrence: `start` once, then zero or more `update`s,
/// then `finish` once the owning sequence sees `is_done`. `is_done` must be
/// side-effect free, `false` before `start` and stable at `true` after the
/// occurrence completes.
pub trait Action: Debug + Send + Sync {
    fn is_done(&self, cue: &Cue<'_>) -> bool;
    fn start(&self, cue: &mut Cue<'_>);
    fn update(&self, cue: &mut Cue<'_>);
    fn finish(&self, _cue: &mut Cue<'_>) {}
    /// Static issues a verifier should surface before playback. Empty means
    /// nothing to report.
    fn validate(&self, _check: &Preflight<'_>) -> Vec<String> {
        Vec::new()
    }
}

/// Stand-in for a script entry that could not be loaded. Does nothing and
/// reports done immediately, so the owning sequence keeps advancing.
#[derive(Debug, Clone)]
pub struct Placeholder {
    pub reason: String,
}

impl Placeholder {
    pub fn new(reason: impl Into<String>) -> Self {
        Self {
            reason: reason.into(),
        }
    }
}

impl Action for Placeholder {
    fn is_done(&self, _cue: &Cue<'_>) -> bool {
        true
    }

    fn start(&self, _cue: &mut Cue<'_>) {}

    fn update(&self, _cue: &mut Cue<'_>) {}
}
