use std::collections::BTreeMap;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use sc_core::{
    action_label, sequence_label, step_label, Action, ActionSequence, ContextKey, ContextStore,
    Cue, Journal, ObjectId, RawActionNode, Script, ScriptedAction, Services, SourceLocation,
    SourceSpan, Step,
};

use crate::host::MemoryStage;
use crate::player::Player;

pub(crate) const TICK: Duration = Duration::from_millis(100);

pub(crate) type CallLog = Arc<Mutex<Vec<String>>>;

pub(crate) fn call_log() -> CallLog {
    Arc::new(Mutex::new(Vec::new()))
}

pub(crate) fn log_entries(log: &CallLog) -> Vec<String> {
    log.lock().expect("call log mutex").clone()
}

/// Scripted action double that records every lifecycle call with the
/// playback time, and completes after a configurable number of updates.
/// Zero updates means done straight after start, like a zero-length pause.
#[derive(Debug)]
pub(crate) struct RecordingAction {
    name: &'static str,
    updates_needed: u32,
    log: CallLog,
}

#[derive(Debug, Default)]
struct RecordingSlot {
    updates: u32,
    done: bool,
}

impl RecordingAction {
    pub(crate) fn new(name: &'static str, updates_needed: u32, log: &CallLog) -> Arc<dyn Action> {
        Arc::new(Self {
            name,
            updates_needed,
            log: Arc::clone(log),
        })
    }

    fn record(&self, now: Duration, what: &str) {
        self.log
            .lock()
            .expect("call log mutex")
            .push(format!("{} {} @{}ms", self.name, what, now.as_millis()));
    }
}

impl Action for RecordingAction {
    fn is_done(&self, cue: &Cue<'_>) -> bool {
        cue.store
            .get::<RecordingSlot>(cue.key)
            .map_or(false, |slot| slot.done)
    }

    fn start(&self, cue: &mut Cue<'_>) {
        self.record(cue.now, "start");
        cue.store.put(
            cue.key,
            RecordingSlot {
                updates: 0,
                done: self.updates_needed == 0,
            },
        );
    }

    fn update(&self, cue: &mut Cue<'_>) {
        self.record(cue.now, "update");
        let needed = self.updates_needed;
        if let Some(slot) = cue.store.get_mut::<RecordingSlot>(cue.key) {
            slot.updates += 1;
            if slot.updates >= needed {
                slot.done = true;
            }
        }
    }

    fn finish(&self, cue: &mut Cue<'_>) {
        self.record(cue.now, "finish");
    }
}

pub(crate) fn script(steps: Vec<Step>) -> Arc<Script> {
    Arc::new(Script {
        description: String::new(),
        auto_play: false,
        steps,
    })
}

pub(crate) fn step(index: usize, sequences: Vec<ActionSequence>) -> Step {
    Step {
        label: step_label(index),
        sequences,
    }
}

pub(crate) fn sequence(
    step_index: usize,
    seq_index: usize,
    actor: Option<&str>,
    actions: Vec<Arc<dyn Action>>,
) -> ActionSequence {
    ActionSequence {
        label: sequence_label(step_index, seq_index),
        actor: actor.map(str::to_string),
        actions: actions
            .into_iter()
            .enumerate()
            .map(|(index, action)| ScriptedAction {
                label: action_label(step_index, seq_index, index),
                action,
            })
            .collect(),
    }
}

pub(crate) fn run_ticks(player: &mut Player, stage: &mut MemoryStage, ticks: u32) {
    for _ in 0..ticks {
        player.advance(TICK, stage);
    }
}

pub(crate) fn raw_node(
    tag: &str,
    attributes: &[(&str, &str)],
    text: Option<&str>,
) -> RawActionNode {
    RawActionNode {
        tag: tag.to_string(),
        attributes: attributes
            .iter()
            .map(|(name, value)| (name.to_string(), value.to_string()))
            .collect::<BTreeMap<String, String>>(),
        text: text.map(str::to_string),
        span: SourceSpan {
            start: SourceLocation { line: 1, column: 1 },
            end: SourceLocation { line: 1, column: 1 },
        },
        label: "Step #0 Sequence #0 Action #0".to_string(),
    }
}

/// Drives a single action the way a sequence runner would, against a
/// private stage, store and journal.
pub(crate) struct ActionHarness {
    pub(crate) stage: MemoryStage,
    pub(crate) store: ContextStore,
    pub(crate) journal: Journal,
    pub(crate) services: Services,
    pub(crate) actor: Option<ObjectId>,
    pub(crate) now: Duration,
    key: ContextKey,
}

impl ActionHarness {
    pub(crate) fn new() -> Self {
        Self {
            stage: MemoryStage::new(),
            store: ContextStore::new(),
            journal: Journal::new(),
            services: Services::default(),
            actor: None,
            now: Duration::ZERO,
            key: ContextKey::new(0, 0, 0),
        }
    }

    fn cue(&mut self) -> Cue<'_> {
        let root = self.stage.root();
        Cue {
            key: self.key,
            label: "Step #0 Sequence #0 Action #0",
            actor: self.actor,
            root,
            now: self.now,
            dt: TICK,
            stage: &mut self.stage,
            store: &mut self.store,
            journal: &mut self.journal,
            services: &self.services,
        }
    }

    pub(crate) fn start(&mut self, action: &dyn Action) {
        let mut cue = self.cue();
        action.start(&mut cue);
    }

    pub(crate) fn update(&mut self, action: &dyn Action) {
        let mut cue = self.cue();
        action.update(&mut cue);
    }

    pub(crate) fn finish(&mut self, action: &dyn Action) {
        let mut cue = self.cue();
        action.finish(&mut cue);
    }

    pub(crate) fn is_done(&mut self, action: &dyn Action) -> bool {
        let cue = self.cue();
        action.is_done(&cue)
    }

    /// One scheduler-shaped tick: advance the clock, then either see the
    /// action done or update it once.
    pub(crate) fn tick(&mut self, action: &dyn Action) -> bool {
        self.now += TICK;
        if self.is_done(action) {
            return true;
        }
        self.update(action);
        false
    }
}
