use std::time::Duration;

use sc_core::{
    ActionSequence, ContextKey, ContextStore, Cue, Journal, ObjectId, Services, Stage,
};

use crate::actor::resolve_actor;

/// Per-tick state handed down the runner tree. Rebuilt by the player on
/// every advance; runners reborrow it per action visit.
pub(crate) struct TickContext<'a> {
    pub now: Duration,
    pub dt: Duration,
    pub root: ObjectId,
    pub stage: &'a mut dyn Stage,
    pub store: &'a mut ContextStore,
    pub journal: &'a mut Journal,
    pub services: &'a Services,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum SequenceState {
    NotStarted,
    Running,
    Done,
}

/// Drives one sequence strictly in order. The runner only tracks which
/// action is current; the actions' own state lives in the context store.
pub(crate) struct SequenceRunner {
    step: u32,
    sequence: u32,
    state: SequenceState,
    action_index: usize,
    actor: Option<ObjectId>,
}

impl SequenceRunner {
    pub(crate) fn new(step: u32, sequence: u32) -> Self {
        Self {
            step,
            sequence,
            state: SequenceState::NotStarted,
            action_index: 0,
            actor: None,
        }
    }

    pub(crate) fn is_done(&self) -> bool {
        self.state == SequenceState::Done
    }

    /// Resolves the actor and starts the first action. A sequence whose
    /// actor cannot be found is skipped wholesale: the failure is journaled
    /// and the sequence reports done so the step never stalls on it.
    pub(crate) fn start(&mut self, seq: &ActionSequence, tick: &mut TickContext<'_>) {
        if let Some(actor_name) = seq.actor.as_deref() {
            match resolve_actor(&*tick.stage, tick.root, actor_name) {
                Some(id) => self.actor = Some(id),
                None => {
                    tick.journal.warn(format!(
                        "{}: actor \"{}\" was not found under the playback root; skipping sequence",
                        seq.label, actor_name
                    ));
                    self.state = SequenceState::Done;
                    return;
                }
            }
        }
        if seq.actions.is_empty() {
            self.state = SequenceState::Done;
            return;
        }
        self.state = SequenceState::Running;
        self.action_index = 0;
        let scripted = &seq.actions[0];
        let mut cue = self.cue(0, &scripted.label, tick);
        scripted.action.start(&mut cue);
    }

    /// One tick of progress. Completed actions cascade: when the current
    /// action reports done it is finished and its successor starts within
    /// the same tick, repeating while successors are already done. At most
    /// one `update` runs per tick.
    pub(crate) fn update(&mut self, seq: &ActionSequence, tick: &mut TickContext<'_>) {
        if self.state != SequenceState::Running {
            return;
        }
        loop {
            if self.action_index >= seq.actions.len() {
                self.state = SequenceState::Done;
                return;
            }
            let index = self.action_index;
            let scripted = &seq.actions[index];
            let done = {
                let cue = self.cue(index as u32, &scripted.label, tick);
                scripted.action.is_done(&cue)
            };
            if done {
                {
                    let mut cue = self.cue(index as u32, &scripted.label, tick);
                    scripted.action.finish(&mut cue);
                }
                self.action_index += 1;
                if self.action_index >= seq.actions.len() {
                    self.state = SequenceState::Done;
                    return;
                }
                let next_index = self.action_index;
                let next = &seq.actions[next_index];
                let mut cue = self.cue(next_index as u32, &next.label, tick);
                next.action.start(&mut cue);
                continue;
            }
            let mut cue = self.cue(index as u32, &scripted.label, tick);
            scripted.action.update(&mut cue);
            return;
        }
    }

    fn cue<'c>(&self, action: u32, label: &'c str, tick: &'c mut TickContext<'_>) -> Cue<'c> {
        Cue {
            key: ContextKey::new(self.step, self.sequence, action),
            label,
            actor: self.actor,
            root: tick.root,
            now: tick.now,
            dt: tick.dt,
            stage: &mut *tick.stage,
            store: &mut *tick.store,
            journal: &mut *tick.journal,
            services: tick.services,
        }
    }
}
