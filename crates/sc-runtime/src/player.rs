use std::sync::Arc;
use std::time::Duration;

use sc_core::{
    ContextStore, Journal, NullCommands, NullResources, NullScripts, NullTypist, ObjectId, Script,
    Services, Stage,
};

use crate::sequence::TickContext;
use crate::step::StepRunner;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PlaybackState {
    Idle,
    Playing,
    Finished,
}

/// Collaborators and identity for a new player. Unset services fall back to
/// inert defaults, so a host only wires what its scripts use.
pub struct PlayerOptions {
    pub root: ObjectId,
    pub resources: Option<Arc<dyn sc_core::ResourceLibrary>>,
    pub typist: Option<Arc<dyn sc_core::Typist>>,
    pub commands: Option<Arc<dyn sc_core::CommandRegistry>>,
    pub scripts: Option<Arc<dyn sc_core::ScriptLibrary>>,
}

impl PlayerOptions {
    pub fn new(root: ObjectId) -> Self {
        Self {
            root,
            resources: None,
            typist: None,
            commands: None,
            scripts: None,
        }
    }
}

/// Drives one script at a time against a stage, advancing one tick per
/// `advance` call. Replaying or replacing a script drops all per-playback
/// state; nothing started under an earlier playback can touch a later one.
pub struct Player {
    root: ObjectId,
    services: Services,
    script: Option<Arc<Script>>,
    state: PlaybackState,
    paused: bool,
    clock: Duration,
    cursor: usize,
    current: Option<StepRunner>,
    store: ContextStore,
    journal: Journal,
}

impl Player {
    pub fn new(options: PlayerOptions) -> Self {
        let services = Services {
            resources: options
                .resources
                .unwrap_or_else(|| Arc::new(NullResources)),
            typist: options.typist.unwrap_or_else(|| Arc::new(NullTypist)),
            commands: options
                .commands
                .unwrap_or_else(|| Arc::new(NullCommands::default())),
            scripts: options.scripts.unwrap_or_else(|| Arc::new(NullScripts)),
        };
        Self::with_services(options.root, services)
    }

    pub fn with_services(root: ObjectId, services: Services) -> Self {
        Self {
            root,
            services,
            script: None,
            state: PlaybackState::Idle,
            paused: false,
            clock: Duration::ZERO,
            cursor: 0,
            current: None,
            store: ContextStore::new(),
            journal: Journal::new(),
        }
    }

    pub fn state(&self) -> PlaybackState {
        self.state
    }

    pub fn is_finished(&self) -> bool {
        self.state == PlaybackState::Finished
    }

    pub fn is_paused(&self) -> bool {
        self.paused
    }

    pub fn script(&self) -> Option<&Arc<Script>> {
        self.script.as_ref()
    }

    /// Index of the step being played; equals the step count once finished.
    pub fn current_step(&self) -> usize {
        self.cursor
    }

    pub fn root(&self) -> ObjectId {
        self.root
    }

    pub fn services(&self) -> &Services {
        &self.services
    }

    pub fn journal(&self) -> &Journal {
        &self.journal
    }

    pub fn drain_journal(&mut self) -> Vec<String> {
        self.journal.drain()
    }

    /// Begins playing `script`, replacing any playback in flight. The old
    /// playback's state store is dropped here, so work it left pending can
    /// never leak into the new one. With `start_paused` the first step is
    /// held back until `resume` and a later `advance`.
    pub fn play(&mut self, script: Arc<Script>, stage: &mut dyn Stage, start_paused: bool) {
        self.script = Some(Arc::clone(&script));
        self.state = PlaybackState::Playing;
        self.paused = start_paused;
        self.clock = Duration::ZERO;
        self.cursor = 0;
        self.current = None;
        self.store = ContextStore::new();
        self.journal = Journal::new();

        let title = if script.description.is_empty() {
            "(untitled)"
        } else {
            script.description.as_str()
        };
        self.journal.note(format!("playing {}", title));

        if !start_paused {
            self.start_current_step(&script, Duration::ZERO, stage);
        }
    }

    pub fn pause(&mut self) {
        if self.state == PlaybackState::Playing && !self.paused {
            self.paused = true;
            self.journal.note("playback paused");
        }
    }

    pub fn resume(&mut self) {
        if self.paused {
            self.paused = false;
            self.journal.note("playback resumed");
        }
    }

    /// Advances the playback clock by `dt` and ticks the current step. When
    /// a step completes, the next one starts and is ticked within the same
    /// call, so steps that finish instantly never cost a tick each. Does
    /// nothing while idle, finished or paused.
    pub fn advance(&mut self, dt: Duration, stage: &mut dyn Stage) {
        if self.state != PlaybackState::Playing || self.paused {
            return;
        }
        let Some(script) = self.script.clone() else {
            return;
        };
        self.clock += dt;
        loop {
            if self.cursor >= script.steps.len() {
                self.finish_playback();
                return;
            }
            if self.current.is_none() {
                self.start_current_step(&script, dt, stage);
            }
            let step = &script.steps[self.cursor];
            let Some(runner) = self.current.as_mut() else {
                return;
            };
            let mut tick = TickContext {
                now: self.clock,
                dt,
                root: self.root,
                stage: &mut *stage,
                store: &mut self.store,
                journal: &mut self.journal,
                services: &self.services,
            };
            if runner.update(step, &mut tick) {
                self.cursor += 1;
                self.current = None;
                continue;
            }
            return;
        }
    }

    fn start_current_step(&mut self, script: &Arc<Script>, dt: Duration, stage: &mut dyn Stage) {
        let Some(step) = script.steps.get(self.cursor) else {
            return;
        };
        let mut runner = StepRunner::new(self.cursor as u32, step);
        let mut tick = TickContext {
            now: self.clock,
            dt,
            root: self.root,
            stage: &mut *stage,
            store: &mut self.store,
            journal: &mut self.journal,
            services: &self.services,
        };
        runner.start(step, &mut tick);
        self.current = Some(runner);
    }

    fn finish_playback(&mut self) {
        self.state = PlaybackState::Finished;
        self.current = None;
        self.journal.note("playback finished");
    }
}
