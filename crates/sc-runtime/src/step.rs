use sc_core::Step;

use crate::sequence::{SequenceRunner, TickContext};

/// Drives the sequences of one step in parallel. A step is done when every
/// sequence is done; sequences are visited in declaration order each tick.
pub(crate) struct StepRunner {
    sequences: Vec<SequenceRunner>,
}

impl StepRunner {
    pub(crate) fn new(step_index: u32, step: &Step) -> Self {
        Self {
            sequences: (0..step.sequences.len())
                .map(|sequence| SequenceRunner::new(step_index, sequence as u32))
                .collect(),
        }
    }

    pub(crate) fn start(&mut self, step: &Step, tick: &mut TickContext<'_>) {
        for (runner, seq) in self.sequences.iter_mut().zip(&step.sequences) {
            runner.start(seq, tick);
        }
    }

    /// Ticks every unfinished sequence once; returns whether the step is
    /// now done.
    pub(crate) fn update(&mut self, step: &Step, tick: &mut TickContext<'_>) -> bool {
        for (runner, seq) in self.sequences.iter_mut().zip(&step.sequences) {
            if !runner.is_done() {
                runner.update(seq, tick);
            }
        }
        self.is_done()
    }

    pub(crate) fn is_done(&self) -> bool {
        self.sequences.iter().all(SequenceRunner::is_done)
    }
}
