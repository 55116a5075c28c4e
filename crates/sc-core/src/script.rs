use std::sync::Arc;

use crate::action::Action;

/// Parsed cutscene document. Steps run strictly in order; the sequences
/// inside one step run in parallel. The tree is immutable after loading and
/// may be shared between any number of players.
#[derive(Debug)]
pub struct Script {
    pub description: String,
    pub auto_play: bool,
    pub steps: Vec<Step>,
}

#[derive(Debug)]
pub struct Step {
    pub label: String,
    pub sequences: Vec<ActionSequence>,
}

#[derive(Debug)]
pub struct ActionSequence {
    pub label: String,
    /// Scene-object name resolved against the playback root when the
    /// sequence starts. `None` means the sequence targets no actor.
    pub actor: Option<String>,
    pub actions: Vec<ScriptedAction>,
}

/// One action occurrence inside a sequence, carrying the stable debug name
/// the loader assigned to it.
#[derive(Debug, Clone)]
pub struct ScriptedAction {
    pub label: String,
    pub action: Arc<dyn Action>,
}

pub fn step_label(step: usize) -> String {
    format!("Step #{}", step)
}

pub fn sequence_label(step: usize, sequence: usize) -> String {
    format!("Step #{} Sequence #{}", step, sequence)
}

pub fn action_label(step: usize, sequence: usize, action: usize) -> String {
    format!("Step #{} Sequence #{} Action #{}", step, sequence, action)
}
