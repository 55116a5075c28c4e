use std::sync::Arc;

use sc_core::{Action, Cue, RawActionNode, ScriptError};

use crate::player::{PlaybackState, Player};

/// Plays another script from the script library and blocks its sequence
/// until that playback finishes. The nested player shares the stage, root
/// and services of its parent but owns its clock, state store and journal;
/// its journal entries are forwarded to the parent tagged with the script
/// name.
#[derive(Debug, Clone)]
pub struct PlayScriptAction {
    name: String,
}

struct NestedSlot {
    child: Option<Player>,
    finished: bool,
}

impl PlayScriptAction {
    pub fn new(name: impl Into<String>) -> Self {
        Self { name: name.into() }
    }

    pub(crate) fn from_node(node: &RawActionNode) -> Result<Arc<dyn Action>, ScriptError> {
        Ok(Arc::new(Self::new(node.required_attr("name")?)))
    }
}

impl Action for PlayScriptAction {
    fn is_done(&self, cue: &Cue<'_>) -> bool {
        cue.store
            .get::<NestedSlot>(cue.key)
            .map_or(false, |slot| slot.finished)
    }

    fn start(&self, cue: &mut Cue<'_>) {
        let slot = match cue.services.scripts.script(&self.name) {
            Some(script) => {
                let mut child = Player::with_services(cue.root, cue.services.clone());
                child.play(script, &mut *cue.stage, false);
                cue.note(format!("nested script \"{}\" started", self.name));
                NestedSlot {
                    child: Some(child),
                    finished: false,
                }
            }
            None => {
                cue.warn(format!("script \"{}\" is not in the library", self.name));
                NestedSlot {
                    child: None,
                    finished: true,
                }
            }
        };
        cue.store.put(cue.key, slot);
    }

    fn update(&self, cue: &mut Cue<'_>) {
        let Some(mut slot) = cue.store.take::<NestedSlot>(cue.key) else {
            return;
        };
        if let Some(child) = slot.child.as_mut() {
            child.advance(cue.dt, &mut *cue.stage);
            for entry in child.drain_journal() {
                cue.journal.adopt(format!("[{}] {}", self.name, entry));
            }
            if child.state() == PlaybackState::Finished {
                slot.child = None;
                slot.finished = true;
            }
        }
        cue.store.put(cue.key, slot);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::actions::{ActivateAction, PauseAction};
    use crate::test_support::{script, sequence, step, ActionHarness};
    use sc_core::{MapScripts, Stage};
    use std::time::Duration;

    #[test]
    fn nested_script_runs_to_completion() {
        let mut harness = ActionHarness::new();
        let root = harness.stage.root();
        let door = harness.stage.add_object(root, "door");
        harness.stage.enable(door, false);

        let inner = script(vec![step(
            0,
            vec![sequence(
                0,
                0,
                Some("door"),
                vec![
                    Arc::new(PauseAction::new(Duration::from_millis(200))),
                    Arc::new(ActivateAction::activate()),
                ],
            )],
        )]);
        let mut library = MapScripts::new();
        library.insert("open-the-door", inner);
        harness.services.scripts = Arc::new(library);

        let action = PlayScriptAction::new("open-the-door");
        harness.start(&action);
        assert!(!harness.is_done(&action));

        let mut guard = 0;
        while !harness.tick(&action) {
            guard += 1;
            assert!(guard < 20, "nested playback should finish");
        }
        assert!(harness.stage.is_enabled(door));
    }

    #[test]
    fn nested_journal_is_forwarded_with_the_script_name() {
        let mut harness = ActionHarness::new();
        let inner = script(vec![step(
            0,
            vec![sequence(0, 0, Some("ghost"), vec![])],
        )]);
        let mut library = MapScripts::new();
        library.insert("haunt", inner);
        harness.services.scripts = Arc::new(library);

        let action = PlayScriptAction::new("haunt");
        harness.start(&action);
        while !harness.tick(&action) {}

        assert!(harness
            .journal
            .entries()
            .iter()
            .any(|entry| entry.starts_with("[haunt]") && entry.contains("ghost")));
    }

    #[test]
    fn unknown_script_warns_and_completes() {
        let mut harness = ActionHarness::new();
        let action = PlayScriptAction::new("nowhere");
        harness.start(&action);
        assert!(harness.is_done(&action));
        assert!(harness.journal.has_warning("nowhere"));
    }
}
