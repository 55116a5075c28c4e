use std::sync::Arc;

use sc_core::{Action, Cue, RawActionNode, ScriptError};

use super::OneShot;

/// Enables or disables the bound actor. The toggle happens during the
/// action's single update, so it is observable in the tick that reaches it
/// and done on the next done-check.
#[derive(Debug, Clone)]
pub struct ActivateAction {
    enable: bool,
}

impl ActivateAction {
    pub fn activate() -> Self {
        Self { enable: true }
    }

    pub fn deactivate() -> Self {
        Self { enable: false }
    }

    pub(crate) fn activate_from_node(
        _node: &RawActionNode,
    ) -> Result<Arc<dyn Action>, ScriptError> {
        Ok(Arc::new(Self::activate()))
    }

    pub(crate) fn deactivate_from_node(
        _node: &RawActionNode,
    ) -> Result<Arc<dyn Action>, ScriptError> {
        Ok(Arc::new(Self::deactivate()))
    }
}

impl Action for ActivateAction {
    fn is_done(&self, cue: &Cue<'_>) -> bool {
        cue.store
            .get::<OneShot>(cue.key)
            .map_or(false, |slot| slot.fired)
    }

    fn start(&self, cue: &mut Cue<'_>) {
        cue.store.put(cue.key, OneShot::default());
    }

    fn update(&self, cue: &mut Cue<'_>) {
        match cue.actor {
            Some(actor) => cue.stage.set_enabled(actor, self.enable),
            None => cue.warn(if self.enable {
                "no actor is bound; nothing to activate"
            } else {
                "no actor is bound; nothing to deactivate"
            }),
        }
        if let Some(slot) = cue.store.get_mut::<OneShot>(cue.key) {
            slot.fired = true;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::ActionHarness;
    use sc_core::Stage;

    #[test]
    fn toggles_the_actor_after_one_update() {
        let mut harness = ActionHarness::new();
        let root = harness.stage.root();
        let door = harness.stage.add_object(root, "door");
        harness.stage.enable(door, false);
        harness.actor = Some(door);

        let action = ActivateAction::activate();
        harness.start(&action);
        assert!(!harness.is_done(&action));

        harness.update(&action);
        assert!(harness.stage.is_enabled(door));
        assert!(harness.is_done(&action));

        let off = ActivateAction::deactivate();
        harness.start(&off);
        harness.update(&off);
        assert!(!harness.stage.is_enabled(door));
    }

    #[test]
    fn missing_actor_warns_and_still_completes() {
        let mut harness = ActionHarness::new();
        let action = ActivateAction::activate();
        harness.start(&action);
        harness.update(&action);
        assert!(harness.is_done(&action));
        assert!(harness.journal.has_warning("nothing to activate"));
    }
}
