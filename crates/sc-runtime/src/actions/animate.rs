use std::sync::Arc;

use sc_core::{Action, Cue, RawActionNode, ScriptError};

use super::OneShot;

/// Switches the bound actor to a named animation state. Rejected states are
/// journaled; either way the action is done after its single update.
#[derive(Debug, Clone)]
pub struct AnimateAction {
    state: String,
}

impl AnimateAction {
    pub fn new(state: impl Into<String>) -> Self {
        Self {
            state: state.into(),
        }
    }

    pub(crate) fn from_node(node: &RawActionNode) -> Result<Arc<dyn Action>, ScriptError> {
        Ok(Arc::new(Self::new(node.required_attr("state")?)))
    }
}

impl Action for AnimateAction {
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
            Some(actor) => {
                if !cue.stage.play_animation(actor, &self.state) {
                    cue.warn(format!(
                        "animation state \"{}\" was not accepted",
                        self.state
                    ));
                }
            }
            None => cue.warn("no actor is bound; nothing to animate"),
        }
        if let Some(slot) = cue.store.get_mut::<OneShot>(cue.key) {
            slot.fired = true;
        }
    }
}
