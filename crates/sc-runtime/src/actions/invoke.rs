use std::sync::Arc;

use sc_core::{Action, Cue, Preflight, RawActionNode, ScriptError};

use super::OneShot;

/// Calls a registered host command with up to two string arguments. The
/// call fires when the action starts and the action is done immediately, so
/// it costs its sequence no time at all. A failing command is journaled,
/// never fatal.
#[derive(Debug, Clone)]
pub struct InvokeAction {
    command: String,
    args: Vec<String>,
}

impl InvokeAction {
    pub fn new(command: impl Into<String>, args: Vec<String>) -> Self {
        Self {
            command: command.into(),
            args,
        }
    }

    pub(crate) fn from_node(node: &RawActionNode) -> Result<Arc<dyn Action>, ScriptError> {
        let command = node.required_attr("command")?.to_string();
        let mut args = Vec::new();
        if let Some(first) = node.attr("arg1") {
            args.push(first.to_string());
            if let Some(second) = node.attr("arg2") {
                args.push(second.to_string());
            }
        } else if node.attr("arg2").is_some() {
            return Err(ScriptError::with_span(
                "SCRIPT_ATTR_INVALID",
                "<invoke> uses \"arg2\" without \"arg1\".",
                node.span,
            ));
        }
        Ok(Arc::new(Self::new(command, args)))
    }
}

impl Action for InvokeAction {
    fn is_done(&self, cue: &Cue<'_>) -> bool {
        cue.store
            .get::<OneShot>(cue.key)
            .map_or(false, |slot| slot.fired)
    }

    fn start(&self, cue: &mut Cue<'_>) {
        let outcome = cue.services.commands.call(&self.command, &self.args);
        match outcome {
            Ok(()) => cue.note(format!("invoked \"{}\"", self.command)),
            Err(error) => cue.warn(format!("command \"{}\" failed: {}", self.command, error)),
        }
        cue.store.put(cue.key, OneShot { fired: true });
    }

    fn update(&self, _cue: &mut Cue<'_>) {}

    fn validate(&self, check: &Preflight<'_>) -> Vec<String> {
        if check.commands.names().iter().any(|name| name == &self.command) {
            Vec::new()
        } else {
            vec![format!("unknown command \"{}\"", self.command)]
        }
    }
}
