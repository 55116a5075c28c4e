mod activate;
mod animate;
mod invoke;
mod move_along;
mod pause;
mod play_script;
mod speak;

pub use activate::ActivateAction;
pub use animate::AnimateAction;
pub use invoke::InvokeAction;
pub use move_along::MoveAction;
pub use pause::PauseAction;
pub use play_script::PlayScriptAction;
pub use speak::SpeakAction;

use sc_core::{ActionConstructor, ActionRegistry};

/// Context slot for actions that do their work in a single visit.
#[derive(Debug, Default, Clone, Copy)]
pub(crate) struct OneShot {
    pub(crate) fired: bool,
}

/// Registry with every built-in action tag registered.
pub fn builtin_registry() -> ActionRegistry {
    let mut registry = ActionRegistry::new();
    let builtins: &[(&str, ActionConstructor)] = &[
        ("activate", ActivateAction::activate_from_node),
        ("deactivate", ActivateAction::deactivate_from_node),
        ("animate", AnimateAction::from_node),
        ("move", MoveAction::from_node),
        ("pause", PauseAction::from_node),
        ("invoke", InvokeAction::from_node),
        ("speak", SpeakAction::from_node),
        ("play-script", PlayScriptAction::from_node),
    ];
    for (tag, constructor) in builtins {
        registry
            .register(*tag, *constructor)
            .expect("built-in action tags are unique");
    }
    registry
}
