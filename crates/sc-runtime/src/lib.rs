pub mod actions;
pub mod actor;
pub mod host;
pub mod player;
mod sequence;
mod step;

#[cfg(test)]
pub(crate) mod test_support;

pub use actions::{
    builtin_registry, ActivateAction, AnimateAction, InvokeAction, MoveAction, PauseAction,
    PlayScriptAction, SpeakAction,
};
pub use actor::resolve_actor;
pub use host::{InstantTypist, MemoryStage, StaticResources};
pub use player::{PlaybackState, Player, PlayerOptions};
