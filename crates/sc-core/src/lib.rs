pub mod action;
pub mod context;
pub mod duration;
pub mod error;
pub mod journal;
pub mod registry;
pub mod script;
pub mod services;
pub mod stage;

pub use action::{Action, Cue, Placeholder, Preflight};
pub use context::{ContextKey, ContextStore};
pub use duration::parse_duration;
pub use error::{ScriptError, SourceLocation, SourceSpan};
pub use journal::Journal;
pub use registry::{ActionConstructor, ActionRegistry, RawActionNode};
pub use script::{
    action_label, sequence_label, step_label, ActionSequence, Script, ScriptedAction, Step,
};
pub use services::{
    ChoiceSide, CommandRegistry, CommandTable, MapScripts, NullCommands, NullResources,
    NullScripts, NullTypist, ResourceLibrary, ScriptLibrary, Services, SpeakChoice,
    TemplateSender, TemplateTicket, TicketPoll, Typist, TypistProgress, TypistTicket,
};
pub use stage::{Facing, ObjectId, Stage, TemplateHandle, Vec2};
