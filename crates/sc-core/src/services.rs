use std::collections::BTreeMap;
use std::sync::Arc;

use crossbeam_channel::{bounded, Receiver, Sender, TryRecvError};

use crate::error::ScriptError;
use crate::script::Script;
use crate::stage::{ObjectId, TemplateHandle};

/// Result of polling an in-flight template fetch.
#[derive(Debug, Clone, PartialEq)]
pub enum TicketPoll {
    Pending,
    Ready(TemplateHandle),
    Failed(ScriptError),
}

pub type TemplateSender = Sender<Result<TemplateHandle, ScriptError>>;

/// Handle to a template fetch that may complete on another thread. Polled
/// non-blockingly from the tick loop; once the fetch settles the outcome is
/// cached so later polls are cheap.
#[derive(Debug)]
pub struct TemplateTicket {
    waiting: Option<Receiver<Result<TemplateHandle, ScriptError>>>,
    settled: Option<Result<TemplateHandle, ScriptError>>,
}

impl TemplateTicket {
    /// A ticket that is already resolved, for synchronous libraries.
    pub fn ready(template: TemplateHandle) -> Self {
        Self {
            waiting: None,
            settled: Some(Ok(template)),
        }
    }

    pub fn failed(error: ScriptError) -> Self {
        Self {
            waiting: None,
            settled: Some(Err(error)),
        }
    }

    /// A pending ticket plus the sender that settles it, possibly from
    /// another thread. Dropping the sender without sending fails the fetch.
    pub fn channel() -> (TemplateSender, Self) {
        let (sender, receiver) = bounded(1);
        (
            sender,
            Self {
                waiting: Some(receiver),
                settled: None,
            },
        )
    }

    pub fn poll(&mut self) -> TicketPoll {
        if self.settled.is_none() {
            if let Some(receiver) = &self.waiting {
                match receiver.try_recv() {
                    Ok(outcome) => {
                        self.settled = Some(outcome);
                        self.waiting = None;
                    }
                    Err(TryRecvError::Empty) => return TicketPoll::Pending,
                    Err(TryRecvError::Disconnected) => {
                        self.settled = Some(Err(ScriptError::new(
                            "RESOURCE_FETCH_ABANDONED",
                            "template fetch ended without a result.",
                        )));
                        self.waiting = None;
                    }
                }
            }
        }
        match &self.settled {
            Some(Ok(template)) => TicketPoll::Ready(template.clone()),
            Some(Err(error)) => TicketPoll::Failed(error.clone()),
            None => TicketPoll::Pending,
        }
    }
}

/// Asynchronous asset boundary: looks up template objects by name, out of
/// band of the tick loop.
pub trait ResourceLibrary: Send + Sync {
    fn fetch_template(&self, name: &str) -> TemplateTicket;
}

#[derive(Debug, Default)]
pub struct NullResources;

impl ResourceLibrary for NullResources {
    fn fetch_template(&self, name: &str) -> TemplateTicket {
        TemplateTicket::failed(ScriptError::new(
            "RESOURCE_LIBRARY_MISSING",
            format!("no resource library is installed; cannot fetch \"{}\".", name),
        ))
    }
}

/// Two-way choice offered at the end of a dialogue line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SpeakChoice {
    pub first: String,
    pub second: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChoiceSide {
    First,
    Second,
}

impl SpeakChoice {
    pub fn label(&self, side: ChoiceSide) -> &str {
        match side {
            ChoiceSide::First => &self.first,
            ChoiceSide::Second => &self.second,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct TypistTicket(pub u64);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TypistProgress {
    /// Text is still being revealed.
    Typing,
    /// All text shown; waiting for the player to acknowledge or choose.
    AwaitingAck,
    Done {
        choice: Option<ChoiceSide>,
    },
}

/// Dialogue collaborator: reveals text progressively inside a bubble object
/// and reports when the player has acknowledged it.
pub trait Typist: Send + Sync {
    fn begin(&self, bubble: ObjectId, text: &str, choice: Option<&SpeakChoice>) -> TypistTicket;
    fn poll(&self, ticket: TypistTicket) -> TypistProgress;
}

/// Default typist: every line it is asked for is already finished, with no
/// choice taken.
#[derive(Debug, Default)]
pub struct NullTypist;

impl Typist for NullTypist {
    fn begin(&self, _bubble: ObjectId, _text: &str, _choice: Option<&SpeakChoice>) -> TypistTicket {
        TypistTicket(0)
    }

    fn poll(&self, _ticket: TypistTicket) -> TypistProgress {
        TypistProgress::Done { choice: None }
    }
}

/// Host commands scripts can invoke by name with up to two string arguments.
pub trait CommandRegistry: Send + Sync {
    fn call(&self, name: &str, args: &[String]) -> Result<(), ScriptError>;
    fn names(&self) -> &[String];
}

#[derive(Debug, Default)]
pub struct NullCommands {
    names: Vec<String>,
}

impl CommandRegistry for NullCommands {
    fn call(&self, name: &str, _args: &[String]) -> Result<(), ScriptError> {
        Err(ScriptError::new(
            "COMMAND_REGISTRY_MISSING",
            format!("no command registry is installed; cannot call \"{}\".", name),
        ))
    }

    fn names(&self) -> &[String] {
        &self.names
    }
}

type CommandFn = Box<dyn Fn(&[String]) -> Result<(), ScriptError> + Send + Sync>;

/// Closure-backed command table hosts populate at startup.
#[derive(Default)]
pub struct CommandTable {
    entries: BTreeMap<String, CommandFn>,
    names: Vec<String>,
}

impl std::fmt::Debug for CommandTable {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CommandTable")
            .field("names", &self.names)
            .finish_non_exhaustive()
    }
}

impl CommandTable {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn register(
        &mut self,
        name: impl Into<String>,
        command: impl Fn(&[String]) -> Result<(), ScriptError> + Send + Sync + 'static,
    ) {
        let name = name.into();
        if self
            .entries
            .insert(name.clone(), Box::new(command))
            .is_none()
        {
            self.names.push(name);
        }
    }
}

impl CommandRegistry for CommandTable {
    fn call(&self, name: &str, args: &[String]) -> Result<(), ScriptError> {
        match self.entries.get(name) {
            Some(command) => command(args),
            None => Err(ScriptError::new(
                "COMMAND_NOT_FOUND",
                format!("command \"{}\" is not registered.", name),
            )),
        }
    }

    fn names(&self) -> &[String] {
        &self.names
    }
}

/// Name-keyed lookup of other loaded scripts, used for nested playback.
pub trait ScriptLibrary: Send + Sync {
    fn script(&self, name: &str) -> Option<Arc<Script>>;
}

#[derive(Debug, Default)]
pub struct NullScripts;

impl ScriptLibrary for NullScripts {
    fn script(&self, _name: &str) -> Option<Arc<Script>> {
        None
    }
}

#[derive(Debug, Default)]
pub struct MapScripts {
    scripts: BTreeMap<String, Arc<Script>>,
}

impl MapScripts {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, name: impl Into<String>, script: Arc<Script>) {
        self.scripts.insert(name.into(), script);
    }
}

impl ScriptLibrary for MapScripts {
    fn script(&self, name: &str) -> Option<Arc<Script>> {
        self.scripts.get(name).cloned()
    }
}

/// Collaborators a player needs beyond the stage itself. Defaults are inert
/// so hosts only wire up what their scripts actually use.
#[derive(Clone)]
pub struct Services {
    pub resources: Arc<dyn ResourceLibrary>,
    pub typist: Arc<dyn Typist>,
    pub commands: Arc<dyn CommandRegistry>,
    pub scripts: Arc<dyn ScriptLibrary>,
}

impl Default for Services {
    fn default() -> Self {
        Self {
            resources: Arc::new(NullResources),
            typist: Arc::new(NullTypist),
            commands: Arc::new(NullCommands::default()),
            scripts: Arc::new(NullScripts),
        }
    }
}
