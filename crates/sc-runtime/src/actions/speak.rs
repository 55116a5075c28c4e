use std::sync::Arc;

use sc_core::{
    Action, ChoiceSide, Cue, ObjectId, Preflight, RawActionNode, ScriptError, SpeakChoice,
    TemplateTicket, TicketPoll, TypistProgress, TypistTicket,
};

use crate::actor::resolve_actor;

/// Shows a dialogue line in a bubble object and waits for the player to
/// read and acknowledge it, optionally picking one of two answers.
///
/// The bubble is looked up in the scene first (a disabled template object
/// to clone); otherwise it is fetched through the resource library, which
/// may take any number of ticks. Every failure on the way degrades to a
/// journal warning and completes the action, so the cutscene moves on.
#[derive(Debug, Clone)]
pub struct SpeakAction {
    bubble: String,
    text: String,
    choice: Option<SpeakChoice>,
    on_choice: Option<String>,
}

#[derive(Debug)]
struct SpeakSlot {
    phase: SpeakPhase,
    bubble: Option<ObjectId>,
}

#[derive(Debug)]
enum SpeakPhase {
    Fetching(TemplateTicket),
    Typing(TypistTicket),
    Done,
}

impl SpeakAction {
    pub fn new(
        bubble: impl Into<String>,
        text: impl Into<String>,
        choice: Option<SpeakChoice>,
        on_choice: Option<String>,
    ) -> Self {
        Self {
            bubble: bubble.into(),
            text: text.into(),
            choice,
            on_choice,
        }
    }

    pub(crate) fn from_node(node: &RawActionNode) -> Result<Arc<dyn Action>, ScriptError> {
        let bubble = node.required_attr("bubble")?.to_string();
        let text = node.required_text()?.to_string();
        let choice = match (node.attr("yes"), node.attr("no")) {
            (Some(first), Some(second)) => Some(SpeakChoice {
                first: first.to_string(),
                second: second.to_string(),
            }),
            (None, None) => None,
            _ => {
                return Err(ScriptError::with_span(
                    "SCRIPT_ATTR_INVALID",
                    "<speak> needs both \"yes\" and \"no\" to offer a choice.",
                    node.span,
                ))
            }
        };
        let on_choice = node.attr("on-choice").map(str::to_string);
        if on_choice.is_some() && choice.is_none() {
            return Err(ScriptError::with_span(
                "SCRIPT_ATTR_INVALID",
                "<speak> uses \"on-choice\" without offering a choice.",
                node.span,
            ));
        }
        Ok(Arc::new(Self {
            bubble,
            text,
            choice,
            on_choice,
        }))
    }

    fn begin_typing(&self, cue: &mut Cue<'_>, bubble: ObjectId) -> TypistTicket {
        if let Some(actor) = cue.actor {
            if let Some(position) = cue.stage.position(actor) {
                cue.stage.set_position(bubble, position);
            }
        }
        cue.stage.set_enabled(bubble, true);
        cue.services
            .typist
            .begin(bubble, &self.text, self.choice.as_ref())
    }

    fn report_choice(&self, cue: &mut Cue<'_>, side: ChoiceSide) {
        let Some(choice) = &self.choice else {
            return;
        };
        let label = choice.label(side).to_string();
        cue.note(format!("choice \"{}\" selected", label));
        if let Some(command) = &self.on_choice {
            if let Err(error) = cue.services.commands.call(command, &[label]) {
                cue.warn(format!("on-choice command \"{}\" failed: {}", command, error));
            }
        }
    }
}

impl Action for SpeakAction {
    fn is_done(&self, cue: &Cue<'_>) -> bool {
        cue.store
            .get::<SpeakSlot>(cue.key)
            .map_or(false, |slot| matches!(slot.phase, SpeakPhase::Done))
    }

    fn start(&self, cue: &mut Cue<'_>) {
        let slot = if let Some(template) = resolve_actor(&*cue.stage, cue.root, &self.bubble) {
            match cue.stage.clone_object(template) {
                Some(bubble) => {
                    let ticket = self.begin_typing(cue, bubble);
                    SpeakSlot {
                        phase: SpeakPhase::Typing(ticket),
                        bubble: Some(bubble),
                    }
                }
                None => {
                    cue.warn(format!("bubble \"{}\" could not be cloned", self.bubble));
                    SpeakSlot {
                        phase: SpeakPhase::Done,
                        bubble: None,
                    }
                }
            }
        } else {
            SpeakSlot {
                phase: SpeakPhase::Fetching(cue.services.resources.fetch_template(&self.bubble)),
                bubble: None,
            }
        };
        cue.store.put(cue.key, slot);
    }

    fn update(&self, cue: &mut Cue<'_>) {
        let Some(mut slot) = cue.store.take::<SpeakSlot>(cue.key) else {
            return;
        };
        match &mut slot.phase {
            SpeakPhase::Fetching(ticket) => match ticket.poll() {
                TicketPoll::Pending => {}
                TicketPoll::Ready(template) => match cue.stage.instantiate(&template) {
                    Some(bubble) => {
                        let ticket = self.begin_typing(cue, bubble);
                        slot.bubble = Some(bubble);
                        slot.phase = SpeakPhase::Typing(ticket);
                    }
                    None => {
                        cue.warn(format!(
                            "bubble template \"{}\" could not be instantiated",
                            self.bubble
                        ));
                        slot.phase = SpeakPhase::Done;
                    }
                },
                TicketPoll::Failed(error) => {
                    cue.warn(format!(
                        "bubble \"{}\" is unavailable: {}",
                        self.bubble, error
                    ));
                    slot.phase = SpeakPhase::Done;
                }
            },
            SpeakPhase::Typing(ticket) => match cue.services.typist.poll(*ticket) {
                TypistProgress::Typing | TypistProgress::AwaitingAck => {}
                TypistProgress::Done { choice } => {
                    if let Some(side) = choice {
                        self.report_choice(cue, side);
                    }
                    slot.phase = SpeakPhase::Done;
                }
            },
            SpeakPhase::Done => {}
        }
        cue.store.put(cue.key, slot);
    }

    /// Despawns the bubble. The slot itself stays so the occurrence keeps
    /// reporting done.
    fn finish(&self, cue: &mut Cue<'_>) {
        let bubble = cue
            .store
            .get_mut::<SpeakSlot>(cue.key)
            .and_then(|slot| slot.bubble.take());
        if let Some(bubble) = bubble {
            cue.stage.despawn(bubble);
        }
    }

    fn validate(&self, check: &Preflight<'_>) -> Vec<String> {
        match &self.on_choice {
            Some(command) if !check.commands.names().iter().any(|name| name == command) => {
                vec![format!("unknown on-choice command \"{}\"", command)]
            }
            _ => Vec::new(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::host::InstantTypist;
    use crate::test_support::{raw_node, ActionHarness};
    use sc_core::{
        CommandTable, ResourceLibrary, Services, Stage, TemplateHandle, TemplateSender,
    };
    use std::sync::Mutex;

    fn instant_services() -> Services {
        Services {
            typist: Arc::new(InstantTypist::default()),
            ..Services::default()
        }
    }

    fn speaking_harness() -> ActionHarness {
        let mut harness = ActionHarness::new();
        harness.services = instant_services();
        let root = harness.stage.root();
        let hero = harness.stage.add_object(root, "hero");
        harness.actor = Some(hero);
        harness
    }

    #[test]
    fn local_bubble_is_cloned_typed_and_despawned() {
        let mut harness = speaking_harness();
        let root = harness.stage.root();
        let template = harness.stage.add_object(root, "SpeechBubble");
        harness.stage.enable(template, false);

        let action = SpeakAction::new("SpeechBubble", "Hello!", None, None);
        harness.start(&action);
        assert!(!harness.is_done(&action));

        // InstantTypist finishes on the first poll.
        harness.update(&action);
        assert!(harness.is_done(&action));

        harness.finish(&action);
        let events = harness.stage.events();
        assert!(events.contains(&"clone SpeechBubble".to_string()));
        assert!(events.contains(&"enable SpeechBubble".to_string()));
        assert!(events.contains(&"despawn SpeechBubble".to_string()));
        // The template itself is untouched.
        assert_eq!(
            resolve_actor(&harness.stage, root, "SpeechBubble"),
            Some(template)
        );
    }

    struct ChannelResources {
        sender: Mutex<Option<TemplateSender>>,
    }

    impl ResourceLibrary for ChannelResources {
        fn fetch_template(&self, _name: &str) -> TemplateTicket {
            let (sender, ticket) = TemplateTicket::channel();
            if let Ok(mut slot) = self.sender.lock() {
                *slot = Some(sender);
            }
            ticket
        }
    }

    #[test]
    fn remote_bubble_waits_for_the_fetch() {
        let mut harness = speaking_harness();
        harness.stage.add_template("balloon");
        let resources = Arc::new(ChannelResources {
            sender: Mutex::new(None),
        });
        harness.services.resources = resources.clone();

        let action = SpeakAction::new("balloon", "Hi there", None, None);
        harness.start(&action);
        for _ in 0..3 {
            harness.update(&action);
            assert!(!harness.is_done(&action), "pending fetch must not complete");
        }

        let sender = resources
            .sender
            .lock()
            .expect("sender mutex")
            .take()
            .expect("fetch should have been issued");
        sender
            .send(Ok(TemplateHandle("balloon".to_string())))
            .expect("ticket receiver should be alive");

        harness.update(&action); // instantiates, begins typing
        harness.update(&action); // instant typist completes
        assert!(harness.is_done(&action));
        assert!(harness
            .stage
            .events()
            .contains(&"spawn balloon".to_string()));
    }

    #[test]
    fn failed_fetch_warns_and_completes() {
        let mut harness = speaking_harness();
        let action = SpeakAction::new("missing", "Hm.", None, None);
        harness.start(&action);
        harness.update(&action);
        assert!(harness.is_done(&action));
        assert!(harness.journal.has_warning("missing"));
    }

    #[test]
    fn choice_fires_the_on_choice_command() {
        let calls = Arc::new(Mutex::new(Vec::new()));
        let sink = Arc::clone(&calls);
        let mut table = CommandTable::new();
        table.register("remember-answer", move |args| {
            sink.lock().expect("call log mutex").push(args.to_vec());
            Ok(())
        });

        let mut harness = speaking_harness();
        harness.services.commands = Arc::new(table);
        let root = harness.stage.root();
        harness.stage.add_object(root, "SpeechBubble");

        let choice = SpeakChoice {
            first: "Sure!".to_string(),
            second: "No way".to_string(),
        };
        let action = SpeakAction::new(
            "SpeechBubble",
            "Coming along?",
            Some(choice),
            Some("remember-answer".to_string()),
        );
        harness.start(&action);
        harness.update(&action);
        assert!(harness.is_done(&action));
        assert_eq!(
            calls.lock().expect("call log mutex").as_slice(),
            &[vec!["Sure!".to_string()]]
        );
    }

    #[test]
    fn bubble_opens_at_the_speaker_position() {
        let mut harness = speaking_harness();
        let hero = harness.actor.expect("harness binds an actor");
        harness.stage.place(hero, sc_core::Vec2::new(3.0, 1.0));
        let root = harness.stage.root();
        let template = harness.stage.add_object(root, "SpeechBubble");

        let action = SpeakAction::new("SpeechBubble", "Over here", None, None);
        harness.start(&action);

        let clone = harness
            .stage
            .children_of(root)
            .into_iter()
            .find(|id| *id != template && *id != hero && harness.stage.name_of(*id) == Some("SpeechBubble"))
            .expect("a bubble clone should exist");
        assert_eq!(
            harness.stage.position(clone),
            Some(sc_core::Vec2::new(3.0, 1.0))
        );
    }

    #[test]
    fn choice_attrs_must_come_in_pairs() {
        let node = raw_node("speak", &[("bubble", "b"), ("yes", "Sure")], Some("Hi"));
        let error = SpeakAction::from_node(&node).expect_err("should reject");
        assert_eq!(error.code, "SCRIPT_ATTR_INVALID");
    }

    #[test]
    fn text_is_required() {
        let node = raw_node("speak", &[("bubble", "b")], None);
        let error = SpeakAction::from_node(&node).expect_err("should reject");
        assert_eq!(error.code, "SCRIPT_TEXT_MISSING");
    }

    #[test]
    fn validate_checks_the_on_choice_command() {
        let choice = SpeakChoice {
            first: "a".to_string(),
            second: "b".to_string(),
        };
        let action = SpeakAction::new("b", "t", Some(choice), Some("ghost-command".to_string()));
        let table = CommandTable::new();
        let check = Preflight { commands: &table };
        let issues = action.validate(&check);
        assert_eq!(issues.len(), 1);
        assert!(issues[0].contains("ghost-command"));
    }
}
