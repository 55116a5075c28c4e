//! High-level entry points that wire the parser and the runtime together.
//!
//! Hosts that want the default experience call [`load_script_from_xml`] and
//! hand the result to a [`Player`]. Hosts with custom actions register them
//! on an [`ActionRegistry`] and go through [`load_script_with_registry`].

use std::sync::Arc;

pub use sc_core::{
    parse_duration, Action, ActionConstructor, ActionRegistry, ActionSequence, ChoiceSide,
    CommandRegistry, CommandTable, ContextKey, ContextStore, Cue, Facing, Journal, MapScripts,
    NullCommands, NullResources, NullScripts, NullTypist, ObjectId, Placeholder, Preflight,
    RawActionNode, ResourceLibrary, Script, ScriptError, ScriptLibrary, ScriptedAction, Services,
    SourceLocation, SourceSpan, SpeakChoice, Stage, Step, TemplateHandle, TemplateSender,
    TemplateTicket, TicketPoll, Typist, TypistProgress, TypistTicket, Vec2,
};
pub use sc_parser::{parse_script, LoadOutcome};
pub use sc_runtime::actions::builtin_registry;
pub use sc_runtime::host::{InstantTypist, MemoryStage, StaticResources};
pub use sc_runtime::{resolve_actor, PlaybackState, Player, PlayerOptions};

/// Parses cutscene XML with the built-in action set.
///
/// Repairable problems (unknown tags, malformed attributes) come back as
/// warnings on the [`LoadOutcome`]; only structural failures are errors.
pub fn load_script_from_xml(source: &str) -> Result<LoadOutcome, ScriptError> {
    let registry = builtin_registry();
    parse_script(source, &registry)
}

/// Parses cutscene XML against a caller-supplied action registry.
///
/// The registry decides which tags exist; start from [`builtin_registry`]
/// and register game-specific actions on top.
pub fn load_script_with_registry(
    source: &str,
    registry: &ActionRegistry,
) -> Result<LoadOutcome, ScriptError> {
    parse_script(source, registry)
}

/// Options for [`create_player_from_xml`].
pub struct CreatePlayerFromXmlOptions<'a> {
    /// Cutscene XML source text.
    pub source: &'a str,
    /// Scene object the script's actor lookups descend from.
    pub root: ObjectId,
    /// Host services; [`Services::default`] fills in null implementations.
    pub services: Services,
}

/// Everything [`create_player_from_xml`] produces.
pub struct PlayerBundle {
    pub player: Player,
    pub script: Arc<Script>,
    /// Load-time repair warnings, in document order.
    pub warnings: Vec<String>,
}

/// Parses cutscene XML and builds a [`Player`] around it in one call.
///
/// The player comes back idle regardless of the script's `autoplay` flag;
/// the host checks [`Script::auto_play`] and calls [`Player::play`] when it
/// wants the cutscene to begin.
pub fn create_player_from_xml(
    options: CreatePlayerFromXmlOptions<'_>,
) -> Result<PlayerBundle, ScriptError> {
    let outcome = load_script_from_xml(options.source)?;
    let script = Arc::new(outcome.script);
    let player = Player::with_services(options.root, options.services);
    Ok(PlayerBundle {
        player,
        script,
        warnings: outcome.warnings,
    })
}

/// Walks every action in the script and collects validation issues.
///
/// Issues are prefixed with the owning action's label so a reporting tool
/// can point at the offending node without re-parsing the document.
pub fn verify_script(script: &Script, commands: &dyn CommandRegistry) -> Vec<String> {
    let check = Preflight { commands };
    let mut issues = Vec::new();
    for step in &script.steps {
        for sequence in &step.sequences {
            for scripted in &sequence.actions {
                for issue in scripted.action.validate(&check) {
                    issues.push(format!("{}: {}", scripted.label, issue));
                }
            }
        }
    }
    issues
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    const TICK: Duration = Duration::from_millis(100);

    fn run_to_finish(player: &mut Player, stage: &mut MemoryStage) {
        let mut guard = 0;
        while !player.is_finished() {
            player.advance(TICK, stage);
            guard += 1;
            assert!(guard < 100, "playback should settle well before 10s");
        }
    }

    #[test]
    fn load_script_from_xml_builds_runnable_scripts() {
        let source = r#"
            <cutscene description="door opener">
              <step>
                <sequence actor="door">
                  <pause duration="200ms"/>
                  <activate/>
                </sequence>
              </step>
            </cutscene>
        "#;
        let outcome = load_script_from_xml(source).expect("load should pass");
        assert!(outcome.warnings.is_empty(), "clean source loads cleanly");

        let mut stage = MemoryStage::new();
        let door = stage.add_object(stage.root(), "door");
        stage.enable(door, false);

        let mut player = Player::with_services(stage.root(), Services::default());
        player.play(Arc::new(outcome.script), &mut stage, false);
        run_to_finish(&mut player, &mut stage);

        assert!(stage.is_enabled(door), "door activates after the pause");
    }

    #[test]
    fn create_player_from_xml_returns_an_idle_player() {
        let source = r#"
            <cutscene autoplay="true">
              <step>
                <sequence actor="door"><activate/></sequence>
              </step>
            </cutscene>
        "#;
        let mut stage = MemoryStage::new();
        let bundle = create_player_from_xml(CreatePlayerFromXmlOptions {
            source,
            root: stage.root(),
            services: Services::default(),
        })
        .expect("create should pass");

        assert_eq!(bundle.player.state(), PlaybackState::Idle);
        assert!(bundle.script.auto_play, "autoplay flag survives the load");

        let door = stage.add_object(stage.root(), "door");
        stage.enable(door, false);
        let mut player = bundle.player;
        player.play(bundle.script, &mut stage, false);
        run_to_finish(&mut player, &mut stage);
        assert!(stage.is_enabled(door));
    }

    #[test]
    fn verify_script_flags_unknown_commands() {
        let source = r#"
            <cutscene>
              <step>
                <sequence>
                  <invoke command="grant-key"/>
                  <invoke command="open-gate"/>
                </sequence>
              </step>
            </cutscene>
        "#;
        let outcome = load_script_from_xml(source).expect("load should pass");

        let issues = verify_script(&outcome.script, &NullCommands::default());
        assert_eq!(issues.len(), 2, "both commands are unknown to NullCommands");
        assert!(issues[0].starts_with("Step #0 Sequence #0 Action #0:"));
        assert!(issues[0].contains("grant-key"));

        let mut table = CommandTable::new();
        table.register("grant-key", |_args| Ok(()));
        table.register("open-gate", |_args| Ok(()));
        let issues = verify_script(&outcome.script, &table);
        assert!(issues.is_empty(), "registered commands verify clean");
    }

    #[test]
    fn load_warnings_surface_repaired_nodes() {
        let source = r#"
            <cutscene>
              <step>
                <sequence>
                  <teleport target="moon"/>
                  <pause duration="100ms"/>
                </sequence>
              </step>
            </cutscene>
        "#;
        let outcome = load_script_from_xml(source).expect("repairs are not errors");
        assert_eq!(outcome.warnings.len(), 1);
        assert!(outcome.warnings[0].contains("teleport"));
        assert_eq!(outcome.script.steps[0].sequences[0].actions.len(), 2);
    }

    #[test]
    fn dialogue_round_trip_through_the_default_services() {
        let source = r#"
            <cutscene description="greeting">
              <step>
                <sequence actor="npc">
                  <speak bubble="balloon">Hello there.</speak>
                </sequence>
              </step>
            </cutscene>
        "#;
        let outcome = load_script_from_xml(source).expect("load should pass");

        let mut stage = MemoryStage::new();
        stage.add_object(stage.root(), "npc");
        stage.add_template("balloon");

        let mut resources = StaticResources::new();
        resources.provide("balloon");
        let services = Services {
            resources: Arc::new(resources),
            typist: Arc::new(InstantTypist::default()),
            ..Services::default()
        };
        let mut player = Player::with_services(stage.root(), services);
        player.play(Arc::new(outcome.script), &mut stage, false);
        run_to_finish(&mut player, &mut stage);

        let events = stage.events();
        assert!(events.contains(&"spawn balloon".to_string()));
        assert!(events.contains(&"despawn balloon".to_string()));
        assert!(
            player
                .journal()
                .entries()
                .iter()
                .all(|entry| !entry.starts_with("warning:")),
            "no warnings on the clean path"
        );
    }
}
