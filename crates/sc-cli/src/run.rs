use std::fs;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use sc_api::{
    load_script_from_xml, CommandTable, InstantTypist, MapScripts, Player, Script, ScriptError,
    Services, StaticResources,
};

use crate::cli_args::RunArgs;
use crate::source_loader::{list_script_files, read_script_source};
use crate::stage_spec::{build_stage, parse_stage_spec, StageSpec};
use crate::{map_cli_source_path, map_cli_stage_read};

pub(crate) const DEFAULT_TICK_MS: u64 = 100;
pub(crate) const DEFAULT_MAX_TICKS: u32 = 600;

struct Scenario {
    name: String,
    script: Arc<Script>,
    library: MapScripts,
    warnings: Vec<String>,
}

pub(crate) fn run_run(args: RunArgs) -> Result<i32, ScriptError> {
    let script_path = PathBuf::from(&args.script);
    if !script_path.is_file() {
        return Err(ScriptError::new(
            "CLI_SOURCE_NOT_FOUND",
            format!("script does not exist: {}", script_path.display()),
        ));
    }

    let raw_stage = fs::read_to_string(&args.stage).map_err(map_cli_stage_read)?;
    let spec = parse_stage_spec(&raw_stage)?;
    let mut stage = build_stage(&spec)?;

    let scenario = load_scenario(&script_path)?;

    if !scenario.script.auto_play && !args.force {
        println!("RESULT:SKIPPED");
        println!("SCRIPT:{}", scenario.name);
        return Ok(0);
    }

    let command_log = Arc::new(Mutex::new(Vec::new()));
    let services = Services {
        resources: Arc::new(static_resources(&spec)),
        typist: Arc::new(InstantTypist::default()),
        commands: Arc::new(command_table(&spec, &command_log)),
        scripts: Arc::new(scenario.library),
    };

    let dt = Duration::from_millis(args.dt_ms.unwrap_or(DEFAULT_TICK_MS));
    let max_ticks = args.max_ticks.unwrap_or(DEFAULT_MAX_TICKS);

    let mut player = Player::with_services(stage.root(), services);
    player.play(scenario.script, &mut stage, false);
    let mut ticks = 0u32;
    while !player.is_finished() && ticks < max_ticks {
        player.advance(dt, &mut stage);
        ticks += 1;
    }

    let finished = player.is_finished();
    println!("RESULT:{}", if finished { "OK" } else { "TIMEOUT" });
    println!("SCRIPT:{}", scenario.name);
    println!("TICKS:{}", ticks);
    for warning in scenario.warnings {
        println!(
            "WARNING_JSON:{}",
            serde_json::to_string(&warning).unwrap_or_else(|_| "\"\"".to_string())
        );
    }
    for event in stage.drain_events() {
        println!("EVENT:{}", event);
    }
    if let Ok(calls) = command_log.lock() {
        for call in calls.iter() {
            println!("COMMAND:{}", call);
        }
    }
    for entry in player.drain_journal() {
        println!(
            "LOG_JSON:{}",
            serde_json::to_string(&entry).unwrap_or_else(|_| "\"\"".to_string())
        );
    }
    Ok(if finished { 0 } else { 1 })
}

/// Loads the requested script plus every sibling cutscene, so play-script
/// references resolve the way they would in the game.
fn load_scenario(script_path: &Path) -> Result<Scenario, ScriptError> {
    let dir = match script_path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent,
        _ => Path::new("."),
    };
    let canonical_main = fs::canonicalize(script_path).map_err(map_cli_source_path)?;

    let mut library = MapScripts::new();
    let mut warnings = Vec::new();
    let mut main: Option<(String, Arc<Script>)> = None;

    for file in list_script_files(dir)? {
        let source = read_script_source(&file.path)?;
        let outcome = load_script_from_xml(&source)?;
        for warning in outcome.warnings {
            warnings.push(format!("{}: {}", file.name, warning));
        }
        let script = Arc::new(outcome.script);
        let canonical = fs::canonicalize(&file.path).map_err(map_cli_source_path)?;
        if canonical == canonical_main {
            main = Some((file.name.clone(), Arc::clone(&script)));
        }
        library.insert(file.name, script);
    }

    // A script outside the naming convention still runs; it just cannot be
    // referenced by its siblings.
    let (name, script) = match main {
        Some(found) => found,
        None => {
            let source = read_script_source(script_path)?;
            let outcome = load_script_from_xml(&source)?;
            let name = script_path
                .file_stem()
                .map(|stem| stem.to_string_lossy().to_string())
                .unwrap_or_else(|| "script".to_string());
            for warning in outcome.warnings {
                warnings.push(format!("{}: {}", name, warning));
            }
            (name, Arc::new(outcome.script))
        }
    };

    Ok(Scenario {
        name,
        script,
        library,
        warnings,
    })
}

fn static_resources(spec: &StageSpec) -> StaticResources {
    let mut resources = StaticResources::new();
    for template in &spec.templates {
        resources.provide(template);
    }
    resources
}

/// Stage-spec commands become no-ops that record their invocation, so the
/// run output shows what the game would have been asked to do.
fn command_table(spec: &StageSpec, log: &Arc<Mutex<Vec<String>>>) -> CommandTable {
    let mut commands = CommandTable::new();
    for name in &spec.commands {
        let log = Arc::clone(log);
        let name = name.clone();
        let logged = name.clone();
        commands.register(name, move |args| {
            if let Ok(mut calls) = log.lock() {
                if args.is_empty() {
                    calls.push(logged.clone());
                } else {
                    calls.push(format!("{} {}", logged, args.join(" ")));
                }
            }
            Ok(())
        });
    }
    commands
}
