use std::fs;

use sc_api::{load_script_from_xml, verify_script, CommandTable, ScriptError};

use crate::cli_args::VerifyArgs;
use crate::source_loader::{list_script_files, read_script_source, resolve_scripts_dir};
use crate::{map_cli_commands_invalid, map_cli_commands_read};

#[derive(Debug)]
struct FileReport {
    relative: String,
    error: Option<ScriptError>,
    warnings: Vec<String>,
    issues: Vec<String>,
}

pub(crate) fn run_verify(args: VerifyArgs) -> Result<i32, ScriptError> {
    let scripts_root = resolve_scripts_dir(&args.scripts_dir)?;
    let files = list_script_files(&scripts_root)?;
    if files.is_empty() {
        return Err(ScriptError::new(
            "CLI_SOURCE_EMPTY",
            format!("No *.cutscene.xml files under {}", scripts_root.display()),
        ));
    }

    let commands = load_command_names(args.commands.as_deref())?;

    let mut reports = Vec::new();
    for file in &files {
        let source = read_script_source(&file.path)?;
        let report = match load_script_from_xml(&source) {
            Ok(outcome) => FileReport {
                relative: file.relative.clone(),
                error: None,
                warnings: outcome.warnings,
                // Command checks only make sense against a known table.
                issues: match &commands {
                    Some(table) => verify_script(&outcome.script, table),
                    None => Vec::new(),
                },
            },
            Err(error) => FileReport {
                relative: file.relative.clone(),
                error: Some(error),
                warnings: Vec::new(),
                issues: Vec::new(),
            },
        };
        reports.push(report);
    }

    let failed = verdict(&reports, args.strict);
    println!("RESULT:{}", if failed { "FAIL" } else { "OK" });
    println!("CHECKED:{}", reports.len());
    for report in reports {
        emit_report(report);
    }
    Ok(if failed { 1 } else { 0 })
}

fn verdict(reports: &[FileReport], strict: bool) -> bool {
    let broken = reports
        .iter()
        .any(|report| report.error.is_some() || !report.issues.is_empty());
    let noisy = strict && reports.iter().any(|report| !report.warnings.is_empty());
    broken || noisy
}

fn emit_report(report: FileReport) {
    println!("FILE:{}", report.relative);
    if let Some(error) = report.error {
        println!("ERROR_CODE:{}", error.code);
        println!(
            "ERROR_MSG_JSON:{}",
            serde_json::to_string(&error.message).unwrap_or_else(|_| "\"\"".to_string())
        );
    }
    for warning in report.warnings {
        println!(
            "WARNING_JSON:{}",
            serde_json::to_string(&warning).unwrap_or_else(|_| "\"\"".to_string())
        );
    }
    for issue in report.issues {
        println!(
            "ISSUE_JSON:{}",
            serde_json::to_string(&issue).unwrap_or_else(|_| "\"\"".to_string())
        );
    }
}

/// Builds a no-op command table from a JSON array of names. `None` when no
/// file was given, which disables the command checks entirely.
fn load_command_names(path: Option<&str>) -> Result<Option<CommandTable>, ScriptError> {
    let Some(path) = path else {
        return Ok(None);
    };
    let raw = fs::read_to_string(path).map_err(map_cli_commands_read)?;
    let names: Vec<String> = serde_json::from_str(&raw).map_err(map_cli_commands_invalid)?;
    let mut table = CommandTable::new();
    for name in names {
        table.register(name, |_args| Ok(()));
    }
    Ok(Some(table))
}
