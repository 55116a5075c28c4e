use sc_core::ScriptError;
use std::fmt::Display;

fn map_error(code: &'static str, error: impl Display) -> ScriptError {
    ScriptError::new(code, error.to_string())
}

pub(crate) fn emit_error(error: ScriptError) -> i32 {
    println!("RESULT:ERROR");
    println!("ERROR_CODE:{}", error.code);
    println!(
        "ERROR_MSG_JSON:{}",
        serde_json::to_string(&error.message).expect("string json")
    );
    1
}

pub(crate) fn map_cli_source_path(error: std::io::Error) -> ScriptError {
    map_error("CLI_SOURCE_PATH", error)
}

pub(crate) fn map_cli_source_scan(error: std::path::StripPrefixError) -> ScriptError {
    map_error("CLI_SOURCE_SCAN", error)
}

pub(crate) fn map_cli_source_read(error: std::io::Error) -> ScriptError {
    map_error("CLI_SOURCE_READ", error)
}

pub(crate) fn map_cli_stage_read(error: std::io::Error) -> ScriptError {
    map_error("CLI_STAGE_READ", error)
}

pub(crate) fn map_cli_stage_invalid(error: serde_json::Error) -> ScriptError {
    map_error("CLI_STAGE_INVALID", error)
}

pub(crate) fn map_cli_commands_read(error: std::io::Error) -> ScriptError {
    map_error("CLI_COMMANDS_READ", error)
}

pub(crate) fn map_cli_commands_invalid(error: serde_json::Error) -> ScriptError {
    map_error("CLI_COMMANDS_INVALID", error)
}
