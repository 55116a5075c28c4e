use std::ffi::OsString;

use clap::Parser;
use sc_core::ScriptError;

mod cli_args;
mod error_map;
mod run;
mod source_loader;
mod stage_spec;
mod verify;

pub(crate) use cli_args::{Cli, Mode, RunArgs, VerifyArgs};
pub(crate) use error_map::{
    emit_error, map_cli_commands_invalid, map_cli_commands_read, map_cli_source_path,
    map_cli_source_read, map_cli_source_scan, map_cli_stage_invalid, map_cli_stage_read,
};

pub fn run_cli_from_args<I, T>(args: I) -> i32
where
    I: IntoIterator<Item = T>,
    T: Into<OsString> + Clone,
{
    init_tracing();
    let cli = match Cli::try_parse_from(args) {
        Ok(cli) => cli,
        Err(error) => {
            let _ = error.print();
            return error.exit_code();
        }
    };
    match run(cli) {
        Ok(code) => code,
        Err(error) => emit_error(error),
    }
}

fn run(cli: Cli) -> Result<i32, ScriptError> {
    match cli.command {
        Mode::Verify(args) => verify::run_verify(args),
        Mode::Run(args) => run::run_run(args),
    }
}

/// Diagnostics go to stderr so the line protocol on stdout stays parseable.
fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("warn")),
        )
        .with_writer(std::io::stderr)
        .try_init();
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    #[test]
    fn unknown_subcommands_exit_with_a_usage_error() {
        let code = run_cli_from_args(["sc-cli", "frobnicate"]);
        assert_ne!(code, 0);
    }

    #[test]
    fn verify_is_reachable_from_the_arg_parser() {
        let dir = std::env::temp_dir().join(format!("stagecue-cli-{}", std::process::id()));
        let _ = fs::remove_dir_all(&dir);
        fs::create_dir_all(&dir).expect("scratch dir");
        fs::write(
            dir.join("main.cutscene.xml"),
            r#"<cutscene><step><sequence><pause duration="1s"/></sequence></step></cutscene>"#,
        )
        .expect("write");

        let dir_arg = dir.to_string_lossy().to_string();
        let code = run_cli_from_args(["sc-cli", "verify", "--scripts-dir", dir_arg.as_str()]);
        assert_eq!(code, 0);
        let _ = fs::remove_dir_all(&dir);
    }
}
