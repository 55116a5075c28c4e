use clap::{Args, Parser, Subcommand};

#[derive(Debug, Parser)]
#[command(name = "cutscene-player")]
#[command(about = "Cutscene runtime CLI")]
pub(crate) struct Cli {
    #[command(subcommand)]
    pub(crate) command: Mode,
}

#[derive(Debug, Subcommand)]
pub(crate) enum Mode {
    /// Load every cutscene under a directory and report problems.
    Verify(VerifyArgs),
    /// Play one cutscene against a stage description.
    Run(RunArgs),
}

#[derive(Debug, Args)]
pub(crate) struct VerifyArgs {
    #[arg(long = "scripts-dir")]
    pub(crate) scripts_dir: String,
    /// JSON array of command names the game registers. Enables the
    /// unknown-command checks.
    #[arg(long = "commands")]
    pub(crate) commands: Option<String>,
    /// Count load warnings as failures.
    #[arg(long = "strict")]
    pub(crate) strict: bool,
}

#[derive(Debug, Args)]
pub(crate) struct RunArgs {
    #[arg(long = "script")]
    pub(crate) script: String,
    #[arg(long = "stage")]
    pub(crate) stage: String,
    /// Milliseconds advanced per tick.
    #[arg(long = "dt-ms")]
    pub(crate) dt_ms: Option<u64>,
    /// Tick budget before the run is declared stuck.
    #[arg(long = "max-ticks")]
    pub(crate) max_ticks: Option<u32>,
    /// Play the script even when its autoplay flag is off.
    #[arg(long = "force")]
    pub(crate) force: bool,
}
