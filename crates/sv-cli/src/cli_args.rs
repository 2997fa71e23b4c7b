use clap::{Args, Parser, Subcommand};

#[derive(Debug, Parser)]
#[command(name = "storyview")]
#[command(about = "Terminal player for branching narratives")]
pub(crate) struct Cli {
    #[command(subcommand)]
    pub(crate) command: Mode,
}

#[derive(Debug, Subcommand)]
pub(crate) enum Mode {
    Agent(AgentArgs),
    #[command(alias = "play")]
    Tui(TuiArgs),
}

#[derive(Debug, Args)]
pub(crate) struct AgentArgs {
    #[command(subcommand)]
    pub(crate) command: AgentCommand,
}

#[derive(Debug, Subcommand)]
pub(crate) enum AgentCommand {
    Start(StartArgs),
    Choose(ChooseArgs),
}

#[derive(Debug, Args)]
pub(crate) struct StartArgs {
    #[arg(long = "story")]
    pub(crate) story: String,
    #[arg(long = "entry")]
    pub(crate) entry: Option<String>,
    #[arg(long = "state-out")]
    pub(crate) state_out: String,
}

#[derive(Debug, Args)]
pub(crate) struct ChooseArgs {
    #[arg(long = "story")]
    pub(crate) story: String,
    #[arg(long = "entry")]
    pub(crate) entry: Option<String>,
    #[arg(long = "state-in")]
    pub(crate) state_in: String,
    #[arg(long = "choice")]
    pub(crate) choice: usize,
    #[arg(long = "state-out")]
    pub(crate) state_out: String,
}

#[derive(Debug, Args)]
pub(crate) struct TuiArgs {
    #[arg(long = "story")]
    pub(crate) story: String,
    #[arg(long = "entry")]
    pub(crate) entry: Option<String>,
    /// Directory holding one save file per story title.
    #[arg(long = "save-dir")]
    pub(crate) save_dir: Option<String>,
    #[arg(long = "reveal-interval-ms")]
    pub(crate) reveal_interval_ms: Option<u64>,
}
