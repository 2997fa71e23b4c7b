use std::ffi::OsString;

use clap::Parser;
use sv_core::StoryViewError;
use tracing::info;

mod agent;
mod batch_output;
mod cli_args;
mod error_map;
mod line_tui;
mod logging;
mod models;
mod session_ops;
mod state_store;
mod story_loader;
mod tui;
mod tui_actions;
mod tui_render;
mod tui_state;

pub(crate) use batch_output::{collect_batch, emit_batch};
pub(crate) use cli_args::{AgentArgs, AgentCommand, ChooseArgs, Cli, Mode, StartArgs, TuiArgs};
pub(crate) use error_map::{
    emit_error, json_string, map_cli_save_encode, map_cli_save_invalid, map_cli_save_read,
    map_cli_save_write, map_cli_story_path, map_cli_story_read, map_cli_story_scan, map_tui_io,
};
pub(crate) use line_tui::run_tui_line_mode;
pub use logging::log_writer;
#[cfg(test)]
pub(crate) use line_tui::{handle_line_cmd, run_tui_line_mode_with_io};
pub(crate) use models::{
    BatchEvent, BatchOutcome, LoadedStory, NodeLine, SaveFile, TuiCommandAction,
    DEFAULT_ENTRY, DEFAULT_SAVE_DIR, SAVE_DATA_SCHEMA,
};
pub(crate) use session_ops::{
    autosave, create_renderer, renderer_config, resume_renderer, SessionClock, StoryRenderer,
};
pub(crate) use state_store::{read_save_file, write_save_file, FileSaveStore};
pub(crate) use story_loader::{create_engine, load_story};

pub fn run_cli_from_args<I, T>(args: I) -> i32
where
    I: IntoIterator<Item = T>,
    T: Into<OsString> + Clone,
{
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

fn run(cli: Cli) -> Result<i32, StoryViewError> {
    match cli.command {
        Mode::Agent(args) => run_agent(args),
        Mode::Tui(args) => run_tui(args),
    }
}

fn run_agent(args: AgentArgs) -> Result<i32, StoryViewError> {
    agent::run_agent(args)
}

fn run_tui(args: TuiArgs) -> Result<i32, StoryViewError> {
    let entry = args.entry.unwrap_or_else(|| DEFAULT_ENTRY.to_string());
    let save_dir = args
        .save_dir
        .unwrap_or_else(|| DEFAULT_SAVE_DIR.to_string());
    let story = load_story(&args.story, &entry)?;
    let config = renderer_config(args.reveal_interval_ms);
    let mut renderer = create_renderer(&story, &config)?;
    let mut saves = FileSaveStore::new(save_dir);
    info!(story = %story.id, entry = %story.entry, "starting player");

    tui::run_tui_ratatui_mode(&story, &mut renderer, &mut saves)
}

#[cfg(test)]
mod cli_test_support;
