use std::path::Path;

use sv_core::{NarrativeEngine, StoryViewError};
use sv_render::{BatchReport, RendererConfig};

use crate::{
    collect_batch, create_renderer, emit_batch, load_story, read_save_file, resume_renderer,
    write_save_file, AgentArgs, AgentCommand, BatchEvent, ChooseArgs, SaveFile, StartArgs,
    StoryRenderer, DEFAULT_ENTRY, SAVE_DATA_SCHEMA,
};

pub(super) fn run_agent(args: AgentArgs) -> Result<i32, StoryViewError> {
    match args.command {
        AgentCommand::Start(args) => run_start(args),
        AgentCommand::Choose(args) => run_choose(args),
    }
}

pub(super) fn run_start(args: StartArgs) -> Result<i32, StoryViewError> {
    let story = load_story(&args.story, args.entry.as_deref().unwrap_or(DEFAULT_ENTRY))?;
    let mut renderer = create_renderer(&story, &RendererConfig::default())?;
    let report = renderer.continue_story(true, 0)?;
    emit_with_saved_state(&mut renderer, &report, &args.state_out)
}

pub(super) fn run_choose(args: ChooseArgs) -> Result<i32, StoryViewError> {
    let story = load_story(&args.story, args.entry.as_deref().unwrap_or(DEFAULT_ENTRY))?;
    let saved = read_save_file(Path::new(&args.state_in))?;
    let mut renderer = resume_renderer(&story, &saved.state)?;
    let report = renderer.select_offered(args.choice, 0)?;
    emit_with_saved_state(&mut renderer, &report, &args.state_out)
}

/// Writes the state file only while a choice is pending; a finished story has
/// nothing to resume.
fn emit_with_saved_state(
    renderer: &mut StoryRenderer,
    report: &BatchReport,
    state_out: &str,
) -> Result<i32, StoryViewError> {
    let outcome = collect_batch(renderer, report);
    if outcome.event == BatchEvent::Choices {
        write_save_file(
            Path::new(state_out),
            &SaveFile {
                schema_version: SAVE_DATA_SCHEMA.to_string(),
                title: renderer.title().map(str::to_string),
                state: renderer.engine().save_state()?,
                preferences: Default::default(),
            },
        )?;
        emit_batch(outcome, Some(state_out.to_string()));
        return Ok(0);
    }

    emit_batch(outcome, None);
    Ok(0)
}
