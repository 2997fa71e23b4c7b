use std::io::{self, BufRead, Write};

use sv_core::{NodeId, NodeKind, StoryViewError};
use sv_render::{persist, start_session, RendererState};

use crate::{
    autosave, map_tui_io, FileSaveStore, SessionClock, StoryRenderer, TuiCommandAction,
};

const LINE_COMMANDS: &str = "commands: :help :save :restart :quit";

pub(crate) fn run_tui_line_mode(
    renderer: &mut StoryRenderer,
    saves: &mut FileSaveStore,
) -> Result<i32, StoryViewError> {
    let stdin = io::stdin();
    let mut reader = stdin.lock();
    let mut writer = io::stdout();
    run_tui_line_mode_with_io(renderer, saves, &mut reader, &mut writer)
}

/// Line-oriented player used when no terminal is attached: every batch is
/// printed in full and choices are picked by number.
pub(crate) fn run_tui_line_mode_with_io(
    renderer: &mut StoryRenderer,
    saves: &mut FileSaveStore,
    reader: &mut dyn BufRead,
    writer: &mut dyn Write,
) -> Result<i32, StoryViewError> {
    let clock = SessionClock::start();
    writeln!(writer, "storyview").map_err(map_tui_io)?;
    writeln!(writer, "{}", LINE_COMMANDS).map_err(map_tui_io)?;
    if let Some(title) = renderer.title() {
        writeln!(writer, "# {}", title).map_err(map_tui_io)?;
    }

    start_session(renderer, saves, clock.now_ms())?;
    let mut printed = NodeId::DETACHED;
    write_new_nodes(renderer, &mut printed, writer)?;

    loop {
        if renderer.state() != RendererState::AwaitingChoice {
            writeln!(writer).map_err(map_tui_io)?;
            writeln!(writer, "[END]").map_err(map_tui_io)?;
            return Ok(0);
        }

        writeln!(writer).map_err(map_tui_io)?;
        for (position, binding) in renderer.choice_bindings().iter().enumerate() {
            writeln!(writer, "  [{}] {}", position, binding.choice.text).map_err(map_tui_io)?;
        }

        loop {
            let Some(raw) = prompt_input_from("> ", reader, writer)? else {
                return Ok(0);
            };
            let mut lines = Vec::new();
            let action = handle_line_cmd(
                raw.as_str(),
                renderer,
                saves,
                clock.now_ms(),
                &mut |line| lines.push(line),
            )?;
            for line in lines {
                writeln!(writer, "{}", line).map_err(map_tui_io)?;
            }
            match action {
                TuiCommandAction::Continue => continue,
                TuiCommandAction::RefreshBatch => {
                    write_new_nodes(renderer, &mut printed, writer)?;
                    break;
                }
                TuiCommandAction::Quit => return Ok(0),
                TuiCommandAction::NotHandled => {}
            }

            let Ok(position) = raw.trim().parse::<usize>() else {
                writeln!(writer, "invalid choice: {}", raw).map_err(map_tui_io)?;
                continue;
            };
            if position >= renderer.choice_bindings().len() {
                writeln!(writer, "no choice {}", position).map_err(map_tui_io)?;
                continue;
            }
            renderer.select_offered(position, clock.now_ms())?;
            if let Some(status) = autosave(renderer, saves) {
                writeln!(writer, "({})", status).map_err(map_tui_io)?;
            }
            write_new_nodes(renderer, &mut printed, writer)?;
            break;
        }
    }
}

pub(crate) fn handle_line_cmd(
    raw: &str,
    renderer: &mut StoryRenderer,
    saves: &mut FileSaveStore,
    now_ms: u64,
    emit: &mut dyn FnMut(String),
) -> Result<TuiCommandAction, StoryViewError> {
    match raw.trim() {
        ":help" => {
            emit(LINE_COMMANDS.to_string());
            Ok(TuiCommandAction::Continue)
        }
        ":save" => {
            if persist(renderer, saves)? {
                let target = saves
                    .path()
                    .map(|path| path.display().to_string())
                    .unwrap_or_default();
                emit(format!("saved: {}", target));
            } else {
                emit("saving disabled: story has no title".to_string());
            }
            Ok(TuiCommandAction::Continue)
        }
        ":restart" => {
            renderer.restart(now_ms)?;
            emit("restarted".to_string());
            Ok(TuiCommandAction::RefreshBatch)
        }
        ":quit" => {
            emit("bye".to_string());
            Ok(TuiCommandAction::Quit)
        }
        _ => Ok(TuiCommandAction::NotHandled),
    }
}

/// Reveals the pending batch at once and prints every node appended since the
/// last call. Node ids only grow, so `printed` marks the boundary.
fn write_new_nodes(
    renderer: &mut StoryRenderer,
    printed: &mut NodeId,
    writer: &mut dyn Write,
) -> Result<(), StoryViewError> {
    renderer.show_all_now();
    for node in renderer.surface().nodes() {
        if node.id <= *printed {
            continue;
        }
        *printed = node.id;
        match &node.kind {
            NodeKind::Text => {
                writeln!(writer).map_err(map_tui_io)?;
                writeln!(writer, "{}", node.text).map_err(map_tui_io)?;
            }
            NodeKind::Image { source } => {
                writeln!(writer, "[image: {}]", source).map_err(map_tui_io)?;
            }
            NodeKind::Divider => {
                writeln!(writer, "----------").map_err(map_tui_io)?;
            }
            NodeKind::ChoiceContainer | NodeKind::Choice { .. } => {}
        }
    }
    Ok(())
}

/// Reads one line; `None` once the input is exhausted.
pub(crate) fn prompt_input_from(
    prefix: &str,
    reader: &mut dyn BufRead,
    writer: &mut dyn Write,
) -> Result<Option<String>, StoryViewError> {
    write!(writer, "{}", prefix).map_err(map_tui_io)?;
    writer.flush().map_err(map_tui_io)?;
    let mut input = String::new();
    if reader.read_line(&mut input).map_err(map_tui_io)? == 0 {
        return Ok(None);
    }
    Ok(Some(input.trim_end_matches(&['\r', '\n'][..]).to_string()))
}
