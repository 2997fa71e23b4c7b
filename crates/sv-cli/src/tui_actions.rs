use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};
use sv_core::StoryViewError;
use sv_render::persist;

use crate::tui_state::TuiUiState;
use crate::{autosave, FileSaveStore, StoryRenderer};

/// Applies one key press. Returns `true` when the player should quit.
pub(crate) fn handle_key(
    key: KeyEvent,
    renderer: &mut StoryRenderer,
    saves: &mut FileSaveStore,
    ui: &mut TuiUiState,
    now_ms: u64,
) -> Result<bool, StoryViewError> {
    if key.code == KeyCode::Esc || matches!(key.code, KeyCode::Char('q')) {
        return Ok(true);
    }
    if key.code == KeyCode::Char('c') && key.modifiers.contains(KeyModifiers::CONTROL) {
        return Ok(true);
    }

    match key.code {
        KeyCode::Char('h') => {
            ui.help_visible = !ui.help_visible;
        }
        KeyCode::Char(' ') => {
            let revealed = renderer.show_all_now();
            ui.status = format!("revealed {}", revealed);
        }
        KeyCode::Char('r') => {
            renderer.restart(now_ms)?;
            ui.reset_selection();
            ui.status = "restarted".to_string();
        }
        KeyCode::Char('s') => {
            ui.status = if persist(renderer, saves)? {
                match saves.path() {
                    Some(path) => format!("saved to {}", path.display()),
                    None => "saved".to_string(),
                }
            } else {
                "saving disabled: story has no title".to_string()
            };
        }
        KeyCode::Up => {
            if renderer.choice_bindings().is_empty() {
                ui.status = "no pending choice".to_string();
            } else {
                ui.select_previous();
            }
        }
        KeyCode::Down => {
            let count = renderer.choice_bindings().len();
            if count == 0 {
                ui.status = "no pending choice".to_string();
            } else {
                ui.select_next(count);
            }
        }
        KeyCode::Enter => {
            let Some(binding) = renderer.choice_bindings().get(ui.selected_choice).cloned()
            else {
                ui.status = "no pending choice".to_string();
                return Ok(false);
            };
            let revealed = renderer
                .surface()
                .nodes()
                .iter()
                .any(|node| node.id == binding.container && !node.is_hidden());
            if !revealed {
                ui.status = "choices not shown yet (space reveals all)".to_string();
                return Ok(false);
            }
            if renderer.select_choice(&binding, now_ms)?.is_some() {
                ui.reset_selection();
                ui.status = autosave(renderer, saves)
                    .unwrap_or_else(|| format!("chose {}", binding.choice.text));
            }
        }
        _ => {}
    }

    Ok(false)
}

#[cfg(test)]
mod tui_actions_tests {
    use super::*;
    use crate::cli_test_support::*;
    use crate::{create_renderer, load_story, DEFAULT_ENTRY};
    use crossterm::event::KeyEventKind;
    use sv_render::{start_session, RendererConfig, RendererState};

    fn press(code: KeyCode) -> KeyEvent {
        KeyEvent {
            code,
            modifiers: KeyModifiers::NONE,
            kind: KeyEventKind::Press,
            state: crossterm::event::KeyEventState::NONE,
        }
    }

    fn session(name: &str) -> (StoryRenderer, FileSaveStore) {
        let story = load_story(&forest_story(), DEFAULT_ENTRY).expect("story");
        let mut renderer =
            create_renderer(&story, &RendererConfig::default()).expect("renderer");
        let mut saves = FileSaveStore::new(temp_path(name));
        start_session(&mut renderer, &mut saves, 0).expect("session");
        (renderer, saves)
    }

    #[test]
    fn enter_waits_until_choices_are_revealed() {
        let (mut renderer, mut saves) = session("tui-enter");
        let mut ui = TuiUiState::new("ready");

        handle_key(press(KeyCode::Enter), &mut renderer, &mut saves, &mut ui, 0)
            .expect("enter");
        assert!(ui.status.starts_with("choices not shown yet"));
        assert_eq!(renderer.state(), RendererState::AwaitingChoice);

        handle_key(press(KeyCode::Char(' ')), &mut renderer, &mut saves, &mut ui, 0)
            .expect("space");
        assert_eq!(ui.status, "revealed 3");
        handle_key(press(KeyCode::Enter), &mut renderer, &mut saves, &mut ui, 10)
            .expect("enter");
        assert!(ui.status.starts_with("autosaved to"));
        assert!(saves.path().is_some_and(|path| path.is_file()));
    }

    #[test]
    fn arrows_move_the_selection_and_restart_resets_it() {
        let (mut renderer, mut saves) = session("tui-arrows");
        let mut ui = TuiUiState::new("ready");
        handle_key(press(KeyCode::Down), &mut renderer, &mut saves, &mut ui, 0).expect("down");
        handle_key(press(KeyCode::Down), &mut renderer, &mut saves, &mut ui, 0).expect("down");
        assert_eq!(ui.selected_choice, 1);

        handle_key(press(KeyCode::Char('r')), &mut renderer, &mut saves, &mut ui, 0)
            .expect("restart");
        assert_eq!(ui.selected_choice, 0);
        assert_eq!(ui.status, "restarted");
    }

    #[test]
    fn save_and_quit_keys() {
        let (mut renderer, mut saves) = session("tui-save");
        let mut ui = TuiUiState::new("ready");
        let quit = handle_key(press(KeyCode::Char('s')), &mut renderer, &mut saves, &mut ui, 0)
            .expect("save");
        assert!(!quit);
        assert!(ui.status.starts_with("saved to"));

        assert!(handle_key(press(KeyCode::Char('q')), &mut renderer, &mut saves, &mut ui, 0)
            .expect("quit"));
        assert!(handle_key(press(KeyCode::Esc), &mut renderer, &mut saves, &mut ui, 0)
            .expect("quit"));
        let ctrl_c = KeyEvent {
            modifiers: KeyModifiers::CONTROL,
            ..press(KeyCode::Char('c'))
        };
        assert!(handle_key(ctrl_c, &mut renderer, &mut saves, &mut ui, 0).expect("quit"));
    }
}
