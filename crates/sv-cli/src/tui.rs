#[cfg(coverage)]
pub(super) fn run_tui_ratatui_mode(
    _story: &super::LoadedStory,
    renderer: &mut super::StoryRenderer,
    saves: &mut super::FileSaveStore,
) -> Result<i32, sv_core::StoryViewError> {
    super::run_tui_line_mode(renderer, saves)
}

#[cfg(not(coverage))]
mod rich {
    use std::io;
    use std::time::Duration;

    use crossterm::event::{self, Event, KeyEventKind};
    use crossterm::terminal::{
        self, disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen,
    };
    use crossterm::ExecutableCommand;
    use ratatui::backend::CrosstermBackend;
    use ratatui::Terminal;
    use sv_core::StoryViewError;
    use sv_render::{start_session, AUTOLOAD_NOTICE};
    use tracing::{debug, warn};

    use crate::logging::TerminalLogPause;
    use crate::tui_actions::handle_key;
    use crate::tui_render::{render_tui, CHROME_ROWS};
    use crate::tui_state::TuiUiState;
    use crate::{map_tui_io, FileSaveStore, LoadedStory, SessionClock, StoryRenderer};

    const FRAME_MS: u64 = 16;

    struct TuiTerminal {
        terminal: Terminal<CrosstermBackend<io::Stdout>>,
        _log_pause: TerminalLogPause,
    }

    impl TuiTerminal {
        fn new() -> Result<Self, StoryViewError> {
            let log_pause = TerminalLogPause::start();
            enable_raw_mode().map_err(map_tui_io)?;
            io::stdout()
                .execute(EnterAlternateScreen)
                .map_err(map_tui_io)?;
            let backend = CrosstermBackend::new(io::stdout());
            let terminal = Terminal::new(backend).map_err(map_tui_io)?;
            Ok(Self {
                terminal,
                _log_pause: log_pause,
            })
        }

        fn terminal_mut(&mut self) -> &mut Terminal<CrosstermBackend<io::Stdout>> {
            &mut self.terminal
        }
    }

    impl Drop for TuiTerminal {
        fn drop(&mut self) {
            let _ = disable_raw_mode();
            let _ = io::stdout().execute(LeaveAlternateScreen);
        }
    }

    fn fit_surface(renderer: &mut StoryRenderer, width: u16, height: u16) {
        let body = height.saturating_sub(CHROME_ROWS).max(1);
        renderer.resize(width.max(16), u32::from(body));
    }

    pub(super) fn run_tui_ratatui_mode(
        story: &LoadedStory,
        renderer: &mut StoryRenderer,
        saves: &mut FileSaveStore,
    ) -> Result<i32, StoryViewError> {
        let (width, height) = terminal::size().map_err(map_tui_io)?;
        fit_surface(renderer, width, height);

        let clock = SessionClock::start();
        let start = start_session(renderer, saves, clock.now_ms())?;
        let mut ui = TuiUiState::new(if start.restored {
            AUTOLOAD_NOTICE
        } else {
            "ready"
        });

        let mut terminal = TuiTerminal::new()?;
        let frame_budget = Duration::from_millis(FRAME_MS);

        loop {
            renderer.tick(clock.now_ms());
            terminal
                .terminal_mut()
                .draw(|frame| render_tui(frame, renderer, &ui, story))
                .map_err(map_tui_io)?;

            if !event::poll(frame_budget).map_err(map_tui_io)? {
                continue;
            }

            match event::read().map_err(map_tui_io)? {
                Event::Key(key) if key.kind == KeyEventKind::Press => {
                    match handle_key(key, renderer, saves, &mut ui, clock.now_ms()) {
                        Ok(true) => break,
                        Ok(false) => {}
                        Err(error) => {
                            warn!(code = %error.code, "key action failed");
                            ui.status = error.message;
                        }
                    }
                }
                Event::Resize(width, height) => {
                    debug!(width, height, "terminal resized");
                    fit_surface(renderer, width, height);
                }
                _ => {}
            }
        }

        Ok(0)
    }
}

#[cfg(not(coverage))]
pub(super) fn run_tui_ratatui_mode(
    story: &super::LoadedStory,
    renderer: &mut super::StoryRenderer,
    saves: &mut super::FileSaveStore,
) -> Result<i32, sv_core::StoryViewError> {
    use std::io::IsTerminal;

    if !std::io::stdin().is_terminal() || !std::io::stdout().is_terminal() {
        return super::run_tui_line_mode(renderer, saves);
    }
    rich::run_tui_ratatui_mode(story, renderer, saves)
}
