#![cfg(not(coverage))]

use ratatui::style::{Color, Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::Paragraph;
use ratatui::Frame;
use sv_render::{RendererState, RowRole, SurfaceRow};

use crate::tui_state::TuiUiState;
use crate::{LoadedStory, StoryRenderer};

/// Rows taken by the status line, the divider and the key line.
pub(crate) const CHROME_ROWS: u16 = 3;
const ELLIPSIS: &str = "…";

pub(crate) fn render_tui(
    frame: &mut Frame<'_>,
    renderer: &StoryRenderer,
    ui: &TuiUiState,
    story: &LoadedStory,
) {
    let content_width = (frame.area().width as usize).max(16);

    let title = renderer.title().unwrap_or("untitled");
    let status_text = truncate_to_width(
        format!("{} | {} | {}", title, story.entry, ui.status).as_str(),
        content_width,
    );
    let key_text = truncate_to_width(
        "keys: space reveal all | up/down move | enter choose | s save | r restart | h help | q quit",
        content_width,
    );
    let help_text = truncate_to_width(
        "choices become selectable once revealed. progress is saved after every choice when the story has a title.",
        content_width,
    );

    let mut lines_out: Vec<Line<'_>> = Vec::new();
    lines_out.push(Line::from(Span::styled(
        status_text,
        Style::default().fg(Color::Gray),
    )));

    let rows = renderer.surface().visible_rows();
    let body_rows = rows.len();
    for row in rows {
        lines_out.push(render_row(row, ui.selected_choice));
    }
    let body_height = renderer.surface().visible_height() as usize;
    for _ in body_rows..body_height {
        lines_out.push(Line::from(" "));
    }

    let footer = if renderer.state() == RendererState::Idle
        && renderer.scheduler().pending_count() == 0
    {
        Span::styled("[end]".to_string(), Style::default().fg(Color::Green))
    } else {
        Span::styled("─".repeat(content_width), Style::default().fg(Color::Gray))
    };
    lines_out.push(Line::from(footer));
    lines_out.push(Line::from(Span::styled(
        key_text,
        Style::default().fg(Color::Yellow),
    )));
    if ui.help_visible {
        lines_out.push(Line::from(Span::styled(
            help_text,
            Style::default().fg(Color::Magenta),
        )));
    }

    frame.render_widget(Paragraph::new(lines_out), frame.area());
}

/// Hidden rows keep their space but draw nothing.
fn render_row(row: SurfaceRow, selected_choice: usize) -> Line<'static> {
    if row.hidden {
        return Line::from(" ");
    }
    match row.role {
        RowRole::Header => Line::from(Span::styled(
            row.text,
            Style::default()
                .fg(Color::Cyan)
                .add_modifier(Modifier::BOLD),
        )),
        RowRole::Text | RowRole::Spacer => Line::from(row.text),
        RowRole::Image => Line::from(Span::styled(
            row.text,
            Style::default().fg(Color::Magenta),
        )),
        RowRole::Divider => Line::from(Span::styled(
            row.text,
            Style::default().fg(Color::Gray),
        )),
        RowRole::Choice { index } => {
            let selected = index == selected_choice;
            let (prefix, style) = if selected {
                ("> ", Style::default().fg(Color::Green))
            } else {
                ("  ", Style::default())
            };
            Line::from(Span::styled(format!("{}{}", prefix, row.text), style))
        }
    }
}

fn truncate_to_width(value: &str, width: usize) -> String {
    if width == 0 {
        return String::new();
    }
    let chars = value.chars().collect::<Vec<_>>();
    if chars.len() <= width {
        return value.to_string();
    }
    if width == 1 {
        return ELLIPSIS.to_string();
    }
    let mut out = chars.into_iter().take(width - 1).collect::<String>();
    out.push_str(ELLIPSIS);
    out
}

#[cfg(test)]
mod tui_render_tests {
    use super::*;
    use sv_core::NodeId;

    #[test]
    fn truncate_to_width_adds_an_ellipsis() {
        assert_eq!(truncate_to_width("abcdef", 4), "abc…");
        assert_eq!(truncate_to_width("abc", 4), "abc");
        assert_eq!(truncate_to_width("abc", 1), "…");
        assert_eq!(truncate_to_width("abc", 0), "");
    }

    #[test]
    fn hidden_rows_render_blank() {
        let row = SurfaceRow {
            node: NodeId(1),
            role: RowRole::Text,
            text: "secret".to_string(),
            hidden: true,
        };
        assert_eq!(render_row(row, 0), Line::from(" "));
    }

    #[test]
    fn selected_choice_gets_a_marker() {
        let row = |index| SurfaceRow {
            node: NodeId(2),
            role: RowRole::Choice { index },
            text: "Go left".to_string(),
            hidden: false,
        };
        assert_eq!(render_row(row(0), 0).to_string(), "> Go left");
        assert_eq!(render_row(row(1), 0).to_string(), "  Go left");
    }
}
