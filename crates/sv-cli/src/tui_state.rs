#[derive(Debug, Default)]
pub(crate) struct TuiUiState {
    pub(crate) selected_choice: usize,
    pub(crate) help_visible: bool,
    pub(crate) status: String,
}

impl TuiUiState {
    pub(crate) fn new(status: impl Into<String>) -> Self {
        Self {
            status: status.into(),
            ..Self::default()
        }
    }

    pub(crate) fn reset_selection(&mut self) {
        self.selected_choice = 0;
    }

    pub(crate) fn select_previous(&mut self) {
        self.selected_choice = self.selected_choice.saturating_sub(1);
    }

    pub(crate) fn select_next(&mut self, choice_count: usize) {
        let last = choice_count.saturating_sub(1);
        self.selected_choice = (self.selected_choice + 1).min(last);
    }
}

#[cfg(test)]
mod tui_state_tests {
    use super::*;

    #[test]
    fn selection_stays_inside_the_offered_choices() {
        let mut ui = TuiUiState::new("ready");
        ui.select_previous();
        assert_eq!(ui.selected_choice, 0);
        ui.select_next(2);
        ui.select_next(2);
        assert_eq!(ui.selected_choice, 1);
        ui.reset_selection();
        assert_eq!(ui.selected_choice, 0);
        assert_eq!(ui.status, "ready");
    }
}
