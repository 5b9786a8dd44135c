use ratatui::{
    layout::Rect,
    style::Style,
    text::{Line, Span},
    widgets::Paragraph,
    Frame,
};

use crate::app::App;
use crate::host::Page;

pub struct StatusBarWidget;

impl StatusBarWidget {
    pub fn render(frame: &mut Frame, area: Rect, app: &App) {
        let theme = &app.theme;
        let state = app.engine.state();

        let mode_str = match (app.page(), state.control_released) {
            (Page::After, _) => "AFTER",
            (Page::Deck, true) => "RELEASED",
            (Page::Deck, false) => "DECK",
        };

        let position = match app.engine.current_item() {
            Some(item) if item.is_horizontal() => format!(
                "{}/{} {} {:.0}/{:.0}",
                state.current_index + 1,
                app.deck.slides.len(),
                item.id,
                state.horizontal_progress,
                app.engine.current_extent(),
            ),
            Some(item) => format!(
                "{}/{} {}",
                state.current_index + 1,
                app.deck.slides.len(),
                item.id
            ),
            None => "empty deck".to_string(),
        };

        let status_text = match &app.status_message {
            Some(msg) => format!(" {} | {} | {}", mode_str, position, msg),
            None => format!(" {} | {}", mode_str, position),
        };

        let help_hint = " q:quit j/k:slide h/l:cards g:top ?:help ";
        let padding_len = area
            .width
            .saturating_sub(status_text.chars().count() as u16 + help_hint.len() as u16)
            as usize;

        let line = Line::from(vec![
            Span::styled(status_text, Style::default().fg(theme.fg0).bg(theme.bg2)),
            Span::styled(" ".repeat(padding_len), Style::default().bg(theme.bg2)),
            Span::styled(help_hint, Style::default().fg(theme.grey2).bg(theme.bg2)),
        ]);

        frame.render_widget(Paragraph::new(line), area);
    }
}
