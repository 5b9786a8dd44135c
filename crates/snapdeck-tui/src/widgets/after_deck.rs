use ratatui::{
    layout::{Alignment, Rect},
    style::{Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph},
    Frame,
};

use crate::app::App;

/// The section following the deck, shown once it hands scroll back
pub struct AfterDeckWidget;

impl AfterDeckWidget {
    pub fn render(frame: &mut Frame, area: Rect, app: &App) {
        let theme = &app.theme;
        let block = Block::default()
            .borders(Borders::TOP)
            .border_style(Style::default().fg(theme.grey1))
            .style(Style::default().bg(theme.bg0));

        let top_padding = area.height.saturating_sub(4) / 2;
        let mut lines: Vec<Line> = (0..top_padding).map(|_| Line::from("")).collect();
        lines.push(Line::from(Span::styled(
            app.deck.after_title.clone(),
            Style::default().fg(theme.yellow).add_modifier(Modifier::BOLD),
        )));
        lines.push(Line::from(""));
        lines.push(Line::from(Span::styled(
            "Scroll up or press k to return to the deck",
            Style::default().fg(theme.grey2),
        )));

        let paragraph = Paragraph::new(lines)
            .alignment(Alignment::Center)
            .block(block);
        frame.render_widget(paragraph, area);
    }
}
