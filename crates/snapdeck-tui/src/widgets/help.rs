use ratatui::{
    layout::{Alignment, Rect},
    style::{Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Clear, Paragraph},
    Frame,
};

use crate::theme::Theme;

const BINDINGS: &[(&str, &str)] = &[
    ("wheel / j k", "previous / next slide"),
    ("h l", "scroll cards sideways"),
    ("drag", "swipe like a touch screen"),
    ("g / G", "first / last slide"),
    ("?", "toggle this help"),
    ("q", "quit"),
];

pub struct HelpWidget;

impl HelpWidget {
    pub fn render(frame: &mut Frame, theme: &Theme) {
        let area = frame.area();
        let popup_width = 44u16.min(area.width.saturating_sub(4));
        let popup_height = (BINDINGS.len() as u16 + 4).min(area.height.saturating_sub(2));
        let popup_area = centered_rect(popup_width, popup_height, area);

        frame.render_widget(Clear, popup_area);

        let block = Block::default()
            .title(" Keys ")
            .title_alignment(Alignment::Center)
            .borders(Borders::ALL)
            .border_style(Style::default().fg(theme.accent))
            .style(Style::default().bg(theme.bg1));

        let mut lines = vec![Line::from("")];
        lines.extend(BINDINGS.iter().map(|(keys, what)| {
            Line::from(vec![
                Span::styled(
                    format!("{:>12}  ", keys),
                    Style::default().fg(theme.yellow).add_modifier(Modifier::BOLD),
                ),
                Span::styled(*what, Style::default().fg(theme.fg0)),
            ])
        }));

        frame.render_widget(Paragraph::new(lines).block(block), popup_area);
    }
}

fn centered_rect(width: u16, height: u16, area: Rect) -> Rect {
    let x = area.x + area.width.saturating_sub(width) / 2;
    let y = area.y + area.height.saturating_sub(height) / 2;
    Rect::new(x, y, width.min(area.width), height.min(area.height))
}
