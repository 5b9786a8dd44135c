use ratatui::{
    layout::Rect,
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph},
    Frame,
};
use snapdeck_core::layout;

use crate::app::App;
use crate::deck::{Card, Slide, SlidePanel, CARD_WIDTH};
use crate::theme::Theme;

pub struct SlidesWidget;

impl SlidesWidget {
    pub fn render(frame: &mut Frame, area: Rect, app: &App) {
        let theme = &app.theme;
        let bg = theme.backdrop(app.backdrop_state.shade);
        frame.render_widget(Block::default().style(Style::default().bg(bg)), area);

        let stage = zoomed(area, app.backdrop_state.zoom);
        let height = stage.height as i32;
        if height == 0 || stage.width < 4 {
            return;
        }

        let offset = app.slide_offset.current();
        let deck_layout = layout(&app.engine);

        for placement in &deck_layout.placements {
            let top = ((placement.index as f64 - offset) * height as f64).round() as i32;
            if top <= -height || top >= height {
                continue;
            }
            let visible_top = top.max(0);
            let visible_bottom = (top + height).min(height);
            let rect = Rect::new(
                stage.x,
                stage.y + visible_top as u16,
                stage.width,
                (visible_bottom - visible_top) as u16,
            );
            let clip = Clip {
                skipped: (visible_top - top) as u16,
                full_height: stage.height,
            };

            let (Some(slide), Some(panel)) = (
                app.deck.slides.get(placement.index),
                app.panels.get(placement.index),
            ) else {
                continue;
            };
            let card_offset = if placement.is_active() {
                app.card_offset_cells()
            } else {
                0
            };
            render_slide(frame, rect, clip, slide, panel, card_offset, theme, bg);
        }
    }
}

/// Rows of a slide cut off above the visible rect
#[derive(Debug, Clone, Copy)]
struct Clip {
    skipped: u16,
    full_height: u16,
}

#[allow(clippy::too_many_arguments)]
fn render_slide(
    frame: &mut Frame,
    rect: Rect,
    clip: Clip,
    slide: &Slide,
    panel: &SlidePanel,
    card_offset: u16,
    theme: &Theme,
    bg: Color,
) {
    let mut borders = Borders::LEFT | Borders::RIGHT;
    if clip.skipped == 0 {
        borders |= Borders::TOP;
    }
    if clip.skipped + rect.height >= clip.full_height {
        borders |= Borders::BOTTOM;
    }

    let active = panel.props().is_some();
    let border_color = if active { theme.accent } else { theme.grey1 };
    let mut block = Block::default()
        .borders(borders)
        .border_style(Style::default().fg(border_color))
        .style(Style::default().bg(bg));
    if clip.skipped == 0 {
        block = block.title(format!(" {} ", slide.id));
    }

    let inner_width = rect.width.saturating_sub(2);
    let lines = slide_lines(slide, panel, card_offset, inner_width, theme);
    let paragraph = Paragraph::new(lines)
        .block(block)
        .scroll((clip.skipped.saturating_sub(1), 0));
    frame.render_widget(paragraph, rect);
}

fn slide_lines(
    slide: &Slide,
    panel: &SlidePanel,
    card_offset: u16,
    width: u16,
    theme: &Theme,
) -> Vec<Line<'static>> {
    let mut lines = vec![
        Line::from(""),
        Line::from(Span::styled(
            format!("  {}", slide.title),
            Style::default().fg(theme.yellow).add_modifier(Modifier::BOLD),
        )),
        Line::from(""),
    ];

    lines.extend(slide.body.lines().map(|line| {
        Line::from(Span::styled(
            format!("  {}", line),
            Style::default().fg(theme.fg0),
        ))
    }));

    if slide.cards.is_empty() {
        return lines;
    }

    let interacting = panel.props().is_some_and(|p| p.is_interaction_active);
    let card_style = if interacting {
        Style::default().fg(theme.aqua)
    } else {
        Style::default().fg(theme.fg1)
    };

    lines.push(Line::from(""));
    let strip_width = width.saturating_sub(2);
    lines.extend(
        card_rows(&slide.cards, card_offset, strip_width)
            .into_iter()
            .map(|row| Line::from(Span::styled(format!("  {}", row), card_style))),
    );

    if let Some(props) = panel.props() {
        let max = panel.content_width();
        lines.push(Line::from(""));
        lines.push(Line::from(Span::styled(
            format!("  {}", progress_bar(props.horizontal_progress, max, strip_width.min(40))),
            Style::default().fg(theme.purple),
        )));
    }

    lines
}

/// Cards side by side, shifted left by `offset` columns and cut to `width`
pub fn card_rows(cards: &[Card], offset: u16, width: u16) -> Vec<String> {
    let inner = CARD_WIDTH.saturating_sub(3) as usize;
    let rule = "─".repeat(inner);

    let rows: [Vec<String>; 4] = [
        cards.iter().map(|_| format!("┌{}┐ ", rule)).collect(),
        cards
            .iter()
            .map(|c| format!("│{}│ ", fit(&c.title, inner)))
            .collect(),
        cards
            .iter()
            .map(|c| format!("│{}│ ", fit(&c.body, inner)))
            .collect(),
        cards.iter().map(|_| format!("└{}┘ ", rule)).collect(),
    ];

    rows.iter()
        .map(|row| {
            row.concat()
                .chars()
                .skip(offset as usize)
                .take(width as usize)
                .collect()
        })
        .collect()
}

/// Horizontal progress as a bar of `width` columns
pub fn progress_bar(progress: f64, max: f64, width: u16) -> String {
    let width = width as usize;
    let ratio = if max > 0.0 && progress.is_finite() {
        (progress / max).clamp(0.0, 1.0)
    } else {
        0.0
    };
    let filled = (ratio * width as f64).round() as usize;
    format!("{}{}", "━".repeat(filled), "─".repeat(width - filled))
}

fn fit(text: &str, width: usize) -> String {
    let mut out: String = format!(" {}", text).chars().take(width).collect();
    let len = out.chars().count();
    out.extend(std::iter::repeat(' ').take(width - len));
    out
}

/// Shrink the stage as the backdrop zooms in
fn zoomed(area: Rect, zoom: f64) -> Rect {
    let zoom = if zoom.is_finite() { zoom.max(1.0) } else { 1.0 };
    let margin_x = ((zoom - 1.0) * area.width as f64 / 2.0).round() as u16;
    let margin_y = ((zoom - 1.0) * area.height as f64 / 2.0).round() as u16;
    let width = area.width.saturating_sub(margin_x * 2);
    let height = area.height.saturating_sub(margin_y * 2);
    Rect::new(area.x + margin_x, area.y + margin_y, width, height)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn cards() -> Vec<Card> {
        vec![
            Card {
                title: "Atlas".to_string(),
                body: "Telemetry".to_string(),
            },
            Card {
                title: "Quill".to_string(),
                body: String::new(),
            },
        ]
    }

    #[test]
    fn test_card_rows_width() {
        let rows = card_rows(&cards(), 0, 200);
        assert_eq!(rows.len(), 4);
        assert!(rows.iter().all(|r| r.chars().count() == 2 * CARD_WIDTH as usize));
        assert!(rows[1].contains("Atlas"));
    }

    #[test]
    fn test_card_rows_offset_and_clip() {
        let rows = card_rows(&cards(), CARD_WIDTH, 10);
        assert!(rows[0].starts_with('┌'));
        assert!(rows[1].contains("Quill"));
        assert!(rows.iter().all(|r| r.chars().count() == 10));
    }

    #[test]
    fn test_progress_bar() {
        assert_eq!(progress_bar(0.0, 100.0, 4), "────");
        assert_eq!(progress_bar(50.0, 100.0, 4), "━━──");
        assert_eq!(progress_bar(500.0, 100.0, 4), "━━━━");
        assert_eq!(progress_bar(10.0, 0.0, 2), "──");
    }

    #[test]
    fn test_zoom_shrinks_stage() {
        let area = Rect::new(0, 0, 100, 40);
        assert_eq!(zoomed(area, 1.0), area);
        assert_eq!(zoomed(area, 1.1), Rect::new(5, 2, 90, 36));
    }
}
