use ratatui::layout::Rect;
use ratatui::style::{Color, Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, Borders, Padding, Paragraph};
use ratatui::Frame;

use crate::ui::colors::PURE_WHITE;

use super::DOTFILES_ART;

pub(crate) fn art_height() -> u16 {
    DOTFILES_ART.len() as u16
}

// Draws the ASCII art banner
pub(crate) fn draw_art(area: Rect, f: &mut Frame<'_>) {
    let art_lines: Vec<Line> = DOTFILES_ART
        .iter()
        .map(|line| {
            Line::from(Span::styled(
                *line,
                Style::default()
                    .fg(Color::Blue)
                    .add_modifier(Modifier::BOLD),
            ))
        })
        .collect();
    let art = Paragraph::new(art_lines).block(Block::default());
    f.render_widget(art, area);
}

// Screen title in the "/- Title -/" form
pub(crate) fn draw_title(area: Rect, f: &mut Frame<'_>, title: &str) {
    let title = Line::from(vec![
        Span::raw("/- "),
        Span::styled(
            title.to_string(),
            Style::default().fg(Color::Red).add_modifier(Modifier::BOLD),
        ),
        Span::raw(" -/"),
    ]);
    f.render_widget(Paragraph::new(title), area);
}

// Bordered panel with a bracketed title
pub(crate) fn panel(title: &str, title_style: Style) -> Block<'static> {
    Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(Color::Black))
        .padding(Padding::new(1, 0, 1, 0))
        .title(Line::from(vec![
            Span::styled("[", Style::default().fg(Color::Black)),
            Span::styled(format!(" {title} "), title_style),
            Span::styled("]", Style::default().fg(Color::Black)),
        ]))
}

pub(crate) fn default_title_style() -> Style {
    Style::default().fg(PURE_WHITE).add_modifier(Modifier::BOLD)
}

pub(crate) fn key_span(key: &'static str) -> Span<'static> {
    Span::styled(key, Style::default().fg(Color::Cyan))
}

// Bullet list entries in a single colour
pub(crate) fn bullet_lines(items: &[String], color: Color) -> Vec<Line<'static>> {
    items
        .iter()
        .map(|item| {
            Line::from(Span::styled(
                format!("  • {item}"),
                Style::default().fg(color),
            ))
        })
        .collect()
}
