use ratatui::layout::{Constraint, Direction, Layout, Rect};
use ratatui::style::{Color, Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Paragraph, Wrap};
use ratatui::Frame;

use crate::model::App;

use super::common::{art_height, bullet_lines, default_title_style, draw_art, draw_title, panel};

// Borders plus the panel's top padding
const PANEL_CHROME: u16 = 3;

// Final screen listing every warning and error in the order observed
pub(crate) fn draw_summary(area: Rect, f: &mut Frame<'_>, app: &App) {
    let pointer_height = u16::from(app.has_errors());
    let layout = Layout::default()
        .direction(Direction::Vertical)
        .margin(0)
        .constraints([
            Constraint::Length(art_height()),
            Constraint::Length(1),
            Constraint::Min(6),
            Constraint::Length(pointer_height), // Log pointer, never scrolled away
            Constraint::Length(1),
        ])
        .split(area);

    draw_art(layout[0], f);
    draw_title(layout[1], f, "Installation Complete");

    let mut lines = Vec::new();
    if app.has_errors() {
        lines.push(Line::from(Span::styled(
            "Installation completed with some issues.",
            Style::default()
                .fg(Color::Yellow)
                .add_modifier(Modifier::BOLD),
        )));
    } else {
        lines.push(Line::from(Span::styled(
            "All selected components have been installed successfully!",
            Style::default()
                .fg(Color::LightGreen)
                .add_modifier(Modifier::BOLD),
        )));
    }
    lines.push(Line::from(""));
    lines.push(Line::from(
        "Please restart your system for all changes to take effect.",
    ));
    lines.push(Line::from(""));

    if !app.warnings.is_empty() {
        lines.push(Line::from(Span::styled(
            format!("Warnings ({}):", app.warnings.len()),
            Style::default()
                .fg(Color::Yellow)
                .add_modifier(Modifier::BOLD),
        )));
        lines.extend(bullet_lines(&app.warnings, Color::Yellow));
        lines.push(Line::from(""));
    }

    if app.has_errors() {
        lines.push(Line::from(Span::styled(
            format!("Errors ({}):", app.errors.len()),
            Style::default().fg(Color::Red).add_modifier(Modifier::BOLD),
        )));
        lines.extend(bullet_lines(&app.errors, Color::LightRed));
    }

    let visible = layout[2].height.saturating_sub(PANEL_CHROME) as usize;
    let max_scroll = lines.len().saturating_sub(visible);
    let scroll = app.summary_scroll.min(max_scroll).min(u16::MAX as usize) as u16;
    let body = Paragraph::new(lines)
        .block(panel("Summary", default_title_style()))
        .wrap(Wrap { trim: false })
        .scroll((scroll, 0));
    f.render_widget(body, layout[2]);

    if app.has_errors() {
        let pointer = Paragraph::new(Line::from(vec![
            Span::raw("Check "),
            Span::styled(
                app.log_path.display().to_string(),
                Style::default().fg(Color::Magenta),
            ),
            Span::raw(" for details."),
        ]));
        f.render_widget(pointer, layout[3]);
    }

    let hint = if max_scroll > 0 {
        "Use ↑/↓ to scroll, any other key to exit..."
    } else {
        "Press any key to exit..."
    };
    let footer = Paragraph::new(Line::from(Span::styled(
        hint,
        Style::default()
            .fg(Color::Magenta)
            .add_modifier(Modifier::BOLD),
    )));
    f.render_widget(footer, layout[4]);
}
