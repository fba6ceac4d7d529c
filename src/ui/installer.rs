/////////
/// Installation progress screen
////////
use ratatui::layout::{Constraint, Direction, Layout, Rect};
use ratatui::style::{Color, Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Paragraph, Wrap};
use ratatui::Frame;

use crate::model::App;

use super::common::{
    art_height, bullet_lines, default_title_style, draw_art, draw_title, key_span, panel,
};
use super::SPINNER;

// Errors shown while the run is still going
const RECENT_ERRORS: usize = 3;

pub(crate) fn draw_progress(area: Rect, f: &mut Frame<'_>, app: &App) {
    let error_height = if app.errors.is_empty() {
        0
    } else {
        (app.errors.len().min(RECENT_ERRORS) as u16).saturating_add(3)
    };
    let layout = Layout::default()
        .direction(Direction::Vertical)
        .margin(0)
        .constraints([
            Constraint::Length(art_height()), // ASCII art
            Constraint::Length(1),            // Title
            Constraint::Length(5),            // Current step
            Constraint::Min(6),               // Logs
            Constraint::Length(error_height), // Recent errors
            Constraint::Length(1),            // Footer
        ])
        .split(area);

    draw_art(layout[0], f);
    draw_title(layout[1], f, "Installing");

    // Current step and the latest progress line
    let step_name = app.current_step.as_deref().unwrap_or("Preparing...");
    let current = Paragraph::new(vec![
        Line::from(vec![
            Span::styled(
                format!("Current: {step_name}"),
                Style::default()
                    .fg(Color::LightBlue)
                    .add_modifier(Modifier::BOLD),
            ),
            Span::raw(format!(" {}", SPINNER[app.spinner_idx % SPINNER.len()])),
        ]),
        Line::from(Span::raw(app.progress.clone())),
    ])
    .block(panel("Progress", default_title_style()))
    .wrap(Wrap { trim: false });
    f.render_widget(current, layout[2]);

    // Log output panel, pinned to the newest line
    let log_lines: Vec<Line> = app
        .logs
        .iter()
        .map(|line| Line::from(Span::raw(line.clone())))
        .collect();
    let log_height = layout[3].height.saturating_sub(3) as usize;
    let scroll_offset = log_lines.len().saturating_sub(log_height);
    let scroll_offset = scroll_offset.min(u16::MAX as usize) as u16;
    let logs = Paragraph::new(log_lines)
        .block(panel("Logs", default_title_style()))
        .scroll((scroll_offset, 0));
    f.render_widget(logs, layout[3]);

    if !app.errors.is_empty() {
        let start = app.errors.len().saturating_sub(RECENT_ERRORS);
        let recent = Paragraph::new(bullet_lines(&app.errors[start..], Color::LightRed))
            .block(panel(
                "Recent errors",
                Style::default().fg(Color::Red).add_modifier(Modifier::BOLD),
            ))
            .wrap(Wrap { trim: false });
        f.render_widget(recent, layout[4]);
    }

    let footer = Paragraph::new(Line::from(vec![
        Span::raw("This may take several minutes. Output is also written to "),
        Span::styled(
            app.log_path.display().to_string(),
            Style::default().fg(Color::Magenta),
        ),
        Span::raw(". "),
        key_span("Q"),
        Span::raw(" quits immediately."),
    ]));
    f.render_widget(footer, layout[5]);
}
