/////////
/// Component selection menu
////////
use ratatui::layout::{Constraint, Direction, Layout, Rect};
use ratatui::style::{Color, Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{List, ListItem, ListState, Paragraph, Wrap};
use ratatui::Frame;

use crate::catalog::Step;
use crate::model::App;
use crate::navigation::Menu;
use crate::ui::colors::{ACCENT, MUTED};

use super::common::{
    art_height, default_title_style, draw_art, draw_title, key_span, panel,
};

fn checkbox(menu: &Menu, step: &Step) -> &'static str {
    if step.required {
        "[●]"
    } else if menu.is_effectively_selected(step) {
        "[✓]"
    } else {
        "[ ]"
    }
}

fn step_item(menu: &Menu, step: &Step) -> ListItem<'static> {
    let style = if menu.is_effectively_selected(step) {
        Style::default().fg(Color::LightGreen)
    } else {
        Style::default().fg(Color::Gray)
    };
    let mut spans = vec![
        Span::styled(checkbox(menu, step), style),
        Span::raw(" "),
        Span::styled(step.name.clone(), style),
    ];
    if step.required {
        spans.push(Span::styled(" (required)", Style::default().fg(MUTED)));
    }
    ListItem::new(Line::from(spans))
}

pub(crate) fn draw_menu(area: Rect, f: &mut Frame<'_>, app: &App) {
    let menu = &app.menu;
    let cursor = menu.cursor();
    let catalog = menu.catalog();

    let layout = Layout::default()
        .direction(Direction::Vertical)
        .margin(0)
        .constraints([
            Constraint::Length(art_height()), // ASCII art
            Constraint::Length(1),            // Title
            Constraint::Length(5),            // Controls
            Constraint::Min(8),               // Categories and steps
            Constraint::Length(5),            // Description
            Constraint::Length(1),            // Footer
        ])
        .split(area);

    draw_art(layout[0], f);
    draw_title(layout[1], f, "Dotfiles Installer");

    // Controls box
    let help = Paragraph::new(vec![
        Line::from(vec![
            key_span("↑/↓"),
            Span::raw(" move, "),
            key_span("←/→"),
            Span::raw(" switch category, "),
            key_span("Space"),
            Span::raw(" toggle."),
        ]),
        Line::from(vec![
            key_span("Enter"),
            Span::raw(" install, "),
            key_span("Q"),
            Span::raw(" quit."),
        ]),
    ])
    .block(panel("Controls", default_title_style()))
    .wrap(Wrap { trim: false });
    f.render_widget(help, layout[2]);

    let columns = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Percentage(32), Constraint::Percentage(68)])
        .split(layout[3]);

    // --- Render Category List ---
    let category_items: Vec<ListItem> = catalog
        .categories
        .iter()
        .map(|category| {
            let chosen = category
                .steps
                .iter()
                .filter(|step| menu.is_effectively_selected(step))
                .count();
            ListItem::new(Line::from(vec![
                Span::raw(category.name.clone()),
                Span::styled(
                    format!(" {}/{}", chosen, category.steps.len()),
                    Style::default().fg(MUTED),
                ),
            ]))
        })
        .collect();
    let category_list = List::new(category_items)
        .block(panel("Categories", default_title_style()))
        .highlight_style(
            Style::default()
                .fg(Color::Yellow)
                .add_modifier(Modifier::BOLD),
        )
        .highlight_symbol("▶ ");
    let mut category_state = ListState::default();
    category_state.select(Some(cursor.category));
    f.render_stateful_widget(category_list, columns[0], &mut category_state);

    // --- Render Step List ---
    let current = catalog.categories.get(cursor.category);
    let step_items: Vec<ListItem> = current
        .map(|category| {
            category
                .steps
                .iter()
                .map(|step| step_item(menu, step))
                .collect()
        })
        .unwrap_or_default();
    let step_title = current.map(|category| category.name.as_str()).unwrap_or("");
    let step_list = List::new(step_items)
        .block(panel(
            step_title,
            Style::default().fg(ACCENT).add_modifier(Modifier::BOLD),
        ))
        .highlight_style(
            Style::default()
                .fg(Color::Yellow)
                .add_modifier(Modifier::BOLD),
        )
        .highlight_symbol("▶ ");
    let mut step_state = ListState::default();
    step_state.select(Some(cursor.step));
    f.render_stateful_widget(step_list, columns[1], &mut step_state);

    // Description of the step under the cursor
    let description = menu
        .current_step()
        .map(|step| step.description.clone())
        .unwrap_or_default();
    let description = Paragraph::new(Line::from(Span::styled(
        description,
        Style::default().fg(Color::White),
    )))
    .block(panel("Description", default_title_style()))
    .wrap(Wrap { trim: true });
    f.render_widget(description, layout[4]);

    let footer = Paragraph::new(Line::from(vec![
        Span::styled(
            format!(
                "Selected: {}/{} components",
                menu.selections().selected_count(),
                catalog.total_count()
            ),
            Style::default().fg(Color::LightGreen),
        ),
        Span::raw("  "),
        Span::styled(
            "Selections apply to this run only",
            Style::default().fg(Color::White),
        ),
    ]));
    f.render_widget(footer, layout[5]);
}
