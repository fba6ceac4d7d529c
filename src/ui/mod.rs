use ratatui::Frame;

use crate::model::{App, RunState};

pub const SPINNER_LEN: usize = 4;
pub(crate) const SPINNER: [&str; SPINNER_LEN] = ["|", "/", "-", "\\"];
pub(crate) const DOTFILES_ART: [&str; 6] = [
    "     _       _    __ _ _           ",
    "  __| | ___ | |_ / _(_) | ___  ___ ",
    " / _` |/ _ \\| __| |_| | |/ _ \\/ __|",
    "| (_| | (_) | |_|  _| | |  __/\\__ \\",
    " \\__,_|\\___/ \\__|_| |_|_|\\___||___/",
    "",
];

// UI submodules
mod colors;
mod common;
mod installer;
mod menu;
mod summary;

// Renders whichever screen matches the run state
pub fn draw(f: &mut Frame<'_>, app: &App) {
    let area = f.size();
    match app.run_state {
        RunState::Idle => menu::draw_menu(area, f, app),
        RunState::Running => installer::draw_progress(area, f, app),
        RunState::Complete => summary::draw_summary(area, f, app),
    }
}
