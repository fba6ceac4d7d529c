use std::io::{self, Stdout};
use std::panic;
use std::time::{Duration, Instant};

use anyhow::{Context, Result};
use crossterm::event::{self, Event};
use crossterm::execute;
use crossterm::terminal::{
    disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen,
};
use ratatui::backend::CrosstermBackend;
use ratatui::Terminal;
use tracing::{error, info, warn};

use dotfiles_installer::catalog::Catalog;
use dotfiles_installer::config::Settings;
use dotfiles_installer::installer::{preflight, start_run, RunHandle};
use dotfiles_installer::logging;
use dotfiles_installer::model::{App, AppAction};
use dotfiles_installer::navigation::Menu;
use dotfiles_installer::ui::{self, SPINNER_LEN};

const SPINNER_INTERVAL: Duration = Duration::from_millis(120);

fn main() -> Result<()> {
    dotenvy::dotenv().ok();
    let settings = Settings::from_env();
    logging::init(settings.debug_log.as_deref())?;

    // The script library must sit next to the working directory
    if let Err(err) = preflight(&settings) {
        eprintln!("Error: please run this installer from the dotfiles directory.");
        eprintln!("{err}");
        std::process::exit(1);
    }

    let catalog = Catalog::embedded().context("load step catalog")?;
    let app = App::new(Menu::new(catalog), settings.log_path.clone());

    // Put the terminal back before any panic message is printed
    let original_hook = panic::take_hook();
    panic::set_hook(Box::new(move |panic_info| {
        let _ = restore_terminal();
        original_hook(panic_info);
    }));

    let mut terminal = setup_terminal()?;
    let result = run(&mut terminal, app, &settings);
    finish(result, restore_terminal())
}

// The event loop's outcome wins; a failed restore is only logged
fn finish(result: Result<()>, restored: Result<()>) -> Result<()> {
    if let Err(err) = restored {
        error!("failed to restore terminal: {:#}", err);
    }
    if let Err(ref err) = result {
        error!("installer error: {:#}", err);
    }
    result
}

fn setup_terminal() -> Result<Terminal<CrosstermBackend<Stdout>>> {
    enable_raw_mode().context("enable raw mode")?;
    execute!(io::stdout(), EnterAlternateScreen).context("enter alternate screen")?;
    Terminal::new(CrosstermBackend::new(io::stdout())).context("init terminal")
}

fn restore_terminal() -> Result<()> {
    disable_raw_mode().context("disable raw mode")?;
    execute!(io::stdout(), LeaveAlternateScreen).context("leave alternate screen")?;
    Ok(())
}

// Single-threaded event loop; the only place App is mutated
fn run(
    terminal: &mut Terminal<CrosstermBackend<Stdout>>,
    mut app: App,
    settings: &Settings,
) -> Result<()> {
    let mut handle: Option<RunHandle> = None;
    let mut last_tick = Instant::now();

    loop {
        terminal.draw(|f| ui::draw(f, &app))?;

        if event::poll(settings.tick_rate).context("poll events")? {
            if let Event::Key(key) = event::read().context("read event")? {
                match app.handle_key(key) {
                    AppAction::None => {}
                    AppAction::StartRun(plan) => {
                        info!("plan: {:?}", plan.ids());
                        handle = Some(start_run(&plan, app.menu.catalog(), settings));
                    }
                    AppAction::Quit => break,
                    AppAction::ForceQuit => {
                        if let Some(handle) = handle.as_ref() {
                            if let Err(err) = handle.cancel(settings.cancel_policy) {
                                warn!("failed to cancel installer: {}", err);
                            }
                        }
                        info!("forced quit while the installer was running");
                        break;
                    }
                }
            }
        }

        // Apply everything the drain thread has produced since the last frame
        if let Some(handle) = handle.as_ref() {
            while let Some(evt) = handle.try_next() {
                app.handle_event(evt);
            }
        }

        // Update the spinner animation
        if last_tick.elapsed() >= SPINNER_INTERVAL {
            app.spinner_idx = (app.spinner_idx + 1) % SPINNER_LEN;
            last_tick = Instant::now();
        }
    }

    Ok(())
}
