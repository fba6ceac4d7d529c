use std::collections::VecDeque;
use std::path::PathBuf;

use crossterm::event::{KeyCode, KeyEvent, KeyEventKind, KeyModifiers};
use tracing::{info, warn};

use crate::classify::LineEvent;
use crate::navigation::Menu;
use crate::plan::{build_plan, ExecutionPlan};

// Number of output lines kept for the progress screen
pub const LOG_CAPACITY: usize = 200;

// Lifecycle of the one installer run; never goes back to Idle
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RunState {
    Idle,     // Choosing components
    Running,  // Installer started, streaming output
    Complete, // Installer exited or never launched
}

// Totals reported once the installer has exited
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RunSummary {
    pub errors: usize,
    pub warnings: usize,
    // None when the installer was killed by a signal
    pub exit_code: Option<i32>,
}

impl RunSummary {
    pub fn success(&self) -> bool {
        self.exit_code == Some(0)
    }
}

// Events sent from the drain thread to the UI loop
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InstallerEvent {
    // One classified line of installer output
    Line(LineEvent),
    // The script could not be written or the installer could not be started
    LaunchFailed(String),
    // The installer exited and its output was fully drained
    RunComplete(RunSummary),
}

// What the event loop should do after a key press
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AppAction {
    None,
    StartRun(ExecutionPlan),
    // Leave normally
    Quit,
    // Leave while the installer may still be running
    ForceQuit,
}

// The main application state, owned by the event loop
pub struct App {
    pub menu: Menu,
    pub run_state: RunState,
    // Name from the last step marker
    pub current_step: Option<String>,
    // Last plain output line
    pub progress: String,
    // Recent output shown in the log panel
    pub logs: VecDeque<String>,
    pub warnings: Vec<String>,
    pub errors: Vec<String>,
    pub exit_code: Option<i32>,
    // The current frame of the spinner animation
    pub spinner_idx: usize,
    // Persistent install log, referenced on the summary screen
    pub log_path: PathBuf,
    // First visible line of the summary list
    pub summary_scroll: usize,
}

impl App {
    pub fn new(menu: Menu, log_path: PathBuf) -> Self {
        Self {
            menu,
            run_state: RunState::Idle,
            current_step: None,
            progress: String::new(),
            logs: VecDeque::new(),
            warnings: Vec::new(),
            errors: Vec::new(),
            exit_code: None,
            spinner_idx: 0,
            log_path,
            summary_scroll: 0,
        }
    }

    pub fn has_errors(&self) -> bool {
        !self.errors.is_empty()
    }

    pub fn handle_key(&mut self, key: KeyEvent) -> AppAction {
        if key.kind != KeyEventKind::Press {
            return AppAction::None;
        }
        let quit = is_quit_key(&key);
        match self.run_state {
            RunState::Complete => match key.code {
                KeyCode::Up | KeyCode::Char('k') => {
                    self.summary_scroll = self.summary_scroll.saturating_sub(1);
                    AppAction::None
                }
                KeyCode::Down | KeyCode::Char('j') => {
                    // The renderer clamps further to what fits on screen
                    let limit = self.warnings.len() + self.errors.len();
                    self.summary_scroll = (self.summary_scroll + 1).min(limit);
                    AppAction::None
                }
                _ => AppAction::Quit,
            },
            RunState::Running if quit => AppAction::ForceQuit,
            RunState::Running => AppAction::None,
            RunState::Idle if quit => AppAction::Quit,
            RunState::Idle => {
                match key.code {
                    KeyCode::Up | KeyCode::Char('k') => self.menu.move_up(),
                    KeyCode::Down | KeyCode::Char('j') => self.menu.move_down(),
                    KeyCode::Left | KeyCode::Char('h') => self.menu.move_category_backward(),
                    KeyCode::Right | KeyCode::Char('l') => self.menu.move_category_forward(),
                    KeyCode::Char(' ') => self.menu.toggle_current(),
                    KeyCode::Enter => return self.begin_run(),
                    _ => {}
                }
                AppAction::None
            }
        }
    }

    // Freezes the plan and moves to Running; only reachable from Idle
    fn begin_run(&mut self) -> AppAction {
        let plan = build_plan(self.menu.catalog(), self.menu.selections());
        info!("starting installation of {} steps", plan.len());
        self.run_state = RunState::Running;
        self.progress = "Starting installation...".to_string();
        AppAction::StartRun(plan)
    }

    // Applies a single installer event
    pub fn handle_event(&mut self, evt: InstallerEvent) {
        if self.run_state != RunState::Running {
            warn!("dropping installer event outside a run: {:?}", evt);
            return;
        }
        match evt {
            InstallerEvent::Line(line) => self.apply_line(line),
            InstallerEvent::LaunchFailed(message) => {
                warn!("launch failed: {}", message);
                self.errors.push(format!("Launch failed: {message}"));
                self.run_state = RunState::Complete;
            }
            InstallerEvent::RunComplete(summary) => {
                info!(
                    "installer finished: exit={:?} errors={} warnings={}",
                    summary.exit_code, summary.errors, summary.warnings
                );
                self.exit_code = summary.exit_code;
                // A failing exit code with no error lines is still a failure
                if !summary.success() && self.errors.is_empty() {
                    let message = match summary.exit_code {
                        Some(code) => format!("Installer exited with status {code}"),
                        None => "Installer was terminated by a signal".to_string(),
                    };
                    self.errors.push(message);
                }
                self.run_state = RunState::Complete;
            }
        }
    }

    fn apply_line(&mut self, line: LineEvent) {
        match line {
            LineEvent::StepStarted(name) => {
                self.push_log(format!("==> {name}"));
                self.current_step = Some(name);
            }
            LineEvent::Output(text) => {
                self.push_log(text.clone());
                self.progress = text;
            }
            LineEvent::Warning(text) => {
                self.push_log(text.clone());
                self.warnings.push(text);
            }
            LineEvent::Error(text) => {
                self.push_log(text.clone());
                self.errors.push(text);
            }
        }
    }

    // New log line
    fn push_log(&mut self, line: String) {
        if self.logs.len() >= LOG_CAPACITY {
            self.logs.pop_front();
        }
        self.logs.push_back(line);
    }
}

fn is_quit_key(key: &KeyEvent) -> bool {
    match key.code {
        KeyCode::Char('q') | KeyCode::Char('Q') => true,
        KeyCode::Char('c') => key.modifiers.contains(KeyModifiers::CONTROL),
        _ => false,
    }
}
