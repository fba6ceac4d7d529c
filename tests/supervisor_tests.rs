use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use crossbeam_channel::RecvTimeoutError;
use dotfiles_installer::catalog::Catalog;
use dotfiles_installer::classify::LineEvent;
use dotfiles_installer::config::{CancelPolicy, Settings};
use dotfiles_installer::installer::{start_run, RunHandle};
use dotfiles_installer::model::{App, InstallerEvent, RunState};
use dotfiles_installer::navigation::Menu;
use dotfiles_installer::plan::{build_plan, ExecutionPlan};
use tempfile::TempDir;

const EVENT_TIMEOUT: Duration = Duration::from_secs(30);

const CATALOG: &str = r#"
[script]
libraries = ["utils.sh"]
init = "init_utils"

[[categories]]
name = "Base"

[[categories.steps]]
id = "core"
name = "core"
description = "Core packages"
required = true

[[categories.steps]]
id = "docker"
name = "docker"
description = "Containers"
"#;

struct Fixture {
    _root: TempDir,
    settings: Settings,
    catalog: Catalog,
}

impl Fixture {
    // Lays out lib/utils.sh with the given step functions
    fn new(functions: &str) -> Self {
        let root = TempDir::new().expect("temp dir");
        let lib = root.path().join("lib");
        let scripts = root.path().join("scripts");
        fs::create_dir_all(&lib).expect("create lib dir");
        fs::create_dir_all(&scripts).expect("create script dir");
        fs::write(
            lib.join("utils.sh"),
            format!("init_utils() {{ :; }}\n{functions}\n"),
        )
        .expect("write utils.sh");

        let settings = Settings {
            sentinel: lib.join("utils.sh"),
            library_dir: lib,
            log_path: root.path().join("install.log"),
            script_dir: scripts,
            shell: "bash".to_string(),
            ..Settings::default()
        };
        let catalog = Catalog::from_toml_str(CATALOG).expect("catalog");
        Self {
            _root: root,
            settings,
            catalog,
        }
    }

    fn plan_with_docker(&self) -> ExecutionPlan {
        let mut menu = Menu::new(self.catalog.clone());
        menu.move_down();
        menu.toggle_current();
        build_plan(menu.catalog(), menu.selections())
    }

    fn start(&self, plan: &ExecutionPlan) -> RunHandle {
        start_run(plan, &self.catalog, &self.settings)
    }

    fn leftover_scripts(&self) -> Vec<PathBuf> {
        fs::read_dir(&self.settings.script_dir)
            .expect("read script dir")
            .map(|entry| entry.expect("dir entry").path())
            .collect()
    }
}

// Collects events until the run reports a terminal event
fn collect_until_done(handle: &RunHandle) -> Vec<InstallerEvent> {
    let mut events = Vec::new();
    loop {
        match handle.events().recv_timeout(EVENT_TIMEOUT) {
            Ok(evt) => {
                let done = matches!(
                    evt,
                    InstallerEvent::RunComplete(_) | InstallerEvent::LaunchFailed(_)
                );
                events.push(evt);
                if done {
                    return events;
                }
            }
            Err(RecvTimeoutError::Timeout) => panic!("timed out, got so far: {events:?}"),
            Err(RecvTimeoutError::Disconnected) => panic!("channel closed: {events:?}"),
        }
    }
}

fn wait_for_line(handle: &RunHandle, wanted: &str) {
    loop {
        match handle.events().recv_timeout(EVENT_TIMEOUT) {
            Ok(InstallerEvent::Line(line)) if line.text() == wanted => return,
            Ok(_) => {}
            Err(err) => panic!("never saw {wanted:?}: {err:?}"),
        }
    }
}

fn lines(events: &[InstallerEvent]) -> Vec<LineEvent> {
    events
        .iter()
        .filter_map(|evt| match evt {
            InstallerEvent::Line(line) => Some(line.clone()),
            _ => None,
        })
        .collect()
}

fn apply_all(catalog: &Catalog, log_path: &Path, events: Vec<InstallerEvent>) -> App {
    let mut app = App::new(Menu::new(catalog.clone()), log_path.to_path_buf());
    app.run_state = RunState::Running;
    for evt in events {
        app.handle_event(evt);
    }
    app
}

#[test]
fn streams_classified_events_in_emission_order() {
    let fixture = Fixture::new(
        "core() { echo 'OUTPUT line'; echo 'ERROR: disk full' >&2; }\n\
         docker() { echo 'WARNING: slow network'; }",
    );
    let handle = fixture.start(&fixture.plan_with_docker());
    assert!(handle.is_launched());
    let events = collect_until_done(&handle);

    let observed = lines(&events);
    assert_eq!(
        observed[..5],
        [
            LineEvent::StepStarted("core".to_string()),
            LineEvent::Output("OUTPUT line".to_string()),
            LineEvent::Error("ERROR: disk full".to_string()),
            LineEvent::StepStarted("docker".to_string()),
            LineEvent::Warning("WARNING: slow network".to_string()),
        ]
    );

    let Some(InstallerEvent::RunComplete(summary)) = events.last().cloned() else {
        panic!("last event should be RunComplete: {events:?}");
    };
    assert_eq!(summary.errors, 1);
    assert_eq!(summary.warnings, 1);
    assert_eq!(summary.exit_code, Some(0));

    let app = apply_all(&fixture.catalog, &fixture.settings.log_path, events);
    assert_eq!(app.run_state, RunState::Complete);
    assert_eq!(app.errors, vec!["ERROR: disk full".to_string()]);
    assert_eq!(app.warnings, vec!["WARNING: slow network".to_string()]);
}

#[test]
fn run_complete_is_sent_exactly_once_and_last() {
    let fixture = Fixture::new("core() { echo hi; }\ndocker() { echo there; }");
    let handle = fixture.start(&fixture.plan_with_docker());
    let events = collect_until_done(&handle);
    let completions = events
        .iter()
        .filter(|evt| matches!(evt, InstallerEvent::RunComplete(_)))
        .count();
    assert_eq!(completions, 1);
    // The drain thread is gone, so the channel closes with nothing left
    assert!(matches!(
        handle.events().recv_timeout(EVENT_TIMEOUT),
        Err(RecvTimeoutError::Disconnected)
    ));
}

#[test]
fn script_is_removed_and_output_is_logged() {
    let fixture = Fixture::new("core() { echo 'building core'; }\ndocker() { :; }");
    let handle = fixture.start(&fixture.plan_with_docker());
    collect_until_done(&handle);

    assert!(fixture.leftover_scripts().is_empty());
    let log = fs::read_to_string(&fixture.settings.log_path).expect("read install log");
    assert!(log.contains("=== Installing: core ==="));
    assert!(log.contains("building core"));
    assert!(log.contains("=== Installing: docker ==="));
}

#[test]
fn run_never_writes_through_a_planted_symlink() {
    let fixture = Fixture::new("core() { echo hi; }\ndocker() { :; }");
    let victim = fixture.settings.script_dir.join("victim.txt");
    fs::write(&victim, "precious data").expect("write victim");
    let planted = fixture
        .settings
        .script_dir
        .join(format!("install_selected-{}.sh", std::process::id()));
    std::os::unix::fs::symlink(&victim, &planted).expect("plant symlink");

    let handle = fixture.start(&fixture.plan_with_docker());
    let events = collect_until_done(&handle);
    assert!(matches!(events.last(), Some(InstallerEvent::RunComplete(_))));
    assert_eq!(fs::read_to_string(&victim).expect("read victim"), "precious data");

    // Only the planted entries remain; the generated script is gone
    let mut left = fixture.leftover_scripts();
    left.sort();
    assert_eq!(left, vec![planted, victim]);
}

#[test]
fn failed_step_sets_exit_code_and_reports_it() {
    let fixture = Fixture::new("core() { echo ok; }\ndocker() { return 3; }");
    let handle = fixture.start(&fixture.plan_with_docker());
    let events = collect_until_done(&handle);

    let app = apply_all(&fixture.catalog, &fixture.settings.log_path, events);
    assert_eq!(app.exit_code, Some(1));
    assert_eq!(app.errors, vec!["ERROR: steps failed: docker".to_string()]);
}

#[test]
fn silent_non_zero_exit_is_still_an_error() {
    let fixture = Fixture::new("core() { echo 'leaving early'; exit 4; }\ndocker() { :; }");
    let handle = fixture.start(&fixture.plan_with_docker());
    let events = collect_until_done(&handle);

    let app = apply_all(&fixture.catalog, &fixture.settings.log_path, events);
    assert_eq!(app.exit_code, Some(4));
    assert_eq!(app.errors, vec!["Installer exited with status 4".to_string()]);
    assert!(fixture.leftover_scripts().is_empty());
}

#[test]
fn missing_interpreter_is_a_single_launch_failure() {
    let mut fixture = Fixture::new("core() { :; }\ndocker() { :; }");
    fixture.settings.shell = "/nonexistent/definitely-not-bash".to_string();
    let handle = fixture.start(&fixture.plan_with_docker());
    assert!(!handle.is_launched());

    let events = collect_until_done(&handle);
    assert_eq!(events.len(), 1);
    assert!(matches!(&events[0], InstallerEvent::LaunchFailed(msg) if msg.contains("definitely-not-bash")));
    assert!(handle.try_next().is_none());
    assert!(fixture.leftover_scripts().is_empty());

    let log = fs::read_to_string(&fixture.settings.log_path).expect("read install log");
    assert!(log.contains("Launch failed"));

    let app = apply_all(&fixture.catalog, &fixture.settings.log_path, events);
    assert_eq!(app.run_state, RunState::Complete);
    assert_eq!(app.errors.len(), 1);
}

#[test]
fn unwritable_script_dir_is_a_launch_failure() {
    let mut fixture = Fixture::new("core() { :; }\ndocker() { :; }");
    fixture.settings.script_dir = fixture.settings.script_dir.join("missing").join("dir");
    let handle = fixture.start(&fixture.plan_with_docker());
    let events = collect_until_done(&handle);
    assert_eq!(events.len(), 1);
    assert!(matches!(&events[0], InstallerEvent::LaunchFailed(msg) if msg.contains("install script")));
}

#[test]
fn kill_group_stops_a_running_installer() {
    let fixture = Fixture::new("core() { echo started; sleep 30; }\ndocker() { :; }");
    let handle = fixture.start(&fixture.plan_with_docker());
    wait_for_line(&handle, "started");

    handle.cancel(CancelPolicy::KillGroup).expect("cancel");
    let events = collect_until_done(&handle);
    let Some(InstallerEvent::RunComplete(summary)) = events.last().cloned() else {
        panic!("expected RunComplete after kill: {events:?}");
    };
    assert!(!summary.success());
    assert!(fixture.leftover_scripts().is_empty());
}

#[test]
fn detach_leaves_the_installer_running() {
    let fixture = Fixture::new("core() { echo started; sleep 30; }\ndocker() { :; }");
    let handle = fixture.start(&fixture.plan_with_docker());
    wait_for_line(&handle, "started");

    handle.cancel(CancelPolicy::Detach).expect("detach");
    assert!(matches!(
        handle.events().recv_timeout(Duration::from_millis(300)),
        Err(RecvTimeoutError::Timeout)
    ));

    // Clean up the still-running installer
    handle.cancel(CancelPolicy::KillGroup).expect("cleanup");
    collect_until_done(&handle);
}
