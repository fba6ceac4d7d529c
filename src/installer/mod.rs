/////////
/// Installation process supervisor
////////
mod script;
mod stream;

use std::fs::{File, OpenOptions, Permissions};
use std::io::{self, Write};
use std::os::fd::{FromRawFd, OwnedFd};
use std::os::unix::fs::PermissionsExt;
use std::os::unix::process::CommandExt;
use std::path::{Path, PathBuf};
use std::process::{Child, Command, Stdio};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::thread;

use crossbeam_channel::{Receiver, Sender};
use tempfile::{Builder, TempPath};
use tracing::{debug, info, warn};

use crate::catalog::Catalog;
use crate::classify::{classify, LineEvent};
use crate::config::{CancelPolicy, Settings};
use crate::error::{LaunchError, PreflightError};
use crate::model::{InstallerEvent, RunSummary};
use crate::plan::ExecutionPlan;

use script::render_script;
use stream::drain_lines;

const SCRIPT_PREFIX: &str = "install_selected-";
const SCRIPT_SUFFIX: &str = ".sh";

// Refuses to start unless the script library is present
pub fn preflight(settings: &Settings) -> Result<(), PreflightError> {
    if settings.sentinel.exists() {
        Ok(())
    } else {
        Err(PreflightError {
            sentinel: settings.sentinel.clone(),
        })
    }
}

// A started (or failed) installer run, as seen from the UI loop
pub struct RunHandle {
    events: Receiver<InstallerEvent>,
    // Process group of the installer; None when it never started
    pgid: Option<i32>,
    // Set by the drain thread once the installer has been reaped
    reaped: Arc<Mutex<bool>>,
}

impl RunHandle {
    // Never blocks; None when nothing is pending
    pub fn try_next(&self) -> Option<InstallerEvent> {
        self.events.try_recv().ok()
    }

    pub fn events(&self) -> &Receiver<InstallerEvent> {
        &self.events
    }

    pub fn is_launched(&self) -> bool {
        self.pgid.is_some()
    }

    // Applies the cancellation policy; does not wait for the installer
    pub fn cancel(&self, policy: CancelPolicy) -> io::Result<()> {
        let Some(pgid) = self.pgid else {
            return Ok(());
        };
        match policy {
            CancelPolicy::Detach => {
                info!("leaving installer process group {} running", pgid);
                Ok(())
            }
            CancelPolicy::KillGroup => {
                // Held across kill(2) so the drain thread cannot reap in between
                let reaped = lock(&self.reaped);
                if *reaped {
                    debug!("installer {} already reaped, nothing to terminate", pgid);
                    return Ok(());
                }
                info!("terminating installer process group {}", pgid);
                // SAFETY: kill(2) takes plain integers and has no memory preconditions
                let rc = unsafe { libc::kill(-pgid, libc::SIGTERM) };
                if rc == 0 {
                    return Ok(());
                }
                let err = io::Error::last_os_error();
                if err.raw_os_error() == Some(libc::ESRCH) {
                    // Already gone
                    Ok(())
                } else {
                    Err(err)
                }
            }
        }
    }
}

// Starts the installer and returns immediately.
//
// Launch problems are reported as a single `LaunchFailed` event on the
// returned handle rather than as an error, so the UI has one path for
// every outcome.
pub fn start_run(plan: &ExecutionPlan, catalog: &Catalog, settings: &Settings) -> RunHandle {
    let (tx, rx) = crossbeam_channel::unbounded();
    let reaped = Arc::new(Mutex::new(false));

    match launch(plan, catalog, settings) {
        Ok(launched) => {
            let pgid = launched.child.id() as i32;
            info!(
                "installer started: pid={} script={}",
                pgid,
                launched.script.display()
            );
            let drain_reaped = Arc::clone(&reaped);
            thread::spawn(move || drain_run(launched, drain_reaped, tx));
            RunHandle {
                events: rx,
                pgid: Some(pgid),
                reaped,
            }
        }
        Err(err) => {
            warn!("installer launch failed: {}", err);
            append_install_log(&settings.log_path, &format!("Launch failed: {err}"));
            send_event(&tx, InstallerEvent::LaunchFailed(err.to_string()));
            RunHandle {
                events: rx,
                pgid: None,
                reaped,
            }
        }
    }
}

fn lock(flag: &Mutex<bool>) -> MutexGuard<'_, bool> {
    flag.lock().unwrap_or_else(PoisonError::into_inner)
}

struct Launched {
    child: Child,
    output: File,
    // Deleted on drop, so every early return below cleans up too
    script: TempPath,
}

fn launch(
    plan: &ExecutionPlan,
    catalog: &Catalog,
    settings: &Settings,
) -> Result<Launched, LaunchError> {
    let library_dir = absolute(&settings.library_dir);
    let contents = render_script(plan, catalog, &library_dir, &settings.log_path);
    let script = write_script(&settings.script_dir, &contents).map_err(|source| {
        LaunchError::WriteScript {
            dir: settings.script_dir.clone(),
            source,
        }
    })?;

    let (output, writer) = output_pipe().map_err(LaunchError::Pipe)?;
    let child =
        spawn_installer(&settings.shell, &script, writer).map_err(|source| {
            LaunchError::Spawn {
                program: settings.shell.clone(),
                source,
            }
        })?;

    Ok(Launched {
        child,
        output,
        script,
    })
}

fn absolute(path: &Path) -> PathBuf {
    if path.is_absolute() {
        return path.to_path_buf();
    }
    match std::env::current_dir() {
        Ok(cwd) => cwd.join(path),
        Err(_) => path.to_path_buf(),
    }
}

// Fresh randomly named file, created exclusively and never through an existing path
fn write_script(dir: &Path, contents: &str) -> io::Result<TempPath> {
    let mut file = Builder::new()
        .prefix(SCRIPT_PREFIX)
        .suffix(SCRIPT_SUFFIX)
        .permissions(Permissions::from_mode(0o700))
        .tempfile_in(dir)?;
    file.write_all(contents.as_bytes())?;
    file.flush()?;
    Ok(file.into_temp_path())
}

// One pipe shared by stdout and stderr keeps both in emission order
fn output_pipe() -> io::Result<(File, OwnedFd)> {
    let mut fds: [libc::c_int; 2] = [-1, -1];
    // SAFETY: fds points at two writable c_ints as pipe2(2) requires
    let rc = unsafe { libc::pipe2(fds.as_mut_ptr(), libc::O_CLOEXEC) };
    if rc != 0 {
        return Err(io::Error::last_os_error());
    }
    // SAFETY: pipe2 succeeded, so both descriptors are open and owned only here
    let (read, write) = unsafe { (OwnedFd::from_raw_fd(fds[0]), OwnedFd::from_raw_fd(fds[1])) };
    Ok((File::from(read), write))
}

// The parent's copies of the write end close when `cmd` drops, so EOF
// arrives once the installer and everything it spawned are done.
fn spawn_installer(shell: &str, script: &Path, writer: OwnedFd) -> io::Result<Child> {
    let stderr = writer.try_clone()?;
    let mut cmd = Command::new(shell);
    cmd.arg(script)
        .stdin(Stdio::null())
        .stdout(Stdio::from(writer))
        .stderr(Stdio::from(stderr))
        .process_group(0);
    cmd.spawn()
}

// Body of the drain thread: the only owner of the child and its output
fn drain_run(launched: Launched, reaped: Arc<Mutex<bool>>, tx: Sender<InstallerEvent>) {
    let Launched {
        mut child,
        output,
        script,
    } = launched;
    let mut errors = 0;
    let mut warnings = 0;

    drain_lines(output, |line| {
        let event = classify(&line);
        match &event {
            LineEvent::Error(_) => errors += 1,
            LineEvent::Warning(_) => warnings += 1,
            LineEvent::StepStarted(name) => info!("step started: {}", name),
            LineEvent::Output(_) => {}
        }
        send_event(&tx, InstallerEvent::Line(event));
    });

    // The exited child stays a zombie until reaped, so its group id cannot be reused
    // while `cancel` still holds the lock.
    wait_for_exit(child.id());
    let status = {
        let mut reaped = lock(&reaped);
        let status = child.wait();
        *reaped = true;
        status
    };
    let exit_code = match status {
        Ok(status) => {
            info!("installer exited: {}", status);
            status.code()
        }
        Err(err) => {
            warn!("failed to wait for installer: {}", err);
            None
        }
    };
    let path = script.to_path_buf();
    match script.close() {
        Ok(()) => debug!("removed {}", path.display()),
        Err(err) => warn!("failed to remove {}: {}", path.display(), err),
    }

    send_event(
        &tx,
        InstallerEvent::RunComplete(RunSummary {
            errors,
            warnings,
            exit_code,
        }),
    );
}

// Blocks until the child has exited without reaping it
fn wait_for_exit(pid: u32) {
    loop {
        // SAFETY: siginfo_t is plain data and an all-zero value is valid
        let mut info: libc::siginfo_t = unsafe { std::mem::zeroed() };
        // SAFETY: info is a valid, writable siginfo_t for the duration of the call
        let rc = unsafe {
            libc::waitid(
                libc::P_PID,
                pid as libc::id_t,
                &mut info,
                libc::WEXITED | libc::WNOWAIT,
            )
        };
        if rc == 0 {
            return;
        }
        let err = io::Error::last_os_error();
        if err.kind() != io::ErrorKind::Interrupted {
            warn!("waitid on installer {} failed: {}", pid, err);
            return;
        }
    }
}

// The UI may already be gone; a closed channel is not an error here
fn send_event(tx: &Sender<InstallerEvent>, evt: InstallerEvent) {
    let _ = tx.send(evt);
}

// Appends a line to the persistent install log
fn append_install_log(path: &Path, line: &str) {
    if let Ok(mut file) = OpenOptions::new().create(true).append(true).open(path) {
        let _ = writeln!(file, "{}", line);
    }
}
