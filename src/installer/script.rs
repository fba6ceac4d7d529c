use std::borrow::Cow;
use std::fmt::Write as _;
use std::path::Path;

use shell_escape::unix::escape;

use crate::catalog::Catalog;
use crate::classify::step_marker;
use crate::plan::ExecutionPlan;

fn quote(value: &str) -> Cow<'_, str> {
    escape(Cow::Borrowed(value))
}

// Generates the bash script that runs every plan entry in order.
//
// All output is duplicated to `log_path`; `tee -p` keeps the log going if
// the UI side of the pipe disappears. The first library is sourced and
// initialised before the remaining ones, since they rely on its helpers.
pub(crate) fn render_script(
    plan: &ExecutionPlan,
    catalog: &Catalog,
    library_dir: &Path,
    log_path: &Path,
) -> String {
    let mut script = String::new();
    let log = log_path.to_string_lossy();

    script.push_str("#!/usr/bin/env bash\n\n");
    let _ = writeln!(script, "exec > >(tee -p -a {}) 2>&1\n", quote(&log));
    script.push_str("FAILED_STEPS=()\n\n");

    script.push_str("# Load utilities and sub-scripts\n");
    for (idx, library) in catalog.script.libraries.iter().enumerate() {
        let path = library_dir.join(library);
        let _ = writeln!(script, "source {}", quote(&path.to_string_lossy()));
        if idx == 0 {
            if let Some(init) = &catalog.script.init {
                let _ = writeln!(script, "{init}");
            }
        }
    }
    if catalog.script.libraries.is_empty() {
        if let Some(init) = &catalog.script.init {
            let _ = writeln!(script, "{init}");
        }
    }

    script.push_str("\n# Execute selected installation steps\n");
    for id in plan.iter() {
        let name = catalog.step(id).map(|step| step.name.as_str()).unwrap_or(id);
        let _ = writeln!(script, "echo {}", quote(&step_marker(name)));
        let _ = writeln!(script, "{id} || FAILED_STEPS+=({id})");
        script.push_str("echo\n");
    }

    script.push_str("\n# Installation complete\n");
    script.push_str("echo ''\n");
    script.push_str("echo '================================'\n");
    script.push_str("echo '  SETUP COMPLETE!'\n");
    script.push_str("echo '================================'\n");
    script.push_str("echo ''\n");
    if let Some(summary) = &catalog.script.summary {
        let _ = writeln!(
            script,
            "if declare -F {summary} >/dev/null; then\n    {summary}\nfi"
        );
    }

    script.push_str("\nif [ ${#FAILED_STEPS[@]} -gt 0 ]; then\n");
    script.push_str("    echo \"ERROR: steps failed: ${FAILED_STEPS[*]}\"\n");
    script.push_str("    exit 1\n");
    script.push_str("fi\n");
    script.push_str("exit 0\n");

    script
}
