/////////
/// Installer output line protocol
////////

// Every step announces itself as "=== Installing: <name> ==="
pub const STEP_MARKER: &str = "=== Installing:";
const STEP_MARKER_CLOSE: &str = "===";
const ERROR_MARKER: &str = "error";
const WARNING_MARKER: &str = "warning";

// One classified line of installer output
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LineEvent {
    StepStarted(String),
    Warning(String),
    Error(String),
    Output(String),
}

impl LineEvent {
    pub fn text(&self) -> &str {
        match self {
            LineEvent::StepStarted(text)
            | LineEvent::Warning(text)
            | LineEvent::Error(text)
            | LineEvent::Output(text) => text,
        }
    }
}

// Priority: step marker, then error, then warning, then plain output
pub fn classify(line: &str) -> LineEvent {
    if let Some(name) = step_name(line) {
        return LineEvent::StepStarted(name);
    }
    let lowered = line.to_lowercase();
    if lowered.contains(ERROR_MARKER) {
        LineEvent::Error(line.to_string())
    } else if lowered.contains(WARNING_MARKER) {
        LineEvent::Warning(line.to_string())
    } else {
        LineEvent::Output(line.to_string())
    }
}

// Text between the marker and the closing delimiter; a marker without a name is not a step
fn step_name(line: &str) -> Option<String> {
    let start = line.find(STEP_MARKER)? + STEP_MARKER.len();
    let rest = line[start..].trim();
    let name = rest.strip_suffix(STEP_MARKER_CLOSE).unwrap_or(rest).trim();
    if name.is_empty() {
        None
    } else {
        Some(name.to_string())
    }
}

// Builds the marker line the install script echoes before each step
pub fn step_marker(name: &str) -> String {
    format!("{STEP_MARKER} {name} {STEP_MARKER_CLOSE}")
}
