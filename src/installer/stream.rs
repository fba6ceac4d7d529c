use std::io::{BufRead, BufReader, Read};

use tracing::warn;

const ESC: char = '\u{1b}';
const BEL: char = '\u{07}';

// Reads the installer output until EOF and hands over each non-blank line
pub(crate) fn drain_lines<R: Read>(reader: R, mut on_line: impl FnMut(String)) {
    let mut reader = BufReader::new(reader);
    let mut buffer = Vec::new();
    loop {
        buffer.clear();
        match reader.read_until(b'\n', &mut buffer) {
            Ok(0) => break,
            Ok(_) => {}
            Err(err) => {
                warn!("installer output stream failed: {}", err);
                break;
            }
        }
        let raw = String::from_utf8_lossy(&buffer);
        let line = clean_line(&raw);
        if !line.is_empty() {
            on_line(line);
        }
    }
}

// A carriage return redraws the line, so only the text after the last one is kept.
// Escape sequences and control characters are dropped.
pub(crate) fn clean_line(raw: &str) -> String {
    let raw = raw.trim_end_matches(['\n', '\r']);
    let visible = raw.rsplit('\r').next().unwrap_or(raw);

    let mut out = String::with_capacity(visible.len());
    let mut chars = visible.chars().peekable();
    while let Some(ch) = chars.next() {
        if ch == ESC {
            match chars.next() {
                // CSI: parameters until a final byte in 0x40..=0x7e
                Some('[') => {
                    for next in chars.by_ref() {
                        if ('\u{40}'..='\u{7e}').contains(&next) {
                            break;
                        }
                    }
                }
                // OSC: until BEL or ESC backslash
                Some(']') => {
                    while let Some(next) = chars.next() {
                        if next == BEL {
                            break;
                        }
                        if next == ESC && chars.peek() == Some(&'\\') {
                            chars.next();
                            break;
                        }
                    }
                }
                _ => {}
            }
            continue;
        }
        if ch == '\t' {
            out.push(' ');
        } else if !ch.is_control() {
            out.push(ch);
        }
    }
    out.trim().to_string()
}
