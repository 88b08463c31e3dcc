use anyhow::{anyhow, Result};
use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::Path;
use tracing::warn;

/// Read a newline-delimited wordlist. Blank lines are skipped; surrounding
/// spaces are kept since they can be part of a password. Lines that are not
/// valid UTF-8 are skipped with a warning.
pub fn load_lines<P: AsRef<Path>>(path: P) -> Result<Vec<String>> {
    let path = path.as_ref();
    let file = File::open(path)
        .map_err(|e| anyhow!("Failed to open file '{}': {}", path.display(), e))?;
    let mut reader = BufReader::new(file);
    let mut lines = Vec::new();
    let mut buf = Vec::new();
    let mut line_no = 0usize;
    loop {
        buf.clear();
        let read = reader
            .read_until(b'\n', &mut buf)
            .map_err(|e| anyhow!("Failed to read file '{}': {}", path.display(), e))?;
        if read == 0 {
            break;
        }
        line_no += 1;
        let raw = buf.strip_suffix(b"\n").unwrap_or(&buf);
        let raw = raw.strip_suffix(b"\r").unwrap_or(raw);
        if raw.is_empty() {
            continue;
        }
        match std::str::from_utf8(raw) {
            Ok(line) => lines.push(line.to_string()),
            Err(e) => warn!("{}:{}: skipping line that is not valid UTF-8 ({})", path.display(), line_no, e),
        }
    }
    Ok(lines)
}
