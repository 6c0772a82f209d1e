use anyhow::{Context, Result};
use std::fs::{File, OpenOptions};
use std::io::{BufRead, BufReader, Write};
use std::path::Path;

/// The command log.
///
/// Entries are kept in memory in insertion order and, when backed by a file,
/// appended to it one line each. The file is never truncated or rewritten.
/// The only de-duplication is of immediate repeats: a line equal to the last
/// entry is dropped, a line equal to an older one is kept.
#[derive(Debug, Default)]
pub struct History {
    entries: Vec<String>,
    log: Option<File>,
}

impl History {
    /// History that lives only as long as the process.
    pub fn in_memory() -> Self {
        Self::default()
    }

    /// Open (creating if needed) the log at `path` and load what is already
    /// there.
    pub fn open(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let mut options = OpenOptions::new();
        options.read(true).append(true).create(true);
        #[cfg(unix)]
        {
            use std::os::unix::fs::OpenOptionsExt;
            options.mode(0o600);
        }
        let file = options
            .open(path)
            .with_context(|| format!("history: can't open {}", path.display()))?;

        let mut entries = Vec::new();
        for line in BufReader::new(&file).lines() {
            let line = line.with_context(|| format!("history: can't read {}", path.display()))?;
            if !line.trim().is_empty() {
                entries.push(line);
            }
        }
        tracing::debug!(path = %path.display(), entries = entries.len(), "history loaded");

        Ok(Self {
            entries,
            log: Some(file),
        })
    }

    /// Record `line` unless it repeats the previous entry.
    pub fn append(&mut self, line: &str) {
        if self.entries.last().is_some_and(|last| last == line) {
            return;
        }
        self.entries.push(line.to_owned());
        if let Some(log) = &mut self.log {
            if let Err(err) = writeln!(log, "{}", line) {
                tracing::warn!(%err, "history: failed to persist entry");
            }
        }
    }

    pub fn entries(&self) -> &[String] {
        &self.entries
    }

    /// Print the log as `- <entry>` lines, leaving out `history` itself.
    pub fn replay(&self, out: &mut dyn Write) -> std::io::Result<()> {
        for entry in self.entries.iter().filter(|e| e.as_str() != "history") {
            writeln!(out, "- {}", entry)?;
        }
        Ok(())
    }
}
