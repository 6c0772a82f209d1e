use crate::error::ShellError;
use crate::signal::INTERRUPT_HINT;
use rustyline::DefaultEditor;
use rustyline::error::ReadlineError;
use std::io::{self, BufRead, StdinLock, Stdout, Write};

/// The prompt shown before every line.
pub const PROMPT: &str = "$ ";

/// Where the read-eval loop gets its lines from.
pub trait LineSource {
    /// Show `prompt`, then block until one full line is available.
    ///
    /// The returned line has its trailing newline removed. End of input is
    /// reported as [`ShellError::InputTerminated`].
    fn read_line(&mut self, prompt: &str) -> Result<String, ShellError>;
}

/// Plain line reader for pipes, files and tests.
///
/// The prompt goes to `out` and is flushed before reading, so it appears even
/// though it has no trailing newline. Invalid UTF-8 is decoded lossily rather
/// than treated as a read failure.
pub struct PlainSource<R, W> {
    reader: R,
    out: W,
}

impl<R: BufRead, W: Write> PlainSource<R, W> {
    pub fn new(reader: R, out: W) -> Self {
        Self { reader, out }
    }
}

impl PlainSource<StdinLock<'static>, Stdout> {
    pub fn stdin() -> Self {
        Self::new(io::stdin().lock(), io::stdout())
    }
}

impl<R: BufRead, W: Write> LineSource for PlainSource<R, W> {
    fn read_line(&mut self, prompt: &str) -> Result<String, ShellError> {
        self.out.write_all(prompt.as_bytes())?;
        self.out.flush()?;

        let mut buf = Vec::new();
        if self.reader.read_until(b'\n', &mut buf)? == 0 {
            return Err(ShellError::InputTerminated);
        }
        if buf.last() == Some(&b'\n') {
            buf.pop();
            if buf.last() == Some(&b'\r') {
                buf.pop();
            }
        }
        Ok(String::from_utf8_lossy(&buf).into_owned())
    }
}

/// Interactive reader with line editing, used when stdin is a terminal.
///
/// In-session recall is seeded from the persisted history. Ctrl-C at the
/// prompt prints the interrupt hint and prompts again; Ctrl-D ends input.
pub struct EditorSource {
    editor: DefaultEditor,
}

impl EditorSource {
    pub fn new(seed: &[String]) -> Result<Self, ShellError> {
        let mut editor = DefaultEditor::new()?;
        for entry in seed {
            editor.add_history_entry(entry.as_str())?;
        }
        Ok(Self { editor })
    }
}

impl LineSource for EditorSource {
    fn read_line(&mut self, prompt: &str) -> Result<String, ShellError> {
        loop {
            match self.editor.readline(prompt) {
                Ok(line) => {
                    self.editor.add_history_entry(line.as_str())?;
                    return Ok(line);
                }
                Err(ReadlineError::Interrupted) => {
                    let mut stdout = io::stdout();
                    stdout.write_all(INTERRUPT_HINT.as_bytes())?;
                    stdout.flush()?;
                }
                Err(ReadlineError::Eof) => return Err(ShellError::InputTerminated),
                Err(err) => return Err(err.into()),
            }
        }
    }
}
