/// Conventional process exit code type used by this crate.
///
/// A value of 0 indicates success; any non-zero value indicates failure.
/// This mirrors the convention used by POSIX shells and many command-line tools.
pub type ExitCode = i32;

/// What the read-eval loop should do after a line has been evaluated.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Flow {
    /// Show the prompt again.
    Continue,
    /// Terminate the shell with the given status.
    Exit(ExitCode),
}

/// One program invocation: a name followed by its arguments.
///
/// The tokenizer is deliberately naive. The text is trimmed and then split on
/// every single space, so runs of spaces produce empty arguments and there is
/// no way to express an argument that itself contains a space.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Stage {
    pub program: String,
    pub args: Vec<String>,
}

impl Stage {
    pub fn parse(text: &str) -> Self {
        let mut words = text.trim().split(' ').map(str::to_owned);
        // `split` always yields at least one item, possibly empty.
        let program = words.next().unwrap_or_default();
        Self {
            program,
            args: words.collect(),
        }
    }
}
