use crate::command::{ExitCode, Flow};
use crate::env::Environment;
use crate::error::ShellError;
use crate::resolve::find_in_path;
use anyhow::Result;
use std::collections::HashMap;
use std::ffi::OsStr;
use std::io::Write;
use std::path::{Component, Path, PathBuf};

/// What a builtin gets to work with.
///
/// Builtins never see standard input; `stdout` is the shell's own output.
pub struct Context<'a> {
    pub env: &'a Environment,
    pub builtins: &'a Builtins,
    pub stdout: &'a mut dyn Write,
}

/// Commands implemented inside the shell process.
///
/// A builtin runs synchronously on the caller's thread and never spawns a
/// process. Failures come back as errors and are printed by [`run_builtin`];
/// nothing structured reaches the read-eval loop.
pub trait BuiltinCommand {
    /// Canonical name of the command, e.g. "echo" or "cd".
    fn name(&self) -> &'static str;

    fn execute(&self, args: &[String], ctx: &mut Context<'_>) -> Result<Flow>;
}

/// Run `command`, turning a failure into a diagnostic line on `ctx.stdout`.
pub fn run_builtin(command: &dyn BuiltinCommand, args: &[String], ctx: &mut Context<'_>) -> std::io::Result<Flow> {
    match command.execute(args, ctx) {
        Ok(flow) => Ok(flow),
        Err(e) => {
            match e.downcast_ref::<ShellError>() {
                Some(ShellError::InvalidArguments { builtin }) => {
                    tracing::debug!(builtin = *builtin, "wrong number of arguments")
                }
                _ => tracing::debug!(builtin = command.name(), err = %e, "builtin failed"),
            }
            writeln!(ctx.stdout, "{}", e)?;
            Ok(Flow::Continue)
        }
    }
}

/// Name to handler mapping, fixed once the shell is constructed.
pub struct Builtins {
    commands: HashMap<&'static str, Box<dyn BuiltinCommand>>,
}

impl Builtins {
    pub fn new(commands: Vec<Box<dyn BuiltinCommand>>) -> Self {
        Self {
            commands: commands.into_iter().map(|c| (c.name(), c)).collect(),
        }
    }

    /// `echo`, `exit`, `type`, `pwd` and `cd`.
    pub fn standard() -> Self {
        Self::new(vec![
            Box::new(Echo),
            Box::new(Exit),
            Box::new(Type),
            Box::new(Pwd),
            Box::new(Cd),
        ])
    }

    pub fn lookup(&self, name: &str) -> Option<&dyn BuiltinCommand> {
        self.commands.get(name).map(|c| c.as_ref())
    }

    pub fn contains(&self, name: &str) -> bool {
        self.commands.contains_key(name)
    }
}

impl Default for Builtins {
    fn default() -> Self {
        Self::standard()
    }
}

/// Write the arguments separated by single spaces, then a newline.
pub struct Echo;

impl BuiltinCommand for Echo {
    fn name(&self) -> &'static str {
        "echo"
    }

    fn execute(&self, args: &[String], ctx: &mut Context<'_>) -> Result<Flow> {
        writeln!(ctx.stdout, "{}", args.join(" "))?;
        Ok(Flow::Continue)
    }
}

/// Leave the shell. No argument means status 1; an argument that isn't an
/// integer is ignored and the shell keeps running.
pub struct Exit;

impl BuiltinCommand for Exit {
    fn name(&self) -> &'static str {
        "exit"
    }

    fn execute(&self, args: &[String], _ctx: &mut Context<'_>) -> Result<Flow> {
        let Some(arg) = args.first() else {
            return Ok(Flow::Exit(1));
        };
        // Any 64-bit integer is accepted and truncated to the status width.
        match arg.parse::<i64>() {
            Ok(code) => Ok(Flow::Exit(code as ExitCode)),
            Err(_) => {
                tracing::debug!(arg = %arg, "exit: ignoring non-numeric status");
                Ok(Flow::Continue)
            }
        }
    }
}

/// Say whether a name is a builtin or where it lives on the search path.
pub struct Type;

impl BuiltinCommand for Type {
    fn name(&self) -> &'static str {
        "type"
    }

    fn execute(&self, args: &[String], ctx: &mut Context<'_>) -> Result<Flow> {
        let Some(name) = args.first() else {
            return Ok(Flow::Continue);
        };
        if ctx.builtins.contains(name) {
            writeln!(ctx.stdout, "{} is a shell builtin", name)?;
            return Ok(Flow::Continue);
        }
        let found = ctx
            .env
            .search_paths()
            .and_then(|paths| find_in_path(&paths, OsStr::new(name)));
        match found {
            Some(path) => writeln!(ctx.stdout, "{}", path.display())?,
            None => writeln!(ctx.stdout, "{}: not found", name)?,
        }
        Ok(Flow::Continue)
    }
}

/// Print the working directory. Prints nothing if it can't be determined.
pub struct Pwd;

impl BuiltinCommand for Pwd {
    fn name(&self) -> &'static str {
        "pwd"
    }

    fn execute(&self, _args: &[String], ctx: &mut Context<'_>) -> Result<Flow> {
        if let Ok(dir) = std::env::current_dir() {
            writeln!(ctx.stdout, "{}", dir.display())?;
        }
        Ok(Flow::Continue)
    }
}

/// Change the working directory of the shell process.
///
/// Takes exactly one argument. A bare `~` means `$HOME`; anything else that
/// isn't absolute is taken relative to the current directory. The path is
/// cleaned lexically, so the error message shows the absolute target.
pub struct Cd;

impl BuiltinCommand for Cd {
    fn name(&self) -> &'static str {
        "cd"
    }

    fn execute(&self, args: &[String], ctx: &mut Context<'_>) -> Result<Flow> {
        let [target] = args else {
            return Err(ShellError::InvalidArguments { builtin: "cd" }.into());
        };

        let mut path = clean(Path::new(target));
        if path == Path::new("~") {
            path = PathBuf::from(ctx.env.home().unwrap_or_default());
        }
        if !path.is_absolute() {
            let cwd = std::env::current_dir().unwrap_or_default();
            path = clean(&cwd.join(path));
        }

        std::env::set_current_dir(&path).map_err(|source| ShellError::Filesystem { path, source })?;
        Ok(Flow::Continue)
    }
}

/// Lexically resolve `.` and `..` components without touching the file system.
fn clean(path: &Path) -> PathBuf {
    let mut out = PathBuf::new();
    for component in path.components() {
        match component {
            Component::CurDir => {}
            Component::ParentDir => match out.components().next_back() {
                Some(Component::Normal(_)) => {
                    out.pop();
                }
                Some(Component::RootDir) | Some(Component::Prefix(_)) => {}
                _ => out.push(".."),
            },
            other => out.push(other),
        }
    }
    if out.as_os_str().is_empty() {
        out.push(".");
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::lock_current_dir;
    use std::fs;

    fn run(name: &str, args: &[&str], env: &Environment) -> (Flow, String) {
        let builtins = Builtins::standard();
        let mut out = Vec::new();
        let args: Vec<String> = args.iter().map(|s| s.to_string()).collect();
        let flow = {
            let mut ctx = Context {
                env,
                builtins: &builtins,
                stdout: &mut out,
            };
            let command = builtins.lookup(name).expect("builtin registered");
            run_builtin(command, &args, &mut ctx).unwrap()
        };
        (flow, String::from_utf8(out).unwrap())
    }

    #[test]
    fn standard_registry_has_five_entries() {
        let builtins = Builtins::standard();
        for name in ["echo", "exit", "type", "pwd", "cd"] {
            assert!(builtins.contains(name), "{} missing", name);
        }
        assert!(!builtins.contains("history"));
        assert!(builtins.lookup("ls").is_none());
    }

    #[test]
    fn test_echo_joins_with_single_spaces() {
        let (flow, out) = run("echo", &["hello", "world"], &Environment::default());
        assert_eq!(flow, Flow::Continue);
        assert_eq!(out, "hello world\n");
    }

    #[test]
    fn test_echo_has_no_options() {
        let (_, out) = run("echo", &["-n", "x"], &Environment::default());
        assert_eq!(out, "-n x\n");
    }

    #[test]
    fn test_echo_without_args_prints_newline() {
        let (_, out) = run("echo", &[], &Environment::default());
        assert_eq!(out, "\n");
    }

    #[test]
    fn test_exit_codes() {
        let env = Environment::default();
        assert_eq!(run("exit", &[], &env).0, Flow::Exit(1));
        assert_eq!(run("exit", &["7"], &env).0, Flow::Exit(7));
        assert_eq!(run("exit", &["0"], &env).0, Flow::Exit(0));
    }

    #[test]
    fn test_exit_accepts_wide_integers() {
        let env = Environment::default();
        assert_eq!(run("exit", &["4294967297"], &env).0, Flow::Exit(1));
        assert_eq!(run("exit", &["-1"], &env).0, Flow::Exit(-1));
        // Beyond 64 bits it is not an integer at all.
        assert_eq!(
            run("exit", &["99999999999999999999"], &env).0,
            Flow::Continue
        );
    }

    #[test]
    fn test_exit_ignores_non_numeric_argument() {
        let (flow, out) = run("exit", &["abc"], &Environment::default());
        assert_eq!(flow, Flow::Continue);
        assert_eq!(out, "");
    }

    #[test]
    fn test_type_reports_builtins() {
        let (_, out) = run("type", &["echo"], &Environment::default());
        assert_eq!(out, "echo is a shell builtin\n");
    }

    #[test]
    fn test_type_finds_program_on_path() {
        let dir = tempfile::tempdir().unwrap();
        fs::File::create(dir.path().join("frobnicate")).unwrap();
        let mut env = Environment::default();
        env.set_var("PATH", dir.path().to_string_lossy());

        let (_, out) = run("type", &["frobnicate"], &env);
        assert_eq!(out, format!("{}\n", dir.path().join("frobnicate").display()));
    }

    #[test]
    fn test_type_not_found() {
        let dir = tempfile::tempdir().unwrap();
        let mut env = Environment::default();
        env.set_var("PATH", dir.path().to_string_lossy());

        let (_, out) = run("type", &["doesnotexist123"], &env);
        assert_eq!(out, "doesnotexist123: not found\n");
    }

    #[test]
    fn test_type_absolute_name_is_searched_below_path_dirs() {
        let dir = tempfile::tempdir().unwrap();
        let mut env = Environment::default();
        env.set_var("PATH", dir.path().to_string_lossy());

        let (_, out) = run("type", &["/bin/sh"], &env);
        assert_eq!(out, "/bin/sh: not found\n");
    }

    #[test]
    fn test_type_without_args_prints_nothing() {
        let (flow, out) = run("type", &[], &Environment::default());
        assert_eq!(flow, Flow::Continue);
        assert_eq!(out, "");
    }

    #[test]
    fn test_pwd_prints_current_dir() {
        let _lock = lock_current_dir();
        let cur = std::env::current_dir().unwrap();
        let (_, out) = run("pwd", &[], &Environment::default());
        assert_eq!(out, format!("{}\n", cur.display()));
    }

    #[test]
    fn test_cd_tilde_goes_home() {
        let _lock = lock_current_dir();
        let orig = std::env::current_dir().unwrap();
        let home = tempfile::tempdir().unwrap();
        let home_path = fs::canonicalize(home.path()).unwrap();

        let mut env = Environment::default();
        env.set_var("HOME", home_path.to_string_lossy());
        let (flow, out) = run("cd", &["~"], &env);
        let now = std::env::current_dir().unwrap();
        std::env::set_current_dir(&orig).unwrap();

        assert_eq!(flow, Flow::Continue);
        assert_eq!(out, "");
        assert_eq!(now, home_path);
    }

    #[test]
    fn test_cd_relative_and_parent() {
        let _lock = lock_current_dir();
        let orig = std::env::current_dir().unwrap();
        let base = tempfile::tempdir().unwrap();
        let base_path = fs::canonicalize(base.path()).unwrap();
        fs::create_dir(base_path.join("sub")).unwrap();

        std::env::set_current_dir(&base_path).unwrap();
        let env = Environment::default();
        run("cd", &["sub"], &env);
        let in_sub = std::env::current_dir().unwrap();
        run("cd", &["./sub/.."], &env);
        let back = std::env::current_dir().unwrap();
        std::env::set_current_dir(&orig).unwrap();

        assert_eq!(in_sub, base_path.join("sub"));
        assert_eq!(back, base_path.join("sub"));
    }

    #[test]
    fn test_cd_missing_directory_reports_absolute_path() {
        let _lock = lock_current_dir();
        let orig = std::env::current_dir().unwrap();
        let base = tempfile::tempdir().unwrap();
        let base_path = fs::canonicalize(base.path()).unwrap();

        std::env::set_current_dir(&base_path).unwrap();
        let (flow, out) = run("cd", &["nope"], &Environment::default());
        let now = std::env::current_dir().unwrap();
        std::env::set_current_dir(&orig).unwrap();

        assert_eq!(flow, Flow::Continue);
        assert_eq!(now, base_path);
        assert_eq!(
            out,
            format!("{}: No such file or directory\n", base_path.join("nope").display())
        );
    }

    #[test]
    fn test_cd_requires_exactly_one_argument() {
        let _lock = lock_current_dir();
        let orig = std::env::current_dir().unwrap();

        let (_, none) = run("cd", &[], &Environment::default());
        let (_, two) = run("cd", &["/", "/tmp"], &Environment::default());

        assert_eq!(none, "Invalid number of Arguments.\n");
        assert_eq!(two, "Invalid number of Arguments.\n");
        assert_eq!(std::env::current_dir().unwrap(), orig);
    }

    #[test]
    fn test_cd_argument_error_names_the_builtin() {
        let builtins = Builtins::standard();
        let env = Environment::default();
        let mut out = Vec::new();
        let mut ctx = Context {
            env: &env,
            builtins: &builtins,
            stdout: &mut out,
        };
        let err = Cd.execute(&[], &mut ctx).unwrap_err();
        assert!(matches!(
            err.downcast_ref::<ShellError>(),
            Some(ShellError::InvalidArguments { builtin: "cd" })
        ));
    }

    #[test]
    fn clean_resolves_dots_lexically() {
        assert_eq!(clean(Path::new("/a/./b/../c/")), PathBuf::from("/a/c"));
        assert_eq!(clean(Path::new("/..")), PathBuf::from("/"));
        assert_eq!(clean(Path::new("../x")), PathBuf::from("../x"));
        assert_eq!(clean(Path::new("./")), PathBuf::from("."));
        assert_eq!(clean(Path::new("~")), PathBuf::from("~"));
    }
}
