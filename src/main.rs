use std::io::{IsTerminal, Write};

use msh::builtin::Builtins;
use msh::config::{self, Args, Config};
use msh::env::Environment;
use msh::{EditorSource, Interpreter, LineSource, PlainSource, SystemLauncher};
use tracing_subscriber::EnvFilter;

fn main() -> anyhow::Result<()> {
    let args: Args = argh::from_env();

    let filter = EnvFilter::try_from_env(config::LOG_ENV)
        .unwrap_or_else(|_| EnvFilter::new(config::DEFAULT_LOG_FILTER));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();

    if let Err(err) = msh::signal::install_interrupt_hint() {
        tracing::warn!(%err, "could not install the interrupt handler");
    }

    let env = Environment::new();
    let config = Config::from_args(args, &env);
    let history = config.open_history();

    let mut input: Box<dyn LineSource> = if std::io::stdin().is_terminal() {
        Box::new(EditorSource::new(history.entries())?)
    } else {
        Box::new(PlainSource::stdin())
    };

    let mut shell = Interpreter::new(Builtins::standard(), Box::new(SystemLauncher), history).with_env(env);
    let code = shell.repl(input.as_mut());

    std::io::stdout().flush()?;
    std::process::exit(code)
}
