//! Interrupt policy.
//!
//! Ctrl-C never terminates the shell. A `SIGINT` handler prints a hint and
//! does nothing else; blocked reads are restarted. Handlers do not survive
//! `exec`, so a running child still gets the default behaviour and dies.

use nix::sys::signal::{self, SaFlags, SigAction, SigHandler, SigSet, Signal};

pub const INTERRUPT_HINT: &str = "\nuse 'exit' to leave the shell\n";

extern "C" fn on_interrupt(_: libc::c_int) {
    // write(2) is async-signal-safe; nothing else may happen here.
    unsafe {
        libc::write(
            libc::STDOUT_FILENO,
            INTERRUPT_HINT.as_ptr().cast(),
            INTERRUPT_HINT.len(),
        );
    }
}

pub fn install_interrupt_hint() -> nix::Result<()> {
    let action = SigAction::new(
        SigHandler::Handler(on_interrupt),
        SaFlags::SA_RESTART,
        SigSet::empty(),
    );
    // SAFETY: the handler touches no shared state and only calls write(2).
    unsafe { signal::sigaction(Signal::SIGINT, &action) }?;
    Ok(())
}
