//! Interrupt (SIGINT) disposition around each dispatched line.
//!
//! While idle at the prompt the interpreter is [`InterruptState::Guarded`]:
//! SIGINT is ignored, so an interrupt cannot kill it while it waits for input.
//! Right before a line runs it becomes [`InterruptState::Exposed`]: SIGINT is
//! caught by a handler that only records it. A caught disposition is reset to
//! the default in every program started by `exec`, so a foreground command
//! dies on an interrupt as usual, while the interpreter notices, reaps it and
//! carries on. After the line finishes the governor returns to Guarded.

use nix::sys::signal::{self, SaFlags, SigAction, SigHandler, SigSet, Signal};
use std::sync::atomic::{AtomicBool, Ordering};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InterruptState {
    Guarded,
    Exposed,
}

/// Applies an interrupt disposition to the running process.
///
/// The real implementation is [`SystemInterrupts`]; tests substitute one that
/// records the requested states.
pub trait InterruptControl {
    fn apply(&mut self, state: InterruptState) -> nix::Result<()>;

    /// Whether an interrupt arrived since the last call. Clears the flag.
    fn take_interrupted(&mut self) -> bool {
        false
    }
}

static INTERRUPTED: AtomicBool = AtomicBool::new(false);

extern "C" fn note_interrupt(_: nix::libc::c_int) {
    INTERRUPTED.store(true, Ordering::SeqCst);
}

/// Process-wide SIGINT disposition through `sigaction(2)`.
#[derive(Debug, Default)]
pub struct SystemInterrupts;

impl InterruptControl for SystemInterrupts {
    fn apply(&mut self, state: InterruptState) -> nix::Result<()> {
        let handler = match state {
            InterruptState::Guarded => SigHandler::SigIgn,
            InterruptState::Exposed => SigHandler::Handler(note_interrupt),
        };
        // SA_RESTART keeps the interpreter's blocking wait going after the handler runs.
        let action = SigAction::new(handler, SaFlags::SA_RESTART, SigSet::empty());
        // SAFETY: the handler only stores to an atomic, which is async-signal-safe.
        unsafe { signal::sigaction(Signal::SIGINT, &action) }.map(|_| ())
    }

    fn take_interrupted(&mut self) -> bool {
        INTERRUPTED.swap(false, Ordering::SeqCst)
    }
}

/// Two-state machine owning the interrupt disposition.
///
/// Construction enters Guarded. [`SignalGovernor::expose`] enters Exposed
/// and returns a scope that re-enters Guarded when dropped, whatever the
/// dispatched line did.
pub struct SignalGovernor<C: InterruptControl> {
    control: C,
    state: InterruptState,
}

impl<C: InterruptControl> SignalGovernor<C> {
    pub fn new(control: C) -> Self {
        let mut governor = Self {
            control,
            state: InterruptState::Guarded,
        };
        governor.transition(InterruptState::Guarded);
        governor
    }

    pub fn state(&self) -> InterruptState {
        self.state
    }

    /// Enter Exposed for the lifetime of the returned scope.
    pub fn expose(&mut self) -> ExposedScope<'_, C> {
        self.transition(InterruptState::Exposed);
        ExposedScope { governor: self }
    }

    fn transition(&mut self, to: InterruptState) {
        if let Err(err) = self.control.apply(to) {
            tracing::warn!(state = ?to, error = %err, "cannot set SIGINT disposition");
        }
        tracing::trace!(from = ?self.state, to = ?to, "interrupt disposition");
        self.state = to;
    }
}

/// Guard returned by [`SignalGovernor::expose`].
pub struct ExposedScope<'a, C: InterruptControl> {
    governor: &'a mut SignalGovernor<C>,
}

impl<C: InterruptControl> Drop for ExposedScope<'_, C> {
    fn drop(&mut self) {
        self.governor.transition(InterruptState::Guarded);
        if self.governor.control.take_interrupted() {
            tracing::debug!("interrupt received during dispatch");
        }
    }
}
