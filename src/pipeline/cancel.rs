//! Cooperative cancellation.
//!
//! A [`CancelToken`] is a shared atomic flag. The run loop polls it once per
//! generation; nothing else ever waits on it.
//!
//! [`install_interrupt_handler`] wires SIGINT to a token. The handler only
//! stores `true` into the flag, which is async-signal-safe. Everything else
//! (logging, teardown) happens on the run loop's side after it observes the
//! flag.

use std::io;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, OnceLock};

/// Shared cancellation flag. Clones observe the same flag.
#[derive(Debug, Clone, Default)]
pub struct CancelToken {
    flag: Arc<AtomicBool>,
}

impl CancelToken {
    pub fn new() -> Self {
        Self::default()
    }

    /// Request cancellation.
    #[inline]
    pub fn cancel(&self) {
        self.flag.store(true, Ordering::SeqCst);
    }

    /// Whether cancellation was requested.
    #[inline]
    pub fn is_cancelled(&self) -> bool {
        self.flag.load(Ordering::SeqCst)
    }
}

// =============================================================================
// Interrupt signal
// =============================================================================

/// Token the signal handler flips. Set once, before the handler is installed.
static INTERRUPT_TOKEN: OnceLock<CancelToken> = OnceLock::new();

#[cfg(unix)]
extern "C" fn on_interrupt(_signal: libc::c_int) {
    if let Some(token) = INTERRUPT_TOKEN.get() {
        token.cancel();
    }
}

/// Route SIGINT (Ctrl+C) to `token`.
///
/// Can be called once per process; a second call fails with
/// [`io::ErrorKind::AlreadyExists`].
pub fn install_interrupt_handler(token: &CancelToken) -> io::Result<()> {
    INTERRUPT_TOKEN.set(token.clone()).map_err(|_| {
        io::Error::new(io::ErrorKind::AlreadyExists, "interrupt handler already installed")
    })?;

    #[cfg(unix)]
    {
        let handler = on_interrupt as extern "C" fn(libc::c_int) as libc::sighandler_t;
        // SAFETY: `on_interrupt` only performs an atomic load and an atomic store.
        let previous = unsafe { libc::signal(libc::SIGINT, handler) };
        if previous == libc::SIG_ERR {
            return Err(io::Error::last_os_error());
        }
    }

    #[cfg(not(unix))]
    tracing::warn!("interrupt handling not supported on this platform");

    Ok(())
}
