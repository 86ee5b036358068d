//! Graceful shutdown on SIGINT/SIGTERM.
//!
//! The first signal sets a flag; the pipeline finishes the unit in flight and
//! stops between units. A second signal exits immediately.

use std::sync::atomic::{AtomicBool, Ordering};

static SHUTDOWN_REQUESTED: AtomicBool = AtomicBool::new(false);

/// Check whether a shutdown was requested
pub fn requested() -> bool {
    SHUTDOWN_REQUESTED.load(Ordering::SeqCst)
}

/// Install the signal handlers
#[cfg(unix)]
pub fn install() {
    unsafe {
        libc::signal(libc::SIGINT, handle_signal as libc::sighandler_t);
        libc::signal(libc::SIGTERM, handle_signal as libc::sighandler_t);
    }
}

#[cfg(not(unix))]
pub fn install() {}

#[cfg(unix)]
extern "C" fn handle_signal(_: libc::c_int) {
    if SHUTDOWN_REQUESTED.swap(true, Ordering::SeqCst) {
        // Second signal: the user means it
        std::process::exit(1);
    }
}
