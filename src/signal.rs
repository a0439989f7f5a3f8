//! `SIGINT` handling shared by the supervisor and each worker.
//!
//! The handler is installed once per process. After `fork`, each worker gets
//! its own copy of [`RUNNING`] (there is no shared memory between processes),
//! so the worker entrypoint re-installs it rather than relying on whatever
//! the supervisor observed before forking.

use std::sync::atomic::{AtomicBool, Ordering};

static RUNNING: AtomicBool = AtomicBool::new(true);

extern "C" fn handle_sigint(_signal: libc::c_int) {
    RUNNING.store(false, Ordering::SeqCst);
}

/// Installs the `SIGINT` handler for the current process.
pub fn install() {
    unsafe {
        let mut action: libc::sigaction = std::mem::zeroed();
        action.sa_sigaction = handle_sigint as usize;
        libc::sigemptyset(&mut action.sa_mask);
        action.sa_flags = 0;
        libc::sigaction(libc::SIGINT, &action, std::ptr::null_mut());
    }
}

/// `false` once this process has observed `SIGINT`.
pub fn is_running() -> bool {
    RUNNING.load(Ordering::SeqCst)
}

#[cfg(test)]
pub fn reset_for_test() {
    RUNNING.store(true, Ordering::SeqCst);
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn running_starts_true_and_install_does_not_immediately_flip_it() {
        reset_for_test();
        install();
        assert!(is_running());
    }
}
