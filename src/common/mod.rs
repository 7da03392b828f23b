pub mod error;
pub mod io;

pub use self::error::{Error, ErrorKind, Result};

/// Reset SIGPIPE to default behavior (SIG_DFL).
/// Rust ignores SIGPIPE by default, which turns `sortbench ... | head` into a
/// panic on the next write. This must be called at the start of main().
#[inline]
pub fn reset_sigpipe() {
    #[cfg(unix)]
    unsafe {
        libc::signal(libc::SIGPIPE, libc::SIG_DFL);
    }
}

/// Format an IO error message without the "(os error N)" suffix.
pub fn io_error_msg(e: &std::io::Error) -> String {
    if let Some(raw) = e.raw_os_error() {
        let os_err = std::io::Error::from_raw_os_error(raw);
        let msg = format!("{}", os_err);
        msg.replace(&format!(" (os error {})", raw), "")
    } else {
        format!("{}", e)
    }
}
