//! The worker process: connects to its control socket, receives exactly one
//! client fd, serves exactly one request, exits.
//!
//! This runs post-`fork`, in the child branch the supervisor's event loop
//! never returns from. Everything here is single-threaded and talks to the
//! rest of the system only through file descriptors — there is no shared
//! memory with the supervisor once `fork` has returned.

use std::os::fd::RawFd;

use log::{debug, error, info};

use crate::error::Result;
use crate::http::HttpProcessor;
use crate::net;
use crate::signal;
use crate::store::KeyValueStore;

const READ_CHUNK: usize = 4096;

/// Runs the worker side of `spawn_worker`'s pipe handshake: block until the
/// parent has created the control-socket listener, then return. Call this in
/// the forked child immediately after `fork` returns `0`.
pub fn wait_for_ready_signal(pipe_read_fd: RawFd) {
    let mut buf = [0u8; 1];
    unsafe {
        libc::read(pipe_read_fd, buf.as_mut_ptr() as *mut libc::c_void, 1);
        libc::close(pipe_read_fd);
    }
}

/// Never returns: connects to this process's own control socket, receives the
/// transferred client fd, serves it, and calls `std::process::exit`.
///
/// Installs its own `SIGINT` handler: a worker that observes shutdown
/// requested mid-poll exits cleanly rather than serving a request after the
/// supervisor has asked everyone to stop.
pub fn entrypoint(processor: &dyn HttpProcessor, public_dir: &str, store: Option<&KeyValueStore>) -> ! {
    signal::install();

    let pid = std::process::id() as libc::pid_t;
    let path = net::socket_path(pid);

    let sockfd = match net::dmn_client(&path) {
        Ok(fd) => fd,
        Err(e) => {
            error!("worker::dmn_client {path}: {e}");
            std::process::exit(1);
        }
    };

    let connfd = match net::recv_fd(sockfd) {
        Ok(fd) => fd,
        Err(e) if e.is_interrupted() => {
            unsafe { libc::close(sockfd) };
            std::process::exit(0);
        }
        Err(e) => {
            error!("worker::recv_fd: {e}");
            unsafe { libc::close(sockfd) };
            std::process::exit(1);
        }
    };
    unsafe { libc::close(sockfd) };

    let retval = serve(connfd, processor, public_dir, store);
    unsafe { libc::close(connfd) };
    std::process::exit(retval);
}

/// Polls the single client fd until it becomes readable, hangs up, or errors;
/// returns the process exit code to use. Serves at most one request: once a
/// response has been written, the worker's job is done (no keep-alive).
fn serve(connfd: RawFd, processor: &dyn HttpProcessor, public_dir: &str, store: Option<&KeyValueStore>) -> i32 {
    let mut pollfd = libc::pollfd {
        fd: connfd,
        events: libc::POLLIN | libc::POLLHUP | libc::POLLERR,
        revents: 0,
    };

    while signal::is_running() {
        let poll_result = unsafe { libc::poll(&mut pollfd, 1, -1) };
        if poll_result < 0 {
            let err = std::io::Error::last_os_error();
            if err.kind() == std::io::ErrorKind::Interrupted {
                continue;
            }
            error!("worker::poll: {err}");
            continue;
        }

        let mut revents = pollfd.revents;

        if revents & libc::POLLIN != 0 {
            match read_request(connfd) {
                Ok(bytes) if bytes.is_empty() => {
                    revents |= libc::POLLHUP;
                }
                Ok(bytes) => {
                    debug!("[fd:{connfd}] request ({} bytes)", bytes.len());
                    let response = processor.handle(public_dir, &bytes, store);
                    write_response(connfd, &response);
                    return 0;
                }
                Err(e) => {
                    error!("worker::read: {e}");
                    return 1;
                }
            }
        }

        if revents & libc::POLLERR != 0 {
            return 1;
        }

        if revents & libc::POLLHUP != 0 {
            return 0;
        }
    }

    1
}

/// Reads non-blocking until `EAGAIN`, on the assumption that a client writes
/// its whole request in one burst. Returns an empty `Vec` if the peer closed
/// before sending anything (treated by the caller as `POLLHUP`).
fn read_request(fd: RawFd) -> Result<Vec<u8>> {
    let flags = unsafe { libc::fcntl(fd, libc::F_GETFL) };
    if flags >= 0 {
        unsafe { libc::fcntl(fd, libc::F_SETFL, flags | libc::O_NONBLOCK) };
    }

    let mut buf = Vec::new();
    let mut chunk = [0u8; READ_CHUNK];
    loop {
        let n = unsafe { libc::read(fd, chunk.as_mut_ptr() as *mut libc::c_void, chunk.len()) };
        if n > 0 {
            buf.extend_from_slice(&chunk[..n as usize]);
            if (n as usize) < chunk.len() {
                break;
            }
            continue;
        }
        if n == 0 {
            break; // peer closed
        }

        let err = std::io::Error::last_os_error();
        if err.kind() == std::io::ErrorKind::WouldBlock {
            break; // caught up to EAGAIN: the client is done sending for now
        }
        if err.kind() == std::io::ErrorKind::Interrupted {
            continue;
        }
        return Err(err.into());
    }

    Ok(buf)
}

fn write_response(fd: RawFd, response: &[u8]) {
    let mut written = 0usize;
    while written < response.len() {
        let n = unsafe {
            libc::write(
                fd,
                response[written..].as_ptr() as *const libc::c_void,
                response.len() - written,
            )
        };
        if n < 0 {
            let err = std::io::Error::last_os_error();
            if err.kind() == std::io::ErrorKind::Interrupted {
                continue;
            }
            error!("worker::write: {err}");
            return;
        }
        written += n as usize;
    }
    info!("[fd:{fd}] response ({written} bytes)");
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn read_request_returns_everything_available_before_eagain() {
        let mut pair = [0 as RawFd; 2];
        let rc = unsafe { libc::socketpair(libc::AF_UNIX, libc::SOCK_STREAM, 0, pair.as_mut_ptr()) };
        assert_eq!(0, rc);
        let (a, b) = (pair[0], pair[1]);

        let payload = b"GET / HTTP/1.1\r\n\r\n";
        unsafe {
            libc::write(a, payload.as_ptr() as *const libc::c_void, payload.len());
        }

        let bytes = read_request(b).unwrap();
        assert_eq!(payload.as_slice(), bytes.as_slice());

        unsafe {
            libc::close(a);
            libc::close(b);
        }
    }

    #[test]
    fn read_request_returns_empty_after_peer_closes_with_nothing_sent() {
        let mut pair = [0 as RawFd; 2];
        let rc = unsafe { libc::socketpair(libc::AF_UNIX, libc::SOCK_STREAM, 0, pair.as_mut_ptr()) };
        assert_eq!(0, rc);
        let (a, b) = (pair[0], pair[1]);
        unsafe { libc::close(a) };

        let bytes = read_request(b).unwrap();
        assert!(bytes.is_empty());
        unsafe { libc::close(b) };
    }

    #[test]
    fn serve_writes_a_response_and_returns_success_for_one_request() {
        use crate::http::BuiltinProcessor;

        let mut pair = [0 as RawFd; 2];
        let rc = unsafe { libc::socketpair(libc::AF_UNIX, libc::SOCK_STREAM, 0, pair.as_mut_ptr()) };
        assert_eq!(0, rc);
        let (a, b) = (pair[0], pair[1]);

        let payload = b"GET /missing.html HTTP/1.1\r\n\r\n";
        unsafe {
            libc::write(a, payload.as_ptr() as *const libc::c_void, payload.len());
        }

        signal::reset_for_test();
        let processor = BuiltinProcessor;
        let retval = serve(b, &processor, "./nonexistent-public-dir", None);
        assert_eq!(0, retval);

        let mut buf = [0u8; 256];
        let n = unsafe { libc::read(a, buf.as_mut_ptr() as *mut libc::c_void, buf.len()) };
        assert!(n > 0);
        assert!(buf[..n as usize].starts_with(b"HTTP/1.1 404"));

        unsafe {
            libc::close(a);
            libc::close(b);
        }
    }
}
