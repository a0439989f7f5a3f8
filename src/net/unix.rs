//! Per-worker UNIX domain control sockets.

use std::os::fd::RawFd;

use crate::error::{Error, Result};

/// The control-socket path for a worker with pid `pid`.
pub fn socket_path(pid: libc::pid_t) -> String {
    format!("./{pid}.sock")
}

/// Creates an `AF_UNIX`/`SOCK_STREAM` listening socket bound at `path` with a
/// backlog of 1 — each worker's control socket ever carries exactly one
/// incoming connection and one fd transfer.
pub fn dmn_server(path: &str) -> Result<RawFd> {
    let fd = unsafe { libc::socket(libc::AF_UNIX, libc::SOCK_STREAM, 0) };
    if fd < 0 {
        return Err(Error::Io(std::io::Error::last_os_error()));
    }

    let addr = unix_sockaddr(path)?;
    let rc = unsafe {
        libc::bind(
            fd,
            &addr as *const _ as *const libc::sockaddr,
            std::mem::size_of::<libc::sockaddr_un>() as libc::socklen_t,
        )
    };
    if rc < 0 {
        let err = std::io::Error::last_os_error();
        unsafe { libc::close(fd) };
        return Err(Error::Io(err));
    }

    if unsafe { libc::listen(fd, 1) } < 0 {
        let err = std::io::Error::last_os_error();
        unsafe { libc::close(fd) };
        return Err(Error::Io(err));
    }

    Ok(fd)
}

/// Connects to the control socket at `path`. Retrying is unnecessary: the
/// supervisor only writes the ready byte that unblocks a worker after the
/// listener already exists.
pub fn dmn_client(path: &str) -> Result<RawFd> {
    let fd = unsafe { libc::socket(libc::AF_UNIX, libc::SOCK_STREAM, 0) };
    if fd < 0 {
        return Err(Error::Io(std::io::Error::last_os_error()));
    }

    let addr = unix_sockaddr(path)?;
    let rc = unsafe {
        libc::connect(
            fd,
            &addr as *const _ as *const libc::sockaddr,
            std::mem::size_of::<libc::sockaddr_un>() as libc::socklen_t,
        )
    };
    if rc < 0 {
        let err = std::io::Error::last_os_error();
        unsafe { libc::close(fd) };
        return Err(Error::Io(err));
    }

    Ok(fd)
}

fn unix_sockaddr(path: &str) -> Result<libc::sockaddr_un> {
    let mut addr: libc::sockaddr_un = unsafe { std::mem::zeroed() };
    if path.len() >= addr.sun_path.len() {
        return Err(Error::InvalidArgument(format!("socket path too long: {path}")));
    }

    addr.sun_family = libc::AF_UNIX as libc::sa_family_t;
    for (slot, byte) in addr.sun_path.iter_mut().zip(path.bytes()) {
        *slot = byte as libc::c_char;
    }

    Ok(addr)
}

/// Removes the control socket's backing file. Best-effort: already-missing is
/// not an error, since worker teardown may race a manual cleanup.
pub fn unlink_socket(path: &str) {
    let _ = std::fs::remove_file(path);
}

/// Accepts a pending connection on a control socket, discarding the peer
/// address — a control socket's one-shot connection never carries one worth
/// recording, unlike [`super::tcp::tcp_accept`].
pub fn accept(listen_fd: RawFd) -> Result<RawFd> {
    let fd = unsafe { libc::accept(listen_fd, std::ptr::null_mut(), std::ptr::null_mut()) };
    if fd < 0 {
        Err(Error::Io(std::io::Error::last_os_error()))
    } else {
        Ok(fd)
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn dmn_server_then_dmn_client_connects() {
        let path = format!("./foreman-test-{}.sock", std::process::id());
        unlink_socket(&path);

        let server_fd = dmn_server(&path).unwrap();
        let client_fd = dmn_client(&path).unwrap();

        unsafe {
            libc::close(server_fd);
            libc::close(client_fd);
        }
        unlink_socket(&path);
    }

    #[test]
    fn unix_sockaddr_rejects_an_overlong_path() {
        let path = "x".repeat(200);
        assert!(dmn_server(&path).is_err());
    }
}
