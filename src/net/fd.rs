//! `SCM_RIGHTS` file-descriptor transfer over a connected UNIX socket.

use std::os::fd::RawFd;

use crate::error::{Error, Result};

/// Sends `fd` as ancillary data over `sock`, with the one-byte payload the
/// receiving end's `recvmsg` expects to see data to read.
pub fn send_fd(sock: RawFd, fd: RawFd) -> Result<()> {
    let payload: [u8; 1] = [0];
    let mut iov = libc::iovec {
        iov_base: payload.as_ptr() as *mut libc::c_void,
        iov_len: payload.len(),
    };

    let space = unsafe { libc::CMSG_SPACE(std::mem::size_of::<RawFd>() as u32) } as usize;
    let mut cmsg_buf = vec![0u8; space];

    let mut msg: libc::msghdr = unsafe { std::mem::zeroed() };
    msg.msg_iov = &mut iov;
    msg.msg_iovlen = 1;
    msg.msg_control = cmsg_buf.as_mut_ptr() as *mut libc::c_void;
    msg.msg_controllen = space as _;

    unsafe {
        let cmsg = libc::CMSG_FIRSTHDR(&msg);
        (*cmsg).cmsg_level = libc::SOL_SOCKET;
        (*cmsg).cmsg_type = libc::SCM_RIGHTS;
        (*cmsg).cmsg_len = libc::CMSG_LEN(std::mem::size_of::<RawFd>() as u32) as _;
        std::ptr::write(libc::CMSG_DATA(cmsg) as *mut RawFd, fd);
    }

    let sent = unsafe { libc::sendmsg(sock, &msg, 0) };
    if sent < 0 {
        Err(Error::Io(std::io::Error::last_os_error()))
    } else {
        Ok(())
    }
}

/// Receives a single fd sent via [`send_fd`] on `sock`. Validates that the
/// first (and only expected) control header is `SOL_SOCKET`/`SCM_RIGHTS`
/// before trusting its payload as a file descriptor.
pub fn recv_fd(sock: RawFd) -> Result<RawFd> {
    let mut payload = [0u8; 1];
    let mut iov = libc::iovec {
        iov_base: payload.as_mut_ptr() as *mut libc::c_void,
        iov_len: payload.len(),
    };

    let space = unsafe { libc::CMSG_SPACE(std::mem::size_of::<RawFd>() as u32) } as usize;
    let mut cmsg_buf = vec![0u8; space];

    let mut msg: libc::msghdr = unsafe { std::mem::zeroed() };
    msg.msg_iov = &mut iov;
    msg.msg_iovlen = 1;
    msg.msg_control = cmsg_buf.as_mut_ptr() as *mut libc::c_void;
    msg.msg_controllen = space as _;

    let received = unsafe { libc::recvmsg(sock, &mut msg, 0) };
    if received < 0 {
        return Err(Error::Io(std::io::Error::last_os_error()));
    }
    if received == 0 {
        return Err(Error::Interrupted);
    }

    let cmsg = unsafe { libc::CMSG_FIRSTHDR(&msg) };
    if cmsg.is_null() {
        return Err(Error::InvalidArgument("recv_fd: no ancillary data received".into()));
    }

    let (level, kind) = unsafe { ((*cmsg).cmsg_level, (*cmsg).cmsg_type) };
    if level != libc::SOL_SOCKET || kind != libc::SCM_RIGHTS {
        return Err(Error::InvalidArgument("recv_fd: ancillary data was not SCM_RIGHTS".into()));
    }

    let fd = unsafe { std::ptr::read(libc::CMSG_DATA(cmsg) as *const RawFd) };
    Ok(fd)
}
