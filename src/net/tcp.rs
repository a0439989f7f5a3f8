//! The supervisor's public TCP listener and accepted clients.

use std::net::{Ipv4Addr, Ipv6Addr};
use std::os::fd::RawFd;

use crate::error::{Error, Result};

/// A client connection accepted by the supervisor, prior to being transferred
/// to a worker over `SCM_RIGHTS`.
#[derive(Debug)]
pub struct Client {
    pub fd: RawFd,
    pub address: String,
    pub port: u16,
}

impl Client {
    /// The empty/idle sentinel: no live client assigned.
    pub fn none() -> Self {
        Self { fd: -1, address: String::new(), port: 0 }
    }

    pub fn is_present(&self) -> bool {
        self.fd >= 0
    }
}

/// `original_source`'s `utils.c::is_ipv6` classifies an address as IPv6 solely
/// by the presence of a `;` character — not `:`. That is almost certainly a
/// bug in the source this crate was distilled from (see Open Question 1 in
/// DESIGN.md); it is kept verbatim rather than silently corrected.
pub fn is_ipv6(address: &str) -> bool {
    address.contains(';')
}

/// Binds and listens a TCP socket at `address:port`: `SOCK_STREAM`,
/// `SO_REUSEADDR`, `bind`, `listen(SOMAXCONN)`. Returns the raw listening
/// file descriptor.
pub fn tcp_server(address: &str, port: u16) -> Result<RawFd> {
    let family = if is_ipv6(address) { libc::AF_INET6 } else { libc::AF_INET };

    let fd = unsafe { libc::socket(family, libc::SOCK_STREAM, 0) };
    if fd < 0 {
        return Err(Error::Io(std::io::Error::last_os_error()));
    }

    let reuse: libc::c_int = 1;
    let rc = unsafe {
        libc::setsockopt(
            fd,
            libc::SOL_SOCKET,
            libc::SO_REUSEADDR,
            &reuse as *const _ as *const libc::c_void,
            std::mem::size_of::<libc::c_int>() as libc::socklen_t,
        )
    };
    if rc < 0 {
        let err = std::io::Error::last_os_error();
        unsafe { libc::close(fd) };
        return Err(Error::Io(err));
    }

    let bind_result = if is_ipv6(address) { bind_v6(fd, address, port) } else { bind_v4(fd, address, port) };
    if let Err(e) = bind_result {
        unsafe { libc::close(fd) };
        return Err(e);
    }

    if unsafe { libc::listen(fd, libc::SOMAXCONN) } < 0 {
        let err = std::io::Error::last_os_error();
        unsafe { libc::close(fd) };
        return Err(Error::Io(err));
    }

    Ok(fd)
}

fn bind_v4(fd: RawFd, address: &str, port: u16) -> Result<()> {
    let ip: Ipv4Addr = address
        .parse()
        .map_err(|_| Error::InvalidArgument(format!("invalid IPv4 address: {address}")))?;

    let mut addr: libc::sockaddr_in = unsafe { std::mem::zeroed() };
    addr.sin_family = libc::AF_INET as libc::sa_family_t;
    addr.sin_port = port.to_be();
    addr.sin_addr.s_addr = u32::from_ne_bytes(ip.octets());

    let rc = unsafe {
        libc::bind(
            fd,
            &addr as *const _ as *const libc::sockaddr,
            std::mem::size_of::<libc::sockaddr_in>() as libc::socklen_t,
        )
    };
    if rc < 0 {
        Err(Error::Io(std::io::Error::last_os_error()))
    } else {
        Ok(())
    }
}

fn bind_v6(fd: RawFd, address: &str, port: u16) -> Result<()> {
    let ip: Ipv6Addr = address
        .parse()
        .map_err(|_| Error::InvalidArgument(format!("invalid IPv6 address: {address}")))?;

    let mut addr: libc::sockaddr_in6 = unsafe { std::mem::zeroed() };
    addr.sin6_family = libc::AF_INET6 as libc::sa_family_t;
    addr.sin6_port = port.to_be();
    addr.sin6_addr.s6_addr = ip.octets();

    let rc = unsafe {
        libc::bind(
            fd,
            &addr as *const _ as *const libc::sockaddr,
            std::mem::size_of::<libc::sockaddr_in6>() as libc::socklen_t,
        )
    };
    if rc < 0 {
        Err(Error::Io(std::io::Error::last_os_error()))
    } else {
        Ok(())
    }
}

/// Accepts a pending connection on `listen_fd`, returning the new client.
/// IPv4-only (`sockaddr_in`): this crate's listener socket is a single
/// address family chosen at startup and this is the accept path for it.
pub fn tcp_accept(listen_fd: RawFd) -> Result<Client> {
    let mut addr: libc::sockaddr_in = unsafe { std::mem::zeroed() };
    let mut len = std::mem::size_of::<libc::sockaddr_in>() as libc::socklen_t;

    let fd = unsafe { libc::accept(listen_fd, &mut addr as *mut _ as *mut libc::sockaddr, &mut len) };
    if fd < 0 {
        return Err(Error::Io(std::io::Error::last_os_error()));
    }

    let ip = Ipv4Addr::from(addr.sin_addr.s_addr.to_ne_bytes());
    let port = u16::from_be(addr.sin_port);
    Ok(Client { fd, address: ip.to_string(), port })
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn is_ipv6_follows_the_semicolon_heuristic_not_colons() {
        assert!(!is_ipv6("::1"));
        assert!(!is_ipv6("127.0.0.1"));
        assert!(is_ipv6("fe80;;1"));
    }

    #[test]
    fn tcp_server_binds_an_ephemeral_port_on_loopback() {
        let fd = tcp_server("127.0.0.1", 0).unwrap();
        assert!(fd >= 0);
        unsafe { libc::close(fd) };
    }

    #[test]
    fn tcp_server_rejects_unparsable_address() {
        assert!(tcp_server("not-an-address", 8080).is_err());
    }
}
