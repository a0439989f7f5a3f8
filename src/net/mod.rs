//! Raw POSIX networking primitives: TCP listener setup, UNIX domain sockets
//! used as per-worker control channels, and `SCM_RIGHTS` file-descriptor
//! transfer. Everything here is a thin, safe-Rust wrapper over `libc` —
//! there is no higher-level sockets crate in this workspace's dependency
//! stack, the same reasoning `loader.rs` follows for `inotify`.

pub mod fd;
pub mod tcp;
pub mod unix;

pub use fd::{recv_fd, send_fd};
pub use tcp::{is_ipv6, tcp_accept, tcp_server, Client};
pub use unix::{accept, dmn_client, dmn_server, socket_path, unlink_socket};
