//! Prefork HTTP origin server: a supervisor process accepts TCP connections
//! and hands each one to a pre-spawned worker over a UNIX domain control
//! socket using `SCM_RIGHTS` file-descriptor transfer. Workers parse and
//! serve exactly one request with a hand-rolled parser-combinator HTTP stack,
//! then exit. The supervisor additionally hot-reloads the HTTP processing
//! module whenever its backing shared object changes on disk.

pub mod config;
pub mod error;
pub mod http;
pub mod loader;
pub mod net;
pub mod parser;
pub mod signal;
pub mod store;
pub mod supervisor;
pub mod worker;
