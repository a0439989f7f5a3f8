//! The supervisor: owns the TCP listener and the worker pool, and runs the
//! single-threaded event loop that ties hot-reload, health-checking, elastic
//! scaling, and client hand-off together.

use std::os::fd::RawFd;

use log::{debug, error, info, warn};

use crate::error::Result;
use crate::loader::Loader;
use crate::net::{self, Client};
use crate::signal;
use crate::store::KeyValueStore;
use crate::worker;

/// One live worker process: `pid=0` would mean an empty slot, but slots are
/// never left empty here — a worker is removed from the table outright
/// rather than zeroed in place (see [`WorkerTable::remove`]).
#[derive(Debug)]
struct Worker {
    pid: libc::pid_t,
    control_fd: RawFd,
    client: Client,
}

impl Worker {
    fn is_idle(&self) -> bool {
        !self.client.is_present()
    }
}

/// The worker table and its index-parallel poll set. `pollfds[0]` is always
/// the TCP listener; `pollfds[1 + i]` is `workers[i].control_fd`.
struct WorkerTable {
    workers: Vec<Worker>,
    pollfds: Vec<libc::pollfd>,
}

impl WorkerTable {
    fn new(listener_fd: RawFd) -> Self {
        Self {
            workers: Vec::new(),
            pollfds: vec![libc::pollfd { fd: listener_fd, events: libc::POLLIN, revents: 0 }],
        }
    }

    fn len(&self) -> usize {
        self.workers.len()
    }

    fn push(&mut self, worker: Worker) {
        self.pollfds.push(libc::pollfd {
            fd: worker.control_fd,
            events: libc::POLLIN | libc::POLLHUP | libc::POLLERR,
            revents: 0,
        });
        self.workers.push(worker);
    }

    /// Removes worker slot `i`, shifting `i+1..` down by one in both
    /// `workers` and `pollfds` so `pollfds[1+i] <-> workers[i]` keeps holding.
    fn remove(&mut self, i: usize) -> Worker {
        self.pollfds.remove(1 + i);
        self.workers.remove(i)
    }

    fn find_idle(&self) -> Option<usize> {
        self.workers.iter().position(Worker::is_idle)
    }
}

/// The single long-lived process owning the TCP listener and the worker pool.
pub struct Supervisor {
    listener_fd: RawFd,
    table: WorkerTable,
    desired_workers: usize,
    loader: Loader,
    store: Option<KeyValueStore>,
    public_dir: String,
}

impl Supervisor {
    /// Binds the listener, installs the `SIGINT` handler, and spawns the
    /// initial `desired_workers` children.
    pub fn new(
        address: &str,
        port: u16,
        desired_workers: usize,
        loader: Loader,
        store: Option<KeyValueStore>,
        public_dir: String,
    ) -> Result<Self> {
        signal::install();

        let listener_fd = net::tcp_server(address, port)?;
        info!("listening on {address}:{port}");

        let mut supervisor = Self {
            listener_fd,
            table: WorkerTable::new(listener_fd),
            desired_workers,
            loader,
            store,
            public_dir,
        };

        supervisor.scale_up();
        Ok(supervisor)
    }

    /// Runs the event loop until `SIGINT` is observed, then tears every
    /// worker down before returning.
    pub fn run(&mut self) {
        while signal::is_running() {
            self.loader.check_for_update();
            self.health_check();
            self.scale_up();
            self.scale_down();
            self.poll_once();
        }

        self.shutdown();
    }

    fn poll_once(&mut self) {
        let poll_result = unsafe {
            libc::poll(
                self.table.pollfds.as_mut_ptr(),
                self.table.pollfds.len() as libc::nfds_t,
                -1,
            )
        };

        if poll_result < 0 {
            let err = std::io::Error::last_os_error();
            if err.kind() != std::io::ErrorKind::Interrupted {
                error!("supervisor::poll: {err}");
            }
            return;
        }

        if self.table.pollfds[0].revents & libc::POLLIN != 0 {
            self.handle_client_connect();
        }

        let mut i = 0;
        while i < self.table.len() {
            let revents = self.table.pollfds[1 + i].revents;
            if revents & libc::POLLIN != 0 {
                self.handle_worker_connect(i);
                i += 1;
            } else if revents & (libc::POLLHUP | libc::POLLERR) != 0 {
                self.disconnect_worker(i);
                // The slot that used to hold worker i+1 has shifted into i.
            } else {
                i += 1;
            }
        }
    }

    /// Accepts the pending TCP connection and hands it to an idle worker, if
    /// one exists. Mirrors the `Busy` policy for "no worker available at
    /// all": the accepted fd is closed and the event logged, with no table
    /// mutation.
    fn handle_client_connect(&mut self) {
        let client = match net::tcp_accept(self.listener_fd) {
            Ok(client) => client,
            Err(e) => {
                if !e.is_interrupted() {
                    error!("supervisor::accept: {e}");
                }
                return;
            }
        };

        info!("[fd:{}] \"{}:{}\" connect", client.fd, client.address, client.port);

        let Some(idx) = self.table.find_idle() else {
            warn!("no idle worker available, dropping [fd:{}]", client.fd);
            unsafe { libc::close(client.fd) };
            return;
        };

        self.table.workers[idx].client = client;
        self.desired_workers += 1;
    }

    /// The worker's control_fd became readable: it has connected to its
    /// domain socket to receive its assigned client. Accept that connection
    /// and transfer the client fd over `SCM_RIGHTS`.
    fn handle_worker_connect(&mut self, idx: usize) {
        let worker = &mut self.table.workers[idx];

        let domain_conn = match net::accept(worker.control_fd) {
            Ok(fd) => fd,
            Err(e) => {
                error!("supervisor::accept(control): {e}");
                return;
            }
        };

        if worker.client.is_present() {
            if let Err(e) = net::send_fd(domain_conn, worker.client.fd) {
                error!("supervisor::send_fd: {e}");
            }
            unsafe { libc::close(worker.client.fd) };
            worker.client = Client::none();
        } else {
            warn!("worker [pid:{}] connected with no assigned client", worker.pid);
        }

        unsafe { libc::close(domain_conn) };
    }

    /// Reaps a worker whose control_fd hung up or errored: removes it from
    /// the table, unlinks its socket file, and ensures the process is gone —
    /// `SIGINT`, then `SIGKILL` if it's still alive, since a dropped control
    /// connection doesn't by itself mean the worker process has exited.
    fn disconnect_worker(&mut self, idx: usize) {
        let worker = self.table.remove(idx);
        info!("[pid:{}] disconnect", worker.pid);

        net::unlink_socket(&net::socket_path(worker.pid));
        unsafe { libc::close(worker.control_fd) };
        if worker.client.is_present() {
            unsafe { libc::close(worker.client.fd) };
        }

        signal_worker(worker.pid);
        self.desired_workers = self.desired_workers.saturating_sub(1);
    }

    /// For every worker, `waitpid(pid, WNOHANG|WUNTRACED)`; an exited/
    /// signaled/stopped child is removed from the table.
    fn health_check(&mut self) {
        let mut i = 0;
        while i < self.table.len() {
            let pid = self.table.workers[i].pid;
            let mut status: libc::c_int = 0;
            let rc = unsafe { libc::waitpid(pid, &mut status, libc::WNOHANG | libc::WUNTRACED) };
            if rc == pid {
                debug!("[pid:{pid}] reaped by health check");
                self.table.remove(i);
                self.desired_workers = self.desired_workers.saturating_sub(1);
            } else {
                i += 1;
            }
        }
    }

    fn scale_up(&mut self) {
        while self.table.len() < self.desired_workers {
            match self.spawn_worker() {
                Ok(worker) => self.table.push(worker),
                Err(e) => {
                    error!("supervisor::spawn_worker: {e}");
                    break;
                }
            }
        }
    }

    /// Removes one idle worker at a time until `nworkers <= desired`. Never
    /// touches a worker with an assigned client.
    fn scale_down(&mut self) {
        while self.table.len() > self.desired_workers {
            let Some(idx) = self.table.find_idle() else {
                break;
            };
            let worker = self.table.remove(idx);
            info!("[pid:{}] scaling down idle worker", worker.pid);
            net::unlink_socket(&net::socket_path(worker.pid));
            unsafe { libc::close(worker.control_fd) };
            signal_worker(worker.pid);
        }
    }

    /// `fork`s a new worker: the parent creates the control socket and
    /// releases the child via the readiness pipe; the child blocks on the
    /// pipe, then branches permanently into [`worker::entrypoint`].
    fn spawn_worker(&self) -> Result<Worker> {
        let mut pipefds = [0 as RawFd; 2];
        if unsafe { libc::pipe(pipefds.as_mut_ptr()) } < 0 {
            return Err(std::io::Error::last_os_error().into());
        }
        let (read_fd, write_fd) = (pipefds[0], pipefds[1]);

        let pid = unsafe { libc::fork() };
        if pid < 0 {
            let err = std::io::Error::last_os_error();
            unsafe {
                libc::close(read_fd);
                libc::close(write_fd);
            }
            return Err(err.into());
        }

        if pid == 0 {
            // The listener fd is inherited by every fork; the worker never
            // accepts on it directly, so it's closed immediately.
            unsafe {
                libc::close(self.listener_fd);
                libc::close(write_fd);
            }
            worker::wait_for_ready_signal(read_fd);
            worker::entrypoint(self.loader.processor(), &self.public_dir, self.store.as_ref());
        }

        let socket_path = net::socket_path(pid);
        let control_fd = match net::dmn_server(&socket_path) {
            Ok(fd) => fd,
            Err(e) => {
                unsafe {
                    libc::close(read_fd);
                    libc::close(write_fd);
                }
                return Err(e);
            }
        };

        unsafe { libc::close(read_fd) };
        unsafe { libc::write(write_fd, b"1".as_ptr() as *const libc::c_void, 1) };
        unsafe { libc::close(write_fd) };

        debug!("[pid:{pid}/fd:{control_fd}] worker spawned");
        Ok(Worker { pid, control_fd, client: Client::none() })
    }

    /// Closes the listener, tears every worker down, and releases resources.
    /// Called once `SIGINT` has broken the event loop.
    fn shutdown(&mut self) {
        info!("shutting down");
        while self.table.len() > 0 {
            let worker = self.table.remove(0);
            net::unlink_socket(&net::socket_path(worker.pid));
            unsafe { libc::close(worker.control_fd) };
            if worker.client.is_present() {
                unsafe { libc::close(worker.client.fd) };
            }
            signal_worker(worker.pid);
        }
        unsafe { libc::close(self.listener_fd) };
    }
}

/// `SIGINT`, then `SIGKILL` if the process hasn't exited after a brief grace
/// `waitpid(WNOHANG)` check.
fn signal_worker(pid: libc::pid_t) {
    if pid <= 0 {
        return;
    }
    unsafe {
        libc::kill(pid, libc::SIGINT);
        let mut status: libc::c_int = 0;
        if libc::waitpid(pid, &mut status, libc::WNOHANG) == 0 {
            libc::kill(pid, libc::SIGKILL);
            libc::waitpid(pid, &mut status, 0);
        }
    }
}

#[cfg(test)]
mod test {
    use super::*;

    fn socketpair() -> (RawFd, RawFd) {
        let mut pair = [0 as RawFd; 2];
        let rc = unsafe { libc::socketpair(libc::AF_UNIX, libc::SOCK_STREAM, 0, pair.as_mut_ptr()) };
        assert_eq!(0, rc);
        (pair[0], pair[1])
    }

    #[test]
    fn worker_table_push_keeps_pollfds_index_parallel() {
        let (listener, _l2) = socketpair();
        let mut table = WorkerTable::new(listener);
        let (a, _a2) = socketpair();
        let (b, _b2) = socketpair();

        table.push(Worker { pid: 111, control_fd: a, client: Client::none() });
        table.push(Worker { pid: 222, control_fd: b, client: Client::none() });

        assert_eq!(listener, table.pollfds[0].fd);
        assert_eq!(a, table.pollfds[1].fd);
        assert_eq!(b, table.pollfds[2].fd);
        assert_eq!(2, table.len());
    }

    #[test]
    fn worker_table_remove_shifts_later_entries_down() {
        let (listener, _l2) = socketpair();
        let mut table = WorkerTable::new(listener);
        let (a, _a2) = socketpair();
        let (b, _b2) = socketpair();
        let (c, _c2) = socketpair();

        table.push(Worker { pid: 1, control_fd: a, client: Client::none() });
        table.push(Worker { pid: 2, control_fd: b, client: Client::none() });
        table.push(Worker { pid: 3, control_fd: c, client: Client::none() });

        let removed = table.remove(0);
        assert_eq!(1, removed.pid);
        assert_eq!(2, table.len());
        assert_eq!(b, table.pollfds[1].fd);
        assert_eq!(c, table.pollfds[2].fd);
        assert_eq!(2, table.workers[0].pid);
        assert_eq!(3, table.workers[1].pid);
    }

    #[test]
    fn worker_table_find_idle_skips_assigned_workers() {
        let (listener, _l2) = socketpair();
        let mut table = WorkerTable::new(listener);
        let (a, _a2) = socketpair();
        let (b, _b2) = socketpair();

        table.push(Worker { pid: 1, control_fd: a, client: Client { fd: 9, address: "x".into(), port: 1 } });
        table.push(Worker { pid: 2, control_fd: b, client: Client::none() });

        assert_eq!(Some(1), table.find_idle());
    }
}
