//! Hot-reload of the HTTP processing module.
//!
//! Watches the module's backing file with `inotify`. A create, modify, or
//! moved-to event atomically swaps the bound [`HttpProcessor`] for a freshly
//! loaded one; symbol resolution is all-or-nothing, so if any of the six entry
//! points fails to resolve the reload is rejected and the previous module
//! stays bound. A delete event instead releases the module back to
//! [`BuiltinProcessor`], since there is nothing left to reload until a later
//! create rebinds it.

use std::ffi::{c_void, CString};
use std::os::raw::{c_char, c_int};
use std::path::{Path, PathBuf};

use libloading::{Library, Symbol};
use log::{debug, error, info, warn};

use crate::error::{Error, Result};
use crate::http::{BuiltinProcessor, HttpProcessor};
use crate::store::KeyValueStore;

type RequestInitFn = unsafe extern "C" fn(public_dir: *const c_char) -> *mut c_void;
type RequestParseFn = unsafe extern "C" fn(handle: *mut c_void, data: *const u8, len: usize) -> c_int;
type RequestProcessFn = unsafe extern "C" fn(handle: *mut c_void) -> *mut c_void;
type ResponseWriteFn =
    unsafe extern "C" fn(response: *mut c_void, request: *mut c_void, out_len: *mut usize) -> *mut u8;
type RequestDestroyFn = unsafe extern "C" fn(handle: *mut c_void);
type ResponseDestroyFn = unsafe extern "C" fn(response: *mut c_void);

/// A processing module loaded from a shared object, with its six entry points
/// already resolved. Dropping it closes the library.
pub struct LoadedModule {
    _library: Library,
    request_init: RequestInitFn,
    request_parse: RequestParseFn,
    request_process: RequestProcessFn,
    response_write: ResponseWriteFn,
    request_destroy: RequestDestroyFn,
    response_destroy: ResponseDestroyFn,
}

impl LoadedModule {
    /// Opens `path` and resolves all six entry points. Fails with
    /// [`Error::ModuleLoadFailed`] if the artifact cannot be opened or if any
    /// single symbol is missing — there is no partially-bound state.
    fn open(path: &Path) -> Result<Self> {
        // SAFETY: loading an arbitrary shared object is inherently unsafe; the
        // operator is trusted to point `-l` at a module built for this ABI.
        let library = unsafe { Library::new(path) }
            .map_err(|e| Error::ModuleLoadFailed(format!("{}: {e}", path.display())))?;

        macro_rules! resolve {
            ($name:literal) => {
                unsafe {
                    *library
                        .get::<Symbol<_>>($name)
                        .map_err(|_| Error::ModuleLoadFailed(format!("missing symbol {}", $name)))?
                }
            };
        }

        let request_init: RequestInitFn = resolve!(b"request_init\0");
        let request_parse: RequestParseFn = resolve!(b"request_parse\0");
        let request_process: RequestProcessFn = resolve!(b"request_process\0");
        let response_write: ResponseWriteFn = resolve!(b"response_write\0");
        let request_destroy: RequestDestroyFn = resolve!(b"request_destroy\0");
        let response_destroy: ResponseDestroyFn = resolve!(b"response_destroy\0");

        Ok(Self {
            _library: library,
            request_init,
            request_parse,
            request_process,
            response_write,
            request_destroy,
            response_destroy,
        })
    }
}

impl HttpProcessor for LoadedModule {
    fn handle(&self, public_dir: &str, raw: &[u8], _store: Option<&KeyValueStore>) -> Vec<u8> {
        // Loaded modules run outside this process's safe abstractions and have
        // no access to the key/value store; POST persistence remains a
        // builtin-only feature until a module ABI for it exists.
        let Ok(public_dir_c) = CString::new(public_dir) else {
            return crate::http::FALLBACK_500.as_bytes().to_vec();
        };

        unsafe {
            let handle = (self.request_init)(public_dir_c.as_ptr());
            if handle.is_null() {
                return crate::http::FALLBACK_500.as_bytes().to_vec();
            }

            if (self.request_parse)(handle, raw.as_ptr(), raw.len()) < 0 {
                (self.request_destroy)(handle);
                return crate::http::FALLBACK_500.as_bytes().to_vec();
            }

            let response = (self.request_process)(handle);
            if response.is_null() {
                (self.request_destroy)(handle);
                return crate::http::FALLBACK_500.as_bytes().to_vec();
            }

            let mut out_len: usize = 0;
            let out_ptr = (self.response_write)(response, handle, &mut out_len);
            let bytes = if out_ptr.is_null() {
                crate::http::FALLBACK_500.as_bytes().to_vec()
            } else {
                std::slice::from_raw_parts(out_ptr, out_len).to_vec()
            };

            (self.response_destroy)(response);
            (self.request_destroy)(handle);
            bytes
        }
    }
}

/// Holds the currently bound processor and watches its backing file for
/// changes. Single-threaded: only the supervisor's event loop touches it.
pub struct Loader {
    path: PathBuf,
    current: Box<dyn HttpProcessor>,
    inotify_fd: c_int,
    watch_descriptor: Option<c_int>,
}

impl Loader {
    /// Creates a loader watching `path`. If `path` does not yet exist, the
    /// [`BuiltinProcessor`] is bound immediately so the server is usable before
    /// any shared object has been built; the first create event at `path` will
    /// then trigger the first real reload.
    pub fn new(path: PathBuf) -> Result<Self> {
        let inotify_fd = unsafe { libc::inotify_init1(libc::IN_NONBLOCK) };
        if inotify_fd < 0 {
            return Err(Error::Io(std::io::Error::last_os_error()));
        }

        let mut loader = Self {
            path,
            current: Box::new(BuiltinProcessor),
            inotify_fd,
            watch_descriptor: None,
        };

        loader.add_watch();
        if loader.path.exists() {
            if let Err(e) = loader.reload() {
                warn!("initial module load failed, staying on builtin processor: {e}");
            }
        }

        Ok(loader)
    }

    fn add_watch(&mut self) {
        let parent = self.path.parent().filter(|p| !p.as_os_str().is_empty()).unwrap_or_else(|| Path::new("."));
        let Ok(parent_c) = CString::new(parent.to_string_lossy().into_owned()) else {
            return;
        };

        let wd = unsafe {
            libc::inotify_add_watch(
                self.inotify_fd,
                parent_c.as_ptr(),
                libc::IN_CREATE | libc::IN_MODIFY | libc::IN_DELETE | libc::IN_MOVED_TO,
            )
        };

        if wd < 0 {
            warn!("failed to watch {} for hot-reload", parent.display());
        } else {
            self.watch_descriptor = Some(wd);
        }
    }

    /// Loads (or reloads) the module at `self.path`. On failure the previously
    /// bound processor is left in place.
    pub fn reload(&mut self) -> Result<()> {
        match LoadedModule::open(&self.path) {
            Ok(module) => {
                info!("loaded processing module from {}", self.path.display());
                self.current = Box::new(module);
                Ok(())
            }
            Err(e) => {
                error!("failed to reload {}: {e}", self.path.display());
                Err(e)
            }
        }
    }

    /// Drains pending inotify events without blocking. A create/modify/
    /// moved-to event for this loader's watched file triggers a reload; a
    /// delete event releases the bound module instead, since there is
    /// nothing on disk to reload until a later create arrives. Read failures
    /// other than "no data available" are logged and otherwise ignored — a
    /// missed event just means the module reacts on the next filesystem
    /// change instead.
    pub fn check_for_update(&mut self) {
        const EVENT_BUF_LEN: usize = 64 * (std::mem::size_of::<libc::inotify_event>() + 256);
        let mut buf = [0u8; EVENT_BUF_LEN];

        loop {
            let n = unsafe { libc::read(self.inotify_fd, buf.as_mut_ptr() as *mut c_void, buf.len()) };
            if n <= 0 {
                break;
            }

            let mut offset = 0usize;
            let mut saw_delete = false;
            let mut saw_reload_trigger = false;
            while offset + std::mem::size_of::<libc::inotify_event>() <= n as usize {
                let event = unsafe { &*(buf.as_ptr().add(offset) as *const libc::inotify_event) };
                let name_len = event.len as usize;
                let name_start = offset + std::mem::size_of::<libc::inotify_event>();
                let name = &buf[name_start..name_start + name_len];
                let name = std::str::from_utf8(name)
                    .unwrap_or("")
                    .trim_end_matches('\0');

                let is_watched_file = self
                    .path
                    .file_name()
                    .and_then(|f| f.to_str())
                    .map(|f| f == name)
                    .unwrap_or(false);

                if is_watched_file {
                    if event.mask & libc::IN_DELETE != 0 {
                        saw_delete = true;
                    } else {
                        saw_reload_trigger = true;
                    }
                }

                offset = name_start + name_len;
            }

            // A later create or modify in the same batch supersedes an
            // observed delete: the file exists again by the time we act.
            if saw_reload_trigger {
                debug!("observed filesystem event for {}", self.path.display());
                let _ = self.reload();
            } else if saw_delete {
                info!("{} was removed, releasing bound module", self.path.display());
                self.current = Box::new(BuiltinProcessor);
            }
        }
    }

    /// The currently bound processor.
    pub fn processor(&self) -> &dyn HttpProcessor {
        self.current.as_ref()
    }
}

impl Drop for Loader {
    fn drop(&mut self) {
        if self.inotify_fd >= 0 {
            unsafe {
                libc::close(self.inotify_fd);
            }
        }
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn new_loader_binds_builtin_processor_when_path_is_absent() {
        let loader = Loader::new(PathBuf::from("/nonexistent/libhttp.so")).unwrap();
        let bytes = loader
            .processor()
            .handle("./nonexistent-public-dir", b"GET / HTTP/1.1\r\n\r\n", None);
        assert!(bytes.starts_with(b"HTTP/1.1 404"));
    }

    #[test]
    fn reload_of_a_non_shared_object_fails_and_keeps_prior_processor() {
        let mut loader = Loader::new(PathBuf::from("/nonexistent/libhttp.so")).unwrap();
        // A path that exists but isn't a valid shared object (this test file)
        // should fail to load, leaving the builtin processor bound.
        loader.path = PathBuf::from(file!());
        assert!(loader.reload().is_err());
        let bytes = loader
            .processor()
            .handle("./nonexistent-public-dir", b"GET / HTTP/1.1\r\n\r\n", None);
        assert!(bytes.starts_with(b"HTTP/1.1 404"));
    }
}
