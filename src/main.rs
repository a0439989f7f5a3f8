//! Supervisor binary entry point: parse arguments, wire up logging, the
//! key/value store, the hot-reload loader, and hand off to the supervisor's
//! event loop.

use std::process::ExitCode;

use foreman::config::Config;
use foreman::loader::Loader;
use foreman::store::KeyValueStore;
use foreman::supervisor::Supervisor;

fn main() -> ExitCode {
    let config = Config::from_args();
    env_logger::Builder::new().filter_level(config.log_level()).init();

    if let Err(e) = config.validate() {
        log::error!("{e}");
        return ExitCode::FAILURE;
    }

    let store = match KeyValueStore::open("./db_records") {
        Ok(store) => Some(store),
        Err(e) => {
            log::error!("failed to open key/value store: {e}");
            return ExitCode::FAILURE;
        }
    };

    let loader = match Loader::new(config.library.clone()) {
        Ok(loader) => loader,
        Err(e) => {
            log::error!("failed to initialize hot-reload loader: {e}");
            return ExitCode::FAILURE;
        }
    };

    let public_dir = config.public_dir.to_string_lossy().into_owned();

    let mut supervisor = match Supervisor::new(
        &config.address,
        config.port,
        config.workers,
        loader,
        store,
        public_dir,
    ) {
        Ok(supervisor) => supervisor,
        Err(e) => {
            log::error!("failed to start supervisor: {e}");
            return ExitCode::FAILURE;
        }
    };

    supervisor.run();
    ExitCode::SUCCESS
}
