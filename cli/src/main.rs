//! Ferry CLI - runs the propagation scenarios against a real worker pool.
//!
//! ```text
//! main() -> FerryConfig::load -> init_tracing -> demo_pool
//!                                                    |
//!                                                    v
//!                       ambient_guest / explicit_admin / failing_task
//! ```
//!
//! Logs go to stderr. `RUST_LOG` wins over `[log] filter` in the config file;
//! `RUST_LOG=ferry_core=trace` shows every install and restore.

mod scenarios;

use std::io;
use std::time::Duration;

use anyhow::Result;
use tracing_subscriber::{EnvFilter, fmt, prelude::*};

use ferry_config::FerryConfig;
use ferry_core::ExecutorService;

fn init_tracing(default_filter: &str) {
    let env_filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(default_filter))
        .unwrap_or_else(|_| EnvFilter::new("info"));

    tracing_subscriber::registry()
        .with(fmt::layer().with_writer(io::stderr))
        .with(env_filter)
        .init();
}

fn main() -> Result<()> {
    // Tracing needs the configured filter, so a load failure is reported after init.
    let (config, load_error) = match FerryConfig::load() {
        Ok(config) => (config, None),
        Err(err) => (FerryConfig::default(), Some(err)),
    };
    init_tracing(&config.log.filter);
    if let Some(err) = load_error {
        tracing::warn!("{err}; using defaults");
    }

    let pool = scenarios::demo_pool(&config.pool)?;

    scenarios::ambient_guest(&pool)?;
    scenarios::explicit_admin(&pool)?;
    scenarios::failing_task(&pool)?;

    pool.shutdown();
    if !pool.await_termination(Duration::from_secs(5)) {
        tracing::warn!("Worker pool did not terminate within 5s");
    }
    Ok(())
}
