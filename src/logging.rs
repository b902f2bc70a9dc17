//! File-backed tracing for embedding applications.
//!
//! A store usually lives inside a UI that owns the terminal, so nothing is
//! written to stdout or stderr. Logging stays off until `VIEWSTORE_LOG`
//! names a file; `VIEWSTORE_LOG_LEVEL` takes an `EnvFilter` directive
//! (default `info`).

use std::fs::File;
use std::path::{Path, PathBuf};
use std::sync::Mutex;

use tracing_subscriber::filter::LevelFilter;
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

const LOG_PATH_VAR: &str = "VIEWSTORE_LOG";
const LOG_LEVEL_VAR: &str = "VIEWSTORE_LOG_LEVEL";

/// Install the global subscriber if `VIEWSTORE_LOG` is set.
///
/// Returns the file actually written to, or `None` when logging stays off.
/// Each process gets its own `{base}.{unix_secs}.{pid}` file, so several
/// stores started from the same environment never share one.
pub fn init_tracing() -> Option<PathBuf> {
    let base = std::env::var_os(LOG_PATH_VAR)?;
    let path = per_process_path(Path::new(&base), unix_secs(), std::process::id());

    let file = match File::create(&path) {
        Ok(file) => file,
        Err(err) => {
            eprintln!("viewstore: cannot open log file {}: {err}", path.display());
            return None;
        }
    };

    let filter = EnvFilter::builder()
        .with_default_directive(LevelFilter::INFO.into())
        .with_env_var(LOG_LEVEL_VAR)
        .from_env_lossy();

    let layer = fmt::layer()
        .with_writer(Mutex::new(file))
        .with_ansi(false)
        .with_thread_names(true)
        .with_timer(fmt::time::UtcTime::rfc_3339());

    tracing_subscriber::registry()
        .with(filter)
        .with(layer)
        .try_init()
        .ok()?;
    Some(path)
}

fn unix_secs() -> u64 {
    std::time::SystemTime::now()
        .duration_since(std::time::UNIX_EPOCH)
        .map_or(0, |elapsed| elapsed.as_secs())
}

fn per_process_path(base: &Path, secs: u64, pid: u32) -> PathBuf {
    let mut name = base.as_os_str().to_owned();
    name.push(format!(".{secs}.{pid}"));
    PathBuf::from(name)
}
