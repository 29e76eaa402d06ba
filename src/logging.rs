//! Logger setup for the `cryptarithm` binary. The library itself only emits
//! through the `log` facade.

use std::io::Write;

use env_logger::{Builder, Env};

/// Set (to anything) to log at debug level.
pub const DEBUG_ENV: &str = "CRYPTARITHM_DEBUG";

fn default_filter(debug_enabled: bool) -> &'static str {
    if debug_enabled {
        "debug"
    } else {
        "info"
    }
}

/// Installs an `env_logger` that writes `[LEVEL] message` lines to stderr.
///
/// `RUST_LOG` wins when set; otherwise the level is `debug` if
/// [`DEBUG_ENV`] is present and `info` if not. Calling this twice keeps the
/// first logger.
pub fn init_from_env() {
    let debug_enabled = std::env::var_os(DEBUG_ENV).is_some();
    let env = Env::default().default_filter_or(default_filter(debug_enabled));

    let installed = Builder::from_env(env)
        .format(|buf, record| writeln!(buf, "[{}] {}", record.level(), record.args()))
        .try_init();
    if installed.is_ok() && debug_enabled {
        log::debug!("debug logging enabled via {DEBUG_ENV}");
    }
}
