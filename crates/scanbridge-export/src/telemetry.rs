//! Tracing initialisation for the exporter binary
//!
//! One call wires an `EnvFilter` and either a human-readable or a JSON
//! formatter. HTTP internals are noisy below `info`, so hyper and reqwest
//! are capped unless `RUST_LOG` says otherwise.

use tracing::Level;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{fmt, EnvFilter};

/// Initialise the global tracing subscriber
///
/// `json` switches to newline-delimited JSON log lines for aggregation.
/// `level` is the default verbosity when `RUST_LOG` is unset. Calling this
/// more than once is harmless; later calls are ignored.
pub fn init_tracing(json: bool, level: Level) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        EnvFilter::new(format!("{},hyper=info,reqwest=info", level.as_str()))
    });

    if json {
        tracing_subscriber::registry()
            .with(filter)
            .with(fmt::layer().with_target(false).json())
            .try_init()
            .ok();
    } else {
        tracing_subscriber::registry()
            .with(filter)
            .with(fmt::layer().with_target(false))
            .try_init()
            .ok();
    }
}
