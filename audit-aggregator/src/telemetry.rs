//! Log output for the aggregation libraries.
//!
//! Events from `audit_aggregator` and `table_view` go through one
//! library layer with timestamps and source locations; everything else
//! (the binary) keeps a plain fmt layer. Both sit under one `EnvFilter`.

use std::io::{self, IsTerminal};

use tracing::Level;
use tracing_subscriber::filter::Directive;
use tracing_subscriber::fmt::format::Writer;
use tracing_subscriber::fmt::time::FormatTime;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::registry::LookupSpan;
use tracing_subscriber::util::{SubscriberInitExt, TryInitError};
use tracing_subscriber::{EnvFilter, Layer, filter, fmt};

/// Target prefix of this crate's events.
pub const TARGET_PREFIX: &str = "audit_aggregator";

/// Every library target rendered by [`layer`].
pub const LIBRARY_TARGETS: [&str; 2] = [TARGET_PREFIX, "table_view"];

/// `2026-10-17T10:20:30Z`
#[derive(Clone, Copy, Debug, Default)]
struct UtcSeconds;

impl FormatTime for UtcSeconds {
    fn format_time(&self, w: &mut Writer<'_>) -> std::fmt::Result {
        let stamp = chrono::Utc::now().to_rfc3339_opts(chrono::SecondsFormat::Secs, true);
        w.write_str(&stamp)
    }
}

pub fn is_library_target(target: &str) -> bool {
    LIBRARY_TARGETS.iter().any(|p| target.starts_with(p))
}

/// Compact layer for library events only. ANSI colors only on a TTY.
pub fn layer<S>() -> impl Layer<S> + Send + Sync
where
    S: tracing::Subscriber + for<'a> LookupSpan<'a>,
{
    fmt::layer()
        .with_timer(UtcSeconds)
        .with_target(true)
        .with_ansi(io::stdout().is_terminal())
        .event_format(fmt::format().compact().with_source_location(true))
        .with_filter(filter::filter_fn(|meta| is_library_target(meta.target())))
}

/// `<target>=<level>` for each library target.
pub fn level_directives(level: Level) -> Vec<Directive> {
    let level = level.as_str().to_lowercase();
    LIBRARY_TARGETS
        .iter()
        .filter_map(|t| format!("{t}={level}").parse().ok())
        .collect()
}

/// `RUST_LOG` (or `default`) with the library targets pinned to `level`.
pub fn env_filter_with_level(default: &str, level: Level) -> EnvFilter {
    let base = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));
    level_directives(level)
        .into_iter()
        .fold(base, EnvFilter::add_directive)
}

/// Installs the global subscriber: the filter, a plain layer for
/// non-library events and the library [`layer`].
pub fn try_init(default: &str, level: Level) -> Result<(), TryInitError> {
    let app_layer = fmt::layer()
        .with_target(false)
        .with_filter(filter::filter_fn(|meta| !is_library_target(meta.target())));
    tracing_subscriber::registry()
        .with(env_filter_with_level(default, level))
        .with(app_layer)
        .with(layer())
        .try_init()
}
