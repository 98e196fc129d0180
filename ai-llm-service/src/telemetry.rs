use std::io::{self, IsTerminal};

use tracing_subscriber::fmt::format::Writer;
use tracing_subscriber::fmt::time::FormatTime;
use tracing_subscriber::registry::LookupSpan;
use tracing_subscriber::{EnvFilter, Layer, filter, fmt};

/// Targets owned by the gateway (binary + both libraries).
pub const GATEWAY_TARGETS: [&str; 3] = ["llm_query_gateway", "api", "ai_llm_service"];

/// Filter used when `RUST_LOG` is unset: quiet dependencies, verbose gateway.
pub const DEFAULT_FILTER: &str = "info,api=debug,ai_llm_service=debug";

/// RFC3339 UTC timer implemented via `chrono` (no extra features).
/// Example output: `2025-09-12T10:20:30Z`
#[derive(Clone, Debug, Default)]
struct ChronoRfc3339Utc;

impl FormatTime for ChronoRfc3339Utc {
    fn format_time(&self, w: &mut Writer<'_>) -> std::fmt::Result {
        let now = chrono::Utc::now();
        let s = now.to_rfc3339_opts(chrono::SecondsFormat::Secs, true);
        w.write_str(&s)
    }
}

/// Returns `true` if `target` belongs to one of the gateway crates.
pub fn is_gateway_target(target: &str) -> bool {
    GATEWAY_TARGETS.iter().any(|prefix| {
        target == *prefix
            || target
                .strip_prefix(prefix)
                .is_some_and(|rest| rest.starts_with("::"))
    })
}

/// Formatting layer for gateway events.
///
/// - RFC3339 UTC timestamps
/// - Compact single-line format with `file:line`
/// - Span close events (duration of instrumented calls such as `generate_stream`)
/// - ANSI colors only when stdout is a terminal
///
/// Dependency events (hyper, reqwest) are rejected by a per-layer filter so
/// they do not flood debug output.
pub fn layer<S>() -> impl Layer<S> + Send + Sync
where
    S: tracing::Subscriber + for<'a> LookupSpan<'a>,
{
    let use_ansi = io::stdout().is_terminal();
    let only_gateway = filter::filter_fn(|meta| is_gateway_target(meta.target()));

    fmt::layer()
        .with_ansi(use_ansi)
        .with_span_events(fmt::format::FmtSpan::CLOSE)
        .event_format(
            fmt::format()
                .compact()
                .with_timer(ChronoRfc3339Utc)
                .with_level(true)
                .with_target(true)
                .with_source_location(true),
        )
        .with_filter(only_gateway)
}

/// `EnvFilter` from `RUST_LOG`, falling back to `default`.
pub fn env_filter(default: &str) -> EnvFilter {
    EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default))
}
