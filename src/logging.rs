//! Tracing/logging setup (ambient stack; spec.md §7's diagnostics are
//! rendered through [`crate::diagnostics`], this module is purely for
//! operational `tracing` events — lex/parse/format progress, cache
//! hits, incremental-coordinator decisions).

use std::io::IsTerminal;

use tracing_subscriber::EnvFilter;

/// Installs a global `tracing` subscriber reading `ZZ_LOG` (falling
/// back to `warn`), colored only when stdout is a terminal. Call once,
/// from the binary's `main`.
pub fn init() {
    let filter = EnvFilter::try_from_env("ZZ_LOG").unwrap_or_else(|_| EnvFilter::new("warn"));
    let use_ansi = std::io::stdout().is_terminal();
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_ansi(use_ansi)
        .with_target(false)
        .try_init()
        .ok();
}
