//! tracing setup shared by the server and the probe.
//!
//! `RUST_LOG` always wins over the built-in filters below.

use std::io::IsTerminal;
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

const CLI_FILTER: &str = "fitness_tracker=info,sensor_probe=info,tower_http=warn,warn";
const CLI_VERBOSE_FILTER: &str =
    "fitness_tracker=debug,sensor_probe=debug,tower_http=debug,info";
const PRODUCTION_FILTER: &str = "fitness_tracker=info,sensor_probe=info,tower_http=info,warn";

fn env_filter(default: &str) -> EnvFilter {
    EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default))
}

/// 只有互動式終端機且未設定 `NO_COLOR` 時才輸出 ANSI 顏色
fn use_ansi(is_terminal: bool, no_color: Option<&str>) -> bool {
    is_terminal && no_color.map_or(true, str::is_empty)
}

fn stdout_ansi() -> bool {
    use_ansi(
        std::io::stdout().is_terminal(),
        std::env::var("NO_COLOR").ok().as_deref(),
    )
}

/// Human-readable output for local runs. `verbose` adds debug events and targets.
pub fn init_cli_logger(verbose: bool) {
    let filter = env_filter(if verbose {
        CLI_VERBOSE_FILTER
    } else {
        CLI_FILTER
    });

    tracing_subscriber::registry()
        .with(filter)
        .with(
            fmt::layer()
                .with_ansi(stdout_ansi())
                .with_target(verbose)
                .compact(),
        )
        .init();
}

/// One JSON object per line; container log collectors parse these directly.
pub fn init_production_logger() {
    tracing_subscriber::registry()
        .with(env_filter(PRODUCTION_FILTER))
        .with(
            fmt::layer()
                .json()
                .with_ansi(false)
                .with_current_span(false)
                .flatten_event(true),
        )
        .init();
}
