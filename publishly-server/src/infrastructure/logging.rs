use tracing_subscriber::EnvFilter;
use tracing_subscriber::fmt::{self, time::UtcTime};

const DEFAULT_FILTER: &str = "info,publishly_server=debug";

/// JSON logs with RFC 3339 UTC timestamps; `RUST_LOG` overrides the filter.
pub fn init_logging() {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(DEFAULT_FILTER));

    let installed = fmt::fmt()
        .json()
        .with_env_filter(filter)
        .with_target(false)
        .with_timer(UtcTime::rfc_3339())
        .with_current_span(true)
        .try_init();

    if let Err(err) = installed {
        tracing::warn!(error = %err, "tracing subscriber already installed, keeping it");
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn second_initialization_keeps_the_first_subscriber() {
        init_logging();
        init_logging();
        tracing::info!("still logging");
    }
}
