use tracing_subscriber::EnvFilter;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;

/// Filter used when `RUST_LOG` is not set.
///
/// A bare level such as `info` is scoped to this crate and tower-http so
/// dependency chatter stays quiet; anything else is taken as a full
/// `EnvFilter` directive.
pub fn default_directive(log_level: &str, verbose: bool) -> String {
    let level = if verbose { "debug" } else { log_level.trim() };
    match level.to_ascii_lowercase().as_str() {
        lvl @ ("error" | "warn" | "info" | "debug" | "trace") => {
            format!("jobpoll={lvl},tower_http={lvl}")
        }
        _ => level.to_string(),
    }
}

/// Install the global tracing subscriber. `RUST_LOG` wins over the
/// configured level.
pub fn init(log_level: &str, verbose: bool) {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(default_directive(log_level, verbose)));

    tracing_subscriber::registry()
        .with(filter)
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn bare_level_is_scoped_to_crate() {
        assert_eq!(default_directive("INFO", false), "jobpoll=info,tower_http=info");
    }

    #[test]
    fn verbose_forces_debug() {
        assert_eq!(default_directive("warn", true), "jobpoll=debug,tower_http=debug");
    }

    #[test]
    fn custom_directive_passes_through() {
        assert_eq!(
            default_directive("jobpoll=trace,hyper=info", false),
            "jobpoll=trace,hyper=info"
        );
    }
}
