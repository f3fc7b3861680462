//! Process-wide tracing setup.

use std::sync::OnceLock;

use tracing_subscriber::EnvFilter;
use tracing_subscriber::layer::SubscriberExt as _;
use tracing_subscriber::util::SubscriberInitExt as _;

static INIT: OnceLock<()> = OnceLock::new();

fn resolve_env_filter() -> EnvFilter {
    if let Ok(level) = std::env::var("EXPENSE_LOG_LEVEL")
        && let Ok(filter) = EnvFilter::try_new(level)
    {
        return filter;
    }
    EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"))
}

/// Initialize logging once per process.
///
/// `EXPENSE_LOG_LEVEL` wins over `RUST_LOG`; the fallback is `info`. Logs go
/// to stderr so command output on stdout stays clean.
pub fn init_logging() {
    INIT.get_or_init(|| {
        let console = tracing_subscriber::fmt::layer()
            .compact()
            .with_target(false)
            .with_writer(std::io::stderr);
        let _ = tracing_subscriber::registry()
            .with(resolve_env_filter())
            .with(console)
            .try_init();
    });
}

/// First 50 characters of a reply, for log lines.
pub fn preview(text: &str) -> String {
    let mut out: String = text.chars().take(50).collect();
    if text.chars().count() > 50 {
        out.push_str("...");
    }
    out.replace('\n', " ")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_preview_truncates_and_flattens() {
        assert_eq!(preview("short"), "short");
        let long = "a".repeat(60);
        assert_eq!(preview(&long), format!("{}...", "a".repeat(50)));
        assert_eq!(preview("a\nb"), "a b");
    }

    #[test]
    fn test_init_is_idempotent() {
        init_logging();
        init_logging();
    }
}
