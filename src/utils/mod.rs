//! Utilities: logging setup (tracing, stderr only) and env fallbacks for CLI settings.
//!
//! Key items:
//!   derive_level / init_logging
//!   env_fallback

use tracing::Level;
use tracing_subscriber::EnvFilter;

/// Map `-v` / `-q` flags to a level: quiet wins, then 0 -> info, 1 -> debug, 2+ -> trace.
pub fn derive_level(verbose: u8, quiet: bool) -> Level {
    if quiet {
        return Level::ERROR;
    }
    match verbose {
        0 => Level::INFO,
        1 => Level::DEBUG,
        _ => Level::TRACE,
    }
}

/// Install the global subscriber. `RUST_LOG` overrides the flag-derived level.
///
/// Logs go to stderr: stdout belongs to the MCP protocol in `serve` mode and
/// to command output otherwise.
pub fn init_logging(level: Level) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        EnvFilter::new(format!(
            "mcp_perforce={},rmcp=warn",
            level.as_str().to_lowercase()
        ))
    });
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .try_init();
}

/// Flag value if given, else the environment variable, ignoring blank values.
pub fn env_fallback(flag: Option<String>, var: &str) -> Option<String> {
    flag.filter(|v| !v.trim().is_empty()).or_else(|| {
        std::env::var(var)
            .ok()
            .map(|v| v.trim().to_string())
            .filter(|v| !v.is_empty())
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn quiet_beats_verbose() {
        assert_eq!(derive_level(3, true), Level::ERROR);
        assert_eq!(derive_level(0, false), Level::INFO);
        assert_eq!(derive_level(1, false), Level::DEBUG);
        assert_eq!(derive_level(5, false), Level::TRACE);
    }

    #[test]
    fn flag_wins_over_env() {
        let var = "MCP_PERFORCE_TEST_FALLBACK_FLAG";
        assert_eq!(
            env_fallback(Some("from-flag".into()), var),
            Some("from-flag".to_string())
        );
    }

    #[test]
    fn env_used_when_flag_absent() {
        let var = "MCP_PERFORCE_TEST_FALLBACK_SET";
        // SAFETY: the variable name is unique to this test.
        unsafe { std::env::set_var(var, "  ws_env  ") };
        assert_eq!(env_fallback(None, var), Some("ws_env".to_string()));
        assert_eq!(env_fallback(Some(" ".into()), var), Some("ws_env".to_string()));
        unsafe { std::env::remove_var(var) };
    }

    #[test]
    fn blank_values_are_ignored() {
        let var = "MCP_PERFORCE_TEST_FALLBACK_UNSET";
        assert_eq!(env_fallback(Some("  ".into()), var), None);
        assert_eq!(env_fallback(None, var), None);
    }
}
