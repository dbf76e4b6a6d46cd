//! Logging setup shared by the server and client binaries.

use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

/// Build the default `EnvFilter` directive string for a binary.
///
/// The binary target and its library share a crate name (`studyroom-server`
/// -> `studyroom_server`), so one directive covers both. `tower_http` is
/// included so request traces from the HTTP layer show up at the same level.
pub fn default_directives(binary_name: &str, default_log_level: &str) -> String {
    format!(
        "{}={level},{}={level},tower_http={level}",
        env!("CARGO_PKG_NAME").replace('-', "_"),
        binary_name.replace('-', "_"),
        level = default_log_level,
    )
}

/// Initialize the tracing subscriber with the specified default log level.
///
/// The log level can be overridden using the `RUST_LOG` environment variable.
///
/// # Arguments
///
/// * `binary_name` - The name of the binary (e.g., "studyroom-server")
/// * `default_log_level` - The default log level (e.g., "debug", "info")
///
/// # Examples
///
/// ```no_run
/// use studyroom_shared::logger::setup_logger;
///
/// setup_logger("studyroom-server", "debug");
/// ```
pub fn setup_logger(binary_name: &str, default_log_level: &str) {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| default_directives(binary_name, default_log_level).into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_directives_normalize_binary_name() {
        // テスト項目: バイナリ名のハイフンがアンダースコアに置換される
        // given (前提条件):
        let binary_name = "studyroom-server";

        // when (操作):
        let directives = default_directives(binary_name, "debug");

        // then (期待する結果):
        assert!(directives.contains("studyroom_server=debug"));
        assert!(directives.contains("studyroom_shared=debug"));
        assert!(directives.contains("tower_http=debug"));
        assert!(!directives.contains("studyroom-server"));
    }
}
