//! Logging configuration and initialization.
//!
//! A preset picked from the CLI flags gives the base directives, `--log
//! TARGET=LEVEL` adds to them, and `RUST_LOG` replaces all of it when set.

use clap::ValueEnum;
use tracing::Level;
use tracing_subscriber::{
    fmt::{self, format::FmtSpan},
    layer::SubscriberExt,
    util::SubscriberInitExt,
    EnvFilter,
};

/// Namespace of every target this server logs under.
const NAMESPACE: &str = "sqlbook";

/// Log output format.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, ValueEnum)]
pub enum LogFormat {
    #[default]
    Text,
    Json,
}

/// Base verbosity chosen from CLI flags.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum LogPreset {
    /// Startup, session changes and query outcomes
    #[default]
    Production,
    /// Adds request traces and parser drops
    Verbose,
    Debug,
    Trace,
    Quiet,
}

impl LogPreset {
    /// Quiet wins over everything, then the most detailed flag.
    pub fn from_flags(verbose: bool, debug: bool, trace: bool, quiet: bool) -> Self {
        match (quiet, trace, debug, verbose) {
            (true, ..) => Self::Quiet,
            (_, true, ..) => Self::Trace,
            (_, _, true, _) => Self::Debug,
            (_, _, _, true) => Self::Verbose,
            _ => Self::Production,
        }
    }

    fn directives(self) -> &'static [&'static str] {
        match self {
            Self::Production => &[
                "sqlbook=info",
                "sqlbook::parser=warn",
                "sqlx=warn",
                "tower_http=warn",
            ],
            Self::Verbose => &[
                "sqlbook=info",
                "sqlbook::parser=debug",
                "sqlx=warn",
                "tower_http=info",
            ],
            Self::Debug => &["sqlbook=debug", "sqlx=info", "tower_http=debug"],
            Self::Trace => &["sqlbook=trace", "sqlx=trace", "tower_http=trace"],
            Self::Quiet => &["sqlbook=warn", "sqlx=error", "tower_http=error"],
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct LogConfig {
    pub preset: LogPreset,
    /// Extra `target=level` directives, targets already namespaced.
    pub overrides: Vec<String>,
    pub format: LogFormat,
}

impl LogConfig {
    pub fn from_cli(
        verbose: bool,
        debug: bool,
        trace: bool,
        quiet: bool,
        log_overrides: Vec<String>,
        format: LogFormat,
    ) -> Self {
        let overrides = log_overrides
            .iter()
            .flat_map(|arg| arg.split(','))
            .filter_map(override_directive)
            .collect();

        Self {
            preset: LogPreset::from_flags(verbose, debug, trace, quiet),
            overrides,
            format,
        }
    }

    /// Preset directives followed by overrides; later directives win.
    pub fn directives(&self) -> Vec<String> {
        self.preset
            .directives()
            .iter()
            .map(|d| d.to_string())
            .chain(self.overrides.iter().cloned())
            .collect()
    }

    pub fn build_filter(&self) -> EnvFilter {
        if let Ok(env_filter) = EnvFilter::try_from_default_env() {
            return env_filter;
        }
        EnvFilter::try_new(self.directives().join(","))
            .unwrap_or_else(|_| EnvFilter::new("info"))
    }
}

/// `"store=debug"` becomes `"sqlbook::store=debug"`. Library targets
/// (`sqlx`, `tower_http`) pass through; unknown levels are ignored.
fn override_directive(part: &str) -> Option<String> {
    let (target, level) = part.split_once('=')?;
    let target = target.trim();
    let level: Level = level.trim().parse().ok()?;

    let is_library = target.starts_with("sqlx") || target.starts_with("tower_http");
    let target = if is_library || target == NAMESPACE || target.starts_with("sqlbook::") {
        target.to_string()
    } else {
        format!("{NAMESPACE}::{target}")
    };
    Some(format!("{}={}", target, level.to_string().to_lowercase()))
}

/// Install the global subscriber.
pub fn init(config: &LogConfig) {
    let registry = tracing_subscriber::registry().with(config.build_filter());

    match config.format {
        LogFormat::Text => registry
            .with(fmt::layer().with_target(true))
            .init(),
        LogFormat::Json => registry
            .with(fmt::layer().json().with_span_events(FmtSpan::CLOSE))
            .init(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn with_overrides(overrides: &[&str]) -> LogConfig {
        LogConfig::from_cli(
            false,
            false,
            false,
            false,
            overrides.iter().map(|s| s.to_string()).collect(),
            LogFormat::Text,
        )
    }

    #[test]
    fn test_production_keeps_parser_drops_quiet() {
        let directives = LogConfig::default().directives();
        assert!(directives.contains(&"sqlbook=info".to_string()));
        assert!(directives.contains(&"sqlbook::parser=warn".to_string()));
    }

    #[test]
    fn test_flags_pick_preset() {
        assert_eq!(LogPreset::from_flags(true, true, true, true), LogPreset::Quiet);
        assert_eq!(LogPreset::from_flags(true, true, false, false), LogPreset::Debug);
        assert_eq!(LogPreset::from_flags(true, false, false, false), LogPreset::Verbose);
        assert_eq!(LogPreset::from_flags(false, false, false, false), LogPreset::Production);
    }

    #[test]
    fn test_store_and_query_overrides_are_namespaced() {
        let config = with_overrides(&["store=DEBUG", "query=trace,sqlx::query=info"]);
        assert_eq!(
            config.overrides,
            ["sqlbook::store=debug", "sqlbook::query=trace", "sqlx::query=info"]
        );
    }

    #[test]
    fn test_overrides_follow_preset() {
        let config = with_overrides(&["parser=debug"]);
        let directives = config.directives();
        assert_eq!(directives.last().map(String::as_str), Some("sqlbook::parser=debug"));
    }

    #[test]
    fn test_unparseable_overrides_are_skipped() {
        let config = with_overrides(&["pool=loud", "api", "sqlbook::api=warn"]);
        assert_eq!(config.overrides, ["sqlbook::api=warn"]);
    }

    #[test]
    fn test_log_format_values() {
        assert_eq!(LogFormat::from_str("json", true).unwrap(), LogFormat::Json);
        assert!(LogFormat::from_str("yaml", true).is_err());
    }
}
