use crate::config::{Config, RustEnv};
use log::LevelFilter;
use simplelog::{self, ConfigBuilder};

/// Modules to filter out from logging when not in Trace mode.
/// Entries match as module path prefixes, so `tower` also covers
/// `tower_sessions` and `tower_http`.
const FILTERED_MODULES: &[&str] = &["hyper", "reqwest", "rustls", "tower", "axum"];

pub struct Logger {}

impl Logger {
    /// Initializes the global logger with configuration based on the provided Config.
    ///
    /// When the log level is set to Trace, all logs including dependency logs are shown.
    /// For all other log levels, verbose dependency logs are filtered out.
    ///
    /// ANSI colors are only used in development. In production TRACE is capped
    /// to DEBUG, which keeps the dependency filters on.
    pub fn init_logger(config: &Config) {
        let level = Self::effective_level(config.log_level_filter, &config.runtime_env);
        let log_level_filter = Self::convert_level_filter(level);
        let apply_filters = Self::should_filter_dependencies(level);
        let log_config = Self::build_log_config(apply_filters);

        if let Err(e) = simplelog::TermLogger::init(
            log_level_filter,
            log_config,
            simplelog::TerminalMode::Mixed,
            Self::color_choice(&config.runtime_env),
        ) {
            eprintln!("Failed to start simplelog: {e}");
        }

        if level != config.log_level_filter {
            log::warn!(
                "Log level {} is not allowed in {}, using {}",
                config.log_level_filter,
                config.runtime_env,
                level
            );
        }
    }

    /// The requested level, with TRACE capped to DEBUG in production.
    fn effective_level(requested: LevelFilter, runtime_env: &RustEnv) -> LevelFilter {
        match (runtime_env, requested) {
            (RustEnv::Production, LevelFilter::Trace) => LevelFilter::Debug,
            _ => requested,
        }
    }

    fn color_choice(runtime_env: &RustEnv) -> simplelog::ColorChoice {
        match runtime_env {
            RustEnv::Development => simplelog::ColorChoice::Auto,
            RustEnv::Staging | RustEnv::Production => simplelog::ColorChoice::Never,
        }
    }

    /// Converts log::LevelFilter to simplelog::LevelFilter.
    fn convert_level_filter(level: LevelFilter) -> simplelog::LevelFilter {
        match level {
            LevelFilter::Off => simplelog::LevelFilter::Off,
            LevelFilter::Error => simplelog::LevelFilter::Error,
            LevelFilter::Warn => simplelog::LevelFilter::Warn,
            LevelFilter::Info => simplelog::LevelFilter::Info,
            LevelFilter::Debug => simplelog::LevelFilter::Debug,
            LevelFilter::Trace => simplelog::LevelFilter::Trace,
        }
    }

    /// Determines whether dependency logging should be filtered.
    ///
    /// Returns `false` for Trace level (show all logs), `true` for all other levels.
    fn should_filter_dependencies(level: LevelFilter) -> bool {
        level != LevelFilter::Trace
    }

    /// Builds a simplelog Config with optional module filtering.
    ///
    /// When `apply_filters` is true, logs from noisy dependencies are suppressed.
    fn build_log_config(apply_filters: bool) -> simplelog::Config {
        let mut builder = ConfigBuilder::new();
        builder.set_time_format_rfc3339();

        if apply_filters {
            for module in FILTERED_MODULES {
                builder.add_filter_ignore_str(module);
            }
        }

        builder.build()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_filtered_modules_cover_http_stack() {
        for module in ["hyper", "reqwest", "tower", "axum"] {
            assert!(
                FILTERED_MODULES.contains(&module),
                "{module} should be filtered"
            );
        }
    }

    #[test]
    fn test_core_crates_are_never_filtered() {
        for module in ["oidc_auth", "web", "service", "keycloak_pkce_rs"] {
            assert!(
                !FILTERED_MODULES.iter().any(|prefix| module.starts_with(prefix)),
                "{module} logs must stay visible"
            );
        }
    }

    #[test]
    fn test_only_trace_shows_dependency_logs() {
        assert!(!Logger::should_filter_dependencies(LevelFilter::Trace));
        for level in [
            LevelFilter::Off,
            LevelFilter::Error,
            LevelFilter::Warn,
            LevelFilter::Info,
            LevelFilter::Debug,
        ] {
            assert!(
                Logger::should_filter_dependencies(level),
                "{level} should filter dependency logs"
            );
        }
    }

    #[test]
    fn test_production_caps_trace() {
        assert_eq!(
            Logger::effective_level(LevelFilter::Trace, &RustEnv::Production),
            LevelFilter::Debug
        );
        assert_eq!(
            Logger::effective_level(LevelFilter::Trace, &RustEnv::Development),
            LevelFilter::Trace
        );
        assert_eq!(
            Logger::effective_level(LevelFilter::Info, &RustEnv::Production),
            LevelFilter::Info
        );
        assert!(Logger::should_filter_dependencies(Logger::effective_level(
            LevelFilter::Trace,
            &RustEnv::Production
        )));
    }

    #[test]
    fn test_colors_only_in_development() {
        assert!(matches!(
            Logger::color_choice(&RustEnv::Development),
            simplelog::ColorChoice::Auto
        ));
        for env in [RustEnv::Staging, RustEnv::Production] {
            assert!(matches!(
                Logger::color_choice(&env),
                simplelog::ColorChoice::Never
            ));
        }
    }

    #[test]
    fn test_build_log_config_does_not_panic() {
        let _filtered = Logger::build_log_config(true);
        let _unfiltered = Logger::build_log_config(false);
    }

    #[test]
    fn test_convert_level_filter_preserves_ordering() {
        assert_eq!(
            Logger::convert_level_filter(LevelFilter::Off) as u8,
            simplelog::LevelFilter::Off as u8
        );
        assert_eq!(
            Logger::convert_level_filter(LevelFilter::Debug) as u8,
            simplelog::LevelFilter::Debug as u8
        );
        assert_eq!(
            Logger::convert_level_filter(LevelFilter::Trace) as u8,
            simplelog::LevelFilter::Trace as u8
        );
    }
}
