//! Structured logging helpers
//!
//! Filter construction for `tracing-subscriber` and field helpers used by the
//! router's spans and events.

pub mod fields;

pub use fields::{content_preview, generate_request_id, truncate_chars};

/// Build filter directives string from LoggingConfig
///
/// Produces `"base_level,frugal::component=level,..."`.
///
/// # Examples
///
/// ```
/// use frugal::config::logging::{LogFormat, LoggingConfig};
/// use frugal::logging::build_filter_directives;
/// use std::collections::HashMap;
///
/// let mut component_levels = HashMap::new();
/// component_levels.insert("routing".to_string(), "debug".to_string());
///
/// let config = LoggingConfig {
///     level: "info".to_string(),
///     format: LogFormat::Pretty,
///     component_levels: Some(component_levels),
///     enable_content_logging: false,
/// };
///
/// assert_eq!(build_filter_directives(&config), "info,frugal::routing=debug");
/// ```
pub fn build_filter_directives(config: &crate::config::LoggingConfig) -> String {
    let mut filter_str = config.level.clone();

    if let Some(component_levels) = &config.component_levels {
        let mut components: Vec<_> = component_levels.iter().collect();
        components.sort();
        for (component, level) in components {
            filter_str.push_str(&format!(",frugal::{}={}", component, level));
        }
    }

    filter_str
}
