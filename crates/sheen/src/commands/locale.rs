//! Locale path resolution command.

use crate::config::Config;

/// Run the locale command, printing one resolved path per input.
pub fn run(config: &Config, paths: &[String], localized: bool) {
    let scheme = config.locale_scheme();
    for path in paths {
        let resolved = scheme.resolve_url(path, localized);
        tracing::debug!("{} -> {}", path, resolved);
        println!("{resolved}");
    }
}
