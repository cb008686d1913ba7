//! # Output Configuration
//!
//! Controls how the CLI decorates its messages. Colour and emoji are used only
//! when the user and the terminal allow it:
//!
//! - `--color=never|always|auto` on the command line;
//! - `NO_COLOR` (any value) disables colour, see <https://no-color.org/>;
//! - `CLICOLOR=0` disables colour, `CLICOLOR_FORCE=1` forces it;
//! - `TERM=dumb` disables colour.
//!
//! Build logs are frequently captured by CI systems, so `auto` falls back to
//! plain markers like `[OK]` whenever stdout is not a colour terminal.
//!
//! ```
//! use git_versioning::output::{emoji, highlight, OutputConfig};
//!
//! let out = OutputConfig::from_env_and_flag("never");
//! assert_eq!(emoji(&out, "✅", "[OK]"), "[OK]");
//! assert_eq!(highlight(&out, "1.2.3"), "1.2.3");
//! ```

use std::env;

/// Output configuration for controlling colors and emojis.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct OutputConfig {
    pub use_color: bool,
}

impl OutputConfig {
    /// Creates an output configuration from the `--color` flag value and the
    /// environment. Unknown flag values behave like `auto`.
    pub fn from_env_and_flag(color_flag: &str) -> Self {
        let use_color = match color_flag.to_lowercase().as_str() {
            "always" => true,
            "never" => false,
            _ => Self::detect_color_support(),
        };
        Self { use_color }
    }

    fn detect_color_support() -> bool {
        if env::var_os("NO_COLOR").is_some() {
            return false;
        }
        if env::var("CLICOLOR").is_ok_and(|v| v == "0") {
            return false;
        }
        if env::var("CLICOLOR_FORCE").is_ok_and(|v| v != "0" && !v.is_empty()) {
            return true;
        }
        if env::var("TERM").is_ok_and(|v| v == "dumb") {
            return false;
        }
        console::Term::stdout().features().colors_supported()
    }
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self::from_env_and_flag("auto")
    }
}

/// Returns `emoji_str` when colour is enabled and `plain` otherwise.
pub fn emoji<'a>(config: &OutputConfig, emoji_str: &'a str, plain: &'a str) -> &'a str {
    if config.use_color {
        emoji_str
    } else {
        plain
    }
}

/// Renders a version in bold green when colour is enabled.
pub fn highlight(config: &OutputConfig, version: &str) -> String {
    if config.use_color {
        console::style(version)
            .green()
            .bold()
            .force_styling(true)
            .to_string()
    } else {
        version.to_string()
    }
}
